//! Document offsets to minimap rows with collapsed folds removed.
//!
//! Only collapsed, valid, non-custom regions hide text. Nested regions are
//! dropped in favour of the outermost one, which hides them anyway.

use crate::host::{FoldRegion, TextSnapshot};

/// Columns a tab advances.
pub const TAB_WIDTH: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollapsedFold {
    pub start_offset: usize,
    pub end_offset: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl CollapsedFold {
    pub fn hidden_lines(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }
}

#[derive(Clone, Debug, Default)]
pub struct FoldLayout {
    folds: Vec<CollapsedFold>,
    /// `hidden_prefix[i]` = lines hidden by `folds[..i]`.
    hidden_prefix: Vec<usize>,
}

impl FoldLayout {
    pub fn new(text: &TextSnapshot, regions: &[FoldRegion]) -> Self {
        let mut candidates: Vec<&FoldRegion> = regions.iter().filter(|r| r.contracts_lines() && r.start_offset < text.len()).collect();
        candidates.sort_by(|a, b| a.start_offset.cmp(&b.start_offset).then(b.end_offset.cmp(&a.end_offset)));

        let mut folds: Vec<CollapsedFold> = Vec::with_capacity(candidates.len());
        for region in candidates {
            let end_offset = region.end_offset.min(text.len());
            if let Some(last) = folds.last() {
                if region.start_offset < last.end_offset {
                    continue;
                }
            }
            folds.push(CollapsedFold {
                start_offset: region.start_offset,
                end_offset,
                start_line: text.line_number(region.start_offset),
                end_line: text.line_number(end_offset),
            });
        }

        let mut hidden_prefix = Vec::with_capacity(folds.len() + 1);
        hidden_prefix.push(0);
        for fold in &folds {
            let prev = *hidden_prefix.last().unwrap_or(&0);
            hidden_prefix.push(prev + fold.hidden_lines());
        }
        Self { folds, hidden_prefix }
    }

    pub fn folds(&self) -> &[CollapsedFold] {
        &self.folds
    }

    pub fn total_hidden_lines(&self) -> usize {
        *self.hidden_prefix.last().unwrap_or(&0)
    }

    /// Rows the minimap needs for the whole document.
    pub fn visual_line_count(&self, text: &TextSnapshot) -> usize {
        text.line_count().saturating_sub(self.total_hidden_lines())
    }

    pub fn collapsed_at(&self, offset: usize) -> Option<&CollapsedFold> {
        let idx = self.folds.partition_point(|f| f.start_offset <= offset);
        idx.checked_sub(1).map(|i| &self.folds[i]).filter(|f| f.contains(offset))
    }

    pub fn is_collapsed(&self, offset: usize) -> bool {
        self.collapsed_at(offset).is_some()
    }

    /// Minimap row of `offset`. Offsets inside a fold map to its first row.
    pub fn visual_line(&self, text: &TextSnapshot, offset: usize) -> usize {
        let offset = self.visible_offset(offset.min(text.len()));
        let idx = self.folds.partition_point(|f| f.end_offset <= offset);
        text.line_number(offset).saturating_sub(self.hidden_prefix[idx])
    }

    /// Tab-expanded column of `offset` within its minimap row.
    pub fn visual_column(&self, text: &TextSnapshot, offset: usize) -> i32 {
        let target = self.visible_offset(offset.min(text.len()));
        let mut row_start = text.line_start_offset(text.line_number(target));
        // A fold ending on this line that began earlier pulls the row start back.
        loop {
            let idx = self.folds.partition_point(|f| f.end_offset <= target);
            let Some(fold) = self.folds[..idx].iter().rev().find(|f| f.end_offset >= row_start) else {
                break;
            };
            if fold.start_offset >= row_start {
                break;
            }
            row_start = text.line_start_offset(fold.start_line);
        }

        let mut column = 0;
        let mut i = row_start;
        while i < target {
            if let Some(fold) = self.collapsed_at(i) {
                i = fold.end_offset;
                continue;
            }
            column += match text.char_at(i) {
                Some('\t') => TAB_WIDTH,
                Some(_) => 1,
                None => break,
            };
            i += 1;
        }
        column
    }

    fn visible_offset(&self, offset: usize) -> usize {
        self.collapsed_at(offset).map_or(offset, |f| f.start_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(count: usize) -> TextSnapshot {
        let text: Vec<String> = (0..count).map(|i| format!("line{i}")).collect();
        TextSnapshot::new(&text.join("\n"), 1)
    }

    #[test]
    fn test_fold_shifts_rows() {
        let text = numbered_lines(30);
        let start = text.line_start_offset(10) + 2;
        let end = text.line_start_offset(20) + 3;
        let layout = FoldLayout::new(&text, &[FoldRegion::collapsed(start..end)]);

        assert_eq!(layout.total_hidden_lines(), 10);
        assert_eq!(layout.visual_line_count(&text), 20);
        assert_eq!(layout.visual_line(&text, text.line_start_offset(5)), 5);
        assert_eq!(layout.visual_line(&text, text.line_start_offset(15)), 10);
        assert_eq!(layout.visual_line(&text, text.line_start_offset(21)), 11);
        assert_eq!(layout.visual_line(&text, text.line_start_offset(29)), 19);
    }

    #[test]
    fn test_custom_and_expanded_regions_are_ignored() {
        let text = numbered_lines(10);
        let region = FoldRegion::collapsed(text.line_start_offset(2)..text.line_start_offset(5));
        let layout = FoldLayout::new(
            &text,
            &[
                FoldRegion { custom: true, ..region },
                FoldRegion { expanded: true, ..region },
                FoldRegion {
                    start_offset: 9,
                    end_offset: 3,
                    expanded: false,
                    custom: false,
                },
            ],
        );
        assert_eq!(layout.total_hidden_lines(), 0);
        assert_eq!(layout.visual_line(&text, text.line_start_offset(7)), 7);
    }

    #[test]
    fn test_nested_folds_count_once() {
        let text = numbered_lines(20);
        let outer = FoldRegion::collapsed(text.line_start_offset(2)..text.line_start_offset(10));
        let inner = FoldRegion::collapsed(text.line_start_offset(4)..text.line_start_offset(6));
        let layout = FoldLayout::new(&text, &[inner, outer]);
        assert_eq!(layout.folds().len(), 1);
        assert_eq!(layout.total_hidden_lines(), 8);
    }

    #[test]
    fn test_visual_column_expands_tabs_and_skips_folds() {
        let text = TextSnapshot::new("\tab{\nhidden\n}cd", 1);
        // fold from '{' + 1 to '}'
        let layout = FoldLayout::new(&text, &[FoldRegion::collapsed(4..12)]);
        assert_eq!(layout.visual_column(&text, 1), TAB_WIDTH);
        assert_eq!(layout.visual_column(&text, 3), TAB_WIDTH + 2);
        // '}' continues the row that holds the fold start
        assert_eq!(layout.visual_column(&text, 12), TAB_WIDTH + 3);
        assert_eq!(layout.visual_line(&text, 13), 0);
    }
}
