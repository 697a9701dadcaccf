//! Boundary to the editor that hosts the minimap.
//!
//! Everything here is read through `&self` and may be called from the render
//! thread while the UI thread keeps editing, so implementations hand out
//! snapshots rather than references into live state.

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use crate::{Color, Rectangle};

pub mod memory;

/// Immutable view of the document text at one modification stamp.
#[derive(Clone, Debug)]
pub struct TextSnapshot {
    chars: Arc<[char]>,
    line_starts: Arc<[usize]>,
    stamp: u64,
}

impl Default for TextSnapshot {
    fn default() -> Self {
        Self::new("", 0)
    }
}

impl TextSnapshot {
    pub fn new(text: &str, stamp: u64) -> Self {
        let chars: Arc<[char]> = text.chars().collect();
        let mut line_starts = vec![0];
        for (i, ch) in chars.iter().enumerate() {
            if *ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            chars,
            line_starts: line_starts.into(),
            stamp,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line containing `offset`; offsets past the end map to the last line.
    pub fn line_number(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    pub fn line_start_offset(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len())
    }

    /// Offset of the line break ending `line` (or the document end).
    pub fn line_end_offset(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len(),
        }
    }
}

/// One run of the syntax highlighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightToken {
    pub start_offset: usize,
    pub end_offset: usize,
    pub foreground: Option<Color>,
}

impl HighlightToken {
    pub fn new(range: Range<usize>, foreground: Option<Color>) -> Self {
        Self {
            start_offset: range.start,
            end_offset: range.end,
            foreground,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldRegion {
    pub start_offset: usize,
    pub end_offset: usize,
    pub expanded: bool,
    /// Regions rendered as host widgets; the minimap never hides their text.
    pub custom: bool,
}

impl FoldRegion {
    pub fn collapsed(range: Range<usize>) -> Self {
        Self {
            start_offset: range.start,
            end_offset: range.end,
            expanded: false,
            custom: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start_offset <= self.end_offset
    }

    /// Whether this region hides text and shifts later rows up.
    pub fn contracts_lines(&self) -> bool {
        !self.expanded && !self.custom && self.is_valid()
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextAttributes {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    /// Marks attributes that suppress lower layers instead of painting.
    pub erase_marker: bool,
}

impl TextAttributes {
    pub const ERASE_MARKER: TextAttributes = TextAttributes {
        foreground: None,
        background: None,
        erase_marker: true,
    };

    pub fn with_foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    pub fn with_background(color: Color) -> Self {
        Self {
            background: Some(color),
            ..Default::default()
        }
    }
}

/// Which overlay a markup highlighter feeds, besides text color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    #[default]
    Text,
    Vcs,
    ErrorStripe,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupHighlighter {
    pub id: u64,
    pub start_offset: usize,
    pub end_offset: usize,
    pub layer: i32,
    pub attributes: Option<TextAttributes>,
    pub error_stripe_color: Option<Color>,
    pub kind: MarkupKind,
    pub valid: bool,
}

impl MarkupHighlighter {
    pub fn new(id: u64, range: Range<usize>, layer: i32, attributes: TextAttributes, kind: MarkupKind) -> Self {
        Self {
            id,
            start_offset: range.start,
            end_offset: range.end,
            layer,
            attributes: Some(attributes),
            error_stripe_color: None,
            kind,
            valid: true,
        }
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start_offset <= end && start <= self.end_offset
    }

    /// Whether this highlighter takes part in color resolution.
    pub fn is_colorable(&self) -> bool {
        self.valid && self.attributes != Some(TextAttributes::ERASE_MARKER)
    }

    /// Color used for stripes: stripe color, then background, then foreground.
    pub fn stripe_color(&self) -> Option<Color> {
        self.error_stripe_color
            .or_else(|| self.attributes.and_then(|a| a.background))
            .or_else(|| self.attributes.and_then(|a| a.foreground))
    }

    /// Priority order: higher layer first; on equal layers, highlighters
    /// defining a foreground come before those that do not, then the
    /// narrower range, then the more recently created one.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        let has_fg = |h: &Self| h.attributes.and_then(|a| a.foreground).is_some();
        let span = |h: &Self| h.end_offset.saturating_sub(h.start_offset);
        other
            .layer
            .cmp(&self.layer)
            .then_with(|| has_fg(other).cmp(&has_fg(self)))
            .then_with(|| span(self).cmp(&span(other)))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Current selections; block selection yields one range per caret.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub ranges: Vec<Range<usize>>,
    pub caret_offset: usize,
}

impl SelectionState {
    pub fn caret(offset: usize) -> Self {
        Self {
            ranges: Vec::new(),
            caret_offset: offset,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.ranges.iter().any(|r| r.start != r.end)
    }
}

pub trait TextBuffer {
    fn text(&self) -> TextSnapshot;
}

pub trait Highlighter {
    /// Tokens in offset order starting at the token containing `from`.
    fn tokens(&self, from: usize) -> Box<dyn Iterator<Item = HighlightToken> + '_>;
    fn default_foreground(&self) -> Color;
}

pub trait FoldingModel {
    fn fold_regions(&self) -> Vec<FoldRegion>;
}

pub trait MarkupModel {
    /// All highlighters whose range touches `[start, end]`.
    fn highlighters_overlapping(&self, start: usize, end: usize) -> Vec<MarkupHighlighter>;
}

pub trait ViewportModel {
    /// Visible area in editor pixels.
    fn visible_area(&self) -> Rectangle;
    fn line_height(&self) -> i32;
    /// Width of the component the panel lives in.
    fn container_width(&self) -> i32;
    fn scroll_to(&self, y: i32);
}

pub trait SelectionModel {
    fn selection(&self) -> SelectionState;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Events the panel reacts to. Hosts dispatch on their UI thread.
pub trait EditorListener: Send + Sync {
    fn document_changed(&self);
    fn fold_changed(&self);
    fn visible_area_changed(&self, area: Rectangle);
    fn selection_changed(&self);
    fn component_resized(&self);
}

pub trait EditorHost: TextBuffer + Highlighter + FoldingModel + MarkupModel + ViewportModel + SelectionModel + Send + Sync {
    fn subscribe(&self, listener: Arc<dyn EditorListener>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
    fn request_repaint(&self);
    fn is_disposed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_mapping() {
        let text = TextSnapshot::new("ab\ncd\n\nx", 1);
        assert_eq!(text.line_count(), 4);
        assert_eq!(text.line_number(0), 0);
        assert_eq!(text.line_number(2), 0);
        assert_eq!(text.line_number(3), 1);
        assert_eq!(text.line_number(6), 2);
        assert_eq!(text.line_number(100), 3);
        assert_eq!(text.line_start_offset(3), 7);
        assert_eq!(text.line_end_offset(0), 2);
        assert_eq!(text.line_end_offset(3), 8);
    }

    #[test]
    fn test_priority_prefers_higher_layer() {
        let low = MarkupHighlighter::new(1, 0..4, 1, TextAttributes::with_foreground(Color::new(1, 1, 1)), MarkupKind::Text);
        let high = MarkupHighlighter::new(2, 0..4, 5, TextAttributes::with_foreground(Color::new(2, 2, 2)), MarkupKind::Text);
        let mut list = vec![low.clone(), high.clone()];
        list.sort_by(MarkupHighlighter::priority_cmp);
        assert_eq!(list[0], high);
    }

    #[test]
    fn test_fold_contracts() {
        assert!(FoldRegion::collapsed(1..5).contracts_lines());
        assert!(!FoldRegion { custom: true, ..FoldRegion::collapsed(1..5) }.contracts_lines());
        assert!(!FoldRegion { expanded: true, ..FoldRegion::collapsed(1..5) }.contracts_lines());
        assert!(!FoldRegion::collapsed(5..1).contracts_lines());
    }
}
