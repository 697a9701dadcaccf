//! Live markers drawn over the minimap on every paint.
//!
//! Nothing here touches the rendered bitmap; ranges are mapped to panel
//! rectangles through the fold layout of the current text and filled
//! directly on the paint target.

use crate::fold_layout::FoldLayout;
use crate::host::{MarkupHighlighter, MarkupKind, SelectionState, TextSnapshot};
use crate::{Bitmap, Color, Rectangle};

/// Narrowest marker, in pixels, for short single-row ranges.
pub const MIN_GAP: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    pub selection: Color,
    pub caret_line: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            selection: Color::new(0x21, 0x42, 0x83),
            caret_line: Color::rgba(0x52, 0x52, 0x52, 0xC0),
        }
    }
}

/// Everything needed to map document offsets into panel coordinates.
pub struct OverlayContext<'a> {
    pub text: &'a TextSnapshot,
    pub layout: &'a FoldLayout,
    pub pixels_per_line: i32,
    /// Panel width in pixels.
    pub width: i32,
    /// First bitmap row shown at panel y = 0.
    pub visible_start: i32,
}

impl OverlayContext<'_> {
    fn row_y(&self, offset: usize) -> i32 {
        self.layout.visual_line(self.text, offset) as i32 * self.pixels_per_line - self.visible_start
    }

    /// Rectangles covering `[start, end]` in panel coordinates.
    ///
    /// With `widen` set, a single-row range narrower than [`MIN_GAP`] grows to
    /// `MIN_GAP`, moving left when it would leave the panel. A range ending at
    /// the very start of a row stops at the end of the previous row.
    pub fn range_rects(&self, start: usize, end: usize, widen: bool) -> Vec<Rectangle> {
        let ppl = self.pixels_per_line;
        let width = self.width;
        let end = end.max(start);

        let start_col = self.layout.visual_column(self.text, start);
        let end_col = self.layout.visual_column(self.text, end);
        let sy = self.row_y(start);
        let mut ey = self.row_y(end);

        let mut sx = start_col.min(width - MIN_GAP).max(0);
        let mut ex = if start_col < width - MIN_GAP { end_col + 1 } else { width };
        if end_col == 0 && ey > sy {
            ey -= ppl;
            ex = width;
        }

        let mut rects = Vec::with_capacity(3);
        if self.layout.is_collapsed(start) {
            rects.push(Rectangle::from(0, sy, width / 2, ppl));
        } else if sy == ey {
            let gap = ex - sx;
            if widen && gap < MIN_GAP {
                ex += MIN_GAP - gap;
                if ex > width {
                    sx = (sx - (ex - width)).max(0);
                    ex = width;
                }
            }
            rects.push(Rectangle::from(sx, sy, ex.min(width) - sx, ppl));
        } else {
            rects.push(Rectangle::from(sx, sy, width - sx, ppl));
            if ey > sy + ppl {
                rects.push(Rectangle::from(0, sy + ppl, width, ey - sy - ppl));
            }
            rects.push(Rectangle::from(0, ey, ex.min(width), ppl));
        }
        rects.retain(|r| !r.is_empty());
        rects
    }

    pub fn caret_line_rect(&self, caret_offset: usize) -> Rectangle {
        Rectangle::from(0, self.row_y(caret_offset), self.width, self.pixels_per_line)
    }

    fn fill(&self, target: &mut Bitmap, rects: &[Rectangle], color: Color) {
        for rect in rects {
            target.fill_rect(*rect, color);
        }
    }
}

/// Selections, or the caret line when nothing is selected.
pub fn paint_selections(target: &mut Bitmap, ctx: &OverlayContext<'_>, selection: &SelectionState, style: &OverlayStyle) {
    if !selection.has_selection() {
        target.fill_rect(ctx.caret_line_rect(selection.caret_offset), style.caret_line);
        return;
    }
    for range in &selection.ranges {
        let rects = ctx.range_rects(range.start, range.end, true);
        ctx.fill(target, &rects, style.selection);
    }
}

/// Stripes for every highlighter of `kind`, colored by [`MarkupHighlighter::stripe_color`].
pub fn paint_markup(target: &mut Bitmap, ctx: &OverlayContext<'_>, highlighters: &[MarkupHighlighter], kind: MarkupKind) {
    let widen = kind != MarkupKind::Vcs;
    for h in highlighters.iter().filter(|h| h.kind == kind && h.valid) {
        let Some(color) = h.stripe_color() else {
            continue;
        };
        if h.start_offset > ctx.text.len() {
            continue;
        }
        let rects = ctx.range_rects(h.start_offset, h.end_offset.min(ctx.text.len()), widen);
        ctx.fill(target, &rects, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FoldRegion;

    fn ctx<'a>(text: &'a TextSnapshot, layout: &'a FoldLayout) -> OverlayContext<'a> {
        OverlayContext {
            text,
            layout,
            pixels_per_line: 2,
            width: 100,
            visible_start: 0,
        }
    }

    #[test]
    fn test_multi_row_range() {
        let text = TextSnapshot::new("abcdef\nghijkl\nmnopqr\nstu", 1);
        let layout = FoldLayout::default();
        let rects = ctx(&text, &layout).range_rects(2, 16, true);
        assert_eq!(
            rects,
            vec![
                Rectangle::from(2, 0, 98, 2),
                Rectangle::from(0, 2, 100, 2),
                Rectangle::from(0, 4, 3, 2)
            ]
        );
    }

    #[test]
    fn test_collapsed_start_draws_half_marker() {
        let text = TextSnapshot::new("a {\n b\n}\nc", 1);
        let layout = FoldLayout::new(&text, &[FoldRegion::collapsed(3..7)]);
        let rects = ctx(&text, &layout).range_rects(4, 5, true);
        assert_eq!(rects, vec![Rectangle::from(0, 0, 50, 2)]);
    }

    #[test]
    fn test_caret_line_spans_panel() {
        let text = TextSnapshot::new("a\nb\nc", 1);
        let layout = FoldLayout::default();
        let mut target = Bitmap::new(100, 10).unwrap();
        let style = OverlayStyle::default();
        paint_selections(&mut target, &ctx(&text, &layout), &SelectionState::caret(2), &style);
        assert_ne!(target.get_pixel(0, 2), Color::TRANSPARENT);
        assert_ne!(target.get_pixel(99, 3), Color::TRANSPARENT);
        assert_eq!(target.get_pixel(0, 0), Color::TRANSPARENT);
    }
}
