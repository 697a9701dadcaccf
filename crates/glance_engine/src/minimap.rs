//! Rasterizer: one forward pass over the highlighter tokens into a bitmap.
//!
//! Each visual line owns `pixels_per_line` bitmap rows, each column one
//! pixel. Collapsed folds are jumped over and pull everything below them up.

use crate::fold_layout::{CollapsedFold, FoldLayout, TAB_WIDTH};
use crate::glyph_weights::{bottom_weight, class_weight, top_weight};
use crate::host::{EditorHost, TextSnapshot};
use crate::{Bitmap, CancelToken, Color, GlanceConfig, Result, ScrollState, MAX_PIXELS_PER_LINE, MIN_PIXELS_PER_LINE};

/// Extra visual lines allocated whenever the bitmap has to grow.
pub const GROWTH_SLACK_LINES: i32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed,
    /// Stopped at a checkpoint; the bitmap is partially written.
    Canceled,
    /// A token pointed past the end of the text; the pass stopped there.
    Truncated,
}

#[derive(Default)]
pub struct Minimap {
    bitmap: Bitmap,
}

impl Minimap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Drops the bitmap; the next render allocates a fresh one.
    pub fn release(&mut self) {
        self.bitmap = Bitmap::default();
    }

    /// Grows the bitmap if it is smaller than `width` x `height`. Never shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GlanceError::Allocation`] if the new bitmap cannot be allocated.
    pub fn ensure_capacity(&mut self, width: i32, height: i32, pixels_per_line: i32) -> Result<()> {
        if self.bitmap.fits(width, height) {
            return Ok(());
        }
        let width = width.max(self.bitmap.width());
        let height = height + GROWTH_SLACK_LINES * pixels_per_line;
        log::debug!("minimap: growing bitmap to {width}x{height}");
        self.bitmap = Bitmap::new(width, height)?;
        Ok(())
    }

    /// Rasterizes the whole document into the bitmap.
    ///
    /// # Errors
    ///
    /// Only fails when the bitmap cannot be grown. Stale host data never
    /// yields an error; the pass ends early and the next render repairs it.
    pub fn render(&mut self, host: &dyn EditorHost, config: &GlanceConfig, scroll_state: &ScrollState, cancel: &CancelToken) -> Result<RenderOutcome> {
        let text = host.text();
        let layout = FoldLayout::new(&text, &host.fold_regions());
        let ppl = config.pixels_per_line.clamp(MIN_PIXELS_PER_LINE, MAX_PIXELS_PER_LINE);
        let rows = layout.visual_line_count(&text) as i32 * ppl;
        self.ensure_capacity(config.width.max(scroll_state.document_width), rows.max(scroll_state.document_height), ppl)?;
        self.bitmap.clear();

        let painter = GlyphPainter {
            pixels_per_line: ppl,
            clean: config.clean,
            default_foreground: host.default_foreground(),
        };
        let mut pass = Pass::new(&text, layout.folds(), ppl);

        for token in host.tokens(0) {
            if cancel.is_cancelled() {
                log::debug!("minimap: render canceled at offset {}", pass.offset);
                return Ok(RenderOutcome::Canceled);
            }
            if token.end_offset > text.len() {
                log::warn!("minimap: token {}..{} past text end {}, stopping", token.start_offset, token.end_offset, text.len());
                return Ok(RenderOutcome::Truncated);
            }
            if token.end_offset <= pass.offset {
                continue;
            }
            if token.start_offset > pass.offset {
                pass.prewalk(token.start_offset, self.bitmap.width());
            }
            let bitmap = &mut self.bitmap;
            pass.walk(token.end_offset, |offset, ch, x, y| {
                if x >= bitmap.width() || y + ppl >= bitmap.height() {
                    return;
                }
                let color = token.foreground.unwrap_or_else(|| painter.markup_color(host, offset));
                painter.plot(bitmap, x, y, ch, color);
            });
        }
        log::debug!("minimap: rendered {} rows, {} lines folded", pass.y / ppl + 1, pass.folded_lines);
        Ok(RenderOutcome::Completed)
    }
}

/// Cursor of the single forward pass.
struct Pass<'a> {
    text: &'a TextSnapshot,
    folds: &'a [CollapsedFold],
    next_fold: usize,
    offset: usize,
    x: i32,
    /// Top bitmap row of the current visual line.
    y: i32,
    folded_lines: usize,
    ppl: i32,
}

impl<'a> Pass<'a> {
    fn new(text: &'a TextSnapshot, folds: &'a [CollapsedFold], ppl: i32) -> Self {
        Self {
            text,
            folds,
            next_fold: 0,
            offset: 0,
            x: 0,
            y: 0,
            folded_lines: 0,
            ppl,
        }
    }

    /// Jumps over a fold starting at or before the cursor.
    fn skip_fold(&mut self) -> bool {
        while let Some(fold) = self.folds.get(self.next_fold) {
            if fold.end_offset <= self.offset {
                self.next_fold += 1;
                continue;
            }
            if fold.start_offset > self.offset {
                return false;
            }
            self.folded_lines += fold.hidden_lines();
            self.offset = fold.end_offset;
            self.next_fold += 1;
            return true;
        }
        false
    }

    fn step(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.x = 0;
                self.y += self.ppl;
            }
            '\t' => self.x += TAB_WIDTH,
            _ => self.x += 1,
        }
        self.offset += 1;
    }

    /// Advances to `until` without drawing. Once a line runs past `width`
    /// the rest of it is skipped instead of counted.
    fn prewalk(&mut self, until: usize, width: i32) {
        while self.offset < until {
            if self.skip_fold() {
                continue;
            }
            if self.x > width {
                let mut next = self.text.line_end_offset(self.text.line_number(self.offset)).min(until);
                if let Some(fold) = self.folds.get(self.next_fold) {
                    next = next.min(fold.start_offset.max(self.offset));
                }
                if next > self.offset {
                    self.offset = next;
                    continue;
                }
            }
            match self.text.char_at(self.offset) {
                Some(ch) => self.step(ch),
                None => break,
            }
        }
    }

    /// Advances to `until`, calling `plot(offset, ch, x, y)` for each visible char.
    fn walk(&mut self, until: usize, mut plot: impl FnMut(usize, char, i32, i32)) {
        while self.offset < until {
            if self.skip_fold() {
                continue;
            }
            let Some(ch) = self.text.char_at(self.offset) else {
                break;
            };
            if ch != '\n' && ch != '\t' {
                plot(self.offset, ch, self.x, self.y);
            }
            self.step(ch);
        }
    }
}

struct GlyphPainter {
    pixels_per_line: i32,
    clean: bool,
    default_foreground: Color,
}

impl GlyphPainter {
    /// Foreground of the highest priority markup touching `[offset - 1, offset]`.
    fn markup_color(&self, markup: &dyn EditorHost, offset: usize) -> Color {
        let mut list: Vec<_> = markup
            .highlighters_overlapping(offset.saturating_sub(1), offset)
            .into_iter()
            .filter(|h| h.is_colorable())
            .collect();
        list.sort_by(|a, b| a.priority_cmp(b));
        list.iter()
            .find_map(|h| h.attributes.and_then(|a| a.foreground))
            .unwrap_or(self.default_foreground)
    }

    fn plot(&self, bitmap: &mut Bitmap, x: i32, y: i32, ch: char, color: Color) {
        if self.clean {
            self.plot_clean(bitmap, x, y, ch, color);
        } else {
            self.plot_accurate(bitmap, x, y, ch, color);
        }
    }

    fn plot_clean(&self, bitmap: &mut Bitmap, x: i32, y: i32, ch: char, color: Color) {
        let weight = class_weight(ch);
        if weight == 0.0 {
            return;
        }
        match self.pixels_per_line {
            1 => bitmap.set_pixel(x, y, color, weight * 0.6),
            2 => {
                bitmap.set_pixel(x, y, color, weight * 0.3);
                bitmap.set_pixel(x, y + 1, color, weight * 0.6);
            }
            3 => {
                bitmap.set_pixel(x, y, color, weight * 0.1);
                bitmap.set_pixel(x, y + 1, color, weight * 0.6);
                bitmap.set_pixel(x, y + 2, color, weight * 0.6);
            }
            _ => {
                bitmap.set_pixel(x, y + 1, color, weight * 0.6);
                bitmap.set_pixel(x, y + 2, color, weight * 0.6);
                bitmap.set_pixel(x, y + 3, color, weight * 0.6);
            }
        }
    }

    fn plot_accurate(&self, bitmap: &mut Bitmap, x: i32, y: i32, ch: char, color: Color) {
        let top = top_weight(ch);
        let bottom = bottom_weight(ch);
        if top == 0.0 && bottom == 0.0 {
            return;
        }
        let mid = (top + bottom) / 2.0;
        match self.pixels_per_line {
            1 => bitmap.set_pixel(x, y, color, mid),
            2 => {
                bitmap.set_pixel(x, y, color, top * 0.5);
                bitmap.set_pixel(x, y + 1, color, bottom);
            }
            3 => {
                bitmap.set_pixel(x, y, color, top * 0.3);
                bitmap.set_pixel(x, y + 1, color, mid);
                bitmap.set_pixel(x, y + 2, color, bottom * 0.7);
            }
            _ => {
                bitmap.set_pixel(x, y + 1, color, top);
                bitmap.set_pixel(x, y + 2, color, mid);
                bitmap.set_pixel(x, y + 3, color, bottom);
            }
        }
    }
}
