//! Geometry shared by paint and scrollbar handling.
//!
//! Two coordinate spaces meet here: editor pixels (the host's visible area)
//! and minimap pixels (rows of the rendered bitmap, `pixels_per_line` per
//! visual line). All recomputation is O(1).

use crate::{GlanceConfig, Rectangle};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Minimap pixels per editor pixel.
    pub scale: f64,
    pub document_width: i32,
    /// Height of the whole document in minimap pixels.
    pub document_height: i32,
    /// Bitmap rows `[visible_start, visible_end)` are shown in the panel.
    pub visible_start: i32,
    pub visible_end: i32,
    /// Editor viewport expressed in minimap pixels.
    pub viewport_start: i32,
    pub viewport_height: i32,
    /// Rows of panel actually covered by document.
    pub draw_height: i32,
    /// Panel height in pixels.
    pub panel_height: i32,
    panel_height_override: Option<i32>,
    /// Last editor visible area seen.
    pub editor_area: Rectangle,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_dimensions(&mut self, visual_line_count: usize, line_height: i32, config: &GlanceConfig) {
        self.document_width = config.width;
        self.document_height = (visual_line_count as i64 * config.pixels_per_line as i64).min(i32::MAX as i64) as i32;
        self.scale = config.pixels_per_line as f64 / line_height.max(1) as f64;
    }

    /// By default the panel is as tall as the editor viewport it sits beside.
    pub fn set_panel_height(&mut self, height: Option<i32>) {
        self.panel_height_override = height.map(|h| h.max(0));
    }

    pub fn recompute_visible(&mut self, visible_area: Rectangle) {
        self.editor_area = visible_area;
        self.panel_height = self.panel_height_override.unwrap_or(visible_area.get_height()).max(0);

        self.viewport_start = (visible_area.top() as f64 * self.scale) as i32;
        self.viewport_height = (visible_area.get_height() as f64 * self.scale) as i32;
        self.draw_height = self.panel_height.min(self.document_height);

        let travel = (self.document_height - self.viewport_height + 1) as f64;
        self.visible_start = if travel > 0.0 {
            (self.viewport_start as f64 * (self.document_height - self.panel_height + 1) as f64 / travel) as i32
        } else {
            0
        }
        .max(0);
        self.visible_end = self.visible_start + self.draw_height;
    }

    pub fn viewport_end(&self) -> i32 {
        self.viewport_start + self.viewport_height
    }

    /// Viewport rectangle in panel coordinates.
    pub fn thumb_rect(&self, panel_width: i32) -> Rectangle {
        Rectangle::from(0, self.viewport_start - self.visible_start, panel_width, self.viewport_height)
    }

    /// Editor scroll offset that puts the thumb top at `thumb_top` (panel px).
    pub fn scroll_offset_for_thumb(&self, thumb_top: i32) -> i32 {
        let thumb_top = thumb_top.max(0) as f64;
        let viewport_start = if self.document_height <= self.panel_height {
            thumb_top
        } else {
            // visible_start moves at `follow` times the viewport speed
            let follow = (self.document_height - self.panel_height + 1) as f64 / (self.document_height - self.viewport_height + 1).max(1) as f64;
            let free = 1.0 - follow;
            if free <= f64::EPSILON {
                thumb_top * self.document_height as f64 / self.draw_height.max(1) as f64
            } else {
                thumb_top / free
            }
        };
        self.to_editor(viewport_start)
    }

    /// Editor scroll offset for a click at panel row `y`.
    pub fn scroll_offset_for_click(&self, y: i32, percentage_based: bool) -> i32 {
        if percentage_based {
            let ratio = (y as f64 / self.draw_height.max(1) as f64).clamp(0.0, 1.0);
            let scrollable = (self.document_height - self.viewport_height).max(0) as f64;
            return self.to_editor(ratio * scrollable);
        }
        let target = self.visible_start as f64 + y as f64 - self.viewport_height as f64 / 2.0;
        self.to_editor(target.max(0.0))
    }

    fn to_editor(&self, minimap_y: f64) -> i32 {
        if self.scale <= 0.0 {
            return 0;
        }
        (minimap_y / self.scale).round() as i32
    }
}
