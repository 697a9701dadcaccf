//! Viewport thumb drawn over the minimap and the mouse handling behind it.

use crate::{Bitmap, Color, GlanceConfig, ScrollState};

const IDLE_ALPHA: u8 = 0x40;
const HOVER_ALPHA: u8 = 0x60;
const DRAG_ALPHA: u8 = 0x80;

/// Pointer interaction with the minimap panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollbarState {
    /// Whether the pointer is over the viewport thumb
    pub is_hovered: bool,
    /// Whether the thumb is being dragged
    pub is_dragging: bool,
    drag_start_y: i32,
    drag_start_thumb_top: i32,
}

impl ScrollbarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press at panel row `y`. Returns the editor scroll offset to apply, if any.
    ///
    /// Pressing the thumb starts a drag. Pressing elsewhere jumps there when
    /// `jump_on_mouse_down` is set and then drags from the new position.
    pub fn mouse_pressed(&mut self, y: i32, scroll_state: &ScrollState, config: &GlanceConfig) -> Option<i32> {
        let thumb = scroll_state.thumb_rect(config.width);
        if y >= thumb.top() && y < thumb.bottom() {
            self.begin_drag(y, thumb.top());
            return None;
        }
        if !config.jump_on_mouse_down {
            return None;
        }
        let offset = scroll_state.scroll_offset_for_click(y, config.percentage_based_click);
        let mut jumped = scroll_state.clone();
        jumped.recompute_visible(crate::Rectangle::from(
            scroll_state.editor_area.left(),
            offset,
            scroll_state.editor_area.get_width(),
            scroll_state.editor_area.get_height(),
        ));
        self.begin_drag(y, jumped.viewport_start - jumped.visible_start);
        Some(offset)
    }

    /// Pointer moved to panel row `y`; returns a scroll offset while dragging.
    pub fn mouse_moved(&mut self, y: i32, scroll_state: &ScrollState, panel_width: i32) -> Option<i32> {
        if self.is_dragging {
            let thumb_top = self.drag_start_thumb_top + (y - self.drag_start_y);
            return Some(scroll_state.scroll_offset_for_thumb(thumb_top));
        }
        let thumb = scroll_state.thumb_rect(panel_width);
        self.is_hovered = y >= thumb.top() && y < thumb.bottom();
        None
    }

    pub fn mouse_released(&mut self) {
        self.is_dragging = false;
    }

    pub fn mouse_exited(&mut self) {
        if !self.is_dragging {
            self.is_hovered = false;
        }
    }

    /// Wheel events scroll the editor as if they happened over it.
    pub fn mouse_wheel(&self, delta_y: i32, scroll_state: &ScrollState) -> i32 {
        (scroll_state.editor_area.top() + delta_y).max(0)
    }

    fn begin_drag(&mut self, y: i32, thumb_top: i32) {
        self.is_dragging = true;
        self.is_hovered = true;
        self.drag_start_y = y;
        self.drag_start_thumb_top = thumb_top;
    }

    pub fn thumb_color(&self, base: Color) -> Color {
        let alpha = if self.is_dragging {
            DRAG_ALPHA
        } else if self.is_hovered {
            HOVER_ALPHA
        } else {
            IDLE_ALPHA
        };
        base.with_alpha(alpha)
    }

    pub fn paint(&self, target: &mut Bitmap, scroll_state: &ScrollState, config: &GlanceConfig) {
        let thumb = scroll_state.thumb_rect(config.width);
        target.fill_rect(thumb, self.thumb_color(config.viewport_color()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rectangle;

    fn state() -> ScrollState {
        let mut config = GlanceConfig::default();
        config.pixels_per_line = 2;
        let mut s = ScrollState::new();
        s.compute_dimensions(200, 2, &config);
        s.set_panel_height(Some(60));
        s.recompute_visible(Rectangle::from(0, 100, 400, 60));
        s
    }

    #[test]
    fn test_press_on_thumb_starts_drag() {
        let s = state();
        let mut bar = ScrollbarState::new();
        let thumb = s.thumb_rect(110);
        assert_eq!(bar.mouse_pressed(thumb.top() + 1, &s, &GlanceConfig::default()), None);
        assert!(bar.is_dragging);
        assert!(bar.mouse_moved(thumb.top() + 5, &s, 110).is_some());
        bar.mouse_released();
        assert!(!bar.is_dragging);
    }

    #[test]
    fn test_press_without_jump_is_ignored() {
        let s = state();
        let mut bar = ScrollbarState::new();
        let config = GlanceConfig {
            jump_on_mouse_down: false,
            ..Default::default()
        };
        let outside = if s.thumb_rect(110).top() > 0 { 0 } else { s.thumb_rect(110).bottom() + 1 };
        assert_eq!(bar.mouse_pressed(outside, &s, &config), None);
        assert!(!bar.is_dragging);
    }

    #[test]
    fn test_hover_alpha() {
        let mut bar = ScrollbarState::new();
        let base = Color::new(0xA0, 0xA0, 0xA0);
        assert_eq!(bar.thumb_color(base).a, IDLE_ALPHA);
        bar.is_hovered = true;
        assert_eq!(bar.thumb_color(base).a, HOVER_ALPHA);
    }
}
