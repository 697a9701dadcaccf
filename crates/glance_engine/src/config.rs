//! Minimap settings
//!
//! The host owns persistence; this module only describes the values the engine
//! consumes and how they round-trip through TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Color, GlanceError, Result};

/// Smallest and largest supported minimap row height in pixels.
pub const MIN_PIXELS_PER_LINE: i32 = 1;
pub const MAX_PIXELS_PER_LINE: i32 = 4;

/// Documents longer than this (in chars) are not rendered at all.
pub const DEFAULT_MAX_DOCUMENT_LENGTH: usize = 2_560_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlanceConfig {
    pub disabled: bool,
    pub pixels_per_line: i32,
    /// Panel width in pixels.
    pub width: i32,
    /// `true` selects the char class renderer, `false` the ink coverage one.
    pub clean: bool,
    pub min_line_count: usize,
    pub min_window_width: i32,
    pub alignment: Alignment,
    pub hide_original_scrollbar: bool,
    pub jump_on_mouse_down: bool,
    pub percentage_based_click: bool,
    /// `RRGGBB` hex, used for the viewport thumb.
    pub viewport_color: String,
    pub max_document_length: usize,
    pub render_threads: usize,
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            pixels_per_line: 3,
            width: 110,
            clean: true,
            min_line_count: 1,
            min_window_width: 0,
            alignment: Alignment::Right,
            hide_original_scrollbar: false,
            jump_on_mouse_down: true,
            percentage_based_click: false,
            viewport_color: "A0A0A0".to_string(),
            max_document_length: DEFAULT_MAX_DOCUMENT_LENGTH,
            render_threads: 1,
        }
    }
}

impl GlanceConfig {
    /// Parses a TOML document; missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: GlanceConfig = toml::from_str(text)?;
        config.validate();
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| GlanceError::read_config(path, err.to_string()))?;
        Self::from_toml(&text)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Clamps out of range values, logging what was changed.
    pub fn validate(&mut self) {
        let ppl = self.pixels_per_line.clamp(MIN_PIXELS_PER_LINE, MAX_PIXELS_PER_LINE);
        if ppl != self.pixels_per_line {
            log::warn!("pixels_per_line {} out of range, using {}", self.pixels_per_line, ppl);
            self.pixels_per_line = ppl;
        }
        if self.width < 1 {
            log::warn!("minimap width {} is invalid, using default", self.width);
            self.width = GlanceConfig::default().width;
        }
        if self.render_threads == 0 {
            self.render_threads = 1;
        }
        if Color::from_hex(&self.viewport_color).is_err() {
            log::warn!("invalid viewport color '{}', using default", self.viewport_color);
            self.viewport_color = GlanceConfig::default().viewport_color;
        }
    }

    pub fn viewport_color(&self) -> Color {
        Color::from_hex(&self.viewport_color).unwrap_or(Color::new(0xA0, 0xA0, 0xA0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GlanceConfig::from_toml("width = 80\nclean = false\n").unwrap();
        assert_eq!(config.width, 80);
        assert!(!config.clean);
        assert_eq!(config.pixels_per_line, 3);
        assert_eq!(config.alignment, Alignment::Right);
    }

    #[test]
    fn test_validate_clamps() {
        let config = GlanceConfig::from_toml("pixels_per_line = 9\nviewport_color = \"zz\"\nrender_threads = 0\n").unwrap();
        assert_eq!(config.pixels_per_line, MAX_PIXELS_PER_LINE);
        assert_eq!(config.viewport_color, "A0A0A0");
        assert_eq!(config.render_threads, 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = GlanceConfig {
            alignment: Alignment::Left,
            min_line_count: 5,
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(GlanceConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_error() {
        assert!(matches!(GlanceConfig::from_toml("width = \"wide\""), Err(GlanceError::ConfigParse(_))));
    }
}
