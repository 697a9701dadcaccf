use std::fmt::Display;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{GlanceError, Result};

lazy_static::lazy_static! {
    static ref HEX_REGEX: Regex = Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$").unwrap();
}

/// Straight (non premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{Color: r={:02X}, g={:02X}, b={:02X}, a={:02X}}}", self.r, self.g, self.b, self.a)
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub fn get_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Same color with the alpha channel replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`GlanceError::InvalidHexColor`] if `hex` is not in one of those forms.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let Some(cap) = HEX_REGEX.captures(hex.trim()) else {
            return Err(GlanceError::InvalidHexColor { value: hex.to_string() });
        };
        let channel = |i: usize| cap.get(i).map(|m| u8::from_str_radix(m.as_str(), 16).unwrap_or(0xFF));
        Ok(Color::rgba(
            channel(1).unwrap_or(0),
            channel(2).unwrap_or(0),
            channel(3).unwrap_or(0),
            channel(4).unwrap_or(0xFF),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("A0A0A0").unwrap(), Color::new(0xA0, 0xA0, 0xA0));
        assert_eq!(Color::from_hex("#10203040").unwrap(), Color::rgba(0x10, 0x20, 0x30, 0x40));
        assert!(Color::from_hex("nope").is_err());
        assert!(Color::from_hex("A0A0A").is_err());
    }

    #[test]
    fn test_to_hex_roundtrip() {
        let c = Color::new(0x12, 0xAB, 0xEF);
        assert_eq!(Color::from_hex(&c.to_hex()).unwrap(), c);
    }
}
