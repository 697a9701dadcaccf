//! Approximate ink coverage of a glyph's upper and lower half, 0-1.
//!
//! Hand tuned against a typical monospace font; only the shape matters
//! (blank glyphs are zero, anything printable has some ink).

/// `(top, bottom)` coverage for `ch`.
pub fn ink_weights(ch: char) -> (f32, f32) {
    match ch {
        c if c.is_whitespace() || c.is_control() => (0.0, 0.0),
        'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' => (0.5, 0.8),
        'g' | 'j' | 'p' | 'q' | 'y' => (0.3, 0.9),
        'i' => (0.2, 0.6),
        'a' | 'c' | 'e' | 'm' | 'n' | 'o' | 'r' | 's' | 'u' | 'v' | 'w' | 'x' | 'z' => (0.2, 0.8),
        'T' | 'Y' | 'P' | 'F' => (0.8, 0.5),
        'L' | 'J' => (0.4, 0.8),
        'A'..='Z' | '0'..='9' => (0.7, 0.7),
        '#' | '@' | '%' | '&' | '$' => (0.8, 0.8),
        '(' | ')' | '[' | ']' | '{' | '}' | '|' | '/' | '\\' | '<' | '>' | '!' | '?' => (0.5, 0.5),
        '=' | '+' => (0.3, 0.3),
        '-' | '~' => (0.2, 0.2),
        ':' | ';' => (0.2, 0.3),
        '\'' | '"' | '`' | '^' | '*' => (0.4, 0.0),
        '.' | ',' => (0.0, 0.3),
        '_' => (0.0, 0.5),
        _ => (0.4, 0.4),
    }
}

pub fn top_weight(ch: char) -> f32 {
    ink_weights(ch).0
}

pub fn bottom_weight(ch: char) -> f32 {
    ink_weights(ch).1
}

/// Weight used by the clean renderer, by character class only.
pub fn class_weight(ch: char) -> f32 {
    match ch as u32 {
        0..=32 => 0.0,
        33..=126 => 0.8,
        _ => 0.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_glyphs_have_no_ink() {
        for ch in [' ', '\t', '\n', '\r', '\u{0}', '\u{7f}', '\u{a0}'] {
            assert_eq!(ink_weights(ch), (0.0, 0.0), "{ch:?}");
        }
    }

    #[test]
    fn test_printable_glyphs_have_ink() {
        for ch in (33u8..=126).map(char::from).chain(['ä', 'λ', '→']) {
            let (top, bottom) = ink_weights(ch);
            assert!(top + bottom > 0.0, "{ch:?}");
            assert!((0.0..=1.0).contains(&top) && (0.0..=1.0).contains(&bottom));
        }
    }

    #[test]
    fn test_descenders_weigh_on_bottom() {
        assert!(bottom_weight('g') > top_weight('g'));
        assert!(top_weight('\'') > bottom_weight('\''));
    }

    #[test]
    fn test_class_weight() {
        assert_eq!(class_weight(' '), 0.0);
        assert_eq!(class_weight('x'), 0.8);
        assert_eq!(class_weight('λ'), 0.4);
    }
}
