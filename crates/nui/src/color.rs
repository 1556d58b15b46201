//! RGBA colors for the two reserved style properties (`color` and
//! `background-color`), which bypass the layout engine entirely.

use std::fmt;
use std::str::FromStr;

/// An sRGB color with components in the `0.0..=1.0` range.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid color string {0:?}")]
pub struct ParseColorError(pub String);

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn transparent() -> Self {
        Color::rgba(0.0, 0.0, 0.0, 0.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            to_byte(self.a),
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b),
        )
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `#RGB`, `#RRGGBB` and `#AARRGGBB` hexadecimal notations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        // Digits are validated above, so the radix parses cannot fail.
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).unwrap_or(0) as f32 / 15.0;
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0) as f32 / 255.0;
        match hex.len() {
            3 => Ok(Color::rgb(nibble(0), nibble(1), nibble(2))),
            6 => Ok(Color::rgb(byte(0), byte(2), byte(4))),
            8 => Ok(Color::rgba(byte(2), byte(4), byte(6), byte(0))),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_notations() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::rgb(1.0, 1.0, 1.0));
        assert_eq!(
            "#FF0000".parse::<Color>().unwrap(),
            Color::rgb(1.0, 0.0, 0.0)
        );
        let argb = "#80FF0000".parse::<Color>().unwrap();
        assert_eq!(argb.r, 1.0);
        assert!((argb.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGHHII".parse::<Color>().is_err());
    }
}
