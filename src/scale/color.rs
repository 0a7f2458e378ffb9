//! Color values for fills, legends and paint mappings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Neutral placeholder for counties without data (#ccc).
    pub const UNKNOWN: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

    /// Channel-wise linear interpolation; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb { r: mix(self.r, other.r), g: mix(self.g, other.g), b: mix(self.b, other.b) }
    }

    pub fn to_hex(&self) -> String { format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b) }
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rgb` or `#rrggbb` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) { return Err(err()) }

        let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Ok(Rgb::new(r * 17, g * 17, b * 17))
            }
            6 => Ok(Rgb::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self { color.to_hex() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_long_and_short_hex() {
        assert_eq!("#0015BC".parse::<Rgb>().unwrap(), Rgb::new(0x00, 0x15, 0xbc));
        assert_eq!("#ccc".parse::<Rgb>().unwrap(), Rgb::UNKNOWN);
        assert_eq!(" #e8e8e8 ".parse::<Rgb>().unwrap(), Rgb::new(232, 232, 232));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("0015BC".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("#".parse::<Rgb>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::new(0xDC, 0x14, 0x3C).to_string(), "#dc143c");
        assert_eq!(Rgb::UNKNOWN.to_hex(), "#cccccc");
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(a.lerp(b, 7.0), b);
        assert_eq!(a.lerp(b, f64::NAN), a);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let color: Rgb = serde_json::from_str("\"#6B8DD6\"").unwrap();
        assert_eq!(color, Rgb::new(0x6b, 0x8d, 0xd6));
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#6b8dd6\"");
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
