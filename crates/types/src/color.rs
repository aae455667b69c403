use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB color as carried by the `color` and `background-color` properties.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value }
    }

    /// Relative luminance on a 0..=255 scale (Rec. 601 weights, integer math).
    pub fn luminance(&self) -> u8 {
        let l = (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000;
        l as u8
    }

    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.g == self.b
    }

    fn named(name: &str) -> Option<Color> {
        let c = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "gray" | "grey" => Color::gray(128),
            "silver" => Color::gray(192),
            "maroon" => Color::rgb(128, 0, 0),
            "navy" => Color::rgb(0, 0, 128),
            "yellow" => Color::rgb(255, 255, 0),
            _ => return None,
        };
        Some(c)
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    fn parse_hex(hex: &str) -> Result<Color, String> {
        let component = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|e| format!("Invalid color component '{}': {}", s, e))
        };
        match hex.len() {
            3 => Ok(Color {
                r: component(&hex[0..1].repeat(2))?,
                g: component(&hex[1..2].repeat(2))?,
                b: component(&hex[2..3].repeat(2))?,
            }),
            6 => Ok(Color {
                r: component(&hex[0..2])?,
                g: component(&hex[2..4])?,
                b: component(&hex[4..6])?,
            }),
            n => Err(format!("Invalid hex color length: expected 3 or 6, got {}", n)),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some(hex) if hex.is_ascii() => Self::parse_hex(hex),
            Some(_) => Err(format!("Invalid hex color: {}", s)),
            None => Self::named(s).ok_or_else(|| format!("Unknown color: {}", s)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => s.parse().map_err(de::Error::custom),
            ColorDef::Map { r, g, b } => Ok(Color { r, g, b }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!("#f00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!("#0080ff".parse::<Color>().unwrap(), Color::rgb(0, 128, 255));
        assert!("#12".parse::<Color>().is_err());
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!("Navy".parse::<Color>().unwrap(), Color::rgb(0, 0, 128));
        assert!("octarine".parse::<Color>().is_err());
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(Color::BLACK.luminance(), 0);
        assert_eq!(Color::WHITE.luminance(), 255);
        assert_eq!(Color::gray(77).luminance(), 77);
    }
}
