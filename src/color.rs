use crate::error::{GbResult, GridboardError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SAME_COLOR_EPS: f32 = 1e-4;

/// Linear 0..1 color. Alpha is parsed but ignored by every comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::opaque(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::opaque(1.0, 0.0, 0.0);

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA` (leading `#` optional).
    pub fn parse_hex(text: &str) -> GbResult<Self> {
        let s = text.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(bad_hex(text));
        }

        let channel = |hex: &str| -> GbResult<f32> {
            u8::from_str_radix(hex, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| bad_hex(text))
        };

        match s.len() {
            3 => {
                let mut out = [0.0f32; 3];
                for (i, ch) in s.chars().enumerate() {
                    let doubled: String = [ch, ch].iter().collect();
                    out[i] = channel(&doubled)?;
                }
                Ok(Rgb::opaque(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(&s[0..2])?;
                let g = channel(&s[2..4])?;
                let b = channel(&s[4..6])?;
                let a = if s.len() == 8 { channel(&s[6..8])? } else { 1.0 };
                Ok(Rgb { r, g, b, a })
            }
            _ => Err(bad_hex(text)),
        }
    }

    /// Uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", q(self.r), q(self.g), q(self.b))
    }

    /// Per-channel comparison of RGB, alpha ignored.
    pub fn same_color(&self, other: &Rgb) -> bool {
        (self.r - other.r).abs() <= SAME_COLOR_EPS
            && (self.g - other.g).abs() <= SAME_COLOR_EPS
            && (self.b - other.b).abs() <= SAME_COLOR_EPS
    }

    /// Sum of absolute per-channel differences (0..3).
    pub fn channel_distance(&self, other: &Rgb) -> f32 {
        (self.r - other.r).abs() + (self.g - other.g).abs() + (self.b - other.b).abs()
    }

    /// WCAG relative luminance.
    pub fn relative_luminance(&self) -> f32 {
        fn lin(x: f32) -> f32 {
            if x <= 0.03928 {
                x / 12.92
            } else {
                ((x + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * lin(self.r) + 0.7152 * lin(self.g) + 0.0722 * lin(self.b)
    }

    /// WCAG contrast ratio, 1..21.
    pub fn contrast(&self, other: &Rgb) -> f32 {
        let mut l1 = self.relative_luminance();
        let mut l2 = other.relative_luminance();
        if l1 < l2 {
            std::mem::swap(&mut l1, &mut l2);
        }
        (l1 + 0.05) / (l2 + 0.05)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

fn bad_hex(text: &str) -> GridboardError {
    GridboardError::Validation(format!("Invalid hex color '{}'", text))
}

impl FromStr for Rgb {
    type Err = GridboardError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Colors travel through level files as hex strings.
impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_forms_agree() {
        let a = Rgb::parse_hex("#f00").unwrap();
        let b = Rgb::parse_hex("FF0000").unwrap();
        assert!(a.same_color(&b));
        assert!(a.same_color(&Rgb::RED));
        assert_eq!(b.to_hex(), "#FF0000");
    }

    #[test]
    fn alpha_is_ignored_for_equality() {
        let c = Rgb::parse_hex("#00000080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.same_color(&Rgb::BLACK));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgb::parse_hex("#12").is_err());
        assert!(Rgb::parse_hex("#GGGGGG").is_err());
        assert!(Rgb::parse_hex("#ééé").is_err());
    }

    #[test]
    fn black_white_contrast_is_21() {
        let c = Rgb::BLACK.contrast(&Rgb::WHITE);
        assert!((c - 21.0).abs() < 1e-3);
        assert!((Rgb::WHITE.contrast(&Rgb::BLACK) - c).abs() < 1e-6);
    }
}
