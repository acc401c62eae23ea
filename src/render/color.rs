//! Colours and the ordinal category palette.
//!
//! The palette maps each category, in first-appearance order, onto the
//! Tableau10 scheme and cycles once the ten colours are used up.

use crate::error::ConfigError;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };
    /// Neutral dot fill used before any category colouring.
    pub const NEUTRAL: Self = Self { r: 0xcc, g: 0xcc, b: 0xcc, a: 255 };
    /// Label text colour.
    pub const INK: Self = Self { r: 0x33, g: 0x33, b: 0x33, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Component-wise interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Same colour with alpha scaled by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }
}

/// Tableau10, the default categorical scheme.
pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f",
    "#edc949", "#af7aa1", "#ff9da7", "#9c755f", "#bab0ab",
];

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(s: &str) -> Result<Rgba, ConfigError> {
    let invalid = || ConfigError::Colour(s.to_string());
    let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
    let nibbles = digits
        .bytes()
        .map(hex_digit)
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(invalid)?;

    match nibbles[..] {
        [r, g, b] => Ok(Rgba::rgb(r << 4 | r, g << 4 | g, b << 4 | b)),
        [r, g, b, a] => Ok(Rgba {
            r: r << 4 | r,
            g: g << 4 | g,
            b: b << 4 | b,
            a: a << 4 | a,
        }),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba::rgb(r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0)),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Ok(Rgba {
            r: r1 << 4 | r0,
            g: g1 << 4 | g0,
            b: b1 << 4 | b0,
            a: a1 << 4 | a0,
        }),
        _ => Err(invalid()),
    }
}

/// Ordinal scale from a fixed domain onto a colour range.
#[derive(Debug, Clone)]
pub struct OrdinalPalette {
    domain: Vec<String>,
    range: Vec<Rgba>,
    fallback: Rgba,
}

impl OrdinalPalette {
    /// `range` must be non-empty; values outside `domain` get `fallback`.
    pub fn new(domain: Vec<String>, range: Vec<Rgba>, fallback: Rgba) -> Result<Self, ConfigError> {
        if range.is_empty() {
            return Err(ConfigError::Colour("empty palette".to_string()));
        }
        Ok(Self {
            domain,
            range,
            fallback,
        })
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn color(&self, value: &str) -> Rgba {
        self.domain
            .iter()
            .position(|d| d == value)
            .map(|i| self.range[i % self.range.len()])
            .unwrap_or(self.fallback)
    }
}
