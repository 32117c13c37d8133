//! Named colors for bar segments and connector patches.
//!
//! A [`Palette`] is an explicit value handed to preprocessing and rendering.
//! [`Palette::pulp`] is the built-in set; chart files may add or override
//! entries through their `palette` object.

use crate::error::ChartError;
use std::collections::BTreeMap;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Alpha as a fraction in `0..=1`.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Replace the alpha channel with `alpha` (clamped to `0..=1`). Any alpha
    /// the color already carried is discarded.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// `#RRGGBB` for opaque colors, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (alpha last) and a few
    /// CSS keywords.
    pub fn parse(text: &str) -> Option<Self> {
        let s = text.trim().to_ascii_lowercase();
        match s.as_str() {
            "none" | "transparent" => return Some(Self::new(0, 0, 0, 0)),
            "white" => return Some(Self::rgb(255, 255, 255)),
            "black" => return Some(Self::rgb(0, 0, 0)),
            _ => {}
        }

        let hex = s.strip_prefix('#')?;
        fn hex2(b: &[u8]) -> Option<u8> {
            let hi = (*b.first()? as char).to_digit(16)? as u8;
            let lo = (*b.get(1)? as char).to_digit(16)? as u8;
            Some((hi << 4) | lo)
        }
        fn hex1(c: u8) -> Option<u8> {
            let v = (c as char).to_digit(16)? as u8;
            Some((v << 4) | v)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(hex1(bytes[0])?, hex1(bytes[1])?, hex1(bytes[2])?)),
            4 => Some(Self::new(
                hex1(bytes[0])?,
                hex1(bytes[1])?,
                hex1(bytes[2])?,
                hex1(bytes[3])?,
            )),
            6 => Some(Self::rgb(
                hex2(&bytes[0..2])?,
                hex2(&bytes[2..4])?,
                hex2(&bytes[4..6])?,
            )),
            8 => Some(Self::new(
                hex2(&bytes[0..2])?,
                hex2(&bytes[2..4])?,
                hex2(&bytes[4..6])?,
                hex2(&bytes[6..8])?,
            )),
            _ => None,
        }
    }
}

/// ETH Zurich / University of Bologna PULP colors. `Light` and `VeryLight`
/// are the same hue at alpha 0xC8 and 0x96.
const PULP: [(&str, (u8, u8, u8)); 8] = [
    ("Red", (0xA8, 0x32, 0x2C)),
    ("Blue", (0x12, 0x69, 0xB0)),
    ("Green", (0x16, 0x86, 0x38)),
    ("Orange", (0xF2, 0x95, 0x45)),
    ("Purple", (0x91, 0x05, 0x69)),
    ("Olive", (0x48, 0x59, 0x2C)),
    ("Marine", (0x00, 0x79, 0x96)),
    ("Gray", (0xAB, 0xAB, 0xAB)),
];

const LIGHT_ALPHA: u8 = 0xC8;
const VERY_LIGHT_ALPHA: u8 = 0x96;

/// Name -> color lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: BTreeMap<String, Rgba>,
}

impl Palette {
    /// An empty palette; only literal hex colors resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in PULP palette (24 entries).
    pub fn pulp() -> Self {
        let mut colors = BTreeMap::new();
        for (name, (r, g, b)) in PULP {
            colors.insert(name.to_string(), Rgba::rgb(r, g, b));
            colors.insert(format!("{name}Light"), Rgba::new(r, g, b, LIGHT_ALPHA));
            colors.insert(
                format!("{name}VeryLight"),
                Rgba::new(r, g, b, VERY_LIGHT_ALPHA),
            );
        }
        Self { colors }
    }

    /// Return a copy with `overrides` (name -> color text) merged on top.
    /// Override values may themselves name an existing entry.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, String>) -> Result<Self, ChartError> {
        let mut out = self.clone();
        for (name, value) in overrides {
            let color = self.resolve(value)?;
            out.colors.insert(name.clone(), color);
        }
        Ok(out)
    }

    pub fn insert(&mut self, name: impl Into<String>, color: Rgba) {
        self.colors.insert(name.into(), color);
    }

    pub fn get(&self, name: &str) -> Option<Rgba> {
        self.colors.get(name).copied()
    }

    /// Look `text` up by name first, then parse it as a literal color.
    pub fn resolve(&self, text: &str) -> Result<Rgba, ChartError> {
        self.get(text)
            .or_else(|| Rgba::parse(text))
            .ok_or_else(|| ChartError::UnknownColor(text.to_string()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgba)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
