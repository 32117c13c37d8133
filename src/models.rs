use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Top-level chart description, as read from JSON.
///
/// Field defaults mirror the `default` keywords of `data.schema.json`; applying
/// them is serde's job, not the validator's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    /// Unit label drawn next to the totals column (e.g. `"mm²"`).
    #[serde(default = "default_si_unit")]
    pub si_unit: String,
    /// Number format for totals and segment values (`"%.2f"` or `"{:.2f}"`).
    #[serde(default = "default_fmt")]
    pub fmt: String,
    #[serde(default)]
    pub fig: FigConfig,
    /// Extra or overriding named colors, merged over the built-in palette.
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    /// Bars in drawing order, first on top.
    pub bars: IndexMap<String, BarSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FigConfig {
    /// Bar thickness in track units (one track = distance between two bars).
    #[serde(default = "default_bar_height")]
    pub bar_height: f64,
    /// Figure width / height.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Multiplier on the figure height in inches.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_fontfamily")]
    pub fontfamily: String,
    /// Font size in points.
    #[serde(default = "default_fontsize")]
    pub fontsize: f64,
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    /// Fill of the parent/child connector patches.
    #[serde(default = "default_shade_color")]
    pub shade_color: String,
    #[serde(default = "default_shade_alpha")]
    pub shade_alpha: f64,
}

impl Default for FigConfig {
    fn default() -> Self {
        Self {
            bar_height: default_bar_height(),
            ratio: default_ratio(),
            scale: default_scale(),
            fontfamily: default_fontfamily(),
            fontsize: default_fontsize(),
            dpi: default_dpi(),
            shade_color: default_shade_color(),
            shade_alpha: default_shade_alpha(),
        }
    }
}

/// One stacked horizontal bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarSpec {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Palette names or hex colors, one per label.
    pub colors: Vec<String>,
    /// Horizontal shift of each label, in x units. Empty means all zero.
    #[serde(default)]
    pub label_offset: Vec<f64>,
    /// Upward shift of each label, in track units. Empty means all zero.
    #[serde(default)]
    pub label_offset_y: Vec<f64>,
    /// Horizontal shift of each value/percentage pair. Empty means all zero.
    #[serde(default)]
    pub value_offset: Vec<f64>,
    /// `"<bar>:<segment label>"` this bar expands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

fn default_si_unit() -> String {
    String::new()
}
fn default_fmt() -> String {
    "%.2f".to_string()
}
fn default_bar_height() -> f64 {
    0.4
}
fn default_ratio() -> f64 {
    3.0
}
fn default_scale() -> f64 {
    1.0
}
fn default_fontfamily() -> String {
    "sans-serif".to_string()
}
fn default_fontsize() -> f64 {
    10.0
}
fn default_dpi() -> f64 {
    100.0
}
fn default_shade_color() -> String {
    "GrayLight".to_string()
}
fn default_shade_alpha() -> f64 {
    0.4
}

/// Parsed form of a bar's `parent` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub bar: String,
    pub segment: String,
}

impl FromStr for ParentRef {
    type Err = String;

    /// Splits on the first `:`; bar names therefore cannot contain a colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bar, segment) = s
            .split_once(':')
            .ok_or_else(|| "expected '<bar>:<segment>'".to_string())?;
        if bar.is_empty() || segment.is_empty() {
            return Err("bar and segment must both be non-empty".to_string());
        }
        Ok(Self {
            bar: bar.to_string(),
            segment: segment.to_string(),
        })
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bar, self.segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_ref_roundtrips_through_display() {
        let p: ParentRef = "Total:Core".parse().unwrap();
        assert_eq!(p.bar, "Total");
        assert_eq!(p.segment, "Core");
        assert_eq!(p.to_string(), "Total:Core");
    }

    #[test]
    fn parent_ref_keeps_colons_in_segment() {
        let p: ParentRef = "Total:L1:I$".parse().unwrap();
        assert_eq!(p.bar, "Total");
        assert_eq!(p.segment, "L1:I$");
    }

    #[test]
    fn parent_ref_rejects_malformed() {
        assert!("Total".parse::<ParentRef>().is_err());
        assert!(":A".parse::<ParentRef>().is_err());
        assert!("Total:".parse::<ParentRef>().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let spec: ChartSpec = serde_json::from_str(
            r##"{"bars": {"Total": {"labels": ["A"], "values": [1], "colors": ["#000"]}}}"##,
        )
        .unwrap();
        assert_eq!(spec.fig, FigConfig::default());
        assert_eq!(spec.fmt, "%.2f");
        let bar = &spec.bars["Total"];
        assert!(bar.label_offset.is_empty());
        assert!(bar.parent.is_none());
    }

    #[test]
    fn bars_keep_document_order() {
        let spec: ChartSpec = serde_json::from_str(
            r##"{"bars": {
                "Zeta": {"labels": ["A"], "values": [1], "colors": ["#000"]},
                "Alpha": {"labels": ["A"], "values": [1], "colors": ["#000"]}
            }}"##,
        )
        .unwrap();
        let names: Vec<&str> = spec.bars.keys().map(String::as_str).collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
    }
}
