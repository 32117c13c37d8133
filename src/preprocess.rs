//! Derived layout values for each bar.
//!
//! [`preprocess`] is a pure function of the chart description and palette:
//! it sums each bar, normalizes segment widths to fractions of that sum,
//! accumulates left/right edges, fills omitted offset vectors with zeros, and
//! resolves colors and parent references. Malformed input becomes a
//! [`ChartError`] here rather than NaN during drawing.

use crate::error::ChartError;
use crate::format::{NumberFormat, percent_label};
use crate::models::{BarSpec, ChartSpec, FigConfig, ParentRef};
use crate::palette::{Palette, Rgba};

/// Resolved `parent` link: indices into [`PreparedChart::bars`] and the
/// parent's segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub bar: usize,
    pub segment: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBar {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<Rgba>,
    pub total: f64,
    pub norm_values: Vec<f64>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub label_offset: Vec<f64>,
    pub label_offset_y: Vec<f64>,
    pub value_offset: Vec<f64>,
    pub parent: Option<ParentLink>,
}

impl PreparedBar {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Horizontal center of segment `j`.
    pub fn mid(&self, j: usize) -> f64 {
        self.left[j] + self.norm_values[j] / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    pub si_unit: String,
    pub format: NumberFormat,
    pub fig: FigConfig,
    /// Connector fill with `fig.shade_alpha` already applied.
    pub shade: Rgba,
    pub bars: Vec<PreparedBar>,
}

impl PreparedChart {
    /// Total of the first bar. Every percentage in the chart is relative to
    /// it, so all levels compare against the same grand total.
    pub fn reference_total(&self) -> f64 {
        self.bars.first().map(|b| b.total).unwrap_or(0.0)
    }

    /// Percentage annotation for segment `j` of bar `i`.
    pub fn percent_label(&self, i: usize, j: usize) -> String {
        percent_label(self.bars[i].values[j], self.reference_total())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bars.iter().position(|b| b.name == name)
    }
}

/// Compute totals, normalized widths and offsets for every bar.
pub fn preprocess(spec: &ChartSpec, palette: &Palette) -> Result<PreparedChart, ChartError> {
    if spec.bars.is_empty() {
        return Err(ChartError::NoBars);
    }

    let format = NumberFormat::parse(&spec.fmt)?;
    let shade = palette
        .resolve(&spec.fig.shade_color)?
        .with_alpha(spec.fig.shade_alpha);

    let mut bars = Vec::with_capacity(spec.bars.len());
    for (name, bar) in &spec.bars {
        let prepared = prepare_bar(name, bar, palette)?;
        log::debug!(
            "bar '{}': total={} segments={}",
            name,
            prepared.total,
            prepared.len()
        );
        bars.push(prepared);
    }

    for (i, (name, bar)) in spec.bars.iter().enumerate() {
        if let Some(parent) = &bar.parent {
            bars[i].parent = Some(link_parent(name, parent, spec)?);
        }
    }

    Ok(PreparedChart {
        si_unit: spec.si_unit.clone(),
        format,
        fig: spec.fig.clone(),
        shade,
        bars,
    })
}

fn prepare_bar(name: &str, bar: &BarSpec, palette: &Palette) -> Result<PreparedBar, ChartError> {
    let n = bar.labels.len();
    if n == 0 {
        return Err(ChartError::NoSegments {
            bar: name.to_string(),
        });
    }
    let check_len = |field: &'static str, found: usize| {
        if found == n {
            Ok(())
        } else {
            Err(ChartError::LengthMismatch {
                bar: name.to_string(),
                field,
                expected: n,
                found,
            })
        }
    };
    check_len("values", bar.values.len())?;
    check_len("colors", bar.colors.len())?;

    for (label, &value) in bar.labels.iter().zip(&bar.values) {
        if !value.is_finite() || value < 0.0 {
            return Err(ChartError::NegativeValue {
                bar: name.to_string(),
                label: label.clone(),
                value,
            });
        }
    }

    let total: f64 = bar.values.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ChartError::EmptyBar {
            bar: name.to_string(),
            total,
        });
    }

    let norm_values: Vec<f64> = bar.values.iter().map(|v| v / total).collect();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut acc = 0.0;
    for w in &norm_values {
        left.push(acc);
        acc += w;
        right.push(acc);
    }

    let zero_filled = |field: &'static str, v: &[f64]| -> Result<Vec<f64>, ChartError> {
        if v.is_empty() {
            Ok(vec![0.0; n])
        } else {
            check_len(field, v.len())?;
            Ok(v.to_vec())
        }
    };

    let colors = bar
        .colors
        .iter()
        .map(|c| palette.resolve(c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PreparedBar {
        name: name.to_string(),
        labels: bar.labels.clone(),
        values: bar.values.clone(),
        colors,
        total,
        norm_values,
        left,
        right,
        label_offset: zero_filled("label_offset", &bar.label_offset)?,
        label_offset_y: zero_filled("label_offset_y", &bar.label_offset_y)?,
        value_offset: zero_filled("value_offset", &bar.value_offset)?,
        parent: None,
    })
}

fn link_parent(name: &str, parent: &str, spec: &ChartSpec) -> Result<ParentLink, ChartError> {
    let invalid = |reason: String| ChartError::InvalidParent {
        bar: name.to_string(),
        parent: parent.to_string(),
        reason,
    };
    let r: ParentRef = parent.parse().map_err(invalid)?;
    if r.bar == name {
        return Err(invalid("a bar cannot be its own parent".to_string()));
    }
    let (bar_idx, _, parent_bar) = spec
        .bars
        .get_full(&r.bar)
        .ok_or_else(|| invalid(format!("no bar named '{}'", r.bar)))?;
    let segment = parent_bar
        .labels
        .iter()
        .position(|l| *l == r.segment)
        .ok_or_else(|| invalid(format!("bar '{}' has no segment '{}'", r.bar, r.segment)))?;
    Ok(ParentLink {
        bar: bar_idx,
        segment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::collections::BTreeMap;

    const EPS: f64 = 1e-12;

    fn bar(labels: &[&str], values: &[f64]) -> BarSpec {
        BarSpec {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            values: values.to_vec(),
            colors: vec!["#000".to_string(); labels.len()],
            label_offset: vec![],
            label_offset_y: vec![],
            value_offset: vec![],
            parent: None,
        }
    }

    fn chart(bars: Vec<(&str, BarSpec)>) -> ChartSpec {
        ChartSpec {
            si_unit: "mm²".to_string(),
            fmt: "%.1f".to_string(),
            fig: FigConfig::default(),
            palette: BTreeMap::new(),
            bars: bars
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn two_segment_bar() {
        let spec = chart(vec![("Total", bar(&["A", "B"], &[3.0, 7.0]))]);
        let c = preprocess(&spec, &Palette::pulp()).unwrap();
        let b = &c.bars[0];
        assert_eq!(b.total, 10.0);
        assert!((b.norm_values[0] - 0.3).abs() < EPS);
        assert!((b.norm_values[1] - 0.7).abs() < EPS);
        assert_eq!(b.left[0], 0.0);
        assert!((b.left[1] - 0.3).abs() < EPS);
        assert!((b.right[0] - 0.3).abs() < EPS);
        assert!((b.right[1] - 1.0).abs() < EPS);
    }

    #[test]
    fn cumulative_offsets_are_contiguous() {
        let spec = chart(vec![(
            "Total",
            bar(&["a", "b", "c", "d", "e"], &[1.0, 2.5, 0.0, 4.0, 11.0]),
        )]);
        let c = preprocess(&spec, &Palette::pulp()).unwrap();
        let b = &c.bars[0];
        let sum: f64 = b.norm_values.iter().sum();
        assert!((sum - 1.0).abs() < EPS);
        assert_eq!(b.left[0], 0.0);
        assert!((b.right[b.len() - 1] - 1.0).abs() < EPS);
        for j in 0..b.len() {
            assert!((b.right[j] - (b.left[j] + b.norm_values[j])).abs() < EPS);
            if j + 1 < b.len() {
                assert_eq!(b.left[j + 1], b.right[j]);
            }
        }
    }

    #[test]
    fn single_segment_spans_everything() {
        let spec = chart(vec![("Only", bar(&["x"], &[42.0]))]);
        let b = &preprocess(&spec, &Palette::pulp()).unwrap().bars[0];
        assert_eq!(b.left, vec![0.0]);
        assert_eq!(b.right, vec![1.0]);
        assert_eq!(b.mid(0), 0.5);
    }

    #[test]
    fn omitted_offsets_become_zero_vectors() {
        let spec = chart(vec![("Total", bar(&["A", "B", "C"], &[1.0, 1.0, 1.0]))]);
        let b = &preprocess(&spec, &Palette::pulp()).unwrap().bars[0];
        assert_eq!(b.label_offset, vec![0.0; 3]);
        assert_eq!(b.label_offset_y, vec![0.0; 3]);
        assert_eq!(b.value_offset, vec![0.0; 3]);
    }

    #[test]
    fn given_offsets_are_kept() {
        let mut b = bar(&["A", "B"], &[1.0, 1.0]);
        b.label_offset = vec![0.1, -0.1];
        let spec = chart(vec![("Total", b)]);
        let p = &preprocess(&spec, &Palette::pulp()).unwrap().bars[0];
        assert_eq!(p.label_offset, vec![0.1, -0.1]);
    }

    #[test]
    fn zero_total_is_an_explicit_error() {
        let spec = chart(vec![("Total", bar(&["A", "B"], &[0.0, 0.0]))]);
        let err = preprocess(&spec, &Palette::pulp()).unwrap_err();
        assert!(matches!(err, ChartError::EmptyBar { ref bar, .. } if bar == "Total"));
    }

    #[test]
    fn negative_values_are_rejected() {
        let spec = chart(vec![("Total", bar(&["A", "B"], &[5.0, -1.0]))]);
        assert!(matches!(
            preprocess(&spec, &Palette::pulp()),
            Err(ChartError::NegativeValue { .. })
        ));
    }

    #[test]
    fn length_mismatch_names_the_field() {
        let mut b = bar(&["A", "B"], &[1.0, 2.0]);
        b.colors.pop();
        let spec = chart(vec![("Total", b)]);
        let err = preprocess(&spec, &Palette::pulp()).unwrap_err();
        assert!(matches!(
            err,
            ChartError::LengthMismatch { field: "colors", expected: 2, found: 1, .. }
        ));

        let mut b = bar(&["A", "B"], &[1.0, 2.0]);
        b.value_offset = vec![0.0];
        let spec = chart(vec![("Total", b)]);
        let err = preprocess(&spec, &Palette::pulp()).unwrap_err();
        assert!(matches!(
            err,
            ChartError::LengthMismatch { field: "value_offset", .. }
        ));
    }

    #[test]
    fn parent_is_resolved_to_indices() {
        let mut child = bar(&["x", "y"], &[1.0, 2.0]);
        child.parent = Some("Total:B".to_string());
        let spec = chart(vec![
            ("Total", bar(&["A", "B"], &[3.0, 7.0])),
            ("Detail", child),
        ]);
        let c = preprocess(&spec, &Palette::pulp()).unwrap();
        assert_eq!(c.bars[1].parent, Some(ParentLink { bar: 0, segment: 1 }));
        assert_eq!(c.bars[0].parent, None);
    }

    #[test]
    fn unknown_parent_bar_or_segment_is_rejected() {
        for parent in ["Nope:A", "Total:Z", "Detail:x", "broken"] {
            let mut child = bar(&["x"], &[1.0]);
            child.parent = Some(parent.to_string());
            let spec = chart(vec![("Total", bar(&["A"], &[1.0])), ("Detail", child)]);
            assert!(
                matches!(
                    preprocess(&spec, &Palette::pulp()),
                    Err(ChartError::InvalidParent { .. })
                ),
                "{parent} should be rejected"
            );
        }
    }

    #[test]
    fn colors_resolve_through_palette() {
        let mut b = bar(&["A", "B"], &[1.0, 1.0]);
        b.colors = vec!["Blue".to_string(), "#ff000080".to_string()];
        let spec = chart(vec![("Total", b)]);
        let p = preprocess(&spec, &Palette::pulp()).unwrap();
        assert_eq!(p.bars[0].colors[0], Rgba::rgb(0x12, 0x69, 0xB0));
        assert_eq!(p.bars[0].colors[1], Rgba::new(255, 0, 0, 0x80));
        assert_eq!(p.shade, Rgba::new(0xAB, 0xAB, 0xAB, 102));

        let mut b = bar(&["A"], &[1.0]);
        b.colors = vec!["Teal".to_string()];
        assert!(matches!(
            preprocess(&chart(vec![("Total", b)]), &Palette::pulp()),
            Err(ChartError::UnknownColor(_))
        ));
    }

    #[test]
    fn percentages_use_the_first_bar_total() {
        let mut child = bar(&["x", "y"], &[1.0, 2.0]);
        child.parent = Some("Total:A".to_string());
        let spec = chart(vec![
            ("Total", bar(&["A", "B"], &[3.0, 97.0])),
            ("Detail", child),
        ]);
        let c = preprocess(&spec, &Palette::pulp()).unwrap();
        assert_eq!(c.reference_total(), 100.0);
        assert_eq!(c.percent_label(1, 0), "1.0");
        assert_eq!(c.percent_label(0, 1), "97");
    }

    #[test]
    fn preprocessing_is_idempotent() {
        let spec = chart(vec![("Total", bar(&["A", "B", "C"], &[0.1, 0.2, 0.3]))]);
        let once = preprocess(&spec, &Palette::pulp()).unwrap();
        let twice = preprocess(&spec, &Palette::pulp()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn no_bars_is_rejected() {
        let spec = chart(vec![]);
        assert!(matches!(
            preprocess(&spec, &Palette::pulp()),
            Err(ChartError::NoBars)
        ));
    }

    #[test]
    fn shade_alpha_overrides_the_palette_alpha() {
        let mut spec = chart(vec![("Total", bar(&["A"], &[1.0]))]);
        let mut alphas = Vec::new();
        for name in ["Gray", "GrayLight", "GrayVeryLight", "#ABABAB10"] {
            spec.fig.shade_color = name.to_string();
            spec.fig.shade_alpha = 0.4;
            alphas.push(preprocess(&spec, &Palette::pulp()).unwrap().shade.a);
        }
        assert_eq!(alphas, vec![102; 4]);
    }
}
