use thiserror::Error;

/// Errors raised while turning a chart description into drawable data.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart has no bars")]
    NoBars,

    #[error("bar '{bar}' has no segments")]
    NoSegments { bar: String },

    /// `labels`, `values`, `colors` and any non-empty offset vector must agree.
    #[error("bar '{bar}': '{field}' has {found} entries, expected {expected} (one per label)")]
    LengthMismatch {
        bar: String,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("bar '{bar}': value {value} of segment '{label}' is negative or not finite")]
    NegativeValue {
        bar: String,
        label: String,
        value: f64,
    },

    /// Sum of values is zero; normalized widths would be undefined.
    #[error("bar '{bar}' is empty: its values sum to {total}")]
    EmptyBar { bar: String, total: f64 },

    #[error("bar '{bar}': invalid parent reference '{parent}': {reason}")]
    InvalidParent {
        bar: String,
        parent: String,
        reason: String,
    },

    #[error("unknown color '{0}' (not a palette name or #RGB/#RGBA/#RRGGBB/#RRGGBBAA)")]
    UnknownColor(String),

    #[error("invalid number format '{0}'")]
    InvalidFormat(String),

    #[error("unsupported output format '{0}' (expected .svg, .png or .pdf)")]
    UnsupportedFormat(String),
}
