//! breakdown_plot
//!
//! Render hierarchical "breakdown" bar charts: stacked horizontal bars where a
//! bar can expand one segment of another bar, connected by a shaded curve.
//! Pairs with the `breakdown-plot` CLI.
//!
//! ### Pipeline
//! - Load a JSON description, resolving `$ref` indirection ([`refs`])
//! - Validate it against the embedded schema ([`schema`]) and apply defaults
//! - Derive totals, normalized widths, and cumulative offsets ([`preprocess`])
//! - Draw the figure to SVG, PNG, or PDF ([`viz`])
//!
//! ### Example
//! ```no_run
//! use breakdown_plot::{palette::Palette, preprocess, storage, viz};
//!
//! let spec = storage::load_chart("area.json")?;
//! let palette = Palette::pulp().with_overrides(&spec.palette)?;
//! let chart = preprocess::preprocess(&spec, &palette)?;
//! viz::plot_chart(&chart, "area.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod error;
pub mod format;
pub mod models;
pub mod palette;
pub mod preprocess;
pub mod refs;
pub mod schema;
pub mod storage;
pub mod viz;

#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::ChartError;
pub use models::{BarSpec, ChartSpec, FigConfig, ParentRef};
pub use palette::{Palette, Rgba};
pub use preprocess::{PreparedBar, PreparedChart, preprocess};
