//! Figure sizing and the data -> pixel projection.
//!
//! The nominal figure is `(h * n + 0.5) * scale` inches tall and `ratio`
//! times as wide. Bars occupy the usual subplot box inside it; the canvas
//! that is finally written is cropped to whatever was drawn plus a small pad.

use super::geometry::{BEZIER_SAMPLES, Point};
use super::text::{estimate_text_width_px, line_height_px, pt_to_px};
use super::types::{Anchor, Primitive, Scene};
use crate::models::FigConfig;

/// Subplot box as a fraction of the nominal figure.
pub const AXES_WIDTH_FRAC: f64 = 0.775;
pub const AXES_HEIGHT_FRAC: f64 = 0.77;
/// Vertical autoscale margin, as a fraction of the data span.
pub const Y_MARGIN: f64 = 0.05;
/// Padding around the tight bounding box, in inches.
pub const PAD_INCHES: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

/// Pixel placement of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub dpi: f64,
    /// Axes box size in pixels.
    pub axes_w: f64,
    pub axes_h: f64,
    pub y_lo: f64,
    pub y_hi: f64,
    /// Pixel position of data x = 0 / y = `y_lo` on the canvas.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// Size the figure for `scene` and crop the canvas to its contents.
    pub fn fit(scene: &Scene, fig: &FigConfig) -> Self {
        let n = scene.tracks.max(1) as f64;
        let h = scene.bar_height;
        let fig_h_in = (h * n + 0.5) * fig.scale;
        let fig_w_in = fig_h_in * fig.ratio;

        let span = n - 1.0 + h;
        let mut frame = Frame {
            dpi: fig.dpi,
            axes_w: fig_w_in * AXES_WIDTH_FRAC * fig.dpi,
            axes_h: fig_h_in * AXES_HEIGHT_FRAC * fig.dpi,
            y_lo: -h / 2.0 - Y_MARGIN * span,
            y_hi: n - 1.0 + h / 2.0 + Y_MARGIN * span,
            origin_x: 0.0,
            origin_y: 0.0,
            width: 1,
            height: 1,
        };

        let mut bounds = Bounds::empty();
        for p in &scene.primitives {
            frame.extend(&mut bounds, p);
        }
        if bounds.is_empty() {
            bounds = Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: frame.axes_w,
                max_y: frame.axes_h,
            };
        }

        let pad = PAD_INCHES * fig.dpi;
        frame.origin_x = pad - bounds.min_x;
        frame.origin_y = pad - bounds.min_y;
        frame.width = (bounds.max_x - bounds.min_x + 2.0 * pad).ceil().max(1.0) as u32;
        frame.height = (bounds.max_y - bounds.min_y + 2.0 * pad).ceil().max(1.0) as u32;
        log::debug!(
            "figure {:.2}x{:.2} in, canvas {}x{} px",
            fig_w_in,
            fig_h_in,
            frame.width,
            frame.height
        );
        frame
    }

    /// Data point to canvas pixels (float).
    pub fn project(&self, p: Point) -> (f64, f64) {
        let x = self.origin_x + p.x * self.axes_w;
        let y = self.origin_y + (p.y - self.y_lo) / (self.y_hi - self.y_lo) * self.axes_h;
        (x, y)
    }

    /// Data point to canvas pixels, rounded for the backend.
    pub fn to_px(&self, p: Point) -> (i32, i32) {
        let (x, y) = self.project(p);
        (x.round() as i32, y.round() as i32)
    }

    pub fn pt(&self, pt: f64) -> f64 {
        pt_to_px(pt, self.dpi)
    }

    /// Grow `bounds` (in origin-free pixels) by the extent of `p`.
    fn extend(&self, bounds: &mut Bounds, p: &Primitive) {
        match p {
            Primitive::Rect { x0, y0, x1, y1, .. } => {
                for corner in [Point::new(*x0, *y0), Point::new(*x1, *y1)] {
                    let (x, y) = self.project(corner);
                    bounds.add(x, y);
                }
            }
            Primitive::Line {
                from, to, width_pt, ..
            } => {
                let half = self.pt(*width_pt) / 2.0;
                for end in [from, to] {
                    let (x, y) = self.project(*end);
                    bounds.add(x - half, y - half);
                    bounds.add(x + half, y + half);
                }
            }
            Primitive::Text {
                at,
                text,
                size_pt,
                bold,
                anchor,
            } => {
                if text.is_empty() {
                    return;
                }
                let px = self.pt(*size_pt);
                let w = estimate_text_width_px(text, px, *bold);
                let half_h = line_height_px(px) / 2.0;
                let (x, y) = self.project(*at);
                let (left, right) = match anchor {
                    Anchor::Left => (x, x + w),
                    Anchor::Center => (x - w / 2.0, x + w / 2.0),
                };
                bounds.add(left, y - half_h);
                bounds.add(right, y + half_h);
            }
            Primitive::Patch { path, .. } => {
                for v in path.flatten(BEZIER_SAMPLES) {
                    let (x, y) = self.project(v);
                    bounds.add(x, y);
                }
            }
        }
    }
}
