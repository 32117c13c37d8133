//! Visualization: render a prepared breakdown chart to **SVG**, **PNG** or **PDF**.
//!
//! - One horizontal track per bar, first bar on top, every bar spanning the full width
//! - Segment labels above, raw values and percentages below, totals on the right
//! - Curved shading from a parent segment to the bar that breaks it down
//! - Canvas cropped to the drawn content plus a 0.1 inch pad
//!
//! Drawing goes through a single path: plotters writes an SVG document in
//! memory, PNG and PDF are derived from it (see [`raster`]).

pub mod geometry;
pub mod layout;
pub mod raster;
pub mod scene;
pub mod text;
pub mod types;

pub use geometry::{Path as ShadePath, PathCmd, Point, shade_path};
pub use layout::Frame;
pub use scene::build_scene;
pub use types::{Anchor, Primitive, Scene};

use crate::palette::Rgba;
use crate::preprocess::PreparedChart;
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use plotters_svg::SVGBackend;

use std::path::Path;

/// Dot pitch of dotted strokes, in line widths.
const DOT_PITCH: f64 = 2.65;

/// plotters-svg writes `font-size` as the requested size divided by this.
const SVG_FONT_SCALE: f64 = 1.24;

/// Render `chart` and write it to `out_path`; the extension picks the format.
pub fn plot_chart<P: AsRef<Path>>(chart: &PreparedChart, out_path: P) -> Result<()> {
    let svg = render_svg(chart)?;
    crate::storage::save_figure(&svg, out_path)
}

/// Render `chart` to an SVG document.
pub fn render_svg(chart: &PreparedChart) -> Result<String> {
    if chart.bars.is_empty() {
        return Err(anyhow!("no bars to plot"));
    }
    let scene = build_scene(chart);
    let frame = Frame::fit(&scene, &chart.fig);

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (frame.width, frame.height)).into_drawing_area();
        draw_scene(&root, &scene, &frame, &chart.fig.fontfamily)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    log::debug!(
        "rendered {} primitives into {}x{} px",
        scene.primitives.len(),
        frame.width,
        frame.height
    );
    Ok(svg)
}

fn draw_scene<DB>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    frame: &Frame,
    fontfamily: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    for primitive in scene.painted() {
        match primitive {
            Primitive::Rect {
                x0,
                y0,
                x1,
                y1,
                fill,
            } => {
                let style = ShapeStyle {
                    color: to_plotters(*fill),
                    filled: true,
                    stroke_width: 0,
                };
                root.draw(&Rectangle::new(
                    [
                        frame.to_px(Point::new(*x0, *y0)),
                        frame.to_px(Point::new(*x1, *y1)),
                    ],
                    style,
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
            Primitive::Line {
                from,
                to,
                color,
                width_pt,
                dotted,
            } => {
                let width_px = frame.pt(*width_pt);
                if *dotted {
                    draw_dotted_line(
                        root,
                        frame.project(*from),
                        frame.project(*to),
                        to_plotters(*color),
                        width_px,
                    )?;
                } else {
                    let style = ShapeStyle {
                        color: to_plotters(*color),
                        filled: false,
                        stroke_width: width_px.round().max(1.0) as u32,
                    };
                    root.draw(&PathElement::new(
                        vec![frame.to_px(*from), frame.to_px(*to)],
                        style,
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
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
                    continue;
                }
                let weight = if *bold {
                    FontStyle::Bold
                } else {
                    FontStyle::Normal
                };
                let hpos = match anchor {
                    Anchor::Left => HPos::Left,
                    Anchor::Center => HPos::Center,
                };
                let size_px = frame.pt(*size_pt) * SVG_FONT_SCALE;
                let style = FontDesc::new(FontFamily::from(fontfamily), size_px, weight)
                    .color(&BLACK)
                    .pos(Pos::new(hpos, VPos::Center));
                root.draw(&Text::new(text.as_str(), frame.to_px(*at), style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            Primitive::Patch { path, fill } => {
                let points: Vec<(i32, i32)> = path
                    .flatten(geometry::BEZIER_SAMPLES)
                    .into_iter()
                    .map(|p| frame.to_px(p))
                    .collect();
                root.draw(&Polygon::new(points, to_plotters(*fill).filled()))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}

/// Dots of one line width, `DOT_PITCH` widths apart, from `from` to `to` (pixels).
fn draw_dotted_line<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    from: (f64, f64),
    to: (f64, f64),
    color: RGBAColor,
    width_px: f64,
) -> Result<()> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return Ok(());
    }
    let radius = (width_px / 2.0).round().max(1.0) as i32;
    let pitch = (DOT_PITCH * width_px).max(2.0);
    let mut t = width_px / 2.0;
    while t <= len {
        let x = from.0 + dx * t / len;
        let y = from.1 + dy * t / len;
        root.draw(&Circle::new(
            (x.round() as i32, y.round() as i32),
            radius,
            color.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        t += pitch;
    }
    Ok(())
}

#[inline]
fn to_plotters(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.alpha())
}
