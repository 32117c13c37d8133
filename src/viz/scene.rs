//! Build the drawing primitives for a prepared chart.

use super::geometry::{Point, shade_path};
use super::types::{Anchor, Primitive, Scene};
use crate::palette::Rgba;
use crate::preprocess::{PreparedBar, PreparedChart};

/// x of the totals column.
pub const TOTAL_X: f64 = 1.02;
/// x of the unit captions.
pub const UNIT_X: f64 = 1.04;
/// Values, percentages and the percent caption use this fraction of the font size.
pub const SMALL_FONT: f64 = 0.8;

const TICK_WIDTH_PT: f64 = 0.5;
const SEPARATOR_WIDTH_PT: f64 = 1.5;

const BLACK: Rgba = Rgba::rgb(0, 0, 0);
const WHITE: Rgba = Rgba::rgb(255, 255, 255);

pub fn build_scene(chart: &PreparedChart) -> Scene {
    let h = chart.fig.bar_height;
    let font = chart.fig.fontsize;
    let mut scene = Scene {
        primitives: Vec::new(),
        tracks: chart.bars.len(),
        bar_height: h,
    };

    for (i, bar) in chart.bars.iter().enumerate() {
        let track = i as f64;
        for j in 0..bar.len() {
            push_segment(&mut scene, chart, bar, i, j);
        }

        scene.push(Primitive::Text {
            at: Point::new(TOTAL_X, track),
            text: chart.format.format(bar.total),
            size_pt: font,
            bold: true,
            anchor: Anchor::Left,
        });

        if let Some(link) = bar.parent {
            let parent = &chart.bars[link.bar];
            scene.push(Primitive::Patch {
                path: shade_path(
                    parent.left[link.segment],
                    parent.right[link.segment],
                    link.bar as f64,
                    track,
                    h,
                ),
                fill: chart.shade,
            });
        }
    }

    if let Some(last) = chart.bars.len().checked_sub(1) {
        let last = last as f64;
        scene.push(Primitive::Text {
            at: Point::new(UNIT_X, last + 0.2),
            text: chart.si_unit.clone(),
            size_pt: font,
            bold: true,
            anchor: Anchor::Center,
        });
        scene.push(Primitive::Text {
            at: Point::new(UNIT_X, last + 0.35),
            text: "%".to_string(),
            size_pt: font * SMALL_FONT,
            bold: false,
            anchor: Anchor::Center,
        });
    }

    scene
}

fn push_segment(scene: &mut Scene, chart: &PreparedChart, bar: &PreparedBar, i: usize, j: usize) {
    let h = chart.fig.bar_height;
    let font = chart.fig.fontsize;
    let track = i as f64;
    let left = bar.left[j];
    let mid = bar.mid(j);
    let dx_label = bar.label_offset[j];
    let dy_label = bar.label_offset_y[j];
    let dx_value = bar.value_offset[j];

    scene.push(Primitive::Rect {
        x0: left,
        y0: track - h / 2.0,
        x1: left + bar.norm_values[j],
        y1: track + h / 2.0,
        fill: bar.colors[j],
    });

    scene.push(Primitive::Text {
        at: Point::new(mid + dx_label, track - 1.1 * h - dy_label),
        text: bar.labels[j].clone(),
        size_pt: font,
        bold: true,
        anchor: Anchor::Center,
    });
    scene.push(Primitive::Text {
        at: Point::new(mid + dx_value, track + 1.1 * h),
        text: chart.format.format(bar.values[j]),
        size_pt: font * SMALL_FONT,
        bold: true,
        anchor: Anchor::Center,
    });
    scene.push(Primitive::Text {
        at: Point::new(mid + dx_value, track + 1.65 * h),
        text: chart.percent_label(i, j),
        size_pt: font * SMALL_FONT,
        bold: false,
        anchor: Anchor::Center,
    });

    scene.push(Primitive::Line {
        from: Point::new(mid, track - 0.6 * h),
        to: Point::new(mid + dx_label, track - 0.85 * h - dy_label),
        color: BLACK,
        width_pt: TICK_WIDTH_PT,
        dotted: false,
    });
    scene.push(Primitive::Line {
        from: Point::new(mid, track + 0.6 * h),
        to: Point::new(mid + dx_value, track + 0.7 * h),
        color: BLACK,
        width_pt: TICK_WIDTH_PT,
        dotted: false,
    });

    if left != 0.0 {
        scene.push(Primitive::Line {
            from: Point::new(left, track - h / 2.0),
            to: Point::new(left, track + h / 2.0),
            color: WHITE,
            width_pt: SEPARATOR_WIDTH_PT,
            dotted: true,
        });
    }
}
