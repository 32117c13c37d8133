//! Drawing primitives in data coordinates.
//!
//! x runs from 0 (bar start) to 1 (bar end) with the totals column placed
//! just beyond 1. y is the track index; track 0 is the topmost bar.

use super::geometry::{Path, Point};
use crate::palette::Rgba;

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Filled axis-aligned rectangle.
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        fill: Rgba,
    },
    /// Straight stroke. `width_pt` is in points.
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        width_pt: f64,
        dotted: bool,
    },
    /// Single line of text, vertically centred on `at`.
    Text {
        at: Point,
        text: String,
        size_pt: f64,
        bold: bool,
        anchor: Anchor,
    },
    /// Filled closed outline.
    Patch { path: Path, fill: Rgba },
}

impl Primitive {
    /// Paint order: fills first, strokes above them, text on top.
    pub fn layer(&self) -> u8 {
        match self {
            Primitive::Rect { .. } | Primitive::Patch { .. } => 1,
            Primitive::Line { .. } => 2,
            Primitive::Text { .. } => 3,
        }
    }
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    /// Number of tracks (bars).
    pub tracks: usize,
    pub bar_height: f64,
}

impl Scene {
    pub fn push(&mut self, p: Primitive) {
        self.primitives.push(p);
    }

    /// Primitives in paint order; insertion order is kept within a layer.
    pub fn painted(&self) -> Vec<&Primitive> {
        let mut out: Vec<&Primitive> = self.primitives.iter().collect();
        out.sort_by_key(|p| p.layer());
        out
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn patches(&self) -> impl Iterator<Item = &Path> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Patch { path, .. } => Some(path),
            _ => None,
        })
    }
}
