//! Connector geometry: the curved quadrilateral linking a parent segment to
//! the child bar that breaks it down.

/// Number of line segments used to approximate one cubic Bezier.
pub const BEZIER_SAMPLES: usize = 32;

/// Curve bow, as a multiple of the bar height (0.5 track units at the
/// default bar height of 0.4).
pub const BOW_FACTOR: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    /// Two control points, then the end point.
    CubicTo(Point, Point, Point),
    Close,
}

/// A closed outline in data coordinates (x in bar fractions, y in tracks,
/// growing downward).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub cmds: Vec<PathCmd>,
}

impl Path {
    /// On-curve points in order: move/line targets and curve end points.
    pub fn vertices(&self) -> Vec<Point> {
        self.cmds
            .iter()
            .filter_map(|c| match *c {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) | PathCmd::CubicTo(_, _, p) => Some(p),
                PathCmd::Close => None,
            })
            .collect()
    }

    /// Polyline approximation, each cubic sampled `samples` times.
    pub fn flatten(&self, samples: usize) -> Vec<Point> {
        let mut out = Vec::new();
        let mut cursor: Option<Point> = None;
        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => {
                    out.push(p);
                    cursor = Some(p);
                }
                PathCmd::CubicTo(c1, c2, end) => {
                    let start = cursor.unwrap_or(end);
                    let steps = samples.max(1);
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        out.push(evaluate_cubic(start, c1, c2, end, t));
                    }
                    cursor = Some(end);
                }
                PathCmd::Close => {}
            }
        }
        out
    }
}

pub fn evaluate_cubic(start: Point, ctrl1: Point, ctrl2: Point, end: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    let a = mt2 * mt;
    let b = 3.0 * mt2 * t;
    let c = 3.0 * mt * t2;
    let d = t2 * t;
    Point::new(
        start.x * a + ctrl1.x * b + ctrl2.x * c + end.x * d,
        start.y * a + ctrl1.y * b + ctrl2.y * c + end.y * d,
    )
}

/// Cubic from `from` to `to` that leaves and enters vertically, bowing by
/// `bow` toward the far end.
fn curve_between(from: Point, to: Point, bow: f64) -> PathCmd {
    let bow = if to.y < from.y { -bow } else { bow };
    PathCmd::CubicTo(
        Point::new(from.x, from.y + bow),
        Point::new(to.x, to.y - bow),
        to,
    )
}

/// Outline joining the parent segment `[parent_left, parent_right]` on track
/// `parent_track` to the full `[0, 1]` span of the child on `child_track`.
///
/// The parent edge and child edge facing each other are used, so the patch
/// works whether the child sits below or above its parent.
pub fn shade_path(
    parent_left: f64,
    parent_right: f64,
    parent_track: f64,
    child_track: f64,
    bar_height: f64,
) -> Path {
    let dir = if child_track < parent_track { -1.0 } else { 1.0 };
    let parent_y = parent_track + dir * bar_height / 2.0;
    let child_y = child_track - dir * bar_height / 2.0;
    let bow = BOW_FACTOR * bar_height;

    let p_left = Point::new(parent_left, parent_y);
    let p_right = Point::new(parent_right, parent_y);
    let c_right = Point::new(1.0, child_y);
    let c_left = Point::new(0.0, child_y);

    Path {
        cmds: vec![
            PathCmd::MoveTo(p_left),
            PathCmd::LineTo(p_right),
            curve_between(p_right, c_right, bow),
            PathCmd::LineTo(c_left),
            curve_between(c_left, p_left, bow),
            PathCmd::Close,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: f64 = 0.4;

    #[test]
    fn child_below_parent_uses_facing_edges() {
        let path = shade_path(0.0, 0.3, 0.0, 1.0, H);
        let v = path.vertices();
        assert_eq!(
            v,
            vec![
                Point::new(0.0, 0.2),
                Point::new(0.3, 0.2),
                Point::new(1.0, 0.8),
                Point::new(0.0, 0.8),
                Point::new(0.0, 0.2),
            ]
        );
    }

    #[test]
    fn child_above_parent_flips_edges() {
        let path = shade_path(0.5, 0.9, 2.0, 0.0, H);
        let v = path.vertices();
        assert_eq!(v[0], Point::new(0.5, 1.8));
        assert_eq!(v[1], Point::new(0.9, 1.8));
        assert_eq!(v[2], Point::new(1.0, 0.2));
        assert_eq!(v[3], Point::new(0.0, 0.2));
    }

    #[test]
    fn curves_bow_toward_their_end_point() {
        let path = shade_path(0.0, 0.3, 0.0, 1.0, H);
        let bow = BOW_FACTOR * H;
        let PathCmd::CubicTo(c1, c2, end) = path.cmds[2] else {
            panic!("expected a curve");
        };
        assert_eq!(c1, Point::new(0.3, 0.2 + bow));
        assert_eq!(c2, Point::new(1.0, 0.8 - bow));
        assert_eq!(end, Point::new(1.0, 0.8));

        // Return curve runs upward, so the bow is negated.
        let PathCmd::CubicTo(c1, c2, _) = path.cmds[4] else {
            panic!("expected a curve");
        };
        assert_eq!(c1, Point::new(0.0, 0.8 - bow));
        assert_eq!(c2, Point::new(0.0, 0.2 + bow));
    }

    #[test]
    fn flatten_hits_endpoints() {
        let path = shade_path(0.2, 0.6, 0.0, 1.0, H);
        let pts = path.flatten(BEZIER_SAMPLES);
        assert_eq!(pts.len(), 2 + BEZIER_SAMPLES + 1 + BEZIER_SAMPLES);
        assert_eq!(pts[0], Point::new(0.2, 0.2));
        assert_eq!(pts[1 + BEZIER_SAMPLES], Point::new(1.0, 0.8));
        assert_eq!(*pts.last().unwrap(), Point::new(0.2, 0.2));
        for p in &pts {
            assert!((0.0..=1.0).contains(&p.x), "{p:?}");
        }
    }

    #[test]
    fn cubic_endpoints() {
        let (a, b, c, d) = (
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        );
        assert_eq!(evaluate_cubic(a, b, c, d, 0.0), a);
        assert_eq!(evaluate_cubic(a, b, c, d, 1.0), d);
        assert_eq!(evaluate_cubic(a, b, c, d, 0.5), Point::new(0.5, 0.75));
    }
}
