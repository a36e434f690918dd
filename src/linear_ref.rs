//! Linear referencing: projecting a point onto a polyline and cutting a
//! sub-linestring between two curvilinear abscissas.
//!
//! Grounded on the `geo` crate usage pattern in
//! `examples/other_examples/f59ccd26_michaelkirk-ltn__backend-src-map_model.rs.rs`
//! (`LineLocatePoint`, `LineInterpolatePoint`, `Euclidean`, `Length`).

use geo::{Euclidean, Length, LineInterpolatePoint, LineLocatePoint};
use geo_types::{LineString, Point};

/// Projects `point` onto `line`, returning the curvilinear abscissa in
/// `[0, line.length()]`.
pub fn project(point: Point<f64>, line: &LineString<f64>) -> f64 {
    let length = Euclidean.length(line);
    let fraction = line.line_locate_point(&point).unwrap_or(0.0);
    fraction * length
}

/// Returns the sub-linestring of `line` between abscissas `s0` and `s1`
/// (order-independent), inserting interpolated vertices at both endpoints.
/// Returns `None` for a degenerate (zero-length) interval.
pub fn cut(line: &LineString<f64>, s0: f64, s1: f64) -> Option<LineString<f64>> {
    let length = Euclidean.length(line);
    if length <= 0.0 {
        return None;
    }

    let (lo, hi) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };
    let lo = lo.clamp(0.0, length);
    let hi = hi.clamp(0.0, length);
    if hi - lo <= f64::EPSILON {
        return None;
    }

    let f0 = lo / length;
    let f1 = hi / length;

    let mut points: Vec<Point<f64>> = vec![line
        .line_interpolate_point(f0)
        .unwrap_or_else(|| line.points().next().unwrap())];

    let mut acc = 0.0;
    for window in line.lines() {
        let seg_len = Euclidean.length(&geo_types::Line::new(window.start, window.end));
        let seg_start = acc;
        let seg_end = acc + seg_len;
        acc = seg_end;

        if seg_end <= lo || seg_start >= hi {
            continue;
        }
        let vertex_abscissa = seg_end;
        if vertex_abscissa > lo && vertex_abscissa < hi {
            points.push(window.end.into());
        }
    }

    points.push(
        line.line_interpolate_point(f1)
            .unwrap_or_else(|| line.points().last().unwrap()),
    );

    points.dedup_by(|a, b| a.x() == b.x() && a.y() == b.y());
    if points.len() < 2 {
        return None;
    }

    Some(LineString::from(points.into_iter().map(|p| p.0).collect::<Vec<_>>()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn straight_line() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (100.0, 0.0)])
    }

    #[test]
    fn projects_midpoint() {
        let line = straight_line();
        let s = project(Point::new(50.0, 5.0), &line);
        assert!((s - 50.0).abs() < 1e-6);
    }

    #[test]
    fn cuts_between_abscissas() {
        let line = straight_line();
        let sub = cut(&line, 10.0, 40.0).unwrap();
        assert!((Euclidean.length(&sub) - 30.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_interval_is_none() {
        let line = straight_line();
        assert!(cut(&line, 20.0, 20.0).is_none());
    }
}
