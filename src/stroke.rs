//! Variable-width outline for pen strokes.
//!
//! Samples are first pulled toward their predecessor (streamline), then each
//! one gets a radius from a pressure value simulated out of pointer speed:
//! fast segments thin the stroke, slow ones thicken it. The outline is the
//! pair of rails offset along the normal, closed by round caps.

use crate::geometry::{Point, distance};
use serde::{Deserialize, Serialize};

const RATE_OF_PRESSURE_CHANGE: f32 = 0.275;
const CAP_STEPS: usize = 8;
const MIN_RADIUS: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeOptions {
    /// Nominal diameter of the stroke.
    pub size: f32,
    /// How much simulated pressure affects the width, from 0 to 1.
    pub thinning: f32,
    /// Blend between successive normals, from 0 to 1.
    pub smoothing: f32,
    /// Pull of each sample toward the previous one, from 0 to 1.
    pub streamline: f32,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            size: 8.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeOutline {
    pub centers: Vec<Point>,
    pub left: Vec<Point>,
    pub right: Vec<Point>,
    pub radii: Vec<f32>,
}

impl StrokeOutline {
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Arc around the first sample, from the right rail back to the left one.
    /// A single-sample stroke gets a full circle.
    pub fn start_cap(&self) -> Vec<Point> {
        match (self.centers.first(), self.right.first(), self.radii.first()) {
            (Some(&center), Some(&from), _) => arc(center, from, std::f32::consts::PI),
            (Some(&center), None, Some(&radius)) => {
                arc(center, [center[0] + radius, center[1]], std::f32::consts::TAU)
            }
            _ => Vec::new(),
        }
    }

    /// Arc around the last sample, from the left rail over to the right one.
    pub fn end_cap(&self) -> Vec<Point> {
        match (self.centers.last(), self.left.last()) {
            (Some(&center), Some(&from)) => arc(center, from, std::f32::consts::PI),
            _ => Vec::new(),
        }
    }

    /// Closed polygon suitable for a fill.
    pub fn polygon(&self) -> Vec<Point> {
        let mut polygon = Vec::with_capacity(self.left.len() * 2 + CAP_STEPS * 2 + 2);
        polygon.extend_from_slice(&self.left);
        polygon.extend(self.end_cap());
        polygon.extend(self.right.iter().rev());
        polygon.extend(self.start_cap());
        polygon
    }
}

fn rotate(v: Point, angle: f32) -> Point {
    let (sin, cos) = angle.sin_cos();
    [v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos]
}

fn arc(center: Point, from: Point, sweep: f32) -> Vec<Point> {
    let v = [from[0] - center[0], from[1] - center[1]];
    (0..=CAP_STEPS)
        .map(|step| {
            let r = rotate(v, -sweep * step as f32 / CAP_STEPS as f32);
            [center[0] + r[0], center[1] + r[1]]
        })
        .collect()
}

fn lerp(a: Point, b: Point, t: f32) -> Point {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

fn normalize(v: Point) -> Option<Point> {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    (len > f32::EPSILON).then(|| [v[0] / len, v[1] / len])
}

fn streamlined(points: &[Point], streamline: f32) -> Vec<Point> {
    let t = 0.15 + (1.0 - streamline.clamp(0.0, 1.0)) * 0.85;
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    let mut prev = points[0];
    out.push(prev);
    for &p in &points[1..] {
        prev = lerp(prev, p, t);
        if out.last().is_some_and(|last| distance(*last, prev) > f32::EPSILON) {
            out.push(prev);
        }
    }
    if let Some(&raw_last) = points.last() {
        if out.last().is_some_and(|last| distance(*last, raw_last) > f32::EPSILON) {
            out.push(raw_last);
        }
    }
    out
}

pub fn stroke_outline(points: &[Point], options: &StrokeOptions) -> StrokeOutline {
    if points.is_empty() {
        return StrokeOutline::default();
    }

    let centers = streamlined(points, options.streamline);
    let size = options.size.max(MIN_RADIUS);

    let mut pressure = 0.5_f32;
    let mut radii = Vec::with_capacity(centers.len());
    for (i, center) in centers.iter().enumerate() {
        if i > 0 {
            let speed = (distance(centers[i - 1], *center) / size).min(1.0);
            let rest = 1.0 - speed;
            pressure = (pressure + (rest - pressure) * speed * RATE_OF_PRESSURE_CHANGE).min(1.0);
        }
        let radius = if options.thinning != 0.0 {
            size * (0.5 - options.thinning * (0.5 - pressure))
        } else {
            size / 2.0
        };
        radii.push(radius.max(MIN_RADIUS));
    }

    if centers.len() == 1 {
        return StrokeOutline {
            centers,
            left: Vec::new(),
            right: Vec::new(),
            radii,
        };
    }

    let mut left = Vec::with_capacity(centers.len());
    let mut right = Vec::with_capacity(centers.len());
    let mut prev_dir: Option<Point> = None;
    let blend = 1.0 - options.smoothing.clamp(0.0, 1.0) * 0.5;
    for (i, center) in centers.iter().enumerate() {
        let raw = if i + 1 < centers.len() {
            [centers[i + 1][0] - center[0], centers[i + 1][1] - center[1]]
        } else {
            [center[0] - centers[i - 1][0], center[1] - centers[i - 1][1]]
        };
        let dir = match (prev_dir, normalize(raw)) {
            (Some(prev), Some(cur)) => normalize(lerp(prev, cur, blend)).unwrap_or(cur),
            (None, Some(cur)) => cur,
            (Some(prev), None) => prev,
            (None, None) => [1.0, 0.0],
        };
        prev_dir = Some(dir);

        let normal = [-dir[1] * radii[i], dir[0] * radii[i]];
        left.push([center[0] + normal[0], center[1] + normal[1]]);
        right.push([center[0] - normal[0], center[1] - normal[1]]);
    }

    StrokeOutline {
        centers,
        left,
        right,
        radii,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path() {
        let outline = stroke_outline(&[], &StrokeOptions::default());
        assert!(outline.is_empty());
        assert!(outline.polygon().is_empty());
    }

    #[test]
    fn test_single_sample_is_a_dot() {
        let outline = stroke_outline(&[[10.0, 10.0]], &StrokeOptions::default());
        assert!(outline.left.is_empty());
        let polygon = outline.polygon();
        assert_eq!(polygon.len(), CAP_STEPS + 1);
        for p in polygon {
            assert!((distance(p, [10.0, 10.0]) - outline.radii[0]).abs() < 0.001);
        }
    }

    #[test]
    fn test_rails_straddle_a_horizontal_stroke() {
        let points: Vec<Point> = (0..10).map(|i| [i as f32 * 5.0, 0.0]).collect();
        let outline = stroke_outline(&points, &StrokeOptions::default());
        assert_eq!(outline.left.len(), outline.centers.len());
        assert_eq!(outline.right.len(), outline.centers.len());
        for ((l, r), c) in outline.left.iter().zip(&outline.right).zip(&outline.centers) {
            assert!(l[1] > c[1]);
            assert!(r[1] < c[1]);
        }
        assert!(outline.radii.iter().all(|r| *r > 0.0 && *r <= 8.0));
    }

    #[test]
    fn test_no_thinning_gives_constant_width() {
        let options = StrokeOptions { thinning: 0.0, ..StrokeOptions::default() };
        let outline = stroke_outline(&[[0.0, 0.0], [50.0, 0.0], [100.0, 0.0]], &options);
        assert!(outline.radii.iter().all(|r| (*r - 4.0).abs() < 0.001));
    }

    #[test]
    fn test_polygon_is_finite_for_repeated_samples() {
        let outline = stroke_outline(&[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [4.0, 4.0]], &StrokeOptions::default());
        assert!(outline.polygon().iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }
}
