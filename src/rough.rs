use crate::geometry::Point;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughOptions {
    pub roughness: f32,
    pub bowing: f32,
    pub max_randomness_offset: f32,
    pub disable_multi_stroke: bool,
    pub preserve_vertices: bool,
}

impl Default for RoughOptions {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            bowing: 1.0,
            max_randomness_offset: 2.0,
            disable_multi_stroke: false,
            preserve_vertices: false,
        }
    }
}

/// Hand-drawn polyline generator. Output depends only on the seed and the
/// inputs, so an element rebuilt from the same geometry looks the same.
pub struct RoughGenerator {
    rng: StdRng,
}

impl RoughGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn offset(&mut self, min: f32, max: f32, options: &RoughOptions, roughness_gain: f32) -> f32 {
        options.roughness * roughness_gain * ((self.random() * (max - min)) + min)
    }

    fn offset_opt(&mut self, x: f32, options: &RoughOptions, roughness_gain: f32) -> f32 {
        self.offset(-x, x, options, roughness_gain)
    }

    /// Per-shape variation around `base`, so sibling shapes don't share a wobble.
    pub fn vary(&mut self, base: &RoughOptions) -> RoughOptions {
        RoughOptions {
            roughness: base.roughness * (0.7 + self.random() * 0.6),
            bowing: base.bowing * (0.3 + self.random() * 1.2),
            max_randomness_offset: base.max_randomness_offset * (0.5 + self.random() * 0.75),
            ..base.clone()
        }
    }

    pub fn rough_line(&mut self, start: Point, end: Point, options: &RoughOptions) -> Vec<Point> {
        let mut points = Vec::new();

        let length_sq = (start[0] - end[0]).powi(2) + (start[1] - end[1]).powi(2);
        let length = length_sq.sqrt();

        let roughness_gain = if length < 200.0 {
            1.0
        } else if length > 500.0 {
            0.4
        } else {
            (-0.0016668) * length + 1.233334
        };

        let mut offset = options.max_randomness_offset;
        if (offset * offset * 100.0) > length_sq {
            offset = length / 10.0;
        }

        let diverge_point = 0.2 + self.random() * 0.2;
        let mid_disp_x = options.bowing * options.max_randomness_offset * (end[1] - start[1]) / 200.0;
        let mid_disp_y = options.bowing * options.max_randomness_offset * (start[0] - end[0]) / 200.0;

        let mid_disp_x = mid_disp_x + self.offset_opt(mid_disp_x, options, roughness_gain);
        let mid_disp_y = mid_disp_y + self.offset_opt(mid_disp_y, options, roughness_gain);

        let start_x_offset = if options.preserve_vertices { 0.0 } else { self.offset_opt(offset, options, roughness_gain) };
        let start_y_offset = if options.preserve_vertices { 0.0 } else { self.offset_opt(offset, options, roughness_gain) };
        points.push([start[0] + start_x_offset, start[1] + start_y_offset]);

        let cp1 = [
            mid_disp_x + start[0] + (end[0] - start[0]) * diverge_point + self.offset_opt(offset, options, roughness_gain),
            mid_disp_y + start[1] + (end[1] - start[1]) * diverge_point + self.offset_opt(offset, options, roughness_gain),
        ];
        let cp2 = [
            mid_disp_x + start[0] + 2.0 * (end[0] - start[0]) * diverge_point + self.offset_opt(offset, options, roughness_gain),
            mid_disp_y + start[1] + 2.0 * (end[1] - start[1]) * diverge_point + self.offset_opt(offset, options, roughness_gain),
        ];

        let end_x_offset = if options.preserve_vertices { 0.0 } else { self.offset_opt(offset, options, roughness_gain) };
        let end_y_offset = if options.preserve_vertices { 0.0 } else { self.offset_opt(offset, options, roughness_gain) };
        let bezier_points = bezier_curve(points[0], cp1, cp2, [end[0] + end_x_offset, end[1] + end_y_offset], 10);

        points.extend(bezier_points);
        points
    }

    /// One or two wobbly passes over the same segment.
    pub fn double_line(&mut self, start: Point, end: Point, options: &RoughOptions) -> Vec<Vec<Point>> {
        let mut lines = vec![self.rough_line(start, end, options)];
        if !options.disable_multi_stroke {
            lines.push(self.rough_line(start, end, options));
        }
        lines
    }

    pub fn rough_rectangle(&mut self, position: Point, size: [f32; 2], options: &RoughOptions) -> Vec<Vec<Point>> {
        let corners = [
            position,
            [position[0] + size[0], position[1]],
            [position[0] + size[0], position[1] + size[1]],
            [position[0], position[1] + size[1]],
        ];

        let mut lines = Vec::new();
        for i in 0..4 {
            lines.extend(self.double_line(corners[i], corners[(i + 1) % 4], options));
        }
        lines
    }

    /// Open polyline through `points`, each segment drawn rough.
    pub fn linear_path(&mut self, points: &[Point], options: &RoughOptions) -> Vec<Vec<Point>> {
        match points {
            [] => Vec::new(),
            [only] => self.double_line(*only, *only, options),
            _ => {
                let mut lines = Vec::with_capacity(points.len() * 2);
                for pair in points.windows(2) {
                    lines.extend(self.double_line(pair[0], pair[1], options));
                }
                lines
            }
        }
    }
}

fn bezier_curve(p0: Point, p1: Point, p2: Point, p3: Point, segments: u32) -> Vec<Point> {
    let mut points = Vec::with_capacity(segments as usize);

    for i in 1..=segments {
        let t = i as f32 / segments as f32;
        let u = 1.0 - t;
        let tt = t * t;
        let uu = u * u;
        let uuu = uu * u;
        let ttt = tt * t;

        let x = uuu * p0[0] + 3.0 * uu * t * p1[0] + 3.0 * u * tt * p2[0] + ttt * p3[0];
        let y = uuu * p0[1] + 3.0 * uu * t * p1[1] + 3.0 * u * tt * p2[1] + ttt * p3[1];

        points.push([x, y]);
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_output() {
        let options = RoughOptions::default();
        let a = RoughGenerator::new(7).rough_line([0.0, 0.0], [100.0, 40.0], &options);
        let b = RoughGenerator::new(7).rough_line([0.0, 0.0], [100.0, 40.0], &options);
        assert_eq!(a, b);
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn test_rough_line_stays_close() {
        let options = RoughOptions::default();
        let line = RoughGenerator::new(1).rough_line([0.0, 0.0], [100.0, 0.0], &options);
        let last = line[line.len() - 1];
        assert!((last[0] - 100.0).abs() < 5.0);
        assert!(line.iter().all(|p| p[1].abs() < 10.0));
    }

    #[test]
    fn test_rectangle_and_path_stroke_counts() {
        let options = RoughOptions::default();
        let mut generator = RoughGenerator::new(3);
        assert_eq!(generator.rough_rectangle([0.0, 0.0], [10.0, 10.0], &options).len(), 8);

        let single = RoughOptions { disable_multi_stroke: true, ..RoughOptions::default() };
        assert_eq!(generator.rough_rectangle([0.0, 0.0], [10.0, 10.0], &single).len(), 4);

        let path = [[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]];
        assert_eq!(generator.linear_path(&path, &options).len(), 4);
        assert_eq!(generator.linear_path(&path[..1], &options).len(), 2);
        assert!(generator.linear_path(&[], &options).is_empty());
    }

    #[test]
    fn test_zero_length_line_is_finite() {
        let options = RoughOptions::default();
        let line = RoughGenerator::new(9).rough_line([4.0, 4.0], [4.0, 4.0], &options);
        assert!(line.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }
}
