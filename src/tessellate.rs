use crate::element::Primitive;
use crate::geometry::Point;
use crate::renderer::Surface;
use crate::stroke::StrokeOutline;
use crate::text::{ApproxMeasure, FontMeasure, TextMeasure};

pub const INK: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Indexed triangle list in canvas pixels.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn push_quad(&mut self, corners: [Point; 4], color: [f32; 4]) {
        let base = self.base();
        self.vertices
            .extend(corners.iter().map(|&position| Vertex { position, color }));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn push_segment(&mut self, p1: Point, p2: Point, width: f32, color: [f32; 4]) {
        let dx = p2[0] - p1[0];
        let dy = p2[1] - p1[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len > 0.0 {
            let nx = -dy / len * width * 0.5;
            let ny = dx / len * width * 0.5;
            self.push_quad(
                [
                    [p1[0] - nx, p1[1] - ny],
                    [p1[0] + nx, p1[1] + ny],
                    [p2[0] + nx, p2[1] + ny],
                    [p2[0] - nx, p2[1] - ny],
                ],
                color,
            );
        }
    }

    pub fn push_polyline(&mut self, points: &[Point], width: f32, color: [f32; 4]) {
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], width, color);
        }
    }

    /// Fan from `center` over consecutive `rim` points.
    pub fn push_fan(&mut self, center: Point, rim: &[Point], color: [f32; 4]) {
        if rim.len() < 2 {
            return;
        }
        let base = self.base();
        self.vertices.push(Vertex { position: center, color });
        self.vertices
            .extend(rim.iter().map(|&position| Vertex { position, color }));
        for i in 1..rim.len() as u32 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    pub fn push_outline(&mut self, outline: &StrokeOutline, color: [f32; 4]) {
        let rails = outline.left.iter().zip(&outline.right).collect::<Vec<_>>();
        for pair in rails.windows(2) {
            let (l0, r0) = pair[0];
            let (l1, r1) = pair[1];
            self.push_quad([*l0, *r0, *r1, *l1], color);
        }
        if let Some(&first) = outline.centers.first() {
            self.push_fan(first, &outline.start_cap(), color);
        }
        if let Some(&last) = outline.centers.last() {
            self.push_fan(last, &outline.end_cap(), color);
        }
    }
}

/// `Surface` that tessellates everything into one `Mesh`.
pub struct MeshSurface {
    pub mesh: Mesh,
    pub color: [f32; 4],
    pub stroke_width: f32,
    font: Option<FontMeasure>,
}

impl MeshSurface {
    pub fn new(stroke_width: f32, font: Option<FontMeasure>) -> Self {
        Self {
            mesh: Mesh::default(),
            color: INK,
            stroke_width,
            font,
        }
    }
}

impl Surface for MeshSurface {
    fn clear(&mut self) {
        self.mesh.clear();
    }

    fn draw_primitive(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Rough(lines) => {
                for line in lines {
                    self.mesh.push_polyline(line, self.stroke_width, self.color);
                }
            }
            Primitive::Filled(outline) => self.mesh.push_outline(outline, self.color),
            Primitive::None => {}
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32) {
        let color = self.color;
        match &self.font {
            Some(font) => {
                let mesh = &mut self.mesh;
                font.rasterize(text, origin, size, |x, y, coverage| {
                    if coverage > 0.05 {
                        let c = [color[0], color[1], color[2], color[3] * coverage.min(1.0)];
                        mesh.push_quad([[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0]], c);
                    }
                });
            }
            None => {
                // No glyphs without a font; mark the measured run instead.
                let width = ApproxMeasure.measure_text(text, size);
                let y = origin[1] + size * 0.9;
                self.mesh
                    .push_segment([origin[0], y], [origin[0] + width, y], self.stroke_width, color);
            }
        }
    }
}
