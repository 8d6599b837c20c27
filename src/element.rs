use crate::config::BoardConfig;
use crate::error::ElementError;
use crate::geometry::{Coords, Point, bounds_of};
use crate::rough::{RoughGenerator, RoughOptions};
use crate::stroke::{StrokeOptions, StrokeOutline, stroke_outline};
use crate::text::TextMeasure;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Line,
    Box,
    Pencil,
    Pen,
    Text,
    Selection,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Line,
        Tool::Box,
        Tool::Pencil,
        Tool::Pen,
        Tool::Text,
        Tool::Selection,
        Tool::Eraser,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Line => "Line",
            Tool::Box => "Box",
            Tool::Pencil => "Pencil",
            Tool::Pen => "Pen",
            Tool::Text => "Text",
            Tool::Selection => "Selection",
            Tool::Eraser => "Eraser",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| ElementError::UnknownTool(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Line,
    Box,
    Pencil,
    Pen,
    Text,
}

impl ElementKind {
    pub fn is_freehand(self) -> bool {
        matches!(self, ElementKind::Pencil | ElementKind::Pen)
    }
}

impl TryFrom<Tool> for ElementKind {
    type Error = ElementError;

    fn try_from(tool: Tool) -> Result<Self, Self::Error> {
        match tool {
            Tool::Line => Ok(ElementKind::Line),
            Tool::Box => Ok(ElementKind::Box),
            Tool::Pencil => Ok(ElementKind::Pencil),
            Tool::Pen => Ok(ElementKind::Pen),
            Tool::Text => Ok(ElementKind::Text),
            Tool::Selection | Tool::Eraser => Err(ElementError::UnsupportedElementType(tool)),
        }
    }
}

impl From<ElementKind> for Tool {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Line => Tool::Line,
            ElementKind::Box => Tool::Box,
            ElementKind::Pencil => Tool::Pencil,
            ElementKind::Pen => Tool::Pen,
            ElementKind::Text => Tool::Text,
        }
    }
}

/// What the renderer draws for an element; derived from its geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Hand-drawn polylines.
    Rough(Vec<Vec<Point>>),
    /// Closed outline to fill.
    Filled(StrokeOutline),
    /// Drawn directly from the element (text).
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub path: Vec<Point>,
    pub text: String,
    pub primitive: Primitive,
}

impl Element {
    pub fn coords(&self) -> Coords {
        Coords::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Extent on the canvas: the samples for freehand strokes, the
    /// corners otherwise.
    pub fn bounds(&self) -> Coords {
        if self.kind.is_freehand() {
            if let Some(bounds) = bounds_of(&self.path) {
                return bounds;
            }
        }
        self.coords().ordered_box()
    }
}

fn seed_for(id: ElementId) -> u64 {
    id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x5851_F42D_4C95_7F2D
}

pub struct ElementFactory {
    measure: Box<dyn TextMeasure>,
    rough: RoughOptions,
    pen: StrokeOptions,
    font_size: f32,
    line_height: f32,
}

impl ElementFactory {
    pub fn new(config: &BoardConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            measure,
            rough: config.rough.clone(),
            pen: config.pen.clone(),
            font_size: config.font_size,
            line_height: config.line_height,
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn create(
        &self,
        id: ElementId,
        coords: Coords,
        tool: Tool,
        path: Vec<Point>,
        text: &str,
    ) -> Result<Element, ElementError> {
        let kind = ElementKind::try_from(tool)?;
        let mut coords = coords;
        let mut path = path;
        if path.is_empty() && kind.is_freehand() {
            path.push(coords.start());
        }

        let mut generator = RoughGenerator::new(seed_for(id));
        let primitive = match kind {
            ElementKind::Line => {
                let options = generator.vary(&self.rough);
                Primitive::Rough(generator.double_line(coords.start(), coords.end(), &options))
            }
            ElementKind::Box => {
                let options = generator.vary(&self.rough);
                let size = [coords.width(), coords.height()];
                Primitive::Rough(generator.rough_rectangle(coords.start(), size, &options))
            }
            ElementKind::Pencil => {
                let options = generator.vary(&self.rough);
                Primitive::Rough(generator.linear_path(&path, &options))
            }
            ElementKind::Pen => Primitive::Filled(stroke_outline(&path, &self.pen)),
            ElementKind::Text => {
                coords.x2 = coords.x1 + self.measure.measure_text(text, self.font_size);
                coords.y2 = coords.y1 + self.line_height;
                Primitive::None
            }
        };

        Ok(Element {
            id,
            kind,
            x1: coords.x1,
            y1: coords.y1,
            x2: coords.x2,
            y2: coords.y2,
            path,
            text: if kind == ElementKind::Text { text.to_string() } else { String::new() },
            primitive,
        })
    }

    /// Rebuilds `element` in canonical coordinate order. Freehand paths are
    /// reversed whenever their endpoints swap.
    pub fn normalized(&self, element: &Element) -> Result<Element, ElementError> {
        let coords = element.coords();
        let (coords, path) = match element.kind {
            ElementKind::Box => {
                let ordered = coords.ordered_box();
                (ordered, vec![ordered.start(), ordered.end()])
            }
            ElementKind::Line => {
                let (ordered, _) = coords.ordered_line();
                (ordered, vec![ordered.start(), ordered.end()])
            }
            ElementKind::Pencil | ElementKind::Pen => {
                let (ordered, swapped) = coords.ordered_line();
                let mut path = element.path.clone();
                if swapped {
                    path.reverse();
                }
                (ordered, path)
            }
            ElementKind::Text => (coords, element.path.clone()),
        };
        self.create(element.id, coords, element.kind.into(), path, &element.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxMeasure;

    fn factory() -> ElementFactory {
        ElementFactory::new(&BoardConfig::default(), Box::new(ApproxMeasure))
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.to_string().parse::<Tool>(), Ok(tool));
        }
        assert_eq!(
            "Circle".parse::<Tool>(),
            Err(ElementError::UnknownTool("Circle".to_string()))
        );
    }

    #[test]
    fn test_modes_are_not_elements() {
        let factory = factory();
        for tool in [Tool::Selection, Tool::Eraser] {
            let result = factory.create(ElementId(0), Coords::default(), tool, Vec::new(), "");
            assert_eq!(result, Err(ElementError::UnsupportedElementType(tool)));
        }
    }

    #[test]
    fn test_primitive_per_kind() {
        let factory = factory();
        let coords = Coords::new(10.0, 10.0, 50.0, 50.0);
        let path = vec![[10.0, 10.0], [30.0, 20.0], [50.0, 50.0]];

        let line = factory.create(ElementId(1), coords, Tool::Line, path.clone(), "").unwrap();
        assert!(matches!(&line.primitive, Primitive::Rough(lines) if lines.len() == 2));

        let rect = factory.create(ElementId(2), coords, Tool::Box, path.clone(), "").unwrap();
        assert!(matches!(&rect.primitive, Primitive::Rough(lines) if lines.len() == 8));

        let pencil = factory.create(ElementId(3), coords, Tool::Pencil, path.clone(), "").unwrap();
        assert!(matches!(&pencil.primitive, Primitive::Rough(lines) if lines.len() == 4));

        let pen = factory.create(ElementId(4), coords, Tool::Pen, path.clone(), "").unwrap();
        assert!(matches!(&pen.primitive, Primitive::Filled(outline) if !outline.is_empty()));
        assert_eq!(pen.path, path);
        assert!(pen.text.is_empty());
    }

    #[test]
    fn test_text_measures_its_box() {
        let factory = factory();
        let text = factory
            .create(ElementId(5), Coords::new(100.0, 40.0, 0.0, 0.0), Tool::Text, vec![[100.0, 40.0]], "hello")
            .unwrap();
        assert_eq!(text.primitive, Primitive::None);
        assert!((text.x2 - (100.0 + 5.0 * 24.0 * 0.6)).abs() < 0.001);
        assert_eq!(text.y2, 64.0);
        assert_eq!(text.text, "hello");
    }

    #[test]
    fn test_rebuild_is_pure() {
        let factory = factory();
        let coords = Coords::new(0.0, 0.0, 80.0, 30.0);
        let a = factory.create(ElementId(9), coords, Tool::Box, Vec::new(), "").unwrap();
        let b = factory.create(ElementId(9), coords, Tool::Box, Vec::new(), "").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_reverses_freehand_path() {
        let factory = factory();
        let path = vec![[40.0, 0.0], [20.0, 5.0], [0.0, 0.0]];
        let pencil = factory
            .create(ElementId(2), Coords::new(40.0, 0.0, 0.0, 0.0), Tool::Pencil, path, "")
            .unwrap();
        let normalized = factory.normalized(&pencil).unwrap();
        assert_eq!(normalized.coords(), Coords::new(0.0, 0.0, 40.0, 0.0));
        assert_eq!(normalized.path, vec![[0.0, 0.0], [20.0, 5.0], [40.0, 0.0]]);
        assert_eq!(factory.normalized(&normalized).unwrap(), normalized);
    }

    #[test]
    fn test_normalize_box_is_idempotent() {
        let factory = factory();
        let rect = factory
            .create(ElementId(3), Coords::new(50.0, 50.0, 10.0, 10.0), Tool::Box, Vec::new(), "")
            .unwrap();
        let once = factory.normalized(&rect).unwrap();
        assert_eq!(once.coords(), Coords::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(factory.normalized(&once).unwrap(), once);
    }

    #[test]
    fn test_freehand_bounds_follow_path() {
        let factory = factory();
        let path = vec![[5.0, 5.0], [30.0, -10.0], [20.0, 12.0]];
        let pen = factory
            .create(ElementId(1), Coords::new(5.0, 5.0, 20.0, 12.0), Tool::Pen, path, "")
            .unwrap();
        assert_eq!(pen.bounds(), Coords::new(5.0, -10.0, 30.0, 12.0));
    }
}
