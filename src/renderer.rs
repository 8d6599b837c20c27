use crate::element::{Element, ElementId, ElementKind, Primitive};
use crate::geometry::Point;

/// Drawing capability handed to the renderer.
pub trait Surface {
    fn clear(&mut self);
    fn draw_primitive(&mut self, primitive: &Primitive);
    /// Draws `text` with the top of the line at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, size: f32);
}

/// Repaints `elements` in order, skipping the one under the text input.
pub fn render<'a>(
    surface: &mut dyn Surface,
    elements: impl IntoIterator<Item = &'a Element>,
    editing: Option<ElementId>,
    font_size: f32,
) {
    surface.clear();
    for element in elements {
        if Some(element.id) == editing {
            continue;
        }
        match element.kind {
            ElementKind::Text => surface.draw_text(&element.text, [element.x1, element.y1], font_size),
            _ => surface.draw_primitive(&element.primitive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::element::{ElementFactory, Tool};
    use crate::geometry::Coords;
    use crate::text::ApproxMeasure;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Clear,
        Rough(usize),
        Filled,
        Text(String, Point),
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        pub calls: Vec<Call>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn draw_primitive(&mut self, primitive: &Primitive) {
            match primitive {
                Primitive::Rough(lines) => self.calls.push(Call::Rough(lines.len())),
                Primitive::Filled(_) => self.calls.push(Call::Filled),
                Primitive::None => {}
            }
        }

        fn draw_text(&mut self, text: &str, origin: Point, _size: f32) {
            self.calls.push(Call::Text(text.to_string(), origin));
        }
    }

    #[test]
    fn test_render_order_and_skip() {
        let factory = ElementFactory::new(&BoardConfig::default(), Box::new(ApproxMeasure));
        let coords = Coords::new(0.0, 0.0, 10.0, 10.0);
        let elements = [
            factory.create(ElementId(0), coords, Tool::Box, Vec::new(), "").unwrap(),
            factory.create(ElementId(1), coords, Tool::Pen, vec![[0.0, 0.0], [10.0, 10.0]], "").unwrap(),
            factory.create(ElementId(2), coords, Tool::Text, vec![[0.0, 0.0]], "a").unwrap(),
            factory.create(ElementId(3), coords, Tool::Text, vec![[0.0, 0.0]], "b").unwrap(),
        ];

        let mut surface = RecordingSurface::default();
        render(&mut surface, &elements, Some(ElementId(3)), 24.0);
        assert_eq!(
            surface.calls,
            vec![
                Call::Clear,
                Call::Rough(8),
                Call::Filled,
                Call::Text("a".to_string(), [0.0, 0.0]),
            ]
        );
    }
}
