//! Pointer-driven interaction engine.
//!
//! The board owns the element history and turns pointer and text events
//! into element edits. A gesture (draw, move, resize, erase, write) keeps a
//! private working buffer and the scene as it was before the gesture. Every
//! frame rebuilds the touched element from that buffer and overwrites the
//! current history slot; the terminal event puts the pre-gesture scene back
//! in that slot and commits the result on top, so each gesture becomes a
//! single undo step and a gesture that changed nothing leaves no trace.

use crate::config::BoardConfig;
use crate::element::{Element, ElementFactory, ElementId, ElementKind, Tool};
use crate::error::ElementError;
use crate::geometry::{Coords, Point};
use crate::history::History;
use crate::hit_test::{CursorStyle, Handle, element_at_position, resized_coordinates};
use crate::renderer::{Surface, render};
use crate::scene::Scene;
use crate::text::{TextMeasure, measure_from_config};

/// Offset recorded for elements that were just created rather than grabbed.
pub const NEW_ELEMENT_OFFSET: Point = [-1.0, -1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Idle,
    Drawing,
    Moving,
    Resizing,
    Writing,
    Erasing,
}

/// The element grabbed by the current gesture, as it was when grabbed.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionContext {
    pub element: Element,
    pub position: Option<Handle>,
    pub offset: Point,
    pub path_offsets: Vec<Point>,
}

/// Where the host should open its text input, and what to put in it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub id: ElementId,
    pub position: Point,
    pub text: String,
}

struct Gesture {
    baseline: Scene,
    down: Point,
    selection: Option<SelectionContext>,
    path: Vec<Point>,
}

pub struct Whiteboard {
    history: History<Scene>,
    factory: ElementFactory,
    tool: Tool,
    action: Action,
    gesture: Option<Gesture>,
    cursor: CursorStyle,
    next_id: u64,
}

impl Whiteboard {
    /// Builds a board measuring text with the configured font, if any.
    pub fn new(config: &BoardConfig) -> Self {
        let (measure, _) = measure_from_config(config.font_path.as_deref());
        Self::with_measure(config, measure)
    }

    pub fn with_measure(config: &BoardConfig, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            history: History::new(Scene::new()),
            factory: ElementFactory::new(config, measure),
            tool: Tool::Line,
            action: Action::Idle,
            gesture: None,
            cursor: CursorStyle::Default,
            next_id: 0,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn scene(&self) -> &Scene {
        self.history.current()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.scene().iter()
    }

    pub fn history(&self) -> &History<Scene> {
        &self.history
    }

    pub fn selection(&self) -> Option<&SelectionContext> {
        self.gesture.as_ref().and_then(|g| g.selection.as_ref())
    }

    pub fn font_size(&self) -> f32 {
        self.factory.font_size()
    }

    /// Element hidden from rendering because the host's text input shows it.
    pub fn editing(&self) -> Option<ElementId> {
        if self.action == Action::Writing {
            self.selection().map(|s| s.element.id)
        } else {
            None
        }
    }

    pub fn text_overlay(&self) -> Option<TextOverlay> {
        let id = self.editing()?;
        let element = self.scene().get(id)?;
        Some(TextOverlay {
            id,
            position: [element.x1, element.y1],
            text: element.text.clone(),
        })
    }

    pub fn select_tool(&mut self, tool: Tool) {
        log::debug!("tool {} -> {}", self.tool, tool);
        self.tool = tool;
        if tool != Tool::Selection {
            self.cursor = CursorStyle::Default;
        }
    }

    pub fn undo(&mut self) {
        self.abandon_gesture();
        self.history.undo();
    }

    pub fn redo(&mut self) {
        self.abandon_gesture();
        self.history.redo();
    }

    pub fn clear(&mut self) {
        self.abandon_gesture();
        self.history.clear();
        log::debug!("board cleared");
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        render(surface, self.elements(), self.editing(), self.font_size());
    }

    pub fn pointer_down(&mut self, p: Point) -> Result<(), ElementError> {
        if self.action != Action::Idle {
            log::trace!("pointer down ignored while {:?}", self.action);
            return Ok(());
        }
        let baseline = self.scene().clone();

        match self.tool {
            Tool::Eraser => {
                self.gesture = Some(Gesture {
                    baseline,
                    down: p,
                    selection: None,
                    path: Vec::new(),
                });
                self.action = Action::Erasing;
                self.erase_at(p);
            }
            Tool::Selection => {
                let Some((element, handle)) = element_at_position(p, self.scene().iter())
                    .map(|(element, handle)| (element.clone(), handle))
                else {
                    return Ok(());
                };
                let path_offsets = if element.kind.is_freehand() {
                    element.path.iter().map(|s| [p[0] - s[0], p[1] - s[1]]).collect()
                } else {
                    Vec::new()
                };
                self.action = match handle {
                    Handle::Inside => Action::Moving,
                    _ => Action::Resizing,
                };
                log::debug!("grabbed {} at {} ({:?})", element.id, handle, self.action);
                self.gesture = Some(Gesture {
                    baseline,
                    down: p,
                    path: element.path.clone(),
                    selection: Some(SelectionContext {
                        offset: [p[0] - element.x1, p[1] - element.y1],
                        position: Some(handle),
                        path_offsets,
                        element,
                    }),
                });
            }
            tool => {
                let id = ElementId(self.next_id);
                let path = vec![p];
                let coords = Coords::from_points(p, p);
                let element = self.factory.create(id, coords, tool, path.clone(), "")?;
                self.next_id += 1;

                let mut scene = baseline.clone();
                scene.insert(element.clone());
                self.history.amend(scene);

                self.action = if tool == Tool::Text { Action::Writing } else { Action::Drawing };
                log::debug!("created {} with {} ({:?})", id, tool, self.action);
                self.gesture = Some(Gesture {
                    baseline,
                    down: p,
                    path,
                    selection: Some(SelectionContext {
                        element,
                        position: None,
                        offset: NEW_ELEMENT_OFFSET,
                        path_offsets: vec![NEW_ELEMENT_OFFSET],
                    }),
                });
            }
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, p: Point) -> Result<(), ElementError> {
        match self.action {
            Action::Idle => {
                if self.tool == Tool::Selection {
                    self.cursor = element_at_position(p, self.scene().iter())
                        .map_or(CursorStyle::Default, |(_, handle)| handle.cursor());
                }
                Ok(())
            }
            Action::Drawing => self.draw_to(p),
            Action::Moving => self.move_to(p),
            Action::Resizing => self.resize_to(p),
            Action::Erasing => {
                self.erase_at(p);
                Ok(())
            }
            Action::Writing => Ok(()),
        }
    }

    pub fn pointer_up(&mut self, p: Point) -> Result<(), ElementError> {
        match self.action {
            Action::Drawing | Action::Resizing => {
                let grabbed = self
                    .gesture
                    .as_ref()
                    .and_then(|g| g.selection.as_ref().map(|s| (s.element.id, g.down)));
                let Some((id, down)) = grabbed else {
                    return self.finish_gesture();
                };
                let Some(element) = self.scene().get(id).cloned() else {
                    return self.finish_gesture();
                };

                if element.kind == ElementKind::Text && p == down {
                    log::debug!("editing text {}", id);
                    self.action = Action::Writing;
                    return Ok(());
                }

                let normalized = self.factory.normalized(&element)?;
                self.replace_current(normalized);
                self.finish_gesture()
            }
            Action::Moving | Action::Erasing => self.finish_gesture(),
            Action::Writing | Action::Idle => Ok(()),
        }
    }

    /// Ends the writing state with the host's final text. Empty text removes
    /// the element.
    pub fn commit_text(&mut self, text: &str) -> Result<(), ElementError> {
        if self.action != Action::Writing {
            return Ok(());
        }
        let Some(id) = self.editing() else {
            return self.finish_gesture();
        };
        let Some(element) = self.scene().get(id).cloned() else {
            return self.finish_gesture();
        };

        if text.is_empty() {
            let mut scene = self.scene().clone();
            scene.remove(id);
            self.history.amend(scene);
        } else {
            let rebuilt = self
                .factory
                .create(id, element.coords(), Tool::Text, element.path.clone(), text)?;
            self.replace_current(rebuilt);
        }
        self.finish_gesture()
    }

    fn draw_to(&mut self, p: Point) -> Result<(), ElementError> {
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(());
        };
        let Some(element) = gesture.selection.as_ref().map(|s| &s.element) else {
            return Ok(());
        };

        if element.kind.is_freehand() {
            gesture.path.push(p);
        } else {
            gesture.path = vec![element.coords().start(), p];
        }
        let coords = Coords::from_points(element.coords().start(), p);
        let rebuilt = self.factory.create(
            element.id,
            coords,
            element.kind.into(),
            gesture.path.clone(),
            &element.text,
        )?;
        log::trace!("drawing {} to {:?}", rebuilt.id, p);
        self.replace_current(rebuilt);
        Ok(())
    }

    fn move_to(&mut self, p: Point) -> Result<(), ElementError> {
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(());
        };
        let Some(selection) = gesture.selection.as_ref() else {
            return Ok(());
        };
        let element = &selection.element;

        let origin = [p[0] - selection.offset[0], p[1] - selection.offset[1]];
        let coords = element.coords().translated_to(origin);
        match element.kind {
            ElementKind::Pencil | ElementKind::Pen => {
                for (sample, offset) in gesture.path.iter_mut().zip(&selection.path_offsets) {
                    *sample = [p[0] - offset[0], p[1] - offset[1]];
                }
            }
            ElementKind::Line | ElementKind::Box => {
                gesture.path = vec![coords.start(), coords.end()];
            }
            ElementKind::Text => gesture.path = vec![coords.start()],
        }
        let rebuilt = self.factory.create(
            element.id,
            coords,
            element.kind.into(),
            gesture.path.clone(),
            &element.text,
        )?;
        log::trace!("moving {} to {:?}", rebuilt.id, origin);
        self.replace_current(rebuilt);
        Ok(())
    }

    fn resize_to(&mut self, p: Point) -> Result<(), ElementError> {
        let Some(gesture) = self.gesture.as_ref() else {
            return Ok(());
        };
        let Some(selection) = gesture.selection.as_ref() else {
            return Ok(());
        };
        let Some(handle) = selection.position else {
            return Ok(());
        };
        let element = &selection.element;

        let coords = resized_coordinates(p, handle, element.coords());
        let path = if element.kind.is_freehand() || element.kind == ElementKind::Text {
            gesture.path.clone()
        } else {
            vec![coords.start(), coords.end()]
        };
        let rebuilt = self
            .factory
            .create(element.id, coords, element.kind.into(), path, &element.text)?;
        log::trace!("resizing {} via {}", rebuilt.id, handle);
        self.replace_current(rebuilt);
        Ok(())
    }

    fn erase_at(&mut self, p: Point) {
        let hit = element_at_position(p, self.scene().iter()).map(|(element, _)| element.id);
        let Some(id) = hit else {
            return;
        };
        let mut scene = self.scene().clone();
        scene.remove(id);
        self.history.amend(scene);
        log::debug!("erased {}", id);
    }

    fn replace_current(&mut self, element: Element) {
        let mut scene = self.scene().clone();
        scene.insert(element);
        self.history.amend(scene);
    }

    fn finish_gesture(&mut self) -> Result<(), ElementError> {
        self.action = Action::Idle;
        let Some(gesture) = self.gesture.take() else {
            return Ok(());
        };
        let result = self.scene().clone();
        if result == gesture.baseline {
            log::trace!("gesture left the scene unchanged");
            return Ok(());
        }
        self.history.amend(gesture.baseline);
        self.history.commit(result);
        Ok(())
    }

    fn abandon_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            log::debug!("abandoning {:?} gesture", self.action);
            self.history.amend(gesture.baseline);
        }
        self.action = Action::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxMeasure;

    fn board() -> Whiteboard {
        Whiteboard::with_measure(&BoardConfig::default(), Box::new(ApproxMeasure))
    }

    fn drag(board: &mut Whiteboard, from: Point, to: Point) {
        board.pointer_down(from).unwrap();
        board.pointer_move(to).unwrap();
        board.pointer_up(to).unwrap();
    }

    #[test]
    fn test_drawing_commits_once() {
        let mut board = board();
        board.select_tool(Tool::Box);
        board.pointer_down([50.0, 50.0]).unwrap();
        assert_eq!(board.action(), Action::Drawing);
        for i in 0..20 {
            board.pointer_move([50.0 - i as f32, 50.0 - i as f32]).unwrap();
        }
        assert_eq!(board.history().len(), 1);
        board.pointer_up([10.0, 10.0]).unwrap();

        assert_eq!(board.action(), Action::Idle);
        assert_eq!(board.history().len(), 2);
        let rect = board.elements().next().unwrap();
        assert_eq!(rect.coords(), Coords::new(31.0, 31.0, 50.0, 50.0));
    }

    #[test]
    fn test_box_is_normalized_on_release() {
        let mut board = board();
        board.select_tool(Tool::Box);
        drag(&mut board, [50.0, 50.0], [10.0, 10.0]);
        let rect = board.elements().next().unwrap();
        assert_eq!(rect.coords(), Coords::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(rect.path, vec![[10.0, 10.0], [50.0, 50.0]]);
    }

    #[test]
    fn test_selection_click_does_not_grow_history() {
        let mut board = board();
        board.select_tool(Tool::Box);
        drag(&mut board, [10.0, 10.0], [50.0, 50.0]);
        board.select_tool(Tool::Selection);
        board.pointer_down([30.0, 30.0]).unwrap();
        assert_eq!(board.action(), Action::Moving);
        assert_eq!(board.selection().map(|s| s.offset), Some([20.0, 20.0]));
        board.pointer_up([30.0, 30.0]).unwrap();
        assert_eq!(board.history().len(), 2);
        assert!(board.selection().is_none());
    }

    #[test]
    fn test_selection_miss_stays_idle() {
        let mut board = board();
        board.select_tool(Tool::Selection);
        board.pointer_down([30.0, 30.0]).unwrap();
        assert_eq!(board.action(), Action::Idle);
    }

    #[test]
    fn test_hover_updates_cursor() {
        let mut board = board();
        board.select_tool(Tool::Box);
        drag(&mut board, [10.0, 10.0], [50.0, 50.0]);
        board.select_tool(Tool::Selection);
        board.pointer_move([11.0, 11.0]).unwrap();
        assert_eq!(board.cursor(), CursorStyle::NwseResize);
        board.pointer_move([30.0, 30.0]).unwrap();
        assert_eq!(board.cursor(), CursorStyle::Move);
        board.pointer_move([300.0, 300.0]).unwrap();
        assert_eq!(board.cursor(), CursorStyle::Default);
        assert_eq!(board.action(), Action::Idle);
    }

    #[test]
    fn test_text_click_enters_writing() {
        let mut board = board();
        board.select_tool(Tool::Text);
        board.pointer_down([40.0, 60.0]).unwrap();
        assert_eq!(board.action(), Action::Writing);
        board.pointer_move([90.0, 90.0]).unwrap();
        board.pointer_up([40.0, 60.0]).unwrap();
        assert_eq!(board.action(), Action::Writing);

        let overlay = board.text_overlay().unwrap();
        assert_eq!(overlay.position, [40.0, 60.0]);
        assert_eq!(overlay.text, "");
        assert_eq!(board.editing(), Some(overlay.id));

        board.commit_text("hi").unwrap();
        assert_eq!(board.action(), Action::Idle);
        assert!(board.text_overlay().is_none());
        let text = board.elements().next().unwrap();
        assert_eq!(text.text, "hi");
        assert_eq!(text.y2, 84.0);
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_empty_text_leaves_nothing() {
        let mut board = board();
        board.select_tool(Tool::Text);
        board.pointer_down([40.0, 60.0]).unwrap();
        board.pointer_up([40.0, 60.0]).unwrap();
        board.commit_text("").unwrap();
        assert_eq!(board.elements().count(), 0);
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn test_pointer_down_ignored_while_writing() {
        let mut board = board();
        board.select_tool(Tool::Text);
        board.pointer_down([40.0, 60.0]).unwrap();
        board.pointer_down([200.0, 200.0]).unwrap();
        assert_eq!(board.elements().count(), 1);
        assert_eq!(board.text_overlay().map(|o| o.position), Some([40.0, 60.0]));
    }

    #[test]
    fn test_eraser_removes_under_cursor() {
        let mut board = board();
        board.select_tool(Tool::Line);
        drag(&mut board, [0.0, 0.0], [100.0, 0.0]);
        drag(&mut board, [0.0, 50.0], [100.0, 50.0]);

        board.select_tool(Tool::Eraser);
        board.pointer_down([50.0, 0.0]).unwrap();
        assert_eq!(board.action(), Action::Erasing);
        assert_eq!(board.elements().count(), 1);
        board.pointer_move([50.0, 50.0]).unwrap();
        assert_eq!(board.elements().count(), 0);
        board.pointer_up([50.0, 50.0]).unwrap();
        assert_eq!(board.history().len(), 4);

        board.undo();
        assert_eq!(board.elements().count(), 2);
    }

    #[test]
    fn test_undo_mid_gesture_restores_baseline() {
        let mut board = board();
        board.select_tool(Tool::Line);
        drag(&mut board, [0.0, 0.0], [100.0, 0.0]);
        board.pointer_down([0.0, 50.0]).unwrap();
        board.pointer_move([20.0, 50.0]).unwrap();
        board.undo();
        assert_eq!(board.action(), Action::Idle);
        assert_eq!(board.elements().count(), 0);
        board.redo();
        assert_eq!(board.elements().count(), 1);
    }
}
