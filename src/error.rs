use crate::element::Tool;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The tool is a mode (selection, eraser) and never produces an element.
    #[error("tool {0} does not create drawing elements")]
    UnsupportedElementType(Tool),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
}
