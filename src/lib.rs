pub mod board;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod history;
pub mod renderer;
pub mod rough;
pub mod scene;
pub mod stroke;
pub mod tessellate;
pub mod text;

#[cfg(feature = "app")]
mod app;
#[cfg(feature = "app")]
mod gpu;
#[cfg(feature = "app")]
mod input;

// Re-export the main public interface
#[cfg(feature = "app")]
pub use app::run;
pub use board::{Action, SelectionContext, TextOverlay, Whiteboard};
pub use config::BoardConfig;
pub use element::{Element, ElementFactory, ElementId, ElementKind, Primitive, Tool};
pub use error::ElementError;
pub use geometry::{Coords, Point};
pub use hit_test::{CursorStyle, Handle};
pub use renderer::Surface;
pub use scene::Scene;
