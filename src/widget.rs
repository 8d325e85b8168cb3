//! Widget view model and renderer.
//!
//! `render` is a pure function from one tick's inputs to an immutable
//! `WidgetViewModel`; hosts only ever see fully built views.

mod model;
mod render;

pub use model::*;
pub use render::render;
