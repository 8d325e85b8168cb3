//! Widget hosts: where rendered views are committed.

mod file;
mod terminal;

pub use file::FileHost;
pub use terminal::TerminalHost;

use thiserror::Error;

use crate::widget::{WidgetId, WidgetViewModel};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode view: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode artwork: {0}")]
    Image(#[from] image::ImageError),
}

/// Receives one committed view per widget instance per tick.
pub trait WidgetHost {
    fn commit(&mut self, id: WidgetId, view: &WidgetViewModel) -> Result<(), HostError>;
}
