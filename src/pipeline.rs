//! The per-tick refresh: session → reconcile → artwork → color → render → commit.
//!
//! Nothing here fails. Every component maps its own errors to a default, so a
//! tick always ends with one committed view per widget instance.

use tracing::{debug, warn};

use crate::artwork::{self, ContentResolver, DecodedArtwork};
use crate::color::{self, BackgroundColor};
use crate::config::{SessionPriority, Settings};
use crate::host::WidgetHost;
use crate::reconcile::{TrackDisplayState, reconcile};
use crate::session::{SessionProvider, discover};
use crate::store::PersistedSnapshot;
use crate::widget::{WidgetId, WidgetViewModel, render};

/// Everything one tick computes before rendering. Shared by all instances.
#[derive(Clone, Debug, PartialEq)]
pub struct TickFrame {
    pub state: TrackDisplayState,
    pub artwork: DecodedArtwork,
    pub color: BackgroundColor,
}

pub struct RefreshPipeline<P, R> {
    sessions: P,
    content: R,
    priority: SessionPriority,
    max_artwork_bytes: u64,
    launch_command: Vec<String>,
}

impl<P: SessionProvider, R: ContentResolver> RefreshPipeline<P, R> {
    pub fn new(sessions: P, content: R, settings: &Settings) -> Self {
        Self {
            sessions,
            content,
            priority: settings.session.priority,
            max_artwork_bytes: settings.artwork.max_bytes,
            launch_command: settings.host.launch_command.clone(),
        }
    }

    /// Query, reconcile and load artwork for one tick.
    pub fn prepare(&self, snapshot: &PersistedSnapshot) -> TickFrame {
        let session = discover(&self.sessions, self.priority);
        let state = reconcile(session.as_ref(), snapshot);
        let artwork = artwork::resolve(
            &self.content,
            state.artwork_ref.as_deref(),
            self.max_artwork_bytes,
        );
        let color = color::extract(&artwork);
        debug!(
            title = %state.title,
            playing = state.is_playing,
            background = %color,
            live = session.is_some(),
            "tick prepared"
        );
        TickFrame {
            state,
            artwork,
            color,
        }
    }

    pub fn render_frame(&self, frame: &TickFrame) -> WidgetViewModel {
        render(
            &frame.state,
            &frame.artwork,
            frame.color,
            &self.launch_command,
        )
    }

    /// Refresh every instance in `ids`, in order. Returns how many commits
    /// succeeded; a failed commit is logged and the rest still run.
    pub fn on_update<H: WidgetHost + ?Sized>(
        &self,
        host: &mut H,
        ids: &[WidgetId],
        snapshot: &PersistedSnapshot,
    ) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let frame = self.prepare(snapshot);

        let mut committed = 0;
        for &id in ids {
            let view = self.render_frame(&frame);
            match host.commit(id, &view) {
                Ok(()) => committed += 1,
                Err(e) => warn!(instance = id, "widget commit failed: {e}"),
            }
        }
        committed
    }
}
