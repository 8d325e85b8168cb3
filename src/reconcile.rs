//! Merge the live session with the persisted snapshot.

use crate::session::SessionMetadata;
use crate::store::PersistedSnapshot;

pub const DEFAULT_TITLE: &str = "Track";
pub const DEFAULT_SUBTITLE: &str = "–";

/// What the widget shows for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackDisplayState {
    pub title: String,
    pub subtitle: String,
    pub is_playing: bool,
    pub artwork_ref: Option<String>,
}

/// Resolve each field independently: live session, then snapshot, then default.
pub fn reconcile(
    session: Option<&SessionMetadata>,
    snapshot: &PersistedSnapshot,
) -> TrackDisplayState {
    let live = |f: fn(&SessionMetadata) -> Option<&String>| {
        session.and_then(f).filter(|s| !s.is_empty()).cloned()
    };
    let stored = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();

    let title = live(|s| s.title.as_ref())
        .or_else(|| stored(&snapshot.now_title))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let subtitle = live(|s| s.artist.as_ref())
        .or_else(|| stored(&snapshot.now_subtitle))
        .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string());
    let artwork_ref = live(|s| s.art_ref.as_ref()).or_else(|| stored(&snapshot.now_art_uri));
    // A present session always knows whether it is playing.
    let is_playing = match session {
        Some(s) => s.is_playing(),
        None => snapshot.is_playing.unwrap_or(false),
    };

    TrackDisplayState {
        title,
        subtitle,
        is_playing,
        artwork_ref,
    }
}
