//! Session data types: `SessionMetadata` and `PlaybackStatus`.

/// The playback state a session reports.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    /// Parse an MPRIS `PlaybackStatus` string.
    pub fn from_mpris(s: &str) -> Option<Self> {
        match s {
            "Playing" => Some(Self::Playing),
            "Paused" => Some(Self::Paused),
            "Stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// Now-playing metadata extracted from one active session.
///
/// Fields the player does not publish are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionMetadata {
    /// Bus name (or other provider-specific id) of the player.
    pub source: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub art_ref: Option<String>,
    pub playback: Option<PlaybackStatus>,
}

impl SessionMetadata {
    /// Only the canonical `Playing` state counts as playing.
    pub fn is_playing(&self) -> bool {
        self.playback == Some(PlaybackStatus::Playing)
    }
}
