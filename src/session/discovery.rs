use tracing::{debug, warn};

use crate::config::SessionPriority;

use super::{SessionError, SessionMetadata, SessionProvider};

/// Find the session this tick should display.
///
/// Permission denials read as "no session"; any other failure is logged and
/// also reads as "no session".
pub fn discover<P: SessionProvider + ?Sized>(
    provider: &P,
    priority: SessionPriority,
) -> Option<SessionMetadata> {
    match provider.active_sessions() {
        Ok(sessions) => {
            debug!(count = sessions.len(), "active media sessions");
            select(sessions, priority)
        }
        Err(SessionError::PermissionDenied) => None,
        Err(e) => {
            warn!("media session query failed: {e}");
            None
        }
    }
}

/// Pick one session out of provider-ordered `sessions`.
pub fn select(
    mut sessions: Vec<SessionMetadata>,
    priority: SessionPriority,
) -> Option<SessionMetadata> {
    if sessions.is_empty() {
        return None;
    }
    let idx = match priority {
        SessionPriority::First => 0,
        SessionPriority::PreferPlaying => sessions
            .iter()
            .position(SessionMetadata::is_playing)
            .unwrap_or(0),
    };
    Some(sessions.swap_remove(idx))
}
