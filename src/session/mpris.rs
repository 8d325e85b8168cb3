use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_io::block_on;
use tracing::debug;
use zbus::{Connection, connection, fdo::DBusProxy, proxy, proxy::CacheProperties};
use zvariant::{OwnedValue, Value};

use crate::actions::{ActionError, MediaButtonSink, MediaKey};
use crate::config::SessionPriority;

use super::{PlaybackStatus, SessionError, SessionMetadata, SessionProvider, select};

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Bound on every method call and property read. A player that stops
/// answering is skipped for the tick instead of stalling it.
const METHOD_TIMEOUT: Duration = Duration::from_millis(500);

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
trait Player {
    fn play_pause(&self) -> zbus::Result<()>;

    fn next(&self) -> zbus::Result<()>;

    fn previous(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}

/// MPRIS client on the session bus.
///
/// Serves both as the widget's session registry and as the receiver of its
/// media-button actions.
pub struct MprisClient {
    players: Vec<String>,
    priority: SessionPriority,
    connection: Mutex<Option<Connection>>,
}

impl MprisClient {
    /// `players` scopes discovery to the given bus-name suffixes (empty = all).
    /// The bus is connected lazily on first use.
    pub fn new(players: Vec<String>, priority: SessionPriority) -> Self {
        Self {
            players,
            priority,
            connection: Mutex::new(None),
        }
    }

    fn connection(&self) -> Result<Connection, SessionError> {
        let mut guard = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(c) = guard.as_ref() {
            return Ok(c.clone());
        }
        let c = block_on(async {
            connection::Builder::session()?
                .method_timeout(METHOD_TIMEOUT)
                .build()
                .await
        })?;
        *guard = Some(c.clone());
        Ok(c)
    }

    fn forget_connection(&self) {
        if let Ok(mut guard) = self.connection.lock() {
            *guard = None;
        }
    }

    async fn player_names(&self, conn: &Connection) -> Result<Vec<String>, SessionError> {
        let names = DBusProxy::new(conn).await?.list_names().await?;
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        Ok(rank_players(names, &self.players))
    }

    async fn read_session(conn: &Connection, name: &str) -> Result<SessionMetadata, SessionError> {
        let player = PlayerProxy::builder(conn)
            .destination(name)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        // A player that cannot report metadata is not a session.
        let metadata = player.metadata().await?;
        let status = player.playback_status().await.ok();
        Ok(metadata_from_map(name, &metadata, status.as_deref()))
    }

    async fn sessions(&self, conn: &Connection) -> Result<Vec<SessionMetadata>, SessionError> {
        let mut sessions = Vec::new();
        for name in self.player_names(conn).await? {
            if let Some(s) = readable(&name, Self::read_session(conn, &name).await)? {
                sessions.push(s);
            }
        }
        Ok(sessions)
    }
}

impl SessionProvider for MprisClient {
    fn active_sessions(&self) -> Result<Vec<SessionMetadata>, SessionError> {
        let conn = self.connection()?;
        let result = block_on(self.sessions(&conn));
        if matches!(result, Err(SessionError::Bus(_))) {
            self.forget_connection();
        }
        result
    }
}

impl MediaButtonSink for MprisClient {
    fn press(&self, key: MediaKey) -> Result<(), ActionError> {
        let conn = self.connection()?;
        block_on(async {
            let target = select(self.sessions(&conn).await?, self.priority)
                .ok_or(SessionError::NoSession)?;
            let player = PlayerProxy::builder(&conn)
                .destination(target.source.as_str())
                .map_err(SessionError::from)?
                .cache_properties(CacheProperties::No)
                .build()
                .await
                .map_err(SessionError::from)?;
            debug!(player = %target.source, ?key, "media button");
            let sent = match key {
                MediaKey::PlayPause => player.play_pause().await,
                MediaKey::Next => player.next().await,
                MediaKey::Previous => player.previous().await,
            };
            sent.map_err(SessionError::from)?;
            Ok::<(), ActionError>(())
        })
    }
}

/// Sort one player's read into keep, skip or abort the whole query.
///
/// Players come and go between `ListNames` and the property read, and a hung
/// one times out; both are skipped. A denial aborts, so it reads as no session.
fn readable(
    name: &str,
    read: Result<SessionMetadata, SessionError>,
) -> Result<Option<SessionMetadata>, SessionError> {
    match read {
        Ok(s) => Ok(Some(s)),
        Err(SessionError::PermissionDenied) => Err(SessionError::PermissionDenied),
        Err(e) => {
            debug!(player = %name, "skipping player: {e}");
            Ok(None)
        }
    }
}

/// Keep MPRIS players allowed by `allow`, ordered by allowlist position and
/// then by bus name.
fn rank_players(names: Vec<String>, allow: &[String]) -> Vec<String> {
    let mut ranked: Vec<(usize, String)> = names
        .into_iter()
        .filter_map(|name| {
            let suffix = name.strip_prefix(MPRIS_PREFIX)?;
            let rank = if allow.is_empty() {
                0
            } else {
                allow.iter().position(|a| {
                    suffix == a.as_str()
                        || suffix
                            .strip_prefix(a.as_str())
                            .is_some_and(|rest| rest.starts_with('.'))
                })?
            };
            Some((rank, name))
        })
        .collect();
    ranked.sort();
    ranked.into_iter().map(|(_, name)| name).collect()
}

fn metadata_from_map(
    source: &str,
    map: &HashMap<String, OwnedValue>,
    status: Option<&str>,
) -> SessionMetadata {
    let text = |key: &str| {
        map.get(key)
            .map(|v| value_strings(v).join(", "))
            .filter(|s| !s.trim().is_empty())
    };

    SessionMetadata {
        source: source.to_string(),
        title: text("xesam:title"),
        artist: text("xesam:artist"),
        art_ref: text("mpris:artUrl"),
        playback: status.and_then(PlaybackStatus::from_mpris),
    }
}

/// Flatten a string or string-array metadata value.
fn value_strings(value: &Value<'_>) -> Vec<String> {
    match value {
        Value::Str(s) => vec![s.as_str().to_string()],
        Value::Array(items) => items.iter().flat_map(value_strings).collect(),
        Value::Value(inner) => value_strings(inner),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(v: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(v).unwrap()
    }

    #[test]
    fn method_timeout_stays_well_under_a_tick() {
        assert!(METHOD_TIMEOUT > Duration::ZERO);
        assert!(METHOD_TIMEOUT <= Duration::from_secs(1));
    }

    #[test]
    fn readable_keeps_sessions_that_answered() {
        let s = metadata_from_map("org.mpris.MediaPlayer2.mpv", &HashMap::new(), Some("Playing"));
        let kept = readable("org.mpris.MediaPlayer2.mpv", Ok(s.clone())).unwrap();
        assert_eq!(kept, Some(s));
    }

    #[test]
    fn readable_skips_silent_and_vanished_players() {
        let name = "org.mpris.MediaPlayer2.silent";
        let timed_out = SessionError::from(zbus::fdo::Error::NoReply("timed out".into()));
        assert!(matches!(readable(name, Err(timed_out)), Ok(None)));

        let vanished = SessionError::from(zbus::fdo::Error::ServiceUnknown("gone".into()));
        assert!(matches!(readable(name, Err(vanished)), Ok(None)));

        let no_object = SessionError::from(zbus::fdo::Error::UnknownObject("/".into()));
        assert!(matches!(readable(name, Err(no_object)), Ok(None)));
    }

    #[test]
    fn readable_aborts_on_denied_property_read() {
        let denied = SessionError::from(zbus::fdo::Error::AccessDenied("nope".into()));
        assert!(matches!(
            readable("org.mpris.MediaPlayer2.locked", Err(denied)),
            Err(SessionError::PermissionDenied)
        ));
    }

    #[test]
    fn rank_players_filters_non_mpris_names_and_sorts() {
        let names = vec![
            ":1.42".to_string(),
            "org.freedesktop.Notifications".to_string(),
            "org.mpris.MediaPlayer2.vlc".to_string(),
            "org.mpris.MediaPlayer2.mpv".to_string(),
        ];
        assert_eq!(
            rank_players(names, &[]),
            vec![
                "org.mpris.MediaPlayer2.mpv".to_string(),
                "org.mpris.MediaPlayer2.vlc".to_string(),
            ]
        );
    }

    #[test]
    fn rank_players_follows_allowlist_order_and_instances() {
        let names = vec![
            "org.mpris.MediaPlayer2.mpv".to_string(),
            "org.mpris.MediaPlayer2.spotify".to_string(),
            "org.mpris.MediaPlayer2.firefox.instance_1_99".to_string(),
            "org.mpris.MediaPlayer2.spotifyd".to_string(),
        ];
        let allow = vec!["firefox".to_string(), "spotify".to_string()];
        assert_eq!(
            rank_players(names, &allow),
            vec![
                "org.mpris.MediaPlayer2.firefox.instance_1_99".to_string(),
                "org.mpris.MediaPlayer2.spotify".to_string(),
            ]
        );
    }

    #[test]
    fn metadata_from_map_reads_title_artist_and_art() {
        let mut map = HashMap::new();
        map.insert("xesam:title".to_string(), owned(Value::from("Song A")));
        map.insert(
            "xesam:artist".to_string(),
            owned(Value::from(vec!["Artist B".to_string(), "Guest".to_string()])),
        );
        map.insert(
            "mpris:artUrl".to_string(),
            owned(Value::from("file:///tmp/cover.png")),
        );

        let s = metadata_from_map("org.mpris.MediaPlayer2.mpv", &map, Some("Playing"));
        assert_eq!(s.source, "org.mpris.MediaPlayer2.mpv");
        assert_eq!(s.title.as_deref(), Some("Song A"));
        assert_eq!(s.artist.as_deref(), Some("Artist B, Guest"));
        assert_eq!(s.art_ref.as_deref(), Some("file:///tmp/cover.png"));
        assert!(s.is_playing());
    }

    #[test]
    fn metadata_from_map_treats_empty_and_missing_as_none() {
        let mut map = HashMap::new();
        map.insert("xesam:title".to_string(), owned(Value::from("  ")));
        map.insert(
            "xesam:artist".to_string(),
            owned(Value::from(Vec::<String>::new())),
        );

        let s = metadata_from_map("p", &map, Some("Paused"));
        assert_eq!(s.title, None);
        assert_eq!(s.artist, None);
        assert_eq!(s.art_ref, None);
        assert_eq!(s.playback, Some(PlaybackStatus::Paused));
        assert!(!s.is_playing());
    }

    #[test]
    fn unknown_status_string_is_not_playing() {
        let s = metadata_from_map("p", &HashMap::new(), Some("Buffering"));
        assert_eq!(s.playback, None);
        assert!(!s.is_playing());
    }
}
