use std::path::PathBuf;

use serde::Deserialize;

/// Top-level widget settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nowplaying-widget/config.toml` or
/// `~/.config/nowplaying-widget/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NOWPLAYING_WIDGET__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub session: SessionSettings,
    pub store: StoreSettings,
    pub artwork: ArtworkSettings,
    pub widget: WidgetSettings,
    pub host: HostSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// MPRIS players this widget is allowed to follow, as bus-name suffixes
    /// after `org.mpris.MediaPlayer2.` (e.g. `spotify`, `mpv`).
    ///
    /// Order matters: earlier entries rank first. Empty = every player.
    pub players: Vec<String>,
    /// How to choose among several active sessions.
    pub priority: SessionPriority,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPriority {
    /// Always the first session in provider order.
    #[default]
    #[serde(alias = "index-0", alias = "index0")]
    First,
    /// The first session that reports `Playing`, else the first session.
    #[serde(alias = "prefer_playing", alias = "playing")]
    PreferPlaying,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Snapshot file written by the host player.
    /// Defaults to `<state dir>/state.toml`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtworkSettings {
    /// Upper bound on artwork bytes read per tick.
    pub max_bytes: u64,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Widget instance ids, in the order they are refreshed.
    pub instances: Vec<u32>,
    /// Refresh cadence used by `watch`.
    pub refresh_interval_ms: u64,
    /// Where the file host commits views.
    /// Defaults to `<state dir>/widgets`.
    pub output_dir: Option<PathBuf>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            instances: vec![0],
            refresh_interval_ms: 1000,
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Program and arguments started by the widget's "open app" action.
    pub launch_command: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Log directory used by `watch`. Defaults to the state dir.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}
