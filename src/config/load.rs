use std::{env, path::PathBuf};

use super::schema::Settings;

const APP_DIR: &str = "nowplaying-widget";

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `NOWPLAYING_WIDGET__`)
/// over an optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NOWPLAYING_WIDGET")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("session.players")
                .with_list_parse_key("widget.instances")
                .with_list_parse_key("host.launch_command")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.widget.refresh_interval_ms == 0 {
            return Err("widget.refresh_interval_ms must be >= 1".to_string());
        }
        if self.widget.instances.is_empty() {
            return Err("widget.instances must list at least one id".to_string());
        }
        if self.artwork.max_bytes == 0 {
            return Err("artwork.max_bytes must be >= 1".to_string());
        }
        Ok(())
    }

    /// Snapshot file location, honoring `store.path`.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| default_state_dir().join("state.toml"))
    }

    /// Directory the file host commits into, honoring `widget.output_dir`.
    pub fn output_dir(&self) -> PathBuf {
        self.widget
            .output_dir
            .clone()
            .unwrap_or_else(|| default_state_dir().join("widgets"))
    }

    /// Directory `watch` writes its log file into, honoring `log.dir`.
    pub fn log_dir(&self) -> PathBuf {
        self.log.dir.clone().unwrap_or_else(default_state_dir)
    }
}

/// Resolve the config path from `NOWPLAYING_WIDGET_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NOWPLAYING_WIDGET_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/nowplaying-widget/config.toml`
/// or `~/.config/nowplaying-widget/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `$XDG_STATE_HOME/nowplaying-widget`, `~/.local/state/nowplaying-widget`,
/// or a directory under the system temp dir when neither is known.
pub fn default_state_dir() -> PathBuf {
    if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".local").join("state").join(APP_DIR);
    }
    env::temp_dir().join(APP_DIR)
}
