use serde::{Deserialize, Serialize};

use super::StoreError;

/// Last known track as published by the host player.
///
/// Every field is optional; a missing key falls through to the widget
/// defaults during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_art_uri: Option<String>,
}

impl PersistedSnapshot {
    /// Apply a `key=value` assignment. An empty value clears the key.
    pub fn assign(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let text = (!value.is_empty()).then(|| value.to_string());
        match key {
            "now_title" => self.now_title = text,
            "now_subtitle" => self.now_subtitle = text,
            "now_art_uri" => self.now_art_uri = text,
            "is_playing" => {
                self.is_playing = match value {
                    "" => None,
                    "true" | "1" | "yes" => Some(true),
                    "false" | "0" | "no" => Some(false),
                    _ => {
                        return Err(StoreError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            other => return Err(StoreError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
