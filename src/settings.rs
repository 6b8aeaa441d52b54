//! Persisted user preferences.
//!
//! Stored as JSON at `<config dir>/code-playback/settings.json`. Unknown or malformed values fall
//! back to their defaults instead of failing the load.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::capture::theme::Theme;
use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::source::backend::BackendKind;

const APP_DIR: &str = "code-playback";
const FILE_NAME: &str = "settings.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last repository identifier or local path that loaded successfully.
    pub last_repo: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub backend: BackendKind,
    #[serde(serialize_with = "as_display", deserialize_with = "lenient")]
    pub theme: Theme,
}

fn as_display<S: Serializer, T: std::fmt::Display>(v: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

fn lenient<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

impl Settings {
    /// Default settings location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(FILE_NAME))
    }

    /// Loads from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "settings unreadable; using defaults"
                );
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "settings malformed; using defaults"
            );
            Self::default()
        })
    }

    /// Loads from [`Settings::default_path`].
    pub fn load() -> Self {
        Self::default_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> PlaybackResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory '{}'", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| PlaybackError::serde(e.to_string()))?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings '{}'", path.display()))?;
        Ok(())
    }

    /// Saves to [`Settings::default_path`].
    pub fn save(&self) -> PlaybackResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| PlaybackError::unsupported("no config directory on this platform"))?;
        self.save_to(&path)
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
