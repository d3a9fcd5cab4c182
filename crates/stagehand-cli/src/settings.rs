use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Defaults applied to quick commands when flags are omitted, persisted as
/// `stagehand.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagehandSettings {
    /// Directory that receives run directories.
    pub runs_dir: PathBuf,
    /// Entities per quick command when `--count` is omitted.
    pub default_count: u32,
    /// Prefix prepended to generated node titles.
    pub title_prefix: String,
    /// Reference-revisions field landing pages attach paragraphs to.
    pub components_field: String,
}

impl Default for StagehandSettings {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            default_count: 10,
            title_prefix: "[Stagehand]".to_string(),
            components_field: "field_components".to_string(),
        }
    }
}

/// Loads the settings file, writing defaults when it does not exist yet.
pub fn load_or_create_settings(path: &Path) -> Result<StagehandSettings, SettingsError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let settings: StagehandSettings = toml::from_str(&content)?;
        return Ok(settings);
    }

    let settings = StagehandSettings::default();
    std::fs::write(path, toml::to_string_pretty(&settings)?)?;
    Ok(settings)
}
