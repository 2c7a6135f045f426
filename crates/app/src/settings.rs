//! Settings persistence in the platform config directory.

use anyhow::{Context, Result};
use shared::settings::PluginSettings;
use std::fs;
use std::path::{Path, PathBuf};

pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "Writing Helper", "WritingHelper")
        .map(|proj| proj.config_dir().join("settings.json"))
}

/// Read settings from `path`; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<PluginSettings> {
    if !path.exists() {
        return Ok(PluginSettings::default());
    }
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_or_default() -> PluginSettings {
    let Some(path) = config_path() else {
        return PluginSettings::default();
    };
    match load_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Falling back to default settings");
            PluginSettings::default()
        }
    }
}

pub fn save_to(path: &Path, settings: &PluginSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(settings)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
