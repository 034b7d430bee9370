//! Persistent user preferences for Signage.
//!
//! Persists settings in a JSON file:
//! `~/.config/signage/settings.json` (platform config dir).
//!
//! Read-through, write-through: the document is loaded on first access and cached; every
//! setter mutates one field and rewrites the whole file. Missing fields fall back to their
//! defaults so older files keep loading. I/O and parse failures are logged and swallowed;
//! callers always get a usable value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::accelerator::DEFAULT_TOGGLE_SHORTCUT;

const APP_CONFIG_DIR_NAME: &str = "signage";
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No config directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub toggle_shortcut: String,
    pub show_in_menu_bar: bool,
    pub hide_app_icon: bool,
    pub start_at_login: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            toggle_shortcut: DEFAULT_TOGGLE_SHORTCUT.to_string(),
            show_in_menu_bar: true,
            hide_app_icon: false,
            start_at_login: false,
        }
    }
}

/// Location of the settings document in the platform config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    let path = config_dir()?
        .join(APP_CONFIG_DIR_NAME)
        .join(SETTINGS_FILE_NAME);
    Some(path)
}

fn ensure_parent_dir_exists(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    ensure_parent_dir_exists(path)?;
    let data = serde_json::to_string_pretty(settings)?;
    fs::write(path, data)?;
    debug!(?path, "Settings saved");
    Ok(())
}

fn read_settings(path: &Path) -> Result<Option<Settings>, SettingsError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&data)?;
    debug!(?path, "Settings loaded");
    Ok(Some(settings))
}

/// Cached view of the settings document.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    cached: Option<Settings>,
}

impl SettingsStore {
    /// A store backed by `path`; `None` keeps settings in memory only.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, cached: None }
    }

    pub fn at_default_location() -> Self {
        let path = default_settings_path();
        if path.is_none() {
            warn!(error = %SettingsError::NoConfigDir, "Settings will not be persisted");
        }
        Self::new(path)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(&self) -> Settings {
        let Some(path) = self.path.as_deref() else {
            debug!("No settings path, using defaults only");
            return Settings::default();
        };

        match read_settings(path) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(?path, "Settings file does not exist, creating it with defaults");
                let settings = Settings::default();
                if let Err(err) = write_settings(path, &settings) {
                    warn!(error = %err, ?path, "Failed to create settings file");
                }
                settings
            }
            Err(err) => {
                warn!(error = %err, ?path, "Failed to load settings, using defaults");
                Settings::default()
            }
        }
    }

    /// Current settings, loading them from disk on first access.
    pub fn get(&mut self) -> &Settings {
        if self.cached.is_none() {
            self.cached = Some(self.load());
        }
        self.cached.get_or_insert_with(Settings::default)
    }

    fn update(&mut self, mutate: impl FnOnce(&mut Settings)) {
        let mut settings = self.get().clone();
        mutate(&mut settings);
        if let Some(path) = self.path.as_deref() {
            if let Err(err) = write_settings(path, &settings) {
                error!(error = %err, ?path, "Failed to save settings");
            }
        }
        self.cached = Some(settings);
    }

    pub fn toggle_shortcut(&mut self) -> String {
        self.get().toggle_shortcut.clone()
    }

    pub fn set_toggle_shortcut(&mut self, shortcut: &str) {
        debug!(shortcut, "Saving toggle shortcut");
        self.update(|s| s.toggle_shortcut = shortcut.to_string());
    }

    pub fn show_in_menu_bar(&mut self) -> bool {
        self.get().show_in_menu_bar
    }

    pub fn set_show_in_menu_bar(&mut self, show: bool) {
        debug!(show, "Saving show in menu bar");
        self.update(|s| s.show_in_menu_bar = show);
    }

    pub fn hide_app_icon(&mut self) -> bool {
        self.get().hide_app_icon
    }

    pub fn set_hide_app_icon(&mut self, hide: bool) {
        debug!(hide, "Saving hide app icon");
        self.update(|s| s.hide_app_icon = hide);
    }

    pub fn start_at_login(&mut self) -> bool {
        self.get().start_at_login
    }

    pub fn set_start_at_login(&mut self, start: bool) {
        debug!(start, "Saving start at login");
        self.update(|s| s.start_at_login = start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(Some(dir.path().join("signage").join(SETTINGS_FILE_NAME)))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.toggle_shortcut, "CommandOrControl+Shift+S");
        assert!(settings.show_in_menu_bar);
        assert!(!settings.hide_app_icon);
        assert!(!settings.start_at_login);
    }

    #[test]
    fn test_first_read_creates_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(store.get(), &Settings::default());
        assert!(store.path().unwrap().exists());
    }

    #[test]
    fn test_persists_across_restart() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = store_in(&dir);
            store.set_show_in_menu_bar(false);
            store.set_show_in_menu_bar(true);
            store.set_hide_app_icon(true);
            store.set_toggle_shortcut("F12");
        }

        let mut restarted = store_in(&dir);
        assert!(restarted.show_in_menu_bar());
        assert!(restarted.hide_app_icon());
        assert_eq!(restarted.toggle_shortcut(), "F12");
        assert!(!restarted.start_at_login());
    }

    #[test]
    fn test_missing_fields_merge_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{ "hideAppIcon": true, "someFutureField": 3 }"#).unwrap();

        let mut store = SettingsStore::new(Some(path));
        let settings = store.get().clone();
        assert!(settings.hide_app_icon);
        assert!(settings.show_in_menu_bar);
        assert_eq!(settings.toggle_shortcut, DEFAULT_TOGGLE_SHORTCUT);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let mut store = SettingsStore::new(Some(path.clone()));
        assert_eq!(store.get(), &Settings::default());

        store.set_start_at_login(true);
        let written: Settings = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written.start_at_login);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_value() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::create_dir_all(&path).unwrap();

        let mut store = SettingsStore::new(Some(path));
        store.set_hide_app_icon(true);
        assert!(store.hide_app_icon());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"toggleShortcut\""));
        assert!(json.contains("\"showInMenuBar\""));
        assert!(json.contains("\"hideAppIcon\""));
        assert!(json.contains("\"startAtLogin\""));
    }
}
