//! Start-at-login registration through the autostart plugin.
//!
//! The login item launches the app with `--hidden`, so a login launch only brings up the tray
//! and menu bar icon; the Signage window stays closed until the shortcut is pressed.

use serde::Serialize;
use tauri_plugin_autostart::ManagerExt;

/// Argument the login item passes to the app.
pub const LAUNCH_HIDDEN_ARG: &str = "--hidden";

/// OS login item.
pub trait LoginItems: Send {
    fn is_enabled(&self) -> Result<bool, String>;
    fn set_enabled(&self, enabled: bool) -> Result<(), String>;
}

/// `LoginItems` backed by `tauri-plugin-autostart`.
pub struct AutostartLoginItems<R: tauri::Runtime> {
    app: tauri::AppHandle<R>,
}

impl<R: tauri::Runtime> AutostartLoginItems<R> {
    pub fn new(app: tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> LoginItems for AutostartLoginItems<R> {
    fn is_enabled(&self) -> Result<bool, String> {
        self.app.autolaunch().is_enabled().map_err(|e| e.to_string())
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        let autolaunch = self.app.autolaunch();
        let result = if enabled {
            autolaunch.enable()
        } else {
            autolaunch.disable()
        };
        result.map_err(|e| e.to_string())
    }
}

/// Login item state as reported to the settings window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginItemSettings {
    pub open_at_login: bool,
    pub open_as_hidden: bool,
}

/// True when this process was started by the login item.
pub fn launched_hidden() -> bool {
    launched_hidden_from(std::env::args())
}

fn launched_hidden_from(args: impl IntoIterator<Item = String>) -> bool {
    args.into_iter().skip(1).any(|arg| arg == LAUNCH_HIDDEN_ARG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_launched_hidden_detects_flag() {
        assert!(launched_hidden_from(args(&["signage", "--hidden"])));
        assert!(!launched_hidden_from(args(&["signage"])));
        assert!(!launched_hidden_from(args(&["--hidden"])));
    }

    #[test]
    fn test_login_item_settings_shape() {
        let json = serde_json::to_value(LoginItemSettings {
            open_at_login: true,
            open_as_hidden: true,
        })
        .unwrap();
        assert_eq!(json["openAtLogin"], true);
        assert_eq!(json["openAsHidden"], true);
    }
}
