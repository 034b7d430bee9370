//! Tauri commands for the update banner.

use crate::updater;

/// Runs a check now. Returns whether an update was found (it is downloaded before returning).
#[tauri::command]
pub async fn update_check(app: tauri::AppHandle) -> Result<bool, String> {
    updater::check_and_download(&app)
        .await
        .map_err(|e| e.to_string())
}

/// Installs the downloaded update and restarts. Only returns on failure.
#[tauri::command]
pub fn update_install(app: tauri::AppHandle) -> Result<(), String> {
    updater::install_and_restart(&app).map_err(|e| e.to_string())
}
