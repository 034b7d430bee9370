//! Tauri commands for the calling window: title bar controls, fullscreen, page reload and
//! zoom, external links, and the settings window.

use serde::Serialize;
use tauri::State;
use tauri_plugin_opener::OpenerExt;
use tracing::debug;

use crate::webview_actions::{self, WebAction, ZoomLevels};
use crate::windows;

/// Window geometry and capabilities the title bar needs on first render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInit {
    pub width: f64,
    pub height: f64,
    pub minimizable: bool,
    pub maximizable: bool,
    pub platform: &'static str,
}

/// Returns the current platform (e.g., "macos", "windows", "linux").
pub fn platform() -> &'static str {
    #[cfg(target_os = "macos")]
    return "macos";
    #[cfg(target_os = "windows")]
    return "windows";
    #[cfg(target_os = "linux")]
    return "linux";
    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    return "unknown";
}

#[tauri::command]
pub fn window_init(window: tauri::WebviewWindow) -> Result<WindowInit, String> {
    let size = window.inner_size().map_err(|e| e.to_string())?;
    let scale = window.scale_factor().map_err(|e| e.to_string())?;
    let logical = size.to_logical::<f64>(scale);
    Ok(WindowInit {
        width: logical.width,
        height: logical.height,
        minimizable: window.is_minimizable().map_err(|e| e.to_string())?,
        maximizable: window.is_maximizable().map_err(|e| e.to_string())?,
        platform: platform(),
    })
}

#[tauri::command]
pub fn window_minimize(window: tauri::WebviewWindow) -> Result<(), String> {
    window.minimize().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn window_maximize_toggle(window: tauri::WebviewWindow) -> Result<(), String> {
    let result = if window.is_maximized().map_err(|e| e.to_string())? {
        window.unmaximize()
    } else {
        window.maximize()
    };
    result.map_err(|e| e.to_string())
}

#[tauri::command]
pub fn window_close(window: tauri::WebviewWindow) -> Result<(), String> {
    window.close().map_err(|e| e.to_string())
}

/// Flips fullscreen and returns the new state.
#[tauri::command]
pub fn window_toggle_fullscreen(window: tauri::WebviewWindow) -> Result<bool, String> {
    let fullscreen = !window.is_fullscreen().map_err(|e| e.to_string())?;
    window
        .set_fullscreen(fullscreen)
        .map_err(|e| e.to_string())?;
    debug!(fullscreen, window = window.label(), "Fullscreen toggled");
    Ok(fullscreen)
}

#[tauri::command]
pub fn window_get_fullscreen_status(window: tauri::WebviewWindow) -> Result<bool, String> {
    window.is_fullscreen().map_err(|e| e.to_string())
}

// --- Page ---

#[tauri::command]
pub fn web_reload(window: tauri::WebviewWindow, zoom: State<'_, ZoomLevels>) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::Reload)
}

#[tauri::command]
pub fn web_force_reload(
    window: tauri::WebviewWindow,
    zoom: State<'_, ZoomLevels>,
) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::ForceReload)
}

#[tauri::command]
pub fn web_toggle_devtools(
    window: tauri::WebviewWindow,
    zoom: State<'_, ZoomLevels>,
) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::ToggleDevtools)
}

#[tauri::command]
pub fn web_actual_size(
    window: tauri::WebviewWindow,
    zoom: State<'_, ZoomLevels>,
) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::ActualSize)
}

#[tauri::command]
pub fn web_zoom_in(window: tauri::WebviewWindow, zoom: State<'_, ZoomLevels>) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::ZoomIn)
}

#[tauri::command]
pub fn web_zoom_out(window: tauri::WebviewWindow, zoom: State<'_, ZoomLevels>) -> Result<(), String> {
    webview_actions::run(&window, &zoom, WebAction::ZoomOut)
}

#[tauri::command]
pub fn open_url(app: tauri::AppHandle, url: String) -> Result<(), String> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(format!("Refusing to open non-web URL: {}", url));
    }
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn open_settings(app: tauri::AppHandle) -> Result<(), String> {
    windows::open_settings_window(&app)
}

#[tauri::command]
pub fn close_settings(app: tauri::AppHandle) -> Result<(), String> {
    windows::close_settings_window(&app)
}
