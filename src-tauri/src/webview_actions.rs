//! Page actions for a webview: reload, devtools and zoom.
//!
//! Zoom uses Chromium-style levels: level 0 is 100%, each step is half a level, and the
//! scale factor is `1.2^level`. The webview cannot report its zoom, so levels are tracked
//! per window label.

use std::collections::HashMap;
use std::sync::Mutex;

use tauri::{Manager, WebviewWindow};
use tracing::{debug, warn};

use crate::windows::MAIN_WINDOW_LABEL;

const ZOOM_STEP: f64 = 0.5;
const MIN_ZOOM_LEVEL: f64 = -8.0;
const MAX_ZOOM_LEVEL: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebAction {
    Reload,
    ForceReload,
    ToggleDevtools,
    ActualSize,
    ZoomIn,
    ZoomOut,
}

pub fn zoom_factor(level: f64) -> f64 {
    1.2_f64.powf(level)
}

/// Zoom level per window label. Missing labels are at level 0.
#[derive(Default)]
pub struct ZoomLevels {
    levels: Mutex<HashMap<String, f64>>,
}

impl ZoomLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, label: &str) -> f64 {
        self.levels
            .lock()
            .ok()
            .and_then(|levels| levels.get(label).copied())
            .unwrap_or(0.0)
    }

    /// Applies a zoom action to `label` and returns the new level. Non-zoom actions leave it
    /// unchanged.
    pub fn step(&self, label: &str, action: WebAction) -> f64 {
        let Ok(mut levels) = self.levels.lock() else {
            warn!("Zoom state lock poisoned");
            return 0.0;
        };
        let level = levels.entry(label.to_string()).or_insert(0.0);
        *level = match action {
            WebAction::ActualSize => 0.0,
            WebAction::ZoomIn => (*level + ZOOM_STEP).min(MAX_ZOOM_LEVEL),
            WebAction::ZoomOut => (*level - ZOOM_STEP).max(MIN_ZOOM_LEVEL),
            _ => *level,
        };
        *level
    }
}

fn toggle_devtools<R: tauri::Runtime>(window: &WebviewWindow<R>) {
    #[cfg(debug_assertions)]
    {
        if window.is_devtools_open() {
            window.close_devtools();
        } else {
            window.open_devtools();
        }
    }
    #[cfg(not(debug_assertions))]
    debug!(window = window.label(), "Devtools are only available in debug builds");
}

/// Runs `action` on `window`.
pub fn run<R: tauri::Runtime>(
    window: &WebviewWindow<R>,
    zoom: &ZoomLevels,
    action: WebAction,
) -> Result<(), String> {
    debug!(?action, window = window.label(), "Webview action");
    match action {
        // WebKit has no cache-bypassing reload, so a force reload is a plain one.
        WebAction::Reload | WebAction::ForceReload => window.reload().map_err(|e| e.to_string()),
        WebAction::ToggleDevtools => {
            toggle_devtools(window);
            Ok(())
        }
        WebAction::ActualSize | WebAction::ZoomIn | WebAction::ZoomOut => {
            let level = zoom.step(window.label(), action);
            window
                .set_zoom(zoom_factor(level))
                .map_err(|e| e.to_string())
        }
    }
}

/// Runs `action` on the focused window, falling back to the Signage window. Used by the
/// app menu, which has no calling window.
pub fn run_on_focused<R: tauri::Runtime>(app: &tauri::AppHandle<R>, action: WebAction) {
    let target = app
        .webview_windows()
        .into_values()
        .find(|w| w.is_focused().unwrap_or(false))
        .or_else(|| app.get_webview_window(MAIN_WINDOW_LABEL));
    let Some(window) = target else {
        debug!(?action, "No window for webview action");
        return;
    };
    let Some(zoom) = app.try_state::<ZoomLevels>() else {
        warn!("Zoom state not managed");
        return;
    };
    if let Err(e) = run(&window, &zoom, action) {
        warn!(error = %e, ?action, "Webview action failed");
    }
}
