//! Menu action handling.
//!
//! Tray and application menu clicks both arrive here. Ids are parsed into a `MenuAction`.
//! State changes run under the context lock; window actions never take it.

use tauri::menu::MenuEvent;
use tauri::Manager;
use tauri_plugin_opener::OpenerExt;
use tracing::{debug, info, warn};

use crate::context::{AppContext, ContextState};
use crate::menu::{
    ID_ABOUT_SIGNAGE, ID_ACTUAL_SIZE, ID_FORCE_RELOAD, ID_MODE_AUTO, ID_MODE_BLACKMIRROR,
    ID_MODE_DEFAULT, ID_OPEN_SETTINGS, ID_QUIT, ID_RELOAD, ID_START_AT_LOGIN,
    ID_TOGGLE_DEVTOOLS, ID_TOGGLE_DOCK_ICON, ID_TOGGLE_SIGNAGE, ID_ZOOM_IN, ID_ZOOM_OUT,
};
use crate::visual_mode::{VisualMode, VisualModeStore};
use crate::webview_actions::{self, WebAction};
use crate::windows;

pub const ABOUT_URL: &str = "https://laststance.io";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ToggleSignage,
    OpenSettings,
    SetVisualMode(VisualMode),
    ToggleDockIcon,
    ToggleStartAtLogin,
    Web(WebAction),
    About,
    Quit,
}

impl MenuAction {
    pub fn from_id(id: &str) -> Option<Self> {
        let action = match id {
            ID_TOGGLE_SIGNAGE => Self::ToggleSignage,
            ID_OPEN_SETTINGS => Self::OpenSettings,
            ID_MODE_DEFAULT => Self::SetVisualMode(VisualMode::Default),
            ID_MODE_AUTO => Self::SetVisualMode(VisualMode::Auto),
            ID_MODE_BLACKMIRROR => Self::SetVisualMode(VisualMode::BlackMirror),
            ID_TOGGLE_DOCK_ICON => Self::ToggleDockIcon,
            ID_START_AT_LOGIN => Self::ToggleStartAtLogin,
            ID_RELOAD => Self::Web(WebAction::Reload),
            ID_FORCE_RELOAD => Self::Web(WebAction::ForceReload),
            ID_TOGGLE_DEVTOOLS => Self::Web(WebAction::ToggleDevtools),
            ID_ACTUAL_SIZE => Self::Web(WebAction::ActualSize),
            ID_ZOOM_IN => Self::Web(WebAction::ZoomIn),
            ID_ZOOM_OUT => Self::Web(WebAction::ZoomOut),
            ID_ABOUT_SIGNAGE => Self::About,
            ID_QUIT => Self::Quit,
            _ => return None,
        };
        Some(action)
    }
}

fn with_context<R, F>(app: &tauri::AppHandle<R>, f: F)
where
    R: tauri::Runtime,
    F: FnOnce(&mut AppContext),
{
    let Some(state) = app.try_state::<ContextState>() else {
        warn!("Application context not managed yet");
        return;
    };
    match state.lock() {
        Ok(mut ctx) => f(&mut ctx),
        Err(_) => warn!("Context lock poisoned"),
    };
}

/// Handles a tray or app menu click.
pub fn handle_menu_event<R: tauri::Runtime>(app: &tauri::AppHandle<R>, event: MenuEvent) {
    let id = event.id().0.as_str();
    let Some(action) = MenuAction::from_id(id) else {
        debug!(id, "Unhandled menu item");
        return;
    };
    run_action(app, action);
}

pub fn run_action<R: tauri::Runtime>(app: &tauri::AppHandle<R>, action: MenuAction) {
    match action {
        MenuAction::ToggleSignage => windows::toggle_signage_window(app),
        MenuAction::OpenSettings => {
            if let Err(e) = windows::open_settings_window(app) {
                warn!(error = %e, "Failed to open settings window");
            }
        }
        MenuAction::SetVisualMode(mode) => with_context(app, |ctx| ctx.set_visual_mode(mode)),
        MenuAction::ToggleDockIcon => with_context(app, |ctx| {
            ctx.toggle_dock_icon();
        }),
        MenuAction::ToggleStartAtLogin => with_context(app, |ctx| {
            ctx.toggle_start_at_login();
        }),
        MenuAction::Web(action) => webview_actions::run_on_focused(app, action),
        MenuAction::About => {
            if let Err(e) = app.opener().open_url(ABOUT_URL, None::<&str>) {
                warn!(error = %e, url = ABOUT_URL, "Failed to open about page");
            }
        }
        MenuAction::Quit => {
            info!("Quit requested from menu");
            app.exit(0);
        }
    }
}
