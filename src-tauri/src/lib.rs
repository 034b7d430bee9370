// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
mod accelerator;
mod commands_settings;
mod commands_updates;
mod commands_windows;
mod context;
mod dock;
mod events;
mod hotkeys;
mod login_item;
#[cfg(target_os = "macos")]
mod macos_app;
mod menu;
mod settings;
mod tray;
mod tray_actions;
mod updater;
mod visual_mode;
mod webview_actions;
mod windows;

use std::sync::Mutex;

use tauri::Manager;
use tauri_plugin_autostart::MacosLauncher;
use tauri_plugin_global_shortcut::{Shortcut, ShortcutState};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use context::{AppContext, ContextState};
use dock::{AppActivationPolicy, DockController};
use events::EventHub;
use hotkeys::{PluginHotkeys, ShortcutRegistrar};
use login_item::{AutostartLoginItems, LAUNCH_HIDDEN_ARG};
use menu::AppMenuRebuilder;
use settings::SettingsStore;
use tray::AppTray;
use updater::UpdaterState;
use webview_actions::ZoomLevels;

/// Global shortcut callback. The toggle runs after the context lock is released.
fn on_global_shortcut<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
    shortcut: &Shortcut,
    event_state: ShortcutState,
) {
    let Some(state) = app.try_state::<ContextState>() else {
        return;
    };
    let mut pressed = false;
    match state.lock() {
        Ok(ctx) => hotkeys::handle_global_shortcut_event(ctx.shortcuts(), shortcut, event_state, || {
            pressed = true
        }),
        Err(_) => {
            warn!("Context lock poisoned, ignoring shortcut");
            return;
        }
    }
    if pressed {
        windows::toggle_signage_window(app);
    }
}

/// Builds the application context, tray and menus, then binds the shortcut.
fn setup_app<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<(), Box<dyn std::error::Error>> {
    let events = EventHub::new();
    app.manage(events::forward_to_webviews(app.clone(), &events));
    app.manage::<UpdaterState>(UpdaterState::new(events.clone()));
    app.manage(ZoomLevels::new());

    let settings = SettingsStore::at_default_location();
    if let Some(path) = settings.path() {
        info!(path = %path.display(), "Settings file");
    }

    let mut ctx = AppContext::new(
        settings,
        ShortcutRegistrar::new(Box::new(PluginHotkeys::new(app.clone()))),
        DockController::new(Box::new(AppActivationPolicy::new(app.clone()))),
        Box::new(AutostartLoginItems::new(app.clone())),
        Box::new(AppTray::new(app.clone())),
        events,
    );

    let snapshot = ctx.snapshot();
    tray::create_tray(app, &snapshot)?;
    app.set_menu(menu::build_app_menu(app, &snapshot)?)?;
    ctx.add_rebuilder(Box::new(AppTray::new(app.clone())));
    ctx.add_rebuilder(Box::new(AppMenuRebuilder::new(app.clone())));

    ctx.apply_startup_settings();
    ctx.register_shortcut();
    if !ctx.shortcuts().is_registered() {
        warn!("Toggle shortcut not registered, use the tray menu to open Signage");
    }
    app.manage::<ContextState>(Mutex::new(ctx));

    if login_item::launched_hidden() {
        info!("Launched hidden, not opening the Signage window");
    } else {
        windows::create_main_window(app, true)?;
    }

    updater::spawn_update_checks(app.clone());
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_autostart::init(
            MacosLauncher::LaunchAgent,
            Some(vec![LAUNCH_HIDDEN_ARG]),
        ))
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| on_global_shortcut(app, shortcut, event.state()))
                .build(),
        )
        .on_menu_event(tray_actions::handle_menu_event)
        .invoke_handler(tauri::generate_handler![
            commands_settings::shortcut_get_current,
            commands_settings::shortcut_get_presets,
            commands_settings::shortcut_change,
            commands_settings::shortcut_reset,
            commands_settings::settings_get_show_in_menu_bar,
            commands_settings::settings_set_show_in_menu_bar,
            commands_settings::settings_get_tray_visible,
            commands_settings::settings_get_hide_app_icon,
            commands_settings::settings_set_hide_app_icon,
            commands_settings::settings_get_dock_hidden,
            commands_settings::settings_get_start_at_login,
            commands_settings::settings_set_start_at_login,
            commands_settings::settings_get_login_item,
            commands_settings::visual_mode_get_state,
            commands_windows::open_settings,
            commands_windows::close_settings,
            commands_windows::window_init,
            commands_windows::window_minimize,
            commands_windows::window_maximize_toggle,
            commands_windows::window_close,
            commands_windows::window_toggle_fullscreen,
            commands_windows::window_get_fullscreen_status,
            commands_windows::web_reload,
            commands_windows::web_force_reload,
            commands_windows::web_toggle_devtools,
            commands_windows::web_actual_size,
            commands_windows::web_zoom_in,
            commands_windows::web_zoom_out,
            commands_windows::open_url,
            commands_updates::update_check,
            commands_updates::update_install,
        ])
        .setup(|app| setup_app(app.handle()))
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Error while building Tauri application");
            std::process::exit(1);
        }
    };

    app.run(|app, event| match event {
        // Closing the last window keeps the tray app alive; explicit exits carry a code.
        tauri::RunEvent::ExitRequested { code: None, api, .. } => api.prevent_exit(),
        tauri::RunEvent::Exit => {
            if let Some(state) = app.try_state::<ContextState>() {
                if let Ok(mut ctx) = state.lock() {
                    ctx.unregister_shortcuts();
                }
            }
            updater::install_on_exit(app);
            info!("Signage exiting");
        }
        #[cfg(target_os = "macos")]
        tauri::RunEvent::Reopen {
            has_visible_windows: false,
            ..
        } => windows::toggle_signage_window(app),
        _ => {}
    });
}
