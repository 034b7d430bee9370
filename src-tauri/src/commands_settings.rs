//! Tauri commands for the shortcut, persisted preferences and visual mode.

use std::sync::MutexGuard;

use tauri::State;

use crate::accelerator::SHORTCUT_PRESETS;
use crate::context::{AppContext, ContextState, LOCK_POISONED};
use crate::login_item::LoginItemSettings;
use crate::visual_mode::{VisualMode, VisualModeStore};

fn lock<'a>(state: &'a State<'_, ContextState>) -> Result<MutexGuard<'a, AppContext>, String> {
    state.lock().map_err(|_| LOCK_POISONED.to_string())
}

// --- Shortcut ---

#[tauri::command]
pub fn shortcut_get_current(state: State<'_, ContextState>) -> Result<Option<String>, String> {
    Ok(lock(&state)?.current_shortcut())
}

#[tauri::command]
pub fn shortcut_get_presets() -> Vec<&'static str> {
    SHORTCUT_PRESETS.to_vec()
}

/// Returns false when the shortcut is invalid or already taken; the old binding stays active.
#[tauri::command]
pub fn shortcut_change(state: State<'_, ContextState>, shortcut: String) -> Result<bool, String> {
    Ok(lock(&state)?.change_shortcut(&shortcut))
}

#[tauri::command]
pub fn shortcut_reset(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.reset_shortcut())
}

// --- Menu bar / Dock ---
// Setters return false when the OS refused the change; the stored preference is left as it was.

#[tauri::command]
pub fn settings_get_show_in_menu_bar(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.show_in_menu_bar())
}

#[tauri::command]
pub fn settings_set_show_in_menu_bar(
    state: State<'_, ContextState>,
    show: bool,
) -> Result<bool, String> {
    Ok(lock(&state)?.set_show_in_menu_bar(show))
}

#[tauri::command]
pub fn settings_get_tray_visible(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.is_tray_visible())
}

#[tauri::command]
pub fn settings_get_hide_app_icon(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.hide_app_icon())
}

#[tauri::command]
pub fn settings_set_hide_app_icon(
    state: State<'_, ContextState>,
    hide: bool,
) -> Result<bool, String> {
    Ok(lock(&state)?.set_hide_app_icon(hide))
}

#[tauri::command]
pub fn settings_get_dock_hidden(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.is_dock_hidden())
}

// --- Login item ---

#[tauri::command]
pub fn settings_get_start_at_login(state: State<'_, ContextState>) -> Result<bool, String> {
    Ok(lock(&state)?.start_at_login())
}

#[tauri::command]
pub fn settings_set_start_at_login(
    state: State<'_, ContextState>,
    start: bool,
) -> Result<bool, String> {
    Ok(lock(&state)?.set_start_at_login(start))
}

#[tauri::command]
pub fn settings_get_login_item(
    state: State<'_, ContextState>,
) -> Result<LoginItemSettings, String> {
    Ok(lock(&state)?.login_item_settings())
}

// --- Visual mode ---

#[tauri::command]
pub fn visual_mode_get_state(state: State<'_, ContextState>) -> Result<VisualMode, String> {
    Ok(lock(&state)?.visual_mode())
}
