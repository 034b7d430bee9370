//! Menu bar (tray) icon and its context menu.
//!
//! The icon is a flat dark-gray square drawn from raw RGBA (not a template image, so macOS
//! keeps the exact color). The menu mirrors the current state: visual mode, Dock icon label,
//! start at login. Menu clicks are dispatched in `tray_actions`.

use tauri::image::Image;
use tauri::menu::Menu;
use tauri::tray::{TrayIcon, TrayIconBuilder};

use crate::menu::{
    self, MenuEntry, MenuSnapshot, Rebuildable, ID_OPEN_SETTINGS, ID_QUIT, ID_START_AT_LOGIN,
    ID_TOGGLE_DOCK_ICON, ID_TOGGLE_SIGNAGE,
};

pub const TRAY_ID: &str = "main";

/// #111111 at 50% opacity.
const TRAY_ICON_RGBA: [u8; 4] = [17, 17, 17, 128];
/// Drawn at 2x so it stays sharp on Retina menu bars.
const TRAY_ICON_SIZE: u32 = 32;

fn tray_icon_pixels(size: u32) -> Vec<u8> {
    TRAY_ICON_RGBA
        .iter()
        .copied()
        .cycle()
        .take((size * size * 4) as usize)
        .collect()
}

pub fn tray_icon_image() -> Image<'static> {
    Image::new_owned(tray_icon_pixels(TRAY_ICON_SIZE), TRAY_ICON_SIZE, TRAY_ICON_SIZE)
}

/// Describes the tray context menu.
pub fn tray_menu_entries(snapshot: &MenuSnapshot) -> Vec<MenuEntry> {
    let mut entries = vec![
        MenuEntry::item_with_accelerator(
            ID_TOGGLE_SIGNAGE,
            "Toggle Signage",
            snapshot.toggle_shortcut.as_deref(),
        ),
        MenuEntry::Separator,
    ];
    entries.extend(menu::visual_mode_entries(snapshot.visual_mode));
    entries.extend([
        MenuEntry::Separator,
        MenuEntry::item(ID_TOGGLE_DOCK_ICON, menu::dock_icon_label(snapshot.dock_hidden)),
        MenuEntry::check(ID_START_AT_LOGIN, "Start at Login", snapshot.start_at_login),
        MenuEntry::Separator,
        MenuEntry::item(ID_OPEN_SETTINGS, "Settings..."),
        MenuEntry::item_with_accelerator(ID_QUIT, "Quit Signage", Some("CommandOrControl+Q")),
    ]);
    entries
}

pub fn build_tray_menu<R: tauri::Runtime>(
    app: &impl tauri::Manager<R>,
    snapshot: &MenuSnapshot,
) -> Result<Menu<R>, tauri::Error> {
    menu::to_native_menu(app, &tray_menu_entries(snapshot))
}

/// Creates the tray icon with its initial menu. Clicks reach the app-wide menu event handler.
pub fn create_tray<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
    snapshot: &MenuSnapshot,
) -> Result<TrayIcon<R>, tauri::Error> {
    let menu = build_tray_menu(app, snapshot)?;
    TrayIconBuilder::with_id(TRAY_ID)
        .icon(tray_icon_image())
        .icon_as_template(false)
        .tooltip("Signage")
        .menu(&menu)
        .show_menu_on_left_click(true)
        .build(app)
}

/// Show/hide for the menu bar icon.
pub trait TrayPresence: Send {
    fn set_visible(&self, visible: bool) -> Result<(), String>;
}

/// Rebuilds the tray menu and toggles the tray icon of a running app.
pub struct AppTray<R: tauri::Runtime> {
    app: tauri::AppHandle<R>,
}

impl<R: tauri::Runtime> AppTray<R> {
    pub fn new(app: tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> Rebuildable for AppTray<R> {
    fn rebuild(&self, snapshot: &MenuSnapshot) -> Result<(), String> {
        let Some(tray) = self.app.tray_by_id(TRAY_ID) else {
            return Ok(());
        };
        build_tray_menu(&self.app, snapshot)
            .and_then(|m| tray.set_menu(Some(m)))
            .map_err(|e| e.to_string())
    }
}

impl<R: tauri::Runtime> TrayPresence for AppTray<R> {
    fn set_visible(&self, visible: bool) -> Result<(), String> {
        let Some(tray) = self.app.tray_by_id(TRAY_ID) else {
            return Err("Tray icon not created".to_string());
        };
        tray.set_visible(visible).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{checked_ids, entry_ids, mode_item_id};
    use crate::visual_mode::VisualMode;

    fn snapshot() -> MenuSnapshot {
        MenuSnapshot {
            visual_mode: VisualMode::Default,
            dock_hidden: false,
            start_at_login: false,
            toggle_shortcut: Some("CommandOrControl+Shift+S".to_string()),
        }
    }

    #[test]
    fn test_icon_pixels_are_uniform() {
        let pixels = tray_icon_pixels(16);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert!(pixels.chunks(4).all(|px| px == TRAY_ICON_RGBA));
    }

    #[test]
    fn test_one_mode_checked_per_build() {
        for mode in VisualMode::ALL {
            let snap = MenuSnapshot {
                visual_mode: mode,
                ..snapshot()
            };
            assert_eq!(checked_ids(&tray_menu_entries(&snap)), vec![mode_item_id(mode)]);
        }
    }

    #[test]
    fn test_dock_label_follows_flag() {
        let shown = tray_menu_entries(&snapshot());
        assert!(shown.contains(&MenuEntry::item(ID_TOGGLE_DOCK_ICON, "Hide App Icon")));

        let hidden = tray_menu_entries(&MenuSnapshot {
            dock_hidden: true,
            ..snapshot()
        });
        assert!(hidden.contains(&MenuEntry::item(ID_TOGGLE_DOCK_ICON, "Show App Icon")));
    }

    #[test]
    fn test_start_at_login_checkbox() {
        let snap = MenuSnapshot {
            start_at_login: true,
            ..snapshot()
        };
        let entries = tray_menu_entries(&snap);
        assert!(checked_ids(&entries).contains(&ID_START_AT_LOGIN));
        assert_eq!(entry_ids(&entries).first(), Some(&ID_TOGGLE_SIGNAGE));
        assert_eq!(entry_ids(&entries).last(), Some(&ID_QUIT));
    }
}
