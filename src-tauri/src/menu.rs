//! Application menu and the menu description shared with the tray.
//!
//! Menus are described as plain `MenuEntry` trees built from a `MenuSnapshot`, then converted
//! into native Tauri menus. Every state change rebuilds the whole menu; there is no diffing.

use tauri::menu::{
    AboutMetadata, CheckMenuItem, IsMenuItem, Menu, MenuItem, PredefinedMenuItem, Submenu,
};
use tracing::{debug, warn};

use crate::visual_mode::VisualMode;

pub const ID_TOGGLE_SIGNAGE: &str = "toggle_signage";
pub const ID_OPEN_SETTINGS: &str = "open_settings";
pub const ID_MODE_DEFAULT: &str = "mode_default";
pub const ID_MODE_AUTO: &str = "mode_auto";
pub const ID_MODE_BLACKMIRROR: &str = "mode_blackmirror";
pub const ID_TOGGLE_DOCK_ICON: &str = "toggle_dock_icon";
pub const ID_START_AT_LOGIN: &str = "start_at_login";
pub const ID_ABOUT_SIGNAGE: &str = "about_signage";
pub const ID_QUIT: &str = "quit";
pub const ID_RELOAD: &str = "reload";
pub const ID_FORCE_RELOAD: &str = "force_reload";
pub const ID_TOGGLE_DEVTOOLS: &str = "toggle_devtools";
pub const ID_ACTUAL_SIZE: &str = "actual_size";
pub const ID_ZOOM_IN: &str = "zoom_in";
pub const ID_ZOOM_OUT: &str = "zoom_out";

/// State the menus display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSnapshot {
    pub visual_mode: VisualMode,
    pub dock_hidden: bool,
    pub start_at_login: bool,
    pub toggle_shortcut: Option<String>,
}

/// Native items with OS-provided behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeItem {
    About,
    Services,
    Hide,
    HideOthers,
    ShowAll,
    CloseWindow,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Fullscreen,
    Minimize,
    Maximize,
    BringAllToFront,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        id: &'static str,
        label: String,
        accelerator: Option<String>,
    },
    Check {
        id: &'static str,
        label: String,
        checked: bool,
    },
    Separator,
    Native(NativeItem),
    Submenu {
        label: String,
        entries: Vec<MenuEntry>,
    },
}

impl MenuEntry {
    pub fn item(id: &'static str, label: &str) -> Self {
        Self::Item {
            id,
            label: label.to_string(),
            accelerator: None,
        }
    }

    pub fn item_with_accelerator(id: &'static str, label: &str, accelerator: Option<&str>) -> Self {
        Self::Item {
            id,
            label: label.to_string(),
            accelerator: accelerator.map(str::to_string),
        }
    }

    pub fn check(id: &'static str, label: &str, checked: bool) -> Self {
        Self::Check {
            id,
            label: label.to_string(),
            checked,
        }
    }

    pub fn submenu(label: &str, entries: Vec<MenuEntry>) -> Self {
        Self::Submenu {
            label: label.to_string(),
            entries,
        }
    }
}

pub fn mode_item_id(mode: VisualMode) -> &'static str {
    match mode {
        VisualMode::Default => ID_MODE_DEFAULT,
        VisualMode::Auto => ID_MODE_AUTO,
        VisualMode::BlackMirror => ID_MODE_BLACKMIRROR,
    }
}

/// One check item per visual mode; exactly the current one is checked.
pub fn visual_mode_entries(current: VisualMode) -> Vec<MenuEntry> {
    VisualMode::ALL
        .iter()
        .map(|mode| MenuEntry::check(mode_item_id(*mode), mode.menu_label(), *mode == current))
        .collect()
}

pub fn dock_icon_label(dock_hidden: bool) -> &'static str {
    if dock_hidden {
        "Show App Icon"
    } else {
        "Hide App Icon"
    }
}

/// Describes the application menu bar.
pub fn app_menu_entries(app_name: &str, snapshot: &MenuSnapshot) -> Vec<MenuEntry> {
    let mut app_entries = vec![
        MenuEntry::Native(NativeItem::About),
        MenuEntry::Separator,
        MenuEntry::item_with_accelerator(
            ID_TOGGLE_SIGNAGE,
            "Toggle Signage",
            snapshot.toggle_shortcut.as_deref(),
        ),
        MenuEntry::Separator,
        MenuEntry::item_with_accelerator(ID_OPEN_SETTINGS, "Settings...", Some("CommandOrControl+,")),
        MenuEntry::Separator,
    ];
    app_entries.extend(visual_mode_entries(snapshot.visual_mode));
    app_entries.extend([
        MenuEntry::Separator,
        MenuEntry::Native(NativeItem::Services),
        MenuEntry::Separator,
        MenuEntry::Native(NativeItem::Hide),
        MenuEntry::Native(NativeItem::HideOthers),
        MenuEntry::Native(NativeItem::ShowAll),
        MenuEntry::Separator,
        MenuEntry::item_with_accelerator(ID_QUIT, "Quit Signage", Some("CommandOrControl+Q")),
    ]);

    vec![
        MenuEntry::submenu(app_name, app_entries),
        MenuEntry::submenu("File", vec![MenuEntry::Native(NativeItem::CloseWindow)]),
        MenuEntry::submenu(
            "Edit",
            vec![
                MenuEntry::Native(NativeItem::Undo),
                MenuEntry::Native(NativeItem::Redo),
                MenuEntry::Separator,
                MenuEntry::Native(NativeItem::Cut),
                MenuEntry::Native(NativeItem::Copy),
                MenuEntry::Native(NativeItem::Paste),
                MenuEntry::Native(NativeItem::SelectAll),
            ],
        ),
        MenuEntry::submenu(
            "View",
            vec![
                MenuEntry::item_with_accelerator(ID_RELOAD, "Reload", Some("CommandOrControl+R")),
                MenuEntry::item_with_accelerator(
                    ID_FORCE_RELOAD,
                    "Force Reload",
                    Some("CommandOrControl+Shift+R"),
                ),
                MenuEntry::item_with_accelerator(
                    ID_TOGGLE_DEVTOOLS,
                    "Toggle Developer Tools",
                    Some("Alt+CommandOrControl+I"),
                ),
                MenuEntry::Separator,
                MenuEntry::item_with_accelerator(ID_ACTUAL_SIZE, "Actual Size", Some("CommandOrControl+0")),
                MenuEntry::item_with_accelerator(ID_ZOOM_IN, "Zoom In", Some("CommandOrControl+=")),
                MenuEntry::item_with_accelerator(ID_ZOOM_OUT, "Zoom Out", Some("CommandOrControl+-")),
                MenuEntry::Separator,
                MenuEntry::Native(NativeItem::Fullscreen),
            ],
        ),
        MenuEntry::submenu(
            "Window",
            vec![
                MenuEntry::Native(NativeItem::Minimize),
                MenuEntry::Native(NativeItem::Maximize),
                MenuEntry::Separator,
                MenuEntry::Native(NativeItem::BringAllToFront),
                MenuEntry::Separator,
                MenuEntry::Native(NativeItem::CloseWindow),
            ],
        ),
        MenuEntry::submenu("Help", vec![MenuEntry::item(ID_ABOUT_SIGNAGE, "About Signage")]),
    ]
}

/// Something derived from the menu state that must be rebuilt when it changes.
pub trait Rebuildable: Send {
    fn rebuild(&self, snapshot: &MenuSnapshot) -> Result<(), String>;
}

// --- Native conversion ---

fn native_item<R: tauri::Runtime>(
    app: &impl tauri::Manager<R>,
    item: NativeItem,
) -> Result<PredefinedMenuItem<R>, tauri::Error> {
    match item {
        NativeItem::About => {
            let metadata = AboutMetadata {
                name: Some(app.package_info().name.clone()),
                version: Some(app.package_info().version.to_string()),
                ..Default::default()
            };
            PredefinedMenuItem::about(app, None, Some(metadata))
        }
        NativeItem::Services => PredefinedMenuItem::services(app, None),
        NativeItem::Hide => PredefinedMenuItem::hide(app, None),
        NativeItem::HideOthers => PredefinedMenuItem::hide_others(app, None),
        NativeItem::ShowAll => PredefinedMenuItem::show_all(app, None),
        NativeItem::CloseWindow => PredefinedMenuItem::close_window(app, None),
        NativeItem::Undo => PredefinedMenuItem::undo(app, None),
        NativeItem::Redo => PredefinedMenuItem::redo(app, None),
        NativeItem::Cut => PredefinedMenuItem::cut(app, None),
        NativeItem::Copy => PredefinedMenuItem::copy(app, None),
        NativeItem::Paste => PredefinedMenuItem::paste(app, None),
        NativeItem::SelectAll => PredefinedMenuItem::select_all(app, None),
        NativeItem::Fullscreen => PredefinedMenuItem::fullscreen(app, None),
        NativeItem::Minimize => PredefinedMenuItem::minimize(app, None),
        NativeItem::Maximize => PredefinedMenuItem::maximize(app, None),
        NativeItem::BringAllToFront => PredefinedMenuItem::bring_all_to_front(app, None),
    }
}

fn native_entries<R: tauri::Runtime>(
    app: &impl tauri::Manager<R>,
    entries: &[MenuEntry],
) -> Result<Vec<Box<dyn IsMenuItem<R>>>, tauri::Error> {
    let mut items: Vec<Box<dyn IsMenuItem<R>>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let item: Box<dyn IsMenuItem<R>> = match entry {
            MenuEntry::Item {
                id,
                label,
                accelerator,
            } => {
                let with_accel = MenuItem::with_id(app, *id, label, true, accelerator.as_deref());
                match with_accel {
                    Ok(item) => Box::new(item),
                    Err(e) => {
                        // Display-only; fall back to no accelerator rather than losing the menu.
                        debug!(error = %e, id, "Menu accelerator rejected, dropping it");
                        Box::new(MenuItem::with_id(app, *id, label, true, None::<&str>)?)
                    }
                }
            }
            MenuEntry::Check { id, label, checked } => Box::new(CheckMenuItem::with_id(
                app,
                *id,
                label,
                true,
                *checked,
                None::<&str>,
            )?),
            MenuEntry::Separator => Box::new(PredefinedMenuItem::separator(app)?),
            MenuEntry::Native(native) => Box::new(native_item(app, *native)?),
            MenuEntry::Submenu { label, entries } => {
                let children = native_entries(app, entries)?;
                let refs: Vec<&dyn IsMenuItem<R>> = children.iter().map(|c| &**c).collect();
                Box::new(Submenu::with_items(app, label, true, &refs)?)
            }
        };
        items.push(item);
    }
    Ok(items)
}

/// Converts a menu description into a native menu.
pub fn to_native_menu<R: tauri::Runtime>(
    app: &impl tauri::Manager<R>,
    entries: &[MenuEntry],
) -> Result<Menu<R>, tauri::Error> {
    let items = native_entries(app, entries)?;
    let refs: Vec<&dyn IsMenuItem<R>> = items.iter().map(|i| &**i).collect();
    Menu::with_items(app, &refs)
}

pub fn build_app_menu<R: tauri::Runtime>(
    app: &impl tauri::Manager<R>,
    snapshot: &MenuSnapshot,
) -> Result<Menu<R>, tauri::Error> {
    let name = app.package_info().name.clone();
    to_native_menu(app, &app_menu_entries(&name, snapshot))
}

/// Rebuilds and installs the application menu.
pub struct AppMenuRebuilder<R: tauri::Runtime> {
    app: tauri::AppHandle<R>,
}

impl<R: tauri::Runtime> AppMenuRebuilder<R> {
    pub fn new(app: tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> Rebuildable for AppMenuRebuilder<R> {
    fn rebuild(&self, snapshot: &MenuSnapshot) -> Result<(), String> {
        let menu = build_app_menu(&self.app, snapshot).map_err(|e| e.to_string())?;
        if let Err(e) = self.app.set_menu(menu) {
            warn!(error = %e, "Failed to install application menu");
            return Err(e.to_string());
        }
        Ok(())
    }
}

/// Collects every `Item`/`Check` id in a menu description, depth first.
#[cfg(test)]
pub fn entry_ids(entries: &[MenuEntry]) -> Vec<&'static str> {
    let mut ids = Vec::new();
    for entry in entries {
        match entry {
            MenuEntry::Item { id, .. } | MenuEntry::Check { id, .. } => ids.push(*id),
            MenuEntry::Submenu { entries, .. } => ids.extend(entry_ids(entries)),
            MenuEntry::Separator | MenuEntry::Native(_) => {}
        }
    }
    ids
}

/// Collects the ids of checked items in a menu description.
#[cfg(test)]
pub fn checked_ids(entries: &[MenuEntry]) -> Vec<&'static str> {
    let mut ids = Vec::new();
    for entry in entries {
        match entry {
            MenuEntry::Check {
                id, checked: true, ..
            } => ids.push(*id),
            MenuEntry::Submenu { entries, .. } => ids.extend(checked_ids(entries)),
            _ => {}
        }
    }
    ids
}
