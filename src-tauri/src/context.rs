//! Process-wide application state.
//!
//! `AppContext` owns the settings store, the shortcut registrar, the Dock and tray state, the
//! current visual mode and the event hub. It lives in Tauri managed state behind a `Mutex`
//! (`ContextState`). Menus are rebuilt from a `MenuSnapshot` taken while the lock is held, so
//! rebuild targets never touch the context themselves.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::dock::DockController;
use crate::events::{AppEvent, EventHub};
use crate::hotkeys::ShortcutRegistrar;
use crate::login_item::{LoginItemSettings, LoginItems};
use crate::menu::{MenuSnapshot, Rebuildable};
use crate::settings::SettingsStore;
use crate::tray::TrayPresence;
use crate::visual_mode::{VisualMode, VisualModeStore};

pub type ContextState = Mutex<AppContext>;

pub const LOCK_POISONED: &str = "Context lock poisoned";

pub struct AppContext {
    settings: SettingsStore,
    shortcuts: ShortcutRegistrar,
    dock: DockController,
    visual_mode: VisualMode,
    tray_visible: bool,
    login: Box<dyn LoginItems>,
    tray: Box<dyn TrayPresence>,
    rebuilders: Vec<Box<dyn Rebuildable>>,
    events: EventHub,
}

impl AppContext {
    pub fn new(
        settings: SettingsStore,
        shortcuts: ShortcutRegistrar,
        dock: DockController,
        login: Box<dyn LoginItems>,
        tray: Box<dyn TrayPresence>,
        events: EventHub,
    ) -> Self {
        Self {
            settings,
            shortcuts,
            dock,
            visual_mode: VisualMode::default(),
            tray_visible: true,
            login,
            tray,
            rebuilders: Vec::new(),
            events,
        }
    }

    /// Adds a menu that follows the context state. Rebuilders added before
    /// `apply_startup_settings` pick up the persisted state on the first rebuild.
    pub fn add_rebuilder(&mut self, rebuilder: Box<dyn Rebuildable>) {
        self.rebuilders.push(rebuilder);
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn snapshot(&mut self) -> MenuSnapshot {
        MenuSnapshot {
            visual_mode: self.visual_mode,
            dock_hidden: self.dock.is_hidden(),
            start_at_login: self.settings.start_at_login(),
            toggle_shortcut: self.shortcuts.current(),
        }
    }

    /// Rebuilds every registered menu from the current state.
    pub fn rebuild_menus(&mut self) {
        let snapshot = self.snapshot();
        for rebuilder in &self.rebuilders {
            if let Err(e) = rebuilder.rebuild(&snapshot) {
                warn!(error = %e, "Failed to rebuild menu");
            }
        }
    }

    /// Applies persisted Dock, tray and login item preferences, then rebuilds the menus once.
    pub fn apply_startup_settings(&mut self) {
        let hide_app_icon = self.settings.hide_app_icon();
        let show_in_menu_bar = self.settings.show_in_menu_bar();
        let start_at_login = self.settings.start_at_login();

        self.dock.set_hidden(hide_app_icon);
        self.set_tray_visibility(show_in_menu_bar);

        match self.login.is_enabled() {
            Ok(enabled) if enabled != start_at_login => {
                if let Err(e) = self.login.set_enabled(start_at_login) {
                    warn!(error = %e, start_at_login, "Failed to sync login item");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read login item state"),
        }

        info!(hide_app_icon, show_in_menu_bar, start_at_login, "Applied startup settings");
        self.rebuild_menus();
    }

    // --- Dock / tray ---

    pub fn is_dock_hidden(&self) -> bool {
        self.dock.is_hidden()
    }

    /// Sets the Dock icon visibility. Rebuilds the menus only when the state changed.
    pub fn set_dock_icon_visibility(&mut self, hidden: bool) -> bool {
        let changed = self.dock.set_hidden(hidden);
        if changed {
            self.rebuild_menus();
        }
        changed
    }

    pub fn toggle_dock_icon(&mut self) -> bool {
        let hidden = !self.dock.is_hidden();
        self.set_dock_icon_visibility(hidden)
    }

    pub fn is_tray_visible(&self) -> bool {
        self.tray_visible
    }

    /// Shows or hides the menu bar icon. Returns true only when the state changed.
    pub fn set_tray_visibility(&mut self, visible: bool) -> bool {
        if visible == self.tray_visible {
            return false;
        }
        match self.tray.set_visible(visible) {
            Ok(()) => {
                self.tray_visible = visible;
                true
            }
            Err(e) => {
                warn!(error = %e, visible, "Failed to change tray visibility");
                false
            }
        }
    }

    // --- Persisted preferences ---

    pub fn show_in_menu_bar(&mut self) -> bool {
        self.settings.show_in_menu_bar()
    }

    /// Shows or hides the tray icon and persists the preference once the tray matches it.
    /// Returns false when the OS refused, leaving the stored value untouched.
    pub fn set_show_in_menu_bar(&mut self, show: bool) -> bool {
        self.set_tray_visibility(show);
        let applied = self.tray_visible == show;
        if applied {
            self.settings.set_show_in_menu_bar(show);
        }
        applied
    }

    pub fn hide_app_icon(&mut self) -> bool {
        self.settings.hide_app_icon()
    }

    /// Same contract as `set_show_in_menu_bar`, for the Dock icon.
    pub fn set_hide_app_icon(&mut self, hide: bool) -> bool {
        self.set_dock_icon_visibility(hide);
        let applied = self.dock.is_hidden() == hide;
        if applied {
            self.settings.set_hide_app_icon(hide);
        }
        applied
    }

    pub fn start_at_login(&mut self) -> bool {
        self.settings.start_at_login()
    }

    /// Updates the OS login item and persists the preference when that worked. The menus
    /// always rebuild so the checkbox matches the stored value even when the native menu
    /// toggled itself.
    pub fn set_start_at_login(&mut self, start: bool) -> bool {
        let applied = match self.login.set_enabled(start) {
            Ok(()) => {
                self.settings.set_start_at_login(start);
                true
            }
            Err(e) => {
                warn!(error = %e, start, "Failed to update login item");
                false
            }
        };
        self.rebuild_menus();
        applied
    }

    pub fn toggle_start_at_login(&mut self) -> bool {
        let start = !self.settings.start_at_login();
        self.set_start_at_login(start)
    }

    pub fn login_item_settings(&self) -> LoginItemSettings {
        let open_at_login = self.login.is_enabled().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read login item state");
            false
        });
        LoginItemSettings {
            open_at_login,
            open_as_hidden: open_at_login,
        }
    }

    // --- Shortcut ---

    pub fn register_shortcut(&mut self) -> bool {
        let registered = self.shortcuts.register(&mut self.settings);
        self.rebuild_menus();
        registered
    }

    pub fn change_shortcut(&mut self, raw: &str) -> bool {
        let changed = self.shortcuts.change(raw, &mut self.settings);
        if changed {
            self.rebuild_menus();
        }
        changed
    }

    pub fn reset_shortcut(&mut self) -> bool {
        let changed = self.shortcuts.reset(&mut self.settings);
        if changed {
            self.rebuild_menus();
        }
        changed
    }

    pub fn current_shortcut(&self) -> Option<String> {
        self.shortcuts.current()
    }

    pub fn shortcuts(&self) -> &ShortcutRegistrar {
        &self.shortcuts
    }

    pub fn unregister_shortcuts(&mut self) {
        self.shortcuts.unregister_all();
    }
}

impl VisualModeStore for AppContext {
    fn visual_mode(&self) -> VisualMode {
        self.visual_mode
    }

    /// Menus always rebuild and the event always fires, so a native check item toggled off
    /// by the OS snaps back to the active mode.
    fn set_visual_mode(&mut self, mode: VisualMode) {
        debug!(mode = mode.as_str(), "Visual mode set");
        self.visual_mode = mode;
        self.rebuild_menus();
        self.events.publish(&AppEvent::VisualModeChanged(mode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accelerator::DEFAULT_TOGGLE_SHORTCUT;
    use crate::dock::ActivationPolicy;
    use crate::hotkeys::HotkeyBackend;
    use std::sync::Arc;
    use tauri_plugin_global_shortcut::Shortcut;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Calls {
        rebuilds: Vec<MenuSnapshot>,
        policy: Vec<bool>,
        tray: Vec<bool>,
        login: Vec<bool>,
        login_enabled: bool,
        fail_policy: bool,
        fail_tray: bool,
        fail_login: bool,
    }

    type Shared = Arc<Mutex<Calls>>;

    struct FakeRebuilder(Shared);
    impl Rebuildable for FakeRebuilder {
        fn rebuild(&self, snapshot: &MenuSnapshot) -> Result<(), String> {
            self.0.lock().unwrap().rebuilds.push(snapshot.clone());
            Ok(())
        }
    }

    struct FakePolicy(Shared);
    impl ActivationPolicy for FakePolicy {
        fn set_dock_hidden(&self, hidden: bool) -> Result<(), String> {
            let mut calls = self.0.lock().unwrap();
            if calls.fail_policy {
                return Err("denied".to_string());
            }
            calls.policy.push(hidden);
            Ok(())
        }
    }

    struct FakeTray(Shared);
    impl TrayPresence for FakeTray {
        fn set_visible(&self, visible: bool) -> Result<(), String> {
            let mut calls = self.0.lock().unwrap();
            if calls.fail_tray {
                return Err("status item unavailable".to_string());
            }
            calls.tray.push(visible);
            Ok(())
        }
    }

    struct FakeLogin(Shared);
    impl LoginItems for FakeLogin {
        fn is_enabled(&self) -> Result<bool, String> {
            Ok(self.0.lock().unwrap().login_enabled)
        }
        fn set_enabled(&self, enabled: bool) -> Result<(), String> {
            let mut calls = self.0.lock().unwrap();
            if calls.fail_login {
                return Err("launch agent not writable".to_string());
            }
            calls.login.push(enabled);
            calls.login_enabled = enabled;
            Ok(())
        }
    }

    struct AcceptingHotkeys;
    impl HotkeyBackend for AcceptingHotkeys {
        fn register(&self, _: Shortcut) -> Result<(), String> {
            Ok(())
        }
        fn unregister(&self, _: Shortcut) -> Result<(), String> {
            Ok(())
        }
        fn unregister_all(&self) -> Result<(), String> {
            Ok(())
        }
        fn is_registered(&self, _: Shortcut) -> bool {
            true
        }
    }

    fn context(dir: &TempDir) -> (AppContext, Shared) {
        let calls: Shared = Arc::default();
        let settings = SettingsStore::new(Some(dir.path().join("settings.json")));
        let mut ctx = AppContext::new(
            settings,
            ShortcutRegistrar::new(Box::new(AcceptingHotkeys)),
            DockController::new(Box::new(FakePolicy(calls.clone()))),
            Box::new(FakeLogin(calls.clone())),
            Box::new(FakeTray(calls.clone())),
            EventHub::new(),
        );
        ctx.add_rebuilder(Box::new(FakeRebuilder(calls.clone())));
        ctx.add_rebuilder(Box::new(FakeRebuilder(calls.clone())));
        (ctx, calls)
    }

    #[test]
    fn test_dock_visibility_twice_rebuilds_once() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);

        assert!(ctx.set_dock_icon_visibility(true));
        assert!(!ctx.set_dock_icon_visibility(true));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.policy, vec![true]);
        // One rebuild pass reaches both rebuilders.
        assert_eq!(calls.rebuilds.len(), 2);
        assert!(calls.rebuilds.iter().all(|s| s.dock_hidden));
    }

    #[test]
    fn test_policy_failure_keeps_flag_and_menus() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        calls.lock().unwrap().fail_policy = true;

        assert!(!ctx.toggle_dock_icon());
        assert!(!ctx.is_dock_hidden());
        assert!(calls.lock().unwrap().rebuilds.is_empty());
    }

    #[test]
    fn test_visual_mode_change_rebuilds_and_publishes() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = ctx
            .events()
            .subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        ctx.set_visual_mode(VisualMode::BlackMirror);

        assert_eq!(ctx.visual_mode(), VisualMode::BlackMirror);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AppEvent::VisualModeChanged(VisualMode::BlackMirror)]
        );
        let calls = calls.lock().unwrap();
        assert!(calls
            .rebuilds
            .iter()
            .all(|s| s.visual_mode == VisualMode::BlackMirror));
    }

    #[test]
    fn test_startup_applies_persisted_preferences() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = SettingsStore::new(Some(dir.path().join("settings.json")));
            store.set_hide_app_icon(true);
            store.set_show_in_menu_bar(false);
            store.set_start_at_login(true);
        }
        let (mut ctx, calls) = context(&dir);

        ctx.apply_startup_settings();

        assert!(ctx.is_dock_hidden());
        assert!(!ctx.is_tray_visible());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.tray, vec![false]);
        assert_eq!(calls.login, vec![true]);
        assert!(calls.rebuilds.iter().all(|s| s.dock_hidden && s.start_at_login));
    }

    #[test]
    fn test_start_at_login_persists_and_syncs() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);

        assert!(ctx.toggle_start_at_login());

        assert!(ctx.start_at_login());
        assert_eq!(calls.lock().unwrap().login, vec![true]);
        assert!(ctx.login_item_settings().open_at_login);

        let mut fresh = SettingsStore::new(Some(dir.path().join("settings.json")));
        assert!(fresh.start_at_login());
    }

    #[test]
    fn test_show_in_menu_bar_hides_tray() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);

        assert!(ctx.set_show_in_menu_bar(false));
        assert!(ctx.set_show_in_menu_bar(false));

        assert!(!ctx.show_in_menu_bar());
        assert!(!ctx.is_tray_visible());
        assert_eq!(calls.lock().unwrap().tray, vec![false]);
    }

    #[test]
    fn test_hide_app_icon_not_persisted_when_policy_fails() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        calls.lock().unwrap().fail_policy = true;

        assert!(!ctx.set_hide_app_icon(true));

        assert!(!ctx.hide_app_icon());
        assert!(!ctx.is_dock_hidden());
        let mut fresh = SettingsStore::new(Some(dir.path().join("settings.json")));
        assert!(!fresh.hide_app_icon());
    }

    #[test]
    fn test_show_in_menu_bar_not_persisted_when_tray_fails() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        calls.lock().unwrap().fail_tray = true;

        assert!(!ctx.set_show_in_menu_bar(false));

        assert!(ctx.show_in_menu_bar());
        assert!(ctx.is_tray_visible());
    }

    #[test]
    fn test_start_at_login_not_persisted_when_login_item_fails() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        calls.lock().unwrap().fail_login = true;

        assert!(!ctx.toggle_start_at_login());

        assert!(!ctx.start_at_login());
        // The menu still rebuilds so a self-toggled checkbox snaps back.
        let calls = calls.lock().unwrap();
        assert!(!calls.rebuilds.is_empty());
        assert!(calls.rebuilds.iter().all(|s| !s.start_at_login));
    }

    #[test]
    fn test_shortcut_change_updates_menu_label() {
        let dir = TempDir::new().unwrap();
        let (mut ctx, calls) = context(&dir);
        assert!(ctx.register_shortcut());
        assert_eq!(ctx.current_shortcut().as_deref(), Some(DEFAULT_TOGGLE_SHORTCUT));

        assert!(ctx.change_shortcut("Alt+Space"));
        assert!(!ctx.change_shortcut("F13"));

        let calls = calls.lock().unwrap();
        let last = calls.rebuilds.last().unwrap();
        assert_eq!(last.toggle_shortcut.as_deref(), Some("Alt+Space"));
    }
}
