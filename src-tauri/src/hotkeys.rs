//! Global keyboard shortcut registration and handling.
//!
//! One system-wide shortcut toggles the Signage window. The binding comes from settings
//! (`toggleShortcut`) and can be changed at runtime from the settings window. Changing it
//! unregisters the old binding first; if the OS refuses the new one (usually because another
//! application owns it) the old binding is registered again so the app never ends up unbound.
//! The OS side sits behind `HotkeyBackend` so the registrar can run against fakes in tests.

use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};
use tracing::{debug, error, info, warn};

use crate::accelerator::{Accelerator, DEFAULT_TOGGLE_SHORTCUT};
use crate::settings::SettingsStore;

/// OS-level hotkey binding.
pub trait HotkeyBackend: Send {
    fn register(&self, shortcut: Shortcut) -> Result<(), String>;
    fn unregister(&self, shortcut: Shortcut) -> Result<(), String>;
    fn unregister_all(&self) -> Result<(), String>;
    fn is_registered(&self, shortcut: Shortcut) -> bool;
}

/// `HotkeyBackend` over the Tauri global shortcut plugin.
pub struct PluginHotkeys<R: tauri::Runtime> {
    app: tauri::AppHandle<R>,
}

impl<R: tauri::Runtime> PluginHotkeys<R> {
    pub fn new(app: tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> HotkeyBackend for PluginHotkeys<R> {
    fn register(&self, shortcut: Shortcut) -> Result<(), String> {
        self.app
            .global_shortcut()
            .register(shortcut)
            .map_err(|e| e.to_string())
    }

    fn unregister(&self, shortcut: Shortcut) -> Result<(), String> {
        self.app
            .global_shortcut()
            .unregister(shortcut)
            .map_err(|e| e.to_string())
    }

    fn unregister_all(&self) -> Result<(), String> {
        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| e.to_string())
    }

    fn is_registered(&self, shortcut: Shortcut) -> bool {
        self.app.global_shortcut().is_registered(shortcut)
    }
}

/// Tracks the single toggle binding.
pub struct ShortcutRegistrar {
    backend: Box<dyn HotkeyBackend>,
    current: Option<Accelerator>,
}

impl ShortcutRegistrar {
    pub fn new(backend: Box<dyn HotkeyBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    fn bind(&mut self, accelerator: Accelerator) -> bool {
        match self.backend.register(accelerator.shortcut()) {
            Ok(()) => {
                info!(shortcut = %accelerator, "Registered toggle shortcut");
                self.current = Some(accelerator);
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    shortcut = %accelerator,
                    "Failed to register toggle shortcut, it may be in use by another application"
                );
                false
            }
        }
    }

    /// Binds the persisted shortcut. A persisted value that no longer parses falls back to
    /// the default binding.
    pub fn register(&mut self, settings: &mut SettingsStore) -> bool {
        let persisted = settings.toggle_shortcut();
        let accelerator = match Accelerator::parse(&persisted) {
            Ok(accelerator) => accelerator,
            Err(e) => {
                warn!(error = %e, shortcut = %persisted, "Persisted shortcut is invalid, using default");
                match Accelerator::parse(DEFAULT_TOGGLE_SHORTCUT) {
                    Ok(accelerator) => accelerator,
                    Err(e) => {
                        error!(error = %e, "Default shortcut failed to parse");
                        return false;
                    }
                }
            }
        };

        if let Some(previous) = self.current.take() {
            if let Err(e) = self.backend.unregister(previous.shortcut()) {
                warn!(error = %e, shortcut = %previous, "Failed to unregister shortcut");
            }
        }
        self.bind(accelerator)
    }

    /// Rebinds the toggle to `raw`. Returns false (and keeps the previous binding) when the
    /// string is invalid or the OS refuses it; persists the canonical form on success.
    pub fn change(&mut self, raw: &str, settings: &mut SettingsStore) -> bool {
        let next = match Accelerator::parse(raw) {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, shortcut = raw, "Invalid shortcut format");
                return false;
            }
        };

        let previous = self.current.take();
        if let Some(previous) = &previous {
            if let Err(e) = self.backend.unregister(previous.shortcut()) {
                warn!(error = %e, shortcut = %previous, "Failed to unregister previous shortcut");
            }
        }

        if self.bind(next.clone()) {
            settings.set_toggle_shortcut(next.as_str());
            return true;
        }

        if let Some(previous) = previous {
            if !self.bind(previous.clone()) {
                error!(shortcut = %previous, "Failed to restore previous shortcut");
            }
        }
        false
    }

    pub fn reset(&mut self, settings: &mut SettingsStore) -> bool {
        self.change(DEFAULT_TOGGLE_SHORTCUT, settings)
    }

    /// Canonical form of the active binding, if any.
    pub fn current(&self) -> Option<String> {
        self.current.as_ref().map(|a| a.as_str().to_string())
    }

    pub fn is_registered(&self) -> bool {
        self.current
            .as_ref()
            .map(|a| self.backend.is_registered(a.shortcut()))
            .unwrap_or(false)
    }

    pub fn matches(&self, shortcut: &Shortcut) -> bool {
        self.current
            .as_ref()
            .map(|a| a.shortcut() == *shortcut)
            .unwrap_or(false)
    }

    pub fn unregister_all(&mut self) {
        if let Err(e) = self.backend.unregister_all() {
            warn!(error = %e, "Failed to unregister global shortcuts");
        }
        self.current = None;
    }
}

/// Called by the global shortcut plugin on every key event. Runs `toggle` when the active
/// binding is pressed.
pub fn handle_global_shortcut_event<F>(
    registrar: &ShortcutRegistrar,
    shortcut: &Shortcut,
    event_state: ShortcutState,
    toggle: F,
) where
    F: FnOnce(),
{
    if event_state != ShortcutState::Pressed {
        return;
    }
    if registrar.matches(shortcut) {
        debug!(shortcut = ?shortcut, "Toggle shortcut pressed");
        toggle();
    }
}
