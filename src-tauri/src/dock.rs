//! Dock icon visibility via the macOS activation policy.
//!
//! Regular policy shows the Dock icon and menu bar; Accessory hides the Dock icon and only
//! shows the menu bar while one of our windows is focused. The controller tracks the flag the
//! menus display, and only flips it once the OS call succeeded, so labels cannot drift from
//! what the Dock actually shows.

use tracing::{debug, warn};

/// OS activation policy switch.
pub trait ActivationPolicy: Send {
    fn set_dock_hidden(&self, hidden: bool) -> Result<(), String>;
}

/// `ActivationPolicy` for a running Tauri app.
pub struct AppActivationPolicy<R: tauri::Runtime> {
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    app: tauri::AppHandle<R>,
}

impl<R: tauri::Runtime> AppActivationPolicy<R> {
    pub fn new(app: tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> ActivationPolicy for AppActivationPolicy<R> {
    #[cfg(target_os = "macos")]
    fn set_dock_hidden(&self, hidden: bool) -> Result<(), String> {
        let policy = if hidden {
            tauri::ActivationPolicy::Accessory
        } else {
            tauri::ActivationPolicy::Regular
        };
        self.app
            .set_activation_policy(policy)
            .map_err(|e| e.to_string())?;
        if !hidden {
            crate::macos_app::restore_dock_icon();
        }
        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    fn set_dock_hidden(&self, hidden: bool) -> Result<(), String> {
        debug!(hidden, "Activation policy is macOS-only, ignoring");
        Ok(())
    }
}

pub struct DockController {
    policy: Box<dyn ActivationPolicy>,
    hidden: bool,
}

impl DockController {
    pub fn new(policy: Box<dyn ActivationPolicy>) -> Self {
        Self {
            policy,
            hidden: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Applies `hidden`. Returns true only when the visible state actually changed.
    pub fn set_hidden(&mut self, hidden: bool) -> bool {
        if hidden == self.hidden {
            return false;
        }
        if let Err(e) = self.policy.set_dock_hidden(hidden) {
            warn!(error = %e, hidden, "Failed to change activation policy");
            return false;
        }
        debug!(hidden, "Dock icon visibility changed");
        self.hidden = hidden;
        true
    }
}
