//! Signage window lifecycle: creation, the show/hide toggle, and the settings window.
//!
//! The toggle is driven by OS focus rather than a remembered flag, so hides and minimizes the
//! user did through the window manager never leave it out of sync:
//! - no windows: create one (when a creator is given);
//! - several windows: close every one but the primary;
//! - primary focused: hide it;
//! - otherwise: unminimize, show, focus, and pull the whole app to the front.
//!
//! The settings window is not part of the toggled set.

#[cfg(target_os = "macos")]
use tauri::TitleBarStyle;
use tauri::{Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tracing::{debug, warn};

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const SETTINGS_WINDOW_LABEL: &str = "settings";

const MAIN_WINDOW_WIDTH: f64 = 900.0;
const MAIN_WINDOW_HEIGHT: f64 = 670.0;

// --- Toggle over an abstract window host ---

pub trait WindowHandle {
    fn label(&self) -> String;
    fn is_focused(&self) -> bool;
    fn is_minimized(&self) -> bool;
    fn is_visible(&self) -> bool;
    fn hide(&self) -> Result<(), String>;
    fn unminimize(&self) -> Result<(), String>;
    fn show(&self) -> Result<(), String>;
    fn set_focus(&self) -> Result<(), String>;
    fn close(&self) -> Result<(), String>;
}

pub trait WindowHost {
    type Window: WindowHandle;

    /// Windows subject to the toggle, in a stable order.
    fn windows(&self) -> Vec<Self::Window>;
    /// Label of the tracked primary window.
    fn primary_label(&self) -> &str;
    /// Makes the application itself take focus from whatever app is in front.
    fn activate_app(&self);
}

fn log_failure(result: Result<(), String>, action: &'static str, label: &str) {
    if let Err(e) = result {
        warn!(error = %e, window = label, action, "Window operation failed");
    }
}

/// Shows or hides the primary window depending on whether it currently has focus.
pub fn toggle<H: WindowHost>(host: &H, create: Option<&dyn Fn()>) {
    let mut windows = host.windows();

    if windows.is_empty() {
        match create {
            Some(create) => {
                debug!("No window to toggle, creating one");
                create();
            }
            None => debug!("No window to toggle and no creator given"),
        }
        return;
    }

    let primary_index = windows
        .iter()
        .position(|w| w.label() == host.primary_label())
        .unwrap_or(0);
    let target = windows.swap_remove(primary_index);

    for extra in windows {
        let label = extra.label();
        debug!(window = %label, "Closing extra window");
        log_failure(extra.close(), "close", &label);
    }

    let label = target.label();
    if target.is_focused() {
        log_failure(target.hide(), "hide", &label);
        return;
    }

    if target.is_minimized() {
        log_failure(target.unminimize(), "unminimize", &label);
    }
    if !target.is_visible() {
        log_failure(target.show(), "show", &label);
    }
    log_failure(target.set_focus(), "focus", &label);
    host.activate_app();
}

// --- Tauri host ---

impl<R: tauri::Runtime> WindowHandle for WebviewWindow<R> {
    fn label(&self) -> String {
        WebviewWindow::label(self).to_string()
    }

    fn is_focused(&self) -> bool {
        WebviewWindow::is_focused(self).unwrap_or(false)
    }

    fn is_minimized(&self) -> bool {
        WebviewWindow::is_minimized(self).unwrap_or(false)
    }

    fn is_visible(&self) -> bool {
        WebviewWindow::is_visible(self).unwrap_or(false)
    }

    fn hide(&self) -> Result<(), String> {
        WebviewWindow::hide(self).map_err(|e| e.to_string())
    }

    fn unminimize(&self) -> Result<(), String> {
        WebviewWindow::unminimize(self).map_err(|e| e.to_string())
    }

    fn show(&self) -> Result<(), String> {
        WebviewWindow::show(self).map_err(|e| e.to_string())
    }

    fn set_focus(&self) -> Result<(), String> {
        WebviewWindow::set_focus(self).map_err(|e| e.to_string())
    }

    fn close(&self) -> Result<(), String> {
        WebviewWindow::close(self).map_err(|e| e.to_string())
    }
}

pub struct AppWindows<'a, R: tauri::Runtime> {
    app: &'a tauri::AppHandle<R>,
}

impl<'a, R: tauri::Runtime> AppWindows<'a, R> {
    pub fn new(app: &'a tauri::AppHandle<R>) -> Self {
        Self { app }
    }
}

impl<R: tauri::Runtime> WindowHost for AppWindows<'_, R> {
    type Window = WebviewWindow<R>;

    fn windows(&self) -> Vec<Self::Window> {
        let mut windows: Vec<(String, WebviewWindow<R>)> = self
            .app
            .webview_windows()
            .into_iter()
            .filter(|(label, _)| label != SETTINGS_WINDOW_LABEL)
            .collect();
        windows.sort_by(|a, b| a.0.cmp(&b.0));
        windows.into_iter().map(|(_, w)| w).collect()
    }

    fn primary_label(&self) -> &str {
        MAIN_WINDOW_LABEL
    }

    fn activate_app(&self) {
        #[cfg(target_os = "macos")]
        crate::macos_app::activate_ignoring_other_apps();
    }
}

/// Toggles the Signage window, creating it when none exists.
pub fn toggle_signage_window<R: tauri::Runtime>(app: &tauri::AppHandle<R>) {
    let create = || {
        if let Err(e) = create_main_window(app, true) {
            warn!(error = %e, "Failed to create Signage window");
        }
    };
    toggle(&AppWindows::new(app), Some(&create));
}

// --- URL building ---

/// Page URL inside the bundled `ui/` directory. Tauri serves it in dev and release builds
/// alike, so there is no dev server to point at.
pub fn webview_url(html_path: &str) -> WebviewUrl {
    WebviewUrl::App(html_path.into())
}

// --- Windows ---

/// Creates the Signage window (maximized, black background, inset title bar on macOS).
pub fn create_main_window<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
    visible: bool,
) -> Result<WebviewWindow<R>, String> {
    if let Some(win) = app.get_webview_window(MAIN_WINDOW_LABEL) {
        return Ok(win);
    }

    let builder = WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, webview_url("index.html"))
        .title("Signage")
        .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
        .resizable(true)
        .maximizable(true)
        .maximized(true)
        .background_color(tauri::window::Color(0, 0, 0, 255))
        .visible(visible);

    #[cfg(target_os = "macos")]
    let builder = builder
        .title_bar_style(TitleBarStyle::Overlay)
        .hidden_title(true);

    let window = builder.build().map_err(|e| e.to_string())?;
    if visible {
        let _ = window.set_focus();
    }
    Ok(window)
}

/// Opens the settings window, or focuses it when already open.
pub fn open_settings_window<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<(), String> {
    if let Some(win) = app.get_webview_window(SETTINGS_WINDOW_LABEL) {
        win.show().map_err(|e| e.to_string())?;
        win.set_focus().map_err(|e| e.to_string())?;
        #[cfg(target_os = "macos")]
        crate::macos_app::activate_ignoring_other_apps();
        return Ok(());
    }

    let window = WebviewWindowBuilder::new(app, SETTINGS_WINDOW_LABEL, webview_url("settings.html"))
        .title("Settings")
        .inner_size(480.0, 400.0)
        .min_inner_size(400.0, 300.0)
        .resizable(true)
        .minimizable(false)
        .maximizable(false)
        .center()
        .build()
        .map_err(|e| e.to_string())?;

    let _ = window.set_focus();
    #[cfg(target_os = "macos")]
    crate::macos_app::activate_ignoring_other_apps();
    Ok(())
}

pub fn close_settings_window<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<(), String> {
    if let Some(win) = app.get_webview_window(SETTINGS_WINDOW_LABEL) {
        win.close().map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct WindowState {
        focused: bool,
        minimized: bool,
        visible: bool,
        closed: bool,
        log: Vec<&'static str>,
    }

    #[derive(Clone)]
    struct FakeWindow {
        label: String,
        state: Rc<RefCell<WindowState>>,
    }

    impl FakeWindow {
        fn new(label: &str, focused: bool, minimized: bool, visible: bool) -> Self {
            Self {
                label: label.to_string(),
                state: Rc::new(RefCell::new(WindowState {
                    focused,
                    minimized,
                    visible,
                    ..Default::default()
                })),
            }
        }

        fn log(&self) -> Vec<&'static str> {
            self.state.borrow().log.clone()
        }
    }

    impl WindowHandle for FakeWindow {
        fn label(&self) -> String {
            self.label.clone()
        }
        fn is_focused(&self) -> bool {
            self.state.borrow().focused
        }
        fn is_minimized(&self) -> bool {
            self.state.borrow().minimized
        }
        fn is_visible(&self) -> bool {
            self.state.borrow().visible
        }
        fn hide(&self) -> Result<(), String> {
            let mut s = self.state.borrow_mut();
            s.visible = false;
            s.focused = false;
            s.log.push("hide");
            Ok(())
        }
        fn unminimize(&self) -> Result<(), String> {
            let mut s = self.state.borrow_mut();
            s.minimized = false;
            s.log.push("unminimize");
            Ok(())
        }
        fn show(&self) -> Result<(), String> {
            let mut s = self.state.borrow_mut();
            s.visible = true;
            s.log.push("show");
            Ok(())
        }
        fn set_focus(&self) -> Result<(), String> {
            let mut s = self.state.borrow_mut();
            s.focused = true;
            s.log.push("focus");
            Ok(())
        }
        fn close(&self) -> Result<(), String> {
            let mut s = self.state.borrow_mut();
            s.closed = true;
            s.log.push("close");
            Ok(())
        }
    }

    struct FakeHost {
        windows: RefCell<Vec<FakeWindow>>,
        activations: Cell<usize>,
    }

    impl FakeHost {
        fn new(windows: Vec<FakeWindow>) -> Self {
            Self {
                windows: RefCell::new(windows),
                activations: Cell::new(0),
            }
        }

        fn open_count(&self) -> usize {
            self.windows
                .borrow()
                .iter()
                .filter(|w| !w.state.borrow().closed)
                .count()
        }
    }

    impl WindowHost for FakeHost {
        type Window = FakeWindow;

        fn windows(&self) -> Vec<FakeWindow> {
            self.windows
                .borrow()
                .iter()
                .filter(|w| !w.state.borrow().closed)
                .cloned()
                .collect()
        }

        fn primary_label(&self) -> &str {
            MAIN_WINDOW_LABEL
        }

        fn activate_app(&self) {
            self.activations.set(self.activations.get() + 1);
        }
    }

    #[test]
    fn test_pages_load_from_bundled_ui() {
        for page in ["index.html", "settings.html"] {
            match webview_url(page) {
                WebviewUrl::App(path) => assert_eq!(path, std::path::PathBuf::from(page)),
                other => panic!("{page} should be an app URL, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_no_windows_without_creator_is_noop() {
        let host = FakeHost::new(Vec::new());
        toggle(&host, None);
        assert_eq!(host.activations.get(), 0);
    }

    #[test]
    fn test_no_windows_invokes_creator() {
        let host = FakeHost::new(Vec::new());
        let created = Cell::new(0);
        let create = || created.set(created.get() + 1);
        toggle(&host, Some(&create));
        assert_eq!(created.get(), 1);
    }

    #[test]
    fn test_extra_windows_are_closed() {
        let main = FakeWindow::new(MAIN_WINDOW_LABEL, false, false, true);
        let host = FakeHost::new(vec![
            FakeWindow::new("extra-1", false, false, true),
            main.clone(),
            FakeWindow::new("extra-2", true, false, true),
        ]);

        toggle(&host, None);

        assert_eq!(host.open_count(), 1);
        assert!(!main.state.borrow().closed);
    }

    #[test]
    fn test_first_window_is_primary_when_main_missing() {
        let first = FakeWindow::new("a", false, false, true);
        let second = FakeWindow::new("b", false, false, true);
        let host = FakeHost::new(vec![first.clone(), second.clone()]);

        toggle(&host, None);

        assert!(!first.state.borrow().closed);
        assert!(second.state.borrow().closed);
    }

    #[test]
    fn test_focused_window_is_hidden() {
        let main = FakeWindow::new(MAIN_WINDOW_LABEL, true, false, true);
        let host = FakeHost::new(vec![main.clone()]);

        toggle(&host, None);

        assert_eq!(main.log(), vec!["hide"]);
        assert!(!main.state.borrow().visible);
        assert_eq!(host.activations.get(), 0);
    }

    #[test]
    fn test_minimized_window_is_restored_and_focused() {
        let main = FakeWindow::new(MAIN_WINDOW_LABEL, false, true, true);
        let host = FakeHost::new(vec![main.clone()]);

        toggle(&host, None);

        assert_eq!(main.log(), vec!["unminimize", "focus"]);
        assert_eq!(host.activations.get(), 1);
    }

    #[test]
    fn test_hidden_window_is_shown_and_focused() {
        let main = FakeWindow::new(MAIN_WINDOW_LABEL, false, false, false);
        let host = FakeHost::new(vec![main.clone()]);

        toggle(&host, None);

        assert_eq!(main.log(), vec!["show", "focus"]);
        assert_eq!(host.activations.get(), 1);
    }

    #[test]
    fn test_two_toggles_round_trip() {
        let main = FakeWindow::new(MAIN_WINDOW_LABEL, false, false, false);
        let host = FakeHost::new(vec![main.clone()]);

        toggle(&host, None);
        assert!(main.is_visible() && main.is_focused());
        toggle(&host, None);
        assert!(!main.is_visible());
    }
}
