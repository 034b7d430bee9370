//! Background update checks through `tauri-plugin-updater`.
//!
//! The first check runs a few seconds after startup, then every four hours. An available
//! update is downloaded right away; its bytes stay pending until the webview asks to install,
//! which installs and restarts, or until the app quits, which installs without relaunching.
//! Every stage is published on the event hub and download progress also shows on the Dock or
//! taskbar icon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tauri::window::{ProgressBarState, ProgressBarStatus};
use tauri::Manager;
use tauri_plugin_updater::{Update, UpdaterExt};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::events::{AppEvent, EventHub, UpdateInfo, UpdateProgress};
use crate::windows::MAIN_WINDOW_LABEL;

const FIRST_CHECK_DELAY: Duration = Duration::from_secs(5);
const CHECK_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("updater: {0}")]
    Plugin(#[from] tauri_plugin_updater::Error),
    #[error("an update check is already running")]
    Busy,
    #[error("no downloaded update to install")]
    NothingPending,
    #[error("updater state lock poisoned")]
    LockPoisoned,
}

struct PendingUpdate<U> {
    update: U,
    bytes: Vec<u8>,
    info: UpdateInfo,
}

/// Managed state: the hub to report on, the downloaded update, and a guard against
/// overlapping checks.
pub struct UpdaterState<U = Update> {
    events: EventHub,
    pending: Mutex<Option<PendingUpdate<U>>>,
    checking: AtomicBool,
}

impl<U> UpdaterState<U> {
    pub fn new(events: EventHub) -> Self {
        Self {
            events,
            pending: Mutex::new(None),
            checking: AtomicBool::new(false),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    fn store_pending(&self, update: U, bytes: Vec<u8>, info: UpdateInfo) -> Result<(), UpdateError> {
        let mut pending = self.pending.lock().map_err(|_| UpdateError::LockPoisoned)?;
        *pending = Some(PendingUpdate {
            update,
            bytes,
            info: info.clone(),
        });
        drop(pending);
        self.events.publish(&AppEvent::UpdateDownloaded(info));
        Ok(())
    }

    /// Publishes `update-downloaded` again for an update that is already waiting, so windows
    /// opened after the download still learn about it. Returns whether one was pending.
    fn announce_pending(&self) -> bool {
        let info = match self.pending.lock() {
            Ok(pending) => pending.as_ref().map(|p| p.info.clone()),
            Err(_) => None,
        };
        match info {
            Some(info) => {
                debug!(version = %info.version, "Update already downloaded, waiting for install");
                self.events.publish(&AppEvent::UpdateDownloaded(info));
                true
            }
            None => false,
        }
    }

    /// Runs `install` on the pending update. A failed install keeps the bytes pending so the
    /// next request can retry without downloading again.
    fn install_pending<F>(&self, install: F) -> Result<(), UpdateError>
    where
        F: FnOnce(&U, &[u8]) -> Result<(), UpdateError>,
    {
        let mut slot = self.pending.lock().map_err(|_| UpdateError::LockPoisoned)?;
        let pending = slot.take().ok_or(UpdateError::NothingPending)?;

        info!(version = %pending.info.version, "Installing update");
        let installed = install(&pending.update, &pending.bytes);
        if let Err(e) = installed {
            *slot = Some(pending);
            drop(slot);
            self.events.publish(&AppEvent::UpdateError(e.to_string()));
            return Err(e);
        }
        Ok(())
    }
}

/// Human-readable byte count, e.g. `10.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Download percentage in 0..=100; 0 while the total is unknown.
pub fn progress_percent(transferred: u64, total: Option<u64>) -> f64 {
    match total {
        Some(total) if total > 0 => (transferred as f64 / total as f64 * 100.0).min(100.0),
        _ => 0.0,
    }
}

/// Dock/taskbar progress for a download percentage. `None` clears the indicator.
pub fn progress_bar_state(percent: Option<f64>) -> ProgressBarState {
    match percent {
        Some(percent) => ProgressBarState {
            status: Some(ProgressBarStatus::Normal),
            progress: Some(percent.clamp(0.0, 100.0).round() as u64),
        },
        None => ProgressBarState {
            status: Some(ProgressBarStatus::None),
            progress: None,
        },
    }
}

fn show_download_progress<R: tauri::Runtime>(app: &tauri::AppHandle<R>, percent: Option<f64>) {
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        return;
    };
    if let Err(e) = window.set_progress_bar(progress_bar_state(percent)) {
        debug!(error = %e, "Failed to update download progress indicator");
    }
}

fn bytes_per_second(transferred: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (transferred as f64 / secs) as u64
}

fn update_info(update: &Update) -> UpdateInfo {
    UpdateInfo {
        version: update.version.clone(),
        release_date: update.date.map(|d| d.to_string()),
        release_notes: update.body.clone(),
    }
}

/// Starts the periodic check loop on Tauri's async runtime.
pub fn spawn_update_checks<R: tauri::Runtime>(app: tauri::AppHandle<R>) {
    if tauri::is_dev() {
        debug!("Dev build, update checks disabled");
        return;
    }
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(FIRST_CHECK_DELAY).await;
        loop {
            match check_and_download(&app).await {
                Ok(_) => {}
                Err(UpdateError::Busy) => debug!("Skipping scheduled check, one is running"),
                Err(e) => warn!(error = %e, "Scheduled update check failed"),
            }
            tokio::time::sleep(CHECK_INTERVAL).await;
        }
    });
}

/// Checks for an update and downloads it when one is available. Returns whether an update
/// was found.
pub async fn check_and_download<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
) -> Result<bool, UpdateError> {
    let state = app.state::<UpdaterState>();
    if state.announce_pending() {
        return Ok(true);
    }
    if state.checking.swap(true, Ordering::SeqCst) {
        return Err(UpdateError::Busy);
    }
    let result = run_check(app, &state).await;
    state.checking.store(false, Ordering::SeqCst);

    if let Err(e) = &result {
        show_download_progress(app, None);
        error!(error = %e, "Update check failed");
        state.events.publish(&AppEvent::UpdateError(e.to_string()));
    }
    result
}

async fn run_check<R: tauri::Runtime>(
    app: &tauri::AppHandle<R>,
    state: &UpdaterState,
) -> Result<bool, UpdateError> {
    info!("Checking for updates");
    state.events.publish(&AppEvent::UpdateChecking);

    let Some(update) = app.updater()?.check().await? else {
        info!("No update available");
        state.events.publish(&AppEvent::UpdateNotAvailable);
        return Ok(false);
    };

    let info = update_info(&update);
    info!(version = %info.version, "Update available");
    state.events.publish(&AppEvent::UpdateAvailable(info.clone()));

    let started = Instant::now();
    let mut transferred: u64 = 0;
    let mut shown_percent: Option<u64> = None;
    let events = state.events.clone();
    let bytes = update
        .download(
            |chunk, total| {
                transferred += chunk as u64;
                let percent = progress_percent(transferred, total);
                // The indicator only moves in whole percents.
                let whole = percent.round() as u64;
                if shown_percent != Some(whole) {
                    shown_percent = Some(whole);
                    show_download_progress(app, Some(percent));
                }
                events.publish(&AppEvent::UpdateProgress(UpdateProgress {
                    percent,
                    bytes_per_second: bytes_per_second(transferred, started.elapsed()),
                    transferred,
                    total: total.unwrap_or(0),
                }));
            },
            || debug!("Update download finished"),
        )
        .await?;

    info!(
        version = %info.version,
        size = %format_bytes(bytes.len() as u64),
        "Update downloaded"
    );
    show_download_progress(app, None);
    state.store_pending(update, bytes, info)?;
    Ok(true)
}

/// Installs the downloaded update and restarts the app.
pub fn install_and_restart<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Result<(), UpdateError> {
    let state = app.state::<UpdaterState>();
    state.install_pending(|update, bytes| Ok(update.install(bytes)?))?;
    app.restart()
}

/// Installs a downloaded update while the app quits, without relaunching it.
pub fn install_on_exit<R: tauri::Runtime>(app: &tauri::AppHandle<R>) {
    let Some(state) = app.try_state::<UpdaterState>() else {
        return;
    };
    if !state.has_pending() {
        return;
    }
    if let Err(e) = state.install_pending(|update, bytes| Ok(update.install(bytes)?)) {
        warn!(error = %e, "Failed to install downloaded update on quit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Subscription;
    use std::sync::Arc;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(11_010_048), "10.5 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(50, Some(200)), 25.0);
        assert_eq!(progress_percent(10, None), 0.0);
        assert_eq!(progress_percent(10, Some(0)), 0.0);
        assert_eq!(progress_percent(300, Some(200)), 100.0);
    }

    #[test]
    fn test_bytes_per_second() {
        assert_eq!(bytes_per_second(2048, Duration::from_secs(2)), 1024);
        assert_eq!(bytes_per_second(2048, Duration::ZERO), 0);
    }

    #[test]
    fn test_progress_bar_state() {
        let bar = progress_bar_state(Some(25.4));
        assert!(matches!(bar.status, Some(ProgressBarStatus::Normal)));
        assert_eq!(bar.progress, Some(25));
        assert_eq!(progress_bar_state(Some(99.6)).progress, Some(100));
        assert_eq!(progress_bar_state(Some(140.0)).progress, Some(100));

        let cleared = progress_bar_state(None);
        assert!(matches!(cleared.status, Some(ProgressBarStatus::None)));
        assert_eq!(cleared.progress, None);
    }

    fn info(version: &str) -> UpdateInfo {
        UpdateInfo {
            version: version.to_string(),
            release_date: None,
            release_notes: None,
        }
    }

    fn recorded(state: &UpdaterState<&'static str>) -> (Arc<Mutex<Vec<AppEvent>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = state
            .events
            .subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        (seen, subscription)
    }

    #[test]
    fn test_new_state_has_nothing_pending() {
        let state: UpdaterState<&'static str> = UpdaterState::new(EventHub::new());
        assert!(!state.has_pending());
        assert!(!state.announce_pending());
        assert!(matches!(
            state.install_pending(|_, _| Ok(())),
            Err(UpdateError::NothingPending)
        ));
    }

    #[test]
    fn test_pending_update_is_announced_again() {
        let state = UpdaterState::new(EventHub::new());
        state.store_pending("1.2.0", vec![1, 2, 3], info("1.2.0")).unwrap();
        let (seen, _subscription) = recorded(&state);

        assert!(state.announce_pending());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![AppEvent::UpdateDownloaded(info("1.2.0"))]
        );
    }

    #[test]
    fn test_failed_install_keeps_update_pending() {
        let state = UpdaterState::new(EventHub::new());
        state.store_pending("1.2.0", vec![7; 4], info("1.2.0")).unwrap();
        let (seen, _subscription) = recorded(&state);

        let failed = state.install_pending(|_, _| Err(UpdateError::Busy));
        assert!(failed.is_err());
        assert!(state.has_pending());
        assert!(matches!(
            seen.lock().unwrap().as_slice(),
            [AppEvent::UpdateError(_)]
        ));

        let mut installed = Vec::new();
        state
            .install_pending(|update, bytes| {
                installed.push((*update, bytes.to_vec()));
                Ok(())
            })
            .unwrap();
        assert_eq!(installed, vec![("1.2.0", vec![7; 4])]);
        assert!(!state.has_pending());
    }
}
