//! One-way events pushed from the shell to the webviews.
//!
//! `EventHub` fans each `AppEvent` out to its listeners. Listeners hold a `Subscription`;
//! dropping it removes the listener. The webview forwarder is a listener like any other, kept
//! alive in Tauri managed state for the lifetime of the app.

use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;
use serde_json::Value;
use tauri::Emitter;
use tracing::warn;

use crate::visual_mode::VisualMode;

/// Release metadata shared by "available" and "downloaded".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    pub release_date: Option<String>,
    pub release_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgress {
    pub percent: f64,
    pub bytes_per_second: u64,
    pub transferred: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    VisualModeChanged(VisualMode),
    UpdateChecking,
    UpdateAvailable(UpdateInfo),
    UpdateNotAvailable,
    UpdateProgress(UpdateProgress),
    UpdateDownloaded(UpdateInfo),
    UpdateError(String),
}

impl AppEvent {
    /// Event name the webview listens on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::VisualModeChanged(_) => "visual-mode-changed",
            Self::UpdateChecking => "update-checking",
            Self::UpdateAvailable(_) => "update-available",
            Self::UpdateNotAvailable => "update-not-available",
            Self::UpdateProgress(_) => "update-progress",
            Self::UpdateDownloaded(_) => "update-downloaded",
            Self::UpdateError(_) => "update-error",
        }
    }

    pub fn payload(&self) -> Value {
        let value = match self {
            Self::VisualModeChanged(mode) => serde_json::to_value(mode),
            Self::UpdateAvailable(info) | Self::UpdateDownloaded(info) => {
                serde_json::to_value(info)
            }
            Self::UpdateProgress(progress) => serde_json::to_value(progress),
            Self::UpdateError(message) => Ok(Value::String(message.clone())),
            Self::UpdateChecking | Self::UpdateNotAvailable => Ok(Value::Null),
        };
        value.unwrap_or(Value::Null)
    }
}

type Listener = Arc<dyn Fn(&AppEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<Listeners>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = match self.inner.lock() {
            Ok(mut listeners) => {
                let id = listeners.next_id;
                listeners.next_id += 1;
                listeners.entries.push((id, Arc::new(listener)));
                id
            }
            Err(_) => {
                warn!("Event hub lock poisoned, listener not added");
                u64::MAX
            }
        };
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every live listener. Listeners run outside the hub lock, so they
    /// may subscribe or drop subscriptions themselves.
    pub fn publish(&self, event: &AppEvent) {
        let listeners: Vec<Listener> = match self.inner.lock() {
            Ok(listeners) => listeners.entries.iter().map(|(_, l)| l.clone()).collect(),
            Err(_) => {
                warn!(channel = event.channel(), "Event hub lock poisoned, event dropped");
                return;
            }
        };
        for listener in listeners {
            listener(event);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|l| l.entries.len()).unwrap_or(0)
    }
}

/// Keeps a listener registered until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    hub: Weak<Mutex<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        if let Ok(mut listeners) = hub.lock() {
            listeners.entries.retain(|(id, _)| *id != self.id);
        };
    }
}

/// Managed-state holder for the webview forwarder.
pub struct WebviewForwarding(#[allow(dead_code)] Subscription);

/// Forwards every hub event to all webviews as a Tauri event.
pub fn forward_to_webviews<R: tauri::Runtime>(
    app: tauri::AppHandle<R>,
    hub: &EventHub,
) -> WebviewForwarding {
    let subscription = hub.subscribe(move |event| {
        if let Err(e) = app.emit(event.channel(), event.payload()) {
            warn!(error = %e, channel = event.channel(), "Failed to emit event to webviews");
        }
    });
    WebviewForwarding(subscription)
}
