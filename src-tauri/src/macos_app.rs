//! AppKit calls Tauri does not expose: forcing app activation and restoring the Dock icon.
//!
//! When the app flips from Accessory back to Regular activation policy, macOS sometimes shows
//! a generic icon in the Dock, so the bundled icon is set again explicitly.

use objc::runtime::{Class, Object, YES};
use objc::{msg_send, sel, sel_impl};
use tracing::warn;

/// Application icon (icons/icon.png).
pub const APP_ICON_PNG: &[u8] = include_bytes!("../icons/icon.png");

fn shared_application() -> Option<*mut Object> {
    let Some(ns_app_class) = Class::get("NSApplication") else {
        warn!("NSApplication class not found");
        return None;
    };
    // NSApp = [NSApplication sharedApplication]
    let ns_app: *mut Object = unsafe { msg_send![ns_app_class, sharedApplication] };
    if ns_app.is_null() {
        return None;
    }
    Some(ns_app)
}

/// Brings the whole application to the foreground, even over other apps' full-screen spaces.
pub fn activate_ignoring_other_apps() {
    let Some(ns_app) = shared_application() else {
        return;
    };
    unsafe {
        // [NSApp activateIgnoringOtherApps:YES]
        let _: () = msg_send![ns_app, activateIgnoringOtherApps: YES];
    }
}

/// Sets the application icon in the Dock to the bundled icon.
/// Call after switching the activation policy to Regular.
pub fn restore_dock_icon() {
    let (Some(ns_data_class), Some(ns_image_class)) = (Class::get("NSData"), Class::get("NSImage"))
    else {
        warn!("NSData/NSImage classes not found");
        return;
    };
    let Some(ns_app) = shared_application() else {
        return;
    };

    unsafe {
        // NSData *data = [NSData dataWithBytes:bytes length:length];
        let data: *mut Object = msg_send![ns_data_class, dataWithBytes: APP_ICON_PNG.as_ptr() length: APP_ICON_PNG.len()];

        if data.is_null() {
            warn!("Failed to create NSData from icon bytes");
            return;
        }

        // NSImage *image = [[NSImage alloc] initWithData:data];
        let image_alloc: *mut Object = msg_send![ns_image_class, alloc];
        let image: *mut Object = msg_send![image_alloc, initWithData: data];

        if image.is_null() {
            warn!("Failed to create NSImage from icon data");
            return;
        }

        // [NSApp setApplicationIconImage:image]
        let _: () = msg_send![ns_app, setApplicationIconImage: image];

        let _: () = msg_send![image, release];
    }
}
