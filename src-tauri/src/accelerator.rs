//! Accelerator strings for the toggle shortcut.
//!
//! An accelerator is a `+`-joined list of modifier tokens followed by exactly one key token,
//! e.g. `CommandOrControl+Shift+S`. Tokens are case-insensitive and trimmed. At least one
//! modifier is required unless the key is a function key (F1-F12), which may stand alone.
//! Parsing yields the typed `Shortcut` registered with the global shortcut plugin plus a
//! canonical string form, which is what gets persisted and reported back to the settings UI.

use std::fmt;

use tauri_plugin_global_shortcut::{Code, Modifiers, Shortcut};
use thiserror::Error;

/// Shortcut used on first launch and by "reset".
pub const DEFAULT_TOGGLE_SHORTCUT: &str = "CommandOrControl+Shift+S";

/// Presets offered by the settings window.
pub const SHORTCUT_PRESETS: [&str; 5] = [
    "CommandOrControl+Shift+S",
    "CommandOrControl+Shift+Space",
    "CommandOrControl+Alt+S",
    "CommandOrControl+Alt+Space",
    "F12",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceleratorError {
    #[error("accelerator is empty")]
    Empty,
    #[error("accelerator contains an empty token")]
    EmptyToken,
    #[error("unsupported accelerator token: {0}")]
    UnknownToken(String),
    #[error("modifier {0} appears more than once")]
    DuplicateModifier(&'static str),
    #[error("accelerator has no key, only modifiers")]
    MissingKey,
    #[error("accelerator has more than one key ({0} after {1})")]
    MultipleKeys(String, String),
    #[error("key {0} must be the last token")]
    KeyNotLast(String),
    #[error("key {0} needs at least one modifier")]
    MissingModifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    CommandOrControl,
    Command,
    Control,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "commandorcontrol" | "commandorctrl" | "cmdorctrl" | "cmdorcontrol" => {
                Some(Self::CommandOrControl)
            }
            "command" | "cmd" => Some(Self::Command),
            "control" | "ctrl" => Some(Self::Control),
            "alt" | "option" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "super" | "meta" => Some(Self::Super),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::CommandOrControl => "CommandOrControl",
            Self::Command => "Command",
            Self::Control => "Control",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Super => "Super",
        }
    }

    fn flags(self) -> Modifiers {
        match self {
            #[cfg(target_os = "macos")]
            Self::CommandOrControl => Modifiers::SUPER,
            #[cfg(not(target_os = "macos"))]
            Self::CommandOrControl => Modifiers::CONTROL,
            Self::Command | Self::Super => Modifiers::SUPER,
            Self::Control => Modifiers::CONTROL,
            Self::Alt => Modifiers::ALT,
            Self::Shift => Modifiers::SHIFT,
        }
    }
}

/// Maps a lowercased key token to its key code and canonical label.
fn parse_key(token: &str) -> Option<(Code, &'static str)> {
    let key = match token {
        "a" => (Code::KeyA, "A"),
        "b" => (Code::KeyB, "B"),
        "c" => (Code::KeyC, "C"),
        "d" => (Code::KeyD, "D"),
        "e" => (Code::KeyE, "E"),
        "f" => (Code::KeyF, "F"),
        "g" => (Code::KeyG, "G"),
        "h" => (Code::KeyH, "H"),
        "i" => (Code::KeyI, "I"),
        "j" => (Code::KeyJ, "J"),
        "k" => (Code::KeyK, "K"),
        "l" => (Code::KeyL, "L"),
        "m" => (Code::KeyM, "M"),
        "n" => (Code::KeyN, "N"),
        "o" => (Code::KeyO, "O"),
        "p" => (Code::KeyP, "P"),
        "q" => (Code::KeyQ, "Q"),
        "r" => (Code::KeyR, "R"),
        "s" => (Code::KeyS, "S"),
        "t" => (Code::KeyT, "T"),
        "u" => (Code::KeyU, "U"),
        "v" => (Code::KeyV, "V"),
        "w" => (Code::KeyW, "W"),
        "x" => (Code::KeyX, "X"),
        "y" => (Code::KeyY, "Y"),
        "z" => (Code::KeyZ, "Z"),
        "0" => (Code::Digit0, "0"),
        "1" => (Code::Digit1, "1"),
        "2" => (Code::Digit2, "2"),
        "3" => (Code::Digit3, "3"),
        "4" => (Code::Digit4, "4"),
        "5" => (Code::Digit5, "5"),
        "6" => (Code::Digit6, "6"),
        "7" => (Code::Digit7, "7"),
        "8" => (Code::Digit8, "8"),
        "9" => (Code::Digit9, "9"),
        "f1" => (Code::F1, "F1"),
        "f2" => (Code::F2, "F2"),
        "f3" => (Code::F3, "F3"),
        "f4" => (Code::F4, "F4"),
        "f5" => (Code::F5, "F5"),
        "f6" => (Code::F6, "F6"),
        "f7" => (Code::F7, "F7"),
        "f8" => (Code::F8, "F8"),
        "f9" => (Code::F9, "F9"),
        "f10" => (Code::F10, "F10"),
        "f11" => (Code::F11, "F11"),
        "f12" => (Code::F12, "F12"),
        "space" => (Code::Space, "Space"),
        "tab" => (Code::Tab, "Tab"),
        "backspace" => (Code::Backspace, "Backspace"),
        "delete" => (Code::Delete, "Delete"),
        "insert" => (Code::Insert, "Insert"),
        "return" | "enter" => (Code::Enter, "Return"),
        "up" => (Code::ArrowUp, "Up"),
        "down" => (Code::ArrowDown, "Down"),
        "left" => (Code::ArrowLeft, "Left"),
        "right" => (Code::ArrowRight, "Right"),
        "home" => (Code::Home, "Home"),
        "end" => (Code::End, "End"),
        "pageup" => (Code::PageUp, "PageUp"),
        "pagedown" => (Code::PageDown, "PageDown"),
        "escape" | "esc" => (Code::Escape, "Esc"),
        "volumeup" => (Code::AudioVolumeUp, "VolumeUp"),
        "volumedown" => (Code::AudioVolumeDown, "VolumeDown"),
        "volumemute" => (Code::AudioVolumeMute, "VolumeMute"),
        "medianexttrack" => (Code::MediaTrackNext, "MediaNextTrack"),
        "mediaprevioustrack" => (Code::MediaTrackPrevious, "MediaPreviousTrack"),
        "mediastop" => (Code::MediaStop, "MediaStop"),
        "mediaplaypause" => (Code::MediaPlayPause, "MediaPlayPause"),
        "printscreen" => (Code::PrintScreen, "PrintScreen"),
        "numadd" => (Code::NumpadAdd, "numadd"),
        "numsub" => (Code::NumpadSubtract, "numsub"),
        "numdec" => (Code::NumpadDecimal, "numdec"),
        "numlock" => (Code::NumLock, "numlock"),
        "-" => (Code::Minus, "-"),
        "=" => (Code::Equal, "="),
        "[" => (Code::BracketLeft, "["),
        "]" => (Code::BracketRight, "]"),
        "\\" => (Code::Backslash, "\\"),
        ";" => (Code::Semicolon, ";"),
        "'" => (Code::Quote, "'"),
        "," => (Code::Comma, ","),
        "." => (Code::Period, "."),
        "/" => (Code::Slash, "/"),
        "`" => (Code::Backquote, "`"),
        _ => return None,
    };
    Some(key)
}

fn is_function_key(code: Code) -> bool {
    matches!(
        code,
        Code::F1
            | Code::F2
            | Code::F3
            | Code::F4
            | Code::F5
            | Code::F6
            | Code::F7
            | Code::F8
            | Code::F9
            | Code::F10
            | Code::F11
            | Code::F12
    )
}

/// A validated accelerator: the shortcut to register and its canonical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accelerator {
    shortcut: Shortcut,
    canonical: String,
}

impl Accelerator {
    pub fn parse(raw: &str) -> Result<Self, AcceleratorError> {
        if raw.trim().is_empty() {
            return Err(AcceleratorError::Empty);
        }

        let mut modifiers: Vec<Modifier> = Vec::new();
        let mut flags = Modifiers::empty();
        let mut key: Option<(Code, &'static str)> = None;

        for token in raw.split('+').map(str::trim) {
            if token.is_empty() {
                return Err(AcceleratorError::EmptyToken);
            }
            let lowered = token.to_lowercase();

            if let Some(modifier) = Modifier::parse(&lowered) {
                if let Some((_, label)) = key {
                    return Err(AcceleratorError::KeyNotLast(label.to_string()));
                }
                // Aliases count as duplicates: Command and Super both press SUPER.
                if flags.intersects(modifier.flags()) {
                    return Err(AcceleratorError::DuplicateModifier(modifier.label()));
                }
                flags |= modifier.flags();
                modifiers.push(modifier);
                continue;
            }

            let Some(parsed) = parse_key(&lowered) else {
                return Err(AcceleratorError::UnknownToken(token.to_string()));
            };
            if let Some((_, previous)) = key {
                return Err(AcceleratorError::MultipleKeys(
                    parsed.1.to_string(),
                    previous.to_string(),
                ));
            }
            key = Some(parsed);
        }

        let (code, key_label) = key.ok_or(AcceleratorError::MissingKey)?;
        if modifiers.is_empty() && !is_function_key(code) {
            return Err(AcceleratorError::MissingModifier(key_label.to_string()));
        }

        let mods = if flags.is_empty() { None } else { Some(flags) };

        let canonical = modifiers
            .iter()
            .map(|m| m.label())
            .chain(std::iter::once(key_label))
            .collect::<Vec<_>>()
            .join("+");

        Ok(Self {
            shortcut: Shortcut::new(mods, code),
            canonical,
        })
    }

    pub fn shortcut(&self) -> Shortcut {
        self.shortcut
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
