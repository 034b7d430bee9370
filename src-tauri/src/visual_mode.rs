//! Rendering mode of the fluid animation surface.

use serde::{Deserialize, Serialize};

/// - `Default`: pointer and touch input drive the fluid.
/// - `Auto`: random automated movement, input ignored.
/// - `BlackMirror`: static black screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualMode {
    #[default]
    Default,
    Auto,
    BlackMirror,
}

impl VisualMode {
    pub const ALL: [VisualMode; 3] = [Self::Default, Self::Auto, Self::BlackMirror];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Auto => "auto",
            Self::BlackMirror => "blackmirror",
        }
    }

    pub fn menu_label(&self) -> &'static str {
        match self {
            Self::Default => "Default Mode",
            Self::Auto => "Auto Mode",
            Self::BlackMirror => "Black Mirror Mode",
        }
    }
}

/// Read/write access to the process-wide visual mode.
pub trait VisualModeStore {
    fn visual_mode(&self) -> VisualMode;
    fn set_visual_mode(&mut self, mode: VisualMode);
}
