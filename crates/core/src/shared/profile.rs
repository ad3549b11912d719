use std::time::Duration;

use crate::shared::constants::{
    COOLDOWN_CONSTRAINED, COOLDOWN_STANDARD, INPUT_SIZE_CONSTRAINED, INPUT_SIZE_STANDARD,
};

/// Client capability class.
///
/// Constrained clients (phones, low-power kiosks) trade detection input
/// size and cosmetic animation for responsiveness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientProfile {
    #[default]
    Standard,
    Constrained,
}

impl ClientProfile {
    pub fn cooldown(self) -> Duration {
        match self {
            ClientProfile::Standard => COOLDOWN_STANDARD,
            ClientProfile::Constrained => COOLDOWN_CONSTRAINED,
        }
    }

    pub fn detect_input_size(self) -> u32 {
        match self {
            ClientProfile::Standard => INPUT_SIZE_STANDARD,
            ClientProfile::Constrained => INPUT_SIZE_CONSTRAINED,
        }
    }

    /// Cosmetic animations (count-up easing, overlay fade) are skipped on
    /// constrained clients.
    pub fn animations_enabled(self) -> bool {
        matches!(self, ClientProfile::Standard)
    }
}
