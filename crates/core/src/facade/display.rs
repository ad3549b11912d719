use std::fmt;
use std::time::{Duration, Instant};

use crate::camera::domain::device::Facing;
use crate::shared::constants::{COUNT_UP_DURATION, POPUP_FADE, POPUP_VISIBLE};
use crate::shared::profile::ClientProfile;

/// Everything the status line can say. The display string is what the
/// user sees; the variant is what the runner logs and tests assert on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    LoadingModels,
    Ready { via_fallback: bool },
    StartingCamera,
    CameraReady,
    Scanning,
    FaceDetected,
    NoFace,
    CounterReset,
    DisplayCleared,
    AutoEnabled,
    AutoDisabled,
    SwitchingCamera,
    CameraActive(Facing),
    CameraDenied,
    CameraSwitchFailed,
    ModelLoadFailed,
    DetectionFailed,
    StreamStalled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::LoadingModels => "Loading models...",
            Status::Ready { via_fallback: false } => "Ready",
            Status::Ready { via_fallback: true } => "Ready (using fallback models)",
            Status::StartingCamera => "Starting camera...",
            Status::CameraReady => "Camera ready",
            Status::Scanning => "Scanning...",
            Status::FaceDetected => "Face detected!",
            Status::NoFace => "No face detected",
            Status::CounterReset => "Counter reset",
            Status::DisplayCleared => "Display cleared",
            Status::AutoEnabled => "Auto mode enabled",
            Status::AutoDisabled => "Auto mode disabled",
            Status::SwitchingCamera => "Switching camera...",
            Status::CameraActive(Facing::Back) => "Back camera active",
            Status::CameraActive(_) => "Front camera active",
            Status::CameraDenied => "Camera access denied",
            Status::CameraSwitchFailed => "Error switching camera",
            Status::ModelLoadFailed => "Error loading models",
            Status::DetectionFailed => "Detection error",
            Status::StreamStalled => "Camera stream not ready",
        };
        f.write_str(text)
    }
}

/// Eased count-up for the total counter display.
///
/// The displayed value runs from the previous value to the target over
/// one second with ease-out-quad. Constrained profiles snap instantly.
#[derive(Debug)]
pub struct CountUp {
    from: u64,
    target: u64,
    started: Option<Instant>,
    duration: Duration,
    animate: bool,
}

impl CountUp {
    pub fn new(profile: ClientProfile) -> Self {
        Self {
            from: 0,
            target: 0,
            started: None,
            duration: COUNT_UP_DURATION,
            animate: profile.animations_enabled(),
        }
    }

    /// Starts animating from the currently displayed value to `target`.
    pub fn retarget(&mut self, target: u64, now: Instant) {
        if !self.animate {
            self.snap(target);
            return;
        }
        self.from = self.value(now);
        self.target = target;
        self.started = Some(now);
    }

    /// Jumps straight to `value` with no animation (reset path).
    pub fn snap(&mut self, value: u64) {
        self.from = value;
        self.target = value;
        self.started = None;
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// The value the counter shows at `now`.
    pub fn value(&self, now: Instant) -> u64 {
        let Some(started) = self.started else {
            return self.target;
        };
        let elapsed = now.saturating_duration_since(started);
        if elapsed >= self.duration {
            return self.target;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = progress * (2.0 - progress);
        let from = self.from as f64;
        let delta = self.target as f64 - from;
        (from + delta * eased).floor() as u64
    }
}

/// Visibility phase of the "face detected" popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupPhase {
    Hidden,
    Visible,
    Fading,
}

/// Time-indexed popup state: visible for a fixed interval after a hit,
/// then fading out, then hidden.
#[derive(Debug, Default)]
pub struct Popup {
    shown_at: Option<Instant>,
}

impl Popup {
    pub fn show(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    pub fn phase(&self, now: Instant) -> PopupPhase {
        let Some(shown_at) = self.shown_at else {
            return PopupPhase::Hidden;
        };
        let elapsed = now.saturating_duration_since(shown_at);
        if elapsed < POPUP_VISIBLE {
            PopupPhase::Visible
        } else if elapsed < POPUP_VISIBLE + POPUP_FADE {
            PopupPhase::Fading
        } else {
            PopupPhase::Hidden
        }
    }
}
