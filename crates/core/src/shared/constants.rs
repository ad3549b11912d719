use std::time::Duration;

pub const DETECTOR_MODEL_NAME: &str = "tiny_face_detector.onnx";
pub const DETECTOR_MODEL_FALLBACK_URL: &str =
    "https://github.com/presence-app/presence/releases/download/v0.1.0/tiny_face_detector.onnx";

pub const DEFAULT_MIN_SCORE: f64 = 0.5;
pub const INPUT_SIZE_STANDARD: u32 = 320;
pub const INPUT_SIZE_CONSTRAINED: u32 = 224;

/// Post-hit cooldown. Shorter on constrained clients so the auto loop
/// keeps up with slower detection there.
pub const COOLDOWN_STANDARD: Duration = Duration::from_millis(2500);
pub const COOLDOWN_CONSTRAINED: Duration = Duration::from_millis(2000);

/// Total time a scan may wait for the stream to become decodable before
/// `StreamNotReady` surfaces.
pub const STREAM_READY_LIMIT: Duration = Duration::from_secs(3);

/// Settle time after an orientation change before the overlay is resized.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);

pub const COUNT_UP_DURATION: Duration = Duration::from_millis(1000);
pub const POPUP_VISIBLE: Duration = Duration::from_millis(1500);
pub const POPUP_FADE: Duration = Duration::from_millis(500);

/// Capture size requested from camera backends; hardware may deliver less.
pub const IDEAL_CAPTURE_WIDTH: u32 = 640;
pub const IDEAL_CAPTURE_HEIGHT: u32 = 480;
