use thiserror::Error;

use crate::camera::domain::device::{CameraDevice, StreamRequest};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CameraError {
    /// Permission denied or no device matches the selector.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    /// Hardware acquisition failed even after the previous stream was
    /// cleanly released.
    #[error("camera device is busy")]
    Busy,
    #[error("device enumeration failed: {0}")]
    Enumeration(String),
}

/// An open hardware stream. Exactly one exists at a time; the
/// `CameraManager` is its sole owner.
pub trait ActiveStream {
    /// Native capture resolution actually delivered by the hardware.
    fn native_size(&self) -> (u32, u32);

    /// The next frame, or `None` while the stream is not yet fully
    /// decoded and playable. Not-ready is a normal warmup condition,
    /// not an error.
    fn try_frame(&mut self) -> Option<Frame>;

    /// Releases the hardware handle. Called before a replacement stream
    /// is requested, and on shutdown.
    fn close(&mut self);
}

/// Domain interface to the platform's camera subsystem.
///
/// Implementations may be stateful (permission grants, device handles),
/// hence `&mut self`.
pub trait CameraBackend {
    fn open(&mut self, request: &StreamRequest) -> Result<Box<dyn ActiveStream>, CameraError>;

    /// All video input devices, in platform enumeration order. On
    /// platforms where labels require a permission grant, labels are
    /// blank until some `open` has succeeded.
    fn enumerate(&mut self) -> Result<Vec<CameraDevice>, CameraError>;
}
