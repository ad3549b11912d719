use crate::camera::domain::camera_backend::{ActiveStream, CameraBackend, CameraError};
use crate::camera::domain::device::{CameraDevice, Facing, StreamRequest};
use crate::shared::frame::Frame;

/// What a flip actually did, for status reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Switched to the next enumerated device.
    SwitchedDevice(CameraDevice),
    /// Only one device (or none enumerable): toggled the facing hint.
    ToggledFacing(Facing),
}

/// Owns acquisition, enumeration and switching of camera devices.
///
/// Holds at most one live hardware stream; any previous stream is
/// released before a new one is requested. Every successful open bumps
/// the stream generation; callers must recompute frame geometry and
/// treat detection attempts begun under an older generation as stale.
pub struct CameraManager {
    backend: Box<dyn CameraBackend>,
    stream: Option<Box<dyn ActiveStream>>,
    devices: Vec<CameraDevice>,
    device_index: usize,
    facing: Facing,
    granted: bool,
    generation: u64,
}

impl CameraManager {
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend,
            stream: None,
            devices: Vec::new(),
            device_index: 0,
            facing: Facing::Front,
            granted: false,
            generation: 0,
        }
    }

    /// Opens a stream, releasing the active one first. The release is
    /// unconditional: even if acquisition then fails, the old handle is
    /// gone and the manager is left closed.
    pub fn open(&mut self, request: &StreamRequest) -> Result<(), CameraError> {
        self.close();
        let stream = self.backend.open(request)?;
        let (w, h) = stream.native_size();
        log::info!("camera stream open, native {w}x{h}");
        self.stream = Some(stream);
        self.granted = true;
        self.generation += 1;
        Ok(())
    }

    /// Opens the platform default for the current facing mode.
    pub fn open_default(&mut self) -> Result<(), CameraError> {
        self.open(&StreamRequest::facing(self.facing))
    }

    /// Refreshes the device snapshot. Non-fatal: failure returns an
    /// empty list and logs a warning, since flipping can still fall back
    /// to facing-mode toggling.
    ///
    /// Labels are only populated once a permission grant exists, so an
    /// open is performed first if none has succeeded yet.
    pub fn enumerate(&mut self) -> &[CameraDevice] {
        if !self.granted {
            if let Err(e) = self.open_default() {
                log::warn!("could not establish camera grant for enumeration: {e}");
                self.devices.clear();
                return &self.devices;
            }
        }
        match self.backend.enumerate() {
            Ok(devices) => {
                log::debug!("enumerated {} camera device(s)", devices.len());
                self.devices = devices;
            }
            Err(e) => {
                log::warn!("could not enumerate devices: {e}");
                self.devices.clear();
            }
        }
        if self.device_index >= self.devices.len() {
            self.device_index = 0;
        }
        &self.devices
    }

    /// Switches camera: next enumerated device cyclically when more than
    /// one exists, otherwise toggles the facing hint. Many platforms
    /// expose a single device id while still honoring the hint.
    pub fn flip(&mut self) -> Result<FlipOutcome, CameraError> {
        self.enumerate();
        if self.devices.len() > 1 {
            self.device_index = (self.device_index + 1) % self.devices.len();
            let device = self.devices[self.device_index].clone();
            log::info!("switching to device {}", display_name(&device));
            self.open(&StreamRequest::device(device.id.clone()))?;
            if device.facing != Facing::Unknown {
                self.facing = device.facing;
            }
            Ok(FlipOutcome::SwitchedDevice(device))
        } else {
            self.facing = self.facing.toggled();
            log::info!("toggling facing mode to {:?}", self.facing);
            self.open(&StreamRequest::facing(self.facing))?;
            Ok(FlipOutcome::ToggledFacing(self.facing))
        }
    }

    /// Releases the active stream. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Native resolution of the active stream, if any.
    pub fn native_size(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(|s| s.native_size())
    }

    /// Next frame from the active stream. `None` while the stream warms
    /// up or when no stream is open.
    pub fn try_frame(&mut self) -> Option<Frame> {
        self.stream.as_mut().and_then(|s| s.try_frame())
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Bumped on every successful open.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn display_name(device: &CameraDevice) -> &str {
    if device.label.is_empty() {
        &device.id
    } else {
        &device.label
    }
}
