use crate::camera::domain::camera_backend::{ActiveStream, CameraBackend, CameraError};
use crate::camera::domain::device::{CameraDevice, CameraSelector, Facing, StreamRequest};
use crate::shared::frame::Frame;

/// Description of one simulated device.
#[derive(Clone, Debug)]
pub struct SyntheticDevice {
    pub id: String,
    pub label: String,
    pub facing: Facing,
    pub native: (u32, u32),
    /// Frames the stream reports not-ready before the first real frame,
    /// simulating decoder warmup.
    pub warmup_frames: u32,
}

impl SyntheticDevice {
    pub fn new(id: impl Into<String>, facing: Facing) -> Self {
        let id = id.into();
        Self {
            label: format!("Synthetic {id}"),
            id,
            facing,
            native: (640, 480),
            warmup_frames: 0,
        }
    }

    pub fn with_native(mut self, width: u32, height: u32) -> Self {
        self.native = (width, height);
        self
    }

    pub fn with_warmup(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }
}

/// Software camera backend for the headless runner and tests.
///
/// Mimics the platform quirks the manager has to cope with: device
/// labels stay blank until a permission grant (the first successful
/// open), a busy flag makes acquisition fail after release, and streams
/// warm up before delivering frames.
pub struct SyntheticCamera {
    devices: Vec<SyntheticDevice>,
    granted: bool,
    busy: bool,
}

impl SyntheticCamera {
    pub fn new(devices: Vec<SyntheticDevice>) -> Self {
        Self {
            devices,
            granted: false,
            busy: false,
        }
    }

    /// Single front-facing 640x480 device, the common laptop case.
    pub fn single_front() -> Self {
        Self::new(vec![SyntheticDevice::new("synthetic-0", Facing::Front)])
    }

    /// When set, every open fails with `DeviceBusy`.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn pick(&self, selector: &CameraSelector) -> Option<&SyntheticDevice> {
        match selector {
            CameraSelector::DeviceId(id) => self.devices.iter().find(|d| &d.id == id),
            // Facing is a hint: prefer an exact match, fall back to any
            // device at all.
            CameraSelector::Facing(facing) => self
                .devices
                .iter()
                .find(|d| d.facing == *facing)
                .or_else(|| self.devices.first()),
        }
    }
}

impl CameraBackend for SyntheticCamera {
    fn open(&mut self, request: &StreamRequest) -> Result<Box<dyn ActiveStream>, CameraError> {
        let device = self
            .pick(&request.selector)
            .ok_or_else(|| CameraError::Unavailable(selector_text(&request.selector)))?;
        let native = device.native;
        let warmup = device.warmup_frames;
        if self.busy {
            return Err(CameraError::Busy);
        }
        self.granted = true;
        Ok(Box::new(SyntheticStream {
            native,
            warmup_remaining: warmup,
            next_index: 0,
            open: true,
        }))
    }

    fn enumerate(&mut self) -> Result<Vec<CameraDevice>, CameraError> {
        let granted = self.granted;
        Ok(self
            .devices
            .iter()
            .map(|d| CameraDevice {
                id: d.id.clone(),
                label: if granted { d.label.clone() } else { String::new() },
                facing: d.facing,
            })
            .collect())
    }
}

struct SyntheticStream {
    native: (u32, u32),
    warmup_remaining: u32,
    next_index: u64,
    open: bool,
}

impl ActiveStream for SyntheticStream {
    fn native_size(&self) -> (u32, u32) {
        self.native
    }

    fn try_frame(&mut self) -> Option<Frame> {
        if !self.open {
            return None;
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return None;
        }
        // Flat mid-gray content; detection capability fakes decide what
        // they "see" independently of pixel data.
        let frame = Frame::solid(self.native.0, self.native.1, 96, self.next_index);
        self.next_index += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.open = false;
    }
}

fn selector_text(selector: &CameraSelector) -> String {
    match selector {
        CameraSelector::Facing(facing) => format!("no device for facing {facing:?}"),
        CameraSelector::DeviceId(id) => format!("no device with id {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_by_id_and_by_facing() {
        let mut camera = SyntheticCamera::new(vec![
            SyntheticDevice::new("front", Facing::Front),
            SyntheticDevice::new("back", Facing::Back).with_native(1280, 720),
        ]);
        let stream = camera.open(&StreamRequest::device("back")).unwrap();
        assert_eq!(stream.native_size(), (1280, 720));

        let stream = camera
            .open(&StreamRequest::facing(Facing::Front))
            .unwrap();
        assert_eq!(stream.native_size(), (640, 480));
    }

    #[test]
    fn test_facing_falls_back_to_any_device() {
        let mut camera = SyntheticCamera::new(vec![SyntheticDevice::new("only", Facing::Front)]);
        assert!(camera.open(&StreamRequest::facing(Facing::Back)).is_ok());
    }

    #[test]
    fn test_unknown_device_id_is_unavailable() {
        let mut camera = SyntheticCamera::single_front();
        assert!(matches!(
            camera.open(&StreamRequest::device("nope")),
            Err(CameraError::Unavailable(_))
        ));
    }

    #[test]
    fn test_no_devices_is_unavailable() {
        let mut camera = SyntheticCamera::new(vec![]);
        assert!(matches!(
            camera.open(&StreamRequest::facing(Facing::Front)),
            Err(CameraError::Unavailable(_))
        ));
    }

    #[test]
    fn test_busy_open_fails() {
        let mut camera = SyntheticCamera::single_front();
        camera.set_busy(true);
        assert!(matches!(
            camera.open(&StreamRequest::facing(Facing::Front)),
            Err(CameraError::Busy)
        ));
    }

    #[test]
    fn test_labels_blank_until_grant() {
        let mut camera = SyntheticCamera::single_front();
        let before = camera.enumerate().unwrap();
        assert_eq!(before[0].label, "");
        assert_eq!(before[0].id, "synthetic-0");

        camera.open(&StreamRequest::facing(Facing::Front)).unwrap();
        let after = camera.enumerate().unwrap();
        assert_eq!(after[0].label, "Synthetic synthetic-0");
    }

    #[test]
    fn test_warmup_then_frames() {
        let mut camera = SyntheticCamera::new(vec![
            SyntheticDevice::new("warm", Facing::Front).with_warmup(2),
        ]);
        let mut stream = camera.open(&StreamRequest::device("warm")).unwrap();
        assert!(stream.try_frame().is_none());
        assert!(stream.try_frame().is_none());
        let frame = stream.try_frame().unwrap();
        assert_eq!(frame.index(), 0);
        assert_eq!(stream.try_frame().unwrap().index(), 1);
    }

    #[test]
    fn test_closed_stream_stops_producing() {
        let mut camera = SyntheticCamera::single_front();
        let mut stream = camera.open(&StreamRequest::device("synthetic-0")).unwrap();
        assert!(stream.try_frame().is_some());
        stream.close();
        assert!(stream.try_frame().is_none());
    }
}
