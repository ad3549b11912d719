use crate::shared::constants::{IDEAL_CAPTURE_HEIGHT, IDEAL_CAPTURE_WIDTH};

/// Logical camera orientation hint, used when explicit device selection
/// is unavailable or exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Front,
    Back,
    Unknown,
}

impl Facing {
    /// The facing a flip falls back to when only one device is exposed.
    /// Unknown is treated as front-facing, so it flips to back.
    pub fn toggled(self) -> Facing {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front | Facing::Unknown => Facing::Back,
        }
    }
}

/// One enumerated camera. The label may be blank until a permission
/// grant has been established; the id is usable either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
    pub facing: Facing,
}

/// How to pick the device for an `open` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CameraSelector {
    /// Platform default for the given facing.
    Facing(Facing),
    /// Explicit device id from enumeration.
    DeviceId(String),
}

/// A full open request: device selection plus the preferred capture size.
/// The size is a hint; backends may deliver any native resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRequest {
    pub selector: CameraSelector,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl StreamRequest {
    pub fn facing(facing: Facing) -> Self {
        Self {
            selector: CameraSelector::Facing(facing),
            ideal_width: IDEAL_CAPTURE_WIDTH,
            ideal_height: IDEAL_CAPTURE_HEIGHT,
        }
    }

    pub fn device(id: impl Into<String>) -> Self {
        Self {
            selector: CameraSelector::DeviceId(id.into()),
            ideal_width: IDEAL_CAPTURE_WIDTH,
            ideal_height: IDEAL_CAPTURE_HEIGHT,
        }
    }
}
