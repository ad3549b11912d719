/// A face bounding box. Coordinates are in the space of whichever surface
/// produced or consumes it: native frame pixels out of the detector,
/// displayed-box pixels after projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The on-screen size of the video element, which rarely matches the
/// stream's native resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayBox {
    pub width: f64,
    pub height: f64,
}

/// Mapping between a stream's native resolution and its displayed size.
///
/// Recomputed after every successful camera open and whenever the display
/// box changes (resize, orientation, fullscreen). The overlay surface is
/// always sized to the display box, never the native resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    pub native_width: u32,
    pub native_height: u32,
    pub display_width: f64,
    pub display_height: f64,
}

impl FrameGeometry {
    pub fn new(native: (u32, u32), display: DisplayBox) -> Self {
        debug_assert!(
            native.0 > 0 && native.1 > 0,
            "native resolution must be nonzero"
        );
        Self {
            native_width: native.0,
            native_height: native.1,
            display_width: display.width,
            display_height: display.height,
        }
    }

    pub fn display_box(&self) -> DisplayBox {
        DisplayBox {
            width: self.display_width,
            height: self.display_height,
        }
    }

    pub fn scale_x(&self) -> f64 {
        self.display_width / self.native_width as f64
    }

    pub fn scale_y(&self) -> f64 {
        self.display_height / self.native_height as f64
    }

    /// Projects a native-space box into displayed-box space.
    pub fn project(&self, native: &FaceBox) -> FaceBox {
        FaceBox {
            x: native.x * self.scale_x(),
            y: native.y * self.scale_y(),
            width: native.width * self.scale_x(),
            height: native.height * self.scale_y(),
        }
    }
}
