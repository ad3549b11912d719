use crate::overlay::domain::overlay_surface::OverlaySurface;
use crate::shared::geometry::{DisplayBox, FaceBox, FrameGeometry};
use crate::shared::profile::ClientProfile;

/// Label drawn above a detection box.
const DETECTION_LABEL: &str = "OK";
/// Label baseline offset above the box, in display pixels.
const LABEL_OFFSET: f64 = 10.0;

/// Maps detections from native frame space into display space and keeps
/// the annotation surface sized to the displayed video box.
pub struct OverlayRenderer {
    surface: Box<dyn OverlaySurface>,
    profile: ClientProfile,
    size: Option<DisplayBox>,
}

impl OverlayRenderer {
    pub fn new(surface: Box<dyn OverlaySurface>, profile: ClientProfile) -> Self {
        Self {
            surface,
            profile,
            size: None,
        }
    }

    /// Sizes the surface to exactly the displayed box, never the
    /// stream's native resolution.
    pub fn resize(&mut self, display: DisplayBox) {
        self.surface.set_size(display.width, display.height);
        self.size = Some(display);
        log::debug!(
            "overlay resized to displayed box {}x{}",
            display.width,
            display.height
        );
    }

    /// Clears the previous annotation, then draws the detection (if any)
    /// projected into display space.
    pub fn draw(&mut self, detection: Option<&FaceBox>, geometry: &FrameGeometry) {
        self.surface.clear();
        let Some(native) = detection else {
            return;
        };
        let projected = geometry.project(native);
        self.surface.draw_box(&projected);
        self.surface
            .draw_label(DETECTION_LABEL, projected.x, projected.y - LABEL_OFFSET);
    }

    /// Clears the surface, with the cosmetic fade on standard profiles.
    pub fn clear(&mut self) {
        if self.profile.animations_enabled() {
            self.surface.fade_clear();
        } else {
            self.surface.clear();
        }
    }

    /// Last displayed box passed to `resize`.
    pub fn size(&self) -> Option<DisplayBox> {
        self.size
    }
}
