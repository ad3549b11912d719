use std::time::Instant;

use crate::camera::domain::camera_backend::{CameraBackend, CameraError};
use crate::camera::manager::{CameraManager, FlipOutcome};
use crate::detection::domain::face_detector::{DetectOptions, FaceDetector};
use crate::facade::display::{CountUp, Popup, PopupPhase, Status};
use crate::overlay::debounce::ResizeDebouncer;
use crate::overlay::domain::overlay_surface::OverlaySurface;
use crate::overlay::renderer::OverlayRenderer;
use crate::scan::controller::{
    AttemptOutcome, DeferOutcome, Directive, ScanConfig, ScanController, ScanError,
};
use crate::scan::session::Session;
use crate::shared::geometry::{DisplayBox, FrameGeometry};
use crate::shared::profile::ClientProfile;

/// What one tick of the session did, for the runner's bookkeeping.
#[derive(Debug)]
pub enum TickEvent {
    /// Nothing to do, or a stale result was dropped.
    None,
    /// Armed, but the stream was not ready; retrying next tick.
    Deferred,
    Hit {
        total: u64,
    },
    Miss,
    /// Scanning halted; the machine is idle with auto disabled.
    Halted(ScanError),
}

/// Wires UI intents to the camera, scan and overlay components and owns
/// the visible counters. Intentionally thin: delegation plus display
/// formatting, no business logic of its own.
pub struct SessionFacade {
    camera: CameraManager,
    controller: ScanController,
    overlay: OverlayRenderer,
    detector: Box<dyn FaceDetector>,
    options: DetectOptions,
    counter: CountUp,
    popup: Popup,
    status: Status,
    debounce: ResizeDebouncer,
    display_box: DisplayBox,
    geometry: Option<FrameGeometry>,
}

impl SessionFacade {
    pub fn new(
        backend: Box<dyn CameraBackend>,
        detector: Box<dyn FaceDetector>,
        surface: Box<dyn OverlaySurface>,
        profile: ClientProfile,
        scan_config: ScanConfig,
    ) -> Self {
        Self {
            camera: CameraManager::new(backend),
            controller: ScanController::new(scan_config),
            overlay: OverlayRenderer::new(surface, profile),
            detector,
            options: DetectOptions::for_profile(profile),
            counter: CountUp::new(profile),
            popup: Popup::default(),
            status: Status::LoadingModels,
            debounce: ResizeDebouncer::default(),
            display_box: DisplayBox {
                width: 640.0,
                height: 480.0,
            },
            geometry: None,
        }
    }

    /// Opens the default camera and sizes the overlay to the given
    /// displayed box. Also warms the device snapshot so the first flip
    /// has labels to work with.
    pub fn start_camera(&mut self, display: DisplayBox) -> Result<(), CameraError> {
        self.status = Status::StartingCamera;
        if let Err(e) = self.camera.open_default() {
            self.status = Status::CameraDenied;
            log::error!("camera acquisition failed: {e}");
            return Err(e);
        }
        self.controller.on_stream_changed();
        self.display_box = display;
        self.refresh_geometry();
        self.overlay.resize(display);
        self.camera.enumerate();
        self.status = Status::CameraReady;
        Ok(())
    }

    /// The "Scan" intent: one detection attempt.
    pub fn start(&mut self) {
        if self.controller.start_once() {
            self.status = Status::Scanning;
        }
    }

    /// The "Auto" intent. Returns the new auto state.
    pub fn toggle_auto(&mut self) -> bool {
        let enabled = !self.controller.session().auto_enabled;
        self.controller.set_auto(enabled);
        self.status = if enabled {
            Status::AutoEnabled
        } else {
            Status::AutoDisabled
        };
        enabled
    }

    /// The "Reset" intent: zero the counters and the counter display.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.counter.snap(0);
        self.status = Status::CounterReset;
    }

    /// The "Clear" intent: wipe the overlay and the last-detection
    /// display without touching the cumulative total.
    pub fn clear(&mut self) {
        self.overlay.clear();
        self.controller.clear_last();
        self.status = Status::DisplayCleared;
    }

    /// The "Flip" intent: switch camera, then re-sync the overlay to
    /// the (possibly changed) frame geometry.
    pub fn flip(&mut self) -> Result<FlipOutcome, CameraError> {
        self.status = Status::SwitchingCamera;
        match self.camera.flip() {
            Ok(outcome) => {
                self.controller.on_stream_changed();
                self.refresh_geometry();
                self.overlay.resize(self.display_box);
                self.status = Status::CameraActive(self.camera.facing());
                Ok(outcome)
            }
            Err(e) => {
                self.status = Status::CameraSwitchFailed;
                log::error!("camera switch failed: {e}");
                Err(e)
            }
        }
    }

    /// The displayed video box changed (window resize or fullscreen
    /// toggle): resize the overlay immediately.
    pub fn viewport_resized(&mut self, display: DisplayBox) {
        self.display_box = display;
        self.refresh_geometry();
        self.overlay.resize(display);
    }

    /// Orientation changed: the resize is applied after a settle delay.
    pub fn orientation_changed(&mut self, display: DisplayBox, now: Instant) {
        self.display_box = display;
        self.debounce.request(now);
    }

    /// One turn of the cooperative loop: applies any due debounced
    /// resize, then re-evaluates the scan state machine once.
    pub fn tick(&mut self, now: Instant) -> TickEvent {
        if self.debounce.poll(now) {
            self.refresh_geometry();
            self.overlay.resize(self.display_box);
        }

        if self.controller.poll(now) != Directive::Attempt {
            return TickEvent::None;
        }
        let Some(token) = self.controller.begin_attempt() else {
            return TickEvent::None;
        };

        let Some(frame) = self.camera.try_frame() else {
            return match self.controller.frame_not_ready(token, now) {
                DeferOutcome::Retry => TickEvent::Deferred,
                DeferOutcome::Halted(e) => {
                    self.status = Status::StreamStalled;
                    log::error!("scanning halted: {e}");
                    TickEvent::Halted(e)
                }
            };
        };

        self.status = Status::Scanning;
        let result = self.detector.detect(&frame, &self.options);
        match self.controller.complete_attempt(token, result, now) {
            AttemptOutcome::Hit { detection } => {
                if let Some(geometry) = self.geometry {
                    self.overlay.draw(Some(&detection), &geometry);
                }
                let total = self.controller.session().total_count();
                self.counter.retarget(total, now);
                self.popup.show(now);
                self.status = Status::FaceDetected;
                TickEvent::Hit { total }
            }
            AttemptOutcome::Miss => {
                if let Some(geometry) = self.geometry {
                    self.overlay.draw(None, &geometry);
                }
                self.status = Status::NoFace;
                TickEvent::Miss
            }
            AttemptOutcome::Stale => TickEvent::None,
            AttemptOutcome::Halted(e) => {
                self.status = Status::DetectionFailed;
                log::error!("detection attempt failed: {e}");
                TickEvent::Halted(e)
            }
        }
    }

    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The eased value the total counter shows at `now`.
    pub fn displayed_total(&self, now: Instant) -> u64 {
        self.counter.value(now)
    }

    pub fn popup_phase(&self, now: Instant) -> PopupPhase {
        self.popup.phase(now)
    }

    pub fn geometry(&self) -> Option<FrameGeometry> {
        self.geometry
    }

    pub fn close(&mut self) {
        self.camera.close();
    }

    fn refresh_geometry(&mut self) {
        self.geometry = self
            .camera
            .native_size()
            .map(|native| FrameGeometry::new(native, self.display_box));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::camera::domain::device::Facing;
    use crate::camera::infrastructure::synthetic_camera::{SyntheticCamera, SyntheticDevice};
    use crate::detection::infrastructure::scripted_detector::{ScriptedDetector, ScriptedResult};
    use crate::scan::session::ScanMode;
    use crate::shared::geometry::FaceBox;

    const COOLDOWN: Duration = Duration::from_millis(2500);

    #[derive(Clone, Debug, PartialEq)]
    enum Op {
        SetSize(f64, f64),
        Box(FaceBox),
        Label(String),
        Clear,
    }

    #[derive(Clone, Default)]
    struct RecordingSurface {
        ops: Rc<RefCell<Vec<Op>>>,
    }

    impl OverlaySurface for RecordingSurface {
        fn set_size(&mut self, width: f64, height: f64) {
            self.ops.borrow_mut().push(Op::SetSize(width, height));
        }
        fn draw_box(&mut self, rect: &FaceBox) {
            self.ops.borrow_mut().push(Op::Box(*rect));
        }
        fn draw_label(&mut self, text: &str, _x: f64, _y: f64) {
            self.ops.borrow_mut().push(Op::Label(text.to_string()));
        }
        fn clear(&mut self) {
            self.ops.borrow_mut().push(Op::Clear);
        }
    }

    fn display() -> DisplayBox {
        DisplayBox {
            width: 320.0,
            height: 240.0,
        }
    }

    fn centered_face() -> FaceBox {
        FaceBox {
            x: 100.0,
            y: 100.0,
            width: 50.0,
            height: 50.0,
        }
    }

    fn facade_with(script: Vec<ScriptedResult>) -> (SessionFacade, Rc<RefCell<Vec<Op>>>) {
        let surface = RecordingSurface::default();
        let ops = surface.ops.clone();
        let facade = SessionFacade::new(
            Box::new(SyntheticCamera::new(vec![
                SyntheticDevice::new("cam-0", Facing::Front),
            ])),
            Box::new(ScriptedDetector::new(script)),
            Box::new(surface),
            ClientProfile::Standard,
            ScanConfig::default(),
        );
        (facade, ops)
    }

    #[test]
    fn test_start_camera_sets_geometry_and_overlay_size() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::NoFace]);
        facade.start_camera(display()).unwrap();
        assert_eq!(facade.status(), Status::CameraReady);
        let geometry = facade.geometry().unwrap();
        assert_eq!(geometry.native_width, 640);
        assert_eq!(geometry.display_width, 320.0);
        assert!(ops.borrow().contains(&Op::SetSize(320.0, 240.0)));
    }

    #[test]
    fn test_hit_draws_scaled_box_counts_and_pops() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::Face(centered_face())]);
        facade.start_camera(display()).unwrap();
        let now = Instant::now();
        facade.start();
        let event = facade.tick(now);

        assert!(matches!(event, TickEvent::Hit { total: 1 }));
        assert_eq!(facade.session().total_count(), 1);
        assert_eq!(facade.session().last_detection(), 1);
        assert_eq!(facade.status(), Status::FaceDetected);
        assert_eq!(facade.popup_phase(now), PopupPhase::Visible);
        // Native {100,100,50,50} in 640x480 lands at {50,50,25,25} on a
        // 320x240 displayed box.
        assert!(ops.borrow().contains(&Op::Box(FaceBox {
            x: 50.0,
            y: 50.0,
            width: 25.0,
            height: 25.0
        })));
        assert!(ops.borrow().contains(&Op::Label("OK".to_string())));
    }

    #[test]
    fn test_counter_eases_up_after_hit() {
        let (mut facade, _) = facade_with(vec![ScriptedResult::Face(centered_face())]);
        facade.start_camera(display()).unwrap();
        let now = Instant::now();
        facade.start();
        facade.tick(now);

        assert_eq!(facade.displayed_total(now), 0);
        assert_eq!(facade.displayed_total(now + Duration::from_millis(1000)), 1);
    }

    #[test]
    fn test_miss_clears_overlay_and_goes_idle() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::NoFace]);
        facade.start_camera(display()).unwrap();
        facade.start();
        let event = facade.tick(Instant::now());

        assert!(matches!(event, TickEvent::Miss));
        assert_eq!(facade.status(), Status::NoFace);
        assert_eq!(facade.session().mode, ScanMode::Idle);
        assert_eq!(*ops.borrow().last().unwrap(), Op::Clear);
    }

    #[test]
    fn test_auto_loop_scans_until_hit_then_cools_down() {
        let (mut facade, _) = facade_with(vec![
            ScriptedResult::NoFace,
            ScriptedResult::NoFace,
            ScriptedResult::Face(centered_face()),
        ]);
        facade.start_camera(display()).unwrap();
        let t0 = Instant::now();
        assert!(facade.toggle_auto());

        assert!(matches!(facade.tick(t0), TickEvent::Miss));
        assert!(matches!(
            facade.tick(t0 + Duration::from_millis(16)),
            TickEvent::Miss
        ));
        assert!(matches!(
            facade.tick(t0 + Duration::from_millis(32)),
            TickEvent::Hit { total: 1 }
        ));

        // Cooldown: nothing for D, then the loop re-arms by itself.
        let hit_at = t0 + Duration::from_millis(32);
        assert!(matches!(
            facade.tick(hit_at + COOLDOWN - Duration::from_millis(1)),
            TickEvent::None
        ));
        assert!(matches!(
            facade.tick(hit_at + COOLDOWN),
            TickEvent::Miss
        ));
    }

    #[test]
    fn test_reset_zeroes_displayed_total() {
        let (mut facade, _) = facade_with(vec![ScriptedResult::Face(centered_face())]);
        facade.start_camera(display()).unwrap();
        let now = Instant::now();
        facade.start();
        facade.tick(now);
        facade.reset();

        assert_eq!(facade.session().total_count(), 0);
        assert_eq!(facade.displayed_total(now + Duration::from_secs(2)), 0);
        assert_eq!(facade.status(), Status::CounterReset);
    }

    #[test]
    fn test_clear_keeps_total() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::Face(centered_face())]);
        facade.start_camera(display()).unwrap();
        facade.start();
        facade.tick(Instant::now());

        facade.clear();
        assert_eq!(facade.session().total_count(), 1);
        assert_eq!(facade.session().last_detection(), 0);
        assert_eq!(facade.status(), Status::DisplayCleared);
        assert_eq!(*ops.borrow().last().unwrap(), Op::Clear);
    }

    #[test]
    fn test_flip_single_device_toggles_facing_and_resizes() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::NoFace]);
        facade.start_camera(display()).unwrap();

        let outcome = facade.flip().unwrap();
        assert_eq!(outcome, FlipOutcome::ToggledFacing(Facing::Back));
        assert_eq!(facade.status(), Status::CameraActive(Facing::Back));

        let outcome = facade.flip().unwrap();
        assert_eq!(outcome, FlipOutcome::ToggledFacing(Facing::Front));
        assert_eq!(facade.status(), Status::CameraActive(Facing::Front));
        // Overlay was re-sized to the displayed box after each switch.
        let sizes = ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::SetSize(..)))
            .count();
        assert_eq!(sizes, 3);
    }

    #[test]
    fn test_detection_failure_halts_and_disables_auto() {
        let (mut facade, _) = facade_with(vec![ScriptedResult::Failure]);
        facade.start_camera(display()).unwrap();
        facade.toggle_auto();
        let event = facade.tick(Instant::now());

        assert!(matches!(
            event,
            TickEvent::Halted(ScanError::DetectionUnavailable(_))
        ));
        assert_eq!(facade.status(), Status::DetectionFailed);
        assert_eq!(facade.session().mode, ScanMode::Idle);
        assert!(!facade.session().auto_enabled);
    }

    #[test]
    fn test_warmup_defers_then_halts_when_never_ready() {
        let surface = RecordingSurface::default();
        let mut facade = SessionFacade::new(
            Box::new(SyntheticCamera::new(vec![
                SyntheticDevice::new("cam-0", Facing::Front).with_warmup(u32::MAX),
            ])),
            Box::new(ScriptedDetector::new(vec![ScriptedResult::NoFace])),
            Box::new(surface),
            ClientProfile::Standard,
            ScanConfig {
                cooldown: COOLDOWN,
                defer_limit: Duration::from_millis(100),
            },
        );
        facade.start_camera(display()).unwrap();
        let t0 = Instant::now();
        facade.start();

        assert!(matches!(facade.tick(t0), TickEvent::Deferred));
        let event = facade.tick(t0 + Duration::from_millis(100));
        assert!(matches!(
            event,
            TickEvent::Halted(ScanError::StreamNotReady(_))
        ));
        assert_eq!(facade.status(), Status::StreamStalled);
    }

    #[test]
    fn test_orientation_change_resizes_after_settle_delay() {
        let (mut facade, ops) = facade_with(vec![ScriptedResult::NoFace]);
        facade.start_camera(display()).unwrap();
        let t0 = Instant::now();

        facade.orientation_changed(
            DisplayBox {
                width: 240.0,
                height: 320.0,
            },
            t0,
        );
        facade.tick(t0 + Duration::from_millis(100));
        assert!(!ops.borrow().contains(&Op::SetSize(240.0, 320.0)));

        facade.tick(t0 + Duration::from_millis(300));
        assert!(ops.borrow().contains(&Op::SetSize(240.0, 320.0)));
        let geometry = facade.geometry().unwrap();
        assert_eq!(geometry.display_width, 240.0);
    }
}
