use crate::detection::domain::face_detector::{DetectOptions, DetectionError, FaceDetector};
use crate::shared::frame::Frame;
use crate::shared::geometry::FaceBox;

/// What a scripted detector reports for one attempt.
#[derive(Clone, Debug)]
pub enum ScriptedResult {
    Face(FaceBox),
    NoFace,
    Failure,
}

/// Detector that replays a fixed script of results, cycling when the
/// script is exhausted. Stands in for the real capability in the
/// headless runner and in tests.
pub struct ScriptedDetector {
    script: Vec<ScriptedResult>,
    calls: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<ScriptedResult>) -> Self {
        debug_assert!(!script.is_empty(), "script must not be empty");
        Self { script, calls: 0 }
    }

    /// A face on every `period`-th attempt, misses otherwise. The box is
    /// centered in a 640x480 native frame.
    pub fn periodic(period: usize) -> Self {
        let period = period.max(1);
        let mut script = vec![ScriptedResult::NoFace; period - 1];
        script.push(ScriptedResult::Face(FaceBox {
            x: 220.0,
            y: 140.0,
            width: 200.0,
            height: 200.0,
        }));
        Self::new(script)
    }

    /// Number of detection attempts performed so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(
        &mut self,
        _frame: &Frame,
        _options: &DetectOptions,
    ) -> Result<Option<FaceBox>, DetectionError> {
        let result = self.script[self.calls % self.script.len()].clone();
        self.calls += 1;
        match result {
            ScriptedResult::Face(face) => Ok(Some(face)),
            ScriptedResult::NoFace => Ok(None),
            ScriptedResult::Failure => Err(DetectionError::ModelNotLoaded),
        }
    }
}
