use thiserror::Error;

use crate::shared::constants::DEFAULT_MIN_SCORE;
use crate::shared::frame::Frame;
use crate::shared::geometry::FaceBox;
use crate::shared::profile::ClientProfile;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("face detection model is not loaded")]
    ModelNotLoaded,
    #[error("face detection failed: {0}")]
    Inference(String),
}

/// Tuning for one detection attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectOptions {
    /// Minimum confidence for a box to count as a face.
    pub min_score: f64,
    /// Square input size the frame is resampled to before inference.
    pub input_size: u32,
}

impl DetectOptions {
    pub fn for_profile(profile: ClientProfile) -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            input_size: profile.detect_input_size(),
        }
    }
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self::for_profile(ClientProfile::Standard)
    }
}

/// Domain interface for the single-face detection capability.
///
/// Returns the best single face in the frame, or `None` when no usable
/// single face is present. Zero faces and ambiguous multi-face frames
/// are not distinguished. Implementations may be stateful, hence
/// `&mut self`.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        options: &DetectOptions,
    ) -> Result<Option<FaceBox>, DetectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DetectOptions::default();
        assert_eq!(options.min_score, 0.5);
        assert_eq!(options.input_size, 320);
    }

    #[test]
    fn test_constrained_profile_options() {
        let options = DetectOptions::for_profile(ClientProfile::Constrained);
        assert_eq!(options.min_score, 0.5);
        assert_eq!(options.input_size, 224);
    }
}
