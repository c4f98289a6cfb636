use crate::analysis::classify::{self, GenderClassifier};
use crate::analysis::pitch::{autocorrelate, rms_level};
use crate::analysis::stabilize::PitchStabilizer;
use crate::types::{Gender, SessionSummary};

#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameOutcome {
    pub(crate) rms: f32,
    /// Stabilized frequency for display, `None` when no pitch was detected.
    pub(crate) display_hz: Option<f64>,
    pub(crate) label: Option<Gender>,
}

/// One capture session: owns the stabilizer, the classifier and the log of
/// stabilized frequencies. Dropped or finished as a whole, so a reset can
/// never leave partial state behind.
pub(crate) struct Session {
    sample_rate: u32,
    stabilizer: PitchStabilizer,
    classifier: GenderClassifier,
    log: Vec<f64>,
}

impl Session {
    pub(crate) fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            stabilizer: PitchStabilizer::new(),
            classifier: GenderClassifier::new(),
            log: Vec::new(),
        }
    }

    /// Run the gate → estimate → stabilize → classify pipeline over one
    /// frame. Unvoiced frames mutate nothing.
    pub(crate) fn process_frame(&mut self, frame: &[f32]) -> FrameOutcome {
        let rms = rms_level(frame);
        let Some(raw_hz) = autocorrelate(frame, self.sample_rate) else {
            return FrameOutcome {
                rms,
                display_hz: None,
                label: self.classifier.committed(),
            };
        };
        debug_assert!(raw_hz.is_finite(), "estimator produced {raw_hz}");

        let step = self.stabilizer.step(raw_hz);
        self.log.push(step.smoothed);
        let label = self
            .classifier
            .observe(step.smoothed, step.median, step.stable_len);

        FrameOutcome {
            rms,
            display_hz: Some(step.smoothed),
            label,
        }
    }

    pub(crate) fn finish(self) -> SessionSummary {
        SessionSummary {
            label: self.classifier.committed(),
            certainty: classify::certainty(&self.log),
            voiced_frames: self.log.len(),
        }
    }
}
