use std::collections::VecDeque;

const MIN_VOICE_HZ: f64 = 70.0;
const MAX_VOICE_HZ: f64 = 250.0;
const HARD_JUMP_HZ: f64 = 25.0;
const SOFT_JUMP_HZ: f64 = 15.0;
const STABLE_BAND_HZ: f64 = 20.0;

/// Per-frame output of the stabilizer. The median and the stable-window
/// occupancy are consumed by the classifier alongside the smoothed value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StabilizedFrame {
    pub(crate) smoothed: f64,
    pub(crate) median: f64,
    pub(crate) stable_len: usize,
}

/// Smooths successive raw pitch estimates: adaptive blending against the
/// last accepted value, a sliding median to reject outliers, and a ring of
/// recent stable samples averaged into the surfaced frequency.
pub(crate) struct PitchStabilizer {
    last_valid: Option<f64>,
    window: VecDeque<f64>,
    stable: VecDeque<f64>,
}

impl PitchStabilizer {
    pub(crate) const WINDOW_LEN: usize = 30;
    pub(crate) const STABLE_LEN: usize = 15;

    pub(crate) fn new() -> Self {
        Self {
            last_valid: None,
            window: VecDeque::with_capacity(Self::WINDOW_LEN),
            stable: VecDeque::with_capacity(Self::STABLE_LEN),
        }
    }

    pub(crate) fn step(&mut self, raw_hz: f64) -> StabilizedFrame {
        let mut raw = raw_hz.clamp(MIN_VOICE_HZ, MAX_VOICE_HZ);

        // Damp jumps hard, track small movement freely.
        if let Some(last) = self.last_valid {
            let diff = (raw - last).abs();
            let keep = if diff > HARD_JUMP_HZ {
                0.9
            } else if diff > SOFT_JUMP_HZ {
                0.7
            } else {
                0.5
            };
            raw = last * keep + raw * (1.0 - keep);
        }

        self.window.push_back(raw);
        if self.window.len() > Self::WINDOW_LEN {
            self.window.pop_front();
        }
        let median = window_median(&self.window);

        // Values near the median count as stable; anything else falls back
        // to the median itself for this frame.
        let valid = if (raw - median).abs() < STABLE_BAND_HZ {
            self.stable.push_back(raw);
            if self.stable.len() > Self::STABLE_LEN {
                self.stable.pop_front();
            }
            raw
        } else {
            median
        };
        self.last_valid = Some(valid);

        let smoothed = if self.stable.is_empty() {
            valid
        } else {
            self.stable.iter().sum::<f64>() / self.stable.len() as f64
        };

        StabilizedFrame {
            smoothed,
            median,
            stable_len: self.stable.len(),
        }
    }
}

fn window_median(window: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = window.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sorted[sorted.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_vocal_range() {
        let mut s = PitchStabilizer::new();
        assert_eq!(s.step(400.0).smoothed, 250.0);

        let mut s = PitchStabilizer::new();
        assert_eq!(s.step(10.0).smoothed, 70.0);
    }

    #[test]
    fn output_stays_in_range() {
        let mut s = PitchStabilizer::new();
        for raw in [400.0, 30.0, 500.0, 120.0, 0.0, 251.0] {
            let out = s.step(raw);
            assert!(out.smoothed >= 70.0 && out.smoothed <= 250.0, "{}", out.smoothed);
        }
    }

    #[test]
    fn converges_on_steady_input() {
        let mut s = PitchStabilizer::new();
        let mut out = s.step(120.0);
        for _ in 0..19 {
            out = s.step(120.0);
        }
        assert!((out.smoothed - 120.0).abs() < 1e-6);
        assert_eq!(out.stable_len, PitchStabilizer::STABLE_LEN);
        assert!((out.median - 120.0).abs() < 1e-6);
    }

    #[test]
    fn damps_a_single_octave_jump() {
        let mut s = PitchStabilizer::new();
        for _ in 0..30 {
            s.step(120.0);
        }
        // 240 Hz would be an octave error; the blend keeps 90% of the old
        // value and the stable mean barely moves.
        let out = s.step(240.0);
        assert!(out.smoothed < 125.0, "{}", out.smoothed);
    }

    #[test]
    fn sustained_outliers_snap_back_to_median() {
        let mut s = PitchStabilizer::new();
        for _ in 0..30 {
            s.step(120.0);
        }
        let mut last = s.step(250.0);
        for _ in 0..9 {
            last = s.step(250.0);
        }
        // the median holds the surfaced value near the established pitch
        assert!(last.smoothed < 130.0, "{}", last.smoothed);
        assert_eq!(last.stable_len, PitchStabilizer::STABLE_LEN);
    }
}
