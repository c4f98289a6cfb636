use crate::types::Gender;

/// Frequencies below this sit in the typical male register.
pub(crate) const REGISTER_SPLIT_HZ: f64 = 155.0;
const SWITCH_STREAK: u32 = 15;
const INITIAL_STABLE_LEN: usize = 10;

pub(crate) const NO_DATA_CERTAINTY: u8 = 50;
const MIN_CERTAINTY: f64 = 60.0;
const MAX_CERTAINTY: f64 = 99.0;

/// Hysteresis state machine over stabilized frequencies. The committed
/// label only flips after a full streak of opposite-side frames, and only
/// when the sliding median agrees at that moment.
pub(crate) struct GenderClassifier {
    committed: Option<Gender>,
    male_streak: u32,
    female_streak: u32,
}

impl GenderClassifier {
    pub(crate) fn new() -> Self {
        Self {
            committed: None,
            male_streak: 0,
            female_streak: 0,
        }
    }

    pub(crate) fn committed(&self) -> Option<Gender> {
        self.committed
    }

    pub(crate) fn observe(
        &mut self,
        smoothed_hz: f64,
        median_hz: f64,
        stable_len: usize,
    ) -> Option<Gender> {
        if smoothed_hz < REGISTER_SPLIT_HZ {
            self.male_streak += 1;
            self.female_streak = 0;
        } else {
            self.female_streak += 1;
            self.male_streak = 0;
        }

        if self.male_streak >= SWITCH_STREAK && self.committed != Some(Gender::Male) {
            if median_hz < REGISTER_SPLIT_HZ {
                self.committed = Some(Gender::Male);
            }
        } else if self.female_streak >= SWITCH_STREAK && self.committed != Some(Gender::Female) {
            if median_hz >= REGISTER_SPLIT_HZ {
                self.committed = Some(Gender::Female);
            }
        } else if self.committed.is_none() && stable_len >= INITIAL_STABLE_LEN {
            // Fast first decision once enough stable samples exist; the
            // streak rule governs any later reversal.
            self.committed = Some(if smoothed_hz < REGISTER_SPLIT_HZ {
                Gender::Male
            } else {
                Gender::Female
            });
        }

        self.committed
    }
}

/// Confidence score for a finished session, from the class-majority ratio
/// scaled by how consistent the frequency log was.
pub(crate) fn certainty(samples: &[f64]) -> u8 {
    if samples.is_empty() {
        return NO_DATA_CERTAINTY;
    }

    let total = samples.len() as f64;
    let male = samples.iter().filter(|&&hz| hz < REGISTER_SPLIT_HZ).count();
    let max_count = male.max(samples.len() - male) as f64;
    let base = max_count / total * 100.0;

    let mean = samples.iter().sum::<f64>() / total;
    let variance = samples.iter().map(|hz| (hz - mean).powi(2)).sum::<f64>() / total;
    let consistency = (1.0 - variance.sqrt() / 50.0).max(0.0);

    let score = base * (0.7 + 0.3 * consistency);
    score.round().max(MIN_CERTAINTY).min(MAX_CERTAINTY) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed_male() -> GenderClassifier {
        let mut c = GenderClassifier::new();
        for i in 0..INITIAL_STABLE_LEN {
            c.observe(120.0, 120.0, i + 1);
        }
        assert_eq!(c.committed(), Some(Gender::Male));
        c
    }

    #[test]
    fn unset_until_stable_window_fills() {
        let mut c = GenderClassifier::new();
        for i in 0..9 {
            assert_eq!(c.observe(120.0, 120.0, i + 1), None);
        }
        assert_eq!(c.observe(120.0, 120.0, 10), Some(Gender::Male));
    }

    #[test]
    fn initial_commit_picks_female_side() {
        let mut c = GenderClassifier::new();
        for i in 0..10 {
            c.observe(200.0, 200.0, i + 1);
        }
        assert_eq!(c.committed(), Some(Gender::Female));
    }

    #[test]
    fn committed_label_survives_short_streaks() {
        let mut c = committed_male();
        for _ in 0..14 {
            assert_eq!(c.observe(200.0, 200.0, 15), Some(Gender::Male));
        }
        // 15th consecutive opposite frame with an agreeing median flips it
        assert_eq!(c.observe(200.0, 200.0, 15), Some(Gender::Female));
    }

    #[test]
    fn streak_resets_on_opposite_frame() {
        let mut c = committed_male();
        for _ in 0..14 {
            c.observe(200.0, 200.0, 15);
        }
        c.observe(120.0, 120.0, 15);
        for _ in 0..14 {
            assert_eq!(c.observe(200.0, 200.0, 15), Some(Gender::Male));
        }
    }

    #[test]
    fn disagreeing_median_blocks_the_switch() {
        let mut c = committed_male();
        for _ in 0..30 {
            // per-frame side says female, but the median still sits low
            assert_eq!(c.observe(200.0, 130.0, 15), Some(Gender::Male));
        }
    }

    #[test]
    fn empty_log_yields_no_data_sentinel() {
        assert_eq!(certainty(&[]), 50);
    }

    #[test]
    fn uniform_log_caps_at_99() {
        assert_eq!(certainty(&vec![120.0; 40]), 99);
    }

    #[test]
    fn scattered_log_floors_at_60() {
        let log: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 220.0 })
            .collect();
        assert_eq!(certainty(&log), 60);
    }

    #[test]
    fn mild_spread_lands_between_the_clamps() {
        let mut log = vec![120.0; 35];
        log.extend(vec![130.0; 5]);
        assert_eq!(certainty(&log), 98);
    }
}
