use crate::palette::{Palette, PaletteColor};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreSummary {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

impl ScoreSummary {
    pub fn from_answers(answers: &[bool]) -> Self {
        let total = answers.len();
        let correct = answers.iter().filter(|answer| **answer).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Self {
            total,
            correct,
            accuracy,
        }
    }

    pub fn incorrect(&self) -> usize {
        self.total - self.correct
    }

    pub fn grade(&self) -> &'static GradeBand {
        grade_for(self.accuracy)
    }
}

#[derive(Debug, PartialEq)]
pub struct GradeBand {
    /// Lowest accuracy (inclusive) that earns this band.
    pub min_accuracy: f64,
    pub grade: &'static str,
    pub message: &'static str,
    pub color: PaletteColor,
}

const fn band(
    min_accuracy: f64,
    grade: &'static str,
    message: &'static str,
    color: PaletteColor,
) -> GradeBand {
    GradeBand {
        min_accuracy,
        grade,
        message,
        color,
    }
}

/// Ordered from the highest threshold down; the last band catches everything.
pub const GRADE_BANDS: [GradeBand; 14] = [
    band(98.0, "10", "Legendary!", Palette::HIGHLIGHT),
    band(95.0, "9 ½", "Excellent", Palette::HIGHLIGHT),
    band(90.0, "9", "Outstanding", Palette::ACCENT),
    band(85.0, "8 ½", "Very good", Palette::INFO),
    band(80.0, "8", "Good", Palette::INFO),
    band(75.0, "7 ½", "Fair", Palette::SUCCESS),
    band(70.0, "7", "More than sufficient", Palette::SUCCESS),
    band(65.0, "6 ½", "Sufficient +", Palette::SUCCESS),
    band(60.0, "6", "Sufficient", Palette::WARNING),
    band(55.0, "5 ½", "Almost sufficient", Palette::WARNING),
    band(45.0, "5", "Insufficient", Palette::WARNING),
    band(35.0, "4 ½", "Seriously insufficient", Palette::DANGER),
    band(25.0, "4", "Seriously insufficient", Palette::DANGER),
    band(0.0, "2", "Disastrous", Palette::DANGER),
];

pub fn grade_for(accuracy: f64) -> &'static GradeBand {
    GRADE_BANDS
        .iter()
        .find(|band| accuracy >= band.min_accuracy)
        .unwrap_or(&GRADE_BANDS[GRADE_BANDS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn summary_of_two_answers() {
        let summary = ScoreSummary::from_answers(&[true, false]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.accuracy, 50.0);
        assert_eq!(summary.grade().grade, "5");
    }

    #[test]
    fn empty_answers_have_zero_accuracy() {
        let summary = ScoreSummary::from_answers(&[]);
        assert_eq!(summary.accuracy, 0.0);
        assert_eq!(summary.grade().grade, "2");
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(grade_for(100.0).grade, "10");
        assert_eq!(grade_for(98.0).grade, "10");
        assert_eq!(grade_for(97.99).grade, "9 ½");
        assert_eq!(grade_for(90.0).grade, "9");
        assert_eq!(grade_for(60.0).grade, "6");
        assert_eq!(grade_for(54.9).grade, "5");
        assert_eq!(grade_for(25.0).grade, "4");
        assert_eq!(grade_for(24.9).grade, "2");
        assert_eq!(grade_for(0.0).grade, "2");
    }

    #[test]
    fn out_of_range_accuracy_lands_on_edge_bands() {
        assert_eq!(grade_for(150.0).grade, "10");
        assert_eq!(grade_for(-3.0).grade, "2");
        assert_eq!(grade_for(f64::NAN).grade, "2");
    }

    #[test]
    fn thresholds_strictly_decrease() {
        for pair in GRADE_BANDS.windows(2) {
            assert!(pair[0].min_accuracy > pair[1].min_accuracy);
        }
        assert_eq!(GRADE_BANDS[GRADE_BANDS.len() - 1].min_accuracy, 0.0);
    }

    proptest! {
        #[test]
        fn exactly_one_band_owns_each_accuracy(accuracy in 0.0f64..=100.0) {
            let owners = GRADE_BANDS
                .iter()
                .enumerate()
                .filter(|(idx, band)| {
                    let upper = idx
                        .checked_sub(1)
                        .map(|prev| GRADE_BANDS[prev].min_accuracy)
                        .unwrap_or(f64::INFINITY);
                    accuracy >= band.min_accuracy && accuracy < upper
                })
                .count();
            prop_assert_eq!(owners, 1);
        }

        #[test]
        fn grade_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(grade_for(low).min_accuracy <= grade_for(high).min_accuracy);
        }
    }
}
