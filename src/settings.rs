use std::fmt;
use std::ops::RangeInclusive;

use clap::ValueEnum;

use crate::card::CardType;
use crate::error::QuizError;

pub const CARD_COUNT_RANGE: RangeInclusive<u8> = 3..=20;
pub const DEFAULT_CARD_COUNT: u8 = 5;
pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardTypes {
    pub true_false: bool,
    pub multiple_choice: bool,
    pub basic: bool,
}

impl Default for CardTypes {
    fn default() -> Self {
        Self {
            true_false: true,
            multiple_choice: true,
            basic: true,
        }
    }
}

impl CardTypes {
    pub fn enabled(&self) -> Vec<CardType> {
        let mut types = Vec::with_capacity(3);
        if self.true_false {
            types.push(CardType::TrueFalse);
        }
        if self.multiple_choice {
            types.push(CardType::MultipleChoice);
        }
        if self.basic {
            types.push(CardType::Basic);
        }
        types
    }

    pub fn allows(&self, card_type: CardType) -> bool {
        match card_type {
            CardType::TrueFalse => self.true_false,
            CardType::MultipleChoice => self.multiple_choice,
            CardType::Basic => self.basic,
        }
    }

    pub fn any(&self) -> bool {
        self.true_false || self.multiple_choice || self.basic
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub card_count: u8,
    pub difficulty: Difficulty,
    pub language: String,
    pub card_types: CardTypes,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            card_count: DEFAULT_CARD_COUNT,
            difficulty: Difficulty::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            card_types: CardTypes::default(),
        }
    }
}

impl Settings {
    /// Checks the request before anything is sent out.
    pub fn validate(&self) -> Result<(), QuizError> {
        if !self.card_types.any() {
            return Err(QuizError::NoCardTypeSelected);
        }
        if !CARD_COUNT_RANGE.contains(&self.card_count) {
            return Err(QuizError::CardCountOutOfRange {
                requested: self.card_count,
                min: *CARD_COUNT_RANGE.start(),
                max: *CARD_COUNT_RANGE.end(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.card_count, 5);
        assert_eq!(settings.difficulty, Difficulty::Intermediate);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_when_no_type_is_enabled() {
        let settings = Settings {
            card_types: CardTypes {
                true_false: false,
                multiple_choice: false,
                basic: false,
            },
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(QuizError::NoCardTypeSelected)
        ));
    }

    #[test]
    fn rejects_counts_outside_range() {
        for count in [0, 2, 21, 255] {
            let settings = Settings {
                card_count: count,
                ..Settings::default()
            };
            assert!(
                matches!(
                    settings.validate(),
                    Err(QuizError::CardCountOutOfRange { requested, .. }) if requested == count
                ),
                "count {count} should be rejected"
            );
        }
        for count in [3, 12, 20] {
            let settings = Settings {
                card_count: count,
                ..Settings::default()
            };
            assert!(settings.validate().is_ok());
        }
    }

    #[test]
    fn enabled_types_keep_a_stable_order() {
        let types = CardTypes {
            true_false: false,
            multiple_choice: true,
            basic: true,
        };
        assert_eq!(
            types.enabled(),
            vec![CardType::MultipleChoice, CardType::Basic]
        );
        assert!(!types.allows(CardType::TrueFalse));
    }
}
