//! State of the card currently on screen.
//!
//! A `CardSubState` belongs to exactly one card index. The controller builds a
//! fresh one whenever the index changes, so nothing (selection, reveal,
//! submission) carries over to the next card.

use std::time::{Duration, Instant};

use crate::card::Card;

/// Delay between picking an option and the card turning over.
pub const FLIP_DELAY: Duration = Duration::from_millis(800);

pub const NO_EXPLANATION: &str = "No detailed explanation available.";

/// Exact, case-sensitive comparison against the card's answer. No trimming.
pub fn judge_choice(card: &Card, selected: &str) -> bool {
    selected == card.correct_answer()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Neutral,
    Correct,
    Wrong,
    Dimmed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardSubState {
    is_flipped: bool,
    has_answered: bool,
    selected_option: Option<String>,
    verdict: Option<bool>,
    selected_at: Option<Instant>,
    submitted: bool,
}

impl CardSubState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn has_answered(&self) -> bool {
        self.has_answered
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Locks in an option on a choice card. The verdict is settled here, not
    /// when the card flips. Returns false when the pick was ignored.
    pub fn select(&mut self, card: &Card, option: &str, now: Instant) -> bool {
        if self.has_answered {
            return false;
        }
        let Some(choices) = card.choices() else {
            return false;
        };
        if !choices.contains(&option) {
            return false;
        }
        self.selected_option = Some(option.to_string());
        self.verdict = Some(judge_choice(card, option));
        self.has_answered = true;
        self.selected_at = Some(now);
        true
    }

    /// Flips a choice card once `FLIP_DELAY` has passed since the pick.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.is_flipped {
            return false;
        }
        match self.selected_at {
            Some(at) if now.saturating_duration_since(at) >= FLIP_DELAY => {
                self.is_flipped = true;
                true
            }
            _ => false,
        }
    }

    /// Shows the answer face. Open cards flip on request; choice cards only
    /// after an option was picked (skipping the remaining delay).
    pub fn reveal(&mut self, card: &Card) -> bool {
        if self.is_flipped {
            return false;
        }
        if card.is_choice() && !self.has_answered {
            return false;
        }
        self.is_flipped = true;
        true
    }

    /// Hands out the verdict of a choice card for submission, once, after the
    /// card has flipped.
    pub fn take_choice_verdict(&mut self, card: &Card) -> Option<bool> {
        if !card.is_choice() || !self.is_flipped || self.submitted {
            return None;
        }
        let verdict = self.verdict?;
        self.submitted = true;
        Some(verdict)
    }

    /// Records the user's own judgement on an open card. Needs the answer to
    /// be visible and is accepted once.
    pub fn self_grade(&mut self, card: &Card, knew_it: bool) -> Option<bool> {
        if card.is_choice() || !self.is_flipped || self.submitted {
            return None;
        }
        self.has_answered = true;
        self.verdict = Some(knew_it);
        self.submitted = true;
        Some(knew_it)
    }

    pub fn option_mark(&self, card: &Card, option: &str) -> OptionMark {
        if !self.has_answered {
            return OptionMark::Neutral;
        }
        if option == card.correct_answer() {
            OptionMark::Correct
        } else if self.selected_option.as_deref() == Some(option) {
            OptionMark::Wrong
        } else {
            OptionMark::Dimmed
        }
    }
}

pub fn explanation_text(card: &Card) -> &str {
    card.explanation.as_deref().unwrap_or(NO_EXPLANATION)
}
