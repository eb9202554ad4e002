//! Quiz session lifecycle.
//!
//! A session moves `Setup -> InProgress -> Finished`; `restart` goes back to
//! `Setup` from anywhere. `submit_answer` is the only way to change the tally
//! during play, and it never looks at how the verdict was reached.

use crate::card::{Card, Deck};
use crate::error::SessionError;
use crate::summary::ScoreSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Setup,
    InProgress,
    Finished,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    current_index: usize,
    answers: Vec<bool>,
    score: usize,
    is_finished: bool,
}

impl SessionState {
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &[bool] {
        &self.answers
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Advanced { index: usize },
    Finished,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    deck: Option<Deck>,
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.deck, self.state.is_finished) {
            (None, _) => Phase::Setup,
            (Some(_), false) => Phase::InProgress,
            (Some(_), true) => Phase::Finished,
        }
    }

    /// Installs a fresh deck. A deck from a previous generation is replaced.
    pub fn start(&mut self, deck: Deck) {
        self.deck = Some(deck);
        self.state = SessionState::default();
    }

    pub fn submit_answer(&mut self, is_correct: bool) -> Result<Transition, SessionError> {
        if self.phase() != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let deck_len = self.deck_len();

        self.state.answers.push(is_correct);
        if is_correct {
            self.state.score += 1;
        }

        if self.state.current_index + 1 >= deck_len {
            self.state.is_finished = true;
            Ok(Transition::Finished)
        } else {
            self.state.current_index += 1;
            Ok(Transition::Advanced {
                index: self.state.current_index,
            })
        }
    }

    pub fn restart(&mut self) {
        self.deck = None;
        self.state = SessionState::default();
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn deck_len(&self) -> usize {
        self.deck.as_ref().map(Deck::len).unwrap_or(0)
    }

    /// The card under review. After the last submit this stays on the final
    /// card.
    pub fn current_card(&self) -> Option<&Card> {
        self.deck.as_ref()?.get(self.state.current_index)
    }

    pub fn progress_percent(&self) -> f64 {
        let total = self.deck_len();
        if total == 0 {
            return 0.0;
        }
        self.state.current_index as f64 / total as f64 * 100.0
    }

    pub fn summary(&self) -> Option<ScoreSummary> {
        match self.phase() {
            Phase::Finished => Some(ScoreSummary::from_answers(&self.state.answers)),
            _ => None,
        }
    }
}
