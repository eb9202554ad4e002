use std::time::Instant;

use log::debug;

use crate::card::{Card, Deck};
use crate::card_state::CardSubState;
use crate::session::{Phase, Session, Transition};
use crate::summary::ScoreSummary;

/// A transition request from the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Pick an option by its text.
    Select(String),
    /// Pick an option by its position in the card's choices.
    Choose(usize),
    Reveal,
    SelfGrade(bool),
    Next,
    Tick,
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Updated,
    Advanced { index: usize },
    Finished,
    Restarted,
}

/// Sole owner of the session and of the current card's sub-state.
///
/// Presentation reads through `view` and asks for changes with `dispatch`;
/// it never touches either value directly.
#[derive(Debug, Default)]
pub struct SessionController {
    session: Session,
    card: CardSubState,
}

pub struct SessionView<'a> {
    pub phase: Phase,
    pub card: Option<&'a Card>,
    pub card_state: &'a CardSubState,
    pub index: usize,
    pub total: usize,
    pub score: usize,
    pub progress_percent: f64,
    pub summary: Option<ScoreSummary>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, deck: Deck) {
        debug!("starting session with {} cards", deck.len());
        self.session.start(deck);
        self.card = CardSubState::new();
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn card_state(&self) -> &CardSubState {
        &self.card
    }

    pub fn view(&self) -> SessionView<'_> {
        let state = self.session.state();
        SessionView {
            phase: self.session.phase(),
            card: self.session.current_card(),
            card_state: &self.card,
            index: state.current_index(),
            total: self.session.deck_len(),
            score: state.score(),
            progress_percent: self.session.progress_percent(),
            summary: self.session.summary(),
        }
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) -> Outcome {
        if action == Action::Restart {
            return self.restart();
        }
        if self.session.phase() != Phase::InProgress {
            return Outcome::Ignored;
        }
        let Some(card) = self.session.current_card().cloned() else {
            return Outcome::Ignored;
        };

        match action {
            Action::Select(option) => updated(self.card.select(&card, &option, now)),
            Action::Choose(position) => {
                let option = card
                    .choices()
                    .and_then(|choices| choices.get(position).map(|choice| choice.to_string()));
                match option {
                    Some(option) => updated(self.card.select(&card, &option, now)),
                    None => Outcome::Ignored,
                }
            }
            Action::Reveal => updated(self.card.reveal(&card)),
            Action::Tick => updated(self.card.tick(now)),
            Action::SelfGrade(knew_it) => match self.card.self_grade(&card, knew_it) {
                Some(verdict) => self.submit(verdict),
                None => Outcome::Ignored,
            },
            Action::Next => match self.card.take_choice_verdict(&card) {
                Some(verdict) => self.submit(verdict),
                None => Outcome::Ignored,
            },
            Action::Restart => self.restart(),
        }
    }

    fn restart(&mut self) -> Outcome {
        self.session.restart();
        self.card = CardSubState::new();
        Outcome::Restarted
    }

    fn submit(&mut self, verdict: bool) -> Outcome {
        match self.session.submit_answer(verdict) {
            Ok(Transition::Advanced { index }) => {
                self.card = CardSubState::new();
                Outcome::Advanced { index }
            }
            Ok(Transition::Finished) => Outcome::Finished,
            Err(_) => Outcome::Ignored,
        }
    }
}

fn updated(changed: bool) -> Outcome {
    if changed {
        Outcome::Updated
    } else {
        Outcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;
    use crate::card_state::FLIP_DELAY;
    use crate::session::SessionState;

    fn mixed_deck() -> Deck {
        Deck::new(vec![
            Card::new(
                1,
                "Capital of France?",
                CardKind::MultipleChoice {
                    options: vec!["London".into(), "Paris".into()],
                    answer: "Paris".into(),
                },
            )
            .unwrap(),
            Card::new(2, "The sun is a star", CardKind::TrueFalse { answer: true }).unwrap(),
            Card::new(
                3,
                "Name the powerhouse of the cell",
                CardKind::Basic {
                    answer: "Mitochondria".into(),
                },
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn full_run_through_mixed_deck() {
        let mut controller = SessionController::new();
        controller.start(mixed_deck());
        let t0 = Instant::now();

        assert_eq!(
            controller.dispatch(Action::Select("Paris".into()), t0),
            Outcome::Updated
        );
        assert_eq!(controller.dispatch(Action::Next, t0), Outcome::Ignored);
        assert_eq!(
            controller.dispatch(Action::Tick, t0 + FLIP_DELAY),
            Outcome::Updated
        );
        assert_eq!(
            controller.dispatch(Action::Next, t0 + FLIP_DELAY),
            Outcome::Advanced { index: 1 }
        );

        let view = controller.view();
        assert_eq!(view.index, 1);
        assert_eq!(view.score, 1);
        assert!(!view.card_state.has_answered());
        assert_eq!(view.card_state.selected_option(), None);

        // "False" is the second choice on a true/false card.
        assert_eq!(controller.dispatch(Action::Choose(1), t0), Outcome::Updated);
        assert_eq!(controller.dispatch(Action::Reveal, t0), Outcome::Updated);
        assert_eq!(
            controller.dispatch(Action::Next, t0),
            Outcome::Advanced { index: 2 }
        );

        assert_eq!(
            controller.dispatch(Action::SelfGrade(true), t0),
            Outcome::Ignored
        );
        assert_eq!(controller.dispatch(Action::Reveal, t0), Outcome::Updated);
        assert_eq!(
            controller.dispatch(Action::SelfGrade(true), t0),
            Outcome::Finished
        );

        let view = controller.view();
        assert_eq!(view.phase, Phase::Finished);
        assert_eq!(view.index, 2);
        let summary = view.summary.unwrap();
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn nothing_moves_after_finish_except_restart() {
        let mut controller = SessionController::new();
        controller.start(mixed_deck());
        let t0 = Instant::now();
        for _ in 0..2 {
            controller.dispatch(Action::Choose(0), t0);
            controller.dispatch(Action::Reveal, t0);
            controller.dispatch(Action::Next, t0);
        }
        controller.dispatch(Action::Reveal, t0);
        assert_eq!(
            controller.dispatch(Action::SelfGrade(false), t0),
            Outcome::Finished
        );
        assert_eq!(
            controller.dispatch(Action::SelfGrade(false), t0),
            Outcome::Ignored
        );
        assert_eq!(controller.session().state().answers().len(), 3);

        assert_eq!(
            controller.dispatch(Action::Restart, t0),
            Outcome::Restarted
        );
        assert_eq!(controller.phase(), Phase::Setup);
        assert_eq!(controller.session().state(), &SessionState::default());
        assert_eq!(controller.card_state(), &CardSubState::new());
    }

    #[test]
    fn choose_out_of_range_is_ignored() {
        let mut controller = SessionController::new();
        controller.start(mixed_deck());
        assert_eq!(
            controller.dispatch(Action::Choose(7), Instant::now()),
            Outcome::Ignored
        );
    }

    #[test]
    fn actions_in_setup_are_ignored() {
        let mut controller = SessionController::new();
        let now = Instant::now();
        assert_eq!(controller.dispatch(Action::Reveal, now), Outcome::Ignored);
        assert_eq!(controller.dispatch(Action::Next, now), Outcome::Ignored);
        assert!(controller.view().card.is_none());
    }
}
