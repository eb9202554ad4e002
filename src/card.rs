use std::fmt;

use anyhow::{Result, bail};

pub const TRUE_LITERAL: &str = "True";
pub const FALSE_LITERAL: &str = "False";
pub const TRUE_FALSE_CHOICES: [&str; 2] = [TRUE_LITERAL, FALSE_LITERAL];

/// Upper bound on multiple choice options, so each maps to a single digit key.
pub const MAX_OPTIONS: usize = 9;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub id: u32,
    pub question: String,
    pub kind: CardKind,
    pub explanation: Option<String>,
}

/// The answer side of a card. Only the fields that make sense for the kind
/// exist, so a basic card can never carry options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardKind {
    Basic { answer: String },
    TrueFalse { answer: bool },
    MultipleChoice { options: Vec<String>, answer: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardType {
    Basic,
    TrueFalse,
    MultipleChoice,
}

impl CardType {
    pub fn label(self) -> &'static str {
        match self {
            CardType::Basic => "Open",
            CardType::TrueFalse => "True/False",
            CardType::MultipleChoice => "Multiple choice",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Card {
    pub fn new(id: u32, question: impl Into<String>, kind: CardKind) -> Result<Self> {
        let question = question.into();
        if question.trim().is_empty() {
            bail!("Card {id} has an empty question");
        }
        if let CardKind::MultipleChoice { options, answer } = &kind {
            if options.is_empty() {
                bail!("Multiple choice card {id} has no options");
            }
            if options.len() > MAX_OPTIONS {
                bail!(
                    "Multiple choice card {id} has {} options, at most {MAX_OPTIONS} are allowed",
                    options.len()
                );
            }
            if !options.iter().any(|option| option == answer) {
                bail!("Multiple choice card {id} answer {answer:?} is not one of its options");
            }
        }
        Ok(Card {
            id,
            question,
            kind,
            explanation: None,
        })
    }

    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn card_type(&self) -> CardType {
        match self.kind {
            CardKind::Basic { .. } => CardType::Basic,
            CardKind::TrueFalse { .. } => CardType::TrueFalse,
            CardKind::MultipleChoice { .. } => CardType::MultipleChoice,
        }
    }

    pub fn correct_answer(&self) -> &str {
        match &self.kind {
            CardKind::Basic { answer } | CardKind::MultipleChoice { answer, .. } => answer,
            CardKind::TrueFalse { answer: true } => TRUE_LITERAL,
            CardKind::TrueFalse { answer: false } => FALSE_LITERAL,
        }
    }

    /// The options a user picks from, or `None` for self-graded cards.
    pub fn choices(&self) -> Option<Vec<&str>> {
        match &self.kind {
            CardKind::Basic { .. } => None,
            CardKind::TrueFalse { .. } => Some(TRUE_FALSE_CHOICES.to_vec()),
            CardKind::MultipleChoice { options, .. } => {
                Some(options.iter().map(String::as_str).collect())
            }
        }
    }

    pub fn is_choice(&self) -> bool {
        !matches!(self.kind, CardKind::Basic { .. })
    }
}

/// Parses one of the two true/false literals. Anything else, including other
/// casings, is rejected.
pub fn parse_true_false(text: &str) -> Option<bool> {
    match text {
        TRUE_LITERAL => Some(true),
        FALSE_LITERAL => Some(false),
        _ => None,
    }
}

/// An ordered, never-empty set of cards produced by one generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Result<Self> {
        if cards.is_empty() {
            bail!("A deck needs at least one card");
        }
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn shuffled(mut self) -> Self {
        use rand::seq::SliceRandom;
        self.cards.shuffle(&mut rand::rng());
        self
    }

    pub fn count_by_type(&self, card_type: CardType) -> usize {
        self.cards
            .iter()
            .filter(|card| card.card_type() == card_type)
            .count()
    }
}
