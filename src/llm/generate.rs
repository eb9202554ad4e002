use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::backend::CompletionBackend;
use crate::card::{Card, CardKind, CardType, Deck, FALSE_LITERAL, TRUE_LITERAL, parse_true_false};
use crate::error::QuizError;
use crate::settings::Settings;
use crate::source::{MAX_PROMPT_CHARS, truncate_chars};

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap());

const SYSTEM_PROMPT: &str = r#"
You are an expert teacher who writes study flashcards from course material.
You answer with a JSON array only, no prose and no Markdown.
"#;

/// One card as the model returns it. `id` is asked for but never read: it may
/// be missing, null or of any type, and cards are renumbered locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub card_type: CardTypeTag,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    /// Short explanation of why the answer is correct
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CardTypeTag {
    TrueFalse,
    MultipleChoice,
    Basic,
}

impl CardRecord {
    fn into_card(self, id: u32) -> Result<Card> {
        let kind = match self.card_type {
            CardTypeTag::Basic => CardKind::Basic {
                answer: self.correct_answer,
            },
            CardTypeTag::TrueFalse => {
                let answer = parse_true_false(&self.correct_answer).with_context(|| {
                    format!(
                        "True/false card {id} answer {:?} is neither {TRUE_LITERAL:?} nor {FALSE_LITERAL:?}",
                        self.correct_answer
                    )
                })?;
                CardKind::TrueFalse { answer }
            }
            CardTypeTag::MultipleChoice => CardKind::MultipleChoice {
                options: self.options.unwrap_or_default(),
                answer: self.correct_answer,
            },
        };
        Ok(Card::new(id, self.question, kind)?.with_explanation(self.user_explanation))
    }
}

pub fn response_schema() -> Result<String> {
    let schema = schemars::schema_for!(Vec<CardRecord>);
    Ok(serde_json::to_string_pretty(&schema)?)
}

fn type_descriptions(settings: &Settings) -> Vec<&'static str> {
    settings
        .card_types
        .enabled()
        .into_iter()
        .map(|card_type| match card_type {
            CardType::TrueFalse => "true_false (a statement to judge as true or false)",
            CardType::MultipleChoice => "multiple_choice (four options, exactly one correct)",
            CardType::Basic => "basic (a classic open question)",
        })
        .collect()
}

pub fn build_user_prompt(text: &str, settings: &Settings, schema: &str) -> String {
    format!(
        "Analyze the following text and create exactly {count} study flashcards.\n\
         \n\
         Difficulty level: {difficulty}.\n\
         Allowed question types: {types}.\n\
         Language: {language}.\n\
         \n\
         Rules:\n\
         1. For 'multiple_choice', provide 4 options in the 'options' array.\n\
         2. For 'true_false', 'correctAnswer' must be exactly \"{TRUE_LITERAL}\" or \"{FALSE_LITERAL}\", whatever the language.\n\
         3. For 'basic', the question must call for a short but precise answer.\n\
         4. 'correctAnswer' must match one of the options exactly (multiple_choice), \
         \"{TRUE_LITERAL}\"/\"{FALSE_LITERAL}\" (true_false), or be the correct answer (basic).\n\
         \n\
         Reply with JSON matching this schema:\n\
         {schema}\n\
         \n\
         Text to analyze:\n\
         \"{text}\"\n",
        count = settings.card_count,
        difficulty = settings.difficulty,
        types = type_descriptions(settings).join(", "),
        language = settings.language,
    )
}

/// Parses a model reply into a deck. Ids are renumbered `1..=N` whatever the
/// model sent. Any invalid record fails the whole reply.
pub fn parse_deck(reply: &str) -> Result<Deck> {
    let body = match FENCE_RE.captures(reply) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
        None => reply.trim(),
    };
    if body.is_empty() {
        bail!("Model returned an empty reply");
    }
    let records: Vec<CardRecord> =
        serde_json::from_str(body).context("Model reply is not a JSON array of cards")?;
    if records.is_empty() {
        bail!("Model returned no cards");
    }

    let cards = records
        .into_iter()
        .zip(1u32..)
        .map(|(record, id)| record.into_card(id))
        .collect::<Result<Vec<_>>>()?;
    Deck::new(cards)
}

fn report_mismatch(settings: &Settings, deck: &Deck) {
    if deck.len() != usize::from(settings.card_count) {
        warn!(
            "requested {} cards, model returned {}",
            settings.card_count,
            deck.len()
        );
    }
    for card_type in [CardType::TrueFalse, CardType::MultipleChoice, CardType::Basic] {
        let count = deck.count_by_type(card_type);
        if count > 0 && !settings.card_types.allows(card_type) {
            warn!("model returned {count} {card_type} cards although the type was disabled");
        }
    }
}

/// Validates the request, asks the backend for cards and builds the deck.
///
/// Nothing is sent when the settings or the text are rejected. Every failure
/// after that point collapses into `QuizError::Generation`.
pub async fn generate_deck(
    backend: &dyn CompletionBackend,
    text: &str,
    settings: &Settings,
) -> Result<Deck, QuizError> {
    settings.validate()?;
    if text.trim().is_empty() {
        return Err(QuizError::EmptyDocument);
    }

    let excerpt = truncate_chars(text, MAX_PROMPT_CHARS);
    if excerpt.len() < text.len() {
        debug!(
            "document truncated to {MAX_PROMPT_CHARS} of {} characters",
            text.chars().count()
        );
    }

    let schema = response_schema().map_err(QuizError::generation)?;
    let user_prompt = build_user_prompt(excerpt, settings, &schema);
    debug!("sending prompt of {} bytes", user_prompt.len());

    let outcome: Result<Deck> = async {
        let reply = backend.complete(SYSTEM_PROMPT, &user_prompt).await?;
        parse_deck(&reply)
    }
    .await;
    let deck = outcome.map_err(|err| {
        warn!("flashcard generation failed: {err:#}");
        QuizError::generation(err)
    })?;

    report_mismatch(settings, &deck);
    info!("generated {} flashcards", deck.len());
    Ok(deck)
}
