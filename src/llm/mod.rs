pub mod backend;
pub mod client;
pub mod generate;
pub mod secrets;

pub use backend::{CompletionBackend, DEFAULT_MODEL, OpenAiBackend};
pub use client::{ensure_client, test_configured_api_key};
pub use generate::{generate_deck, parse_deck};
pub use secrets::{ApiKeySource, KeyStore};
