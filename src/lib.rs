pub mod card;
pub mod card_state;
pub mod commands;
pub mod controller;
pub mod error;
pub mod llm;
pub mod palette;
pub mod session;
pub mod settings;
pub mod source;
pub mod summary;
pub mod tui;
pub mod utils;
