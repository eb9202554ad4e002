use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueHint};

use flashmind::commands::{extract, quiz};
use flashmind::llm::{DEFAULT_MODEL, KeyStore, test_configured_api_key};
use flashmind::settings::{
    CARD_COUNT_RANGE, CardTypes, DEFAULT_CARD_COUNT, DEFAULT_LANGUAGE, Difficulty, Settings,
};

#[derive(Parser, Debug)]
#[command(
    name = "flashmind",
    version,
    about = "Generate flashcards from a document and quiz yourself in the terminal.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck from a PDF or Markdown file and start a quiz
    Quiz {
        /// Document to study from (.pdf or .md)
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Number of cards to generate
        #[arg(
            long,
            value_name = "N",
            default_value_t = DEFAULT_CARD_COUNT,
            value_parser = clap::value_parser!(u8).range(
                i64::from(*CARD_COUNT_RANGE.start())..=i64::from(*CARD_COUNT_RANGE.end())
            )
        )]
        count: u8,
        /// How hard the questions should be
        #[arg(long, value_enum, default_value_t = Difficulty::Intermediate)]
        difficulty: Difficulty,
        /// Language of the generated cards
        #[arg(long, value_name = "LANGUAGE", default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// Leave out true/false cards
        #[arg(long, default_value_t = false)]
        no_true_false: bool,
        /// Leave out multiple choice cards
        #[arg(long, default_value_t = false)]
        no_multiple_choice: bool,
        /// Leave out open question cards
        #[arg(long, default_value_t = false)]
        no_basic: bool,
        /// OpenAI model used for generation
        #[arg(long, value_name = "MODEL", env = "FLASHMIND_MODEL", default_value = DEFAULT_MODEL)]
        model: String,
        /// Randomize the order of the generated cards
        #[arg(long, default_value_t = false)]
        shuffle: bool,
        /// Ask questions line by line instead of the full-screen session
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
    /// Print the text extracted from a document
    Extract {
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Manage LLM helper settings
    Llm {
        /// Store a new API key in the local auth file
        #[arg(long, value_name = "KEY", conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the OpenAI API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Quiz {
            path,
            count,
            difficulty,
            language,
            no_true_false,
            no_multiple_choice,
            no_basic,
            model,
            shuffle,
            plain,
        } => {
            let settings = Settings {
                card_count: count,
                difficulty,
                language,
                card_types: CardTypes {
                    true_false: !no_true_false,
                    multiple_choice: !no_multiple_choice,
                    basic: !no_basic,
                },
            };
            let store = KeyStore::open_default()?;
            quiz::run(
                &store,
                quiz::QuizOptions {
                    path,
                    settings,
                    model,
                    shuffle,
                    plain,
                },
            )
            .await?;
        }
        Command::Extract { path } => extract::run(&path)?,
        Command::Llm { set, clear, test } => handle_llm_command(set, clear, test).await?,
    }

    Ok(())
}

async fn handle_llm_command(set: Option<String>, clear: bool, test: bool) -> Result<()> {
    let store = KeyStore::open_default()?;
    let mut action_taken = false;

    if let Some(key) = set {
        store.store(&key)?;
        println!("Stored OpenAI API key in {}.", store.path().display());
        action_taken = true;
    }

    if clear {
        if store.clear()? {
            println!("Removed the stored OpenAI API key.");
        } else {
            println!("No OpenAI API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let source = test_configured_api_key(&store).await?;
        println!("OpenAI API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quiz_flags_map_to_settings() {
        let cli = Cli::try_parse_from([
            "flashmind",
            "quiz",
            "notes.md",
            "--count",
            "12",
            "--difficulty",
            "advanced",
            "--no-basic",
        ])
        .unwrap();
        let Command::Quiz {
            count,
            difficulty,
            no_basic,
            no_true_false,
            ..
        } = cli.command
        else {
            panic!("expected quiz command");
        };
        assert_eq!(count, 12);
        assert_eq!(difficulty, Difficulty::Advanced);
        assert!(no_basic);
        assert!(!no_true_false);
    }

    #[test]
    fn card_count_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["flashmind", "quiz", "notes.md", "--count", "2"]).is_err());
        assert!(Cli::try_parse_from(["flashmind", "quiz", "notes.md", "--count", "21"]).is_err());
    }
}
