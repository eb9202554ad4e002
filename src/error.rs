use std::path::PathBuf;

use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can stop a quiz from being set up.
///
/// Input rejections are raised before any file is read or any request is
/// sent. Extraction and generation failures carry their cause as the error
/// source but show a single generic message to the user.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Unsupported file type: {0}. Only PDF (.pdf) and Markdown (.md) documents are accepted.")]
    UnsupportedFileType(String),

    #[error("The document contains no readable text.")]
    EmptyDocument,

    #[error("Select at least one card type.")]
    NoCardTypeSelected,

    #[error("Card count must be between {min} and {max}, got {requested}.")]
    CardCountOutOfRange { requested: u8, min: u8, max: u8 },

    #[error("Could not read file {}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: BoxedCause,
    },

    #[error("Could not generate flashcards. Try again or check the document text.")]
    Generation(#[source] BoxedCause),
}

impl QuizError {
    pub fn extraction(path: impl Into<PathBuf>, source: impl Into<BoxedCause>) -> Self {
        QuizError::Extraction {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn generation(source: impl Into<BoxedCause>) -> Self {
        QuizError::Generation(source.into())
    }

    /// True for errors detected before any file read or network call.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            QuizError::UnsupportedFileType(_)
                | QuizError::EmptyDocument
                | QuizError::NoCardTypeSelected
                | QuizError::CardCountOutOfRange { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no quiz is in progress")]
    NotInProgress,
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn generation_error_hides_cause_in_message_but_keeps_source() {
        let err = QuizError::generation(anyhow::anyhow!("HTTP 500"));
        assert_eq!(
            err.to_string(),
            "Could not generate flashcards. Try again or check the document text."
        );
        let source = err.source().expect("cause should be kept");
        assert_eq!(source.to_string(), "HTTP 500");
        assert!(!err.is_input_rejection());
    }

    #[test]
    fn input_rejections_are_flagged() {
        assert!(QuizError::NoCardTypeSelected.is_input_rejection());
        assert!(QuizError::EmptyDocument.is_input_rejection());
        assert!(QuizError::UnsupportedFileType("notes.txt".into()).is_input_rejection());
        assert!(
            QuizError::CardCountOutOfRange {
                requested: 30,
                min: 3,
                max: 20
            }
            .is_input_rejection()
        );
    }

    #[test]
    fn extraction_error_names_the_file() {
        let err = QuizError::extraction(
            "notes/biology.pdf",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "bad xref"),
        );
        assert_eq!(err.to_string(), "Could not read file notes/biology.pdf");
    }
}
