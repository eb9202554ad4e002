use std::fs;
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::error::QuizError;

/// Upper bound on the characters of document text sent for generation.
pub const MAX_PROMPT_CHARS: usize = 30_000;

static BLANK_RUNS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Markdown,
}

impl DocumentKind {
    /// Accepts by extension (case insensitive) or by MIME hint.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Result<Self, QuizError> {
        let lower = file_name.to_ascii_lowercase();
        let mime = mime.map(str::to_ascii_lowercase);
        if lower.ends_with(".pdf") || mime.as_deref() == Some("application/pdf") {
            return Ok(DocumentKind::Pdf);
        }
        if lower.ends_with(".md") || mime.as_deref() == Some("text/markdown") {
            return Ok(DocumentKind::Markdown);
        }
        Err(QuizError::UnsupportedFileType(file_name.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, QuizError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::detect(&name, None)
    }
}

/// Reads a PDF or Markdown file into plain text.
///
/// The type is checked before the file is opened. Unreadable files become
/// `QuizError::Extraction`; a document with no text is `EmptyDocument`.
pub fn extract_text(path: &Path) -> Result<String, QuizError> {
    let kind = DocumentKind::from_path(path)?;
    let bytes = fs::read(path).map_err(|err| QuizError::extraction(path, err))?;

    let text = match kind {
        DocumentKind::Pdf => pdf_text(&bytes).map_err(|err| QuizError::extraction(path, err))?,
        DocumentKind::Markdown => {
            let raw = String::from_utf8(bytes).map_err(|err| QuizError::extraction(path, err))?;
            markdown_text(&raw)
        }
    };

    let text = collapse_blank_lines(&text);
    if text.trim().is_empty() {
        return Err(QuizError::EmptyDocument);
    }
    debug!(
        "extracted {} characters from {}",
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

fn pdf_text(bytes: &[u8]) -> Result<String, pdf_extract::OutputError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)?;
    Ok(join_pages(&pages))
}

/// Every page is followed by a newline.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
        text.push('\n');
    }
    text
}

/// Flattens Markdown to text: block elements end a line, inline markup is
/// dropped, code is kept verbatim.
pub fn markdown_text(md: &str) -> String {
    let parser = Parser::new_ext(md, Options::ENABLE_TABLES | Options::ENABLE_MATH);
    let mut out = String::with_capacity(md.len());

    for event in parser {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::InlineMath(math) | Event::DisplayMath(math) => out.push_str(&math),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => out.push('\n'),
            Event::End(TagEnd::TableCell) => out.push('\t'),
            _ => {}
        }
    }
    out
}

fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUNS_RE.replace_all(text, "\n\n").into_owned()
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn detects_supported_kinds() {
        assert_eq!(
            DocumentKind::detect("notes.md", None).unwrap(),
            DocumentKind::Markdown
        );
        assert_eq!(
            DocumentKind::detect("NOTES.MD", None).unwrap(),
            DocumentKind::Markdown
        );
        assert_eq!(
            DocumentKind::detect("slides.PDF", None).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::detect("upload", Some("application/pdf")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::detect("upload", Some("text/markdown")).unwrap(),
            DocumentKind::Markdown
        );
    }

    #[test]
    fn rejects_other_types_before_reading() {
        let err = DocumentKind::detect("notes.txt", Some("text/plain")).unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedFileType(name) if name == "notes.txt"));

        // The file does not exist; rejection must happen before any read.
        let err = extract_text(Path::new("/definitely/missing/notes.docx")).unwrap_err();
        assert!(matches!(err, QuizError::UnsupportedFileType(_)));
    }

    #[test]
    fn markdown_file_becomes_plain_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.md");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "# Cells\n\nThe **mitochondria** is the\npowerhouse.\n\n- nucleus\n- ribosome\n\n`ATP`"
        )
        .unwrap();

        let text = extract_text(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Cells");
        assert!(lines.contains(&"The mitochondria is the powerhouse."));
        assert!(lines.contains(&"- nucleus"));
        assert!(lines.contains(&"- ribosome"));
        assert!(lines.contains(&"ATP"));
        assert!(!text.contains("**"));
    }

    #[test]
    fn empty_markdown_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.md");
        fs::write(&path, "   \n\n").unwrap();
        assert!(matches!(
            extract_text(&path).unwrap_err(),
            QuizError::EmptyDocument
        ));
    }

    #[test]
    fn corrupt_pdf_is_an_extraction_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
        assert!(err.to_string().starts_with("Could not read file"));
    }

    #[test]
    fn missing_markdown_is_an_extraction_failure() {
        let err = extract_text(Path::new("/definitely/missing/notes.md")).unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
    }

    #[test]
    fn pages_are_newline_terminated() {
        assert_eq!(join_pages(&["one", "two"]), "one\ntwo\n");
        assert_eq!(join_pages::<&str>(&[]), "");
    }

    #[test]
    fn blank_line_runs_collapse() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("short", 30), "short");
        assert_eq!(truncate_chars("", 0), "");
        let long = "x".repeat(MAX_PROMPT_CHARS + 10);
        assert_eq!(truncate_chars(&long, MAX_PROMPT_CHARS).len(), MAX_PROMPT_CHARS);
    }
}
