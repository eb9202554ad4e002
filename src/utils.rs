use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Drops ANSI escape sequences and control characters, e.g. from pasted keys.
pub fn strip_controls_and_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value.round())
}

pub fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "flashmind")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_escape_sequences() {
        assert_eq!(strip_controls_and_escapes("\x1b[1msk-abc\x1b[0m\n"), "sk-abc");
        assert_eq!(strip_controls_and_escapes("  sk-\tdef "), "sk-def");
    }

    #[test]
    fn pluralizes_by_count() {
        assert_eq!(pluralize("card", 1), "1 card");
        assert_eq!(pluralize("card", 0), "0 cards");
        assert_eq!(pluralize("card", 12), "12 cards");
    }

    #[test]
    fn trims_blank_lines_to_none() {
        assert_eq!(trim_line("   "), None);
        assert_eq!(trim_line(" key "), Some("key"));
    }

    #[test]
    fn percent_is_rounded() {
        assert_eq!(format_percent(66.666), "67%");
        assert_eq!(format_percent(50.0), "50%");
        assert_eq!(format_percent(0.0), "0%");
    }
}
