use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::source::extract_text;

/// Prints the full text of a document, before any truncation for generation.
pub fn run(path: &Path) -> Result<()> {
    let text = extract_text(path)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("failed to write extracted text")?;
    if !text.ends_with('\n') {
        writeln!(stdout).context("failed to write extracted text")?;
    }
    Ok(())
}
