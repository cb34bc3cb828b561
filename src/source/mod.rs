//! Transcript input sources.
//!
//! A transcript is read once, either from a file or from piped stdin, and
//! parsed at the boundary so callers only ever see [`ParsedTranscript`].

use crate::model::error::InputError;
use crate::parser::{parse_transcript, ParsedTranscript};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A JSONL file on disk.
    File(PathBuf),
    /// Piped standard input.
    Stdin,
}

impl InputSource {
    /// Read and parse the whole transcript.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` for a missing file and
    /// `InputError::Io` for other read failures.
    pub fn load(&self) -> Result<ParsedTranscript, InputError> {
        match self {
            InputSource::File(path) => load_file(path),
            InputSource::Stdin => load_reader(std::io::stdin().lock()),
        }
    }
}

/// Pick the input source.
///
/// A file path wins; otherwise stdin is used when it is piped.
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is given and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(path)),
        None if std::io::stdin().is_terminal() => Err(InputError::NoInput),
        None => Ok(InputSource::Stdin),
    }
}

/// Read and parse a transcript file.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if `path` does not exist.
pub fn load_file(path: &Path) -> Result<ParsedTranscript, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_transcript(&contents);
    info!(
        path = %path.display(),
        messages = parsed.messages.len(),
        skipped = parsed.errors.len(),
        "Loaded transcript"
    );
    Ok(parsed)
}

/// Read and parse a transcript from any reader until EOF.
///
/// # Errors
///
/// Returns `InputError::Io` if reading fails or the input is not UTF-8.
pub fn load_reader(mut reader: impl Read) -> Result<ParsedTranscript, InputError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    let parsed = parse_transcript(&contents);
    info!(
        messages = parsed.messages.len(),
        skipped = parsed.errors.len(),
        "Loaded transcript from stdin"
    );
    Ok(parsed)
}
