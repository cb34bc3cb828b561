//! Error types for chatrow.
//!
//! Errors are layered with `thiserror`, composing via `?` and `From`
//! conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error wrapping every fatal failure
//!   - [`InputError`] - Transcript file/stdin reading failures
//!   - [`ConfigError`](crate::config::ConfigError) - Unreadable or invalid config file
//!   - [`PoolError`](crate::list::PoolError) - Row kind requested but never registered
//!   - [`MetricsError`](crate::row::MetricsError) - Invalid or doubly installed row metrics
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!   - [`TuiError`](crate::view::TuiError) - Event loop and drawing failures
//!   - `std::io::Error` - Terminal failures
//!
//! [`ParseError`] is not part of the hierarchy. Malformed transcript lines
//! are collected next to the parsed messages and skipped, never propagated.
//!
//! Row binding itself never fails: a stale asynchronous result is discarded,
//! not reported.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the transcript.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A row was requested for an identifier with no registered factory.
    #[error("Row pool error: {0}")]
    Pool(#[from] crate::list::PoolError),

    /// Row metrics could not be installed.
    #[error("Row metrics error: {0}")]
    Metrics(#[from] crate::row::MetricsError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// The TUI failed while running.
    #[error("TUI error: {0}")]
    Tui(#[from] crate::view::TuiError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when reading a transcript from a file or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The transcript file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// No file was given and stdin is a terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Any other I/O failure while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A transcript line that could not be turned into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line is not valid JSON or is missing required fields.
    #[error("line {line}: invalid JSON: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Deserializer message.
        message: String,
    },

    /// Message ID field was empty.
    #[error("line {line}: message id cannot be empty")]
    EmptyId {
        /// 1-based line number.
        line: usize,
    },

    /// Timestamp could not be interpreted.
    #[error("line {line}: invalid timestamp {raw:?}")]
    InvalidTimestamp {
        /// 1-based line number.
        line: usize,
        /// Raw timestamp text.
        raw: String,
    },
}

impl ParseError {
    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidJson { line, .. }
            | ParseError::EmptyId { line }
            | ParseError::InvalidTimestamp { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_converts_into_app_error() {
        let err: AppError = InputError::NoInput.into();
        assert!(matches!(err, AppError::InputRead(InputError::NoInput)));
    }

    #[test]
    fn io_error_converts_into_terminal_error() {
        let err: AppError = std::io::Error::other("boom").into();
        assert!(matches!(err, AppError::Terminal(_)));
    }

    #[test]
    fn file_not_found_mentions_path() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.jsonl"),
        };
        assert!(err.to_string().contains("/tmp/missing.jsonl"));
    }

    fn layer(err: &AppError) -> &'static str {
        match err {
            AppError::InputRead(_) => "Failed to read input",
            AppError::Config(_) => "Configuration error",
            AppError::Pool(_) => "Row pool error",
            AppError::Metrics(_) => "Row metrics error",
            AppError::Logging(_) => "Logging error",
            AppError::Tui(_) => "TUI error",
            AppError::Terminal(_) => "Terminal error",
        }
    }

    #[test]
    fn every_fatal_error_names_its_layer() {
        let errors: Vec<AppError> = vec![
            InputError::NoInput.into(),
            crate::row::MetricsError::AlreadyInstalled.into(),
            crate::logging::LoggingError::SubscriberAlreadySet.into(),
            std::io::Error::other("boom").into(),
        ];
        for err in &errors {
            assert!(err.to_string().starts_with(layer(err)), "{err}");
        }
    }

    #[test]
    fn parse_error_reports_line() {
        let err = ParseError::InvalidTimestamp {
            line: 7,
            raw: "yesterday".to_string(),
        };
        assert_eq!(err.line(), 7);
        assert_eq!(err.to_string(), "line 7: invalid timestamp \"yesterday\"");
    }
}
