//! JSONL parser for chat transcripts.
//!
//! One JSON object per line:
//!
//! ```json
//! {"id": "17", "actor": "alice", "message": "hi", "timestamp": 1709294400}
//! {"id": "18", "actor": "alice", "message": "see file", "timestamp": "2024-03-01T12:00:05Z", "attachment": "plan.pdf"}
//! ```
//!
//! Malformed lines do not abort parsing; they are collected as
//! [`ParseError`]s next to the messages that did parse.

use crate::model::{ChatMessage, MessageId, ParseError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Unix(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: RawId,
    #[serde(alias = "actorDisplayName")]
    actor: String,
    message: String,
    timestamp: RawTimestamp,
    #[serde(default)]
    attachment: Option<String>,
    #[serde(default)]
    system: bool,
}

/// Messages and per-line errors from one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTranscript {
    /// Successfully parsed messages, in input order.
    pub messages: Vec<ChatMessage>,
    /// Lines that were skipped.
    pub errors: Vec<ParseError>,
}

/// Parse a whole transcript. Blank lines are ignored.
///
/// Each skipped line is logged at `warn` with its line number.
pub fn parse_transcript(input: &str) -> ParsedTranscript {
    let mut parsed = ParsedTranscript::default();

    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_message(line, index + 1) {
            Ok(message) => parsed.messages.push(message),
            Err(e) => {
                warn!(line = e.line(), error = %e, "Skipping malformed transcript line");
                parsed.errors.push(e);
            }
        }
    }

    parsed
}

/// Parse a single transcript line.
///
/// # Errors
///
/// Returns [`ParseError`] carrying `line_number` if the line is not a valid
/// message.
pub fn parse_message(raw: &str, line_number: usize) -> Result<ChatMessage, ParseError> {
    let raw: RawMessage = serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
        line: line_number,
        message: e.to_string(),
    })?;

    let id = match raw.id {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    };
    let id = MessageId::new(id).map_err(|_| ParseError::EmptyId { line: line_number })?;
    let timestamp = parse_timestamp(raw.timestamp, line_number)?;

    let mut message = ChatMessage::new(id, raw.actor, raw.message, timestamp);
    if let Some(name) = raw.attachment.filter(|n| !n.is_empty()) {
        message = message.with_attachment(name);
    }
    if raw.system {
        message = message.as_system();
    }
    Ok(message)
}

fn parse_timestamp(raw: RawTimestamp, line: usize) -> Result<DateTime<Utc>, ParseError> {
    match raw {
        RawTimestamp::Unix(secs) => {
            DateTime::from_timestamp(secs, 0).ok_or_else(|| ParseError::InvalidTimestamp {
                line,
                raw: secs.to_string(),
            })
        }
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ParseError::InvalidTimestamp { line, raw: text }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_message_with_unix_timestamp() {
        let msg = parse_message(
            r#"{"id": "1", "actor": "alice", "message": "hi", "timestamp": 1709294400}"#,
            1,
        )
        .unwrap();
        assert_eq!(msg.id().as_str(), "1");
        assert_eq!(msg.actor(), "alice");
        assert_eq!(msg.body(), "hi");
        assert_eq!(msg.timestamp().to_rfc3339(), "2024-03-01T12:00:00+00:00");
        assert_eq!(msg.attachment(), None);
        assert!(!msg.is_system());
    }

    #[test]
    fn parses_numeric_id_and_rfc3339_timestamp() {
        let msg = parse_message(
            r#"{"id": 42, "actor": "bob", "message": "x", "timestamp": "2024-03-01T13:00:00+01:00"}"#,
            1,
        )
        .unwrap();
        assert_eq!(msg.id().as_str(), "42");
        assert_eq!(msg.timestamp().to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn parses_attachment_and_system_flag() {
        let msg = parse_message(
            r#"{"id": "1", "actorDisplayName": "Guest", "message": "joined", "timestamp": 0, "attachment": "a.pdf", "system": true}"#,
            1,
        )
        .unwrap();
        assert_eq!(msg.actor(), "Guest");
        assert_eq!(msg.attachment(), Some("a.pdf"));
        assert!(msg.is_system());
    }

    #[test]
    fn empty_attachment_is_ignored() {
        let msg = parse_message(
            r#"{"id": "1", "actor": "a", "message": "", "timestamp": 0, "attachment": ""}"#,
            1,
        )
        .unwrap();
        assert_eq!(msg.attachment(), None);
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_message("{not json", 3).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { line: 3, .. }));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = parse_message(r#"{"id": "1", "actor": "a"}"#, 4).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { line: 4, .. }));
    }

    #[test]
    fn rejects_empty_id() {
        let err =
            parse_message(r#"{"id": "", "actor": "a", "message": "", "timestamp": 0}"#, 5)
                .unwrap_err();
        assert_eq!(err, ParseError::EmptyId { line: 5 });
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let err = parse_message(
            r#"{"id": "1", "actor": "a", "message": "", "timestamp": "yesterday"}"#,
            6,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidTimestamp {
                line: 6,
                raw: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn transcript_skips_blank_and_malformed_lines() {
        let input = concat!(
            r#"{"id": "1", "actor": "a", "message": "one", "timestamp": 0}"#,
            "\n\n",
            "garbage\n",
            r#"{"id": "2", "actor": "a", "message": "two", "timestamp": 1}"#,
            "\n",
        );
        let parsed = parse_transcript(input);
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line(), 3);
    }
}
