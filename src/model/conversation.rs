//! Conversation model: day sections and author groups.
//!
//! Messages are split into one section per UTC calendar day. Inside a
//! section, consecutive messages from the same author collapse into a group:
//! the first one is a [`RowKind::Lead`] row (author header + body) and the
//! rest are [`RowKind::Grouped`] rows (body only).

use crate::model::{ChatMessage, RowPosition};
use chrono::NaiveDate;
use std::time::Duration;

/// Default time window for grouping consecutive messages.
pub const DEFAULT_GROUP_WINDOW: Duration = Duration::from_secs(30);

/// Default maximum number of messages in one group (lead included).
pub const DEFAULT_MAX_GROUP_SIZE: usize = 10;

/// Rules deciding whether a message continues its predecessor's group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingRules {
    /// Maximum gap between two messages of the same group.
    pub window: Duration,
    /// Maximum messages per group, lead included. Values below 1 act as 1.
    pub max_group_size: usize,
}

impl Default for GroupingRules {
    fn default() -> Self {
        Self {
            window: DEFAULT_GROUP_WINDOW,
            max_group_size: DEFAULT_MAX_GROUP_SIZE,
        }
    }
}

/// How a message is presented in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// First message of a group, shown with the author header.
    Lead,
    /// Continuation of the previous message's group, body only.
    Grouped,
}

/// A message together with its presentation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    message: ChatMessage,
    kind: RowKind,
}

impl ConversationRow {
    /// The underlying message.
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    /// Presentation kind.
    pub fn kind(&self) -> RowKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    date: NaiveDate,
    rows: Vec<ConversationRow>,
}

/// Messages arranged into sections and groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    sections: Vec<Section>,
}

impl Conversation {
    /// Arrange `messages` by timestamp (stable for equal timestamps) and
    /// split them into sections and groups.
    pub fn new(mut messages: Vec<ChatMessage>, rules: GroupingRules) -> Self {
        messages.sort_by_key(|m| m.timestamp());

        let max_group_size = rules.max_group_size.max(1);
        let mut sections: Vec<Section> = Vec::new();
        let mut group_len = 0usize;

        for message in messages {
            let date = message.timestamp().date_naive();
            if sections.last().map(|s| s.date) != Some(date) {
                sections.push(Section {
                    date,
                    rows: Vec::new(),
                });
                group_len = 0;
            }
            let Some(section) = sections.last_mut() else {
                continue;
            };

            let grouped = section.rows.last().is_some_and(|prev| {
                continues_group(prev.message(), &message, rules.window)
                    && group_len < max_group_size
            });

            let kind = if grouped {
                group_len += 1;
                RowKind::Grouped
            } else {
                group_len = 1;
                RowKind::Lead
            };
            section.rows.push(ConversationRow { message, kind });
        }

        Self { sections }
    }

    /// Number of day sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of rows in `section`; 0 for an unknown section.
    pub fn row_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, |s| s.rows.len())
    }

    /// Calendar day a section covers.
    pub fn section_date(&self, section: usize) -> Option<NaiveDate> {
        self.sections.get(section).map(|s| s.date)
    }

    /// Row at `position`, if it exists.
    pub fn row(&self, position: RowPosition) -> Option<&ConversationRow> {
        self.sections
            .get(position.section())
            .and_then(|s| s.rows.get(position.row()))
    }

    /// All positions in display order.
    pub fn positions(&self) -> impl Iterator<Item = RowPosition> + '_ {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section, s)| {
                (0..s.rows.len()).map(move |row| RowPosition::new(section, row))
            })
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// Whether there are no messages at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn continues_group(prev: &ChatMessage, next: &ChatMessage, window: Duration) -> bool {
    if prev.is_system() || next.is_system() || prev.actor() != next.actor() {
        return false;
    }
    // Negative gaps fail `to_std`.
    (next.timestamp() - prev.timestamp())
        .to_std()
        .is_ok_and(|gap| gap <= window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageId;
    use chrono::{DateTime, TimeZone, Utc};

    // 2024-03-01T12:00:00Z
    const NOON: i64 = 1_709_294_400;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    fn msg(id: &str, actor: &str, secs: i64) -> ChatMessage {
        ChatMessage::new(MessageId::new(id).unwrap(), actor, format!("body {id}"), at(secs))
    }

    fn kinds(conv: &Conversation) -> Vec<RowKind> {
        conv.positions()
            .map(|p| conv.row(p).expect("position from positions()").kind())
            .collect()
    }

    #[test]
    fn empty_conversation_has_no_sections() {
        let conv = Conversation::new(Vec::new(), GroupingRules::default());
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
        assert_eq!(conv.section_count(), 0);
        assert_eq!(conv.positions().count(), 0);
    }

    #[test]
    fn same_author_within_window_is_grouped() {
        let conv = Conversation::new(
            vec![
                msg("1", "alice", NOON),
                msg("2", "alice", NOON + 10),
                msg("3", "bob", NOON + 12),
                msg("4", "bob", NOON + 100),
            ],
            GroupingRules::default(),
        );

        insta::assert_debug_snapshot!(kinds(&conv), @r###"
        [
            Lead,
            Grouped,
            Lead,
            Lead,
        ]
        "###);
    }

    #[test]
    fn gap_equal_to_window_still_groups() {
        let conv = Conversation::new(
            vec![msg("1", "alice", NOON), msg("2", "alice", NOON + 30)],
            GroupingRules::default(),
        );
        assert_eq!(kinds(&conv), vec![RowKind::Lead, RowKind::Grouped]);
    }

    #[test]
    fn system_messages_never_group() {
        let conv = Conversation::new(
            vec![
                msg("1", "alice", NOON),
                msg("2", "alice", NOON + 1).as_system(),
                msg("3", "alice", NOON + 2),
            ],
            GroupingRules::default(),
        );
        assert_eq!(
            kinds(&conv),
            vec![RowKind::Lead, RowKind::Lead, RowKind::Lead]
        );
    }

    #[test]
    fn group_size_cap_starts_new_lead() {
        let rules = GroupingRules {
            max_group_size: 3,
            ..GroupingRules::default()
        };
        let messages = (0..5)
            .map(|i| msg(&i.to_string(), "alice", NOON + i))
            .collect();
        let conv = Conversation::new(messages, rules);

        insta::assert_debug_snapshot!(kinds(&conv), @r###"
        [
            Lead,
            Grouped,
            Grouped,
            Lead,
            Grouped,
        ]
        "###);
    }

    #[test]
    fn zero_group_size_disables_grouping() {
        let rules = GroupingRules {
            max_group_size: 0,
            ..GroupingRules::default()
        };
        let conv = Conversation::new(
            vec![msg("1", "alice", NOON), msg("2", "alice", NOON + 1)],
            rules,
        );
        assert_eq!(kinds(&conv), vec![RowKind::Lead, RowKind::Lead]);
    }

    #[test]
    fn day_boundary_opens_new_section() {
        let midnight = NOON + 12 * 3600;
        let conv = Conversation::new(
            vec![msg("1", "alice", midnight - 5), msg("2", "alice", midnight + 5)],
            GroupingRules::default(),
        );

        assert_eq!(conv.section_count(), 2);
        assert_eq!(conv.row_count(0), 1);
        assert_eq!(conv.row_count(1), 1);
        assert_eq!(
            conv.row(RowPosition::new(1, 0)).unwrap().kind(),
            RowKind::Lead,
            "First row of a section always leads"
        );
        assert_eq!(
            conv.section_date(1),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
    }

    #[test]
    fn out_of_order_input_is_sorted_by_timestamp() {
        let conv = Conversation::new(
            vec![msg("late", "alice", NOON + 5), msg("early", "alice", NOON)],
            GroupingRules::default(),
        );
        let first = conv.row(RowPosition::new(0, 0)).unwrap();
        assert_eq!(first.message().id().as_str(), "early");
    }

    #[test]
    fn row_lookup_out_of_range_is_none() {
        let conv = Conversation::new(vec![msg("1", "alice", NOON)], GroupingRules::default());
        assert!(conv.row(RowPosition::new(0, 1)).is_none());
        assert!(conv.row(RowPosition::new(3, 0)).is_none());
        assert_eq!(conv.row_count(9), 0);
    }
}
