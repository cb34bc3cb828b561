//! Integration test: late asynchronous previews against recycled rows.

use chatrow::list::{ConversationList, FillResult, PreviewFetcher, PreviewSource, RowPool};
use chatrow::model::{ChatMessage, Conversation, GroupingRules, MessageId, RowPosition};
use chatrow::row::{FillOutcome, ListRow, MessageRowView};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn preview_for_rebound_row_is_discarded() {
    let mut row = MessageRowView::new();
    assert!(!row.is_bound());
    assert_eq!(row.current_position(), None);

    row.bind("hello", RowPosition::from((0, 3)));
    assert!(row.is_bound());
    assert_eq!(row.current_position(), Some(RowPosition::new(0, 3)));

    // Fetch issued for position 3, row scrolls away and is rebound to 7.
    let ticket = row.ticket().unwrap();
    row.bind("world", RowPosition::from((0, 7)));

    assert_ne!(ticket.position(), row.current_position().unwrap());
    assert_eq!(row.apply_fill(ticket, "preview"), FillOutcome::Discarded);
    assert_eq!(row.body_text(), "world");
    assert_eq!(row.preview(), None);
}

#[test]
fn preview_for_unchanged_binding_is_applied() {
    let mut row = MessageRowView::new();
    row.bind("hello", RowPosition::new(0, 3));
    let ticket = row.ticket().unwrap();
    assert_eq!(row.apply_fill(ticket, "preview"), FillOutcome::Applied);
    assert_eq!(row.preview(), Some("preview"));
}

#[test]
fn recycled_row_rejects_tickets_of_its_previous_life() {
    let mut row: Box<dyn ListRow> = Box::new(MessageRowView::new());
    let ts = Utc.timestamp_opt(0, 0).single().unwrap();
    let message = ChatMessage::new(MessageId::new("m").unwrap(), "a", "body", ts)
        .with_attachment("f.png");

    row.bind_message(&message, RowPosition::new(0, 3));
    let ticket = row.ticket().unwrap();

    // Back to the pool and out again for the very same position.
    row.prepare_for_reuse();
    row.bind_message(&message, RowPosition::new(0, 3));

    assert_eq!(row.apply_fill(ticket, "late".to_string()), FillOutcome::Discarded);
}

struct Echo;

impl PreviewSource for Echo {
    fn fetch(&self, attachment: &str) -> String {
        format!("preview of {attachment}")
    }
}

fn transcript() -> Vec<ChatMessage> {
    (0..40)
        .map(|i| {
            let ts = Utc.timestamp_opt(1_709_294_400 + i * 60, 0).single().unwrap();
            let actor = if i % 2 == 0 { "bob" } else { "carol" };
            let message =
                ChatMessage::new(MessageId::new(format!("m{i}")).unwrap(), actor, "hi", ts);
            if i == 0 {
                message.with_attachment("report.pdf")
            } else {
                message
            }
        })
        .collect()
}

#[test]
fn fetcher_result_after_scrolling_away_is_cached_not_misapplied() {
    let conversation = Conversation::new(transcript(), GroupingRules::default());
    let mut list = ConversationList::new(conversation, RowPool::for_conversation());
    let mut fetcher = PreviewFetcher::new(Arc::new(Echo));
    list.set_viewport(40, 8);

    for request in list.layout().unwrap() {
        fetcher.request(request).unwrap();
    }
    assert_eq!(fetcher.in_flight(), 1);

    list.scroll_to_bottom();
    list.layout().unwrap();

    let result: FillResult = fetcher
        .recv_timeout(Duration::from_secs(5))
        .expect("worker should answer");
    assert_eq!(result.ticket.position(), RowPosition::new(0, 0));
    assert_eq!(list.apply_fill(result), FillOutcome::Discarded);

    for position in list.visible_positions() {
        let row = list.visible_row(position).unwrap();
        assert_eq!(row.current_position(), Some(position));
    }

    list.scroll_to_top();
    assert!(
        list.layout().unwrap().is_empty(),
        "Cached preview should be reused"
    );
}
