//! Lead row: author header followed by the message body.
//!
//! The body is a [`MessageRowView`]; this row only adds the header, so
//! binding, tickets and previews behave exactly as for grouped rows.

use crate::model::{ChatMessage, RowPosition};
use crate::row::binding::{BindingTicket, FillOutcome};
use crate::row::message_row::MessageRowView;
use crate::row::metrics::RowMetrics;
use crate::row::{ListRow, BODY_INDENT};
use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

/// Reuse identifier under which lead rows are pooled.
pub const AUTHOR_ROW_IDENTIFIER: &str = "ChatMessageRow";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    actor: String,
    timestamp: DateTime<Utc>,
}

/// A reusable row showing the first message of a group.
///
/// System messages are drawn without header, dimmed.
#[derive(Debug, Clone, Default)]
pub struct AuthorRowView {
    header: Option<Header>,
    body: MessageRowView,
}

impl AuthorRowView {
    /// Create an unbound row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Author shown in the header, if the bound message has one.
    pub fn actor(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.actor.as_str())
    }

    /// The body part of the row.
    pub fn body(&self) -> &MessageRowView {
        &self.body
    }

    /// Displayed body text.
    pub fn body_text(&self) -> &str {
        self.body.body_text()
    }

    /// Asynchronously filled attachment preview, if it arrived.
    pub fn preview(&self) -> Option<&str> {
        self.body.preview()
    }
}

impl ListRow for AuthorRowView {
    fn reuse_identifier(&self) -> &'static str {
        AUTHOR_ROW_IDENTIFIER
    }

    fn bind_message(&mut self, message: &ChatMessage, position: RowPosition) {
        self.header = (!message.is_system()).then(|| Header {
            actor: message.actor().to_owned(),
            timestamp: message.timestamp(),
        });
        self.body.bind_message(message, position);
    }

    fn current_position(&self) -> Option<RowPosition> {
        self.body.current_position()
    }

    fn is_bound(&self) -> bool {
        self.body.is_bound()
    }

    fn ticket(&self) -> Option<BindingTicket> {
        self.body.ticket()
    }

    fn apply_fill(&mut self, ticket: BindingTicket, text: String) -> FillOutcome {
        self.body.apply_fill(ticket, text)
    }

    fn rows(&self, columns: u16) -> u16 {
        let metrics = RowMetrics::current();
        let lines = usize::from(self.header.is_some()) + self.body.content_lines(columns).len();
        metrics.terminal_rows(metrics.height_for_lines(lines))
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        Widget::render(self, area, buf);
    }

    fn prepare_for_reuse(&mut self) {
        self.body.prepare_for_reuse();
    }
}

impl Widget for &AuthorRowView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.body.is_bound() || area.width <= BODY_INDENT {
            return;
        }

        let Some(header) = &self.header else {
            Widget::render(&self.body, area, buf);
            buf.set_style(
                area,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            return;
        };

        let [header_area, body_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
        Line::from(vec![
            Span::styled(
                header.actor.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                header.timestamp.format("%H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .render(header_area, buf);
        Widget::render(&self.body, body_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageId;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn message(body: &str) -> ChatMessage {
        // 2024-03-01T09:05:00Z
        let ts = Utc.timestamp_opt(1_709_283_900, 0).single().unwrap();
        ChatMessage::new(MessageId::new("m1").unwrap(), "alice", body, ts)
    }

    #[test]
    fn new_row_is_unbound() {
        let row = AuthorRowView::new();
        assert!(!row.is_bound());
        assert_eq!(row.current_position(), None);
        assert_eq!(row.ticket(), None);
    }

    #[test]
    fn bind_message_sets_header_and_position() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("hello"), RowPosition::new(0, 2));
        assert!(row.is_bound());
        assert_eq!(row.actor(), Some("alice"));
        assert_eq!(row.body_text(), "hello");
        assert_eq!(row.current_position(), Some(RowPosition::new(0, 2)));
    }

    #[test]
    fn system_message_has_no_header() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("alice joined").as_system(), RowPosition::new(0, 0));
        assert_eq!(row.actor(), None);
    }

    #[test]
    fn header_adds_a_line() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("hi"), RowPosition::new(0, 0));
        // header + one body line = 40 layout units = 2 terminal lines
        assert_eq!(row.rows(40), 2);

        row.bind_message(&message("one\ntwo"), RowPosition::new(0, 1));
        assert_eq!(row.rows(40), 3);
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("a").with_attachment("f.png"), RowPosition::new(0, 0));
        let ticket = row.ticket().unwrap();
        row.bind_message(&message("b").with_attachment("g.png"), RowPosition::new(0, 5));

        assert_eq!(row.apply_fill(ticket, "old".into()), FillOutcome::Discarded);
        assert_eq!(row.preview(), None);
    }

    #[test]
    fn body_row_holds_text_and_position_together() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("first"), RowPosition::new(0, 0));
        row.bind_message(&message("second").as_system(), RowPosition::new(1, 4));

        assert_eq!(row.body().body_text(), "second");
        assert_eq!(row.body().current_position(), Some(RowPosition::new(1, 4)));
        assert_eq!(row.ticket(), row.body().ticket());
    }

    #[test]
    fn fill_lands_in_body_and_pooling_invalidates_it() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("a").with_attachment("f.png"), RowPosition::new(0, 0));
        let ticket = row.ticket().unwrap();

        assert_eq!(row.apply_fill(ticket, "image".into()), FillOutcome::Applied);
        assert_eq!(row.preview(), Some("image"));
        assert_eq!(row.body().preview(), Some("image"));

        row.prepare_for_reuse();
        assert_eq!(row.preview(), None);
        assert_eq!(row.apply_fill(ticket, "late".into()), FillOutcome::Discarded);
    }

    #[test]
    fn system_message_renders_body_without_header() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("alice joined").as_system(), RowPosition::new(0, 0));

        let mut terminal = Terminal::new(TestBackend::new(20, 2)).unwrap();
        terminal
            .draw(|frame| ListRow::render(&row, frame.area(), frame.buffer_mut()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let first: String = (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol())
            .collect();
        assert_eq!(first.trim_end(), "  alice joined");
        assert_eq!(buffer[(2, 0)].fg, Color::DarkGray);
    }

    #[test]
    fn renders_header_then_indented_body() {
        let mut row = AuthorRowView::new();
        row.bind_message(&message("hello there"), RowPosition::new(0, 0));

        let mut terminal = Terminal::new(TestBackend::new(20, 2)).unwrap();
        terminal
            .draw(|frame| ListRow::render(&row, frame.area(), frame.buffer_mut()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let line = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        };
        assert_eq!(line(0).trim_end(), "alice  09:05");
        assert_eq!(line(1).trim_end(), "  hello there");
    }
}
