//! Grouped message row: the body of a message that continues its author's group.
//!
//! Instances are pooled and rebound as the list scrolls. The row remembers
//! which position it shows so late asynchronous results can be checked
//! against it before they touch the row.

use crate::model::{ChatMessage, RowPosition};
use crate::row::binding::{BindingTicket, FillOutcome, Generation};
use crate::row::metrics::RowMetrics;
use crate::row::wrap::wrap_text;
use crate::row::{attachment_line, ListRow, BODY_INDENT};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use tracing::debug;

/// Reuse identifier under which grouped message rows are pooled.
pub const MESSAGE_ROW_IDENTIFIER: &str = "GroupedChatMessageRow";

/// A reusable row showing one grouped chat message.
#[derive(Debug, Clone, Default)]
pub struct MessageRowView {
    body: String,
    position: Option<RowPosition>,
    bound: bool,
    generation: Generation,
    attachment: Option<String>,
    preview: Option<String>,
}

impl MessageRowView {
    /// Create an unbound row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` for `position`.
    ///
    /// Text and position change together, and any attachment state of the
    /// previous binding is dropped. Rebinding an already bound row is fine.
    pub fn bind(&mut self, text: impl Into<String>, position: RowPosition) {
        self.body = text.into();
        self.position = Some(position);
        self.bound = true;
        self.generation = Generation::fresh();
        self.attachment = None;
        self.preview = None;
    }

    /// Position this row currently shows; `None` until the first bind.
    ///
    /// Async fill logic compares this with the position its request was
    /// issued for and drops the result on mismatch.
    pub fn current_position(&self) -> Option<RowPosition> {
        self.position
    }

    /// Whether the row was ever bound.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Displayed body text.
    pub fn body_text(&self) -> &str {
        &self.body
    }

    /// Attachment name of the current binding.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    /// Asynchronously filled attachment preview, if it arrived.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Font size external layout uses to estimate row heights.
    pub fn default_font_size() -> f32 {
        RowMetrics::current().default_font_size()
    }

    /// Floor height of any row.
    pub fn minimum_row_height() -> f32 {
        RowMetrics::current().minimum_row_height()
    }

    /// Ticket for an async request issued against the current binding.
    pub fn ticket(&self) -> Option<BindingTicket> {
        self.position
            .map(|position| BindingTicket::new(position, self.generation))
    }

    /// Apply an attachment preview if `ticket` still matches this row.
    pub fn apply_fill(&mut self, ticket: BindingTicket, preview: impl Into<String>) -> FillOutcome {
        if self.ticket() != Some(ticket) {
            debug!(
                requested = %ticket.position(),
                current = ?self.position.map(|p| p.to_string()),
                "Discarding stale preview for rebound row"
            );
            return FillOutcome::Discarded;
        }
        self.preview = Some(preview.into());
        FillOutcome::Applied
    }

    /// Wrapped content lines for a row `columns` wide.
    pub fn content_lines(&self, columns: u16) -> Vec<String> {
        let width = usize::from(columns.saturating_sub(BODY_INDENT));
        let mut lines = wrap_text(&self.body, width);
        if let Some(name) = &self.attachment {
            lines.extend(wrap_text(
                &attachment_line(name, self.preview.as_deref()),
                width,
            ));
        }
        lines
    }

    /// Row height in layout units; never below the minimum row height.
    pub fn height(&self, columns: u16) -> f32 {
        RowMetrics::current().height_for_lines(self.content_lines(columns).len())
    }
}

impl ListRow for MessageRowView {
    fn reuse_identifier(&self) -> &'static str {
        MESSAGE_ROW_IDENTIFIER
    }

    fn bind_message(&mut self, message: &ChatMessage, position: RowPosition) {
        self.bind(message.body(), position);
        self.attachment = message.attachment().map(str::to_owned);
    }

    fn current_position(&self) -> Option<RowPosition> {
        self.position
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn ticket(&self) -> Option<BindingTicket> {
        MessageRowView::ticket(self)
    }

    fn apply_fill(&mut self, ticket: BindingTicket, text: String) -> FillOutcome {
        MessageRowView::apply_fill(self, ticket, text)
    }

    fn rows(&self, columns: u16) -> u16 {
        RowMetrics::current().terminal_rows(self.height(columns))
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        Widget::render(self, area, buf);
    }

    fn prepare_for_reuse(&mut self) {
        // Outstanding tickets must not match a pooled row.
        self.generation = Generation::fresh();
        self.preview = None;
    }
}

impl Widget for &MessageRowView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.bound || area.width <= BODY_INDENT {
            return;
        }
        let inner = Rect {
            x: area.x + BODY_INDENT,
            width: area.width - BODY_INDENT,
            ..area
        };

        let body_lines = wrap_text(&self.body, usize::from(inner.width));
        let mut lines: Vec<Line> = body_lines.into_iter().map(Line::from).collect();
        if let Some(name) = &self.attachment {
            let text = attachment_line(name, self.preview.as_deref());
            lines.extend(
                wrap_text(&text, usize::from(inner.width))
                    .into_iter()
                    .map(|l| Line::styled(l, crate::row::attachment_style())),
            );
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
#[path = "message_row_tests.rs"]
mod tests;
