//! Reusable list rows.
//!
//! Rows are plain view models that render into a `ratatui` buffer. A list
//! container never knows concrete row types: it holds `Box<dyn ListRow>`
//! values built by factories registered under a reuse identifier (see
//! [`crate::list::RowPool`]).
//!
//! # Module Structure
//!
//! - `message_row`: MessageRowView - body-only row for grouped messages
//! - `author_row`: AuthorRowView - lead row with author header
//! - `binding`: BindingTicket / FillOutcome - stale async update detection
//! - `metrics`: RowMetrics - process-wide sizing values and height estimation
//! - `wrap`: word wrapping shared by sizing and drawing

pub mod author_row;
pub mod binding;
pub mod message_row;
pub mod metrics;
pub mod wrap;

pub use author_row::{AuthorRowView, AUTHOR_ROW_IDENTIFIER};
pub use binding::{BindingTicket, FillOutcome, Generation};
pub use message_row::{MessageRowView, MESSAGE_ROW_IDENTIFIER};
pub use metrics::{
    MetricsError, RowMetrics, DEFAULT_FONT_SIZE, DEFAULT_LINE_SPACING, MINIMUM_ROW_HEIGHT,
};

use crate::model::{ChatMessage, RowPosition};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use std::fmt::Debug;

/// Columns reserved left of message bodies so grouped bodies line up under
/// the lead row's body.
pub const BODY_INDENT: u16 = 2;

/// Capabilities a container needs from any row type.
pub trait ListRow: Debug {
    /// Identifier of the pool this row returns to.
    fn reuse_identifier(&self) -> &'static str;

    /// Show `message` at `position`, replacing whatever was bound before.
    fn bind_message(&mut self, message: &ChatMessage, position: RowPosition);

    /// Position currently shown; `None` until the first bind.
    fn current_position(&self) -> Option<RowPosition>;

    /// Whether the row was ever bound.
    fn is_bound(&self) -> bool;

    /// Ticket identifying the current binding, for async requests.
    fn ticket(&self) -> Option<BindingTicket>;

    /// Apply async content if `ticket` still matches the current binding.
    fn apply_fill(&mut self, ticket: BindingTicket, text: String) -> FillOutcome;

    /// Height in terminal lines when laid out `columns` wide.
    fn rows(&self, columns: u16) -> u16;

    /// Draw the row into `area`.
    fn render(&self, area: Rect, buf: &mut Buffer);

    /// Called when the row goes back to the pool.
    fn prepare_for_reuse(&mut self) {}
}

/// Text shown for an attachment, before or after its preview arrived.
pub(crate) fn attachment_line(name: &str, preview: Option<&str>) -> String {
    match preview {
        Some(preview) => format!("[{name}] {preview}"),
        None => format!("[{name}] loading preview..."),
    }
}

pub(crate) fn attachment_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}
