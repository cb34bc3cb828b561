//! Recycling list container for a grouped conversation.
//!
//! Only rows intersecting the viewport exist as row instances. Rows that
//! scroll out are handed back to the [`RowPool`] and later rebound to other
//! positions. Layout is a linear scan over estimated heights.
//!
//! # Module Structure
//!
//! - `pool`: RowPool - factory registration and idle rows
//! - `fill`: PreviewFetcher - background attachment previews

pub mod fill;
pub mod pool;

pub use fill::{DelayedPreviewSource, FillRequest, FillResult, PreviewFetcher, PreviewSource};
pub use pool::{PoolError, RowFactory, RowPool};

use crate::model::{Conversation, ConversationRow, MessageId, RowKind, RowPosition};
use crate::row::wrap::wrap_text;
use crate::row::{
    attachment_line, FillOutcome, ListRow, RowMetrics, AUTHOR_ROW_IDENTIFIER, BODY_INDENT,
    MESSAGE_ROW_IDENTIFIER,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

/// Height of a day separator in terminal lines.
pub const SECTION_HEADER_HEIGHT: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    SectionHeader(usize),
    Row(RowPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    kind: SlotKind,
    top: usize,
    height: u16,
}

impl Slot {
    fn bottom(&self) -> usize {
        self.top + usize::from(self.height)
    }
}

/// Estimated height in terminal lines of `entry` laid out `columns` wide.
///
/// Matches what the row types report once bound.
pub fn estimate_rows(entry: &ConversationRow, preview: Option<&str>, columns: u16) -> u16 {
    let message = entry.message();
    let width = usize::from(columns.saturating_sub(BODY_INDENT));
    let header = usize::from(entry.kind() == RowKind::Lead && !message.is_system());
    let attachment = message.attachment().map_or(0, |name| {
        wrap_text(&attachment_line(name, preview), width).len()
    });
    let lines = header + wrap_text(message.body(), width).len() + attachment;

    let metrics = RowMetrics::current();
    metrics.terminal_rows(metrics.height_for_lines(lines))
}

/// Scrollable, recycling list over a [`Conversation`].
#[derive(Debug)]
pub struct ConversationList {
    conversation: Conversation,
    pool: RowPool,
    visible: BTreeMap<RowPosition, Box<dyn ListRow>>,
    previews: HashMap<MessageId, String>,
    pending: HashSet<MessageId>,
    slots: Vec<Slot>,
    total_height: usize,
    scroll: usize,
    width: u16,
    height: u16,
}

impl ConversationList {
    /// List over `conversation`, drawing rows from `pool`.
    pub fn new(conversation: Conversation, pool: RowPool) -> Self {
        Self {
            conversation,
            pool,
            visible: BTreeMap::new(),
            previews: HashMap::new(),
            pending: HashSet::new(),
            slots: Vec::new(),
            total_height: 0,
            scroll: 0,
            width: 0,
            height: 0,
        }
    }

    /// The conversation being shown.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The row pool.
    pub fn pool(&self) -> &RowPool {
        &self.pool
    }

    /// Set the viewport size used by the next [`layout`](Self::layout).
    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Recompute slot heights, recycle rows that left the viewport and bind
    /// rows for positions that entered it.
    ///
    /// Returns the preview fetches visible rows still need: one per message,
    /// skipping previews that are cached or already in flight.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] if the pool lacks a factory for a row kind.
    pub fn layout(&mut self) -> Result<Vec<FillRequest>, PoolError> {
        self.rebuild_slots();
        self.scroll = self.scroll.min(self.max_scroll());

        let top = self.scroll;
        let bottom = top + usize::from(self.height);
        let wanted: Vec<RowPosition> = self
            .slots
            .iter()
            .filter(|slot| slot.top < bottom && slot.bottom() > top)
            .filter_map(|slot| match slot.kind {
                SlotKind::Row(position) => Some(position),
                SlotKind::SectionHeader(_) => None,
            })
            .collect();

        let gone: Vec<RowPosition> = self
            .visible
            .keys()
            .filter(|p| !wanted.contains(p))
            .copied()
            .collect();
        for position in gone {
            if let Some(row) = self.visible.remove(&position) {
                trace!(%position, "Recycling row");
                self.pool.recycle(row);
            }
        }

        let mut requests = Vec::new();
        for position in wanted {
            let Some(entry) = self.conversation.row(position) else {
                continue;
            };
            let message = entry.message();

            if !self.visible.contains_key(&position) {
                let identifier = match entry.kind() {
                    RowKind::Lead => AUTHOR_ROW_IDENTIFIER,
                    RowKind::Grouped => MESSAGE_ROW_IDENTIFIER,
                };
                let mut row = self.pool.dequeue(identifier)?;
                row.bind_message(message, position);
                if let (Some(text), Some(ticket)) = (self.previews.get(message.id()), row.ticket())
                {
                    row.apply_fill(ticket, text.clone());
                }
                self.visible.insert(position, row);
            }

            let Some(name) = message.attachment() else {
                continue;
            };
            if self.previews.contains_key(message.id()) {
                continue;
            }
            let ticket = self.visible.get(&position).and_then(|row| row.ticket());
            if let Some(ticket) = ticket {
                if self.pending.insert(message.id().clone()) {
                    requests.push(FillRequest {
                        ticket,
                        message_id: message.id().clone(),
                        attachment: name.to_string(),
                    });
                }
            }
        }

        Ok(requests)
    }

    /// Offer a finished preview fetch to the list.
    ///
    /// The preview is cached for its message either way. It is applied to
    /// the row at the ticket's position only if that row still holds the
    /// binding the request was issued for.
    pub fn apply_fill(&mut self, result: FillResult) -> FillOutcome {
        let FillResult {
            ticket,
            message_id,
            text,
        } = result;
        self.pending.remove(&message_id);
        self.previews.insert(message_id.clone(), text.clone());

        let outcome = match self.visible.get_mut(&ticket.position()) {
            Some(row) => row.apply_fill(ticket, text),
            None => FillOutcome::Discarded,
        };
        if !outcome.is_applied() {
            debug!(position = %ticket.position(), %message_id, "Preview arrived for a rebound row");
            self.refresh_cached_preview(&message_id);
        }
        outcome
    }

    /// Forget that a preview for `message_id` is in flight.
    ///
    /// Called when a request could not be started; the next
    /// [`layout`](Self::layout) asks for the preview again if the message is
    /// still visible.
    pub fn fetch_failed(&mut self, message_id: &MessageId) {
        self.pending.remove(message_id);
    }

    /// Rows currently bound, in display order.
    pub fn visible_positions(&self) -> Vec<RowPosition> {
        self.visible.keys().copied().collect()
    }

    /// The bound row showing `position`, if visible.
    pub fn visible_row(&self, position: RowPosition) -> Option<&dyn ListRow> {
        self.visible.get(&position).map(|row| &**row)
    }

    /// First visible line.
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Height of the whole list in terminal lines, as of the last layout.
    pub fn total_height(&self) -> usize {
        self.total_height
    }

    /// Scroll by `delta` lines (negative scrolls up).
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta.unsigned_abs())
        };
        self.scroll = target.min(self.max_scroll());
    }

    /// Scroll to the first line.
    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    /// Scroll so the last line is at the bottom of the viewport.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Whether the last line is visible.
    pub fn is_at_bottom(&self) -> bool {
        self.scroll >= self.max_scroll()
    }

    fn max_scroll(&self) -> usize {
        self.total_height.saturating_sub(usize::from(self.height))
    }

    fn rebuild_slots(&mut self) {
        self.slots.clear();
        let mut top = 0usize;

        for section in 0..self.conversation.section_count() {
            self.slots.push(Slot {
                kind: SlotKind::SectionHeader(section),
                top,
                height: SECTION_HEADER_HEIGHT,
            });
            top += usize::from(SECTION_HEADER_HEIGHT);

            for row in 0..self.conversation.row_count(section) {
                let position = RowPosition::new(section, row);
                let Some(entry) = self.conversation.row(position) else {
                    continue;
                };
                let preview = entry
                    .message()
                    .attachment()
                    .and_then(|_| self.previews.get(entry.message().id()))
                    .map(String::as_str);
                let height = estimate_rows(entry, preview, self.width);
                self.slots.push(Slot {
                    kind: SlotKind::Row(position),
                    top,
                    height,
                });
                top += usize::from(height);
            }
        }

        self.total_height = top;
    }

    fn refresh_cached_preview(&mut self, message_id: &MessageId) {
        let Some(text) = self.previews.get(message_id) else {
            return;
        };
        for (position, row) in self.visible.iter_mut() {
            let shows_message = self
                .conversation
                .row(*position)
                .is_some_and(|entry| entry.message().id() == message_id);
            if let (true, Some(ticket)) = (shows_message, row.ticket()) {
                row.apply_fill(ticket, text.clone());
            }
        }
    }
}

impl Widget for &ConversationList {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let top = self.scroll;
        let bottom = top + usize::from(area.height);

        for slot in self
            .slots
            .iter()
            .filter(|slot| slot.top < bottom && slot.bottom() > top)
        {
            match slot.kind {
                SlotKind::SectionHeader(section) => {
                    // Headers are one line tall, so intersecting means fully visible.
                    let y = area.y + (slot.top - top) as u16;
                    let label = self
                        .conversation
                        .section_date(section)
                        .map(|date| date.format("%A, %-d %B %Y").to_string())
                        .unwrap_or_default();
                    Line::styled(
                        format!("── {label} ──"),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::BOLD),
                    )
                    .centered()
                    .render(Rect::new(area.x, y, area.width, 1), buf);
                }
                SlotKind::Row(position) => {
                    let Some(row) = self.visible.get(&position) else {
                        continue;
                    };
                    let scratch_area = Rect::new(0, 0, area.width, slot.height);
                    let mut scratch = Buffer::empty(scratch_area);
                    row.render(scratch_area, &mut scratch);

                    for dy in 0..slot.height {
                        let line = slot.top + usize::from(dy);
                        if line < top || line >= bottom {
                            continue;
                        }
                        let y = area.y + (line - top) as u16;
                        for dx in 0..area.width {
                            buf[(area.x + dx, y)] = scratch[(dx, dy)].clone();
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
