//! Binding tickets for validating asynchronous row updates.
//!
//! A ticket is captured when an async request is issued for a row. When the
//! result arrives the row compares it with its current ticket; a mismatch
//! means the row was rebound in the meantime and the result is dropped.

use crate::model::RowPosition;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Bind generation. Every bind draws a fresh value from a process-wide
/// counter, so two bindings never share a generation even across row
/// instances. The default (0) is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// A generation no earlier binding has used.
    pub fn fresh() -> Self {
        Self(NEXT_GENERATION.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Position and bind generation a row had when a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingTicket {
    position: RowPosition,
    generation: Generation,
}

impl BindingTicket {
    /// Create a ticket.
    pub fn new(position: RowPosition, generation: Generation) -> Self {
        Self {
            position,
            generation,
        }
    }

    /// Position the request was issued for.
    pub fn position(&self) -> RowPosition {
        self.position
    }

    /// Bind generation the request was issued for.
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Result of offering asynchronously produced content to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The row still showed the requested content; the update was applied.
    Applied,
    /// The row had been rebound (or no row showed the position); nothing changed.
    Discarded,
}

impl FillOutcome {
    /// Whether the update was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, FillOutcome::Applied)
    }
}
