//! Row pool: factories keyed by reuse identifier plus idle rows per identifier.

use crate::row::{
    AuthorRowView, ListRow, MessageRowView, AUTHOR_ROW_IDENTIFIER, MESSAGE_ROW_IDENTIFIER,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// Default number of idle rows kept per identifier.
pub const DEFAULT_MAX_IDLE: usize = 32;

/// Builds a fresh, unbound row.
pub type RowFactory = fn() -> Box<dyn ListRow>;

/// Errors raised by [`RowPool`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No factory was registered for the identifier.
    #[error("No row factory registered for identifier {0:?}")]
    Unregistered(String),
}

/// Pool of reusable rows.
#[derive(Debug)]
pub struct RowPool {
    factories: HashMap<&'static str, RowFactory>,
    idle: HashMap<&'static str, Vec<Box<dyn ListRow>>>,
    max_idle: usize,
    created: usize,
}

impl Default for RowPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl RowPool {
    /// Empty pool keeping at most `max_idle` idle rows per identifier.
    pub fn new(max_idle: usize) -> Self {
        Self {
            factories: HashMap::new(),
            idle: HashMap::new(),
            max_idle,
            created: 0,
        }
    }

    /// Pool with the lead and grouped message rows registered.
    pub fn for_conversation() -> Self {
        let mut pool = Self::default();
        pool.register(AUTHOR_ROW_IDENTIFIER, author_row);
        pool.register(MESSAGE_ROW_IDENTIFIER, message_row);
        pool
    }

    /// Register (or replace) the factory for `identifier`.
    pub fn register(&mut self, identifier: &'static str, factory: RowFactory) {
        self.factories.insert(identifier, factory);
    }

    /// Take an idle row for `identifier`, or build one.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Unregistered`] if no factory is known for `identifier`.
    pub fn dequeue(&mut self, identifier: &str) -> Result<Box<dyn ListRow>, PoolError> {
        if let Some(row) = self.idle.get_mut(identifier).and_then(Vec::pop) {
            trace!(identifier, "Reusing pooled row");
            return Ok(row);
        }
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| PoolError::Unregistered(identifier.to_string()))?;
        self.created += 1;
        trace!(identifier, created = self.created, "Building new row");
        Ok(factory())
    }

    /// Return a row that left the screen.
    ///
    /// Rows beyond the idle cap are dropped.
    pub fn recycle(&mut self, mut row: Box<dyn ListRow>) {
        row.prepare_for_reuse();
        let idle = self.idle.entry(row.reuse_identifier()).or_default();
        if idle.len() < self.max_idle {
            idle.push(row);
        }
    }

    /// Idle rows waiting under `identifier`.
    pub fn idle_count(&self, identifier: &str) -> usize {
        self.idle.get(identifier).map_or(0, Vec::len)
    }

    /// Rows built by factories so far.
    pub fn created(&self) -> usize {
        self.created
    }
}

fn author_row() -> Box<dyn ListRow> {
    Box::new(AuthorRowView::new())
}

fn message_row() -> Box<dyn ListRow> {
    Box::new(MessageRowView::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowPosition;

    #[test]
    fn dequeue_unregistered_identifier_fails() {
        let mut pool = RowPool::default();
        assert_eq!(
            pool.dequeue("Nope").unwrap_err(),
            PoolError::Unregistered("Nope".to_string())
        );
    }

    #[test]
    fn dequeue_builds_row_of_requested_kind() {
        let mut pool = RowPool::for_conversation();
        let row = pool.dequeue(MESSAGE_ROW_IDENTIFIER).unwrap();
        assert_eq!(row.reuse_identifier(), MESSAGE_ROW_IDENTIFIER);
        assert!(!row.is_bound());
        assert_eq!(pool.created(), 1);
    }

    #[test]
    fn recycled_row_is_reused() {
        let mut pool = RowPool::for_conversation();
        let mut row = pool.dequeue(MESSAGE_ROW_IDENTIFIER).unwrap();
        let message = crate::model::ChatMessage::new(
            crate::model::MessageId::new("1").unwrap(),
            "alice",
            "hi",
            chrono::Utc::now(),
        );
        row.bind_message(&message, RowPosition::new(0, 0));
        pool.recycle(row);
        assert_eq!(pool.idle_count(MESSAGE_ROW_IDENTIFIER), 1);

        let again = pool.dequeue(MESSAGE_ROW_IDENTIFIER).unwrap();
        assert!(again.is_bound(), "Reused row keeps its bound flag");
        assert_eq!(pool.created(), 1, "No new row was built");
        assert_eq!(pool.idle_count(MESSAGE_ROW_IDENTIFIER), 0);
    }

    #[test]
    fn rows_return_to_their_own_identifier() {
        let mut pool = RowPool::for_conversation();
        let lead = pool.dequeue(AUTHOR_ROW_IDENTIFIER).unwrap();
        pool.recycle(lead);
        assert_eq!(pool.idle_count(AUTHOR_ROW_IDENTIFIER), 1);
        assert_eq!(pool.idle_count(MESSAGE_ROW_IDENTIFIER), 0);
    }

    #[test]
    fn idle_cap_drops_excess_rows() {
        let mut pool = RowPool::new(1);
        pool.register(MESSAGE_ROW_IDENTIFIER, message_row);
        let a = pool.dequeue(MESSAGE_ROW_IDENTIFIER).unwrap();
        let b = pool.dequeue(MESSAGE_ROW_IDENTIFIER).unwrap();
        pool.recycle(a);
        pool.recycle(b);
        assert_eq!(pool.idle_count(MESSAGE_ROW_IDENTIFIER), 1);
    }

    #[test]
    fn register_replaces_factory() {
        let mut pool = RowPool::default();
        pool.register("row", message_row);
        pool.register("row", author_row);
        let row = pool.dequeue("row").unwrap();
        assert_eq!(row.reuse_identifier(), AUTHOR_ROW_IDENTIFIER);
    }
}
