//! Row positions (index paths) within a sectioned list.

use std::fmt;

/// Location of a row inside a sectioned list: section index, then row index.
///
/// Ordering follows display order (section first, then row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowPosition {
    section: usize,
    row: usize,
}

impl RowPosition {
    /// Create a position from raw 0-based section and row indices.
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// 0-based section index.
    pub fn section(&self) -> usize {
        self.section
    }

    /// 0-based row index within the section.
    pub fn row(&self) -> usize {
        self.row
    }
}

impl From<(usize, usize)> for RowPosition {
    fn from((section, row): (usize, usize)) -> Self {
        Self::new(section, row)
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.section, self.row)
    }
}
