//! Layout dimension constants for TUI rendering.

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Lines moved by a single `j`/`k` press.
pub const LINE_SCROLL: isize = 1;

/// Fallback width when the terminal reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;
