//! chatrow
//!
//! Terminal viewer for chat transcripts, built around recyclable message
//! rows. Rows are pooled by reuse identifier, rebound to new positions as
//! the list scrolls, and validate asynchronous attachment previews against
//! their current binding before applying them.
//!
//! Pure core (`model`, `parser`, `row`, `list`) with an impure shell
//! (`source`, `view`, `logging`).

pub mod config;
pub mod list;
pub mod logging;
pub mod model;
pub mod parser;
pub mod row;
pub mod source;
pub mod view;
