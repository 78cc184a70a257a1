//! Replication cursors and incremental filtering
//!
//! The core never persists state itself; a prior cursor value arrives from
//! the outer protocol layer at the start of a run and is only compared
//! against coerced record values, never mutated.

mod cursor;
mod filter;

pub use cursor::CursorValue;
pub use filter::IncrementalFilter;
