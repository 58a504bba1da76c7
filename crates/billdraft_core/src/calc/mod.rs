//! Pure computations over the document model.
//!
//! # Responsibility
//! - Totals breakdown (`totals`) on exact decimal arithmetic (`money`).
//! - Footer block visibility rules (`footer`).
//!
//! # Invariants
//! - No hidden state and no I/O; every function here is safe to call on each
//!   keystroke and returns identical output for identical input.

pub mod footer;
pub mod money;
pub mod totals;
