//! Session-level orchestration.
//!
//! # Responsibility
//! - Wire stores and the sync bridge into one editing session.
//! - Keep FFI/CLI layers decoupled from store construction details.

pub mod session;
