//! Synchronization between saved profile presentation and live tokens.
//!
//! # Responsibility
//! - Apply the active profile's saved override when the profile changes.
//! - Persist live token edits back into the active profile.
//!
//! # Invariants
//! - A write caused by applying a profile is never echoed back into it.
//! - Nothing in this module raises; failures are logged and dropped.

pub mod bridge;
