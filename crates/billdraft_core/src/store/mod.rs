//! Observable in-process stores.
//!
//! # Responsibility
//! - Hold the document under edit (`document`) and the live presentation
//!   tokens (`presentation`) behind mutators that notify observers.
//! - Provide the turn scheduler used to run work after all synchronous
//!   observers of a mutation have finished (`turn`).
//!
//! # Invariants
//! - All writes go through store mutators; there is no raw field access.
//! - A mutation that leaves state unchanged performs no write and emits no
//!   notification.
//! - Store borrows are released before observers run, so observers may call
//!   back into any store.
//! - Single-threaded: handles are `Rc`-based and deliberately `!Send`.

pub mod document;
pub mod observer;
pub mod presentation;
pub mod turn;
