//! Core types and services for the Savory board.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the domain model, the [`store::BoardStore`] persistence contract, and the
//! decision logic layered on top of it: identity resolution, session issuing,
//! the authentication gate, the board service and page-window arithmetic.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod board;
pub mod error;
pub mod gate;
pub mod identity;
pub mod memory;
pub mod pagination;
pub mod post;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
