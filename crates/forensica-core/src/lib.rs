//! Core types and the scoring engine for the Forensica authenticity service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend and the request boundary depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod error;
pub mod feedback;
pub mod modality;
pub mod scoring;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
