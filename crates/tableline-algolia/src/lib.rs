//! tableline-algolia: Algolia REST client for the restaurant index
//!
//! Implements [`tableline_core::SearchIndex`] with chunked `/batch` uploads,
//! settings read/write, host failover and exponential backoff.

pub mod api;
mod client;
mod error;
mod hosts;

pub use client::{AlgoliaClient, ClientConfig, Credentials, DEFAULT_BATCH_SIZE, backoff_duration};
pub use error::AlgoliaError;
pub use hosts::{CallKind, Hosts};
