//! Outbound HTTP transport for the channel adapter.
//!
//! Provides [`TransportClient`], the reqwest-backed implementation of
//! [`adapter_core::ForwardTransport`]. One client (and its connection pool)
//! is shared by every dispatch in the process.

mod client;

pub use client::{DEFAULT_POOL_MAX_IDLE_PER_HOST, TransportClient, TransportConfig};
