//! Krus API - Client for the remote collection service.
//!
//! Defines the [`RemoteApi`] contract the rest of the client programs
//! against, an HTTP implementation over reqwest, and an in-memory mock
//! service for tests and local development.

pub mod client;
pub mod config;
pub mod error;
pub mod http;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-exports for convenience
pub use client::RemoteApi;
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use http::HttpApi;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockApi, MOCK_TOKEN};
