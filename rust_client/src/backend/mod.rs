//! Backend boundary.
//!
//! ```text
//!  view-model ──► FullBackend (traits) ──┬──► HttpBackend ──► REST API
//!                                        └──► LocalBackend (in-memory rules)
//!                    │
//!                    ▼
//!            Result<T, ApiError>
//! ```
//!
//! - [`traits`]: one async trait per resource group
//! - [`clients`]: the two implementations
//! - [`response`]: the single place raw bodies are decoded
//! - [`error`]: [`ApiError`] and its structured context
//! - [`factory`]: construction from [`ClientConfig`](crate::config::ClientConfig)

pub mod clients;
pub mod error;
pub mod factory;
pub mod response;
pub mod traits;

pub use clients::{HttpBackend, LocalBackend};
pub use error::{ApiError, ApiResult, ErrorContext};
pub use factory::{BackendFactory, BackendType};
pub use response::{parse_json_list, parse_json_response};
pub use traits::*;
