//! Backend implementations.
//!
//! - [`HttpBackend`]: the REST API over reqwest
//! - [`LocalBackend`]: in-memory emulation of the server, for tests and offline use

pub mod http;
pub mod local;

pub use http::HttpBackend;
pub use local::LocalBackend;
