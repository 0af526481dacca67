//! # FarmMind Lite client core
//!
//! Client-side state and logic of the FarmMind Lite farming application:
//! crop estimates, irrigation planning, crowd-sourced market prices, the
//! produce marketplace, a seasonal calendar, weather and the crop doctor.
//! A UI shell binds to the view-models; the `farmmind` binary drives the
//! same view-models from a terminal.
//!
//! ## Architecture
//!
//! - [`api`] / [`models`]: Wire types of the REST contract
//! - [`backend`]: Async traits per resource group, with HTTP and in-memory implementations
//! - [`session`]: Client-asserted session record, observers and the route guard
//! - [`views`]: One view-model per page, each with an explicit `refresh()`
//! - [`estimator`]: Pure profit, risk and water calculations
//! - [`share`]: Share-link text and export file names
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use farmmind_lite::backend::BackendFactory;
//! use farmmind_lite::config::ClientConfig;
//! use farmmind_lite::session::{FileStorage, SessionContext};
//! use farmmind_lite::views::{MarketPricesView, Refresh};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::load(None)?;
//! let backend = BackendFactory::create(&config)?;
//! let session = Arc::new(SessionContext::new(Arc::new(FileStorage::new(&config.storage.dir))));
//!
//! let mut prices = MarketPricesView::new(backend, session);
//! prices.refresh().await?;
//! for row in prices.visible() {
//!     println!("{} / {}: {}", row.crop, row.region, row.retail_price);
//! }
//! # Ok(())
//! # }
//! ```

// ApiError carries a structured context on every variant.
#![allow(clippy::result_large_err)]

pub mod backend;
pub mod config;
pub mod estimator;
pub mod models;
pub mod session;
pub mod share;
pub mod views;

/// Wire types, under the name the REST contract uses.
pub use models as api;

pub use backend::{ApiError, ApiResult, BackendFactory, BackendType, FullBackend};
pub use config::ClientConfig;
pub use models::Session;
pub use session::SessionContext;
