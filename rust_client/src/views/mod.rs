//! Page view-models.
//!
//! Each page owns its state as [`ViewState`] values and talks to the server
//! only through [`FullBackend`](crate::backend::FullBackend). Mutations are
//! pessimistic: send, then re-fetch.

pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod doctor;
pub mod estimator;
pub mod irrigation;
pub mod marketplace;
pub mod prices;
pub mod state;
pub mod weather;

pub use auth::{AuthView, SignedIn};
pub use calendar::{CalendarView, MonthSummary, EVENT_FILTERS};
pub use catalog::CropCatalog;
pub use doctor::DoctorView;
pub use estimator::{EstimateResult, EstimatorForm, EstimatorView};
pub use irrigation::{IrrigationView, SchedulePreview};
pub use marketplace::MarketplaceView;
pub use prices::{crop_category, MarketPricesView, CATEGORIES};
pub use state::{Refresh, ViewState};
pub use weather::{farming_tips, FarmingTip, WeatherReport, WeatherView};
