//! Backend trait definitions.
//!
//! One trait per resource group, so a view-model can depend on exactly the
//! capability it uses and tests can swap implementations freely.
//!
//! # Module Organization
//!
//! - [`catalog`]: Crops, estimates and the health check
//! - [`irrigation`]: Schedule generation and saved schedules
//! - [`prices`]: Market price reports
//! - [`marketplace`]: Listings, watchlist, demands, reviews and analytics
//! - [`account`]: Registration and login
//! - [`calendar`]: Monthly events
//! - [`weather`]: Current conditions and forecast
//! - [`doctor`]: Disease analysis of crop photos
//!
//! # Convenience Trait Bound
//!
//! Code that needs every capability takes the [`FullBackend`] bound:
//!
//! ```ignore
//! async fn landing<B: FullBackend + ?Sized>(backend: &B) -> ApiResult<usize> {
//!     let crops = backend.list_crops().await?;
//!     let prices = backend.list_prices().await?;
//!     Ok(crops.len() + prices.len())
//! }
//! ```

pub mod account;
pub mod calendar;
pub mod catalog;
pub mod doctor;
pub mod irrigation;
pub mod marketplace;
pub mod prices;
pub mod weather;

pub use account::AccountBackend;
pub use calendar::CalendarBackend;
pub use catalog::CatalogBackend;
pub use doctor::DoctorBackend;
pub use irrigation::IrrigationBackend;
pub use marketplace::MarketplaceBackend;
pub use prices::PriceBackend;
pub use weather::WeatherBackend;

/// Composite trait bound for a complete backend implementation.
///
/// Automatically implemented for any type that implements every backend
/// trait. `Arc<dyn FullBackend>` is what the factory hands out.
pub trait FullBackend:
    CatalogBackend
    + IrrigationBackend
    + PriceBackend
    + MarketplaceBackend
    + AccountBackend
    + CalendarBackend
    + WeatherBackend
    + DoctorBackend
{
}

// Blanket implementation: any type implementing all eight traits is a FullBackend
impl<T> FullBackend for T where
    T: CatalogBackend
        + IrrigationBackend
        + PriceBackend
        + MarketplaceBackend
        + AccountBackend
        + CalendarBackend
        + WeatherBackend
        + DoctorBackend
{
}
