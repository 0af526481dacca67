//! Weather lookups.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{CurrentWeather, Forecast};

#[async_trait]
pub trait WeatherBackend: Send + Sync {
    async fn current_weather(&self, location: &str) -> ApiResult<CurrentWeather>;

    /// Daily forecast, aggregated by the server from 3-hourly data.
    async fn forecast(&self, location: &str) -> ApiResult<Forecast>;
}
