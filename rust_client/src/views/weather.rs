//! Weather dashboard.

use async_trait::async_trait;
use std::sync::Arc;

use super::state::{Refresh, ViewState};
use crate::backend::{ApiResult, FullBackend};
use crate::models::{CurrentWeather, DailyForecast};

/// Field advice derived from current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FarmingTip {
    WarmAndHumid,
    RainExpected,
    FrostRisk,
    DryWeekAhead,
}

pub fn farming_tips(weather: &CurrentWeather) -> Vec<FarmingTip> {
    let mut tips = Vec::new();
    if weather.humidity > 70 && weather.temp > 25.0 {
        tips.push(FarmingTip::WarmAndHumid);
    }
    if weather.condition.contains("Rain") {
        tips.push(FarmingTip::RainExpected);
    }
    if weather.temp < 5.0 {
        tips.push(FarmingTip::FrostRisk);
    }
    if weather.humidity < 40 {
        tips.push(FarmingTip::DryWeekAhead);
    }
    tips
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub daily: Vec<DailyForecast>,
}

impl WeatherReport {
    pub fn tips(&self) -> Vec<FarmingTip> {
        farming_tips(&self.current)
    }
}

pub struct WeatherView {
    backend: Arc<dyn FullBackend>,
    pub location: String,
    pub report: ViewState<WeatherReport>,
}

impl WeatherView {
    pub fn new(backend: Arc<dyn FullBackend>, location: impl Into<String>) -> Self {
        Self {
            backend,
            location: location.into(),
            report: ViewState::Idle,
        }
    }

    pub async fn set_location(&mut self, location: &str) -> ApiResult<()> {
        self.location = location.trim().to_string();
        self.refresh().await
    }

    async fn load(&self) -> ApiResult<WeatherReport> {
        let current = self.backend.current_weather(&self.location).await?;
        let forecast = self.backend.forecast(&self.location).await?;
        Ok(WeatherReport {
            current,
            daily: forecast.daily,
        })
    }
}

#[async_trait]
impl Refresh for WeatherView {
    /// Current conditions and the forecast; either failing fails both.
    async fn refresh(&mut self) -> ApiResult<()> {
        self.report = ViewState::Loading;
        match self.load().await {
            Ok(report) => {
                self.report = ViewState::Ready(report);
                Ok(())
            }
            Err(e) => {
                self.report = ViewState::failed(&e);
                Err(e)
            }
        }
    }
}
