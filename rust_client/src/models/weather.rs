//! Current conditions and daily forecast for a location.

use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: i32,
    #[serde(default)]
    pub pressure: i32,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub uv_index: f64,
    pub condition: String,
    #[serde(default)]
    pub sunrise: String,
    #[serde(default)]
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition: String,
    /// Highest precipitation probability of the day, in percent.
    #[serde(default)]
    pub rain_chance: u8,
}

impl DailyForecast {
    /// Rain likelier than not; irrigation can usually be postponed.
    pub fn expects_rain(&self) -> bool {
        self.rain_chance >= 50 || matches!(self.condition.as_str(), "Rain" | "Thunderstorm")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily: Vec<DailyForecast>,
}
