//! Crop catalogue and yield/income estimates.

use serde::{Deserialize, Serialize};

use super::macros::wire_ids;

wire_ids! { CropId }

/// Crop type as listed by `GET /api/crops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: String,
}

/// Server-side estimate for a crop over an area given in hectares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub crop_name: String,
    pub min_yield_kg: f64,
    pub max_yield_kg: f64,
    pub min_income_usd: f64,
    pub max_income_usd: f64,
    pub avg_price_per_kg: f64,
}
