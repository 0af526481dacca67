//! Profit estimator math.
//!
//! Pure functions over a server [`Estimate`]: area normalisation, cost
//! deduction, risk scaling and water needs. The order of operations is
//! fixed: costs come off the gross income first, the risk discount applies
//! to what is left.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Estimate;

/// Sotyk in one hectare.
pub const SOTYK_PER_HECTARE: f64 = 100.0;

/// Water need for crops missing from the table, in m³ per hectare.
pub const DEFAULT_WATER_M3_PER_HA: f64 = 5000.0;

/// Seasonal water need of the whole plot above which an estimate carries a
/// warning, in m³. The threshold is for the plot, not per hectare.
pub const HIGH_WATER_M3: f64 = 6000.0;

/// Risk level above which an estimate carries a warning, in percent.
pub const HIGH_RISK_LEVEL: f64 = 50.0;

/// Guard failures of the estimator inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimatorError {
    #[error("Area must be a number, got '{0}'")]
    NotANumber(String),

    #[error("Area must be finite")]
    NotFinite,

    #[error("Area must not be negative, got {0}")]
    Negative(f64),

    #[error("Unknown area unit: {0}")]
    UnknownUnit(String),
}

/// Unit the user entered the land size in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    Hectare,
    /// 100 m², the unit most smallholders think in.
    #[default]
    Sotyk,
}

impl FromStr for AreaUnit {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hectare" | "hectares" | "ha" => Ok(AreaUnit::Hectare),
            "sotyk" | "sotix" | "sotka" => Ok(AreaUnit::Sotyk),
            other => Err(EstimatorError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaUnit::Hectare => f.write_str("hectare"),
            AreaUnit::Sotyk => f.write_str("sotyk"),
        }
    }
}

/// Convert an area to hectares. NaN stays NaN.
pub fn normalize_area(value: f64, unit: AreaUnit) -> f64 {
    match unit {
        AreaUnit::Hectare => value,
        AreaUnit::Sotyk => value / SOTYK_PER_HECTARE,
    }
}

/// Parse user input into hectares.
///
/// # Arguments
/// * `text` - Raw form input
/// * `unit` - Unit the input is expressed in
///
/// # Returns
/// * `Ok(f64)` - Area in hectares
/// * `Err(EstimatorError)` - Non-numeric, infinite or negative input
pub fn parse_area(text: &str, unit: AreaUnit) -> Result<f64, EstimatorError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| EstimatorError::NotANumber(trimmed.to_string()))?;
    if value.is_nan() {
        return Err(EstimatorError::NotANumber(trimmed.to_string()));
    }
    if !value.is_finite() {
        return Err(EstimatorError::NotFinite);
    }
    if value < 0.0 {
        return Err(EstimatorError::Negative(value));
    }
    Ok(normalize_area(value, unit))
}

/// Which input costs the farmer wants deducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostFlags {
    pub seeds: bool,
    pub fertilizer: bool,
    pub labor: bool,
}

impl CostFlags {
    pub fn all() -> Self {
        Self {
            seeds: true,
            fertilizer: true,
            labor: true,
        }
    }

    /// Whether every cost enabled in `self` is also enabled in `other`.
    pub fn is_subset_of(&self, other: &CostFlags) -> bool {
        (!self.seeds || other.seeds)
            && (!self.fertilizer || other.fertilizer)
            && (!self.labor || other.labor)
    }
}

/// Regional input costs in USD per hectare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    #[serde(default = "default_seed_cost")]
    pub seeds: f64,
    #[serde(default = "default_fertilizer_cost")]
    pub fertilizer: f64,
    #[serde(default = "default_labor_cost")]
    pub labor: f64,
}

fn default_seed_cost() -> f64 {
    50.0
}

fn default_fertilizer_cost() -> f64 {
    120.0
}

fn default_labor_cost() -> f64 {
    200.0
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            seeds: default_seed_cost(),
            fertilizer: default_fertilizer_cost(),
            labor: default_labor_cost(),
        }
    }
}

impl CostRates {
    /// Sum of the enabled rates, per hectare.
    pub fn per_hectare(&self, flags: CostFlags) -> f64 {
        let mut total = 0.0;
        if flags.seeds {
            total += self.seeds;
        }
        if flags.fertilizer {
            total += self.fertilizer;
        }
        if flags.labor {
            total += self.labor;
        }
        total
    }
}

/// Income after input costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetIncome {
    pub net_min: f64,
    pub net_max: f64,
    pub total_costs: f64,
}

/// Deduct the enabled input costs from both income bounds.
///
/// Both bounds are floored at zero; a loss shows as nothing earned.
pub fn net_income(
    gross_min: f64,
    gross_max: f64,
    area_ha: f64,
    flags: CostFlags,
    rates: &CostRates,
) -> NetIncome {
    let total_costs = rates.per_hectare(flags) * area_ha;
    NetIncome {
        net_min: (gross_min - total_costs).max(0.0),
        net_max: (gross_max - total_costs).max(0.0),
        total_costs,
    }
}

/// Scale a value by the chance of keeping it: `value × (1 − risk/100)`.
///
/// The risk level is clamped to `[0, 100]`; NaN counts as no risk.
pub fn risk_adjust(value: f64, risk_level: f64) -> f64 {
    value * (1.0 - clamp_risk(risk_level) / 100.0)
}

fn clamp_risk(risk_level: f64) -> f64 {
    if risk_level.is_nan() {
        0.0
    } else {
        risk_level.clamp(0.0, 100.0)
    }
}

/// Seasonal water need of a crop in m³ per hectare. Names match exactly.
pub fn water_per_hectare(crop_name: &str) -> f64 {
    match crop_name {
        "Rice" => 8000.0,
        "Wheat" => 4000.0,
        "Maize" => 5000.0,
        "Cotton" => 6000.0,
        "Potato" => 4500.0,
        "Tomato" => 5500.0,
        "Carrot" => 3500.0,
        "Onion" => 4000.0,
        _ => DEFAULT_WATER_M3_PER_HA,
    }
}

/// Seasonal water need of `area_ha` hectares, in m³.
pub fn water_requirement(crop_name: &str, area_ha: f64) -> f64 {
    water_per_hectare(crop_name) * area_ha
}

/// Qualitative reading of the risk slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// Up to 30 %
    Ideal,
    /// Above 30 %, up to 40 %
    Elevated,
    /// Above 40 %, up to 70 %
    Scorched,
    /// Above 70 %
    Wilting,
}

impl RiskBand {
    pub fn from_level(risk_level: f64) -> Self {
        let level = clamp_risk(risk_level);
        if level > 70.0 {
            RiskBand::Wilting
        } else if level > 40.0 {
            RiskBand::Scorched
        } else if level > 30.0 {
            RiskBand::Elevated
        } else {
            RiskBand::Ideal
        }
    }
}

/// Advisory notes attached to a derived estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateWarning {
    /// The crop needs more water than a typical plot can count on.
    HighWaterDemand,
    /// The chosen risk level is above 50 %.
    HighRisk,
}

/// User-side inputs of the estimator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateInputs {
    /// Area in hectares, already normalised.
    pub area_ha: f64,
    pub flags: CostFlags,
    /// Expected loss in percent, `0..=100`.
    pub risk_level: f64,
}

/// Everything the results card shows for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedEstimate {
    pub crop_name: String,
    pub area_ha: f64,
    pub risk_level: f64,
    /// Risk-adjusted yield bounds, kg.
    pub min_yield_kg: f64,
    pub max_yield_kg: f64,
    /// Income after costs, before risk.
    pub net: NetIncome,
    /// Risk-adjusted net income bounds, USD.
    pub min_income_usd: f64,
    pub max_income_usd: f64,
    pub avg_price_per_kg: f64,
    pub water_m3: f64,
    /// USD of risk-adjusted maximum income per m³ of water.
    pub water_to_wallet: f64,
    pub risk_band: RiskBand,
    pub warnings: Vec<EstimateWarning>,
}

/// Combine a server estimate with the user's costs and risk.
///
/// `estimate` must already be scaled to `inputs.area_ha`.
pub fn derive_estimate(
    estimate: &Estimate,
    inputs: &EstimateInputs,
    rates: &CostRates,
) -> DerivedEstimate {
    let risk = clamp_risk(inputs.risk_level);
    let net = net_income(
        estimate.min_income_usd,
        estimate.max_income_usd,
        inputs.area_ha,
        inputs.flags,
        rates,
    );
    let min_income_usd = risk_adjust(net.net_min, risk);
    let max_income_usd = risk_adjust(net.net_max, risk);
    let water_m3 = water_requirement(&estimate.crop_name, inputs.area_ha);
    let divisor = if water_m3 == 0.0 { 1.0 } else { water_m3 };

    let mut warnings = Vec::new();
    if water_m3 > HIGH_WATER_M3 {
        warnings.push(EstimateWarning::HighWaterDemand);
    }
    if risk > HIGH_RISK_LEVEL {
        warnings.push(EstimateWarning::HighRisk);
    }

    DerivedEstimate {
        crop_name: estimate.crop_name.clone(),
        area_ha: inputs.area_ha,
        risk_level: risk,
        min_yield_kg: risk_adjust(estimate.min_yield_kg, risk),
        max_yield_kg: risk_adjust(estimate.max_yield_kg, risk),
        net,
        min_income_usd,
        max_income_usd,
        avg_price_per_kg: estimate.avg_price_per_kg,
        water_m3,
        water_to_wallet: max_income_usd / divisor,
        risk_band: RiskBand::from_level(risk),
        warnings,
    }
}

/// Side-by-side difference of two crops on the same plot.
///
/// Every delta is `primary − secondary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateComparison {
    pub primary: DerivedEstimate,
    pub secondary: DerivedEstimate,
    pub min_income_delta: f64,
    pub max_income_delta: f64,
    pub water_delta_m3: f64,
    pub water_to_wallet_delta: f64,
}

impl EstimateComparison {
    /// Name of the crop with the higher maximum income; the primary on a tie.
    pub fn more_profitable(&self) -> &str {
        if self.max_income_delta >= 0.0 {
            &self.primary.crop_name
        } else {
            &self.secondary.crop_name
        }
    }
}

pub fn compare(primary: &DerivedEstimate, secondary: &DerivedEstimate) -> EstimateComparison {
    EstimateComparison {
        primary: primary.clone(),
        secondary: secondary.clone(),
        min_income_delta: primary.min_income_usd - secondary.min_income_usd,
        max_income_delta: primary.max_income_usd - secondary.max_income_usd,
        water_delta_m3: primary.water_m3 - secondary.water_m3,
        water_to_wallet_delta: primary.water_to_wallet - secondary.water_to_wallet,
    }
}

#[cfg(test)]
#[path = "estimator_tests.rs"]
mod estimator_tests;
