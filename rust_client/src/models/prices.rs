//! Crowd-sourced market price reports.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::UserId;
use super::catalog::CropId;
use super::macros::wire_ids;

wire_ids! { PriceId }

/// Price-reporting category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTier {
    #[default]
    Retail,
    Wholesale,
}

impl fmt::Display for VolumeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeTier::Retail => f.write_str("retail"),
            VolumeTier::Wholesale => f.write_str("wholesale"),
        }
    }
}

impl FromStr for VolumeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retail" | "" => Ok(VolumeTier::Retail),
            "wholesale" => Ok(VolumeTier::Wholesale),
            other => Err(format!(
                "volume_tier must be 'retail' or 'wholesale', got '{}'",
                other
            )),
        }
    }
}

/// A single report inside a crop/region price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: PriceId,
    pub price: f64,
    pub date: String,
    #[serde(default)]
    pub tier: VolumeTier,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Latest prices for one crop in one region, with its 30-day history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Id of the most recent active report.
    #[serde(default)]
    pub id: Option<PriceId>,
    pub crop: String,
    pub region: String,
    #[serde(default)]
    pub retail_price: f64,
    #[serde(default)]
    pub wholesale_price: f64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "history_from_array_or_string")]
    pub history: Vec<PricePoint>,
    #[serde(default)]
    pub dist_farmers: u32,
    #[serde(default)]
    pub anon_reports: u32,
    /// Owner of the most recent report; only they may delete it.
    #[serde(default)]
    pub submitted_by: Option<UserId>,
}

impl PriceSummary {
    /// Percentage change from the first to the last history point.
    ///
    /// `None` when fewer than two points exist or the first price is zero.
    pub fn trend_percent(&self) -> Option<f64> {
        if self.history.len() < 2 {
            return None;
        }
        let first = self.history.first()?.price;
        let last = self.history.last()?.price;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.submitted_by == Some(user)
    }
}

/// The server aggregates history with `json_agg` and ships it as a JSON string
/// inside the JSON document. Accept the string form, a plain array, or `null`.
fn history_from_array_or_string<'de, D>(deserializer: D) -> Result<Vec<PricePoint>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHistory {
        Encoded(String),
        Points(Vec<PricePoint>),
    }

    match Option::<RawHistory>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(RawHistory::Points(points)) => Ok(points),
        Some(RawHistory::Encoded(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "null" {
                return Ok(Vec::new());
            }
            match serde_json::from_str::<Vec<PricePoint>>(trimmed) {
                Ok(points) => Ok(points),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undecodable price history");
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Body of `POST /api/prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSubmission {
    pub crop_type_id: CropId,
    pub region: String,
    pub price_per_kg: f64,
    pub volume_tier: VolumeTier,
    pub user_id: Option<UserId>,
}

impl PriceSubmission {
    /// Build a submission. A zero user id is sent as an anonymous report.
    pub fn new(
        crop_type_id: CropId,
        region: impl Into<String>,
        price_per_kg: f64,
        volume_tier: VolumeTier,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            crop_type_id,
            region: region.into(),
            price_per_kg,
            volume_tier,
            user_id: user_id.filter(|id| !id.is_unset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_json(history: &str) -> String {
        format!(
            r#"{{"id": 3, "crop": "Wheat", "region": "Tashkent", "retail_price": 0.5,
                "wholesale_price": 0.4, "updated_at": "2024-05-01T10:00:00Z",
                "history": {}, "dist_farmers": 2, "anon_reports": 1, "submitted_by": 7}}"#,
            history
        )
    }

    #[test]
    fn test_history_as_encoded_string() {
        let encoded = serde_json::to_string(
            r#"[{"id": 1, "price": 0.4, "date": "2024-04-28", "tier": "retail", "user_id": 7},
               {"id": 3, "price": 0.5, "date": "2024-05-01", "tier": "retail", "user_id": null}]"#,
        )
        .unwrap();
        let summary: PriceSummary = serde_json::from_str(&summary_json(&encoded)).unwrap();

        assert_eq!(summary.history.len(), 2);
        assert_eq!(summary.history[0].user_id, Some(UserId(7)));
        assert_eq!(summary.history[1].user_id, None);
    }

    #[test]
    fn test_history_as_plain_array() {
        let summary: PriceSummary = serde_json::from_str(&summary_json(
            r#"[{"id": 1, "price": 0.4, "date": "2024-04-28", "tier": "wholesale"}]"#,
        ))
        .unwrap();

        assert_eq!(summary.history.len(), 1);
        assert_eq!(summary.history[0].tier, VolumeTier::Wholesale);
    }

    #[test]
    fn test_history_null_or_garbage_is_empty() {
        let summary: PriceSummary = serde_json::from_str(&summary_json("null")).unwrap();
        assert!(summary.history.is_empty());

        let summary: PriceSummary =
            serde_json::from_str(&summary_json(r#""not json at all""#)).unwrap();
        assert!(summary.history.is_empty());
    }

    #[test]
    fn test_trend_percent() {
        let mut summary: PriceSummary = serde_json::from_str(&summary_json(
            r#"[{"id": 1, "price": 0.4, "date": "a"}, {"id": 2, "price": 0.5, "date": "b"}]"#,
        ))
        .unwrap();
        let trend = summary.trend_percent().unwrap();
        assert!((trend - 25.0).abs() < 1e-9);

        summary.history.truncate(1);
        assert_eq!(summary.trend_percent(), None);
    }

    #[test]
    fn test_submission_drops_zero_user() {
        let anonymous =
            PriceSubmission::new(CropId(1), "Fergana", 0.3, VolumeTier::Retail, Some(UserId(0)));
        assert_eq!(anonymous.user_id, None);

        let owned =
            PriceSubmission::new(CropId(1), "Fergana", 0.3, VolumeTier::Retail, Some(UserId(4)));
        assert_eq!(owned.user_id, Some(UserId(4)));
    }

    #[test]
    fn test_volume_tier_parsing() {
        assert_eq!("".parse::<VolumeTier>().unwrap(), VolumeTier::Retail);
        assert_eq!("Wholesale".parse::<VolumeTier>().unwrap(), VolumeTier::Wholesale);
        assert!("bulk".parse::<VolumeTier>().is_err());
    }
}
