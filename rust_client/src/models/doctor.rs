//! Crop-disease analysis results.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Result of `POST /api/doctor/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease: String,
    /// Free-form confidence as produced by the model, e.g. "95%".
    #[serde(default)]
    pub confidence: String,
    /// "Low", "Moderate", "High" or "None".
    #[serde(default)]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub treatment: Vec<String>,
}

impl Diagnosis {
    /// Confidence as a ratio in `[0, 1]`, when it can be read as a number.
    ///
    /// Accepts "95%", "95" and "0.95".
    pub fn confidence_ratio(&self) -> Option<f64> {
        let raw = self.confidence.trim();
        let (number, percent) = match raw.strip_suffix('%') {
            Some(stripped) => (stripped.trim(), true),
            None => (raw, false),
        };
        let value: f64 = number.parse().ok()?;
        let ratio = if percent || value > 1.0 { value / 100.0 } else { value };
        (0.0..=1.0).contains(&ratio).then_some(ratio)
    }

    pub fn is_healthy(&self) -> bool {
        self.severity.eq_ignore_ascii_case("none") || self.disease.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(confidence: &str) -> Diagnosis {
        Diagnosis {
            disease: "Late blight".into(),
            confidence: confidence.into(),
            severity: "High".into(),
            treatment: vec![],
        }
    }

    #[test]
    fn test_confidence_ratio_forms() {
        assert_eq!(diagnosis("95%").confidence_ratio(), Some(0.95));
        assert_eq!(diagnosis("80").confidence_ratio(), Some(0.8));
        assert_eq!(diagnosis("0.5").confidence_ratio(), Some(0.5));
        assert_eq!(diagnosis("e.g. 95%").confidence_ratio(), None);
        assert_eq!(diagnosis("250%").confidence_ratio(), None);
    }
}
