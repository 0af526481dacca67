//! Profit estimator page.

use std::sync::Arc;

use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::estimator::{
    compare, derive_estimate, parse_area, AreaUnit, CostFlags, CostRates, DerivedEstimate,
    EstimateComparison, EstimateInputs,
};
use crate::models::Estimate;

/// Raw form fields as the user typed them.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorForm {
    pub crop: String,
    pub area: String,
    pub unit: AreaUnit,
    pub flags: CostFlags,
    pub risk_level: f64,
}

impl Default for EstimatorForm {
    fn default() -> Self {
        Self {
            crop: String::new(),
            area: String::new(),
            unit: AreaUnit::Sotyk,
            flags: CostFlags::default(),
            risk_level: 0.0,
        }
    }
}

/// The results card for one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateResult {
    pub estimate: Estimate,
    pub derived: DerivedEstimate,
    /// Plot, costs and risk the figures were derived from.
    pub inputs: EstimateInputs,
}

pub struct EstimatorView {
    backend: Arc<dyn FullBackend>,
    rates: CostRates,
    pub form: EstimatorForm,
    pub result: Option<EstimateResult>,
    pub comparison: Option<EstimateComparison>,
    pub alert: Option<String>,
    pub loading: bool,
}

impl EstimatorView {
    pub fn new(backend: Arc<dyn FullBackend>, rates: CostRates) -> Self {
        Self {
            backend,
            rates,
            form: EstimatorForm::default(),
            result: None,
            comparison: None,
            alert: None,
            loading: false,
        }
    }

    fn inputs(&self) -> ApiResult<EstimateInputs> {
        let area_ha = parse_area(&self.form.area, self.form.unit)
            .map_err(|e| ApiError::validation(e.to_string()))?;
        Ok(EstimateInputs {
            area_ha,
            flags: self.form.flags,
            risk_level: self.form.risk_level,
        })
    }

    async fn fetch(&self, crop: &str, inputs: &EstimateInputs) -> ApiResult<EstimateResult> {
        if crop.trim().is_empty() {
            return Err(ApiError::validation("Please select a crop"));
        }
        let estimate = self.backend.estimate(crop, inputs.area_ha).await?;
        let derived = derive_estimate(&estimate, inputs, &self.rates);
        Ok(EstimateResult {
            estimate,
            derived,
            inputs: *inputs,
        })
    }

    /// Request an estimate for the form's crop and area.
    ///
    /// A bad area fails before any request. Any failure clears the result.
    pub async fn estimate(&mut self) -> ApiResult<&EstimateResult> {
        self.comparison = None;
        let outcome = match self.inputs() {
            Ok(inputs) => {
                self.loading = true;
                let crop = self.form.crop.clone();
                let outcome = self.fetch(&crop, &inputs).await;
                self.loading = false;
                outcome
            }
            Err(e) => Err(e),
        };
        match outcome {
            Ok(result) => {
                self.alert = None;
                Ok(self.result.insert(result))
            }
            Err(e) => {
                self.result = None;
                self.alert = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Estimate `crop` on the same plot and compare it with the current result.
    ///
    /// The second crop reuses the inputs of the current result; form edits
    /// made since the last `estimate()` do not apply.
    pub async fn compare_with(&mut self, crop: &str) -> ApiResult<&EstimateComparison> {
        let (primary, inputs) = match &self.result {
            Some(result) => (result.derived.clone(), result.inputs),
            None => return Err(ApiError::validation("Calculate an estimate first")),
        };
        self.loading = true;
        let outcome = self.fetch(crop, &inputs).await;
        self.loading = false;
        match outcome {
            Ok(secondary) => {
                self.alert = None;
                Ok(self
                    .comparison
                    .insert(compare(&primary, &secondary.derived)))
            }
            Err(e) => {
                self.comparison = None;
                self.alert = Some(e.user_message());
                Err(e)
            }
        }
    }
}
