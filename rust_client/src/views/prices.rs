//! Market prices board.

use async_trait::async_trait;
use std::sync::Arc;

use super::state::{settle_items, Refresh, ViewState};
use crate::backend::{ApiResult, FullBackend};
use crate::models::{MessageResponse, PriceId, PriceSubmission, PriceSummary};
use crate::session::SessionContext;

/// Category filter values offered by the board, `"All"` first.
pub const CATEGORIES: &[&str] = &["All", "Grains", "Vegetables", "Fruits", "Commercial", "Others"];

/// Category a crop is filed under. The lookup is by exact crop name.
pub fn crop_category(crop: &str) -> &'static str {
    match crop {
        "Wheat" | "Rice" | "Maize" | "Barley" => "Grains",
        "Tomato" | "Potato" | "Carrot" | "Onion" | "Cucumber" => "Vegetables",
        "Cotton" | "Tobacco" => "Commercial",
        "Apple" | "Grape" | "Melon" | "Watermelon" => "Fruits",
        _ => "Others",
    }
}

pub struct MarketPricesView {
    backend: Arc<dyn FullBackend>,
    session: Arc<SessionContext>,
    pub prices: ViewState<Vec<PriceSummary>>,
    pub search: String,
    pub category: String,
}

impl MarketPricesView {
    pub fn new(backend: Arc<dyn FullBackend>, session: Arc<SessionContext>) -> Self {
        Self {
            backend,
            session,
            prices: ViewState::Idle,
            search: String::new(),
            category: "All".to_string(),
        }
    }

    /// Rows matching the current category and search text.
    pub fn visible(&self) -> Vec<&PriceSummary> {
        let needle = self.search.trim().to_lowercase();
        self.prices
            .items()
            .iter()
            .filter(|row| self.category == "All" || crop_category(&row.crop) == self.category)
            .filter(|row| {
                needle.is_empty()
                    || row.crop.to_lowercase().contains(&needle)
                    || row.region.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn find(&self, crop: &str, region: &str) -> Option<&PriceSummary> {
        self.prices
            .items()
            .iter()
            .find(|row| row.crop == crop && row.region == region)
    }

    /// Rows the signed-in user may delete.
    pub fn owned(&self) -> Vec<&PriceSummary> {
        match self.session.get_session() {
            Some(user) => self
                .prices
                .items()
                .iter()
                .filter(|row| row.is_owned_by(user.id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Submit a report. Signed-in users are credited with it.
    pub async fn submit(&mut self, mut report: PriceSubmission) -> ApiResult<MessageResponse> {
        if report.user_id.is_none() {
            report.user_id = self.session.get_session().map(|user| user.id);
        }
        let response = self.backend.submit_price(&report).await?;
        self.refresh().await?;
        Ok(response)
    }

    /// Delete one of the user's own reports. The server checks ownership.
    pub async fn delete(&mut self, price_id: PriceId) -> ApiResult<MessageResponse> {
        let user = self.session.require_session("delete a price entry")?;
        let response = self.backend.delete_price(price_id, user.id).await?;
        self.refresh().await?;
        Ok(response)
    }
}

#[async_trait]
impl Refresh for MarketPricesView {
    async fn refresh(&mut self) -> ApiResult<()> {
        self.prices = ViewState::Loading;
        let result = self.backend.list_prices().await;
        settle_items(&mut self.prices, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_category() {
        assert_eq!(crop_category("Wheat"), "Grains");
        assert_eq!(crop_category("Tomato"), "Vegetables");
        assert_eq!(crop_category("Cotton"), "Commercial");
        assert_eq!(crop_category("Grape"), "Fruits");
        assert_eq!(crop_category("Saffron"), "Others");
        assert_eq!(crop_category("wheat"), "Others");
    }
}
