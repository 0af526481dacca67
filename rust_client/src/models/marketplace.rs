//! Marketplace listings, watchlist, buyer demands, reviews and seller analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::catalog::CropId;
use super::null_as_default;
use super::upload::ImageUpload;
use super::macros::wire_ids;

wire_ids! {
    ListingId,
    /// Buyer demand request.
    DemandId,
    ReviewId,
}

/// A produce listing posted by a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub farmer_id: UserId,
    #[serde(default)]
    pub farmer_name: String,
    #[serde(default)]
    pub farmer_phone: String,
    #[serde(default)]
    pub crop_type_id: Option<CropId>,
    pub crop_name: String,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
    /// `YYYY-MM-DD`, or "Not specified".
    #[serde(default)]
    pub harvest_ready_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub contact_count: u32,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Listing {
    /// Total asking value of the listing in USD.
    pub fn total_value(&self) -> f64 {
        self.quantity_kg * self.price_per_kg
    }
}

/// Multipart form for `POST /api/marketplace`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub farmer_id: UserId,
    pub crop_type_id: CropId,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
    pub harvest_ready_date: Option<NaiveDate>,
    pub description: String,
    pub tags: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<ImageUpload>,
    pub extra_images: Vec<ImageUpload>,
}

impl NewListing {
    pub fn new(
        farmer_id: UserId,
        crop_type_id: CropId,
        quantity_kg: f64,
        price_per_kg: f64,
    ) -> Self {
        Self {
            farmer_id,
            crop_type_id,
            quantity_kg,
            price_per_kg,
            harvest_ready_date: None,
            description: String::new(),
            tags: Vec::new(),
            latitude: None,
            longitude: None,
            image: None,
            extra_images: Vec::new(),
        }
    }

    /// Split a comma-separated tag string, dropping blanks.
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    /// Tags as the comma-separated form field the server expects.
    pub fn tags_field(&self) -> String {
        self.tags.join(",")
    }
}

pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Query filters for `GET /api/marketplace`. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub crop_type_id: Option<CropId>,
    pub region: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ListingFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.crop_type_id {
            pairs.push(("crop_type_id", id.to_string()));
        }
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            pairs.push(("region", region.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        pairs
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(id) = self.crop_type_id {
            if listing.crop_type_id != Some(id) {
                return false;
            }
        }
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            if &listing.region != region {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price_per_kg < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price_per_kg > max {
                return false;
            }
        }
        true
    }
}

/// Body of `POST /api/saved`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedListingRequest {
    pub user_id: UserId,
    pub listing_id: ListingId,
}

/// A buyer's request for produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRequest {
    pub id: DemandId,
    pub buyer_id: UserId,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_phone: String,
    pub crop_type_id: CropId,
    pub crop_name: String,
    pub quantity_kg: f64,
    #[serde(default)]
    pub max_price_per_kg: f64,
    #[serde(default)]
    pub needed_by: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
}

/// Body of `POST /api/demands`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDemand {
    pub buyer_id: UserId,
    pub crop_type_id: CropId,
    pub quantity_kg: f64,
    #[serde(default)]
    pub max_price_per_kg: f64,
    #[serde(default)]
    pub needed_by: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub description: String,
}

/// Query filters for `GET /api/demands`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemandFilter {
    pub region: Option<String>,
    pub crop_type_id: Option<CropId>,
}

impl DemandFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            pairs.push(("region", region.clone()));
        }
        if let Some(id) = self.crop_type_id {
            pairs.push(("crop_type_id", id.to_string()));
        }
        pairs
    }

    pub fn matches(&self, demand: &DemandRequest) -> bool {
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            if &demand.region != region {
                return false;
            }
        }
        match self.crop_type_id {
            Some(id) => demand.crop_type_id == id,
            None => true,
        }
    }
}

/// Aggregate counters across a farmer's active listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmerAnalytics {
    pub total_views: u64,
    pub total_contacts: u64,
    pub listing_count: u64,
}

impl FarmerAnalytics {
    /// Contacts per view, as a percentage.
    pub fn contact_rate(&self) -> f64 {
        if self.total_views == 0 {
            0.0
        } else {
            self.total_contacts as f64 / self.total_views as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub farmer_id: UserId,
    pub buyer_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub farmer_id: UserId,
    pub buyer_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn has_valid_rating(&self) -> bool {
        (Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_drops_blanks() {
        assert_eq!(parse_tags(" organic, ,fresh ,"), vec!["organic", "fresh"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_listing_tolerates_null_collections() {
        let json = r#"{"id": 5, "farmer_id": 2, "crop_name": "Onion", "quantity_kg": 100.0,
                        "price_per_kg": 0.3, "tags": null, "images": null}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert!(listing.tags.is_empty());
        assert!(listing.images.is_empty());
        assert!((listing.total_value() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_listing_filter_query_pairs_skip_all() {
        let filter = ListingFilter {
            crop_type_id: Some(CropId(3)),
            region: Some(String::new()),
            min_price: None,
            max_price: Some(1.5),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("crop_type_id", "3".to_string()), ("max_price", "1.5".to_string())]
        );
    }

    #[test]
    fn test_review_rating_bounds() {
        let mut review = NewReview {
            farmer_id: UserId(1),
            buyer_id: UserId(2),
            rating: 5,
            comment: String::new(),
        };
        assert!(review.has_valid_rating());
        review.rating = 0;
        assert!(!review.has_valid_rating());
        review.rating = 6;
        assert!(!review.has_valid_rating());
    }
}
