//! Marketplace listings, watchlist, demands and reviews.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{
    DemandFilter, DemandId, DemandRequest, FarmerAnalytics, Listing, ListingFilter, ListingId,
    MessageResponse, NewDemand, NewListing, NewReview, Review, SavedListingRequest, UserId,
};

/// Backend trait for the marketplace.
///
/// All methods that change a counter or a collection answer with a plain
/// acknowledgement. Callers re-fetch to observe the new state.
#[async_trait]
pub trait MarketplaceBackend: Send + Sync {
    // ==================== Listings ====================

    /// Active listings matching a filter, newest first.
    async fn list_listings(&self, filter: &ListingFilter) -> ApiResult<Vec<Listing>>;

    /// Publish a listing. Sent as a multipart form so it can carry images.
    async fn create_listing(&self, listing: &NewListing) -> ApiResult<MessageResponse>;

    /// Withdraw a listing.
    async fn delete_listing(&self, listing_id: ListingId) -> ApiResult<MessageResponse>;

    /// Count one view of a listing's detail.
    async fn record_view(&self, listing_id: ListingId) -> ApiResult<MessageResponse>;

    /// Count one contact attempt on a listing.
    async fn record_contact(&self, listing_id: ListingId) -> ApiResult<MessageResponse>;

    // ==================== Watchlist ====================

    /// Listings a user has saved.
    async fn watchlist(&self, user_id: UserId) -> ApiResult<Vec<Listing>>;

    async fn save_listing(&self, request: &SavedListingRequest) -> ApiResult<MessageResponse>;

    async fn unsave_listing(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> ApiResult<MessageResponse>;

    // ==================== Demands ====================

    /// Open buyer demands matching a filter.
    async fn list_demands(&self, filter: &DemandFilter) -> ApiResult<Vec<DemandRequest>>;

    async fn post_demand(&self, demand: &NewDemand) -> ApiResult<MessageResponse>;

    /// Withdraw a demand. Only the buyer who posted it may do so.
    ///
    /// # Returns
    /// * `Err(ApiError)` with status 404 - Unknown demand
    /// * `Err(ApiError)` with status 403 - Demand belongs to another buyer
    async fn delete_demand(
        &self,
        demand_id: DemandId,
        buyer_id: UserId,
    ) -> ApiResult<MessageResponse>;

    // ==================== Sellers ====================

    /// View and contact totals across a farmer's active listings.
    async fn farmer_analytics(&self, farmer_id: UserId) -> ApiResult<FarmerAnalytics>;

    /// Reviews left for a farmer, newest first.
    async fn farmer_reviews(&self, farmer_id: UserId) -> ApiResult<Vec<Review>>;

    async fn submit_review(&self, review: &NewReview) -> ApiResult<MessageResponse>;
}
