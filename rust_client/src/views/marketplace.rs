//! Marketplace: listings, the buyer's watchlist, demand requests and
//! seller reputation.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::state::{settle, settle_items, Refresh, ViewState};
use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::models::{
    DemandFilter, DemandId, DemandRequest, FarmerAnalytics, Listing, ListingFilter, ListingId,
    MessageResponse, NewDemand, NewListing, NewReview, Review, SavedListingRequest, Session,
    UserId,
};
use crate::session::SessionContext;

pub struct MarketplaceView {
    backend: Arc<dyn FullBackend>,
    session: Arc<SessionContext>,
    pub filter: ListingFilter,
    pub listings: ViewState<Vec<Listing>>,
    /// Listing whose detail panel is open.
    pub selected: Option<Listing>,
    pub watchlist: ViewState<Vec<Listing>>,
    saved_ids: HashSet<ListingId>,
    pub demand_filter: DemandFilter,
    pub demands: ViewState<Vec<DemandRequest>>,
    pub analytics: ViewState<FarmerAnalytics>,
    pub reviews: ViewState<Vec<Review>>,
}

impl MarketplaceView {
    pub fn new(backend: Arc<dyn FullBackend>, session: Arc<SessionContext>) -> Self {
        Self {
            backend,
            session,
            filter: ListingFilter::default(),
            listings: ViewState::Idle,
            selected: None,
            watchlist: ViewState::Idle,
            saved_ids: HashSet::new(),
            demand_filter: DemandFilter::default(),
            demands: ViewState::Idle,
            analytics: ViewState::Idle,
            reviews: ViewState::Idle,
        }
    }

    fn user(&self) -> ApiResult<Session> {
        self.session.require_session("use the marketplace")
    }

    // ==================== Listings ====================

    /// Publish a listing under the signed-in farmer's id.
    pub async fn create_listing(&mut self, mut listing: NewListing) -> ApiResult<MessageResponse> {
        listing.farmer_id = self.user()?.id;
        let response = self.backend.create_listing(&listing).await?;
        self.refresh().await?;
        Ok(response)
    }

    pub async fn delete_listing(&mut self, listing_id: ListingId) -> ApiResult<()> {
        self.backend.delete_listing(listing_id).await?;
        if self.selected.as_ref().map(|l| l.id) == Some(listing_id) {
            self.selected = None;
        }
        self.refresh().await
    }

    /// Open the detail panel and count the view.
    ///
    /// The view counter is best effort; a failure to record it is logged.
    pub async fn open_listing(&mut self, listing: Listing) {
        if let Err(e) = self.backend.record_view(listing.id).await {
            tracing::debug!(listing_id = %listing.id, error = %e, "View not recorded");
        }
        self.selected = Some(listing);
    }

    pub fn close_listing(&mut self) {
        self.selected = None;
    }

    pub async fn record_view(&mut self, listing_id: ListingId) -> ApiResult<()> {
        self.backend.record_view(listing_id).await.map(|_| ())
    }

    /// The buyer pressed call or message on a listing.
    pub async fn record_contact(&mut self, listing_id: ListingId) -> ApiResult<()> {
        self.backend.record_contact(listing_id).await.map(|_| ())
    }

    // ==================== Watchlist ====================

    pub fn is_saved(&self, listing_id: ListingId) -> bool {
        self.saved_ids.contains(&listing_id)
    }

    pub fn saved_ids(&self) -> &HashSet<ListingId> {
        &self.saved_ids
    }

    /// Reload the watchlist and the saved-id set from the server.
    pub async fn refresh_watchlist(&mut self) -> ApiResult<()> {
        let user = match self.session.get_session() {
            Some(user) => user,
            None => {
                self.watchlist = ViewState::Idle;
                self.saved_ids.clear();
                return Ok(());
            }
        };
        self.watchlist = ViewState::Loading;
        match self.backend.watchlist(user.id).await {
            Ok(listings) => {
                self.saved_ids = listings.iter().map(|l| l.id).collect();
                self.watchlist = ViewState::from_items(listings);
                Ok(())
            }
            Err(e) => {
                // The set only ever reflects what the server last confirmed.
                self.watchlist = ViewState::failed(&e);
                Err(e)
            }
        }
    }

    /// Save or unsave a listing, then reload the watchlist.
    ///
    /// # Returns
    /// * `Ok(true)` - The listing is saved after the round trip
    /// * `Ok(false)` - The listing is not saved after the round trip
    /// * `Err(_)` - The mutation failed; the saved set is unchanged
    pub async fn toggle_saved(&mut self, listing_id: ListingId) -> ApiResult<bool> {
        let user = self.user()?;
        if self.is_saved(listing_id) {
            self.backend.unsave_listing(listing_id, user.id).await?;
        } else {
            let request = SavedListingRequest {
                user_id: user.id,
                listing_id,
            };
            self.backend.save_listing(&request).await?;
        }
        self.refresh_watchlist().await?;
        Ok(self.is_saved(listing_id))
    }

    // ==================== Demands ====================

    pub async fn refresh_demands(&mut self) -> ApiResult<()> {
        self.demands = ViewState::Loading;
        let result = self.backend.list_demands(&self.demand_filter).await;
        settle_items(&mut self.demands, result)
    }

    /// Post a request under the signed-in buyer's id.
    pub async fn post_demand(&mut self, mut demand: NewDemand) -> ApiResult<MessageResponse> {
        demand.buyer_id = self.user()?.id;
        let response = self.backend.post_demand(&demand).await?;
        self.refresh_demands().await?;
        Ok(response)
    }

    pub async fn delete_demand(&mut self, demand_id: DemandId) -> ApiResult<MessageResponse> {
        let user = self.user()?;
        let response = self.backend.delete_demand(demand_id, user.id).await?;
        self.refresh_demands().await?;
        Ok(response)
    }

    // ==================== Sellers ====================

    pub async fn load_analytics(&mut self, farmer_id: UserId) -> ApiResult<()> {
        self.analytics = ViewState::Loading;
        let result = self.backend.farmer_analytics(farmer_id).await;
        settle(&mut self.analytics, result)
    }

    pub async fn load_reviews(&mut self, farmer_id: UserId) -> ApiResult<()> {
        self.reviews = ViewState::Loading;
        let result = self.backend.farmer_reviews(farmer_id).await;
        settle_items(&mut self.reviews, result)
    }

    /// Review the farmer of the open listing.
    ///
    /// Reloads the reviews and the listings so averages stay in step.
    pub async fn submit_review(&mut self, rating: u8, comment: &str) -> ApiResult<MessageResponse> {
        let user = self.user()?;
        let farmer_id = self
            .selected
            .as_ref()
            .map(|l| l.farmer_id)
            .ok_or_else(|| ApiError::validation("Open a listing to review its farmer"))?;
        let review = NewReview {
            farmer_id,
            buyer_id: user.id,
            rating,
            comment: comment.to_string(),
        };
        if !review.has_valid_rating() {
            return Err(ApiError::validation("Rating must be between 1 and 5"));
        }
        let response = self.backend.submit_review(&review).await?;
        self.load_reviews(farmer_id).await?;
        self.refresh().await?;
        Ok(response)
    }
}

#[async_trait]
impl Refresh for MarketplaceView {
    async fn refresh(&mut self) -> ApiResult<()> {
        self.listings = ViewState::Loading;
        let result = self.backend.list_listings(&self.filter).await;
        settle_items(&mut self.listings, result)?;
        if let Some(selected) = &self.selected {
            let id = selected.id;
            self.selected = self.listings.items().iter().find(|l| l.id == id).cloned();
        }
        Ok(())
    }
}
