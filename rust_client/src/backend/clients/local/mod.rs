//! In-memory local backend.
//!
//! Reproduces the server's rules over plain `Vec` tables so view-models can
//! be exercised without a network: ownership checks on deletes, the 30-day
//! price window, watchlist membership, calendar merging and so on. State is
//! shared between clones.

mod rules;

pub use rules::{estimate_for, irrigation_schedule, region_offset, DEFAULT_CROPS};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::error::{ApiError, ApiResult, ErrorContext};
use crate::backend::traits::*;
use crate::models::*;

/// Prices older than this drop out of the summary.
const PRICE_WINDOW_DAYS: i64 = 30;
/// Window for the "verified by N farmers" counters.
const VERIFICATION_WINDOW_HOURS: i64 = 4;

/// In-memory backend.
///
/// # Example
/// ```
/// use farmmind_lite::backend::{CatalogBackend, LocalBackend};
///
/// # async fn example() {
/// let backend = LocalBackend::new();
/// let crops = backend.list_crops().await.unwrap();
/// assert_eq!(crops.len(), 8);
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    data: Arc<RwLock<LocalData>>,
}

struct StoredUser {
    session: Session,
    password: String,
}

struct PriceReport {
    id: PriceId,
    crop_type_id: CropId,
    region: String,
    price_per_kg: f64,
    tier: VolumeTier,
    submitted_by: Option<UserId>,
    submitted_at: DateTime<Utc>,
    active: bool,
}

struct StoredSchedule {
    user_id: UserId,
    schedule: SavedSchedule,
}

struct StoredListing {
    listing: Listing,
    harvest_date: Option<NaiveDate>,
    active: bool,
}

struct StoredEvent {
    user_id: UserId,
    event: CalendarEvent,
}

#[derive(Default)]
struct Sequences {
    user: i64,
    price: i64,
    schedule: i64,
    step: i64,
    listing: i64,
    demand: i64,
    review: i64,
    event: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

struct LocalData {
    crops: Vec<Crop>,
    users: Vec<StoredUser>,
    prices: Vec<PriceReport>,
    schedules: Vec<StoredSchedule>,
    listings: Vec<StoredListing>,
    // (user, listing), most recently saved last
    saved: Vec<(UserId, ListingId)>,
    demands: Vec<DemandRequest>,
    reviews: Vec<Review>,
    events: Vec<StoredEvent>,
    seq: Sequences,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        let crops = DEFAULT_CROPS
            .iter()
            .enumerate()
            .map(|(i, name)| Crop {
                id: CropId(i as i64 + 1),
                name: name.to_string(),
            })
            .collect();

        Self {
            crops,
            users: Vec::new(),
            prices: Vec::new(),
            schedules: Vec::new(),
            listings: Vec::new(),
            saved: Vec::new(),
            demands: Vec::new(),
            reviews: Vec::new(),
            events: Vec::new(),
            seq: Sequences::default(),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn crop_name(&self, id: CropId) -> Option<&str> {
        self.crops
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    fn user(&self, id: UserId) -> Option<&Session> {
        self.users
            .iter()
            .map(|u| &u.session)
            .find(|s| s.id == id)
    }

    fn rating_of(&self, farmer_id: UserId) -> (f64, u32) {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.farmer_id == farmer_id)
            .map(|r| r.rating as f64)
            .collect();
        if ratings.is_empty() {
            return (0.0, 0);
        }
        let count = ratings.len();
        (ratings.iter().sum::<f64>() / count as f64, count as u32)
    }

    /// A listing as the server would render it, with live rating figures.
    fn render_listing(&self, stored: &StoredListing) -> Listing {
        let mut listing = stored.listing.clone();
        let (average, count) = self.rating_of(listing.farmer_id);
        listing.average_rating = average;
        listing.review_count = count;
        listing
    }

    fn average_price(&self, crop: &str) -> f64 {
        let prices: Vec<f64> = self
            .prices
            .iter()
            .filter(|p| p.active && self.crop_name(p.crop_type_id) == Some(crop))
            .map(|p| p.price_per_kg)
            .collect();
        if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        }
    }

    fn price_summaries(&self, now: DateTime<Utc>) -> Vec<PriceSummary> {
        let window_start = now - Duration::days(PRICE_WINDOW_DAYS);
        let verify_start = now - Duration::hours(VERIFICATION_WINDOW_HOURS);

        let recent: Vec<&PriceReport> = self
            .prices
            .iter()
            .filter(|p| p.active && p.submitted_at >= window_start)
            .collect();

        let mut groups: Vec<(CropId, String)> = Vec::new();
        for report in &recent {
            let key = (report.crop_type_id, report.region.clone());
            if !groups.contains(&key) {
                groups.push(key);
            }
        }

        let mut summaries: Vec<(DateTime<Utc>, PriceSummary)> = groups
            .into_iter()
            .filter_map(|(crop_id, region)| {
                let crop = self.crop_name(crop_id)?.to_string();
                let mut reports: Vec<&PriceReport> = recent
                    .iter()
                    .copied()
                    .filter(|p| p.crop_type_id == crop_id && p.region == region)
                    .collect();
                reports.sort_by_key(|p| (p.submitted_at, p.id));

                let best = |tier: VolumeTier| {
                    reports
                        .iter()
                        .filter(|p| p.tier == tier)
                        .map(|p| p.price_per_kg)
                        .fold(0.0, f64::max)
                };
                let verifying: Vec<&&PriceReport> = reports
                    .iter()
                    .filter(|p| p.submitted_at >= verify_start)
                    .collect();
                let farmers: HashSet<UserId> =
                    verifying.iter().filter_map(|p| p.submitted_by).collect();
                let anonymous = verifying.iter().filter(|p| p.submitted_by.is_none()).count();
                let latest = reports.last()?;

                let history = reports
                    .iter()
                    .map(|p| PricePoint {
                        id: p.id,
                        price: p.price_per_kg,
                        date: p.submitted_at.to_rfc3339(),
                        tier: p.tier,
                        user_id: p.submitted_by,
                    })
                    .collect();

                let summary = PriceSummary {
                    id: Some(latest.id),
                    crop,
                    region,
                    retail_price: best(VolumeTier::Retail),
                    wholesale_price: best(VolumeTier::Wholesale),
                    updated_at: Some(latest.submitted_at.to_rfc3339()),
                    history,
                    dist_farmers: farmers.len() as u32,
                    anon_reports: anonymous as u32,
                    submitted_by: latest.submitted_by,
                };
                Some((latest.submitted_at, summary))
            })
            .collect();

        summaries.sort_by(|a, b| b.0.cmp(&a.0));
        summaries.into_iter().map(|(_, s)| s).collect()
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// Create a backend holding only the default crop catalogue.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Make every subsequent call fail as if the server were unreachable.
    ///
    /// The flag is written through a poisoned lock as well.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.is_healthy = healthy;
    }

    /// Record a price with an explicit submission time.
    ///
    /// This is a helper for setting up data the public API cannot produce,
    /// such as reports older than the summary window.
    ///
    /// # Returns
    /// The ID assigned to the report
    pub fn insert_price_at(
        &self,
        submission: &PriceSubmission,
        submitted_at: DateTime<Utc>,
    ) -> ApiResult<PriceId> {
        let mut data = self.write()?;
        if data.crop_name(submission.crop_type_id).is_none() {
            return Err(ApiError::validation("Unknown crop type"));
        }
        let id = PriceId(next(&mut data.seq.price));
        data.prices.push(PriceReport {
            id,
            crop_type_id: submission.crop_type_id,
            region: submission.region.clone(),
            price_per_kg: submission.price_per_kg,
            tier: submission.volume_tier,
            submitted_by: submission.user_id.filter(|u| !u.is_unset()),
            submitted_at,
            active: true,
        });
        Ok(id)
    }

    fn read(&self) -> ApiResult<RwLockReadGuard<'_, LocalData>> {
        let data = self
            .data
            .read()
            .map_err(|_| ApiError::storage("Local backend state is poisoned"))?;
        if !data.is_healthy {
            return Err(ApiError::network("Local backend is unreachable"));
        }
        Ok(data)
    }

    fn write(&self) -> ApiResult<RwLockWriteGuard<'_, LocalData>> {
        let data = self
            .data
            .write()
            .map_err(|_| ApiError::storage("Local backend state is poisoned"))?;
        if !data.is_healthy {
            return Err(ApiError::network("Local backend is unreachable"));
        }
        Ok(data)
    }
}

#[async_trait]
impl CatalogBackend for LocalBackend {
    async fn health_check(&self) -> ApiResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|_| ApiError::storage("Local backend state is poisoned"))?;
        Ok(data.is_healthy)
    }

    async fn list_crops(&self) -> ApiResult<Vec<Crop>> {
        let data = self.read()?;
        let mut crops = data.crops.clone();
        crops.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(crops)
    }

    async fn estimate(&self, crop: &str, area_ha: f64) -> ApiResult<Estimate> {
        if crop.is_empty() {
            return Err(ApiError::validation("crop and area (hectares) are required"));
        }
        if !area_ha.is_finite() {
            return Err(ApiError::validation("area must be a valid number"));
        }
        let data = self.read()?;
        Ok(estimate_for(crop, area_ha, data.average_price(crop)))
    }
}

#[async_trait]
impl IrrigationBackend for LocalBackend {
    async fn generate_schedule(
        &self,
        crop: &str,
        planting_date: NaiveDate,
        region: &str,
    ) -> ApiResult<IrrigationSchedule> {
        if crop.is_empty() {
            return Err(ApiError::validation("crop and planting_date are required"));
        }
        let _data = self.read()?;
        Ok(irrigation_schedule(crop, planting_date, region))
    }

    async fn save_schedule(&self, request: &SaveScheduleRequest) -> ApiResult<MessageResponse> {
        if request.user_id.is_unset() {
            return Err(ApiError::validation(
                "User identification lost. Please log out and back in.",
            ));
        }
        if request.reminders.is_empty() {
            return Err(ApiError::validation(
                "No cycle data to save. Please generate a schedule first.",
            ));
        }

        let mut data = self.write()?;
        let id = ScheduleId(next(&mut data.seq.schedule));
        let mut steps = Vec::with_capacity(request.reminders.len());
        for reminder in &request.reminders {
            steps.push(SavedStep {
                id: StepId(next(&mut data.seq.step)),
                date: reminder.date,
                stage: reminder.stage.clone(),
                action: reminder.action.clone(),
                notes: reminder.notes.clone(),
                completed_at: None,
            });
        }
        steps.sort_by_key(|s| (s.date, s.id));

        data.schedules.push(StoredSchedule {
            user_id: request.user_id,
            schedule: SavedSchedule {
                id,
                crop_name: request.crop_name.clone(),
                region: request.region.clone(),
                planting_date: request.planting_date,
                created_at: Utc::now(),
                steps,
            },
        });
        tracing::debug!(schedule_id = %id, "Saved irrigation schedule");

        Ok(MessageResponse::new("Schedule saved successfully").with_id(id.value()))
    }

    async fn list_saved_schedules(&self, user_id: UserId) -> ApiResult<Vec<SavedSchedule>> {
        let data = self.read()?;
        let mut schedules: Vec<SavedSchedule> = data
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.schedule.clone())
            .collect();
        schedules.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(schedules)
    }

    async fn toggle_step(&self, step_id: StepId) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        let step = data
            .schedules
            .iter_mut()
            .flat_map(|s| s.schedule.steps.iter_mut())
            .find(|step| step.id == step_id)
            .ok_or_else(|| {
                ApiError::not_found("Step not found").with_context(
                    ErrorContext::new("toggle_step")
                        .with_resource("irrigation_step")
                        .with_resource_id(step_id),
                )
            })?;
        step.completed_at = match step.completed_at {
            Some(_) => None,
            None => Some(Utc::now()),
        };
        Ok(MessageResponse::new("Step updated"))
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        let before = data.schedules.len();
        data.schedules.retain(|s| s.schedule.id != schedule_id);
        if data.schedules.len() == before {
            return Err(ApiError::not_found("Schedule not found").with_context(
                ErrorContext::new("delete_schedule")
                    .with_resource("irrigation_schedule")
                    .with_resource_id(schedule_id),
            ));
        }
        Ok(MessageResponse::new("Schedule deleted"))
    }
}

#[async_trait]
impl PriceBackend for LocalBackend {
    async fn list_prices(&self) -> ApiResult<Vec<PriceSummary>> {
        let data = self.read()?;
        Ok(data.price_summaries(Utc::now()))
    }

    async fn submit_price(&self, submission: &PriceSubmission) -> ApiResult<MessageResponse> {
        if submission.region.trim().is_empty() || submission.price_per_kg <= 0.0 {
            return Err(ApiError::validation(
                "Invalid input: region and a positive price_per_kg are required",
            ));
        }
        self.insert_price_at(submission, Utc::now())?;
        Ok(MessageResponse::new("Price submitted successfully"))
    }

    async fn delete_price(
        &self,
        price_id: PriceId,
        user_id: UserId,
    ) -> ApiResult<MessageResponse> {
        let context = ErrorContext::new("delete_price")
            .with_resource("price")
            .with_resource_id(price_id);
        let mut data = self.write()?;
        let report = data
            .prices
            .iter_mut()
            .find(|p| p.id == price_id && p.active)
            .ok_or_else(|| {
                ApiError::not_found("Price entry not found").with_context(context.clone())
            })?;

        // Anonymous reports have no owner and cannot be retracted.
        match report.submitted_by {
            None => {
                Err(ApiError::not_found("Price entry not found").with_context(context))
            }
            Some(owner) if owner != user_id => Err(ApiError::forbidden(
                "You can only delete your own price entries",
            )
            .with_context(context)),
            Some(_) => {
                report.active = false;
                Ok(MessageResponse::new("Price entry deleted successfully"))
            }
        }
    }
}

#[async_trait]
impl MarketplaceBackend for LocalBackend {
    async fn list_listings(&self, filter: &ListingFilter) -> ApiResult<Vec<Listing>> {
        let data = self.read()?;
        let mut listings: Vec<Listing> = data
            .listings
            .iter()
            .filter(|l| l.active && filter.matches(&l.listing))
            .map(|l| data.render_listing(l))
            .collect();
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(listings)
    }

    async fn create_listing(&self, new: &NewListing) -> ApiResult<MessageResponse> {
        if new.quantity_kg <= 0.0 || new.price_per_kg <= 0.0 {
            return Err(ApiError::validation(
                "quantity_kg and price_per_kg must be positive",
            ));
        }

        let mut data = self.write()?;
        let crop_name = data
            .crop_name(new.crop_type_id)
            .ok_or_else(|| ApiError::validation("Unknown crop type"))?
            .to_string();
        let (farmer_name, farmer_phone, region) = data
            .user(new.farmer_id)
            .map(|s| {
                (
                    s.full_name.clone(),
                    s.phone_number.clone().unwrap_or_default(),
                    s.region.clone(),
                )
            })
            .unwrap_or_default();

        let id = ListingId(next(&mut data.seq.listing));
        let upload_path =
            |image: &ImageUpload| format!("/uploads/marketplace/{}_{}", id, image.file_name);
        let listing = Listing {
            id,
            farmer_id: new.farmer_id,
            farmer_name,
            farmer_phone,
            crop_type_id: Some(new.crop_type_id),
            crop_name,
            quantity_kg: new.quantity_kg,
            price_per_kg: new.price_per_kg,
            harvest_ready_date: new
                .harvest_ready_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            description: new.description.clone(),
            region,
            image_url: new.image.as_ref().map(upload_path).unwrap_or_default(),
            latitude: new.latitude.unwrap_or_default(),
            longitude: new.longitude.unwrap_or_default(),
            created_at: Utc::now().to_rfc3339(),
            tags: new.tags.clone(),
            view_count: 0,
            contact_count: 0,
            average_rating: 0.0,
            review_count: 0,
            images: new.extra_images.iter().map(upload_path).collect(),
            distance: None,
        };
        data.listings.push(StoredListing {
            listing,
            harvest_date: new.harvest_ready_date,
            active: true,
        });

        Ok(MessageResponse::new("Listing created successfully").with_id(id.value()))
    }

    async fn delete_listing(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        let stored = data
            .listings
            .iter_mut()
            .find(|l| l.listing.id == listing_id && l.active)
            .ok_or_else(|| {
                ApiError::not_found("Listing not found").with_context(
                    ErrorContext::new("delete_listing")
                        .with_resource("listing")
                        .with_resource_id(listing_id),
                )
            })?;
        stored.active = false;
        Ok(MessageResponse::new("Listing deleted successfully"))
    }

    async fn record_view(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        if let Some(stored) = data.listings.iter_mut().find(|l| l.listing.id == listing_id) {
            stored.listing.view_count += 1;
        }
        Ok(MessageResponse::default())
    }

    async fn record_contact(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        if let Some(stored) = data.listings.iter_mut().find(|l| l.listing.id == listing_id) {
            stored.listing.contact_count += 1;
        }
        Ok(MessageResponse::default())
    }

    async fn watchlist(&self, user_id: UserId) -> ApiResult<Vec<Listing>> {
        let data = self.read()?;
        let listings = data
            .saved
            .iter()
            .rev()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, listing_id)| {
                data.listings
                    .iter()
                    .find(|l| l.listing.id == *listing_id && l.active)
            })
            .map(|l| data.render_listing(l))
            .collect();
        Ok(listings)
    }

    async fn save_listing(&self, request: &SavedListingRequest) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        let key = (request.user_id, request.listing_id);
        if !data.saved.contains(&key) {
            data.saved.push(key);
        }
        Ok(MessageResponse::new("Listing saved"))
    }

    async fn unsave_listing(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        data.saved.retain(|entry| *entry != (user_id, listing_id));
        Ok(MessageResponse::new("Listing removed from watchlist"))
    }

    async fn list_demands(&self, filter: &DemandFilter) -> ApiResult<Vec<DemandRequest>> {
        let data = self.read()?;
        let mut demands: Vec<DemandRequest> = data
            .demands
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        demands.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(demands)
    }

    async fn post_demand(&self, demand: &NewDemand) -> ApiResult<MessageResponse> {
        if demand.quantity_kg <= 0.0 {
            return Err(ApiError::validation("quantity_kg must be positive"));
        }

        let mut data = self.write()?;
        let crop_name = data
            .crop_name(demand.crop_type_id)
            .ok_or_else(|| ApiError::validation("Unknown crop type"))?
            .to_string();
        let (buyer_name, buyer_phone) = data
            .user(demand.buyer_id)
            .map(|s| (s.full_name.clone(), s.phone_number.clone().unwrap_or_default()))
            .unwrap_or_default();

        let id = DemandId(next(&mut data.seq.demand));
        data.demands.push(DemandRequest {
            id,
            buyer_id: demand.buyer_id,
            buyer_name,
            buyer_phone,
            crop_type_id: demand.crop_type_id,
            crop_name,
            quantity_kg: demand.quantity_kg,
            max_price_per_kg: demand.max_price_per_kg,
            needed_by: demand.needed_by.clone(),
            region: demand.region.clone(),
            description: demand.description.clone(),
            created_at: Utc::now().to_rfc3339(),
        });

        Ok(MessageResponse::new("Demand request posted successfully"))
    }

    async fn delete_demand(
        &self,
        demand_id: DemandId,
        buyer_id: UserId,
    ) -> ApiResult<MessageResponse> {
        let context = ErrorContext::new("delete_demand")
            .with_resource("demand")
            .with_resource_id(demand_id);
        let mut data = self.write()?;
        let position = data
            .demands
            .iter()
            .position(|d| d.id == demand_id)
            .ok_or_else(|| {
                ApiError::not_found("Demand request not found").with_context(context.clone())
            })?;
        if data.demands[position].buyer_id != buyer_id {
            return Err(
                ApiError::forbidden("You can only delete your own requests").with_context(context),
            );
        }
        data.demands.remove(position);
        Ok(MessageResponse::new("Demand request deleted successfully"))
    }

    async fn farmer_analytics(&self, farmer_id: UserId) -> ApiResult<FarmerAnalytics> {
        let data = self.read()?;
        let active = data
            .listings
            .iter()
            .filter(|l| l.active && l.listing.farmer_id == farmer_id);

        let mut analytics = FarmerAnalytics::default();
        for stored in active {
            analytics.total_views += stored.listing.view_count as u64;
            analytics.total_contacts += stored.listing.contact_count as u64;
            analytics.listing_count += 1;
        }
        Ok(analytics)
    }

    async fn farmer_reviews(&self, farmer_id: UserId) -> ApiResult<Vec<Review>> {
        let data = self.read()?;
        let mut reviews: Vec<Review> = data
            .reviews
            .iter()
            .filter(|r| r.farmer_id == farmer_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(reviews)
    }

    async fn submit_review(&self, review: &NewReview) -> ApiResult<MessageResponse> {
        if !review.has_valid_rating() {
            return Err(ApiError::validation("Rating must be between 1 and 5"));
        }

        let mut data = self.write()?;
        let buyer_name = data.user(review.buyer_id).map(|s| s.full_name.clone());
        let id = ReviewId(next(&mut data.seq.review));
        data.reviews.push(Review {
            id,
            farmer_id: review.farmer_id,
            buyer_id: review.buyer_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Utc::now().to_rfc3339(),
            buyer_name,
        });
        Ok(MessageResponse::new("Review submitted successfully"))
    }
}

#[async_trait]
impl AccountBackend for LocalBackend {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let required = [
            &request.full_name,
            &request.email,
            &request.phone_number,
            &request.region,
            &request.password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ApiError::validation("All fields are required"));
        }

        let mut data = self.write()?;
        if data
            .users
            .iter()
            .any(|u| u.session.phone_number.as_deref() == Some(request.phone_number.as_str()))
        {
            return Err(ApiError::conflict(
                "Phone number already registered. Please Log In.",
            ));
        }
        if data
            .users
            .iter()
            .any(|u| u.session.email.as_deref() == Some(request.email.as_str()))
        {
            return Err(ApiError::conflict("Email already in use."));
        }

        let session = Session {
            id: UserId(next(&mut data.seq.user)),
            full_name: request.full_name.clone(),
            role: request.role,
            region: request.region.clone(),
            email: Some(request.email.clone()),
            phone_number: Some(request.phone_number.clone()),
        };
        data.users.push(StoredUser {
            session: session.clone(),
            password: request.password.clone(),
        });

        Ok(AuthResponse {
            message: "Registration successful!".to_string(),
            user: session,
        })
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(ApiError::validation("Email and Password are required"));
        }

        let data = self.read()?;
        let user = data
            .users
            .iter()
            .find(|u| {
                u.session.email.as_deref() == Some(request.email.as_str())
                    && u.password == request.password
            })
            .ok_or_else(|| ApiError::server(401, "Invalid email or password"))?;

        Ok(AuthResponse {
            message: "Login successful!".to_string(),
            user: user.session.clone(),
        })
    }
}

/// First day of the month and first day of the next one.
fn month_bounds(year: i32, month: u32) -> ApiResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::validation(format!("Invalid month: {}-{}", year, month)))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| ApiError::validation(format!("Invalid month: {}-{}", year, month)))?;
    Ok((start, end))
}

#[async_trait]
impl CalendarBackend for LocalBackend {
    async fn calendar_events(
        &self,
        year: i32,
        month: u32,
        user_id: UserId,
    ) -> ApiResult<CalendarEvents> {
        let (start, end) = month_bounds(year, month)?;
        let in_month = |date: NaiveDate| date >= start && date < end;
        let data = self.read()?;

        let irrigation = data
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .flat_map(|s| {
                s.schedule.steps.iter().map(move |step| (s, step))
            })
            .filter(|(_, step)| in_month(step.date))
            .map(|(s, step)| CalendarEvent {
                id: EventId(step.id.value()),
                date: step.date,
                title: format!("{}: {}", s.schedule.crop_name, step.action),
                kind: KIND_IRRIGATION.to_string(),
                value: None,
            });

        let custom = data
            .events
            .iter()
            .filter(|e| e.user_id == user_id && in_month(e.event.date))
            .map(|e| e.event.clone());

        let harvests = data
            .listings
            .iter()
            .filter(|l| l.active && l.listing.farmer_id == user_id)
            .filter_map(|l| l.harvest_date.filter(|d| in_month(*d)).map(|d| (l, d)))
            .map(|(l, date)| CalendarEvent {
                id: EventId(l.listing.id.value()),
                date,
                title: format!("{} Harvest", l.listing.crop_name),
                kind: KIND_HARVEST.to_string(),
                value: Some(l.listing.total_value()),
            });

        let events = irrigation.chain(custom).chain(harvests).collect();
        Ok(CalendarEvents { events })
    }

    async fn add_event(&self, event: &NewCalendarEvent) -> ApiResult<MessageResponse> {
        let mut data = self.write()?;
        let id = EventId(next(&mut data.seq.event));
        data.events.push(StoredEvent {
            user_id: event.user_id,
            event: CalendarEvent {
                id,
                date: event.date,
                title: event.title.clone(),
                kind: event.kind.clone(),
                value: None,
            },
        });
        Ok(MessageResponse::new("Event created"))
    }
}

fn location_or_default(location: &str) -> &str {
    if location.trim().is_empty() {
        "Tashkent"
    } else {
        location
    }
}

#[async_trait]
impl WeatherBackend for LocalBackend {
    async fn current_weather(&self, location: &str) -> ApiResult<CurrentWeather> {
        let _data = self.read()?;
        Ok(rules::sample_current_weather(location_or_default(location)))
    }

    async fn forecast(&self, location: &str) -> ApiResult<Forecast> {
        let _data = self.read()?;
        let today = Utc::now().date_naive();
        Ok(rules::sample_forecast(location_or_default(location), today))
    }
}

#[async_trait]
impl DoctorBackend for LocalBackend {
    async fn analyze(&self, image: &ImageUpload) -> ApiResult<Diagnosis> {
        if image.is_empty() {
            return Err(ApiError::validation("No image uploaded"));
        }
        if !image.mime_type.starts_with("image/") {
            return Err(ApiError::validation(format!(
                "Unsupported file type: {}",
                image.mime_type
            )));
        }
        let _data = self.read()?;
        Ok(rules::sample_diagnosis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds_wraps_december() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn test_default_catalogue() {
        let data = LocalData::default();
        assert_eq!(data.crops.len(), DEFAULT_CROPS.len());
        assert_eq!(data.crop_name(CropId(8)), Some("Wheat"));
    }

    #[test]
    fn test_old_prices_fall_out_of_summary() {
        let backend = LocalBackend::new();
        let submission = PriceSubmission::new(CropId(8), "Tashkent", 0.4, VolumeTier::Retail, None);
        backend
            .insert_price_at(&submission, Utc::now() - Duration::days(45))
            .unwrap();

        let data = backend.data.read().unwrap();
        assert!(data.price_summaries(Utc::now()).is_empty());
        // Still counts towards the estimate average
        assert!((data.average_price("Wheat") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_set_healthy_writes_through_poisoned_lock() {
        let backend = LocalBackend::new();
        let shared = Arc::clone(&backend.data);
        let panicked = std::thread::spawn(move || {
            let _guard = shared.write().unwrap();
            panic!("poison the state lock");
        })
        .join();
        assert!(panicked.is_err());
        assert!(backend.data.is_poisoned());

        backend.set_healthy(false);
        let data = backend.data.read().unwrap_or_else(|e| e.into_inner());
        assert!(!data.is_healthy);
    }

    #[tokio::test]
    async fn test_set_healthy_toggles_health_check() {
        let backend = LocalBackend::new();
        backend.set_healthy(false);
        assert!(!backend.health_check().await.unwrap());
        assert!(matches!(
            backend.list_crops().await,
            Err(ApiError::Network { .. })
        ));
        backend.set_healthy(true);
        assert!(backend.health_check().await.unwrap());
    }
}
