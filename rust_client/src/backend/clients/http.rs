//! REST client for the FarmMind API server.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::backend::error::{ApiError, ApiResult, ErrorContext};
use crate::backend::response::{parse_json_list, parse_json_response};
use crate::backend::traits::*;
use crate::models::*;

/// HTTP implementation of every backend trait.
///
/// Cloning is cheap; the underlying connection pool is shared.
///
/// # Example
///
/// ```rust,no_run
/// use farmmind_lite::backend::{CatalogBackend, HttpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("http://localhost:8080")?;
/// let crops = backend.list_crops().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Create a client without a request timeout.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client, optionally bounding every request.
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://localhost:8080`; a trailing `/` is ignored
    /// * `timeout` - Whole-request timeout, or `None` to wait indefinitely
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::configuration("API base URL must not be empty"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ApiError::configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            let params: Vec<String> = query
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    /// Send a request and return the status with the raw body.
    async fn send(&self, operation: &str, request: RequestBuilder) -> ApiResult<(u16, String)> {
        let response = request.send().await.map_err(|e| {
            ApiError::network(e.to_string()).with_context(ErrorContext::new(operation))
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            ApiError::network(e.to_string()).with_context(ErrorContext::new(operation))
        })?;
        tracing::debug!(operation, status, bytes = body.len(), "Backend response");
        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let (status, body) = self.send(operation, request).await?;
        parse_json_response(status, &body).map_err(|e| e.with_operation(operation))
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> ApiResult<Vec<T>> {
        let (status, body) = self.send(operation, request).await?;
        parse_json_list(status, &body).map_err(|e| e.with_operation(operation))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path, query);
        tracing::debug!(operation, %url, "GET");
        self.fetch(operation, self.client.get(&url)).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let url = self.url(path, query);
        tracing::debug!(operation, %url, "GET");
        self.fetch_list(operation, self.client.get(&url)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path, &[]);
        tracing::debug!(operation, %url, "POST");
        self.fetch(operation, self.client.post(&url).json(body)).await
    }

    /// POST without a body, for counter endpoints.
    async fn post_empty(&self, operation: &str, path: &str) -> ApiResult<MessageResponse> {
        let url = self.url(path, &[]);
        tracing::debug!(operation, %url, "POST");
        self.fetch(operation, self.client.post(&url)).await
    }

    async fn delete(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<MessageResponse> {
        let url = self.url(path, query);
        tracing::debug!(operation, %url, "DELETE");
        self.fetch(operation, self.client.delete(&url)).await
    }
}

fn image_part(image: &ImageUpload) -> ApiResult<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime_type)
        .map_err(|e| ApiError::validation(format!("Invalid image type: {}", e)))
}

fn listing_form(listing: &NewListing) -> ApiResult<Form> {
    let mut form = Form::new()
        .text("farmer_id", listing.farmer_id.to_string())
        .text("crop_type_id", listing.crop_type_id.to_string())
        .text("quantity_kg", listing.quantity_kg.to_string())
        .text("price_per_kg", listing.price_per_kg.to_string())
        .text("description", listing.description.clone())
        .text("tags", listing.tags_field());

    if let Some(date) = listing.harvest_ready_date {
        form = form.text("harvest_ready_date", date.format("%Y-%m-%d").to_string());
    }
    if let Some(lat) = listing.latitude {
        form = form.text("latitude", lat.to_string());
    }
    if let Some(lng) = listing.longitude {
        form = form.text("longitude", lng.to_string());
    }
    if let Some(ref image) = listing.image {
        form = form.part("image", image_part(image)?);
    }
    for image in &listing.extra_images {
        form = form.part("images", image_part(image)?);
    }
    Ok(form)
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn health_check(&self) -> ApiResult<bool> {
        #[derive(serde::Deserialize)]
        struct Health {
            #[serde(default)]
            status: String,
        }

        let health: Health = self.get("health_check", "/health", &[]).await?;
        Ok(matches!(health.status.to_lowercase().as_str(), "up" | "ok"))
    }

    async fn list_crops(&self) -> ApiResult<Vec<Crop>> {
        self.get_list("list_crops", "/api/crops", &[]).await
    }

    async fn estimate(&self, crop: &str, area_ha: f64) -> ApiResult<Estimate> {
        self.get(
            "estimate",
            "/api/estimate",
            &[("crop", crop.to_string()), ("area", area_ha.to_string())],
        )
        .await
    }
}

#[async_trait]
impl IrrigationBackend for HttpBackend {
    async fn generate_schedule(
        &self,
        crop: &str,
        planting_date: NaiveDate,
        region: &str,
    ) -> ApiResult<IrrigationSchedule> {
        self.get(
            "generate_schedule",
            "/api/irrigation",
            &[
                ("crop", crop.to_string()),
                ("planting_date", planting_date.format("%Y-%m-%d").to_string()),
                ("region", region.to_string()),
            ],
        )
        .await
    }

    async fn save_schedule(&self, request: &SaveScheduleRequest) -> ApiResult<MessageResponse> {
        self.post("save_schedule", "/api/irrigation/save", request).await
    }

    async fn list_saved_schedules(&self, user_id: UserId) -> ApiResult<Vec<SavedSchedule>> {
        self.get_list(
            "list_saved_schedules",
            "/api/irrigation/saved",
            &[("user_id", user_id.to_string())],
        )
        .await
    }

    async fn toggle_step(&self, step_id: StepId) -> ApiResult<MessageResponse> {
        self.post_empty("toggle_step", &format!("/api/irrigation/steps/{}/toggle", step_id))
            .await
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> ApiResult<MessageResponse> {
        self.delete(
            "delete_schedule",
            &format!("/api/irrigation/saved/{}", schedule_id),
            &[],
        )
        .await
    }
}

#[async_trait]
impl PriceBackend for HttpBackend {
    async fn list_prices(&self) -> ApiResult<Vec<PriceSummary>> {
        self.get_list("list_prices", "/api/prices", &[]).await
    }

    async fn submit_price(&self, submission: &PriceSubmission) -> ApiResult<MessageResponse> {
        self.post("submit_price", "/api/prices", submission).await
    }

    async fn delete_price(
        &self,
        price_id: PriceId,
        user_id: UserId,
    ) -> ApiResult<MessageResponse> {
        self.delete(
            "delete_price",
            &format!("/api/prices/{}", price_id),
            &[("user_id", user_id.to_string())],
        )
        .await
    }
}

#[async_trait]
impl MarketplaceBackend for HttpBackend {
    async fn list_listings(&self, filter: &ListingFilter) -> ApiResult<Vec<Listing>> {
        self.get_list("list_listings", "/api/marketplace", &filter.query_pairs())
            .await
    }

    async fn create_listing(&self, listing: &NewListing) -> ApiResult<MessageResponse> {
        let form = listing_form(listing)?;
        let url = self.url("/api/marketplace", &[]);
        tracing::debug!(%url, "POST multipart listing");
        self.fetch("create_listing", self.client.post(&url).multipart(form))
            .await
    }

    async fn delete_listing(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        self.delete(
            "delete_listing",
            &format!("/api/marketplace/{}", listing_id),
            &[],
        )
        .await
    }

    async fn record_view(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        self.post_empty("record_view", &format!("/api/marketplace/{}/view", listing_id))
            .await
    }

    async fn record_contact(&self, listing_id: ListingId) -> ApiResult<MessageResponse> {
        self.post_empty(
            "record_contact",
            &format!("/api/marketplace/{}/contact", listing_id),
        )
        .await
    }

    async fn watchlist(&self, user_id: UserId) -> ApiResult<Vec<Listing>> {
        self.get_list(
            "watchlist",
            "/api/watchlist",
            &[("user_id", user_id.to_string())],
        )
        .await
    }

    async fn save_listing(&self, request: &SavedListingRequest) -> ApiResult<MessageResponse> {
        self.post("save_listing", "/api/saved", request).await
    }

    async fn unsave_listing(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> ApiResult<MessageResponse> {
        self.delete(
            "unsave_listing",
            &format!("/api/saved/{}", listing_id),
            &[("user_id", user_id.to_string())],
        )
        .await
    }

    async fn list_demands(&self, filter: &DemandFilter) -> ApiResult<Vec<DemandRequest>> {
        self.get_list("list_demands", "/api/demands", &filter.query_pairs())
            .await
    }

    async fn post_demand(&self, demand: &NewDemand) -> ApiResult<MessageResponse> {
        self.post("post_demand", "/api/demands", demand).await
    }

    async fn delete_demand(
        &self,
        demand_id: DemandId,
        buyer_id: UserId,
    ) -> ApiResult<MessageResponse> {
        self.delete(
            "delete_demand",
            &format!("/api/demands/{}", demand_id),
            &[("buyer_id", buyer_id.to_string())],
        )
        .await
    }

    async fn farmer_analytics(&self, farmer_id: UserId) -> ApiResult<FarmerAnalytics> {
        self.get(
            "farmer_analytics",
            &format!("/api/farmers/{}/analytics", farmer_id),
            &[],
        )
        .await
    }

    async fn farmer_reviews(&self, farmer_id: UserId) -> ApiResult<Vec<Review>> {
        self.get_list(
            "farmer_reviews",
            &format!("/api/farmers/{}/reviews", farmer_id),
            &[],
        )
        .await
    }

    async fn submit_review(&self, review: &NewReview) -> ApiResult<MessageResponse> {
        self.post("submit_review", "/api/reviews", review).await
    }
}

#[async_trait]
impl AccountBackend for HttpBackend {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.post("register", "/api/register", request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.post("login", "/api/login", request).await
    }
}

#[async_trait]
impl CalendarBackend for HttpBackend {
    async fn calendar_events(
        &self,
        year: i32,
        month: u32,
        user_id: UserId,
    ) -> ApiResult<CalendarEvents> {
        self.get(
            "calendar_events",
            "/api/calendar/events",
            &[
                ("year", year.to_string()),
                ("month", month.to_string()),
                ("user_id", user_id.to_string()),
            ],
        )
        .await
    }

    async fn add_event(&self, event: &NewCalendarEvent) -> ApiResult<MessageResponse> {
        self.post("add_event", "/api/calendar/events", event).await
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn current_weather(&self, location: &str) -> ApiResult<CurrentWeather> {
        self.get(
            "current_weather",
            "/api/weather/current",
            &[("location", location.to_string())],
        )
        .await
    }

    async fn forecast(&self, location: &str) -> ApiResult<Forecast> {
        self.get(
            "forecast",
            "/api/weather/forecast",
            &[("location", location.to_string())],
        )
        .await
    }
}

#[async_trait]
impl DoctorBackend for HttpBackend {
    async fn analyze(&self, image: &ImageUpload) -> ApiResult<Diagnosis> {
        if image.is_empty() {
            return Err(ApiError::validation("Please choose a photo first"));
        }
        let form = Form::new().part("image", image_part(image)?);
        let url = self.url("/api/doctor/analyze", &[]);
        tracing::debug!(%url, bytes = image.bytes.len(), "POST multipart image");
        self.fetch("analyze", self.client.post(&url).multipart(form))
            .await
    }
}
