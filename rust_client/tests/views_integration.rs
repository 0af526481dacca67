//! View-models driven end to end against the local backend.

mod support;

use chrono::NaiveDate;

use farmmind_lite::backend::{LocalBackend, PriceBackend};
use farmmind_lite::estimator::{AreaUnit, CostFlags, CostRates, EstimateWarning};
use farmmind_lite::models::{
    ListingId, NewDemand, NewListing, PriceSubmission, Role, UserId, VolumeTier,
};
use farmmind_lite::session::{guard_route, RouteDecision, SessionStorage};
use farmmind_lite::views::{
    AuthView, CalendarView, CropCatalog, DoctorView, EstimatorView, IrrigationView,
    MarketPricesView, MarketplaceView, Refresh, ViewState, WeatherView,
};
use support::{registration, Harness, COTTON, TOMATO, WHEAT};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =========================================================
// Auth and session
// =========================================================

#[tokio::test]
async fn test_register_lands_by_role_and_logout_guards_routes() {
    let h = Harness::new();
    let mut auth = AuthView::new(h.backend.clone(), h.session.clone());

    let buyer = auth.register(registration("Laylo", Role::Buyer)).await.unwrap();
    assert_eq!(buyer.route, "/marketplace");
    assert_eq!(h.session.get_session(), Some(buyer.session.clone()));
    assert_eq!(
        guard_route("/marketplace", h.session.get_session().as_ref()),
        RouteDecision::Allow
    );

    assert_eq!(auth.logout().unwrap(), "/");
    assert_eq!(h.session.get_session(), None);
    assert_eq!(h.storage.get("farm_user").unwrap(), None);
    assert_eq!(
        guard_route("/marketplace", h.session.get_session().as_ref()),
        RouteDecision::Redirect("/register")
    );

    let farmer_request = registration("Otabek", Role::Farmer);
    auth.register(farmer_request.clone()).await.unwrap();
    auth.logout().unwrap();
    let farmer = auth
        .login(&farmer_request.email, &farmer_request.password)
        .await
        .unwrap();
    assert_eq!(farmer.route, "/irrigation");
    assert_eq!(farmer.message, "Login successful!");
}

#[tokio::test]
async fn test_failed_login_keeps_signed_out_and_sets_alert() {
    let h = Harness::new();
    let mut auth = AuthView::new(h.backend.clone(), h.session.clone());
    assert!(auth.login("ghost@example.uz", "nope").await.is_err());
    assert_eq!(auth.alert.as_deref(), Some("Invalid email or password"));
    assert!(!h.session.is_signed_in());

    assert!(auth.login("", "").await.is_err());
    assert_eq!(auth.alert.as_deref(), Some("Email and Password are required"));
}

// =========================================================
// Estimator
// =========================================================

#[tokio::test]
async fn test_estimator_scenario_applies_costs_before_risk() {
    let h = Harness::new();
    let rates = CostRates {
        seeds: 70.0,
        ..CostRates::default()
    };
    let mut view = EstimatorView::new(h.backend.clone(), rates);
    view.form.crop = "Wheat".to_string();
    view.form.area = "200".to_string();
    view.form.unit = AreaUnit::Sotyk;
    view.form.flags = CostFlags {
        seeds: true,
        ..CostFlags::default()
    };
    view.form.risk_level = 50.0;

    let result = view.estimate().await.unwrap().clone();
    let derived = &result.derived;
    assert_eq!(derived.area_ha, 2.0);
    assert_eq!(derived.net.total_costs, 140.0);
    let expected_min = (result.estimate.min_income_usd - 140.0).max(0.0) * 0.5;
    assert!((derived.min_income_usd - expected_min).abs() < 1e-9);
    assert!((derived.min_yield_kg - result.estimate.min_yield_kg * 0.5).abs() < 1e-9);
    assert_eq!(derived.water_m3, 8000.0);
    assert_eq!(derived.warnings, vec![EstimateWarning::HighWaterDemand]);
    assert!(view.alert.is_none());

    let comparison = view.compare_with("Carrot").await.unwrap();
    assert_eq!(comparison.secondary.crop_name, "Carrot");
    assert_eq!(comparison.water_delta_m3, 8000.0 - 7000.0);
}

#[tokio::test]
async fn test_comparison_uses_the_plot_of_the_current_result() {
    let h = Harness::new();
    let mut view = EstimatorView::new(h.backend.clone(), CostRates::default());
    view.form.crop = "Wheat".to_string();
    view.form.area = "2".to_string();
    view.form.unit = AreaUnit::Hectare;
    view.form.risk_level = 20.0;
    view.estimate().await.unwrap();

    view.form.area = "not yet typed".to_string();
    view.form.risk_level = 90.0;
    let comparison = view.compare_with("Onion").await.unwrap();
    assert_eq!(comparison.secondary.area_ha, 2.0);
    assert_eq!(comparison.secondary.risk_level, 20.0);
    assert_eq!(comparison.secondary.water_m3, 8000.0);
    assert_eq!(comparison.water_delta_m3, 0.0);
}

#[tokio::test]
async fn test_estimator_rejects_bad_area_before_any_request() {
    let h = Harness::new();
    h.local.set_healthy(false);
    let mut view = EstimatorView::new(h.backend.clone(), CostRates::default());
    view.form.crop = "Wheat".to_string();
    view.form.area = "two hundred".to_string();

    let err = view.estimate().await.unwrap_err();
    // A request would have produced a connection error instead.
    assert_eq!(err.status(), Some(400));
    assert!(view.result.is_none());
    assert!(view.alert.is_some());
}

#[tokio::test]
async fn test_estimator_network_failure_clears_previous_result() {
    let h = Harness::new();
    let mut view = EstimatorView::new(h.backend.clone(), CostRates::default());
    view.form.crop = "Cotton".to_string();
    view.form.area = "1".to_string();
    view.form.unit = AreaUnit::Hectare;
    view.estimate().await.unwrap();
    assert!(view.result.is_some());

    h.local.set_healthy(false);
    assert!(view.estimate().await.is_err());
    assert!(view.result.is_none());
    assert_eq!(view.alert.as_deref(), Some("Connection error"));
}

// =========================================================
// Catalogue, prices
// =========================================================

#[tokio::test]
async fn test_catalog_refresh_and_lookup() {
    let h = Harness::new();
    let mut catalog = CropCatalog::new(h.backend.clone());
    catalog.refresh().await.unwrap();
    assert_eq!(catalog.crops.items().len(), 8);
    assert_eq!(catalog.find("wheat").map(|c| c.id), Some(WHEAT));
    assert_eq!(catalog.name_of(TOMATO), Some("Tomato"));

    h.local.set_healthy(false);
    assert!(catalog.refresh().await.is_err());
    assert_eq!(catalog.crops, ViewState::Failed("Connection error".to_string()));
}

#[tokio::test]
async fn test_price_submit_then_refresh_includes_report() {
    let h = Harness::new();
    let farmer = h.sign_in("Price Farmer", Role::Farmer).await;
    let mut view = MarketPricesView::new(h.backend.clone(), h.session.clone());

    view.refresh().await.unwrap();
    assert_eq!(view.prices, ViewState::Empty);

    view.submit(PriceSubmission::new(WHEAT, "Namangan", 4100.0, VolumeTier::Retail, None))
        .await
        .unwrap();
    let row = view.find("Wheat", "Namangan").unwrap();
    assert_eq!(row.history.len(), 1);
    assert_eq!(row.history[0].price, 4100.0);
    assert_eq!(row.submitted_by, Some(farmer.id));
    assert_eq!(view.owned().len(), 1);

    view.submit(PriceSubmission::new(COTTON, "Bukhara", 8000.0, VolumeTier::Wholesale, None))
        .await
        .unwrap();
    view.category = "Commercial".to_string();
    assert_eq!(view.visible().len(), 1);
    view.category = "All".to_string();
    view.search = "NAMAN".to_string();
    assert_eq!(view.visible()[0].crop, "Wheat");

    let price_id = view.find("Wheat", "Namangan").unwrap().id.unwrap();
    view.delete(price_id).await.unwrap();
    assert!(view.find("Wheat", "Namangan").is_none());
}

#[tokio::test]
async fn test_price_delete_requires_session() {
    let h = Harness::new();
    h.backend
        .submit_price(&PriceSubmission::new(WHEAT, "Navoi", 4000.0, VolumeTier::Retail, None))
        .await
        .unwrap();

    let mut view = MarketPricesView::new(h.backend.clone(), h.session.clone());
    view.refresh().await.unwrap();
    let price_id = view.prices.items()[0].id.unwrap();
    assert_eq!(view.delete(price_id).await.unwrap_err().status(), Some(400));
}

// =========================================================
// Irrigation
// =========================================================

#[tokio::test]
async fn test_irrigation_preview_save_and_track() {
    let h = Harness::new();
    let mut view = IrrigationView::new(h.backend.clone(), h.session.clone());

    let err = view.save().await.unwrap_err();
    assert_eq!(err.user_message(), "User identification lost. Please log out and back in.");

    h.sign_in("Irrigation Farmer", Role::Farmer).await;
    let err = view.save().await.unwrap_err();
    assert_eq!(err.user_message(), "No cycle data to save. Please generate a schedule first.");

    view.generate("Cotton", date(2025, 4, 1), "Khorezm").await.unwrap();
    let preview = view.preview.data().unwrap().clone();
    assert_eq!(preview.region, "Khorezm");

    let ack = view.save().await.unwrap();
    assert_eq!(ack.message, "Schedule saved successfully");
    let saved = view.saved.items().to_vec();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].steps.len(), preview.schedule.reminders.len());

    view.toggle_step(saved[0].steps[0].id).await.unwrap();
    assert!(view.saved.items()[0].steps[0].is_completed());

    view.delete_schedule(saved[0].id).await.unwrap();
    assert_eq!(view.saved, ViewState::Empty);
}

#[tokio::test]
async fn test_irrigation_unknown_crop_preview_is_empty() {
    let h = Harness::new();
    let mut view = IrrigationView::new(h.backend.clone(), h.session.clone());
    view.generate("Saffron", date(2025, 4, 1), "").await.unwrap();
    assert_eq!(view.preview, ViewState::Empty);
}

// =========================================================
// Marketplace
// =========================================================

async fn seeded_marketplace() -> (Harness, ListingId) {
    let h = Harness::new();
    let farmer = support::register(&h.local, "Seller", Role::Farmer).await;
    let mut seller_view = MarketplaceView::new(h.backend.clone(), h.session.clone());
    h.session.set_session(farmer.clone()).unwrap();
    let ack = seller_view
        .create_listing(NewListing::new(farmer.id, WHEAT, 500.0, 4000.0))
        .await
        .unwrap();
    h.session.clear_session().unwrap();
    (h, ListingId(ack.id.unwrap()))
}

#[tokio::test]
async fn test_watchlist_toggle_reflects_server_state() {
    let (h, listing_id) = seeded_marketplace().await;
    h.sign_in("Watching Buyer", Role::Buyer).await;
    let mut view = MarketplaceView::new(h.backend.clone(), h.session.clone());
    view.refresh().await.unwrap();
    view.refresh_watchlist().await.unwrap();
    assert!(!view.is_saved(listing_id));

    assert!(view.toggle_saved(listing_id).await.unwrap());
    assert!(view.is_saved(listing_id));
    assert_eq!(view.watchlist.items()[0].id, listing_id);

    assert!(!view.toggle_saved(listing_id).await.unwrap());
    assert!(view.saved_ids().is_empty());
    assert_eq!(view.watchlist, ViewState::Empty);
}

#[tokio::test]
async fn test_failed_watchlist_mutation_leaves_set_unchanged() {
    let (h, listing_id) = seeded_marketplace().await;
    h.sign_in("Unlucky Buyer", Role::Buyer).await;
    let mut view = MarketplaceView::new(h.backend.clone(), h.session.clone());
    view.toggle_saved(listing_id).await.unwrap();
    assert!(view.is_saved(listing_id));

    h.local.set_healthy(false);
    assert!(view.toggle_saved(listing_id).await.is_err());
    assert!(view.is_saved(listing_id));

    h.local.set_healthy(true);
    view.refresh_watchlist().await.unwrap();
    assert!(view.is_saved(listing_id));
}

#[tokio::test]
async fn test_watchlist_requires_session() {
    let (h, listing_id) = seeded_marketplace().await;
    let mut view = MarketplaceView::new(h.backend.clone(), h.session.clone());
    assert!(view.toggle_saved(listing_id).await.is_err());
    view.refresh_watchlist().await.unwrap();
    assert_eq!(view.watchlist, ViewState::Idle);
}

#[tokio::test]
async fn test_review_refreshes_reviews_and_listings() {
    let (h, listing_id) = seeded_marketplace().await;
    h.sign_in("Reviewer", Role::Buyer).await;
    let mut view = MarketplaceView::new(h.backend.clone(), h.session.clone());
    view.refresh().await.unwrap();
    let listing = view.listings.items()[0].clone();
    assert_eq!(listing.id, listing_id);

    view.open_listing(listing.clone()).await;
    assert!(view.submit_review(0, "no stars").await.is_err());
    view.submit_review(4, "Clean grain, on time").await.unwrap();

    assert_eq!(view.reviews.items().len(), 1);
    assert_eq!(view.listings.items()[0].review_count, 1);
    assert_eq!(view.selected.as_ref().map(|l| l.average_rating), Some(4.0));

    view.record_contact(listing_id).await.unwrap();
    view.load_analytics(listing.farmer_id).await.unwrap();
    let analytics = view.analytics.data().unwrap();
    assert_eq!(analytics.total_views, 1);
    assert_eq!(analytics.total_contacts, 1);
}

#[tokio::test]
async fn test_demands_post_and_delete() {
    let h = Harness::new();
    let buyer = h.sign_in("Demand Buyer", Role::Buyer).await;
    let mut view = MarketplaceView::new(h.backend.clone(), h.session.clone());

    view.post_demand(NewDemand {
        buyer_id: UserId(0),
        crop_type_id: TOMATO,
        quantity_kg: 1500.0,
        max_price_per_kg: 0.0,
        needed_by: "2025-08-15".to_string(),
        region: "Samarkand".to_string(),
        description: "For the cannery".to_string(),
    })
    .await
    .unwrap();
    let demand = view.demands.items()[0].clone();
    assert_eq!(demand.buyer_id, buyer.id);

    view.delete_demand(demand.id).await.unwrap();
    assert_eq!(view.demands, ViewState::Empty);
}

// =========================================================
// Calendar, weather, doctor
// =========================================================

#[tokio::test]
async fn test_calendar_navigation_and_events() {
    let h = Harness::new();
    h.sign_in("Calendar User", Role::Farmer).await;
    let mut view = CalendarView::new(h.backend.clone(), h.session.clone(), date(2024, 12, 5));

    view.add_event("Harvest carrots", "harvest", date(2024, 12, 20), "")
        .await
        .unwrap();
    assert_eq!(view.events_on(date(2024, 12, 20)).len(), 1);
    assert_eq!(view.summary().harvest, 1);

    view.next_month().await.unwrap();
    assert_eq!((view.year(), view.month()), (2025, 1));
    assert_eq!(view.events, ViewState::Empty);

    view.previous_month().await.unwrap();
    assert_eq!((view.year(), view.month()), (2024, 12));
    view.filter = "irrigation".to_string();
    assert!(view.events_on(date(2024, 12, 20)).is_empty());

    assert!(view.add_event("  ", "other", date(2024, 12, 1), "").await.is_err());
}

#[tokio::test]
async fn test_weather_and_doctor() {
    let h = Harness::new();
    let mut weather = WeatherView::new(h.backend.clone(), "Tashkent");
    weather.refresh().await.unwrap();
    let report = weather.report.data().unwrap();
    assert_eq!(report.daily.len(), 5);

    weather.set_location("Nukus").await.unwrap();
    assert_eq!(weather.location, "Nukus");

    let mut doctor = DoctorView::new(h.backend.clone());
    assert!(doctor.analyze(Vec::new(), "leaf.jpg").await.is_err());
    assert!(doctor.diagnosis.is_none());
    let diagnosis = doctor.analyze(vec![0xFF, 0xD8], "leaf.jpg").await.unwrap();
    assert!(diagnosis.is_healthy());
    assert!(doctor.alert.is_none());
}

#[tokio::test]
async fn test_shared_local_backend_sees_one_state() {
    let local = LocalBackend::new();
    let clone = local.clone();
    clone
        .submit_price(&PriceSubmission::new(WHEAT, "Termez", 3000.0, VolumeTier::Retail, None))
        .await
        .unwrap();
    assert_eq!(local.list_prices().await.unwrap().len(), 1);
}
