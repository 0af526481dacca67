//! FarmMind command-line client.
//!
//! Drives the same view-models a UI shell would, against the configured
//! backend.
//!
//! # Usage
//!
//! ```bash
//! farmmind crops
//! farmmind estimate --crop Wheat --area 200 --seeds --risk 20 --compare Cotton
//! farmmind irrigation --crop Cotton --date 2025-04-01 --region Fergana --save
//! farmmind --local prices --search tashkent
//! ```
//!
//! # Environment Variables
//!
//! - `FARMMIND_BACKEND`: `http` or `local`
//! - `FARMMIND_API_URL`: REST API base URL
//! - `FARMMIND_STORAGE_DIR`: where the session record is kept
//! - `RUST_LOG`: Log level (default: warn)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use farmmind_lite::backend::{BackendFactory, FullBackend};
use farmmind_lite::config::ClientConfig;
use farmmind_lite::estimator::{AreaUnit, CostFlags, RiskBand};
use farmmind_lite::models::{RegisterRequest, Role};
use farmmind_lite::session::{nav_routes, FileStorage, SessionContext};
use farmmind_lite::views::{
    AuthView, CropCatalog, EstimatorView, IrrigationView, MarketPricesView, Refresh, ViewState,
    WeatherView,
};

#[derive(Debug, Parser)]
#[command(name = "farmmind", version, about = "FarmMind Lite from the terminal")]
struct Cli {
    /// Configuration file (default: search for farmmind.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-memory backend instead of the REST API
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List supported crops
    Crops,
    /// Estimate yield and income for a plot
    Estimate {
        #[arg(long)]
        crop: String,
        /// Plot size in the chosen unit
        #[arg(long)]
        area: String,
        #[arg(long, default_value = "sotyk")]
        unit: AreaUnit,
        #[arg(long)]
        seeds: bool,
        #[arg(long)]
        fertilizer: bool,
        #[arg(long)]
        labor: bool,
        /// Expected loss in percent
        #[arg(long, default_value = "0")]
        risk: f64,
        /// Second crop to compare on the same plot
        #[arg(long)]
        compare: Option<String>,
    },
    /// Generate an irrigation schedule
    Irrigation {
        #[arg(long)]
        crop: String,
        /// Planting date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        region: String,
        /// Save the schedule for the signed-in user
        #[arg(long)]
        save: bool,
    },
    /// Show market prices
    Prices {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Current weather and forecast
    Weather {
        #[arg(long)]
        location: Option<String>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        region: String,
        #[arg(long, default_value = "farmer")]
        role: Role,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let backend: Arc<dyn FullBackend> = if cli.local {
        BackendFactory::create_local()
    } else {
        BackendFactory::create(&config).context("Failed to create backend")?
    };
    let storage = FileStorage::new(&config.storage.dir);
    let session = Arc::new(SessionContext::new(Arc::new(storage)));

    match cli.command {
        Command::Crops => {
            let mut catalog = CropCatalog::new(backend);
            catalog.refresh().await?;
            for crop in catalog.crops.items() {
                println!("{:>3}  {}", crop.id, crop.name);
            }
        }
        Command::Estimate {
            crop,
            area,
            unit,
            seeds,
            fertilizer,
            labor,
            risk,
            compare,
        } => {
            let mut view = EstimatorView::new(backend, config.estimator.cost_per_ha);
            view.form.crop = crop;
            view.form.area = area;
            view.form.unit = unit;
            view.form.flags = CostFlags {
                seeds,
                fertilizer,
                labor,
            };
            view.form.risk_level = risk;

            let result = view.estimate().await?;
            let derived = &result.derived;
            println!("{} on {:.2} ha", derived.crop_name, derived.area_ha);
            println!(
                "  yield     {:.0} - {:.0} kg",
                derived.min_yield_kg, derived.max_yield_kg
            );
            println!(
                "  income    ${:.0} - ${:.0} (costs ${:.0})",
                derived.min_income_usd, derived.max_income_usd, derived.net.total_costs
            );
            println!("  water     {:.0} m³", derived.water_m3);
            println!("  per m³    ${:.3}", derived.water_to_wallet);
            println!("  risk      {}", risk_label(derived.risk_band));
            for warning in &derived.warnings {
                println!("  warning   {:?}", warning);
            }

            if let Some(other) = compare {
                let comparison = view.compare_with(&other).await?;
                println!(
                    "{} vs {}: max income {:+.0} USD, water {:+.0} m³; {} pays more",
                    comparison.primary.crop_name,
                    comparison.secondary.crop_name,
                    comparison.max_income_delta,
                    comparison.water_delta_m3,
                    comparison.more_profitable()
                );
            }
        }
        Command::Irrigation {
            crop,
            date,
            region,
            save,
        } => {
            let mut view = IrrigationView::new(backend, session);
            view.generate(&crop, date, &region).await?;
            match &view.preview {
                ViewState::Ready(preview) => {
                    println!("{} planted {}", preview.schedule.crop_name, preview.planting_date);
                    for reminder in &preview.schedule.reminders {
                        println!("  {}  {:<14} {}", reminder.date, reminder.stage, reminder.action);
                    }
                }
                _ => println!("No irrigation steps for {}", crop),
            }
            if save {
                let response = view.save().await?;
                println!("{}", response.message);
            }
        }
        Command::Prices { search, category } => {
            let mut view = MarketPricesView::new(backend, session);
            if let Some(search) = search {
                view.search = search;
            }
            if let Some(category) = category {
                view.category = category;
            }
            view.refresh().await?;
            for row in view.visible() {
                let trend = row
                    .trend_percent()
                    .map(|t| format!("{:+.1}%", t))
                    .unwrap_or_default();
                println!(
                    "{:<10} {:<16} retail {:>8.0}  wholesale {:>8.0}  {}",
                    row.crop, row.region, row.retail_price, row.wholesale_price, trend
                );
            }
        }
        Command::Weather { location } => {
            let location = location.unwrap_or(config.weather.default_location);
            let mut view = WeatherView::new(backend, location);
            view.refresh().await?;
            if let ViewState::Ready(report) = &view.report {
                let now = &report.current;
                println!(
                    "{}: {:.0}°C, {}, humidity {}%",
                    view.location, now.temp, now.condition, now.humidity
                );
                for day in &report.daily {
                    println!(
                        "  {}  {:>3.0}/{:<3.0} {:<14} rain {}%",
                        day.date, day.temp_max, day.temp_min, day.condition, day.rain_chance
                    );
                }
                for tip in report.tips() {
                    println!("  tip: {:?}", tip);
                }
            }
        }
        Command::Login { email, password } => {
            let mut view = AuthView::new(backend, session);
            let signed_in = view.login(&email, &password).await?;
            println!("{} Continue at {}", signed_in.message, signed_in.route);
        }
        Command::Register {
            full_name,
            email,
            phone,
            region,
            role,
            password,
        } => {
            let mut view = AuthView::new(backend, session);
            let signed_in = view
                .register(RegisterRequest {
                    full_name,
                    email,
                    phone_number: phone,
                    region,
                    role,
                    password,
                })
                .await?;
            println!("{} Continue at {}", signed_in.message, signed_in.route);
        }
        Command::Logout => {
            let mut view = AuthView::new(backend, session);
            view.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match session.get_session() {
            Some(user) => {
                println!("{} ({}, {})", user.full_name, user.role, user.region);
                println!("Pages: {}", nav_routes(user.role).join(" "));
            }
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

fn risk_label(band: RiskBand) -> &'static str {
    match band {
        RiskBand::Ideal => "ideal",
        RiskBand::Elevated => "elevated",
        RiskBand::Scorched => "scorched",
        RiskBand::Wilting => "wilting",
    }
}
