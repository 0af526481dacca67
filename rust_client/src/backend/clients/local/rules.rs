//! Server-side business rules reproduced for the in-memory backend.
//!
//! The tables here are the ones the production server hard-codes: per-crop
//! yield ranges with fallback prices, and growth-stage irrigation steps with
//! a per-region day offset.

use chrono::{Duration, NaiveDate};

use crate::models::{
    CurrentWeather, DailyForecast, Diagnosis, Estimate, Forecast, IrrigationSchedule, Reminder,
};

/// Crop names seeded into a fresh local backend, in catalogue order.
pub const DEFAULT_CROPS: [&str; 8] = [
    "Carrot", "Cotton", "Maize", "Onion", "Potato", "Rice", "Tomato", "Wheat",
];

/// Yield range in kg/ha and fallback price in USD/kg.
struct YieldRule {
    min_kg_per_ha: f64,
    max_kg_per_ha: f64,
    price_per_kg: f64,
}

fn yield_rule(crop: &str) -> YieldRule {
    let (min_kg_per_ha, max_kg_per_ha, price_per_kg) = match crop {
        "Wheat" => (2500.0, 4500.0, 0.42),
        "Rice" => (3500.0, 5500.0, 0.85),
        "Tomato" => (15000.0, 30000.0, 0.50),
        "Onion" => (10000.0, 20000.0, 0.33),
        "Cotton" => (1000.0, 2500.0, 0.50),
        "Carrot" => (15000.0, 30000.0, 0.35),
        "Maize" => (4000.0, 7000.0, 0.18),
        "Potato" => (12000.0, 22000.0, 0.30),
        _ => (500.0, 1500.0, 0.10),
    };
    YieldRule {
        min_kg_per_ha,
        max_kg_per_ha,
        price_per_kg,
    }
}

/// Estimate for `area_ha` hectares of `crop`.
///
/// A positive `market_price` (the average of reported prices) replaces the
/// table's fallback price.
pub fn estimate_for(crop: &str, area_ha: f64, market_price: f64) -> Estimate {
    let rule = yield_rule(crop);
    let price = if market_price > 0.0 {
        market_price
    } else {
        rule.price_per_kg
    };
    let min_yield = rule.min_kg_per_ha * area_ha;
    let max_yield = rule.max_kg_per_ha * area_ha;

    Estimate {
        crop_name: crop.to_string(),
        min_yield_kg: min_yield,
        max_yield_kg: max_yield,
        min_income_usd: min_yield * price,
        max_income_usd: max_yield * price,
        avg_price_per_kg: price,
    }
}

/// Days every reminder moves for a region: hot lowlands water earlier,
/// the mountains later.
pub fn region_offset(region: &str) -> i64 {
    match region {
        "Karakalpakstan" | "Khorezm" => -2,
        "Mountainous" => 3,
        _ => 0,
    }
}

/// (day after planting, stage, action, notes)
type Step = (i64, &'static str, &'static str, &'static str);

#[rustfmt::skip]
fn irrigation_steps(crop: &str) -> &'static [Step] {
    match crop {
        "Wheat" => &[
            (7, "Emergence", "Initial irrigation to establish roots.",
             "Light watering ensures seeds sprout evenly. Watch for winter pests."),
            (28, "Tillering", "Increased water needed for stem growth.",
             "Stems are developing. Apply nitrogen fertilizer if needed before watering."),
            (60, "Flowering", "Critical: peak water demand.",
             "Water stress now reduces grain number. Check for powdery mildew signs."),
        ],
        "Cotton" => &[
            (8, "Germination", "Light frequent irrigation (3-4 days).",
             "Cotton seeds need warm, moist soil to emerge. Check for crusting."),
            (25, "Seedling", "Moderate watering; establish roots.",
             "Monitor for aphids and early-season pests. Avoid waterlogging."),
            (45, "Squaring (Bloom)", "Increase frequency; maintain moisture.",
             "First flower buds forming. Consistent water prevents 'square drop'."),
            (75, "Boll Development", "Deep watering every 5-7 days.",
             "Fiber quality is determined now. Peak water demand phase."),
            (110, "Boll Maturation", "Stop irrigation.",
             "Stop watering once bolls begin to open to allow drying."),
        ],
        "Rice" => &[
            (1, "Establishment", "Maintain shallow flood (2-3cm).",
             "Keep soil saturated for seedling emergence. Check for waterweeds."),
            (30, "Tillering", "Increase flood depth (5-10cm).",
             "Critical phase for stem development. Maintain consistent water level."),
            (80, "Flowering", "Maintain maximum flood depth.",
             "Rice is most sensitive to water stress now. Avoid any drainage."),
            (115, "Ripening", "Drain field 2 weeks before harvest.",
             "Gradual drainage allows soil to firm up for machinery/harvesting."),
        ],
        "Tomato" => &[
            (4, "Establishment", "Light frequent irrigation.",
             "Prevent roots from drying out. Consider light mulch for moisture retention."),
            (30, "Flowering & Fruit Set", "Consistent moisture; avoid fluctuations.",
             "Watering twice a week. Prevents blossom end rot. Check for leaf curl."),
            (60, "Ripening", "Maintain deep watering.",
             "Regular watering keeps fruits succulent and prevents cracking."),
        ],
        "Maize" => &[
            (5, "Germination", "Uniform soil moisture.",
             "Critical for uniform emergence. Watch for wireworms in the soil."),
            (55, "Pollination (Tasseling)", "High water demand; irrigation is vital.",
             "Water stress during silking causes immediate yield loss."),
        ],
        "Potato" => &[
            (20, "Sprouting", "Deep moisture; no saturation.",
             "Check for Colorado Beetle larvae. Keep ridges moist."),
            (45, "Tuber Bulking", "Consistent moisture every 4-6 days.",
             "Watering ensures tuber size uniformity. Check for late blight."),
        ],
        "Carrot" => &[
            (5, "Germination", "Fine misting every 2 days.",
             "Carrot seeds are small and surface-planted; they dry out quickly."),
            (40, "Root Expansion", "Deep watering twice a week.",
             "Promotes long, straight growth of the taproot."),
        ],
        "Onion" => &[
            (14, "Establishment", "Frequent light irrigation.",
             "Onions have shallow roots and need water near the surface."),
            (60, "Bulb Formation", "Keep moisture consistent.",
             "Bulb size depends on adequate water during this fast-growth phase."),
        ],
        _ => &[],
    }
}

/// Rule-based schedule for a crop planted on `planting_date` in `region`.
///
/// Unknown crops get a schedule with no reminders.
pub fn irrigation_schedule(
    crop: &str,
    planting_date: NaiveDate,
    region: &str,
) -> IrrigationSchedule {
    let offset = region_offset(region);
    let reminders = irrigation_steps(crop)
        .iter()
        .map(|&(day, stage, action, notes)| Reminder {
            date: planting_date + Duration::days(day + offset),
            stage: stage.to_string(),
            action: action.to_string(),
            notes: notes.to_string(),
        })
        .collect();

    IrrigationSchedule {
        crop_name: crop.to_string(),
        reminders,
    }
}

const CONDITIONS: [&str; 4] = ["Clear", "Clouds", "Rain", "Clear"];

/// Seed derived from the location name, so each place gets its own figures.
fn location_seed(location: &str) -> u32 {
    location.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

/// Stable stand-in for current conditions.
pub fn sample_current_weather(location: &str) -> CurrentWeather {
    let seed = location_seed(location);
    let temp = 18.0 + (seed % 12) as f64;
    CurrentWeather {
        temp,
        feels_like: temp - 1.0,
        humidity: 35 + (seed % 30) as i32,
        pressure: 1012,
        wind_speed: 2.5,
        uv_index: 0.0,
        condition: CONDITIONS[(seed % 4) as usize].to_string(),
        sunrise: "06:00".to_string(),
        sunset: "19:00".to_string(),
    }
}

/// Stable five-day stand-in forecast starting at `start`.
pub fn sample_forecast(location: &str, start: NaiveDate) -> Forecast {
    let seed = location_seed(location);
    let daily = (0..5u32)
        .map(|day| {
            let shift = seed.wrapping_add(day);
            let condition = CONDITIONS[(shift % 4) as usize];
            DailyForecast {
                date: (start + Duration::days(day as i64)).format("%Y-%m-%d").to_string(),
                temp_max: 24.0 + (shift % 8) as f64,
                temp_min: 12.0 + (shift % 5) as f64,
                condition: condition.to_string(),
                rain_chance: if condition == "Rain" { 70 } else { 10 },
            }
        })
        .collect();
    Forecast { daily }
}

/// Canned verdict returned for any accepted photo.
pub fn sample_diagnosis() -> Diagnosis {
    Diagnosis {
        disease: "Healthy".to_string(),
        confidence: "90%".to_string(),
        severity: "None".to_string(),
        treatment: vec![
            "Keep a regular watering schedule.".to_string(),
            "Inspect leaves weekly for spots or pests.".to_string(),
            "Remove weeds around the plants.".to_string(),
        ],
    }
}
