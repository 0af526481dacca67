//! Prefilled share messages and export file names.
//!
//! Rendering a page to PDF or an image is left to the UI shell; this module
//! only produces the text and names around it.

/// Opening line of a share message that matches no page template.
pub const GENERIC_SHARE_MESSAGE: &str = "FarmMind Lite orqali ulashildi";

const PLACEHOLDER: &str = "---";

/// Page data a share message can quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareDetails {
    pub crop: Option<String>,
    pub region: Option<String>,
    pub price: Option<f64>,
    pub prediction: Option<String>,
    /// Model confidence as a ratio, `0.0..=1.0`.
    pub confidence: Option<f64>,
}

/// Which message template a page uses.
#[derive(Debug, Clone, PartialEq)]
pub enum ShareContext {
    Irrigation { crop: String, region: String },
    Market { crop: String, price: Option<f64>, region: String },
    Doctor { prediction: String, confidence: f64 },
    Generic,
}

impl ShareContext {
    /// Pick the template from keywords in the page title, English or Uzbek.
    pub fn from_title(title: &str, details: &ShareDetails) -> Self {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(PLACEHOLDER)
                .to_string()
        };
        if title.contains("Irrigation") || title.contains("Sug'orish") {
            ShareContext::Irrigation {
                crop: text(&details.crop),
                region: text(&details.region),
            }
        } else if title.contains("Market") || title.contains("Bozor") {
            ShareContext::Market {
                crop: text(&details.crop),
                price: details.price,
                region: text(&details.region),
            }
        } else if title.contains("Doctor") || title.contains("Doktor") {
            ShareContext::Doctor {
                prediction: details
                    .prediction
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                confidence: details.confidence.unwrap_or(0.0),
            }
        } else {
            ShareContext::Generic
        }
    }
}

/// Build the prefilled message for a page.
///
/// `year` is the current calendar year, quoted by the irrigation template.
pub fn share_text(title: &str, context: &ShareContext, year: i32) -> String {
    match context {
        ShareContext::Irrigation { crop, region } => format!(
            "🌱 Salom! Bu mening {}-yilgi sug'orish jadvalim.\nFarmMind Lite orqali yaratdim.\n\n{}\nEkin: {}\nHudud: {}\n\nNima deb o'ylaysiz?",
            year, title, crop, region
        ),
        ShareContext::Market { crop, price, region } => {
            let price = price
                .map(|p| format!("{}", p))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            format!(
                "📢 Sotiladi: {}\nNarxi: {} so'm/kg\nHudud: {}\n\nBatafsil ma'lumot FarmMind Lite ilovasida.",
                crop, price, region
            )
        }
        ShareContext::Doctor {
            prediction,
            confidence,
        } => format!(
            "🚑 Ekinimda muammo chiqdi.\nAI Doktor shunday dedi: {}\nIshonch: {:.1}%\n\nMaslahat bera olasizmi?",
            prediction,
            confidence * 100.0
        ),
        ShareContext::Generic => format!("{}\n\n{}", GENERIC_SHARE_MESSAGE, title),
    }
}

/// Telegram share link carrying the page URL and the message.
pub fn telegram_share_url(page_url: &str, text: &str) -> String {
    format!(
        "https://t.me/share/url?url={}&text={}",
        urlencoding::encode(page_url),
        urlencoding::encode(text)
    )
}

/// File name for a PDF export: the title lowercased, whitespace runs
/// replaced by `_`, then the timestamp in milliseconds.
pub fn export_file_name(title: &str, timestamp_ms: i64) -> String {
    let stem = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}.pdf", stem, timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_title_keywords() {
        let details = ShareDetails {
            crop: Some("Cotton".to_string()),
            region: Some("Bukhara".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ShareContext::from_title("Sug'orish jadvali", &details),
            ShareContext::Irrigation {
                crop: "Cotton".to_string(),
                region: "Bukhara".to_string(),
            }
        );
        assert!(matches!(
            ShareContext::from_title("Bozor narxlari", &details),
            ShareContext::Market { .. }
        ));
        assert_eq!(
            ShareContext::from_title("Weekly notes", &details),
            ShareContext::Generic
        );
    }

    #[test]
    fn test_missing_fields_use_placeholder() {
        let context = ShareContext::from_title("Irrigation Plan", &ShareDetails::default());
        let text = share_text("Irrigation Plan", &context, 2025);
        assert!(text.contains("2025-yilgi"));
        assert!(text.contains("Ekin: ---"));
    }

    #[test]
    fn test_doctor_confidence_as_percent() {
        let context = ShareContext::Doctor {
            prediction: "Leaf Rust".to_string(),
            confidence: 0.873,
        };
        assert!(share_text("Crop Doctor", &context, 2025).contains("Ishonch: 87.3%"));
    }

    #[test]
    fn test_telegram_url_is_encoded() {
        let url = telegram_share_url("https://farm.uz/market?crop=1", "Narxi: 5 so'm\nHudud");
        assert_eq!(
            url,
            "https://t.me/share/url?url=https%3A%2F%2Ffarm.uz%2Fmarket%3Fcrop%3D1&text=Narxi%3A%205%20so%27m%0AHudud"
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("My  Irrigation Plan", 1700000000000),
            "my_irrigation_plan_1700000000000.pdf"
        );
    }
}
