//! The generated artifact: a crypto prediction with its meme image and
//! registered coin.

use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// How strongly the prediction text commits to its claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Topic bucket of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Price,
    Technology,
    Adoption,
    Regulation,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::Technology => "Technology",
            Self::Adoption => "Adoption",
            Self::Regulation => "Regulation",
        }
    }
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// Built-in predictions used when the text backend is unavailable.
pub const FALLBACK_PREDICTIONS: &[&str] = &[
    "Bitcoin will hit $200K by end of 2025!",
    "Ethereum will flip Bitcoin by Q3 2025!",
    "Solana will reach $1000 this year!",
    "XRP will hit $10 after regulation clarity!",
    "DeFi TVL will exceed $500B in 2025!",
];

/// Timeframe attached to a fallback prediction.
pub const FALLBACK_TIMEFRAME: &str = "2025";

/// Pick one of [`FALLBACK_PREDICTIONS`] at random.
pub fn pick_fallback<R: Rng>(rng: &mut R) -> &'static str {
    FALLBACK_PREDICTIONS
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_PREDICTIONS[0])
}

/// Simulated launch price in `$0.0100..$0.1100`, four decimals.
pub fn simulated_launch_price<R: Rng>(rng: &mut R) -> String {
    format_price(rng.random_range(0.01..0.11))
}

/// Format a dollar price with four decimals.
pub fn format_price(value: f64) -> String {
    format!("${value:.4}")
}

/// Parse a `$`-prefixed price string. Unparseable input yields `None`.
pub fn parse_price(price: &str) -> Option<f64> {
    price.trim().trim_start_matches('$').parse().ok()
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// The payload a generation job produces and the Active Item displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Job id that produced this prediction (or `seed` for the initial item).
    pub id: String,
    /// Display text.
    pub text: String,
    /// Image reference (URL).
    pub image: String,
    /// Short ticker-like code derived from the text.
    pub coin_symbol: String,
    /// Registered asset address, when registration succeeded.
    pub coin_address: Option<String>,
    /// Price string, e.g. `$0.0500`.
    pub price: String,
    pub confidence: Confidence,
    pub timeframe: String,
    pub category: Category,
    pub created_at: Timestamp,
    /// Registration transaction reference, when one was produced.
    pub transaction_hash: Option<String>,
    /// Whether the registration backend reported success.
    pub registered: bool,
}

impl Prediction {
    /// The item shown before any job has been promoted.
    pub fn seed() -> Self {
        Self {
            id: "seed".to_string(),
            text: "Bitcoin will break $150K by end of 2025!".to_string(),
            image: "https://via.placeholder.com/400x400/1a1a1a/ffffff?text=BTC+150K".to_string(),
            coin_symbol: "BTC150K".to_string(),
            coin_address: None,
            price: "$0.05".to_string(),
            confidence: Confidence::High,
            timeframe: "2025".to_string(),
            category: Category::Price,
            created_at: Utc::now(),
            transaction_hash: None,
            registered: false,
        }
    }

    /// Whether this prediction came from the given job.
    pub fn produced_by(&self, job_id: JobId) -> bool {
        self.id == job_id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
