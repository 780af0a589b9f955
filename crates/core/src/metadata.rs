//! Asset metadata submitted to the registration backend.

use serde::Serialize;

use crate::analysis::{analyze_confidence, categorize, extract_timeframe};

/// A single `trait_type`/`value` pair, as marketplaces expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub trait_type: &'static str,
    pub value: String,
}

/// Name, symbol, description and image for a prediction coin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub attributes: Vec<Attribute>,
}

impl AssetMetadata {
    /// Build metadata for `prediction` with an already-derived `symbol`.
    ///
    /// `public_url` is the service's externally reachable base URL.
    pub fn for_prediction(prediction: &str, symbol: &str, image: &str, public_url: &str) -> Self {
        let attributes = vec![
            Attribute {
                trait_type: "Prediction Category",
                value: categorize(prediction).as_str().to_string(),
            },
            Attribute {
                trait_type: "Confidence Level",
                value: analyze_confidence(prediction).as_str().to_string(),
            },
            Attribute {
                trait_type: "Timeframe",
                value: extract_timeframe(prediction).to_string(),
            },
        ];

        Self {
            name: format!("{symbol} Prediction"),
            symbol: symbol.to_string(),
            description: format!(
                "AI Prediction: \"{prediction}\"\n\n\
                 Trade this coin based on whether you believe this prediction will come true!"
            ),
            image: image.to_string(),
            external_url: format!("{}/coin/{symbol}", public_url.trim_end_matches('/')),
            attributes,
        }
    }
}
