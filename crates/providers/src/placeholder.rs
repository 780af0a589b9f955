//! Placeholder image URLs.
//!
//! Used whenever a real image is unavailable. The URL for a given text is
//! always the same: the background colour is picked from the text itself.

use reqwest::Url;

const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/400x400";
const BACKGROUNDS: &[&str] = &["1a1a1a", "333333", "4a5568", "2d3748", "1a202c"];

/// Placeholder image whose caption is `text`.
pub fn placeholder_image_url(text: &str) -> String {
    let seed = text
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    let background = BACKGROUNDS[seed % BACKGROUNDS.len()];
    captioned(background, text)
}

/// Placeholder shown after a price check.
pub fn price_image_url(symbol: &str, price: &str) -> String {
    captioned("0066cc", &format!("{symbol} Price: {price}"))
}

/// Placeholder shown after a successful buy.
pub fn bought_image_url(symbol: &str) -> String {
    captioned("00ff00", &format!("Bought {symbol}!"))
}

/// Placeholder shown after a buy of an unregistered coin.
pub fn demo_bought_image_url(symbol: &str) -> String {
    captioned("00ff00", &format!("Demo Buy {symbol}!"))
}

/// Placeholder served when an image cannot be proxied.
pub fn loading_image_url() -> String {
    captioned("667eea", "AI Meme Loading...")
}

/// Placeholder shown after a failed buy.
pub fn purchase_failed_image_url() -> String {
    captioned("ff6b6b", "Purchase Failed")
}

fn captioned(background: &str, caption: &str) -> String {
    let base = format!("{PLACEHOLDER_BASE}/{background}/ffffff");
    match Url::parse_with_params(&base, &[("text", caption)]) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build placeholder URL");
            base
        }
    }
}
