//! Keyword analysis of prediction text: confidence, timeframe and category.

use std::sync::LazyLock;

use regex::Regex;

use crate::prediction::{Category, Confidence};

const HIGH_CONFIDENCE_WORDS: &[&str] = &["will", "definitely", "guaranteed", "certainly", "absolutely"];
const LOW_CONFIDENCE_WORDS: &[&str] = &["might", "could", "possibly", "maybe", "potential"];

/// Timeframe used when no pattern matches.
pub const DEFAULT_TIMEFRAME: &str = "2025";

static TIMEFRAMES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)2025", "2025"),
        (r"(?i)end of year|eoy", "End of Year"),
        (r"(?i)q[1-4]|quarter", "This Quarter"),
        (r"(?i)month|30 days", "This Month"),
        (r"(?i)week|7 days", "This Week"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("valid regex"), label))
    .collect()
});

static MAGNITUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+k|\d+m").expect("valid regex"));

/// Classify how assertive the text is. High-confidence words win over
/// low-confidence ones.
pub fn analyze_confidence(text: &str) -> Confidence {
    let lower = text.to_lowercase();
    if HIGH_CONFIDENCE_WORDS.iter().any(|w| lower.contains(w)) {
        Confidence::High
    } else if LOW_CONFIDENCE_WORDS.iter().any(|w| lower.contains(w)) {
        Confidence::Low
    } else {
        Confidence::Medium
    }
}

/// First matching timeframe label, in priority order.
pub fn extract_timeframe(text: &str) -> &'static str {
    TIMEFRAMES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_TIMEFRAME)
}

/// Bucket the text into a [`Category`]; anything unrecognised is `Price`.
pub fn categorize(text: &str) -> Category {
    let lower = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["price", "$"]) || MAGNITUDE_RE.is_match(&lower) {
        Category::Price
    } else if has(&["tech", "upgrade", "protocol"]) {
        Category::Technology
    } else if has(&["adoption", "mainstream", "company"]) {
        Category::Adoption
    } else if has(&["regulation", "sec", "government"]) {
        Category::Regulation
    } else {
        Category::Price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_high_wins_over_low() {
        assert_eq!(analyze_confidence("It might, and it WILL"), Confidence::High);
    }

    #[test]
    fn confidence_low_and_medium() {
        assert_eq!(analyze_confidence("ETH could double"), Confidence::Low);
        assert_eq!(analyze_confidence("ETH doubles"), Confidence::Medium);
    }

    #[test]
    fn timeframe_priority_order() {
        assert_eq!(extract_timeframe("by Q3 2025"), "2025");
        assert_eq!(extract_timeframe("before EOY"), "End of Year");
        assert_eq!(extract_timeframe("this quarter"), "This Quarter");
        assert_eq!(extract_timeframe("within 30 days"), "This Month");
        assert_eq!(extract_timeframe("next week"), "This Week");
        assert_eq!(extract_timeframe("someday"), DEFAULT_TIMEFRAME);
    }

    #[test]
    fn category_buckets() {
        assert_eq!(categorize("BTC to 150k"), Category::Price);
        assert_eq!(categorize("Ethereum protocol upgrade ships"), Category::Technology);
        assert_eq!(categorize("Mainstream adoption arrives"), Category::Adoption);
        assert_eq!(categorize("New regulation passes"), Category::Regulation);
        assert_eq!(categorize("vibes"), Category::Price);
    }
}
