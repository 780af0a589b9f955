//! Coin-symbol derivation from prediction text.
//!
//! The text is upper-cased and split into alphabetic words. Recognised
//! tokens map to fixed abbreviations of at most three letters, which are
//! concatenated in scan order until the prefix reaches
//! [`MAX_PREFIX_LEN`]. A random numeric suffix keeps symbols from
//! colliding between jobs that talk about the same coins.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

/// Prefix used when no token in the text is recognised.
pub const DEFAULT_PREFIX: &str = "PRED";

/// Scanning stops once the prefix is at least this long.
pub const MAX_PREFIX_LEN: usize = 6;

/// Exclusive upper bound of the numeric suffix.
pub const SUFFIX_BOUND: u32 = 999;

const KNOWN_TOKENS: &[(&[&str], &str)] = &[
    (&["BITCOIN", "BTC"], "BTC"),
    (&["ETHEREUM", "ETH"], "ETH"),
    (&["SOLANA", "SOL"], "SOL"),
    (&["DOGECOIN", "DOGE"], "DOG"),
    (&["CARDANO", "ADA"], "ADA"),
    (&["POLYGON", "MATIC"], "MAT"),
    (&["RIPPLE", "XRP"], "XRP"),
    (&["DEFI"], "DFI"),
];

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+").expect("valid regex"));

/// Abbreviation for a single upper-case word, if it is a recognised token.
pub fn abbreviation(word: &str) -> Option<&'static str> {
    KNOWN_TOKENS
        .iter()
        .find(|(aliases, _)| aliases.contains(&word))
        .map(|(_, abbr)| *abbr)
}

/// The deterministic part of the symbol.
pub fn symbol_prefix(text: &str) -> String {
    let upper = text.to_uppercase();
    let mut prefix = String::new();

    for word in WORD_RE.find_iter(&upper) {
        if let Some(abbr) = abbreviation(word.as_str()) {
            prefix.push_str(abbr);
        }
        if prefix.len() >= MAX_PREFIX_LEN {
            break;
        }
    }

    if prefix.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Derive a full symbol using the supplied random source for the suffix.
pub fn derive_symbol_with<R: Rng>(text: &str, rng: &mut R) -> String {
    let suffix = rng.random_range(0..SUFFIX_BOUND);
    format!("{}{suffix:02}", symbol_prefix(text))
}

/// Derive a full symbol with a thread-local random suffix.
pub fn derive_symbol(text: &str) -> String {
    derive_symbol_with(text, &mut rand::rng())
}
