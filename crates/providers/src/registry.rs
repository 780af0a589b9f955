//! Asset registration, price lookup and trading.
//!
//! [`AssetRegistry`] methods never fail: problems are reported inside the
//! returned value so callers never branch on an error from this backend.
//! [`SimulatedRegistry`] mimics a coin launch on an L2 testnet, including
//! its multi-step latency.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Timelike, Utc};
use rand::Rng;
use serde::Serialize;

/// Request to register a new coin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterAsset {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub payout_recipient: String,
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub success: bool,
    /// Contract address; only meaningful when `success` is true.
    pub address: Option<String>,
    pub tx_ref: Option<String>,
    pub error: Option<String>,
}

impl Registration {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            address: None,
            tx_ref: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a buy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeResult {
    pub success: bool,
    pub tx_ref: Option<String>,
    pub error: Option<String>,
}

/// The on-chain side of the service.
#[async_trait]
pub trait AssetRegistry: Send + Sync {
    /// Register a coin. Never fails; see [`Registration::success`].
    async fn register(&self, request: RegisterAsset) -> Registration;

    /// Best-effort current price of `address`, e.g. `$0.00102345`.
    async fn price(&self, address: &str) -> String;

    /// Buy `amount_eth` worth of `address`.
    async fn buy(&self, address: &str, amount_eth: &str) -> TradeResult;
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Latency of the registration steps: metadata upload, contract deploy,
/// pool creation, rewards setup.
const REGISTER_STEPS: [(&str, Duration); 4] = [
    ("Uploading metadata", Duration::from_millis(1000)),
    ("Deploying contract", Duration::from_millis(1500)),
    ("Creating liquidity pool", Duration::from_millis(800)),
    ("Configuring creator rewards", Duration::from_millis(500)),
];

/// Latency of the buy steps: liquidity check, routing, swap.
const BUY_STEPS: [(&str, Duration); 3] = [
    ("Checking liquidity pool", Duration::from_millis(500)),
    ("Calculating swap route", Duration::from_millis(700)),
    ("Executing swap", Duration::from_millis(1000)),
];

const BASE_PRICE: f64 = 0.001;
const MIN_PRICE: f64 = 0.0001;

/// Settings for [`SimulatedRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Sleep through each simulated step. Disable in tests.
    pub simulate_latency: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            simulate_latency: true,
        }
    }
}

/// In-process stand-in for the coin registry.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRegistry {
    config: RegistryConfig,
}

impl SimulatedRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    async fn step(&self, name: &str, delay: Duration) {
        tracing::debug!(step = name, delay_ms = delay.as_millis() as u64, "Registry step");
        if self.config.simulate_latency {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AssetRegistry for SimulatedRegistry {
    async fn register(&self, request: RegisterAsset) -> Registration {
        if request.symbol.trim().is_empty() || request.name.trim().is_empty() {
            return Registration::failed("Coin name and symbol are required");
        }

        for (name, delay) in REGISTER_STEPS {
            self.step(name, delay).await;
        }

        let address = simulated_address();
        let tx_ref = simulated_tx_hash();

        tracing::info!(
            symbol = %request.symbol,
            address = %address,
            tx = %tx_ref,
            "Simulated coin registered",
        );

        Registration {
            success: true,
            address: Some(address),
            tx_ref: Some(tx_ref),
            error: None,
        }
    }

    async fn price(&self, address: &str) -> String {
        let price = simulated_price(Utc::now());
        tracing::debug!(address, price, "Simulated price");
        format!("${price:.8}")
    }

    async fn buy(&self, address: &str, amount_eth: &str) -> TradeResult {
        if amount_eth.parse::<f64>().map_or(true, |a| a <= 0.0) {
            return TradeResult {
                success: false,
                tx_ref: None,
                error: Some(format!("Invalid amount '{amount_eth}'")),
            };
        }

        for (name, delay) in BUY_STEPS {
            self.step(name, delay).await;
        }

        let tx_ref = simulated_tx_hash();
        tracing::info!(address, amount_eth, tx = %tx_ref, "Simulated buy executed");

        TradeResult {
            success: true,
            tx_ref: Some(tx_ref),
            error: None,
        }
    }
}

/// `0xb` followed by 39 random hex digits.
pub fn simulated_address() -> String {
    format!("0xb{}", random_hex(39))
}

/// `0x` followed by 64 random hex digits.
pub fn simulated_tx_hash() -> String {
    format!("0x{}", random_hex(64))
}

fn random_hex(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..16), 16).unwrap_or('0'))
        .collect()
}

/// Price with market-hours volatility, a slow trend and random noise.
fn simulated_price(now: chrono::DateTime<Utc>) -> f64 {
    let market_open = (9..=16).contains(&now.hour());
    let volatility = if market_open { 1.5 } else { 0.8 };
    let trend = (now.timestamp_millis() as f64 / 1_000_000.0).sin() * 0.1;
    let noise = (rand::rng().random::<f64>() - 0.5) * 0.3 * volatility;

    (BASE_PRICE * (1.0 + noise + trend)).max(MIN_PRICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> SimulatedRegistry {
        SimulatedRegistry::new(RegistryConfig {
            simulate_latency: false,
        })
    }

    fn request(symbol: &str) -> RegisterAsset {
        RegisterAsset {
            name: format!("{symbol} Prediction"),
            symbol: symbol.to_string(),
            description: "d".into(),
            image: "https://img".into(),
            payout_recipient: "0x742d35Cc6634C0532925a3b8D926F2E4F4c4e5b0".into(),
        }
    }

    #[test]
    fn identifiers_have_expected_shape() {
        let address = simulated_address();
        assert_eq!(address.len(), 42);
        assert!(address.starts_with("0xb"));
        let tx = simulated_tx_hash();
        assert_eq!(tx.len(), 66);
        assert!(tx[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn register_succeeds_with_identifiers() {
        let registration = instant().register(request("BTC12")).await;
        assert!(registration.success);
        assert!(registration.address.is_some());
        assert!(registration.tx_ref.is_some());
    }

    #[tokio::test]
    async fn register_without_symbol_fails_softly() {
        let registration = instant().register(request("")).await;
        assert!(!registration.success);
        assert!(registration.address.is_none());
        assert!(registration.error.is_some());
    }

    #[tokio::test]
    async fn price_is_formatted_and_positive() {
        let price = instant().price("0xb00").await;
        let value: f64 = price.trim_start_matches('$').parse().unwrap();
        assert!(value >= MIN_PRICE);
        assert_eq!(price.split('.').nth(1).unwrap().len(), 8);
    }

    #[tokio::test]
    async fn buy_rejects_bad_amount() {
        let registry = instant();
        assert!(!registry.buy("0xb00", "zero").await.success);
        assert!(registry.buy("0xb00", "0.01").await.success);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_simulated() {
        let started = tokio::time::Instant::now();
        SimulatedRegistry::default().register(request("ETH7")).await;
        assert!(started.elapsed() >= Duration::from_millis(3800));
    }
}
