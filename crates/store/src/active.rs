//! The Active Item: the single prediction currently on display.

use augur_core::prediction::Prediction;
use tokio::sync::RwLock;

/// Single-value cell. Never empty; only ever replaced.
pub struct ActiveItem {
    current: RwLock<Prediction>,
}

impl ActiveItem {
    pub fn new(seed: Prediction) -> Self {
        Self {
            current: RwLock::new(seed),
        }
    }

    /// Copy of the current prediction.
    pub async fn snapshot(&self) -> Prediction {
        self.current.read().await.clone()
    }

    /// Replace the current prediction, returning the one it displaced.
    pub async fn replace(&self, next: Prediction) -> Prediction {
        std::mem::replace(&mut *self.current.write().await, next)
    }

    /// Overwrite the price of the current prediction and return the
    /// updated copy.
    pub async fn set_price(&self, price: String) -> Prediction {
        let mut current = self.current.write().await;
        current.price = price;
        current.clone()
    }
}

impl Default for ActiveItem {
    fn default() -> Self {
        Self::new(Prediction::seed())
    }
}
