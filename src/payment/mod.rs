//! Payment processor integration

mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// A created payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

/// Creates payment intents with an external processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount` minor currency units
    async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent>;
}

pub type SharedGateway = Arc<dyn PaymentGateway>;

/// Convert a client-supplied price into minor currency units.
///
/// Falsy prices (missing, null, false, zero, empty or non-numeric) and
/// amounts under one unit yield `None`. `true` counts as a price of 1.
/// Fractions of a unit are truncated.
pub fn minor_units(price: Option<&Value>) -> Option<i64> {
    let price = match price? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(true) => 1.0,
        _ => return None,
    };
    if !price.is_finite() || price == 0.0 {
        return None;
    }

    let amount = (price * 100.0).trunc();
    if amount < 1.0 || amount > i64::MAX as f64 {
        return None;
    }
    Some(amount as i64)
}
