//! Stand-in for a payment gateway. Sleeps to mimic network latency and
//! approves roughly nine payments out of ten.

use password_hash::rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    Success,
    /// Reserved for a real gateway; the simulator never returns it.
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub transaction_id: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone)]
pub struct PaymentSimulator {
    delay: Duration,
    success_rate: f64,
}

impl Default for PaymentSimulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

impl PaymentSimulator {
    pub const SUCCESS_RATE: f64 = 0.9;

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            success_rate: Self::SUCCESS_RATE,
        }
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub async fn process_payment(&self, amount: i64, payment_method: &str) -> PaymentResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let approved = amount > 0 && roll() < self.success_rate;
        let result = if approved {
            PaymentResult {
                transaction_id: transaction_id("TXN"),
                status: PaymentStatus::Success,
            }
        } else {
            PaymentResult {
                transaction_id: transaction_id("FAILED"),
                status: PaymentStatus::Failed,
            }
        };

        tracing::info!(
            amount,
            payment_method,
            transaction_id = %result.transaction_id,
            status = ?result.status,
            "payment processed"
        );
        result
    }
}

/// Uniform draw in `[0, 1)`.
fn roll() -> f64 {
    f64::from(OsRng.next_u32()) / (f64::from(u32::MAX) + 1.0)
}

fn transaction_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", id[..16].to_uppercase())
}
