//! Auth/Credits Service Contract
//!
//! Export quota lives with an external service; the engine only asks for
//! the balance and asks it to deduct.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::StudioResult;

/// A user's export-credit balance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    /// Subscription plan identifier
    pub plan: String,
    pub total: u32,
    pub used: u32,
    pub remaining: u32,
    /// Date the quota resets (ISO 8601 date)
    pub reset_date: String,
}

impl CreditBalance {
    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }
}

/// Issues and validates a user's remaining export quota.
///
/// `deduct_credit` fails with [`crate::core::StudioError::InsufficientCredits`]
/// when nothing remains.
#[async_trait]
pub trait CreditsService: Send + Sync {
    async fn get_credits(&self, user_id: &str) -> StudioResult<CreditBalance>;

    async fn deduct_credit(&self, user_id: &str) -> StudioResult<CreditBalance>;
}
