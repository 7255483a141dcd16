use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A provider order registered before checkout. Status moves
/// `created -> settled` when the payment webhook lands, or
/// `created -> abandoned` when the sweep gives up on it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub provider_order_id: String,
    pub user_id: i32,
    pub package_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger audit entry, written exactly once per provider payment id. The
/// unique constraint on `provider_payment_id` is what makes settlement
/// idempotent under duplicate webhook delivery.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: i32,
    pub provider_payment_id: String,
    pub user_id: i32,
    pub provider_order_id: Option<String>,
    pub amount_minor: i64,
    pub credits_granted: i32,
    pub processed_at: DateTime<Utc>,
}

/// A captured payment, extracted from a webhook body that already passed
/// signature verification. Untrusted fields (notably `payer_email`) are kept
/// as-is; the settlement processor decides how far to trust them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub provider_payment_id: String,
    pub provider_order_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnrecognizedAmount,
    UnknownAccount,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::UnrecognizedAmount => "unrecognized amount",
            RejectReason::UnknownAccount => "unknown account",
        }
    }
}

/// Net effect of handing one payment event to the settlement processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Applied { credits_granted: i32 },
    AlreadyApplied,
    Rejected(RejectReason),
}
