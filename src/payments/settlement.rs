use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};

use super::models::{PaymentEvent, RejectReason, SettlementOutcome};
use crate::{catalog, ledger};

/// Converts verified payment events into credit grants, exactly once per
/// provider payment id.
#[derive(Clone)]
pub struct SettlementService {
    pool: PgPool,
}

impl SettlementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settles one captured payment.
    ///
    /// The settlement-record insert and the balance increment happen in one
    /// transaction; the unique index on `provider_payment_id` arbitrates
    /// concurrent duplicate deliveries, so the net effect of N deliveries is
    /// exactly one grant.
    pub async fn settle(&self, event: &PaymentEvent) -> Result<SettlementOutcome> {
        let already_seen: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM settlement_records WHERE provider_payment_id = $1)",
        )
        .bind(&event.provider_payment_id)
        .fetch_one(&self.pool)
        .await?;
        if already_seen {
            return Ok(SettlementOutcome::AlreadyApplied);
        }

        let Some(package) = catalog::package_for_amount(event.amount_minor, &event.currency)
        else {
            warn!(
                payment = %event.provider_payment_id,
                amount = event.amount_minor,
                currency = %event.currency,
                "settlement rejected: amount matches no configured package"
            );
            return Ok(SettlementOutcome::Rejected(RejectReason::UnrecognizedAmount));
        };

        let mut tx = self.pool.begin().await?;

        let Some(user_id) = resolve_account(&mut tx, event).await? else {
            tx.rollback().await?;
            warn!(
                payment = %event.provider_payment_id,
                order = event.provider_order_id.as_deref().unwrap_or("-"),
                "settlement rejected: no account resolves for payment"
            );
            return Ok(SettlementOutcome::Rejected(RejectReason::UnknownAccount));
        };

        let inserted = sqlx::query(
            "INSERT INTO settlement_records \
                 (provider_payment_id, user_id, provider_order_id, amount_minor, credits_granted) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (provider_payment_id) DO NOTHING",
        )
        .bind(&event.provider_payment_id)
        .bind(user_id)
        .bind(&event.provider_order_id)
        .bind(event.amount_minor)
        .bind(package.credits)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            // Lost the race against a concurrent delivery of the same payment.
            tx.rollback().await?;
            return Ok(SettlementOutcome::AlreadyApplied);
        }

        if !ledger::grant_credits(&mut *tx, user_id, package.credits).await? {
            tx.rollback().await?;
            warn!(
                payment = %event.provider_payment_id,
                user_id,
                "settlement rejected: account row vanished before grant"
            );
            return Ok(SettlementOutcome::Rejected(RejectReason::UnknownAccount));
        }

        if let Some(provider_order_id) = &event.provider_order_id {
            sqlx::query(
                "UPDATE orders SET status = 'settled', updated_at = NOW() \
                 WHERE provider_order_id = $1",
            )
            .bind(provider_order_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            payment = %event.provider_payment_id,
            user_id,
            package = package.id,
            credits = package.credits,
            "settlement applied"
        );
        Ok(SettlementOutcome::Applied {
            credits_granted: package.credits,
        })
    }
}

/// Resolves the account to credit. The order linkage established at order
/// creation wins; payer email is checkout-editable metadata and is only a
/// fallback for payments that arrive without a known order.
async fn resolve_account(
    tx: &mut Transaction<'_, Postgres>,
    event: &PaymentEvent,
) -> Result<Option<i32>, sqlx::Error> {
    if let Some(provider_order_id) = &event.provider_order_id {
        let linked: Option<i32> =
            sqlx::query_scalar("SELECT user_id FROM orders WHERE provider_order_id = $1")
                .bind(provider_order_id)
                .fetch_optional(&mut *tx)
                .await?;
        if linked.is_some() {
            return Ok(linked);
        }
    }

    if let Some(email) = &event.payer_email {
        let by_email: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        return Ok(by_email);
    }

    Ok(None)
}
