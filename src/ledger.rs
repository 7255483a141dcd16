use axum::{extract::Extension, Json};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Row};
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;

/// Result of attempting to spend one credit.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed { remaining: i32 },
    InsufficientCredit,
}

/// Atomically spends one credit. The balance check and the decrement are a
/// single conditional statement, so two requests racing on the last credit
/// cannot both succeed and the balance can never go below zero.
pub async fn consume_credit<'e, E>(executor: E, user_id: i32) -> Result<ConsumeOutcome, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let row = sqlx::query(
        "UPDATE users SET credit_balance = credit_balance - 1 \
         WHERE id = $1 AND credit_balance > 0 \
         RETURNING credit_balance",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(match row {
        Some(row) => ConsumeOutcome::Consumed {
            remaining: row.get("credit_balance"),
        },
        None => ConsumeOutcome::InsufficientCredit,
    })
}

/// Adds credits to an account balance. Returns `false` when the account does
/// not exist. Only the settlement processor calls this, inside its own
/// transaction.
pub async fn grant_credits<'e, E>(
    executor: E,
    user_id: i32,
    credits: i32,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("UPDATE users SET credit_balance = credit_balance + $1 WHERE id = $2")
        .bind(credits)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn credit_balance(pool: &PgPool, user_id: i32) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT credit_balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

#[derive(Serialize)]
pub struct BalanceInfo {
    pub credit_balance: i32,
}

pub async fn get_balance(
    Extension(pool): Extension<PgPool>,
    AuthUser { user_id, .. }: AuthUser,
) -> AppResult<Json<BalanceInfo>> {
    let balance = credit_balance(&pool, user_id).await.map_err(|e| {
        error!(?e, "DB error reading credit balance");
        AppError::Db(e)
    })?;
    let credit_balance = balance.ok_or(AppError::NotFound)?;
    Ok(Json(BalanceInfo { credit_balance }))
}
