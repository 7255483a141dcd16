use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;
use crate::payments::SettlementRecord;

#[derive(Debug, Serialize, FromRow)]
pub struct AdminUserRow {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub credit_balance: i32,
    pub created_at: DateTime<Utc>,
}

pub async fn list_users(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> AppResult<Json<Vec<AdminUserRow>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    let users = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, email, name, role, credit_balance, created_at \
         FROM users ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error listing users");
        AppError::Db(e)
    })?;
    Ok(Json(users))
}

/// Settlement history, newest first. This is the reconciliation surface for
/// payments the processor rejected: the charge exists at the provider but no
/// record exists here, so an operator cross-checks against provider exports.
pub async fn list_settlements(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> AppResult<Json<Vec<SettlementRecord>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    let settlements = sqlx::query_as::<_, SettlementRecord>(
        "SELECT * FROM settlement_records ORDER BY processed_at DESC LIMIT 200",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error listing settlements");
        AppError::Db(e)
    })?;
    Ok(Json(settlements))
}
