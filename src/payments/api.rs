use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, warn};

use super::models::{Order, SettlementOutcome};
use super::provider::{PaymentProvider, ProviderError};
use super::settlement::SettlementService;
use super::verify::{self, VerifiedEvent};
use crate::error::{AppError, AppResult};
use crate::extractor::AuthUser;
use crate::{catalog, config};

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub package_id: String,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    /// Public key id the checkout widget is opened with.
    pub key_id: String,
}

/// Registers a provider order for the selected package. Credits are granted
/// only on confirmed settlement, never here.
pub async fn create_order(
    Extension(pool): Extension<PgPool>,
    Extension(provider): Extension<Arc<dyn PaymentProvider>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let package = catalog::find(&payload.package_id)
        .ok_or_else(|| AppError::UnknownPackage(payload.package_id.clone()))?;

    let receipt = format!("rcpt_{}_{}", user_id, package.id);
    let order = provider
        .create_order(package.amount_minor, package.currency, &receipt)
        .await
        .map_err(|e| match e {
            ProviderError::Unavailable(msg) => {
                error!(%msg, package = package.id, "provider order creation failed");
                AppError::ProviderUnavailable(msg)
            }
        })?;

    sqlx::query(
        "INSERT INTO orders (provider_order_id, user_id, package_id, amount_minor, currency, status) \
         VALUES ($1, $2, $3, $4, $5, 'created')",
    )
    .bind(&order.order_id)
    .bind(user_id)
    .bind(package.id)
    .bind(order.amount_minor)
    .bind(&order.currency)
    .execute(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error persisting order");
        AppError::Db(e)
    })?;

    Ok(Json(CreateOrderResponse {
        order_id: order.order_id,
        amount_minor: order.amount_minor,
        currency: order.currency,
        key_id: config::RAZORPAY_KEY_ID.clone(),
    }))
}

pub async fn list_orders(
    Extension(pool): Extension<PgPool>,
    AuthUser { user_id, .. }: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        error!(?e, "DB error listing orders");
        AppError::Db(e)
    })?;
    Ok(Json(orders))
}

/// Razorpay webhook endpoint. The body is taken as raw bytes so the
/// signature is checked against exactly what the provider hashed; parsing
/// happens only after verification. 2xx is returned only for an applied or
/// idempotent settlement, anything else re-engages the provider's retry and
/// alerting path.
pub async fn razorpay_webhook(
    Extension(pool): Extension<PgPool>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> AppResult<StatusCode> {
    let signature = headers
        .get("x-razorpay-signature")
        .and_then(|value| value.to_str().ok());

    let event = match verify::verify(&body, signature, config::RAZORPAY_WEBHOOK_SECRET.as_str()) {
        Ok(VerifiedEvent::PaymentCaptured(event)) => event,
        Ok(VerifiedEvent::Ignored { event }) => {
            tracing::debug!(%event, "ignoring non-capture webhook event");
            return Ok(StatusCode::OK);
        }
        Err(failure) => {
            warn!(%failure, "webhook verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    let outcome = SettlementService::new(pool)
        .settle(&event)
        .await
        .map_err(|e| {
            error!(?e, payment = %event.provider_payment_id, "settlement failed");
            AppError::Message("settlement failed".into())
        })?;

    match outcome {
        SettlementOutcome::Applied { .. } | SettlementOutcome::AlreadyApplied => {
            Ok(StatusCode::OK)
        }
        SettlementOutcome::Rejected(reason) => {
            // The charge itself is not lost; the provider keeps it and an
            // operator reconciles from the logs and the admin console.
            error!(
                payment = %event.provider_payment_id,
                reason = reason.as_str(),
                "settlement rejected; manual reconciliation required"
            );
            Err(AppError::Unprocessable(reason.as_str().into()))
        }
    }
}
