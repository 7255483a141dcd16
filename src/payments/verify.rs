use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use super::models::PaymentEvent;

/// Why an inbound webhook was not accepted. Never surfaced to a human; the
/// HTTP layer logs it and answers 401 so the provider's retry path engages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("missing signature header")]
    MissingSignature,
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("malformed body: {0}")]
    MalformedBody(String),
}

/// A webhook body that passed verification. Only capture events carry a
/// payment to settle; everything else is acknowledged and dropped.
#[derive(Debug)]
pub enum VerifiedEvent {
    PaymentCaptured(PaymentEvent),
    Ignored { event: String },
}

#[derive(Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: WebhookPayload,
}

#[derive(Deserialize, Default)]
struct WebhookPayload {
    payment: Option<PaymentWrapper>,
}

#[derive(Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
    amount: i64,
    currency: String,
    email: Option<String>,
}

/// Authenticates a webhook delivery and converts it into a typed event.
///
/// The MAC is computed over the exact raw bytes received; the body is parsed
/// only after the signature check passes, so nothing in it is trusted before
/// then. The signature comparison is constant-time.
pub fn verify(
    raw_body: &[u8],
    signature_header: Option<&str>,
    secret: &str,
) -> Result<VerifiedEvent, VerificationFailure> {
    let signature = signature_header.ok_or(VerificationFailure::MissingSignature)?;
    let signature =
        hex::decode(signature.trim()).map_err(|_| VerificationFailure::MalformedSignature)?;

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC can use any key length");
    mac.update(raw_body);
    mac.verify_slice(&signature)
        .map_err(|_| VerificationFailure::SignatureMismatch)?;

    let envelope: WebhookEnvelope = serde_json::from_slice(raw_body)
        .map_err(|e| VerificationFailure::MalformedBody(e.to_string()))?;

    if envelope.event != "payment.captured" {
        return Ok(VerifiedEvent::Ignored {
            event: envelope.event,
        });
    }

    let entity = envelope
        .payload
        .payment
        .map(|wrapper| wrapper.entity)
        .ok_or_else(|| VerificationFailure::MalformedBody("missing payment entity".into()))?;

    Ok(VerifiedEvent::PaymentCaptured(PaymentEvent {
        provider_payment_id: entity.id,
        provider_order_id: entity.order_id,
        amount_minor: entity.amount,
        currency: entity.currency,
        payer_email: entity.email,
    }))
}

/// Hex HMAC-SHA256 of `body` under `secret`. Used by tests and by nothing in
/// the request path, which only ever verifies.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC can use any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
