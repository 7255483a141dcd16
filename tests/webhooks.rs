use axum::http::{Request, StatusCode};
use axum::{body::Body, Extension};
use careermock::payments::verify;
use careermock::routes::api_routes;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

const SECRET: &str = "testwebhooksecret";

fn webhook_app(pool: &PgPool) -> axum::Router {
    std::env::set_var("RAZORPAY_WEBHOOK_SECRET", SECRET);
    api_routes().layer(Extension(pool.clone()))
}

async fn insert_user(pool: &PgPool, email: &str, credits: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, name, credit_balance) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind("hashed")
    .bind("Test Recruiter")
    .bind(credits)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn balance(pool: &PgPool, user_id: i32) -> i32 {
    sqlx::query_scalar("SELECT credit_balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn capture_body(payment_id: &str, order_id: &str, amount: i64, email: &str) -> String {
    json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "order_id": order_id,
                    "amount": amount,
                    "currency": "INR",
                    "email": email,
                    "status": "captured"
                }
            }
        }
    })
    .to_string()
}

async fn deliver(app: axum::Router, body: String, signature: &str) -> StatusCode {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/razorpay")
                .header("x-razorpay-signature", signature)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn signed_capture_settles_and_replays_are_idempotent(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "webhook@example.com", 0).await;
    sqlx::query(
        "INSERT INTO orders (provider_order_id, user_id, package_id, amount_minor, currency, status) \
         VALUES ('order_http', $1, 'professional', 49900, 'INR', 'created')",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    let body = capture_body("pay_http", "order_http", 49900, "webhook@example.com");
    let signature = verify::sign(body.as_bytes(), SECRET);

    // Provider retry delivers the same event twice; the balance moves once.
    let first = deliver(webhook_app(&pool), body.clone(), &signature).await;
    assert_eq!(first, StatusCode::OK);
    let second = deliver(webhook_app(&pool), body, &signature).await;
    assert_eq!(second, StatusCode::OK);

    assert_eq!(balance(&pool, user_id).await, 25);
    let records: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM settlement_records WHERE provider_payment_id = 'pay_http'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(records, 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn tampered_payload_is_rejected_without_mutation(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "victim@example.com", 0).await;

    let body = capture_body("pay_forged", "order_none", 49900, "victim@example.com");
    let signature = verify::sign(body.as_bytes(), SECRET);
    let tampered = body.replace("49900", "89900");

    let status = deliver(webhook_app(&pool), tampered, &signature).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(balance(&pool, user_id).await, 0);
    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settlement_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn missing_signature_is_rejected(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let body = capture_body("pay_unsigned", "order_none", 49900, "x@example.com");
    let response = webhook_app(&pool)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/razorpay")
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn unrecognized_amount_answers_unprocessable(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "odd@example.com", 0).await;

    let body = capture_body("pay_oddhttp", "order_none", 12345, "odd@example.com");
    let signature = verify::sign(body.as_bytes(), SECRET);

    let status = deliver(webhook_app(&pool), body, &signature).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(balance(&pool, user_id).await, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn non_capture_events_are_acknowledged(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let body = json!({"event": "order.paid", "payload": {}}).to_string();
    let signature = verify::sign(body.as_bytes(), SECRET);

    let status = deliver(webhook_app(&pool), body, &signature).await;
    assert_eq!(status, StatusCode::OK);

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settlement_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 0);
}
