use careermock::payments::run_order_sweep_tick;
use chrono::{Duration, Utc};
use sqlx::PgPool;

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn stale_created_orders_are_abandoned(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("sweep@example.com")
    .bind("hashed")
    .bind("Test Recruiter")
    .fetch_one(&pool)
    .await
    .unwrap();

    let stale = Utc::now() - Duration::minutes(180);
    sqlx::query(
        "INSERT INTO orders (provider_order_id, user_id, package_id, amount_minor, currency, status, created_at) \
         VALUES \
            ('order_stale', $1, 'starter', 24900, 'INR', 'created', $2), \
            ('order_fresh', $1, 'starter', 24900, 'INR', 'created', NOW()), \
            ('order_done', $1, 'professional', 49900, 'INR', 'settled', $2)",
    )
    .bind(user_id)
    .bind(stale)
    .execute(&pool)
    .await
    .unwrap();

    let swept = run_order_sweep_tick(&pool, Utc::now(), 60).await.unwrap();
    assert_eq!(swept, 1);

    let statuses: Vec<(String, String)> =
        sqlx::query_as("SELECT provider_order_id, status FROM orders ORDER BY provider_order_id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        statuses,
        vec![
            ("order_done".to_string(), "settled".to_string()),
            ("order_fresh".to_string(), "created".to_string()),
            ("order_stale".to_string(), "abandoned".to_string()),
        ]
    );
}
