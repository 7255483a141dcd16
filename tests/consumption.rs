use careermock::ledger::{self, ConsumeOutcome};
use sqlx::PgPool;

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

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn starting_credits_cover_exactly_three_consumptions(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "three@example.com", 3).await;

    for expected_remaining in [2, 1, 0] {
        let outcome = ledger::consume_credit(&pool, user_id).await.unwrap();
        assert_eq!(
            outcome,
            ConsumeOutcome::Consumed {
                remaining: expected_remaining
            }
        );
    }

    let fourth = ledger::consume_credit(&pool, user_id).await.unwrap();
    assert_eq!(fourth, ConsumeOutcome::InsufficientCredit);

    let balance = ledger::credit_balance(&pool, user_id).await.unwrap();
    assert_eq!(balance, Some(0));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn concurrent_consumers_never_overdraw(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "contended@example.com", 3).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            ledger::consume_credit(&pool, user_id).await.unwrap()
        }));
    }

    let mut consumed = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            ConsumeOutcome::Consumed { .. } => consumed += 1,
            ConsumeOutcome::InsufficientCredit => refused += 1,
        }
    }

    assert_eq!(consumed, 3, "only the available credits may be spent");
    assert_eq!(refused, 5);
    let balance = ledger::credit_balance(&pool, user_id).await.unwrap();
    assert_eq!(balance, Some(0));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn grant_then_consume_round_trips(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let user_id = insert_user(&pool, "granted@example.com", 0).await;

    assert_eq!(
        ledger::consume_credit(&pool, user_id).await.unwrap(),
        ConsumeOutcome::InsufficientCredit
    );

    assert!(ledger::grant_credits(&pool, user_id, 25).await.unwrap());
    assert_eq!(
        ledger::consume_credit(&pool, user_id).await.unwrap(),
        ConsumeOutcome::Consumed { remaining: 24 }
    );

    assert!(!ledger::grant_credits(&pool, 999_999, 10).await.unwrap());
}
