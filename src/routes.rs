use axum::{
    routing::{get, post},
    Router,
};

use crate::{admin, auth, catalog, interviews, ledger, payments};

pub fn api_routes() -> Router {
    Router::new()
        .route("/api/register", post(auth::register_user))
        .route("/api/login", post(auth::login_user))
        .route("/api/logout", post(auth::logout_user))
        .route("/api/me", get(auth::current_user))
        .route("/api/billing/packages", get(catalog::list_packages))
        .route(
            "/api/billing/orders",
            get(payments::list_orders).post(payments::create_order),
        )
        .route("/api/billing/balance", get(ledger::get_balance))
        .route(
            "/api/interviews",
            get(interviews::list_interviews).post(interviews::create_interview),
        )
        .route(
            "/api/interviews/:interview_id",
            get(interviews::get_interview),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/settlements", get(admin::list_settlements))
        .route("/webhooks/razorpay", post(payments::razorpay_webhook))
}
