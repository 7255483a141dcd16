use once_cell::sync::Lazy;

/// Secret used for JWT signing. Must be set via the `JWT_SECRET` env variable.
pub static JWT_SECRET: Lazy<String> =
    Lazy::new(|| std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"));

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on. Defaults to `3000`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("BIND_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000)
});

/// When set to a truthy value, allows the application to continue running even if database
/// migrations fail. Defaults to `false`.
pub static ALLOW_MIGRATION_FAILURE: Lazy<bool> = Lazy::new(|| {
    std::env::var("ALLOW_MIGRATION_FAILURE")
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes")
        })
        .unwrap_or(false)
});

/// Credits a freshly registered recruiter account starts with. Defaults to `3`.
pub static STARTING_CREDITS: Lazy<i32> = Lazy::new(|| {
    std::env::var("STARTING_CREDITS")
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .filter(|value| *value >= 0)
        .unwrap_or(3)
});

/// Public key id presented to the hosted checkout widget.
pub static RAZORPAY_KEY_ID: Lazy<String> =
    Lazy::new(|| std::env::var("RAZORPAY_KEY_ID").expect("RAZORPAY_KEY_ID must be set"));

/// API secret paired with `RAZORPAY_KEY_ID` for order creation.
pub static RAZORPAY_KEY_SECRET: Lazy<String> =
    Lazy::new(|| std::env::var("RAZORPAY_KEY_SECRET").expect("RAZORPAY_KEY_SECRET must be set"));

/// Shared secret the provider signs webhook bodies with. Must match the
/// secret configured in the provider dashboard.
pub static RAZORPAY_WEBHOOK_SECRET: Lazy<String> = Lazy::new(|| {
    std::env::var("RAZORPAY_WEBHOOK_SECRET").expect("RAZORPAY_WEBHOOK_SECRET must be set")
});

/// Base URL of the provider REST API. Overridable so tests can point the
/// client at a local mock server.
pub static RAZORPAY_API_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("RAZORPAY_API_BASE")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "https://api.razorpay.com".to_string())
});

/// Timeout applied to outbound provider calls, in seconds. Defaults to `10`.
pub static PROVIDER_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
    std::env::var("PROVIDER_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(10)
});

/// Cadence of the abandoned-order sweep, in seconds. Defaults to `300`.
pub static ORDER_SWEEP_INTERVAL_SECS: Lazy<u64> = Lazy::new(|| {
    std::env::var("ORDER_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(300)
});

/// Minutes an order may sit in `created` without a webhook before the sweep
/// marks it abandoned. Defaults to `60`.
pub static ORDER_ABANDON_AFTER_MINUTES: Lazy<i64> = Lazy::new(|| {
    std::env::var("ORDER_ABANDON_AFTER_MINUTES")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(60)
});
