pub mod api;
pub mod models;
pub mod provider;
pub mod settlement;
pub mod sweeper;
pub mod verify;

pub use api::{
    create_order, list_orders, razorpay_webhook, CreateOrderRequest, CreateOrderResponse,
};
pub use models::{Order, PaymentEvent, RejectReason, SettlementOutcome, SettlementRecord};
pub use provider::{PaymentProvider, ProviderError, ProviderOrder, RazorpayProvider};
pub use settlement::SettlementService;
pub use sweeper::{process_tick as run_order_sweep_tick, spawn as spawn_order_sweeper};
pub use verify::{VerificationFailure, VerifiedEvent};
