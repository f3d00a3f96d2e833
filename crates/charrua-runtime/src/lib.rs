//! Charrua Bus Client Runtime
//!
//! This crate turns the `charrua-core` types into a working client:
//! - REST services over a pluggable transport (reqwest by default)
//! - `SessionManager`, `UserManager` and `NotificationCenter` replacing
//!   app-wide mutable state
//! - `BookingController` driving the round-trip wizard against the backend
//! - `NotificationPollerTask` keeping the unread counter fresh
//! - `RuntimeBuilder` wiring it all together

pub mod api;
pub mod booking;
pub mod builder;
pub mod managers;
mod runtime;
pub mod tasks;

pub use booking::{BookingController, PaymentOutcome, TripResults};
pub use builder::{create_cli_runtime, create_test_runtime, RuntimeBuilder};
pub use managers::*;
pub use runtime::CharruaRuntime;
pub use tasks::NotificationPollerTask;

// Re-export core types for convenience
pub use charrua_core::{
    ApiError, AppLifecycleState, CharruaError, ClientConfig, PaymentDeepLink, Result,
    RoundTripState, Screen, SearchForm, TripKind, WizardStep,
};
