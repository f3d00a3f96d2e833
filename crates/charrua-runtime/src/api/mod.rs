//! REST services for the Charrua Bus backend
//!
//! Each service method performs exactly one HTTP call, maps non-2xx
//! statuses to [`ApiError`](charrua_core::ApiError) and surfaces HTTP 401 as
//! the session-expired sentinel. There is no retry logic; callers decide
//! whether to offer a retry.

pub mod auth;
pub mod client;
pub mod locations;
pub mod notifications;
pub mod payments;
pub mod reqwest_transport;
pub mod system_config;
pub mod tickets;
pub mod trips;
pub mod users;

pub use auth::AuthService;
pub use client::ApiClient;
pub use locations::LocationService;
pub use notifications::NotificationApiService;
pub use payments::PaymentService;
pub use reqwest_transport::ReqwestTransport;
pub use system_config::ConfigService;
pub use tickets::TicketService;
pub use trips::TripService;
pub use users::UserService;
