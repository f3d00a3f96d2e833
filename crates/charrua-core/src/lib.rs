//! Charrua Bus Client Core
//!
//! Platform independent pieces of the Charrua Bus ticketing client: backend
//! DTOs, the error taxonomy, the round-trip booking wizard, payment deep
//! links, app lifecycle tracking and the HTTP transport seam. Networking and
//! long-running tasks live in `charrua-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod deep_link;
pub mod error_filter;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod transport;
pub mod types;
pub mod wizard;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::{ApiConfig, BookingConfig, ClientConfig, PollingConfig};
pub use deep_link::PaymentDeepLink;
pub use error_filter::SurfacedErrorFilter;
pub use errors::{
    ApiError, ApiResult, CharruaError, DeepLinkError, FormError, Result, StateTransitionError,
};
pub use lifecycle::{AppLifecycleState, LifecycleTracker, LifecycleTransition};
pub use transport::{ApiTransport, HttpMethod, HttpRequest, HttpResponse, TransportFailure};
pub use types::{LocalidadId, NotificationId, PurchaseId, SeatNumber, TicketId, TripId, UserId};
pub use wizard::{
    Leg, LegState, RoundTripState, Screen, SearchForm, StepChange, TripKind, WizardEvent,
    WizardStep,
};
