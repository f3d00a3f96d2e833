//! Backend data transfer objects
//!
//! Plain structs mirrored from the backend JSON. Field names follow the
//! backend (Spanish, camelCase on the wire); there are no client-side
//! invariants beyond optional-field presence.

pub mod account;
pub mod catalog;
pub mod notification;
pub mod purchase;
pub mod system;

pub use account::{
    AuthSession, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, Usuario,
};
pub use catalog::{Asiento, Localidad, SeatMap, TripQuery, Viaje};
pub use notification::{DevicePlatform, DeviceTokenRegistration, Notificacion, UnreadCount};
pub use purchase::{CheckoutSession, Compra, Pasaje, PaymentConfirmation, PurchaseRequest};
pub use system::{ConfiguracionSistema, Page, PageRequest};
