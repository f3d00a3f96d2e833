//! Stateful services shared by front ends
//!
//! These replace app-wide mutable contexts: each manager owns its slice of
//! client state and is handed to whoever needs it behind an `Arc`.

pub mod guard;
pub mod notifications;
pub mod push;
pub mod session;
pub mod user;

pub use guard::InFlightGuard;
pub use notifications::{NotificationCenter, RefreshOutcome};
pub use push::{PushDispatcher, PushNotification};
pub use session::{LogoutReason, SessionEvent, SessionManager};
pub use user::UserManager;
