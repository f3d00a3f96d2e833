//! Round-trip booking wizard
//!
//! The wizard sequences outbound trip, outbound seats, return trip, return
//! seats and payment. Its whole progress lives in a [`RoundTripState`] that
//! front ends thread between the trip list and seat selection screens.
//! Nothing here is persisted.

pub mod form;
pub mod navigation;
pub mod round_trip;

pub use form::SearchForm;
pub use navigation::Screen;
pub use round_trip::{
    Leg, LegState, RoundTripState, StepChange, TripKind, WizardEvent, WizardStep,
};
