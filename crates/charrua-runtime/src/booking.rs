//! Booking controller
//!
//! Drives a [`RoundTripState`] against the backend: loads trip lists for the
//! active leg, fetches seat maps, creates the checkout session and handles
//! the return from the external payment page.

use charrua_core::models::{CheckoutSession, PaymentConfirmation, SeatMap, Viaje};
use charrua_core::{
    AppLifecycleState, BookingConfig, CharruaError, DeepLinkError, Leg, LifecycleTracker,
    LifecycleTransition, PaymentDeepLink, Result, RoundTripState, Screen, SearchForm, SeatNumber,
    StateTransitionError, TripId, WizardEvent, WizardStep,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{PaymentService, TripService};
use crate::managers::SessionManager;

// ----------------------------------------------------------------------------
// Trip Results
// ----------------------------------------------------------------------------

/// What the trip list screen shows
#[derive(Debug, Clone, PartialEq)]
pub enum TripResults {
    Idle,
    Loaded(Vec<Viaje>),
    /// Error view; `retryable` decides whether a retry action is offered
    Failed { message: String, retryable: bool },
}

impl TripResults {
    pub fn trips(&self) -> &[Viaje] {
        match self {
            TripResults::Loaded(trips) => trips,
            _ => &[],
        }
    }
}

/// How a payment return ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed(PaymentConfirmation),
    Cancelled(PaymentConfirmation),
}

// ----------------------------------------------------------------------------
// Booking Controller
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct BookingController {
    trips: TripService,
    payments: PaymentService,
    session: Arc<SessionManager>,
    config: BookingConfig,
    wizard: Option<RoundTripState>,
    results: TripResults,
    results_leg: Option<Leg>,
    checkout: Option<CheckoutSession>,
    went_to_payment: bool,
    lifecycle: LifecycleTracker,
}

impl BookingController {
    pub fn new(
        trips: TripService,
        payments: PaymentService,
        session: Arc<SessionManager>,
        config: BookingConfig,
    ) -> Self {
        Self {
            trips,
            payments,
            session,
            config,
            wizard: None,
            results: TripResults::Idle,
            results_leg: None,
            checkout: None,
            went_to_payment: false,
            lifecycle: LifecycleTracker::default(),
        }
    }

    /// Apply the backend's passenger limit
    pub fn set_max_passengers(&mut self, max: u32) {
        if max > 0 {
            self.config.max_passengers = max;
        }
    }

    pub fn max_passengers(&self) -> u32 {
        self.config.max_passengers
    }

    pub fn state(&self) -> Option<&RoundTripState> {
        self.wizard.as_ref()
    }

    pub fn results(&self) -> &TripResults {
        &self.results
    }

    pub fn checkout(&self) -> Option<&CheckoutSession> {
        self.checkout.as_ref()
    }

    pub fn went_to_payment(&self) -> bool {
        self.went_to_payment
    }

    pub fn screen(&self) -> Screen {
        self.wizard
            .as_ref()
            .map_or(Screen::SearchForm, RoundTripState::screen)
    }

    fn wizard(&self) -> Result<&RoundTripState> {
        self.wizard.as_ref().ok_or(CharruaError::NoBookingInProgress)
    }

    fn wizard_mut(&mut self) -> Result<&mut RoundTripState> {
        self.wizard.as_mut().ok_or(CharruaError::NoBookingInProgress)
    }

    // ------------------------------------------------------------------------
    // Wizard Operations
    // ------------------------------------------------------------------------

    /// Submit the search form: create the wizard and list outbound trips
    pub async fn start(&mut self, form: SearchForm) -> Result<Screen> {
        self.session.require_auth()?;
        let wizard = RoundTripState::from_form(&form, self.config.max_passengers)?;
        info!(kind = ?wizard.tipo_viaje, passengers = form.pasajeros, "booking started");

        self.wizard = Some(wizard);
        self.checkout = None;
        self.went_to_payment = false;
        self.search().await?;
        Ok(self.screen())
    }

    /// Load trips for the active leg. Failures other than session expiry end
    /// up in [`TripResults::Failed`].
    pub async fn search(&mut self) -> Result<&TripResults> {
        let wizard = self.wizard()?;
        let step = wizard.current_step;
        let leg = match step {
            WizardStep::SelectTripIda => Leg::Ida,
            WizardStep::SelectTripVuelta => Leg::Vuelta,
            _ => {
                return Err(StateTransitionError::InvalidTransition {
                    from_step: step.name().to_string(),
                    event: "search".to_string(),
                    reason: "trips are only listed on trip selection steps".to_string(),
                }
                .into())
            }
        };
        let query = wizard
            .leg(leg)
            .map(|l| l.query())
            .ok_or_else(|| StateTransitionError::StateCorruption {
                details: format!("leg {} is missing", leg),
            })?;

        let result = self.session.guard(self.trips.search(&query)).await;
        self.results_leg = Some(leg);
        match result {
            Ok(trips) => {
                debug!(%leg, count = trips.len(), "trips loaded");
                self.results = TripResults::Loaded(trips);
            }
            Err(e) if e.is_session_expired() => {
                self.results = TripResults::Idle;
                return Err(e);
            }
            Err(e) => {
                warn!(%leg, error = %e, "trip search failed");
                self.results = TripResults::Failed {
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                };
            }
        }
        Ok(&self.results)
    }

    /// Retry action of the error view
    pub async fn retry(&mut self) -> Result<&TripResults> {
        self.search().await
    }

    /// Pick a trip from the loaded list
    pub fn choose_trip(&mut self, trip_id: TripId) -> Result<Screen> {
        let trip = self
            .results
            .trips()
            .iter()
            .find(|t| t.id == trip_id)
            .cloned()
            .ok_or_else(|| StateTransitionError::InvalidSelection {
                reason: format!("trip {} is not in the current results", trip_id),
            })?;

        self.wizard_mut()?.apply(WizardEvent::TripChosen(trip))?;
        Ok(self.screen())
    }

    /// Seat map of the trip chosen for the active leg
    pub async fn seat_map(&self) -> Result<SeatMap> {
        let wizard = self.wizard()?;
        let trip_id = wizard
            .active_leg()
            .and_then(|leg| wizard.leg(leg))
            .and_then(|leg| leg.trip_id)
            .filter(|_| {
                matches!(
                    wizard.current_step,
                    WizardStep::SelectSeatIda | WizardStep::SelectSeatVuelta
                )
            })
            .ok_or_else(|| StateTransitionError::InvalidTransition {
                from_step: wizard.current_step.name().to_string(),
                event: "seat-map".to_string(),
                reason: "no trip chosen for a seat step".to_string(),
            })?;

        self.session.guard(self.trips.seats(trip_id)).await
    }

    /// Confirm seats for the active leg; lists return trips when the
    /// wizard moves on to the return leg
    pub async fn confirm_seats(&mut self, seats: Vec<SeatNumber>) -> Result<Screen> {
        let change = self.wizard_mut()?.apply(WizardEvent::SeatsConfirmed(seats))?;
        if change.to == WizardStep::SelectTripVuelta {
            self.search().await?;
        }
        Ok(self.screen())
    }

    /// Step back; leaving the first step destroys the wizard
    pub async fn back(&mut self) -> Result<Screen> {
        let change = self.wizard_mut()?.apply(WizardEvent::Back)?;

        if change.to == WizardStep::Form {
            self.exit();
            return Ok(Screen::SearchForm);
        }

        let stale = match change.to.leg() {
            Some(leg) if change.to == WizardStep::SelectTripIda || change.to == WizardStep::SelectTripVuelta => {
                self.results_leg != Some(leg)
            }
            _ => false,
        };
        if stale {
            self.search().await?;
        }
        Ok(self.screen())
    }

    /// Abandon the booking
    pub fn exit(&mut self) {
        if self.wizard.take().is_some() {
            debug!("booking wizard closed");
        }
        self.results = TripResults::Idle;
        self.results_leg = None;
        self.checkout = None;
        self.went_to_payment = false;
    }

    // ------------------------------------------------------------------------
    // Payment
    // ------------------------------------------------------------------------

    /// Create the checkout session for the selections made so far
    pub async fn begin_payment(&mut self) -> Result<CheckoutSession> {
        let request = self.wizard()?.purchase_request()?;
        let checkout = self
            .session
            .guard(self.payments.create_checkout(&request)).await?;

        info!(session_id = %checkout.session_id, seats = request.seat_count(), "checkout created");
        self.checkout = Some(checkout.clone());
        self.went_to_payment = true;
        Ok(checkout)
    }

    /// Report an app state change. After a return to the foreground from
    /// the payment page the wizard restarts at the first step, since seat
    /// availability may have changed. Returns whether a reset happened.
    pub async fn on_lifecycle(&mut self, state: AppLifecycleState) -> Result<bool> {
        if self.lifecycle.update(state) != Some(LifecycleTransition::EnteredForeground) {
            return Ok(false);
        }
        if !self.went_to_payment || !self.config.reset_on_payment_return {
            return Ok(false);
        }
        self.went_to_payment = false;

        let reset = match self.wizard.as_mut() {
            Some(wizard) => wizard.reset_after_payment_return(),
            None => false,
        };
        if reset {
            info!("returned from payment page, booking restarted");
            self.checkout = None;
            self.search().await?;
        }
        Ok(reset)
    }

    /// Handle the payment return deep link
    pub async fn complete_payment(&mut self, link: &PaymentDeepLink) -> Result<PaymentOutcome> {
        self.session.require_auth()?;
        if let Some(checkout) = &self.checkout {
            if checkout.session_id != link.session_id() {
                warn!(
                    expected = %checkout.session_id,
                    received = %link.session_id(),
                    "payment link for another checkout rejected"
                );
                return Err(DeepLinkError::CheckoutMismatch {
                    expected: checkout.session_id.clone(),
                    received: link.session_id().to_string(),
                }
                .into());
            }
        }
        match link {
            PaymentDeepLink::Success { session_id } => {
                let confirmation = self.session.guard(self.payments.confirm(session_id)).await?;
                info!(%session_id, compra = ?confirmation.compra_id, "payment confirmed");
                self.exit();
                Ok(PaymentOutcome::Confirmed(confirmation))
            }
            PaymentDeepLink::Cancelled { session_id } => {
                let confirmation = self.session.guard(self.payments.cancel(session_id)).await?;
                info!(%session_id, "payment cancelled");
                self.went_to_payment = false;
                self.checkout = None;
                Ok(PaymentOutcome::Cancelled(confirmation))
            }
        }
    }
}
