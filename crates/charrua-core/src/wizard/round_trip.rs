//! Round-trip Wizard State Machine
//!
//! Sequences `select-trip-ida → select-seat-ida → select-trip-vuelta →
//! select-seat-vuelta → payment`. One-way bookings go from `select-seat-ida`
//! straight to `payment`.
//!
//! Forward events only move to the defined successor of the current step.
//! Going back clears the trip and seat fields of the leg being left. Events
//! that are not valid in the current step leave the state untouched and
//! return an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use super::form::SearchForm;
use super::navigation::Screen;
use crate::errors::StateTransitionError;
use crate::models::{Localidad, PurchaseRequest, TripQuery, Viaje};
use crate::types::{SeatNumber, TripId};

// ----------------------------------------------------------------------------
// Steps and Legs
// ----------------------------------------------------------------------------

/// One-way or round-trip booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripKind {
    Ida,
    IdaVuelta,
}

/// Wizard step, serialized with the route names the screens use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Form,
    SelectTripIda,
    SelectSeatIda,
    SelectTripVuelta,
    SelectSeatVuelta,
    Payment,
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Form => "form",
            WizardStep::SelectTripIda => "select-trip-ida",
            WizardStep::SelectSeatIda => "select-seat-ida",
            WizardStep::SelectTripVuelta => "select-trip-vuelta",
            WizardStep::SelectSeatVuelta => "select-seat-vuelta",
            WizardStep::Payment => "payment",
        }
    }

    /// Leg a step works on; `form` and `payment` belong to no leg
    pub fn leg(&self) -> Option<Leg> {
        match self {
            WizardStep::SelectTripIda | WizardStep::SelectSeatIda => Some(Leg::Ida),
            WizardStep::SelectTripVuelta | WizardStep::SelectSeatVuelta => Some(Leg::Vuelta),
            WizardStep::Form | WizardStep::Payment => None,
        }
    }

    /// Forward successor for the given trip kind
    pub fn successor(&self, kind: TripKind) -> Option<WizardStep> {
        match (self, kind) {
            (WizardStep::SelectTripIda, _) => Some(WizardStep::SelectSeatIda),
            (WizardStep::SelectSeatIda, TripKind::IdaVuelta) => Some(WizardStep::SelectTripVuelta),
            (WizardStep::SelectSeatIda, TripKind::Ida) => Some(WizardStep::Payment),
            (WizardStep::SelectTripVuelta, _) => Some(WizardStep::SelectSeatVuelta),
            (WizardStep::SelectSeatVuelta, _) => Some(WizardStep::Payment),
            (WizardStep::Form, _) | (WizardStep::Payment, _) => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outbound or return leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Leg {
    Ida,
    Vuelta,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Ida => f.write_str("ida"),
            Leg::Vuelta => f.write_str("vuelta"),
        }
    }
}

// ----------------------------------------------------------------------------
// Leg State
// ----------------------------------------------------------------------------

/// Search parameters and selections for one leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegState {
    pub origen: Localidad,
    pub destino: Localidad,
    pub fecha: NaiveDate,
    pub pasajeros: u32,
    #[serde(default)]
    pub trip_id: Option<TripId>,
    #[serde(default)]
    pub trip: Option<Viaje>,
    #[serde(default)]
    pub asientos_seleccionados: Option<Vec<SeatNumber>>,
}

impl LegState {
    pub fn new(origen: Localidad, destino: Localidad, fecha: NaiveDate, pasajeros: u32) -> Self {
        Self {
            origen,
            destino,
            fecha,
            pasajeros,
            trip_id: None,
            trip: None,
            asientos_seleccionados: None,
        }
    }

    /// Forget the chosen trip and seats
    pub fn clear_selection(&mut self) {
        self.trip_id = None;
        self.trip = None;
        self.asientos_seleccionados = None;
    }

    pub fn has_trip(&self) -> bool {
        self.trip_id.is_some()
    }

    pub fn has_seats(&self) -> bool {
        self.asientos_seleccionados.is_some()
    }

    /// Trip and seats both chosen
    pub fn is_complete(&self) -> bool {
        self.has_trip() && self.has_seats()
    }

    /// Query used to list trips for this leg
    pub fn query(&self) -> TripQuery {
        TripQuery {
            origen_id: self.origen.id,
            destino_id: self.destino.id,
            fecha: self.fecha,
            cantidad_pasajes: self.pasajeros,
        }
    }

    fn check_trip(&self, trip: &Viaje) -> Result<(), StateTransitionError> {
        if trip.origen.id != self.origen.id || trip.destino.id != self.destino.id {
            return Err(StateTransitionError::InvalidSelection {
                reason: format!(
                    "trip {} runs {} → {}, leg expects {} → {}",
                    trip.id, trip.origen.nombre, trip.destino.nombre, self.origen.nombre,
                    self.destino.nombre
                ),
            });
        }

        if !trip.has_room_for(self.pasajeros) {
            return Err(StateTransitionError::InvalidSelection {
                reason: format!(
                    "trip {} has {} seats left, {} needed",
                    trip.id, trip.asientos_disponibles, self.pasajeros
                ),
            });
        }

        Ok(())
    }

    fn check_seats(&self, seats: &[SeatNumber]) -> Result<(), StateTransitionError> {
        if seats.len() != self.pasajeros as usize {
            return Err(StateTransitionError::InvalidSelection {
                reason: format!(
                    "{} seats selected for {} passengers",
                    seats.len(),
                    self.pasajeros
                ),
            });
        }

        let unique: HashSet<_> = seats.iter().collect();
        if unique.len() != seats.len() {
            return Err(StateTransitionError::InvalidSelection {
                reason: "the same seat was selected twice".to_string(),
            });
        }

        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Events and Transitions
// ----------------------------------------------------------------------------

/// User actions that drive the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// A trip was picked from the list of the active leg
    TripChosen(Viaje),
    /// Seats were confirmed for the active leg
    SeatsConfirmed(Vec<SeatNumber>),
    /// Back navigation
    Back,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::TripChosen(_) => "trip-chosen",
            WizardEvent::SeatsConfirmed(_) => "seats-confirmed",
            WizardEvent::Back => "back",
        }
    }
}

/// Record of an applied transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepChange {
    pub from: WizardStep,
    pub to: WizardStep,
    pub event: &'static str,
}

impl StepChange {
    pub fn is_backward(&self) -> bool {
        self.event == "back"
    }
}

// ----------------------------------------------------------------------------
// Round Trip State
// ----------------------------------------------------------------------------

/// The wizard's in-memory progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripState {
    pub tipo_viaje: TripKind,
    pub current_step: WizardStep,
    pub viaje_ida: Option<LegState>,
    pub viaje_vuelta: Option<LegState>,
}

impl RoundTripState {
    /// Create the wizard from a submitted search form.
    ///
    /// The return leg swaps origin and destination of the outbound leg.
    pub fn from_form(
        form: &SearchForm,
        max_passengers: u32,
    ) -> Result<Self, crate::errors::FormError> {
        form.validate(max_passengers)?;

        let viaje_ida = LegState::new(
            form.origen.clone(),
            form.destino.clone(),
            form.fecha_ida,
            form.pasajeros,
        );

        let viaje_vuelta = match (form.tipo_viaje, form.fecha_vuelta) {
            (TripKind::IdaVuelta, Some(fecha)) => Some(LegState::new(
                form.destino.clone(),
                form.origen.clone(),
                fecha,
                form.pasajeros,
            )),
            _ => None,
        };

        Ok(Self {
            tipo_viaje: form.tipo_viaje,
            current_step: WizardStep::SelectTripIda,
            viaje_ida: Some(viaje_ida),
            viaje_vuelta,
        })
    }

    /// Leg the current step works on
    pub fn active_leg(&self) -> Option<Leg> {
        self.current_step.leg()
    }

    pub fn leg(&self, leg: Leg) -> Option<&LegState> {
        match leg {
            Leg::Ida => self.viaje_ida.as_ref(),
            Leg::Vuelta => self.viaje_vuelta.as_ref(),
        }
    }

    fn leg_mut(&mut self, leg: Leg) -> Result<&mut LegState, StateTransitionError> {
        let slot = match leg {
            Leg::Ida => self.viaje_ida.as_mut(),
            Leg::Vuelta => self.viaje_vuelta.as_mut(),
        };
        slot.ok_or_else(|| StateTransitionError::StateCorruption {
            details: format!("leg {} is missing", leg),
        })
    }

    /// Whether the wizard was left through the form
    pub fn is_exited(&self) -> bool {
        self.current_step == WizardStep::Form
    }

    /// Process an event. On error the state is left untouched.
    pub fn apply(&mut self, event: WizardEvent) -> Result<StepChange, StateTransitionError> {
        let from = self.current_step;
        let event_name = event.name();

        let to = match (from, event) {
            (WizardStep::SelectTripIda, WizardEvent::TripChosen(trip)) => {
                self.choose_trip(Leg::Ida, trip)?;
                WizardStep::SelectSeatIda
            }

            (WizardStep::SelectSeatIda, WizardEvent::SeatsConfirmed(seats)) => {
                self.confirm_seats(Leg::Ida, seats)?;
                match self.tipo_viaje {
                    TripKind::IdaVuelta => WizardStep::SelectTripVuelta,
                    TripKind::Ida => WizardStep::Payment,
                }
            }

            (WizardStep::SelectTripVuelta, WizardEvent::TripChosen(trip)) => {
                self.choose_trip(Leg::Vuelta, trip)?;
                WizardStep::SelectSeatVuelta
            }

            (WizardStep::SelectSeatVuelta, WizardEvent::SeatsConfirmed(seats)) => {
                self.confirm_seats(Leg::Vuelta, seats)?;
                WizardStep::Payment
            }

            // Backward navigation
            (WizardStep::SelectTripIda, WizardEvent::Back) => {
                for leg in [&mut self.viaje_ida, &mut self.viaje_vuelta].into_iter().flatten() {
                    leg.clear_selection();
                }
                WizardStep::Form
            }

            (WizardStep::SelectSeatIda, WizardEvent::Back) => {
                self.leg_mut(Leg::Ida)?.clear_selection();
                WizardStep::SelectTripIda
            }

            (WizardStep::SelectTripVuelta, WizardEvent::Back) => {
                self.leg_mut(Leg::Vuelta)?.clear_selection();
                WizardStep::SelectSeatIda
            }

            (WizardStep::SelectSeatVuelta, WizardEvent::Back) => {
                self.leg_mut(Leg::Vuelta)?.clear_selection();
                WizardStep::SelectTripVuelta
            }

            (WizardStep::Payment, WizardEvent::Back) => match self.tipo_viaje {
                TripKind::IdaVuelta => WizardStep::SelectSeatVuelta,
                TripKind::Ida => WizardStep::SelectSeatIda,
            },

            // Invalid transitions
            (from, event) => {
                return Err(StateTransitionError::InvalidTransition {
                    from_step: from.name().to_string(),
                    event: event_name.to_string(),
                    reason: format!("{} is not accepted in step {}", event.name(), from),
                });
            }
        };

        self.current_step = to;
        debug!(from = %from, to = %to, event = event_name, "booking wizard step change");

        Ok(StepChange {
            from,
            to,
            event: event_name,
        })
    }

    fn choose_trip(&mut self, leg: Leg, trip: Viaje) -> Result<(), StateTransitionError> {
        let state = self.leg_mut(leg)?;
        state.check_trip(&trip)?;
        state.trip_id = Some(trip.id);
        state.trip = Some(trip);
        state.asientos_seleccionados = None;
        Ok(())
    }

    fn confirm_seats(&mut self, leg: Leg, seats: Vec<SeatNumber>) -> Result<(), StateTransitionError> {
        let state = self.leg_mut(leg)?;
        state.check_seats(&seats)?;
        state.asientos_seleccionados = Some(seats);
        Ok(())
    }

    /// Conservative reset after returning from the external payment page.
    ///
    /// Unless the wizard is already at `select-trip-ida`, both legs lose their
    /// trip and seat selections and the wizard restarts at `select-trip-ida`.
    /// Returns whether a reset happened.
    pub fn reset_after_payment_return(&mut self) -> bool {
        if self.current_step == WizardStep::SelectTripIda {
            return false;
        }

        for leg in [&mut self.viaje_ida, &mut self.viaje_vuelta].into_iter().flatten() {
            leg.clear_selection();
        }
        debug!(from = %self.current_step, "booking wizard reset to select-trip-ida");
        self.current_step = WizardStep::SelectTripIda;
        true
    }

    /// Purchase built from both legs' selections; only valid at `payment`
    pub fn purchase_request(&self) -> Result<PurchaseRequest, StateTransitionError> {
        if self.current_step != WizardStep::Payment {
            return Err(StateTransitionError::InvalidTransition {
                from_step: self.current_step.name().to_string(),
                event: "purchase".to_string(),
                reason: "the wizard has not reached the payment step".to_string(),
            });
        }

        let ida = self.completed_leg(Leg::Ida)?;
        let vuelta = match self.tipo_viaje {
            TripKind::IdaVuelta => Some(self.completed_leg(Leg::Vuelta)?),
            TripKind::Ida => None,
        };

        Ok(PurchaseRequest {
            viaje_ida_id: ida.0,
            asientos_ida: ida.1,
            viaje_vuelta_id: vuelta.as_ref().map(|(id, _)| *id),
            asientos_vuelta: vuelta.map(|(_, seats)| seats),
        })
    }

    fn completed_leg(&self, leg: Leg) -> Result<(TripId, Vec<SeatNumber>), StateTransitionError> {
        let state = self.leg(leg);
        match state.and_then(|s| Some((s.trip_id?, s.asientos_seleccionados.clone()?))) {
            Some(selection) => Ok(selection),
            None => Err(StateTransitionError::StateCorruption {
                details: format!("leg {} reached payment without trip and seats", leg),
            }),
        }
    }

    /// Screen that renders the current step
    pub fn screen(&self) -> Screen {
        let leg_screen = |leg: Leg, seats: bool| -> Option<Screen> {
            let state = self.leg(leg)?;
            if seats {
                Some(Screen::SeatSelection {
                    leg,
                    trip_id: state.trip_id?,
                    passengers: state.pasajeros,
                    preselected: state.asientos_seleccionados.clone().unwrap_or_default(),
                })
            } else {
                Some(Screen::TripList {
                    leg,
                    query: state.query(),
                })
            }
        };

        let screen = match self.current_step {
            WizardStep::Form => None,
            WizardStep::SelectTripIda => leg_screen(Leg::Ida, false),
            WizardStep::SelectSeatIda => leg_screen(Leg::Ida, true),
            WizardStep::SelectTripVuelta => leg_screen(Leg::Vuelta, false),
            WizardStep::SelectSeatVuelta => leg_screen(Leg::Vuelta, true),
            WizardStep::Payment => self
                .purchase_request()
                .ok()
                .map(|request| Screen::Payment { request }),
        };

        screen.unwrap_or(Screen::SearchForm)
    }

    /// Verify that leg fields match the current step.
    ///
    /// A leg other than the active one has trip and seat fields only once it
    /// has been completed; the active leg holds at most what its step allows.
    pub fn check_invariants(&self) -> Result<(), StateTransitionError> {
        let corrupt = |details: String| Err(StateTransitionError::StateCorruption { details });

        let ida = match &self.viaje_ida {
            Some(ida) => ida,
            None if self.current_step == WizardStep::Form => return Ok(()),
            None => return corrupt("outbound leg missing".to_string()),
        };

        match (self.tipo_viaje, &self.viaje_vuelta) {
            (TripKind::IdaVuelta, None) => return corrupt("return leg missing".to_string()),
            (TripKind::Ida, Some(_)) => {
                return corrupt("one-way booking carries a return leg".to_string())
            }
            _ => {}
        }

        let vuelta_empty = self
            .viaje_vuelta
            .as_ref()
            .map_or(true, |v| !v.has_trip() && !v.has_seats());
        let vuelta_complete = self.viaje_vuelta.as_ref().map_or(true, LegState::is_complete);
        let ida_empty = !ida.has_trip() && !ida.has_seats();

        let ok = match self.current_step {
            WizardStep::Form | WizardStep::SelectTripIda => ida_empty && vuelta_empty,
            WizardStep::SelectSeatIda => ida.has_trip() && vuelta_empty,
            WizardStep::SelectTripVuelta => ida.is_complete() && vuelta_empty,
            WizardStep::SelectSeatVuelta => {
                ida.is_complete() && self.viaje_vuelta.as_ref().map_or(false, LegState::has_trip)
            }
            WizardStep::Payment => ida.is_complete() && vuelta_complete,
        };

        if ok {
            Ok(())
        } else {
            corrupt(format!("leg fields do not match step {}", self.current_step))
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalidadId;

    fn localidad(id: i64, nombre: &str) -> Localidad {
        Localidad {
            id: LocalidadId::new(id),
            nombre: nombre.to_string(),
            departamento: None,
        }
    }

    fn viaje(id: i64, from: &Localidad, to: &Localidad) -> Viaje {
        Viaje {
            id: TripId::new(id),
            origen: from.clone(),
            destino: to.clone(),
            fecha_salida: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            fecha_llegada: None,
            precio: 900.0,
            asientos_disponibles: 20,
            omnibus: None,
            estado: None,
        }
    }

    fn create_test_form(kind: TripKind) -> SearchForm {
        SearchForm {
            tipo_viaje: kind,
            origen: localidad(1, "Montevideo"),
            destino: localidad(2, "Tacuarembó"),
            fecha_ida: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            fecha_vuelta: match kind {
                TripKind::IdaVuelta => NaiveDate::from_ymd_opt(2025, 6, 5),
                TripKind::Ida => None,
            },
            pasajeros: 2,
        }
    }

    fn seats(numbers: &[u16]) -> Vec<SeatNumber> {
        numbers.iter().copied().map(SeatNumber::new).collect()
    }

    fn state_at_payment() -> RoundTripState {
        let form = create_test_form(TripKind::IdaVuelta);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();
        state
            .apply(WizardEvent::TripChosen(viaje(5, &form.origen, &form.destino)))
            .unwrap();
        state.apply(WizardEvent::SeatsConfirmed(seats(&[1, 2]))).unwrap();
        state
            .apply(WizardEvent::TripChosen(viaje(9, &form.destino, &form.origen)))
            .unwrap();
        state.apply(WizardEvent::SeatsConfirmed(seats(&[7, 8]))).unwrap();
        state
    }

    #[test]
    fn test_initial_state() {
        let state = RoundTripState::from_form(&create_test_form(TripKind::IdaVuelta), 5).unwrap();

        assert_eq!(state.current_step, WizardStep::SelectTripIda);
        assert_eq!(state.active_leg(), Some(Leg::Ida));
        let vuelta = state.viaje_vuelta.as_ref().unwrap();
        assert_eq!(vuelta.origen.id, LocalidadId::new(2));
        assert_eq!(vuelta.destino.id, LocalidadId::new(1));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_full_round_trip_flow() {
        let state = state_at_payment();

        assert_eq!(state.current_step, WizardStep::Payment);
        assert!(state.check_invariants().is_ok());

        let request = state.purchase_request().unwrap();
        assert_eq!(request.viaje_ida_id, TripId::new(5));
        assert_eq!(request.viaje_vuelta_id, Some(TripId::new(9)));
        assert_eq!(request.asientos_vuelta, Some(seats(&[7, 8])));
    }

    #[test]
    fn test_one_way_skips_return_leg() {
        let form = create_test_form(TripKind::Ida);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();
        assert!(state.viaje_vuelta.is_none());

        state
            .apply(WizardEvent::TripChosen(viaje(5, &form.origen, &form.destino)))
            .unwrap();
        let change = state.apply(WizardEvent::SeatsConfirmed(seats(&[3, 4]))).unwrap();

        assert_eq!(change.to, WizardStep::Payment);
        assert_eq!(state.purchase_request().unwrap().viaje_vuelta_id, None);
    }

    #[test]
    fn test_invalid_transition_is_noop() {
        let mut state = RoundTripState::from_form(&create_test_form(TripKind::IdaVuelta), 5).unwrap();
        let before = state.clone();

        let result = state.apply(WizardEvent::SeatsConfirmed(seats(&[1, 2])));

        match result.unwrap_err() {
            StateTransitionError::InvalidTransition { from_step, .. } => {
                assert_eq!(from_step, "select-trip-ida");
            }
            other => panic!("Expected InvalidTransition error, got {:?}", other),
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_wrong_seat_count_rejected() {
        let form = create_test_form(TripKind::IdaVuelta);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();
        state
            .apply(WizardEvent::TripChosen(viaje(5, &form.origen, &form.destino)))
            .unwrap();
        let before = state.clone();

        assert!(matches!(
            state.apply(WizardEvent::SeatsConfirmed(seats(&[1]))),
            Err(StateTransitionError::InvalidSelection { .. })
        ));
        assert!(state.apply(WizardEvent::SeatsConfirmed(seats(&[1, 1]))).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_trip_for_wrong_direction_rejected() {
        let form = create_test_form(TripKind::IdaVuelta);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();

        let reversed = viaje(5, &form.destino, &form.origen);
        assert!(state.apply(WizardEvent::TripChosen(reversed)).is_err());
        assert_eq!(state.current_step, WizardStep::SelectTripIda);
    }

    #[test]
    fn test_full_trip_rejected() {
        let form = create_test_form(TripKind::Ida);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();

        let mut full = viaje(5, &form.origen, &form.destino);
        full.asientos_disponibles = 1;
        assert!(state.apply(WizardEvent::TripChosen(full)).is_err());
    }

    #[test]
    fn test_back_from_seat_ida_clears_outbound_leg() {
        let form = create_test_form(TripKind::IdaVuelta);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();
        state
            .apply(WizardEvent::TripChosen(viaje(5, &form.origen, &form.destino)))
            .unwrap();

        let change = state.apply(WizardEvent::Back).unwrap();

        assert!(change.is_backward());
        assert_eq!(state.current_step, WizardStep::SelectTripIda);
        let ida = state.viaje_ida.as_ref().unwrap();
        assert!(ida.trip_id.is_none() && ida.trip.is_none() && ida.asientos_seleccionados.is_none());
        assert_eq!(ida.pasajeros, 2);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_back_from_seat_vuelta_keeps_outbound_leg() {
        let mut state = state_at_payment();
        state.apply(WizardEvent::Back).unwrap();
        assert_eq!(state.current_step, WizardStep::SelectSeatVuelta);
        let ida_before = state.viaje_ida.clone();

        state.apply(WizardEvent::Back).unwrap();

        assert_eq!(state.current_step, WizardStep::SelectTripVuelta);
        assert_eq!(state.viaje_ida, ida_before);
        let vuelta = state.viaje_vuelta.as_ref().unwrap();
        assert!(!vuelta.has_trip() && !vuelta.has_seats());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_back_from_first_step_exits() {
        let mut state = RoundTripState::from_form(&create_test_form(TripKind::Ida), 5).unwrap();
        state.apply(WizardEvent::Back).unwrap();
        assert!(state.is_exited());
        assert_eq!(state.screen(), Screen::SearchForm);
        assert!(state.apply(WizardEvent::Back).is_err());
    }

    #[test]
    fn test_reset_after_payment_return() {
        let mut state = state_at_payment();
        state.apply(WizardEvent::Back).unwrap();
        assert_eq!(state.current_step, WizardStep::SelectSeatVuelta);

        assert!(state.reset_after_payment_return());

        assert_eq!(state.current_step, WizardStep::SelectTripIda);
        for leg in [Leg::Ida, Leg::Vuelta] {
            let leg = state.leg(leg).unwrap();
            assert!(leg.trip_id.is_none());
            assert!(leg.trip.is_none());
            assert!(leg.asientos_seleccionados.is_none());
        }
        assert!(!state.reset_after_payment_return());
    }

    #[test]
    fn test_serialized_form_uses_route_names() {
        let state = state_at_payment();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentStep"], "payment");
        assert_eq!(json["tipoViaje"], "ida-vuelta");
        assert_eq!(json["viajeIda"]["tripId"], 5);
        assert_eq!(json["viajeVuelta"]["asientosSeleccionados"][0], 7);
    }

    #[test]
    fn test_screen_for_each_step() {
        let form = create_test_form(TripKind::IdaVuelta);
        let mut state = RoundTripState::from_form(&form, 5).unwrap();
        assert!(matches!(state.screen(), Screen::TripList { leg: Leg::Ida, .. }));

        state
            .apply(WizardEvent::TripChosen(viaje(5, &form.origen, &form.destino)))
            .unwrap();
        match state.screen() {
            Screen::SeatSelection {
                leg,
                trip_id,
                passengers,
                ..
            } => {
                assert_eq!(leg, Leg::Ida);
                assert_eq!(trip_id, TripId::new(5));
                assert_eq!(passengers, 2);
            }
            other => panic!("unexpected screen {:?}", other),
        }

        assert!(matches!(state_at_payment().screen(), Screen::Payment { .. }));
    }
}
