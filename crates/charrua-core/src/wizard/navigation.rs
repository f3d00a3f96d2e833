//! Typed navigation targets for the booking flow

use serde::{Deserialize, Serialize};

use super::round_trip::Leg;
use crate::models::{PurchaseRequest, TripQuery};
use crate::types::{SeatNumber, TripId};

/// Screen a front end should show for the current wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "kebab-case")]
pub enum Screen {
    SearchForm,
    TripList {
        leg: Leg,
        query: TripQuery,
    },
    SeatSelection {
        leg: Leg,
        trip_id: TripId,
        passengers: u32,
        /// Seats kept from an earlier visit to this step
        preselected: Vec<SeatNumber>,
    },
    Payment {
        request: PurchaseRequest,
    },
}

impl Screen {
    /// Header text for the screen
    pub fn title(&self) -> &'static str {
        match self {
            Screen::SearchForm => "Buscar pasajes",
            Screen::TripList { leg: Leg::Ida, .. } => "Elegí tu viaje de ida",
            Screen::TripList { leg: Leg::Vuelta, .. } => "Elegí tu viaje de vuelta",
            Screen::SeatSelection { leg: Leg::Ida, .. } => "Asientos de ida",
            Screen::SeatSelection { leg: Leg::Vuelta, .. } => "Asientos de vuelta",
            Screen::Payment { .. } => "Pago",
        }
    }

    pub fn leg(&self) -> Option<Leg> {
        match self {
            Screen::TripList { leg, .. } | Screen::SeatSelection { leg, .. } => Some(*leg),
            Screen::SearchForm | Screen::Payment { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_tagging() {
        let json = serde_json::to_value(Screen::SearchForm).unwrap();
        assert_eq!(json["screen"], "search-form");
    }

    #[test]
    fn test_titles_follow_leg() {
        let screen = Screen::SeatSelection {
            leg: Leg::Vuelta,
            trip_id: TripId::new(3),
            passengers: 1,
            preselected: Vec::new(),
        };
        assert_eq!(screen.title(), "Asientos de vuelta");
        assert_eq!(screen.leg(), Some(Leg::Vuelta));
    }
}
