//! Search form submitted to start the wizard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::round_trip::TripKind;
use crate::errors::FormError;
use crate::models::Localidad;

/// Values entered on the trip search screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub tipo_viaje: TripKind,
    pub origen: Localidad,
    pub destino: Localidad,
    pub fecha_ida: NaiveDate,
    #[serde(default)]
    pub fecha_vuelta: Option<NaiveDate>,
    pub pasajeros: u32,
}

impl SearchForm {
    /// Check the form before a wizard is created from it
    pub fn validate(&self, max_passengers: u32) -> Result<(), FormError> {
        if self.origen.id == self.destino.id {
            return Err(FormError::SameLocality);
        }

        if self.pasajeros == 0 || self.pasajeros > max_passengers {
            return Err(FormError::InvalidPassengerCount {
                requested: self.pasajeros,
                max: max_passengers,
            });
        }

        if self.tipo_viaje == TripKind::IdaVuelta {
            let vuelta = self.fecha_vuelta.ok_or(FormError::MissingReturnDate)?;
            if vuelta < self.fecha_ida {
                return Err(FormError::ReturnBeforeDeparture);
            }
        }

        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date as typed by the user
pub fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FormError::InvalidDate {
        value: value.to_string(),
    })
}
