//! Tickets, purchases and payment sessions

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::catalog::Viaje;
use crate::types::{PurchaseId, SeatNumber, TicketId, TripId};

/// A purchased seat on a specific trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pasaje {
    pub id: TicketId,
    pub viaje: Viaje,
    pub asiento: SeatNumber,
    pub precio: f64,
    pub estado: String,
    #[serde(default)]
    pub fecha_compra: Option<NaiveDateTime>,
}

/// One checkout grouping one or more tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compra {
    pub id: PurchaseId,
    pub fecha: NaiveDateTime,
    pub monto_total: f64,
    pub estado: String,
    pub cantidad_pasajes: u32,
    #[serde(default)]
    pub pasajes: Vec<Pasaje>,
}

/// Seats to buy, sent when the wizard reaches the payment step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub viaje_ida_id: TripId,
    pub asientos_ida: Vec<SeatNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viaje_vuelta_id: Option<TripId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asientos_vuelta: Option<Vec<SeatNumber>>,
}

impl PurchaseRequest {
    pub fn seat_count(&self) -> usize {
        self.asientos_ida.len() + self.asientos_vuelta.as_ref().map_or(0, Vec::len)
    }
}

/// External checkout page created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// Result of confirming or cancelling a checkout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub session_id: String,
    pub estado: String,
    #[serde(default)]
    pub compra_id: Option<PurchaseId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_request_omits_return_fields() {
        let request = PurchaseRequest {
            viaje_ida_id: TripId::new(5),
            asientos_ida: vec![SeatNumber::new(1), SeatNumber::new(2)],
            viaje_vuelta_id: None,
            asientos_vuelta: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"viajeIdaId": 5, "asientosIda": [1, 2]})
        );
        assert_eq!(request.seat_count(), 2);
    }
}
