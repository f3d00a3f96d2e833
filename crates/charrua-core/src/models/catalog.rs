//! Localities, trips and seats

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{LocalidadId, SeatNumber, TripId};

// ----------------------------------------------------------------------------
// Localities
// ----------------------------------------------------------------------------

/// A city or locality used as trip origin or destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localidad {
    pub id: LocalidadId,
    pub nombre: String,
    #[serde(default)]
    pub departamento: Option<String>,
}

impl Localidad {
    /// Case-insensitive prefix match on the locality name
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.nombre
            .to_lowercase()
            .starts_with(&prefix.trim().to_lowercase())
    }
}

// ----------------------------------------------------------------------------
// Trips
// ----------------------------------------------------------------------------

/// A scheduled bus departure between two localities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viaje {
    pub id: TripId,
    pub origen: Localidad,
    pub destino: Localidad,
    pub fecha_salida: NaiveDateTime,
    #[serde(default)]
    pub fecha_llegada: Option<NaiveDateTime>,
    pub precio: f64,
    pub asientos_disponibles: u32,
    #[serde(default)]
    pub omnibus: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
}

impl Viaje {
    /// Whether the trip still has room for the given number of passengers
    pub fn has_room_for(&self, passengers: u32) -> bool {
        self.asientos_disponibles >= passengers
    }
}

/// Trip search parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripQuery {
    pub origen_id: LocalidadId,
    pub destino_id: LocalidadId,
    pub fecha: NaiveDate,
    pub cantidad_pasajes: u32,
}

impl TripQuery {
    /// Query string pairs in the form the backend expects
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("origenId".to_string(), self.origen_id.to_string()),
            ("destinoId".to_string(), self.destino_id.to_string()),
            ("fecha".to_string(), self.fecha.format("%Y-%m-%d").to_string()),
            (
                "cantidadPasajes".to_string(),
                self.cantidad_pasajes.to_string(),
            ),
        ]
    }
}

// ----------------------------------------------------------------------------
// Seats
// ----------------------------------------------------------------------------

/// One seat of a trip and whether it can still be sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asiento {
    pub numero: SeatNumber,
    pub disponible: bool,
}

/// All seats of one trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    pub viaje_id: TripId,
    pub asientos: Vec<Asiento>,
}

impl SeatMap {
    pub fn new(viaje_id: TripId, mut asientos: Vec<Asiento>) -> Self {
        asientos.sort_by_key(|a| a.numero);
        Self { viaje_id, asientos }
    }

    /// Seats that can still be selected
    pub fn available(&self) -> impl Iterator<Item = SeatNumber> + '_ {
        self.asientos
            .iter()
            .filter(|a| a.disponible)
            .map(|a| a.numero)
    }

    pub fn is_available(&self, seat: SeatNumber) -> bool {
        self.asientos
            .iter()
            .any(|a| a.numero == seat && a.disponible)
    }

    /// Seats in `selection` that are unknown or already taken
    pub fn unavailable_in<'a>(&self, selection: &'a [SeatNumber]) -> Vec<&'a SeatNumber> {
        selection
            .iter()
            .filter(|seat| !self.is_available(**seat))
            .collect()
    }
}
