//! Core identifier types for the Charrua Bus client
//!
//! Backend entities are addressed by numeric ids. Each id gets its own newtype
//! so a trip id can never be passed where a locality id is expected.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Numeric Identifiers
// ----------------------------------------------------------------------------

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw backend id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Raw backend id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = crate::errors::FormError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| crate::errors::FormError::InvalidId {
                        kind: $label,
                        value: s.to_string(),
                    })
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a locality (trip origin or destination)
    LocalidadId,
    "localidad"
);
numeric_id!(
    /// Identifier of a scheduled bus departure
    TripId,
    "viaje"
);
numeric_id!(
    /// Identifier of a purchased ticket
    TicketId,
    "pasaje"
);
numeric_id!(
    /// Identifier of a purchase (one checkout, one or more tickets)
    PurchaseId,
    "compra"
);
numeric_id!(
    /// Identifier of a user notification
    NotificationId,
    "notificacion"
);
numeric_id!(
    /// Identifier of a registered user
    UserId,
    "usuario"
);

// ----------------------------------------------------------------------------
// Seat Number
// ----------------------------------------------------------------------------

/// Seat number inside a bus, as printed on the ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatNumber(u16);

impl SeatNumber {
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Parse a comma separated seat list such as `"12,13"`
    pub fn parse_list(input: &str) -> Result<Vec<SeatNumber>, crate::errors::FormError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(SeatNumber::from_str)
            .collect()
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeatNumber {
    type Err = crate::errors::FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .ok()
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| crate::errors::FormError::InvalidId {
                kind: "asiento",
                value: s.to_string(),
            })
    }
}

impl From<u16> for SeatNumber {
    fn from(number: u16) -> Self {
        Self(number)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_string() {
        let id: TripId = "42".parse().unwrap();
        assert_eq!(id, TripId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_invalid_id_reports_kind() {
        let err = "abc".parse::<LocalidadId>().unwrap_err();
        assert!(err.to_string().contains("localidad"));
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&TicketId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_seat_list_parsing() {
        let seats = SeatNumber::parse_list("12, 13,,14").unwrap();
        assert_eq!(
            seats,
            vec![SeatNumber::new(12), SeatNumber::new(13), SeatNumber::new(14)]
        );
        assert!(SeatNumber::parse_list("0").is_err());
        assert!(SeatNumber::parse_list("x").is_err());
    }
}
