//! Error types for the Charrua Bus client
//!
//! This module contains the API error taxonomy (HTTP status codes mapped to the
//! Spanish messages shown to users), wizard transition errors, form and deep link
//! errors, and the `CharruaError` type that unifies them all.

use serde_json::Value;

// ----------------------------------------------------------------------------
// User Facing Messages
// ----------------------------------------------------------------------------

/// Messages shown to the user for each error class
pub mod messages {
    /// Sentinel message that makes front ends trigger a global logout
    pub const SESSION_EXPIRED: &str = "Sesión expirada";
    pub const NETWORK: &str = "Error de conexión. Verifica tu conexión a internet.";
    pub const TIMEOUT: &str = "La solicitud tardó demasiado. Intenta nuevamente.";
    pub const SERVER: &str = "Error del servidor. Intenta más tarde.";
    pub const VALIDATION: &str = "Los datos ingresados no son válidos.";
    pub const UNAUTHORIZED: &str = "No autorizado.";
    pub const FORBIDDEN: &str = "No tienes permisos para realizar esta acción.";
    pub const NOT_FOUND: &str = "El recurso solicitado no existe.";
    pub const CONFLICT: &str = "La operación no puede completarse en este momento.";
    pub const UNEXPECTED: &str = "Ocurrió un error inesperado.";
    pub const DECODE: &str = "Respuesta inválida del servidor.";
}

// ----------------------------------------------------------------------------
// API Errors
// ----------------------------------------------------------------------------

/// Per-call replacement messages keyed by HTTP status
pub type StatusOverrides = &'static [(u16, &'static str)];

/// Errors produced by a single REST call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{}", messages::NETWORK)]
    Network { reason: String },

    #[error("{}", messages::TIMEOUT)]
    Timeout { after_ms: u64 },

    /// HTTP 401 on an authenticated call
    #[error("{}", messages::SESSION_EXPIRED)]
    SessionExpired,

    /// HTTP 401 on a call that maps it to its own meaning (e.g. bad credentials)
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{}", messages::SERVER)]
    Server { status: u16 },

    #[error("{message}")]
    Unexpected { status: u16, message: String },

    #[error("{}", messages::DECODE)]
    Decode { reason: String },
}

impl ApiError {
    /// Map a non-2xx response to an error.
    ///
    /// Message precedence for 4xx responses: per-call override, then the
    /// message carried in the response body, then the default text.
    /// 5xx responses always use the generic server message.
    pub fn from_status(status: u16, body: &str, overrides: StatusOverrides) -> Self {
        let override_message = overrides
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, message)| (*message).to_string());

        let message_or = |default: &str| {
            override_message
                .clone()
                .or_else(|| extract_server_message(body))
                .unwrap_or_else(|| default.to_string())
        };

        match status {
            401 => match override_message.clone() {
                Some(message) => ApiError::Unauthorized { message },
                None => ApiError::SessionExpired,
            },
            400 | 422 => ApiError::Validation {
                message: message_or(messages::VALIDATION),
            },
            403 => ApiError::Forbidden {
                message: message_or(messages::FORBIDDEN),
            },
            404 => ApiError::NotFound {
                message: message_or(messages::NOT_FOUND),
            },
            409 => ApiError::Conflict {
                message: message_or(messages::CONFLICT),
            },
            500..=599 => ApiError::Server { status },
            _ => ApiError::Unexpected {
                status,
                message: message_or(messages::UNEXPECTED),
            },
        }
    }

    /// Whether this error must trigger a global logout
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Whether a retry button makes sense for this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network { .. } | ApiError::Timeout { .. } | ApiError::Server { .. }
        )
    }

    /// HTTP status behind the error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired | ApiError::Unauthorized { .. } => Some(401),
            ApiError::Validation { .. } => Some(400),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Server { status } | ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Timeout { .. } | ApiError::Decode { .. } => None,
        }
    }
}

/// Pull a human readable message out of a JSON error body
fn extract_server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "mensaje", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

// ----------------------------------------------------------------------------
// Wizard Errors
// ----------------------------------------------------------------------------

/// Errors raised by the booking wizard. The wizard state is never modified
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateTransitionError {
    #[error("Invalid transition from {from_step} on event {event}: {reason}")]
    InvalidTransition {
        from_step: String,
        event: String,
        reason: String,
    },

    #[error("Invalid seat selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Wizard state corruption: {details}")]
    StateCorruption { details: String },
}

// ----------------------------------------------------------------------------
// Form Errors
// ----------------------------------------------------------------------------

/// Validation errors for user input (search form, ids, dates)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("El origen y el destino deben ser distintos")]
    SameLocality,

    #[error("Cantidad de pasajes inválida: {requested} (máximo {max})")]
    InvalidPassengerCount { requested: u32, max: u32 },

    #[error("Debes indicar la fecha de vuelta")]
    MissingReturnDate,

    #[error("La fecha de vuelta no puede ser anterior a la de ida")]
    ReturnBeforeDeparture,

    #[error("Identificador de {kind} inválido: {value}")]
    InvalidId { kind: &'static str, value: String },

    #[error("Fecha inválida: {value} (formato AAAA-MM-DD)")]
    InvalidDate { value: String },

    #[error("Campo requerido: {field}")]
    MissingField { field: &'static str },
}

// ----------------------------------------------------------------------------
// Deep Link Errors
// ----------------------------------------------------------------------------

/// Errors parsing payment return links
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeepLinkError {
    #[error("Enlace de pago inválido: {input}")]
    InvalidUrl { input: String },

    #[error("Esquema de enlace no soportado: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("Ruta de enlace desconocida: {route}")]
    UnknownRoute { route: String },

    #[error("Al enlace de pago le falta el parámetro session_id")]
    MissingSessionId,

    /// Link for a checkout other than the one in progress
    #[error("El enlace de pago no corresponde a la compra en curso")]
    CheckoutMismatch { expected: String, received: String },
}

// ----------------------------------------------------------------------------
// Unified Error
// ----------------------------------------------------------------------------

/// Core error type for the Charrua Bus client
#[derive(Debug, Clone, thiserror::Error)]
pub enum CharruaError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Error en la reserva: {0}")]
    StateTransition(#[from] StateTransitionError),

    #[error("{0}")]
    Form(#[from] FormError),

    #[error("{0}")]
    DeepLink(#[from] DeepLinkError),

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Channel communication error between runtime tasks
    #[error("Channel error: {message}")]
    Channel { message: String },

    /// Operation needs an authenticated session
    #[error("Debes iniciar sesión para continuar")]
    NotAuthenticated,

    /// Booking operation with no wizard in progress
    #[error("No hay una reserva en curso")]
    NoBookingInProgress,
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl CharruaError {
    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        CharruaError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a channel error with a message
    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        CharruaError::Channel {
            message: message.into(),
        }
    }

    /// Create a network error with a reason
    pub fn network<T: Into<String>>(reason: T) -> Self {
        CharruaError::Api(ApiError::Network {
            reason: reason.into(),
        })
    }

    /// Whether the underlying API error signals an expired session
    pub fn is_session_expired(&self) -> bool {
        matches!(self, CharruaError::Api(err) if err.is_session_expired())
    }

    /// Whether the operation can be retried as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, CharruaError::Api(err) if err.is_retryable())
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, CharruaError>;
pub type ApiResult<T> = core::result::Result<T, ApiError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
