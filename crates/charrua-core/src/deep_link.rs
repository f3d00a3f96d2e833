//! Payment return deep links
//!
//! The payment page sends the user back to `charruabus://pago/exitoso` or
//! `charruabus://pago/cancelado`, both carrying the checkout `session_id`.

use url::Url;

use crate::errors::DeepLinkError;

pub const SCHEME: &str = "charruabus";
pub const PAYMENT_HOST: &str = "pago";
const SUCCESS_ROUTE: &str = "exitoso";
const CANCEL_ROUTE: &str = "cancelado";

/// Parsed payment return link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDeepLink {
    Success { session_id: String },
    Cancelled { session_id: String },
}

impl PaymentDeepLink {
    /// Parse a link handed to the app by the platform
    pub fn parse(input: &str) -> Result<Self, DeepLinkError> {
        let url = Url::parse(input.trim()).map_err(|_| DeepLinkError::InvalidUrl {
            input: input.to_string(),
        })?;

        if url.scheme() != SCHEME {
            return Err(DeepLinkError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            });
        }

        let host = url.host_str().unwrap_or_default();
        let route = url.path().trim_matches('/');
        if host != PAYMENT_HOST {
            return Err(DeepLinkError::UnknownRoute {
                route: format!("{}/{}", host, route),
            });
        }

        let session_id = url
            .query_pairs()
            .find(|(key, _)| key == "session_id")
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(DeepLinkError::MissingSessionId)?;

        match route {
            SUCCESS_ROUTE => Ok(PaymentDeepLink::Success { session_id }),
            CANCEL_ROUTE => Ok(PaymentDeepLink::Cancelled { session_id }),
            other => Err(DeepLinkError::UnknownRoute {
                route: format!("{}/{}", host, other),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            PaymentDeepLink::Success { session_id } | PaymentDeepLink::Cancelled { session_id } => {
                session_id
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentDeepLink::Success { .. })
    }

    /// Return URL for a completed payment, sent when creating the checkout
    pub fn success_url() -> String {
        format!("{}://{}/{}", SCHEME, PAYMENT_HOST, SUCCESS_ROUTE)
    }

    /// Return URL for an abandoned payment
    pub fn cancel_url() -> String {
        format!("{}://{}/{}", SCHEME, PAYMENT_HOST, CANCEL_ROUTE)
    }

    /// Link as the payment page would produce it
    pub fn to_url(&self) -> String {
        let base = match self {
            PaymentDeepLink::Success { .. } => Self::success_url(),
            PaymentDeepLink::Cancelled { .. } => Self::cancel_url(),
        };
        let mut url = match Url::parse(&base) {
            Ok(url) => url,
            Err(_) => return base,
        };
        url.query_pairs_mut()
            .append_pair("session_id", self.session_id());
        url.to_string()
    }
}
