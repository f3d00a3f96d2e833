//! Checkout sessions on the external payment page

use charrua_core::models::{CheckoutSession, PaymentConfirmation, PurchaseRequest};
use charrua_core::{ApiResult, HttpRequest, PaymentDeepLink};
use serde_json::json;

use super::ApiClient;

pub const SEATS_TAKEN: &str = "Los asientos seleccionados ya no están disponibles";

#[derive(Debug, Clone)]
pub struct PaymentService {
    client: ApiClient,
}

impl PaymentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create the checkout page; the backend redirects back to the app's
    /// payment deep links
    pub async fn create_checkout(&self, purchase: &PurchaseRequest) -> ApiResult<CheckoutSession> {
        let mut body = ApiClient::body(purchase)?;
        if let Some(object) = body.as_object_mut() {
            object.insert("successUrl".to_string(), json!(PaymentDeepLink::success_url()));
            object.insert("cancelUrl".to_string(), json!(PaymentDeepLink::cancel_url()));
        }

        self.client
            .send_json(
                HttpRequest::post("/pagos/checkout").with_body(body),
                &[(409, SEATS_TAKEN)],
            )
            .await
    }

    pub async fn confirm(&self, session_id: &str) -> ApiResult<PaymentConfirmation> {
        let request = HttpRequest::post("/pagos/confirmar").with_body(json!({ "sessionId": session_id }));
        self.client.send_json(request, &[]).await
    }

    pub async fn cancel(&self, session_id: &str) -> ApiResult<PaymentConfirmation> {
        let request = HttpRequest::post("/pagos/cancelar").with_body(json!({ "sessionId": session_id }));
        self.client.send_json(request, &[]).await
    }
}
