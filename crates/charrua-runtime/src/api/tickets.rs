//! Ticket and purchase history

use charrua_core::models::{Compra, Page, PageRequest, Pasaje};
use charrua_core::{ApiResult, HttpRequest, PurchaseId, TicketId};

use super::ApiClient;

pub const PURCHASE_NOT_FOUND: &str = "Compra no encontrada";
pub const TICKET_NOT_CANCELLABLE: &str = "El pasaje ya no puede cancelarse";

#[derive(Debug, Clone)]
pub struct TicketService {
    client: ApiClient,
}

impl TicketService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn my_tickets(&self, page: PageRequest) -> ApiResult<Page<Pasaje>> {
        let request = HttpRequest::get("/pasajes/mis-pasajes").with_query(page.to_query_pairs());
        self.client.send_json(request, &[]).await
    }

    pub async fn my_purchases(&self, page: PageRequest) -> ApiResult<Page<Compra>> {
        let request = HttpRequest::get("/compras/mis-compras").with_query(page.to_query_pairs());
        self.client.send_json(request, &[]).await
    }

    pub async fn purchase(&self, id: PurchaseId) -> ApiResult<Compra> {
        self.client
            .send_json(
                HttpRequest::get(format!("/compras/{}", id)),
                &[(404, PURCHASE_NOT_FOUND)],
            )
            .await
    }

    pub async fn cancel_ticket(&self, id: TicketId) -> ApiResult<()> {
        self.client
            .send_empty(
                HttpRequest::put(format!("/pasajes/{}/cancelar", id)),
                &[(409, TICKET_NOT_CANCELLABLE)],
            )
            .await
    }
}
