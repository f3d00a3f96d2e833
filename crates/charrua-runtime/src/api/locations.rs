//! Localities served by the bus network

use charrua_core::models::Localidad;
use charrua_core::{ApiResult, HttpRequest};

use super::ApiClient;

#[derive(Debug, Clone)]
pub struct LocationService {
    client: ApiClient,
}

impl LocationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Localidad>> {
        self.client
            .send_json(HttpRequest::get("/localidades"), &[])
            .await
    }

    /// Localities whose name starts with `prefix`; filtered client side
    pub async fn search(&self, prefix: &str) -> ApiResult<Vec<Localidad>> {
        let mut all = self.list().await?;
        all.retain(|l| l.matches_prefix(prefix));
        Ok(all)
    }
}
