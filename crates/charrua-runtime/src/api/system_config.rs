//! Backend-wide settings

use charrua_core::models::ConfiguracionSistema;
use charrua_core::{ApiResult, HttpRequest};

use super::ApiClient;

#[derive(Debug, Clone)]
pub struct ConfigService {
    client: ApiClient,
}

impl ConfigService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> ApiResult<ConfiguracionSistema> {
        self.client
            .send_json(HttpRequest::get("/configuracion"), &[])
            .await
    }
}
