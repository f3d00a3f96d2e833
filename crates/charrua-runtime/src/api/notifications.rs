//! Notification inbox endpoints

use charrua_core::models::{DevicePlatform, DeviceTokenRegistration, Notificacion, Page, PageRequest, UnreadCount};
use charrua_core::{ApiResult, HttpRequest, NotificationId};

use super::ApiClient;

#[derive(Debug, Clone)]
pub struct NotificationApiService {
    client: ApiClient,
}

impl NotificationApiService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Notificacion>> {
        let request = HttpRequest::get("/notificaciones").with_query(page.to_query_pairs());
        self.client.send_json(request, &[]).await
    }

    pub async fn unread_count(&self) -> ApiResult<u32> {
        let count: UnreadCount = self
            .client
            .send_json(HttpRequest::get("/notificaciones/no-leidas/count"), &[])
            .await?;
        Ok(count.count)
    }

    pub async fn mark_read(&self, id: NotificationId) -> ApiResult<()> {
        self.client
            .send_empty(HttpRequest::put(format!("/notificaciones/{}/leida", id)), &[])
            .await
    }

    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.client
            .send_empty(HttpRequest::put("/notificaciones/leidas"), &[])
            .await
    }

    pub async fn register_device_token(&self, token: &str, platform: DevicePlatform) -> ApiResult<()> {
        let registration = DeviceTokenRegistration {
            token: token.to_string(),
            plataforma: platform,
        };
        let request = HttpRequest::post("/notificaciones/token").with_body(ApiClient::body(&registration)?);
        self.client.send_empty(request, &[]).await
    }
}
