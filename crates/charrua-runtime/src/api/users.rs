//! Profile of the logged-in user

use charrua_core::models::{PasswordChange, ProfileUpdate, Usuario};
use charrua_core::{ApiResult, HttpRequest};

use super::ApiClient;

pub const WRONG_CURRENT_PASSWORD: &str = "La contraseña actual es incorrecta";

#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> ApiResult<Usuario> {
        self.client
            .send_json(HttpRequest::get("/usuarios/me"), &[])
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Usuario> {
        let request = HttpRequest::put("/usuarios/me").with_body(ApiClient::body(update)?);
        self.client.send_json(request, &[]).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        let request = HttpRequest::put("/usuarios/me/password").with_body(ApiClient::body(change)?);
        self.client
            .send_empty(request, &[(400, WRONG_CURRENT_PASSWORD)])
            .await
    }
}
