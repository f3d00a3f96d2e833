//! Login, registration and logout

use charrua_core::models::{AuthSession, LoginRequest, RegisterRequest};
use charrua_core::{ApiResult, HttpRequest};

use super::ApiClient;

pub const INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub const EMAIL_TAKEN: &str = "El email ya está registrado";

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session. A 401 here means bad credentials,
    /// not an expired session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let body = ApiClient::body(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let request = HttpRequest::post("/auth/login")
            .with_body(body)
            .with_timeout(self.client.config().login_timeout());

        self.client
            .send_json(request, &[(401, INVALID_CREDENTIALS)])
            .await
    }

    pub async fn register(&self, registration: &RegisterRequest) -> ApiResult<AuthSession> {
        let request = HttpRequest::post("/auth/register").with_body(ApiClient::body(registration)?);
        self.client.send_json(request, &[(409, EMAIL_TAKEN)]).await
    }

    /// Invalidate the token on the backend
    pub async fn logout(&self) -> ApiResult<()> {
        self.client
            .send_empty(HttpRequest::post("/auth/logout"), &[])
            .await
    }
}
