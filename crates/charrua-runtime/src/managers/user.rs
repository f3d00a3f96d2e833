//! Cached profile of the logged-in user

use charrua_core::models::{PasswordChange, ProfileUpdate, Usuario};
use charrua_core::{FormError, Result};
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::session::SessionManager;
use crate::api::UserService;

/// Profile cache; entries belong to the token they were fetched with, so a
/// new session never sees the previous user's profile
#[derive(Debug)]
pub struct UserManager {
    users: UserService,
    session: Arc<SessionManager>,
    cached: RwLock<Option<(String, Usuario)>>,
}

impl UserManager {
    pub fn new(users: UserService, session: Arc<SessionManager>) -> Self {
        Self {
            users,
            session,
            cached: RwLock::new(None),
        }
    }

    /// Current profile: the refreshed copy when available, else the user
    /// returned at login
    pub fn profile(&self) -> Option<Usuario> {
        let token = self.session.token()?;
        let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
        match cached.as_ref() {
            Some((owner, usuario)) if *owner == token => Some(usuario.clone()),
            _ => self.session.current_user(),
        }
    }

    pub async fn refresh(&self) -> Result<Usuario> {
        self.session.require_auth()?;
        let usuario = self.session.guard(self.users.me()).await?;
        self.store(usuario.clone());
        Ok(usuario)
    }

    pub async fn update(&self, update: &ProfileUpdate) -> Result<Usuario> {
        self.session.require_auth()?;
        if update.is_empty() {
            return Err(FormError::MissingField { field: "perfil" }.into());
        }
        let usuario = self.session.guard(self.users.update_profile(update)).await?;
        self.store(usuario.clone());
        Ok(usuario)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        self.session.require_auth()?;
        if change.password_nueva.trim().is_empty() {
            return Err(FormError::MissingField {
                field: "contraseña nueva",
            }
            .into());
        }
        self.session.guard(self.users.change_password(change)).await
    }

    fn store(&self, usuario: Usuario) {
        if let Some(token) = self.session.token() {
            debug!(user = %usuario.email, "profile cached");
            *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some((token, usuario));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use charrua_core::{ClientConfig, HttpMethod};
    use charrua_harness::{fixtures, MockTransport, Reply};
    use serde_json::json;

    async fn logged_in(transport: Arc<MockTransport>) -> UserManager {
        let client = ApiClient::new(transport.clone(), ClientConfig::testing().api);
        transport.always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()));
        let session = Arc::new(SessionManager::new(client.clone()));
        session.login("ana@example.com", "secreto").await.unwrap();
        UserManager::new(UserService::new(client), session)
    }

    #[tokio::test]
    async fn test_update_replaces_cached_profile() {
        let transport = Arc::new(MockTransport::new());
        let mut updated = fixtures::usuario_json();
        updated["telefono"] = json!("099123456");
        transport.always(HttpMethod::Put, "/usuarios/me", Reply::ok(updated));
        let users = logged_in(transport).await;
        assert_eq!(users.profile().unwrap().telefono, None);

        let update = ProfileUpdate {
            telefono: Some("099123456".to_string()),
            ..ProfileUpdate::default()
        };
        users.update(&update).await.unwrap();

        assert_eq!(users.profile().unwrap().telefono.as_deref(), Some("099123456"));
    }

    #[tokio::test]
    async fn test_expired_refresh_clears_profile() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Get, "/usuarios/me", Reply::status(401));
        let users = logged_in(transport).await;

        let err = users.refresh().await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(users.profile().is_none());
    }

    #[tokio::test]
    async fn test_empty_update_rejected_locally() {
        let transport = Arc::new(MockTransport::new());
        let users = logged_in(transport.clone()).await;
        assert!(users.update(&ProfileUpdate::default()).await.is_err());
        assert_eq!(transport.request_count(HttpMethod::Put, "/usuarios/me"), 0);
    }
}
