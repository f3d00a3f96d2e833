//! Session manager
//!
//! Owns the authenticated session and the bearer token shared by every
//! service. Service calls run through [`SessionManager::guard`], which logs
//! the user out and broadcasts the change when the backend reports the
//! session expired. Only the session whose token the call carried is ended.

use charrua_core::models::{AuthSession, RegisterRequest, Usuario};
use charrua_core::{ApiError, ApiResult, CharruaError, Result};
use std::future::Future;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::api::{ApiClient, AuthService};

const SESSION_EVENT_BUFFER: usize = 16;

// ----------------------------------------------------------------------------
// Session Events
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out
    UserRequested,
    /// The backend rejected the token
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { usuario: Usuario },
    LoggedOut { reason: LogoutReason },
}

// ----------------------------------------------------------------------------
// Session Manager
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct SessionManager {
    client: ApiClient,
    auth: AuthService,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_BUFFER);
        Self {
            auth: AuthService::new(client.clone()),
            client,
            session: RwLock::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn current_user(&self) -> Option<Usuario> {
        self.read().as_ref().map(|s| s.usuario.clone())
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.read().clone()
    }

    /// Fail with `NotAuthenticated` unless a session exists
    pub fn require_auth(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(CharruaError::NotAuthenticated)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.auth.login(email, password).await?;
        self.establish(session.clone());
        Ok(session)
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthSession> {
        let session = self.auth.register(registration).await?;
        self.establish(session.clone());
        Ok(session)
    }

    /// Adopt a session obtained earlier, e.g. read from disk
    pub fn restore(&self, session: AuthSession) {
        self.establish(session);
    }

    fn establish(&self, session: AuthSession) {
        info!(user = %session.usuario.email, "session established");
        self.client.set_token(Some(session.token.clone()));
        let usuario = session.usuario.clone();
        *self.write() = Some(session);
        let _ = self.events.send(SessionEvent::LoggedIn { usuario });
    }

    /// End the session. A user-requested logout also tells the backend; a
    /// failure there is logged and otherwise ignored. Returns whether a
    /// session existed.
    pub async fn logout(&self, reason: LogoutReason) -> bool {
        if reason == LogoutReason::UserRequested && self.is_authenticated() {
            if let Err(e) = self.auth.logout().await {
                warn!(error = %e, "backend logout failed");
            }
        }
        self.end_session(reason)
    }

    fn end_session(&self, reason: LogoutReason) -> bool {
        let previous = self.write().take();
        self.client.set_token(None);

        match previous {
            Some(session) => {
                info!(user = %session.usuario.email, ?reason, "session ended");
                let _ = self.events.send(SessionEvent::LoggedOut { reason });
                true
            }
            None => false,
        }
    }

    /// Run a service call, logging out on session expiry
    ///
    /// The token is captured before the call is polled; a late rejection of a
    /// token that has since been replaced leaves the current session alone.
    pub async fn guard<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let sent_with = self.token();
        let result = call.await;
        self.settle(sent_with.as_deref(), result)
    }

    fn settle<T>(&self, sent_with: Option<&str>, result: ApiResult<T>) -> Result<T> {
        match result {
            Err(ApiError::SessionExpired) => {
                if sent_with.is_some() && self.token().as_deref() == sent_with {
                    warn!("backend reported an expired session");
                    self.end_session(LogoutReason::Expired);
                } else {
                    warn!("ignoring expiry reported for a replaced session");
                }
                Err(ApiError::SessionExpired.into())
            }
            other => other.map_err(Into::into),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthSession>> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charrua_core::{ClientConfig, HttpMethod};
    use crate::api::UserService;
    use charrua_harness::{fixtures, MockTransport, Reply};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn manager(transport: Arc<MockTransport>) -> SessionManager {
        SessionManager::new(ApiClient::new(transport, ClientConfig::testing().api))
    }

    #[tokio::test]
    async fn test_login_sets_token_and_broadcasts() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()));
        let session = manager(transport.clone());
        let mut events = session.subscribe();

        session.login("ana@example.com", "secreto").await.unwrap();

        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some(fixtures::TEST_TOKEN));
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::LoggedIn { .. }));

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.timeout, Some(std::time::Duration::from_secs(15)));
        assert_eq!(sent.body.unwrap()["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_expire_anything() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Post, "/auth/login", Reply::status(401));
        let session = manager(transport);

        let err = session.login("ana@example.com", "mal").await.unwrap_err();

        assert_eq!(err.to_string(), "Credenciales inválidas");
        assert!(!err.is_session_expired());
    }

    #[tokio::test]
    async fn test_guard_logs_out_on_expiry() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()));
        let session = manager(transport.clone());
        session.login("ana@example.com", "secreto").await.unwrap();
        let mut events = session.subscribe();

        let result: Result<()> = session.guard(async { Err(ApiError::SessionExpired) }).await;

        assert!(result.unwrap_err().is_session_expired());
        assert!(!session.is_authenticated());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedOut {
                reason: LogoutReason::Expired
            }
        );
        assert_eq!(transport.request_count(HttpMethod::Post, "/auth/logout"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_expiry_leaves_new_session_alone() {
        let transport = Arc::new(MockTransport::new());
        transport
            .always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()))
            .always(HttpMethod::Post, "/auth/logout", Reply::no_content())
            .always(HttpMethod::Get, "/usuarios/me", Reply::status(401))
            .delay(HttpMethod::Get, "/usuarios/me", Duration::from_secs(5));
        let session = Arc::new(manager(transport.clone()));
        session.login("ana@example.com", "secreto").await.unwrap();
        let users = UserService::new(session.client.clone());

        let relogin = {
            let session = session.clone();
            let transport = transport.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                session.logout(LogoutReason::UserRequested).await;
                transport.always(
                    HttpMethod::Post,
                    "/auth/login",
                    Reply::ok(json!({ "token": "nuevo-token", "usuario": fixtures::usuario_json() })),
                );
                session.login("ana@example.com", "secreto").await.unwrap();
            })
        };

        let result = session.guard(users.me()).await;
        relogin.await.unwrap();

        assert!(result.unwrap_err().is_session_expired());
        let sent = transport.requests_to(HttpMethod::Get, "/usuarios/me");
        assert_eq!(sent[0].bearer.as_deref(), Some(fixtures::TEST_TOKEN));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("nuevo-token"));
    }

    #[tokio::test]
    async fn test_expiry_without_token_ends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let session = manager(transport);
        let mut events = session.subscribe();

        let result: Result<()> = session.guard(async { Err(ApiError::SessionExpired) }).await;

        assert!(result.unwrap_err().is_session_expired());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_user_logout_survives_backend_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()));
        transport.always(HttpMethod::Post, "/auth/logout", Reply::status(500));
        let session = manager(transport);
        session.login("ana@example.com", "secreto").await.unwrap();

        assert!(session.logout(LogoutReason::UserRequested).await);
        assert!(!session.is_authenticated());
        assert!(!session.logout(LogoutReason::UserRequested).await);
    }
}
