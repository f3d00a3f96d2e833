//! Runtime Builder API
//!
//! Wires the shared API client, services and managers into a
//! [`CharruaRuntime`]. Consumers (CLI, tests, app glue) pick the transport
//! and configuration.

use charrua_core::models::AuthSession;
use charrua_core::{ApiTransport, ClientConfig, Result};
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, NotificationApiService, ReqwestTransport, UserService};
use crate::managers::{NotificationCenter, PushDispatcher, SessionManager, UserManager};
use crate::runtime::CharruaRuntime;

const DEFAULT_PUSH_BUFFER: usize = 8;

/// Builder for the client runtime
pub struct RuntimeBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn ApiTransport>>,
    session: Option<AuthSession>,
    push_buffer: usize,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            session: None,
            push_buffer: DEFAULT_PUSH_BUFFER,
        }
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom transport instead of reqwest
    pub fn with_transport(mut self, transport: Arc<dyn ApiTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Start with a previously obtained session
    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Pending push notifications kept before the poller catches up
    pub fn push_buffer(mut self, size: usize) -> Self {
        self.push_buffer = size;
        self
    }

    /// Build the runtime; background tasks are not started
    pub fn build(self) -> Result<CharruaRuntime> {
        self.config.validate()?;

        let transport: Arc<dyn ApiTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config.api)?),
        };
        info!(
            transport = transport.name(),
            base_url = %self.config.api.base_url,
            "Building Charrua runtime"
        );

        let client = ApiClient::new(transport, self.config.api.clone());
        let session = Arc::new(SessionManager::new(client.clone()));
        if let Some(existing) = self.session {
            session.restore(existing);
        }

        let users = Arc::new(UserManager::new(UserService::new(client.clone()), session.clone()));
        let notifications = Arc::new(NotificationCenter::new(
            NotificationApiService::new(client.clone()),
            session.clone(),
            self.config.polling.page_size,
        ));
        let (push, push_receiver) = PushDispatcher::channel(self.push_buffer);

        Ok(CharruaRuntime::assemble(
            self.config,
            client,
            session,
            users,
            notifications,
            push,
            push_receiver,
        ))
    }

    /// Build and spawn the notification poller
    pub fn build_and_start(self) -> Result<CharruaRuntime> {
        let mut runtime = self.build()?;
        runtime.start_notification_poller()?;
        Ok(runtime)
    }
}

// ----------------------------------------------------------------------------
// Convenience Functions
// ----------------------------------------------------------------------------

/// Runtime over a custom transport with the testing configuration
pub fn create_test_runtime(transport: Arc<dyn ApiTransport>) -> Result<CharruaRuntime> {
    RuntimeBuilder::new()
        .with_config(ClientConfig::testing())
        .with_transport(transport)
        .build()
}

/// Runtime for command line use: reqwest transport, no background tasks
pub fn create_cli_runtime(config: ClientConfig, session: Option<AuthSession>) -> Result<CharruaRuntime> {
    let builder = RuntimeBuilder::new().with_config(config);
    match session {
        Some(session) => builder.with_session(session).build(),
        None => builder.build(),
    }
}
