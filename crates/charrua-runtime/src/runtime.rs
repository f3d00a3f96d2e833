//! Assembled client runtime
//!
//! [`CharruaRuntime`] owns the shared API client, the managers and the
//! background notification poller. Front ends keep one runtime for the life
//! of the app.

use charrua_core::models::ConfiguracionSistema;
use charrua_core::{AppLifecycleState, CharruaError, ClientConfig, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{ApiClient, ConfigService, LocationService, PaymentService, TicketService, TripService};
use crate::booking::BookingController;
use crate::managers::{
    NotificationCenter, PushDispatcher, PushNotification, SessionManager, UserManager,
};
use crate::tasks::NotificationPollerTask;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct PollerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Handle to a running Charrua client
pub struct CharruaRuntime {
    config: ClientConfig,
    client: ApiClient,
    session: Arc<SessionManager>,
    users: Arc<UserManager>,
    notifications: Arc<NotificationCenter>,
    locations: LocationService,
    trips: TripService,
    tickets: TicketService,
    payments: PaymentService,
    system: ConfigService,
    lifecycle: watch::Sender<AppLifecycleState>,
    push: PushDispatcher,
    push_receiver: Option<mpsc::Receiver<PushNotification>>,
    poller: Option<PollerHandle>,
}

impl CharruaRuntime {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        config: ClientConfig,
        client: ApiClient,
        session: Arc<SessionManager>,
        users: Arc<UserManager>,
        notifications: Arc<NotificationCenter>,
        push: PushDispatcher,
        push_receiver: mpsc::Receiver<PushNotification>,
    ) -> Self {
        let (lifecycle, _) = watch::channel(AppLifecycleState::Active);
        Self {
            locations: LocationService::new(client.clone()),
            trips: TripService::new(client.clone()),
            tickets: TicketService::new(client.clone()),
            payments: PaymentService::new(client.clone()),
            system: ConfigService::new(client.clone()),
            config,
            client,
            session,
            users,
            notifications,
            lifecycle,
            push,
            push_receiver: Some(push_receiver),
            poller: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn users(&self) -> &Arc<UserManager> {
        &self.users
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub fn locations(&self) -> &LocationService {
        &self.locations
    }

    pub fn trips(&self) -> &TripService {
        &self.trips
    }

    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    pub fn payments(&self) -> &PaymentService {
        &self.payments
    }

    pub fn system(&self) -> &ConfigService {
        &self.system
    }

    /// Callback handle for the platform push handler
    pub fn push_dispatcher(&self) -> PushDispatcher {
        self.push.clone()
    }

    /// New booking controller bound to this runtime's services
    pub fn booking(&self) -> BookingController {
        BookingController::new(
            self.trips.clone(),
            self.payments.clone(),
            self.session.clone(),
            self.config.booking.clone(),
        )
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Report the platform app state
    pub fn set_lifecycle(&self, state: AppLifecycleState) {
        self.lifecycle.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }

    pub fn lifecycle(&self) -> AppLifecycleState {
        *self.lifecycle.borrow()
    }

    /// Receiver of app state changes, for controllers living outside the
    /// runtime
    pub fn subscribe_lifecycle(&self) -> watch::Receiver<AppLifecycleState> {
        self.lifecycle.subscribe()
    }

    /// Load the backend configuration
    pub async fn load_system_config(&self) -> Result<ConfiguracionSistema> {
        let config = self.session.guard(self.system.get()).await?;
        info!(max_pasajes = config.max_pasajes_por_compra, "system configuration loaded");
        Ok(config)
    }

    /// Spawn the background notification poller
    pub fn start_notification_poller(&mut self) -> Result<()> {
        let push_receiver = self.push_receiver.take().ok_or_else(|| {
            CharruaError::config_error("notification poller already started")
        })?;
        let (shutdown, shutdown_receiver) = oneshot::channel();

        let task = NotificationPollerTask::new(
            self.notifications.clone(),
            self.session.clone(),
            self.config.polling.clone(),
            self.lifecycle.subscribe(),
            push_receiver,
            shutdown_receiver,
        );
        let task = tokio::spawn(task.run());

        self.poller = Some(PollerHandle { shutdown, task });
        Ok(())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.task.is_finished())
    }

    /// Stop background tasks
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down Charrua runtime");

        if let Some(poller) = self.poller.take() {
            let _ = poller.shutdown.send(());
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, poller.task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(CharruaError::channel_error(format!(
                        "notification poller panicked: {}",
                        e
                    )))
                }
                Err(_) => warn!("notification poller did not stop in time"),
            }
        }

        info!("Charrua runtime shut down");
        Ok(())
    }
}
