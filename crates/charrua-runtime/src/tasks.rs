//! Background tasks
//!
//! - `NotificationPollerTask`: keeps the unread counter fresh while the app
//!   is in the foreground, on every return to the foreground and on push
//!   arrival

use charrua_core::{AppLifecycleState, LifecycleTracker, LifecycleTransition, PollingConfig};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::managers::{NotificationCenter, PushNotification, SessionEvent, SessionManager};

// ----------------------------------------------------------------------------
// Notification Poller Task
// ----------------------------------------------------------------------------

/// Refreshes notifications on a timer, on foreground transitions and on
/// push arrival
pub struct NotificationPollerTask {
    center: Arc<NotificationCenter>,
    session: Arc<SessionManager>,
    config: PollingConfig,
    lifecycle: watch::Receiver<AppLifecycleState>,
    push_receiver: mpsc::Receiver<PushNotification>,
    session_events: broadcast::Receiver<SessionEvent>,
    shutdown: oneshot::Receiver<()>,
}

impl NotificationPollerTask {
    pub fn new(
        center: Arc<NotificationCenter>,
        session: Arc<SessionManager>,
        config: PollingConfig,
        lifecycle: watch::Receiver<AppLifecycleState>,
        push_receiver: mpsc::Receiver<PushNotification>,
        shutdown: oneshot::Receiver<()>,
    ) -> Self {
        let session_events = session.subscribe();
        Self {
            center,
            session,
            config,
            lifecycle,
            push_receiver,
            session_events,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!(
            interval_secs = self.config.unread_interval_secs,
            "notification poller started"
        );

        let mut tracker = LifecycleTracker::new(*self.lifecycle.borrow());
        let mut ticker = interval(self.config.unread_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;
        self.refresh_unread(tracker.current()).await;

        loop {
            tokio::select! {
                _ = &mut self.shutdown => {
                    debug!("notification poller shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh_unread(tracker.current()).await;
                }
                changed = self.lifecycle.changed() => {
                    if changed.is_err() {
                        debug!("lifecycle channel closed, stopping notification poller");
                        break;
                    }
                    let next = *self.lifecycle.borrow_and_update();
                    if tracker.update(next) == Some(LifecycleTransition::EnteredForeground) {
                        self.refresh_unread(next).await;
                        ticker.reset();
                    }
                }
                Some(push) = self.push_receiver.recv() => {
                    debug!(title = ?push.title, "push received");
                    self.refresh_unread(AppLifecycleState::Active).await;
                    if self.config.refresh_list_on_push {
                        self.refresh_list().await;
                    }
                }
                event = self.session_events.recv() => match event {
                    Ok(SessionEvent::LoggedOut { .. }) => self.center.clear(),
                    Ok(SessionEvent::LoggedIn { .. }) => {
                        self.refresh_unread(tracker.current()).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "session events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        info!("notification poller stopped");
    }

    async fn refresh_unread(&self, state: AppLifecycleState) {
        if !state.is_foreground() || !self.session.is_authenticated() {
            return;
        }
        match self.center.refresh_unread_count().await {
            Ok(outcome) => debug!(?outcome, "unread count refreshed"),
            Err(e) => warn!(error = %e, "unread count refresh failed"),
        }
    }

    async fn refresh_list(&self) {
        if !self.session.is_authenticated() {
            return;
        }
        if let Err(e) = self.center.refresh_notifications().await {
            warn!(error = %e, "notification list refresh failed");
        }
    }
}
