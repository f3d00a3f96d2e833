//! Notification center
//!
//! Keeps the inbox and the unread counter. Refreshes are single-flight: a
//! call that overlaps one already in flight is dropped and reports
//! [`RefreshOutcome::Skipped`] instead of queueing a second request.

use charrua_core::models::{DevicePlatform, Notificacion, Page, PageRequest};
use charrua_core::{NotificationId, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use super::guard::InFlightGuard;
use super::session::SessionManager;
use crate::api::NotificationApiService;
use std::sync::Arc;

/// Result of a single-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome<T> {
    Completed(T),
    /// Another refresh was in flight; nothing was requested
    Skipped,
}

impl<T> RefreshOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RefreshOutcome::Skipped)
    }
}

#[derive(Debug, Default)]
struct Inbox {
    items: Vec<Notificacion>,
    next_page: Option<PageRequest>,
}

#[derive(Debug)]
pub struct NotificationCenter {
    api: NotificationApiService,
    session: Arc<SessionManager>,
    page_size: u32,
    inbox: Mutex<Inbox>,
    unread: watch::Sender<u32>,
    unread_in_flight: AtomicBool,
    list_in_flight: AtomicBool,
}

impl NotificationCenter {
    pub fn new(api: NotificationApiService, session: Arc<SessionManager>, page_size: u32) -> Self {
        let (unread, _) = watch::channel(0);
        Self {
            api,
            session,
            page_size: page_size.max(1),
            inbox: Mutex::new(Inbox::default()),
            unread,
            unread_in_flight: AtomicBool::new(false),
            list_in_flight: AtomicBool::new(false),
        }
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    pub fn unread_count(&self) -> u32 {
        *self.unread.borrow()
    }

    /// Receiver notified whenever the unread count changes
    pub fn subscribe_unread(&self) -> watch::Receiver<u32> {
        self.unread.subscribe()
    }

    pub fn notifications(&self) -> Vec<Notificacion> {
        self.lock().items.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().next_page.is_some()
    }

    // ------------------------------------------------------------------------
    // Refreshes
    // ------------------------------------------------------------------------

    /// Fetch the unread count from the backend
    pub async fn refresh_unread_count(&self) -> Result<RefreshOutcome<u32>> {
        self.session.require_auth()?;
        let _guard = match InFlightGuard::try_acquire(&self.unread_in_flight) {
            Some(guard) => guard,
            None => {
                debug!("unread count refresh already in flight, skipping");
                return Ok(RefreshOutcome::Skipped);
            }
        };

        let count = self.session.guard(self.api.unread_count()).await?;
        self.set_unread(count);
        Ok(RefreshOutcome::Completed(count))
    }

    /// Reload the first page of the inbox
    pub async fn refresh_notifications(&self) -> Result<RefreshOutcome<usize>> {
        self.session.require_auth()?;
        let _guard = match InFlightGuard::try_acquire(&self.list_in_flight) {
            Some(guard) => guard,
            None => {
                debug!("notification refresh already in flight, skipping");
                return Ok(RefreshOutcome::Skipped);
            }
        };

        let page = self
            .session
            .guard(self.api.list(PageRequest::first(self.page_size))).await?;
        Ok(RefreshOutcome::Completed(self.store_page(page, true)))
    }

    /// Append the next page; completes with 0 when there is nothing left
    pub async fn load_more(&self) -> Result<RefreshOutcome<usize>> {
        self.session.require_auth()?;
        let _guard = match InFlightGuard::try_acquire(&self.list_in_flight) {
            Some(guard) => guard,
            None => return Ok(RefreshOutcome::Skipped),
        };

        let next = match self.lock().next_page {
            Some(next) => next,
            None => return Ok(RefreshOutcome::Completed(0)),
        };

        let page = self.session.guard(self.api.list(next)).await?;
        Ok(RefreshOutcome::Completed(self.store_page(page, false)))
    }

    fn store_page(&self, page: Page<Notificacion>, replace: bool) -> usize {
        let next_page = page.next_request();
        let added = page.content.len();
        let mut inbox = self.lock();
        if replace {
            inbox.items = page.content;
        } else {
            let known: Vec<NotificationId> = inbox.items.iter().map(|n| n.id).collect();
            inbox
                .items
                .extend(page.content.into_iter().filter(|n| !known.contains(&n.id)));
        }
        inbox.next_page = next_page;
        debug!(added, total = inbox.items.len(), "notification inbox updated");
        added
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    pub async fn mark_read(&self, id: NotificationId) -> Result<()> {
        self.session.require_auth()?;
        self.session.guard(self.api.mark_read(id)).await?;

        let was_unread = {
            let mut inbox = self.lock();
            match inbox.items.iter_mut().find(|n| n.id == id) {
                Some(n) if !n.leida => {
                    n.leida = true;
                    true
                }
                _ => false,
            }
        };
        if was_unread {
            self.unread.send_modify(|count| *count = count.saturating_sub(1));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.session.require_auth()?;
        self.session.guard(self.api.mark_all_read()).await?;

        for n in self.lock().items.iter_mut() {
            n.leida = true;
        }
        self.set_unread(0);
        Ok(())
    }

    pub async fn register_push_token(&self, token: &str, platform: DevicePlatform) -> Result<()> {
        self.session.require_auth()?;
        self.session
            .guard(self.api.register_device_token(token, platform)).await?;
        info!(?platform, "push token registered");
        Ok(())
    }

    /// Forget everything, used after logout
    pub fn clear(&self) {
        *self.lock() = Inbox::default();
        self.set_unread(0);
    }

    fn set_unread(&self, count: u32) {
        self.unread.send_if_modified(|current| {
            let changed = *current != count;
            *current = count;
            changed
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inbox> {
        self.inbox.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use charrua_core::{ClientConfig, HttpMethod};
    use charrua_harness::{fixtures, MockTransport, Reply};
    use serde_json::json;
    use std::time::Duration;

    const COUNT: &str = "/notificaciones/no-leidas/count";
    const LIST: &str = "/notificaciones";

    async fn center(transport: Arc<MockTransport>) -> NotificationCenter {
        let client = ApiClient::new(transport.clone(), ClientConfig::testing().api);
        transport.always(HttpMethod::Post, "/auth/login", Reply::ok(fixtures::session_json()));
        let session = Arc::new(SessionManager::new(client.clone()));
        session.login("ana@example.com", "secreto").await.unwrap();
        NotificationCenter::new(NotificationApiService::new(client), session, 2)
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_unread_refresh_is_dropped() {
        let transport = Arc::new(MockTransport::new());
        transport
            .always(HttpMethod::Get, COUNT, Reply::ok(json!({ "count": 4 })))
            .delay(HttpMethod::Get, COUNT, Duration::from_secs(1));
        let center = center(transport.clone()).await;

        let (first, second) = tokio::join!(center.refresh_unread_count(), center.refresh_unread_count());

        assert_eq!(first.unwrap(), RefreshOutcome::Completed(4));
        assert_eq!(second.unwrap(), RefreshOutcome::Skipped);
        assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 1);
        assert_eq!(center.unread_count(), 4);

        // guard released after completion
        assert_eq!(
            center.refresh_unread_count().await.unwrap(),
            RefreshOutcome::Completed(4)
        );
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.enqueue(HttpMethod::Get, COUNT, Reply::status(503));
        transport.always(HttpMethod::Get, COUNT, Reply::ok(json!({ "count": 1 })));
        let center = center(transport).await;

        assert!(center.refresh_unread_count().await.is_err());
        assert_eq!(
            center.refresh_unread_count().await.unwrap(),
            RefreshOutcome::Completed(1)
        );
    }

    #[tokio::test]
    async fn test_paging_and_mark_read() {
        let transport = Arc::new(MockTransport::new());
        transport.enqueue(
            HttpMethod::Get,
            LIST,
            Reply::ok(fixtures::page_json(
                vec![fixtures::notificacion_json(1, false), fixtures::notificacion_json(2, true)],
                0,
                2,
                3,
            )),
        );
        transport.enqueue(
            HttpMethod::Get,
            LIST,
            Reply::ok(fixtures::page_json(vec![fixtures::notificacion_json(3, false)], 1, 2, 3)),
        );
        transport.always(HttpMethod::Get, COUNT, Reply::ok(json!({ "count": 2 })));
        transport.always(HttpMethod::Put, "/notificaciones/1/leida", Reply::no_content());
        let center = center(transport.clone()).await;

        center.refresh_unread_count().await.unwrap();
        assert_eq!(center.refresh_notifications().await.unwrap(), RefreshOutcome::Completed(2));
        assert!(center.has_more());
        assert_eq!(center.load_more().await.unwrap(), RefreshOutcome::Completed(1));
        assert!(!center.has_more());
        assert_eq!(center.load_more().await.unwrap(), RefreshOutcome::Completed(0));
        assert_eq!(center.notifications().len(), 3);

        let second_page = transport.requests_to(HttpMethod::Get, LIST)[1].clone();
        assert_eq!(second_page.query_value("page"), Some("1"));

        center.mark_read(NotificationId::new(1)).await.unwrap();
        assert_eq!(center.unread_count(), 1);
        assert!(center.notifications()[0].leida);
    }

    #[tokio::test]
    async fn test_mark_all_read_zeroes_counter() {
        let transport = Arc::new(MockTransport::new());
        transport.always(HttpMethod::Get, COUNT, Reply::ok(json!({ "count": 5 })));
        transport.always(HttpMethod::Put, "/notificaciones/leidas", Reply::no_content());
        let center = center(transport).await;
        let mut unread = center.subscribe_unread();

        center.refresh_unread_count().await.unwrap();
        assert!(unread.has_changed().unwrap());
        assert_eq!(*unread.borrow_and_update(), 5);

        center.mark_all_read().await.unwrap();
        assert_eq!(*unread.borrow_and_update(), 0);
    }
}
