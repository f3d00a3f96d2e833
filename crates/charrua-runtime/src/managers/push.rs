//! Push notification callback
//!
//! The platform's push handler calls [`PushDispatcher::notify`]; the
//! notification poller receives the message and refreshes the inbox.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Push message as delivered by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushNotification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Cloneable sender registered as the push callback
#[derive(Debug, Clone)]
pub struct PushDispatcher {
    sender: mpsc::Sender<PushNotification>,
}

impl PushDispatcher {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<PushNotification>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }

    /// Deliver a push; returns false when nobody is listening or the buffer
    /// is full
    pub fn notify(&self, push: PushNotification) -> bool {
        match self.sender.try_send(push) {
            Ok(()) => {
                debug!("push notification dispatched");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("push notification dropped, refresh already pending");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("push notification ignored, poller not running");
                false
            }
        }
    }
}
