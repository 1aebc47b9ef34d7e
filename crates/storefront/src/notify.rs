//! Delayed, cancellable notifications.
//!
//! Stores never talk to a delivery channel directly. They hand a
//! [`Notification`] to the [`NotificationScheduler`], which waits the
//! configured delay on the tokio runtime and then calls the injected
//! [`Notifier`]. Delivery is fire-and-forget: no acknowledgement, no retry,
//! no ordering between notifications.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use campus_market_core::{NotificationKind, UserId};

/// Something the recipient should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Collapses repeated notifications about the same entity.
    pub tag: Option<String>,
}

/// Delivery channel for notifications (push, websocket, log, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) {
        info!(
            recipient = %notification.recipient,
            kind = ?notification.kind,
            tag = ?notification.tag,
            title = %notification.title,
            "{}",
            notification.body
        );
    }
}

/// Keeps every delivered notification in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far, oldest first.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications delivered to `recipient`.
    #[must_use]
    pub fn delivered_to(&self, recipient: &UserId) -> Vec<Notification> {
        self.delivered()
            .into_iter()
            .filter(|n| &n.recipient == recipient)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}

// =============================================================================
// NotificationScheduler
// =============================================================================

/// Handle to one scheduled notification.
#[derive(Debug, Clone)]
pub struct ScheduledNotification {
    token: CancellationToken,
}

impl ScheduledNotification {
    /// Stop the notification if it has not been delivered yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the notification was cancelled (individually or by shutdown).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Schedules one-shot delayed deliveries through a [`Notifier`].
pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl NotificationScheduler {
    /// Create a scheduler delivering through `notifier`.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Deliver `notification` after `delay` unless cancelled first.
    ///
    /// Must be called from within a tokio runtime; otherwise the
    /// notification is dropped with a warning.
    pub fn schedule(&self, notification: Notification, delay: Duration) -> ScheduledNotification {
        let token = self.shutdown.child_token();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                recipient = %notification.recipient,
                title = %notification.title,
                "No async runtime, dropping notification"
            );
            token.cancel();
            return ScheduledNotification { token };
        };

        let notifier = Arc::clone(&self.notifier);
        let cancelled = token.clone();
        self.tasks.spawn_on(
            async move {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => {
                        debug!(recipient = %notification.recipient, "Notification cancelled");
                    }
                    () = tokio::time::sleep(delay) => {
                        notifier.notify(&notification).await;
                    }
                }
            },
            &runtime,
        );

        ScheduledNotification { token }
    }

    /// Wait until every notification scheduled so far has been delivered or cancelled.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Cancel every pending notification. Later schedules are cancelled immediately.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Number of notifications still waiting for their delay.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl std::fmt::Debug for NotificationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationScheduler")
            .field("pending", &self.tasks.len())
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}
