//! Process-wide queue of transient user-facing messages.
//!
//! Every notification is removed automatically after a fixed time to live,
//! or earlier via [`NotificationCenter::dismiss`]. Whichever removal comes
//! second is a no-op.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

/// Shared handle to the notification queue. Clones see the same queue.
///
/// [`notify`](Self::notify) schedules the expiry on the current tokio
/// runtime, so it must be called from within one.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    queue: watch::Sender<Vec<Notification>>,
    ttl: Duration,
}

impl NotificationCenter {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (queue, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner { queue, ttl }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Append a notification and schedule its removal. Returns its id.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        };
        let id = notification.id;
        debug!(%id, %severity, message = %notification.message, "notification posted");

        self.inner.queue.send_modify(|queue| queue.push(notification));

        let center = self.clone();
        let ttl = self.inner.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            center.dismiss(id);
        });

        id
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, Severity::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.notify(message, Severity::Info)
    }

    /// Remove a notification now. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        self.inner.queue.send_if_modified(|queue| {
            let before = queue.len();
            queue.retain(|n| n.id != id);
            queue.len() != before
        })
    }

    /// Current notifications, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.queue.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.queue.subscribe()
    }

    /// Remove and return everything currently queued. Pending expiries for
    /// drained entries become no-ops.
    pub fn drain(&self) -> Vec<Notification> {
        let mut drained = Vec::new();
        self.inner.queue.send_if_modified(|queue| {
            drained = std::mem::take(queue);
            !drained.is_empty()
        });
        drained
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_ttl() {
        let center = NotificationCenter::new();
        let id = center.success("Meal added!");

        let queued = center.snapshot();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].id, id);
        assert_eq!(queued[0].severity, Severity::Success);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(center.snapshot().len(), 1, "still visible before the ttl");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(center.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_is_idempotent() {
        let center = NotificationCenter::new();
        let id = center.error("Failed to delete meal: gone");

        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));

        // The scheduled removal fires later and finds nothing.
        tokio::time::sleep(NotificationCenter::DEFAULT_TTL * 2).await;
        assert!(center.snapshot().is_empty());
        assert!(!center.dismiss(id));
    }

    #[tokio::test(start_paused = true)]
    async fn each_notification_is_added_and_removed_once() {
        let center = NotificationCenter::with_ttl(Duration::from_secs(1));
        let mut rx = center.subscribe();

        let a = center.info("one");
        tokio::time::sleep(Duration::from_millis(500)).await;
        let b = center.info("two");
        assert_ne!(a, b);

        let ids: Vec<_> = rx.borrow_and_update().iter().map(|n| n.id).collect();
        assert_eq!(ids, [a, b]);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let ids: Vec<_> = rx.borrow_and_update().iter().map(|n| n.id).collect();
        assert_eq!(ids, [b]);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_takes_everything() {
        let center = NotificationCenter::new();
        center.success("a");
        center.error("b");

        let drained = center.drain();
        let messages: Vec<_> = drained.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["a", "b"]);
        assert!(center.snapshot().is_empty());
        assert!(center.drain().is_empty());
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Info.to_string(), "info");
    }
}
