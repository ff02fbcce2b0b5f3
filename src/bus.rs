//! In-process notification bus
//!
//! Decouples the command handlers (publishers) from live streams
//! (subscribers). Delivery is synchronous, best-effort and at-most-once:
//! nothing is queued, so a publish with no subscribers is simply lost.
//!
//! There is one bus per process, reachable through [`NotificationBus::global`].
//! Two separate instances would split publishers from subscribers, so the
//! server always wires the global one; tests build isolated buses with
//! [`NotificationBus::new`].

use crate::types::ChangeNotification;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

/// Subscriber callback
pub type Listener = Arc<dyn Fn(&ChangeNotification) + Send + Sync>;

/// Process-local publish/subscribe broadcaster
///
/// Cloning is cheap and yields a handle to the same subscriber set.
#[derive(Clone, Default)]
pub struct NotificationBus {
    inner: Arc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,

    /// Registered callbacks keyed by a monotonically increasing id,
    /// so iteration follows registration order
    listeners: RwLock<BTreeMap<u64, Entry>>,
}

#[derive(Clone)]
struct Entry {
    listener: Listener,

    /// Shared with the [`Subscription`]; cleared before removal so a
    /// round that snapshotted this entry skips it once unsubscribed
    active: Arc<AtomicBool>,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }
}

impl NotificationBus {
    /// Create an isolated bus
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared bus for this process, created on first use
    pub fn global() -> &'static NotificationBus {
        static BUS: OnceLock<NotificationBus> = OnceLock::new();
        BUS.get_or_init(NotificationBus::new)
    }

    /// Register a callback for every future [`publish`](Self::publish)
    ///
    /// The callback stays registered until the returned handle is
    /// unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Entry {
                    listener: Arc::new(callback),
                    active: Arc::clone(&active),
                },
            );

        tracing::debug!(subscriber = id, "Bus subscriber added");

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
            active,
        }
    }

    /// Deliver a notification to every registered callback
    ///
    /// The subscriber set is snapshotted before any callback runs, so
    /// callbacks may subscribe or unsubscribe without affecting this
    /// delivery round, except that an entry unsubscribed mid-round is
    /// skipped. A panicking callback is logged and skipped.
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, notification: &ChangeNotification) -> usize {
        let snapshot: Vec<(u64, Entry)> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect();

        let mut delivered = 0;
        for (id, entry) in &snapshot {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            delivered += 1;
            let listener = &entry.listener;
            if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(|| listener(notification))) {
                tracing::warn!(
                    subscriber = id,
                    cause = %panic_message(cause.as_ref()),
                    "Bus subscriber panicked, continuing delivery"
                );
            }
        }

        tracing::debug!(
            op = ?notification.op,
            id = ?notification.id,
            delivered,
            "Notification published"
        );

        delivered
    }

    /// Number of currently registered callbacks
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = cause.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Handle to a registered bus callback
///
/// Unsubscribing is idempotent and also happens on drop, so every
/// subscription is released exactly once whichever path gets there first.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Remove the callback from the bus; later calls are no-ops
    ///
    /// Once this returns, no new delivery round reaches the callback. A round
    /// already running on another thread that passed the active check may
    /// still invoke it once.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove(self.id) {
                tracing::debug!(subscriber = self.id, "Bus subscriber removed");
            }
        }
    }

    /// Whether the callback is still registered through this handle
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
