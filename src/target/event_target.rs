use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::channel::EventName;

use super::{DispatchTarget, Listener, ListenerId, NuiMessage};

static WINDOW: OnceLock<Arc<EventTarget>> = OnceLock::new();

/// The process-wide target host messages are dispatched on.
///
/// Every call returns the same instance.
#[must_use]
pub fn window() -> Arc<EventTarget> {
    Arc::clone(WINDOW.get_or_init(|| Arc::new(EventTarget::new())))
}

struct Registration {
    id: ListenerId,
    active: AtomicBool,
    listener: Listener,
}

/// Counters describing a target's lifetime activity.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub attached: u64,
    pub detached: u64,
    pub dispatched: u64,
    pub unrouted: u64,
}

/// In-process [`DispatchTarget`].
///
/// Dispatch snapshots the listeners of one name and releases the registry lock
/// before invoking them, so listeners may attach or detach listeners
/// (themselves included) while running. Listeners attached during a dispatch
/// first see the next message; listeners detached during a dispatch are
/// skipped for the rest of it.
///
/// A panic raised by a listener propagates out of [`dispatch`](DispatchTarget::dispatch).
#[derive(Default)]
pub struct EventTarget {
    listeners: RwLock<HashMap<EventName, Vec<Arc<Registration>>>>,
    attached: AtomicU64,
    detached: AtomicU64,
    dispatched: AtomicU64,
    unrouted: AtomicU64,
}

impl EventTarget {
    /// Creates an empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lifetime counters.
    #[must_use]
    pub fn stats(&self) -> TargetStats {
        TargetStats {
            attached: self.attached.load(Ordering::Relaxed),
            detached: self.detached.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
        }
    }

    /// Total listeners across all names.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(Vec::len).sum()
    }

    /// Names with at least one listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<EventName> {
        let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<EventName> = guard.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.total_listeners())
            .field("stats", &self.stats())
            .finish()
    }
}

impl DispatchTarget for EventTarget {
    fn on(&self, name: &EventName, listener: Listener) -> ListenerId {
        let id = ListenerId::new();
        let registration = Arc::new(Registration {
            id,
            active: AtomicBool::new(true),
            listener,
        });

        let mut guard = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(name.clone()).or_default().push(registration);
        drop(guard);

        self.attached.fetch_add(1, Ordering::Relaxed);
        debug!(event = %name, listener = %id, "listener attached");
        id
    }

    fn off(&self, name: &EventName, id: ListenerId) -> bool {
        let mut guard = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(regs) = guard.get_mut(name) else {
            return false;
        };
        let Some(pos) = regs.iter().position(|r| r.id == id) else {
            return false;
        };

        let removed = regs.remove(pos);
        removed.active.store(false, Ordering::Release);
        if regs.is_empty() {
            guard.remove(name);
        }
        drop(guard);

        self.detached.fetch_add(1, Ordering::Relaxed);
        debug!(event = %name, listener = %id, "listener detached");
        true
    }

    fn dispatch(&self, message: &NuiMessage) -> usize {
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        let snapshot: Vec<Arc<Registration>> = {
            let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            guard.get(&message.name).cloned().unwrap_or_default()
        };

        if snapshot.is_empty() {
            self.unrouted.fetch_add(1, Ordering::Relaxed);
            trace!(event = %message.name, "no listeners for event");
            return 0;
        }

        let mut invoked = 0;
        for reg in &snapshot {
            if reg.active.load(Ordering::Acquire) {
                (reg.listener)(message);
                invoked += 1;
            }
        }

        trace!(event = %message.name, invoked, "event dispatched");
        invoked
    }

    fn listener_count(&self, name: &EventName) -> usize {
        let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(name).map_or(0, Vec::len)
    }
}
