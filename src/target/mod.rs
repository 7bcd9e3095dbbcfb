//! Dispatch targets: the shared bus host messages are delivered on.
//!
//! A [`DispatchTarget`] keeps any number of listeners per [`EventName`] and
//! invokes the ones registered under a message's name when it is dispatched.
//! Hooks never own a target; they attach to one that outlives them, normally
//! the process-wide [`window()`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::channel::EventName;

/// In-process target implementation.
pub mod event_target;

pub use event_target::{window, EventTarget, TargetStats};

/// Token returned by [`DispatchTarget::on`], used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message delivered on a target.
///
/// `data` has no enforced shape; listeners decode it as they see fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuiMessage {
    /// Event name the message is routed by.
    pub name: EventName,
    /// Payload pushed by the host.
    #[serde(default)]
    pub data: Value,
}

impl NuiMessage {
    /// Creates a message for `name` carrying `data`.
    #[must_use]
    pub fn new(name: EventName, data: Value) -> Self {
        Self { name, data }
    }
}

/// Listener callback registered on a target.
pub type Listener = Arc<dyn Fn(&NuiMessage) + Send + Sync>;

/// Shared event bus keyed by event name.
///
/// Implementations must invoke listeners synchronously on the dispatching
/// thread, in registration order, and must never invoke a listener after
/// [`off`](Self::off) has returned for it.
pub trait DispatchTarget: Send + Sync {
    /// Registers `listener` under `name`.
    fn on(&self, name: &EventName, listener: Listener) -> ListenerId;

    /// Removes the listener registered under `name` with `id`.
    ///
    /// Returns false when no such listener exists.
    fn off(&self, name: &EventName, id: ListenerId) -> bool;

    /// Delivers `message` to every listener of `message.name`.
    ///
    /// Returns the number of listeners invoked.
    fn dispatch(&self, message: &NuiMessage) -> usize;

    /// Number of listeners currently registered under `name`.
    fn listener_count(&self, name: &EventName) -> usize;
}
