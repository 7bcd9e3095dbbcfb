//! The subscription hook.
//!
//! [`NuiEvent`] binds a UI component to one `(app, method)` pair. Each render
//! hands it the component's current handler; the hook swaps the handler in
//! place and only touches the dispatch target when the pair itself changes.
//!
//! ```text
//!  render(app, method, h) ──► HandlerSlot ◄── read at delivery ── listener
//!            │                                                      ▲
//!            └── key changed? ── release old ──► attach new ────────┘
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;

use crate::channel::{ChannelResolver, DelimitedResolver, EventName};
use crate::subscription::{decode_payload, Subscription};
use crate::target::{window, DispatchTarget, Listener, NuiMessage};

/// Handler invoked with a decoded payload.
pub type Handler<D> = Arc<dyn Fn(D) + Send + Sync>;

/// Single-slot cell holding the most recent handler.
///
/// The listener reads the slot on every delivery, so a handler swapped between
/// two messages is observed by the second one.
pub struct HandlerSlot<D> {
    current: RwLock<Option<Handler<D>>>,
}

impl<D> HandlerSlot<D> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Replaces the held handler.
    pub fn set(&self, handler: Handler<D>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Empties the slot.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// True when a handler is held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// The held handler, if any.
    #[must_use]
    pub fn current(&self) -> Option<Handler<D>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Calls the held handler with `payload`.
    ///
    /// The lock is released before the call. Returns false, dropping the
    /// payload, when the slot is empty.
    pub fn invoke(&self, payload: D) -> bool {
        match self.current() {
            Some(handler) => {
                handler(payload);
                true
            }
            None => false,
        }
    }
}

impl<D> Default for HandlerSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for HandlerSlot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlot").field("set", &self.is_set()).finish()
    }
}

#[derive(Debug)]
struct Active {
    app: String,
    method: String,
    subscription: Subscription,
}

/// Reactive binding of a component to host messages for `(app, method)`.
///
/// Each matching payload is decoded into `D` before the handler sees it; a
/// payload that does not fit `D` is dropped. Use `NuiEvent<serde_json::Value>`
/// to receive every payload as-is.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use nui_events::{DelimitedResolver, EventTarget, NuiEvent};
///
/// let target = Arc::new(EventTarget::new());
/// let mut hook: NuiEvent<serde_json::Value> =
///     NuiEvent::new(target.clone(), Arc::new(DelimitedResolver::default()));
///
/// hook.render("phone", "setVisibility", |data| println!("visible: {data}"));
/// assert!(hook.is_subscribed());
///
/// hook.unmount();
/// assert_eq!(target.total_listeners(), 0);
/// ```
pub struct NuiEvent<D> {
    target: Arc<dyn DispatchTarget>,
    resolver: Arc<dyn ChannelResolver>,
    slot: Arc<HandlerSlot<D>>,
    active: Option<Active>,
}

impl<D> NuiEvent<D>
where
    D: DeserializeOwned + 'static,
{
    /// Creates an unsubscribed hook bound to `target`.
    #[must_use]
    pub fn new(target: Arc<dyn DispatchTarget>, resolver: Arc<dyn ChannelResolver>) -> Self {
        Self {
            target,
            resolver,
            slot: Arc::new(HandlerSlot::new()),
            active: None,
        }
    }

    /// Creates an unsubscribed hook on the process [`window()`] with `app:method` names.
    #[must_use]
    pub fn on_window() -> Self {
        Self::new(window(), Arc::new(DelimitedResolver::default()))
    }

    /// Runs one render of the owning component.
    ///
    /// The handler is swapped in first. The subscription is re-established only
    /// when `app` or `method` differ from the previous render, and the old
    /// listener is removed before the new one is attached.
    pub fn render<F>(&mut self, app: &str, method: &str, handler: F)
    where
        F: Fn(D) + Send + Sync + 'static,
    {
        self.set_handler(handler);
        self.ensure_subscribed(app, method);
    }

    /// Points the slot at `handler` without touching the subscription.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(D) + Send + Sync + 'static,
    {
        self.slot.set(Arc::new(handler));
    }

    /// Empties the slot; matching messages are dropped until a handler is set.
    pub fn clear_handler(&self) {
        self.slot.clear();
    }

    /// Removes the listener, if any. The handler slot is left as is.
    pub fn unmount(&mut self) {
        // Dropping the subscription detaches it.
        self.active = None;
    }

    /// The event name currently subscribed to.
    #[must_use]
    pub fn event_name(&self) -> Option<&EventName> {
        self.active.as_ref().map(|a| a.subscription.event_name())
    }

    /// True while a listener is attached.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.active.is_some()
    }

    /// True while a handler is held.
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.slot.is_set()
    }

    fn ensure_subscribed(&mut self, app: &str, method: &str) {
        if let Some(active) = &self.active {
            if active.app == app && active.method == method {
                return;
            }
        }

        self.active = None;

        let name = self.resolver.resolve(app, method);
        let slot = Arc::clone(&self.slot);
        // An empty slot drops the message before `data` is decoded.
        let listener: Listener = Arc::new(move |message: &NuiMessage| {
            let Some(handler) = slot.current() else {
                return;
            };
            if let Some(payload) = decode_payload::<D>(message) {
                handler(payload);
            }
        });
        self.active = Some(Active {
            app: app.to_string(),
            method: method.to_string(),
            subscription: Subscription::attach(Arc::clone(&self.target), name, listener),
        });
    }
}

impl<D> fmt::Debug for NuiEvent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NuiEvent")
            .field("active", &self.active)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
