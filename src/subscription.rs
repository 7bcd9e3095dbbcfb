//! Scoped listener registrations.
//!
//! A [`Subscription`] owns exactly one listener on a dispatch target and removes
//! it when released or dropped, whichever comes first.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::channel::{ChannelResolver, EventName};
use crate::error::NuiError;
use crate::target::{DispatchTarget, Listener, ListenerId, NuiMessage};

/// A live listener registration.
///
/// Dropping the subscription removes the listener from its target.
#[must_use = "dropping a Subscription immediately removes its listener"]
pub struct Subscription {
    target: Arc<dyn DispatchTarget>,
    name: EventName,
    id: ListenerId,
    released: bool,
}

impl Subscription {
    /// Registers `listener` under `name` on `target`.
    pub fn attach(target: Arc<dyn DispatchTarget>, name: EventName, listener: Listener) -> Self {
        let id = target.on(&name, listener);
        Self {
            target,
            name,
            id,
            released: false,
        }
    }

    /// The event name this subscription listens on.
    #[must_use]
    pub fn event_name(&self) -> &EventName {
        &self.name
    }

    /// The listener id on the target.
    #[must_use]
    pub const fn listener_id(&self) -> ListenerId {
        self.id
    }

    /// True until [`release`](Self::release) has run.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.released
    }

    /// Removes the listener from its target.
    ///
    /// Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if !self.target.off(&self.name, self.id) {
            debug!(event = %self.name, listener = %self.id, "listener already gone at release");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Decodes a message's `data` into `D`.
///
/// Payloads that do not decode are logged and yield `None`.
pub(crate) fn decode_payload<D: DeserializeOwned>(message: &NuiMessage) -> Option<D> {
    match serde_json::from_value::<D>(message.data.clone()) {
        Ok(payload) => Some(payload),
        Err(err) => {
            let err = NuiError::payload(message.name.as_str(), &err);
            debug!(error = %err, "dropping undecodable payload");
            None
        }
    }
}

fn decoding_listener<D, F>(deliver: F) -> Listener
where
    D: DeserializeOwned,
    F: Fn(D) + Send + Sync + 'static,
{
    Arc::new(move |message: &NuiMessage| {
        if let Some(payload) = decode_payload::<D>(message) {
            deliver(payload);
        }
    })
}

/// Subscribes `handler` to `(app, method)` on `target`.
///
/// The handler is fixed for the life of the subscription; use
/// [`NuiEvent`](crate::NuiEvent) when the handler changes between renders.
pub fn subscribe<D, F>(
    target: Arc<dyn DispatchTarget>,
    resolver: &dyn ChannelResolver,
    app: &str,
    method: &str,
    handler: F,
) -> Subscription
where
    D: DeserializeOwned,
    F: Fn(D) + Send + Sync + 'static,
{
    let name = resolver.resolve(app, method);
    Subscription::attach(target, name, decoding_listener(handler))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::channel::DelimitedResolver;
    use crate::target::EventTarget;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        item: String,
        qty: u32,
    }

    #[test]
    fn test_subscribe_delivers_typed_payload() {
        let target = Arc::new(EventTarget::new());
        let got = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&got);

        let _sub = subscribe(
            target.clone(),
            &DelimitedResolver::default(),
            "inventory",
            "update",
            move |item: Item| sink.lock().unwrap().push(item),
        );

        target.dispatch(&NuiMessage::new(
            EventName::new("inventory:update"),
            json!({"item": "apple", "qty": 3}),
        ));

        assert_eq!(
            *got.lock().unwrap(),
            vec![Item {
                item: "apple".to_string(),
                qty: 3
            }]
        );
    }

    #[test]
    fn test_undecodable_payload_is_dropped() {
        let target = Arc::new(EventTarget::new());
        let got = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&got);

        let _sub = subscribe(
            target.clone(),
            &DelimitedResolver::default(),
            "inventory",
            "update",
            move |_: Item| *sink.lock().unwrap() += 1,
        );

        let invoked = target.dispatch(&NuiMessage::new(EventName::new("inventory:update"), json!("nope")));
        assert_eq!(invoked, 1);
        assert_eq!(*got.lock().unwrap(), 0);
    }

    #[test]
    fn test_drop_releases_listener() {
        let target = Arc::new(EventTarget::new());
        let name = EventName::new("a:b");
        {
            let sub = Subscription::attach(target.clone(), name.clone(), Arc::new(|_: &NuiMessage| {}));
            assert!(sub.is_active());
            assert_eq!(target.listener_count(&name), 1);
        }
        assert_eq!(target.listener_count(&name), 0);
        assert_eq!(target.stats().detached, 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let target = Arc::new(EventTarget::new());
        let mut sub = Subscription::attach(target.clone(), EventName::new("a:b"), Arc::new(|_: &NuiMessage| {}));
        sub.release();
        sub.release();
        drop(sub);
        assert_eq!(target.stats().detached, 1);
    }
}
