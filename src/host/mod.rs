//! Host shell boundary.
//!
//! The host pushes JSON envelopes of the form
//! `{"app": "...", "method": "...", "data": ...}` into the web view. The
//! [`HostBridge`] turns each envelope into a [`NuiMessage`] named by the
//! resolver and dispatches it on the target, where hooks pick it up.
//!
//! Messages produced off the UI thread go through a [`HostInbox`] first, which
//! is drained on the control thread by [`HostInbox::pump`].

/// Bounded queue between host threads and the control thread.
pub mod inbox;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::channel::{ChannelResolver, DelimitedResolver};
use crate::error::{EnvelopeError, NuiResult};
use crate::target::{window, DispatchTarget, NuiMessage};

pub use inbox::{HostInbox, HostSender, PumpReport};

/// A message as sent by the host shell.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEnvelope {
    pub app: String,
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl HostEnvelope {
    /// Creates an envelope.
    #[must_use]
    pub fn new(app: impl Into<String>, method: impl Into<String>, data: Value) -> Self {
        Self {
            app: app.into(),
            method: method.into(),
            data,
        }
    }

    /// Parses and validates a raw host message.
    pub fn from_json(raw: &str) -> NuiResult<Self> {
        let envelope: Self = serde_json::from_str(raw).map_err(|e| EnvelopeError::Malformed {
            message: e.to_string(),
        })?;
        envelope.validate()?;
        Ok(envelope)
    }

    /// Rejects envelopes with an empty `app` or `method`.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.app.is_empty() {
            return Err(EnvelopeError::EmptyField { field: "app" });
        }
        if self.method.is_empty() {
            return Err(EnvelopeError::EmptyField { field: "method" });
        }
        Ok(())
    }
}

/// Routes host envelopes onto a dispatch target.
#[derive(Clone)]
pub struct HostBridge {
    target: Arc<dyn DispatchTarget>,
    resolver: Arc<dyn ChannelResolver>,
}

impl HostBridge {
    /// Creates a bridge dispatching on `target`.
    #[must_use]
    pub fn new(target: Arc<dyn DispatchTarget>, resolver: Arc<dyn ChannelResolver>) -> Self {
        Self { target, resolver }
    }

    /// A bridge onto the process [`window()`] with `app:method` names.
    #[must_use]
    pub fn on_window() -> Self {
        Self::new(window(), Arc::new(DelimitedResolver::default()))
    }

    /// The target messages are dispatched on.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn DispatchTarget> {
        &self.target
    }

    /// Dispatches `envelope`; returns the number of listeners invoked.
    pub fn deliver(&self, envelope: HostEnvelope) -> usize {
        let name = self.resolver.resolve(&envelope.app, &envelope.method);
        trace!(event = %name, "delivering host message");
        self.target.dispatch(&NuiMessage::new(name, envelope.data))
    }

    /// Parses, validates and dispatches a raw host message.
    pub fn deliver_raw(&self, raw: &str) -> NuiResult<usize> {
        let envelope = HostEnvelope::from_json(raw)?;
        Ok(self.deliver(envelope))
    }

    /// Dispatches a synthetic message as though the host had sent it.
    ///
    /// Lets UI code run in a plain browser without a host shell.
    pub fn emulate<T: Serialize>(&self, app: &str, method: &str, data: &T) -> NuiResult<usize> {
        let data = serde_json::to_value(data).map_err(|e| EnvelopeError::Malformed {
            message: e.to_string(),
        })?;
        let envelope = HostEnvelope::new(app, method, data);
        envelope.validate()?;
        Ok(self.deliver(envelope))
    }
}

impl fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBridge").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::channel::EventName;
    use crate::target::EventTarget;

    fn bridge() -> (Arc<EventTarget>, HostBridge) {
        let target = Arc::new(EventTarget::new());
        let bridge = HostBridge::new(target.clone(), Arc::new(DelimitedResolver::default()));
        (target, bridge)
    }

    fn capture(target: &EventTarget, name: &str) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        target.on(
            &EventName::new(name),
            Arc::new(move |msg: &NuiMessage| sink.lock().unwrap().push(msg.data.clone())),
        );
        seen
    }

    #[test]
    fn test_envelope_missing_data_is_null() {
        let env = HostEnvelope::from_json(r#"{"app":"phone","method":"setVisibility"}"#).unwrap();
        assert_eq!(env.data, Value::Null);
    }

    #[test]
    fn test_envelope_rejects_malformed() {
        let err = HostEnvelope::from_json("not json").unwrap_err();
        assert!(err.is_envelope());

        let err = HostEnvelope::from_json(r#"{"app":"phone"}"#).unwrap_err();
        assert!(err.is_envelope());
    }

    #[test]
    fn test_envelope_rejects_empty_fields() {
        let err = HostEnvelope::from_json(r#"{"app":"","method":"x"}"#).unwrap_err();
        assert!(format!("{err}").contains("'app'"));

        let err = HostEnvelope::from_json(r#"{"app":"x","method":""}"#).unwrap_err();
        assert!(format!("{err}").contains("'method'"));
    }

    #[test]
    fn test_deliver_raw_routes_by_name() {
        let (target, bridge) = bridge();
        let seen = capture(&target, "inventory:update");

        let invoked = bridge
            .deliver_raw(r#"{"app":"inventory","method":"update","data":{"item":"apple","qty":3}}"#)
            .unwrap();
        assert_eq!(invoked, 1);
        assert_eq!(*seen.lock().unwrap(), vec![json!({"item": "apple", "qty": 3})]);

        assert_eq!(bridge.deliver_raw(r#"{"app":"inventory","method":"delete"}"#).unwrap(), 0);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_emulate_serializes_data() {
        let (target, bridge) = bridge();
        let seen = capture(&target, "phone:setVisibility");

        bridge.emulate("phone", "setVisibility", &true).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!(true)]);

        assert!(bridge.emulate("", "setVisibility", &true).is_err());
    }
}
