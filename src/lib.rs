//! # nui-events - host messages for embedded web views
//!
//! A host application shell pushes messages into the web view it embeds. Each
//! message names the logical application it belongs to and a method, and
//! carries an arbitrary `data` payload. This crate lets UI components subscribe
//! to one `(app, method)` pair and receive those payloads without wiring
//! listeners by hand.
//!
//! ## Core Concepts
//!
//! - **EventName**: the channel identifier resolved from `(app, method)`
//! - **DispatchTarget**: the shared bus listeners attach to, normally [`window()`]
//! - **Subscription**: one listener registration, removed on drop
//! - **NuiEvent**: the hook; keeps the latest handler and one subscription per key
//! - **HostBridge**: turns host envelopes into dispatched messages
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use nui_events::{DelimitedResolver, EventTarget, HostBridge, NuiEvent};
//!
//! let target = Arc::new(EventTarget::new());
//! let resolver = Arc::new(DelimitedResolver::default());
//! let bridge = HostBridge::new(target.clone(), resolver.clone());
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let mut hook: NuiEvent<u32> = NuiEvent::new(target.clone(), resolver);
//! hook.render("inventory", "update", move |qty| sink.lock().unwrap().push(qty));
//!
//! bridge.deliver_raw(r#"{"app":"inventory","method":"update","data":3}"#)?;
//! assert_eq!(*seen.lock().unwrap(), vec![3]);
//! # Ok::<(), nui_events::NuiError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod config;
pub mod error;
pub mod hook;
pub mod host;
pub mod subscription;
pub mod target;

// Re-export primary types at crate root for convenience
pub use channel::{event_name_factory, ChannelResolver, DelimitedResolver, DigestResolver, EventName};
pub use config::BridgeConfig;
pub use error::{EnvelopeError, InboxError, NuiError, NuiResult};
pub use hook::{Handler, HandlerSlot, NuiEvent};
pub use host::{HostBridge, HostEnvelope, HostInbox, HostSender, PumpReport};
pub use subscription::{subscribe, Subscription};
pub use target::{window, DispatchTarget, EventTarget, Listener, ListenerId, NuiMessage, TargetStats};
