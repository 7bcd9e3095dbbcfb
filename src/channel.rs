//! Event name resolution.
//!
//! Every subscription is keyed by an [`EventName`] computed from an application
//! name and a method name. Resolution is pure: the same pair always resolves to
//! the same name, and no resolver in this module maps two distinct pairs to one
//! name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default separator placed between the app and method parts.
pub const DEFAULT_SEPARATOR: char = ':';

/// Channel identifier for one `(app, method)` pair.
///
/// # Examples
///
/// ```
/// use nui_events::event_name_factory;
///
/// let name = event_name_factory("inventory", "update");
/// assert_eq!(name.as_str(), "inventory:update");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    /// Wraps an already-resolved name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        name.0
    }
}

/// Maps an `(app, method)` pair to an [`EventName`].
///
/// Implementations must be deterministic and must not panic.
pub trait ChannelResolver: Send + Sync {
    /// Resolves the event name for `app` and `method`.
    fn resolve(&self, app: &str, method: &str) -> EventName;
}

/// Human-readable `app:method` names.
///
/// The separator and `\` are backslash-escaped inside each part, so
/// `("a:b", "c")` and `("a", "b:c")` resolve to different names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedResolver {
    separator: char,
}

impl DelimitedResolver {
    /// Creates a resolver joining parts with `separator`.
    #[must_use]
    pub const fn new(separator: char) -> Self {
        Self { separator }
    }

    /// The separator placed between app and method.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    fn push_escaped(&self, out: &mut String, part: &str) {
        for c in part.chars() {
            if c == self.separator || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
    }
}

impl Default for DelimitedResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl ChannelResolver for DelimitedResolver {
    fn resolve(&self, app: &str, method: &str) -> EventName {
        let mut out = String::with_capacity(app.len() + method.len() + 1);
        self.push_escaped(&mut out, app);
        out.push(self.separator);
        self.push_escaped(&mut out, method);
        EventName(out)
    }
}

/// Opaque fixed-width names derived from a blake3 digest.
///
/// Names look like `nui.<64 hex chars>`. Both parts are length-prefixed before
/// hashing so part boundaries cannot shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestResolver;

impl DigestResolver {
    /// Prefix of every digest name.
    pub const PREFIX: &'static str = "nui.";
}

impl ChannelResolver for DigestResolver {
    fn resolve(&self, app: &str, method: &str) -> EventName {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(app.len() as u64).to_le_bytes());
        hasher.update(app.as_bytes());
        hasher.update(&(method.len() as u64).to_le_bytes());
        hasher.update(method.as_bytes());
        let digest = hasher.finalize();
        EventName(format!("{}{}", Self::PREFIX, digest.to_hex()))
    }
}

/// Resolves `(app, method)` with the default [`DelimitedResolver`].
#[must_use]
pub fn event_name_factory(app: &str, method: &str) -> EventName {
    DelimitedResolver::default().resolve(app, method)
}
