//! Bridge configuration.

use serde::Deserialize;

use crate::channel::{DelimitedResolver, DEFAULT_SEPARATOR};
use crate::error::{NuiError, NuiResult};

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Max raw host messages queued before `post` starts rejecting.
    pub inbox_capacity: usize,
    /// Max messages dispatched per `pump` call.
    pub max_pump_batch: usize,
    /// Separator used by the default event name resolver.
    pub separator: char,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 1024,
            max_pump_batch: 256,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl BridgeConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(raw: &str) -> NuiResult<Self> {
        serde_json::from_str(raw).map_err(|e| NuiError::Config {
            message: format!("invalid bridge config: {e}"),
        })
    }

    /// The resolver described by this config.
    #[must_use]
    pub const fn resolver(&self) -> DelimitedResolver {
        DelimitedResolver::new(self.separator)
    }
}
