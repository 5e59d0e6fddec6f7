// ── Runtime pass settings ──
//
// These types describe *how* passes behave at runtime: which query
// parameter carries the visitor id, which session key stashes it, how
// long a fresh pass lives. They never touch disk — gatepass-config
// builds a `PassSettings` from TOML/env and hands it in.

use chrono::Duration;

use crate::error::CoreError;

/// Query-string parameter carrying the visitor id in tokenised URLs.
pub const DEFAULT_QUERYSTRING_KEY: &str = "vuid";

/// Session key under which a resolved visitor id is stashed.
pub const DEFAULT_SESSION_KEY: &str = "visitor:session";

/// Runtime behaviour of the pass registry.
///
/// Built by the embedding application (or gatepass-config), passed to
/// [`PassRegistry`](crate::registry::PassRegistry) — core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct PassSettings {
    /// Query-string key used by `tokenise` and request resolution.
    pub querystring_key: String,
    /// Session key used by session resolution.
    pub session_key: String,
    /// Lifetime granted to newly issued (and reactivated) passes.
    pub token_expiry: Duration,
    /// Use ceiling for newly issued passes.
    pub default_max_uses: u32,
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            querystring_key: DEFAULT_QUERYSTRING_KEY.into(),
            session_key: DEFAULT_SESSION_KEY.into(),
            token_expiry: crate::model::visitor::default_token_expiry(),
            default_max_uses: crate::model::visitor::DEFAULT_MAX_USES,
        }
    }
}

impl PassSettings {
    /// Reject settings that would make every pass unusable.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.querystring_key.is_empty() {
            return Err(CoreError::Config {
                message: "querystring_key must not be empty".into(),
            });
        }
        if self.session_key.is_empty() {
            return Err(CoreError::Config {
                message: "session_key must not be empty".into(),
            });
        }
        if self.token_expiry <= Duration::zero() {
            return Err(CoreError::Config {
                message: "token_expiry must be positive".into(),
            });
        }
        if self.default_max_uses == 0 {
            return Err(CoreError::Config {
                message: "default_max_uses must be at least 1".into(),
            });
        }
        Ok(())
    }
}
