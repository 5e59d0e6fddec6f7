// ── Visitor pass record ──
//
// A time-and-usage-limited access pass. The record itself is plain
// data; `deactivate`/`reactivate` only flip in-memory state, and the
// registry is responsible for persisting the result.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use uuid::Uuid;

use crate::config::DEFAULT_QUERYSTRING_KEY;
use crate::error::{CoreError, DenialReason};

/// Use ceiling applied to passes issued without an explicit limit.
pub const DEFAULT_MAX_USES: u32 = 10;

const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// Lifetime granted to a fresh pass: 24 hours.
pub fn default_token_expiry() -> Duration {
    Duration::seconds(DEFAULT_TOKEN_EXPIRY_SECS)
}

/// A visitor pass: grants time-and-usage-limited access to a single
/// named feature (`scope`) of the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// Unique identifier, embedded in outbound URLs as the `vuid` parameter.
    pub uuid: Uuid,
    pub email: String,
    /// Feature this pass grants access to.
    pub scope: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Absolute expiry. `None` means the pass never time-expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// How many times the pass has been presented.
    pub current_uses: u32,
    /// How many times the pass may be presented.
    pub max_uses: u32,
}

impl Visitor {
    /// Create an active pass with a fresh uuid and default expiry.
    pub fn new(email: impl Into<String>, scope: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            email: email.into(),
            scope: scope.into(),
            is_active: true,
            created_at,
            expires_at: Some(created_at + default_token_expiry()),
            current_uses: 0,
            max_uses: DEFAULT_MAX_USES,
        }
    }

    // ── Derived state ────────────────────────────────────────────────

    /// Whether the pass is spent.
    ///
    /// A pass with no expiry never time-expires. A pass whose expiry is
    /// in the future is still expired once its uses are exhausted.
    pub fn has_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) if expires_at < Utc::now() => true,
            Some(_) => self.current_uses >= self.max_uses,
        }
    }

    /// Active and not expired.
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.has_expired()
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Check that the pass may be presented right now.
    ///
    /// No side effects. Denials are reported in precedence order:
    /// inactive, then time-expired, then uses exhausted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.is_active {
            return Err(CoreError::denied(DenialReason::Inactive));
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at < Utc::now() {
                return Err(CoreError::denied(DenialReason::Expired));
            }
        }
        if self.current_uses >= self.max_uses {
            return Err(CoreError::denied(DenialReason::UsesExhausted));
        }
        Ok(())
    }

    /// Whether the pass grants access to `scope`.
    pub fn covers_scope(&self, scope: &str) -> bool {
        self.scope == scope
    }

    // ── State transitions (in-memory only) ───────────────────────────

    /// Flip the pass inactive. The registry persists the change.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Flip the pass active and push its expiry `valid_for` into the
    /// future. The registry persists the change.
    pub fn reactivate(&mut self, valid_for: Duration) {
        self.is_active = true;
        self.expires_at = Some(Utc::now() + valid_for);
    }

    // ── URL tokenising ───────────────────────────────────────────────

    /// Append (or replace) the default `vuid` query parameter on `url`.
    ///
    /// Idempotent: the output always carries exactly one visitor-id
    /// parameter, regardless of what the input query string held.
    pub fn tokenise(&self, url: &str) -> String {
        self.tokenise_with_key(url, DEFAULT_QUERYSTRING_KEY)
    }

    /// `tokenise` with a configurable parameter name.
    ///
    /// Works on bare and relative URLs — the query string is rewritten
    /// without parsing the rest of the URL at all.
    pub fn tokenise_with_key(&self, url: &str, key: &str) -> String {
        let (base, query) = match url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (url, None),
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(query) = query {
            for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                if name != key {
                    serializer.append_pair(&name, &value);
                }
            }
        }
        serializer.append_pair(key, &self.uuid.to_string());

        format!("{base}?{}", serializer.finish())
    }

    // ── Session payload ──────────────────────────────────────────────

    /// The value stashed in a framework session to remember this pass.
    pub fn session_data(&self) -> String {
        self.uuid.to_string()
    }
}
