// ── Request and session resolution ──
//
// Framework-agnostic port of the visitor middleware: one pass over the
// request URL to admit tokenised links, one pass over the session to
// keep an admitted visitor across untokenised follow-up requests.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use url::form_urlencoded;
use uuid::Uuid;

use crate::model::Visitor;
use crate::registry::PassRegistry;

// ── VisitorContext ───────────────────────────────────────────────────

/// What request resolution attaches to a request: the admitted visitor,
/// if any.
#[derive(Debug, Clone, Default)]
pub struct VisitorContext {
    pub visitor: Option<Arc<Visitor>>,
}

impl VisitorContext {
    /// Context for a request with no (valid) visitor token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_visitor(visitor: Arc<Visitor>) -> Self {
        Self {
            visitor: Some(visitor),
        }
    }

    /// Whether the request is being made by a visitor.
    pub fn is_visitor(&self) -> bool {
        self.visitor.is_some()
    }
}

// ── SessionState ─────────────────────────────────────────────────────

/// String-keyed stand-in for the embedding framework's session store.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    values: HashMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ── Resolution ───────────────────────────────────────────────────────

impl PassRegistry {
    /// Resolve a request URL into a visitor context.
    ///
    /// A request is admitted only when the URL carries the configured
    /// visitor-id parameter, the uuid is known, and the pass validates.
    /// Admission counts as a use and is persisted; anything else yields
    /// an anonymous context.
    pub fn resolve_request(&self, url: &str) -> VisitorContext {
        let Some(uuid) = visitor_id_from_url(url, &self.settings().querystring_key) else {
            return VisitorContext::anonymous();
        };
        match self.redeem(&uuid) {
            Ok(visitor) => VisitorContext::with_visitor(visitor),
            Err(err) => {
                debug!(%uuid, %err, "rejected visitor token");
                VisitorContext::anonymous()
            }
        }
    }

    /// Keep the visitor context and session in step.
    ///
    /// An admitted visitor is stashed in the session under the
    /// configured key. An anonymous context is re-populated from the
    /// session when it holds a known uuid; a stale or garbage session
    /// value is dropped.
    pub fn sync_session(
        &self,
        context: &VisitorContext,
        session: &mut SessionState,
    ) -> VisitorContext {
        let session_key = &self.settings().session_key;

        if let Some(visitor) = &context.visitor {
            session.insert(session_key.clone(), visitor.session_data());
            return context.clone();
        }

        let Some(raw) = session.get(session_key) else {
            return VisitorContext::anonymous();
        };
        let visitor = Uuid::parse_str(raw).ok().and_then(|uuid| self.get(&uuid));
        match visitor {
            Some(visitor) => VisitorContext::with_visitor(visitor),
            None => {
                debug!("dropping stale visitor session entry");
                session.remove(session_key);
                VisitorContext::anonymous()
            }
        }
    }
}

/// Extract the visitor uuid from a URL's query string, if present.
fn visitor_id_from_url(url: &str, key: &str) -> Option<Uuid> {
    let (_, query) = url.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .and_then(|(_, value)| Uuid::parse_str(&value).ok())
}
