// ── Pass registry ──
//
// The main entry point for consumers. Owns every operation that
// persists: issuing, deactivating, reactivating, and redeeming passes
// all write through to the store immediately.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PassSettings;
use crate::error::{CoreError, DenialReason};
use crate::model::Visitor;
use crate::store::{MemoryStore, VisitorStore};

/// Parameters for issuing a new pass.
///
/// `max_uses` and `expires_in` fall back to the registry settings when
/// unset.
#[derive(Debug, Clone)]
pub struct NewPass {
    pub email: String,
    pub scope: String,
    pub max_uses: Option<u32>,
    pub expires_in: Option<chrono::Duration>,
}

impl NewPass {
    pub fn new(email: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            scope: scope.into(),
            max_uses: None,
            expires_in: None,
        }
    }

    pub fn max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    pub fn expires_in(mut self, expires_in: chrono::Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

/// Issues, validates, and retires visitor passes.
///
/// Cheaply cloneable; clones share the same store.
#[derive(Clone)]
pub struct PassRegistry {
    store: Arc<dyn VisitorStore>,
    settings: PassSettings,
}

impl PassRegistry {
    /// Registry backed by the bundled in-memory store.
    pub fn new(settings: PassSettings) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), settings)
    }

    /// Registry backed by a caller-supplied store.
    pub fn with_store(store: Arc<dyn VisitorStore>, settings: PassSettings) -> Self {
        Self { store, settings }
    }

    /// Access the registry settings.
    pub fn settings(&self) -> &PassSettings {
        &self.settings
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn VisitorStore> {
        &self.store
    }

    // ── Issuing ──────────────────────────────────────────────────────

    /// Create a pass with registry defaults and persist it.
    pub fn issue(&self, new_pass: NewPass) -> Arc<Visitor> {
        let mut visitor = Visitor::new(new_pass.email, new_pass.scope);
        visitor.max_uses = new_pass.max_uses.unwrap_or(self.settings.default_max_uses);
        let expires_in = new_pass.expires_in.unwrap_or(self.settings.token_expiry);
        visitor.expires_at = Some(visitor.created_at + expires_in);

        info!(uuid = %visitor.uuid, scope = %visitor.scope, "issued visitor pass");
        self.store.put(visitor.clone());
        Arc::new(visitor)
    }

    /// Look up a pass by uuid.
    pub fn get(&self, uuid: &Uuid) -> Option<Arc<Visitor>> {
        self.store.get(uuid)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Set the pass inactive and persist immediately.
    pub fn deactivate(&self, uuid: &Uuid) -> Result<Arc<Visitor>, CoreError> {
        self.update(uuid, |visitor| {
            visitor.deactivate();
            info!(%uuid, "deactivated visitor pass");
        })
    }

    /// Set the pass active, refresh its expiry forward, and persist
    /// immediately. Prior uses are kept.
    pub fn reactivate(&self, uuid: &Uuid) -> Result<Arc<Visitor>, CoreError> {
        let valid_for = self.settings.token_expiry;
        self.update(uuid, |visitor| {
            visitor.reactivate(valid_for);
            info!(%uuid, "reactivated visitor pass");
        })
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Look up and validate a pass. No side effects.
    pub fn validate(&self, uuid: &Uuid) -> Result<Arc<Visitor>, CoreError> {
        let visitor = self
            .get(uuid)
            .ok_or(CoreError::VisitorNotFound { uuid: *uuid })?;
        visitor.validate()?;
        Ok(visitor)
    }

    /// Validate a pass and check it covers `scope`.
    pub fn authorize(&self, uuid: &Uuid, scope: &str) -> Result<Arc<Visitor>, CoreError> {
        let visitor = self.validate(uuid)?;
        if !visitor.covers_scope(scope) {
            debug!(%uuid, scope, pass_scope = %visitor.scope, "scope mismatch");
            return Err(CoreError::denied(DenialReason::ScopeMismatch));
        }
        Ok(visitor)
    }

    /// Validate a pass, then count the presentation: increments
    /// `current_uses` and persists.
    pub fn redeem(&self, uuid: &Uuid) -> Result<Arc<Visitor>, CoreError> {
        self.validate(uuid)?;
        self.update(uuid, |visitor| {
            visitor.current_uses += 1;
            debug!(%uuid, uses = visitor.current_uses, "redeemed visitor pass");
        })
    }

    // ── URL tokenising ───────────────────────────────────────────────

    /// Tokenise `url` with the configured query-string key.
    pub fn tokenise(&self, visitor: &Visitor, url: &str) -> String {
        visitor.tokenise_with_key(url, &self.settings.querystring_key)
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Read-modify-write a stored pass.
    fn update<F>(&self, uuid: &Uuid, mutate: F) -> Result<Arc<Visitor>, CoreError>
    where
        F: FnOnce(&mut Visitor),
    {
        let current = self
            .get(uuid)
            .ok_or(CoreError::VisitorNotFound { uuid: *uuid })?;
        let mut visitor = (*current).clone();
        mutate(&mut visitor);
        self.store.put(visitor.clone());
        Ok(Arc::new(visitor))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn registry() -> PassRegistry {
        PassRegistry::new(PassSettings::default())
    }

    #[test]
    fn issue_applies_registry_defaults() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));

        assert!(visitor.is_active);
        assert_eq!(visitor.max_uses, 10);
        assert_eq!(
            visitor.expires_at,
            Some(visitor.created_at + registry.settings().token_expiry)
        );
        assert!(registry.get(&visitor.uuid).is_some());
    }

    #[test]
    fn issue_honours_overrides() {
        let registry = registry();
        let visitor = registry.issue(
            NewPass::new("foo@bar.com", "foo")
                .max_uses(1)
                .expires_in(chrono::Duration::minutes(5)),
        );
        assert_eq!(visitor.max_uses, 1);
        assert_eq!(
            visitor.expires_at,
            Some(visitor.created_at + chrono::Duration::minutes(5))
        );
    }

    #[test]
    fn deactivate_persists() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));
        assert!(visitor.is_active);

        let updated = registry.deactivate(&visitor.uuid).unwrap();
        assert!(!updated.is_active);

        // Re-read from the store: the change stuck.
        let stored = registry.get(&visitor.uuid).unwrap();
        assert!(!stored.is_active);
    }

    #[test]
    fn reactivate_refreshes_expiry_and_persists() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));
        registry.deactivate(&visitor.uuid).unwrap();

        // Force the stored record into the expired state first.
        let mut expired = (*registry.get(&visitor.uuid).unwrap()).clone();
        expired.expires_at = Some(chrono::Utc::now() - chrono::Duration::days(1));
        registry.store().put(expired);

        let stored = registry.get(&visitor.uuid).unwrap();
        assert!(!stored.is_active);
        assert!(stored.has_expired());
        assert!(!stored.is_valid());

        registry.reactivate(&visitor.uuid).unwrap();

        let stored = registry.get(&visitor.uuid).unwrap();
        assert!(stored.is_active);
        assert!(!stored.has_expired());
        assert!(stored.is_valid());
    }

    #[test]
    fn validate_unknown_uuid_is_not_found() {
        let registry = registry();
        let err = registry.validate(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, CoreError::VisitorNotFound { .. }));
    }

    #[test]
    fn redeem_increments_and_persists() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));

        registry.redeem(&visitor.uuid).unwrap();
        let stored = registry.get(&visitor.uuid).unwrap();
        assert_eq!(stored.current_uses, 1);
    }

    #[test]
    fn redeem_stops_at_max_uses() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo").max_uses(2));

        registry.redeem(&visitor.uuid).unwrap();
        registry.redeem(&visitor.uuid).unwrap();
        let err = registry.redeem(&visitor.uuid).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidVisitorPass {
                reason: DenialReason::UsesExhausted
            }
        ));
        assert_eq!(registry.get(&visitor.uuid).unwrap().current_uses, 2);
    }

    #[test]
    fn authorize_checks_scope() {
        let registry = registry();
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));

        assert!(registry.authorize(&visitor.uuid, "foo").is_ok());
        let err = registry.authorize(&visitor.uuid, "bar").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidVisitorPass {
                reason: DenialReason::ScopeMismatch
            }
        ));
    }

    #[test]
    fn tokenise_uses_configured_key() {
        let settings = PassSettings {
            querystring_key: "guest".into(),
            ..PassSettings::default()
        };
        let registry = PassRegistry::new(settings);
        let visitor = registry.issue(NewPass::new("foo@bar.com", "foo"));

        let url = registry.tokenise(&visitor, "/invite");
        assert_eq!(url, format!("/invite?guest={}", visitor.uuid));
    }
}
