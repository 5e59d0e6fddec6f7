// ── Domain model ──
//
// The `Visitor` record is the canonical representation of a pass.
// Everything here is pure data plus derived-state computations; all
// persistence goes through the store and registry.

pub mod visitor;

// ── Re-exports ──────────────────────────────────────────────────────

pub use visitor::{DEFAULT_MAX_USES, Visitor, default_token_expiry};
