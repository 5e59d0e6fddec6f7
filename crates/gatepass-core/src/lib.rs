// gatepass-core: Visitor-pass domain layer between the store and consumers.

pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_QUERYSTRING_KEY, DEFAULT_SESSION_KEY, PassSettings};
pub use error::{CoreError, DenialReason};
pub use registry::{NewPass, PassRegistry};
pub use resolve::{SessionState, VisitorContext};
pub use store::{MemoryStore, VisitorStore};

// Re-export model types at the crate root for ergonomics.
pub use model::Visitor;
