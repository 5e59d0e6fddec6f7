// ── Core error types ──
//
// User-facing errors from gatepass-core. Consumers never see store
// internals directly; a rejected pass always surfaces as
// `InvalidVisitorPass` with the reason the check failed.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Why a visitor pass was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The pass has been deactivated.
    Inactive,
    /// The pass's expiry timestamp is in the past.
    Expired,
    /// The pass has been presented `max_uses` times already.
    UsesExhausted,
    /// The pass does not grant access to the requested scope.
    ScopeMismatch,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "pass is inactive"),
            Self::Expired => write!(f, "pass has expired"),
            Self::UsesExhausted => write!(f, "pass has exceeded its maximum number of uses"),
            Self::ScopeMismatch => write!(f, "pass does not cover the requested scope"),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid visitor pass: {reason}")]
    InvalidVisitorPass { reason: DenialReason },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Visitor not found: {uuid}")]
    VisitorNotFound { uuid: Uuid },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Shorthand used throughout validation paths.
    pub(crate) fn denied(reason: DenialReason) -> Self {
        Self::InvalidVisitorPass { reason }
    }
}
