//! Error taxonomy for the epistemics engine.
//!
//! Two classes matter to callers: contract violations (`D7Violation`) that
//! indicate a programming bug and always surface, and ordinary operational
//! errors. Budget exhaustion and cooldown rejections are NOT errors — they
//! come back as structured results (see `models::recovery::RecoveryResult`).

pub type LibrarianResult<T> = Result<T, LibrarianError>;

#[derive(Debug, thiserror::Error)]
pub enum LibrarianError {
    /// A raw numeric confidence crossed a claim boundary. This is a bug in
    /// the producer, not bad input, and is never coerced or swallowed.
    #[error("D7_VIOLATION at {boundary}: {details}")]
    D7Violation { boundary: String, details: String },

    #[error("validation error: {reason}")]
    Validation { reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {reason}")]
    Config { reason: String },
}

impl LibrarianError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn d7_violation(boundary: impl Into<String>, details: impl Into<String>) -> Self {
        Self::D7Violation {
            boundary: boundary.into(),
            details: details.into(),
        }
    }

    /// True for the invariant-violation class, which callers must never
    /// treat as recoverable input trouble.
    pub fn is_d7_violation(&self) -> bool {
        matches!(self, Self::D7Violation { .. })
    }
}
