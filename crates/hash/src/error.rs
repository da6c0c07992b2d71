use thiserror::Error;

/// Errors raised building or parsing content-addressed handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("handle has wrong length: expected 74 characters, got {0}")]
    WrongLength(usize),

    #[error("handle is not valid hex/ascii: {0}")]
    Malformed(String),

    #[error("handle does not match recomputed hash")]
    Mismatch,

    #[error("handle expired: submitted at {submitted_at}, now {now}, ttl {ttl_seconds}s")]
    Expired {
        submitted_at: i64,
        now: i64,
        ttl_seconds: i64,
    },
}

impl HashError {
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}
