use thiserror::Error;

/// Errors raised acquiring or releasing a distributed lease.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to acquire lock {name:?} within {blocking_timeout_ms}ms")]
    Timeout {
        name: String,
        blocking_timeout_ms: u64,
    },
}

impl LockError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
