/// Distributed lock timing, mirroring the original's
/// `redis.lock(blocking_timeout=0.2, timeout=100.0)` call.
#[derive(Debug, Clone, Copy)]
pub struct LockConfig {
    /// How long to keep polling for the lock before giving up.
    pub blocking_timeout_ms: u64,
    /// Lease duration once acquired - the lock self-expires after this
    /// even if the holder never releases it.
    pub lease_ms: u64,
    /// Polling interval while waiting to acquire.
    pub poll_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            blocking_timeout_ms: 200,
            lease_ms: 100_000,
            poll_interval_ms: 20,
        }
    }
}
