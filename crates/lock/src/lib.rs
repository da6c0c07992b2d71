mod config;
mod error;

pub use config::LockConfig;
pub use error::LockError;

use std::time::Duration;

use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Lua script used to release a lease only if the caller still holds it -
/// the classic single-instance Redlock release pattern, guarding against a
/// slow caller releasing a lease some other holder has since acquired.
const RELEASE_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
";

/// Client for the Redis-backed distributed lease used to serialize
/// concurrent mutation of a single account (or, for bulk transfers, each
/// leg's sender in turn).
#[derive(Clone)]
pub struct LockClient {
    conn: ConnectionManager,
    config: LockConfig,
}

impl LockClient {
    pub async fn connect(redis_url: &str, config: LockConfig) -> Result<Self, LockError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, config })
    }

    /// Acquire a lease on `name`, polling until `blocking_timeout_ms` is
    /// exhausted.
    pub async fn acquire(&self, name: &str) -> Result<LockGuard, LockError> {
        let token = Uuid::new_v4().to_string();
        let deadline = tokio::time::Instant::now() + Duration::from_millis(self.config.blocking_timeout_ms);
        let mut conn = self.conn.clone();

        loop {
            let acquired = try_set_nx_px(&mut conn, name, &token, self.config.lease_ms).await?;

            if acquired {
                return Ok(LockGuard {
                    conn: self.conn.clone(),
                    name: name.to_string(),
                    token,
                });
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(LockError::Timeout {
                    name: name.to_string(),
                    blocking_timeout_ms: self.config.blocking_timeout_ms,
                });
            }

            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
    }
}

/// `SET key val NX PX ms` - millisecond-precision lease, used when the
/// second-granularity `set_nx_ex` helper isn't appropriate (lease shorter
/// than 1s).
async fn try_set_nx_px(
    conn: &mut ConnectionManager,
    name: &str,
    token: &str,
    lease_ms: u64,
) -> Result<bool, LockError> {
    let result: Option<String> = redis::cmd("SET")
        .arg(name)
        .arg(token)
        .arg("NX")
        .arg("PX")
        .arg(lease_ms)
        .query_async(conn)
        .await?;
    Ok(result.is_some())
}

/// A held lease. Dropping it attempts a best-effort background release;
/// call `release` directly to observe failures.
pub struct LockGuard {
    conn: ConnectionManager,
    name: String,
    token: String,
}

impl LockGuard {
    pub async fn release(mut self) -> Result<(), LockError> {
        self.do_release().await
    }

    async fn do_release(&mut self) -> Result<(), LockError> {
        let _: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(&self.name)
            .arg(&self.token)
            .invoke_async(&mut self.conn)
            .await?;
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let mut conn = self.conn.clone();
        let name = self.name.clone();
        let token = self.token.clone();
        tokio::spawn(async move {
            let result: Result<i64, _> = redis::Script::new(RELEASE_SCRIPT)
                .key(&name)
                .arg(&token)
                .invoke_async(&mut conn)
                .await;
            if let Err(e) = result {
                tracing::warn!("failed to release lock {name}: {e}");
            }
        });
    }
}
