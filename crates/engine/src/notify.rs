use redis::aio::ConnectionManager;

/// Severity of an out-of-band warning. The Integrity Verifier is the only
/// current caller, one variant per logical error kind it can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    InvalidAccount,
    InvalidTransaction,
}

impl WarningLevel {
    fn label(self) -> &'static str {
        match self {
            Self::InvalidAccount => "invalid_account",
            Self::InvalidTransaction => "invalid_transaction",
        }
    }
}

/// Best-effort push of a warning onto an external relay queue. Failure to
/// notify never fails the request that triggered the warning.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn warn(&self, level: WarningLevel, message: &str);
}

/// Pushes `"**{level}**\n{message}"` onto a Redis list, consumed by an
/// out-of-scope relay (e.g. a chat-bot forwarder) that periodically `RPOP`s
/// it in batches.
#[derive(Clone)]
pub struct RedisNotificationSink {
    conn: ConnectionManager,
    list_key: String,
}

impl RedisNotificationSink {
    pub async fn connect(redis_url: &str, list_key: impl Into<String>) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, list_key: list_key.into() })
    }
}

#[async_trait::async_trait]
impl NotificationSink for RedisNotificationSink {
    async fn warn(&self, level: WarningLevel, message: &str) {
        let payload = format!("**{}**\n{message}", level.label());
        let mut conn = self.conn.clone();
        if let Err(e) = redis::cmd("LPUSH").arg(&self.list_key).arg(payload).query_async::<()>(&mut conn).await {
            tracing::warn!("failed to push notification to redis: {e}");
        }
    }
}

/// Discards every warning. Used where no relay is configured, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn warn(&self, _level: WarningLevel, _message: &str) {}
}
