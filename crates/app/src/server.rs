use ledgerd_crypto::SecretCipher;
use ledgerd_engine::{LedgerEngine, NoopNotificationSink, RedisNotificationSink};
use ledgerd_lock::{LockClient, LockConfig};
use ledgerd_rpc::RpcState;
use ledgerd_storage::Storage;
use ledgerd_types::Address;
use tracing_subscriber::EnvFilter;

use crate::config::StartConfig;

/// Initialize tracing subscriber
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level)).unwrap();

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

pub async fn start_server(config: &StartConfig) -> anyhow::Result<()> {
    log_startup_info(config);

    let storage = Storage::connect(&config.storage_config()).await?;
    let lock = LockClient::connect(&config.redis_url, LockConfig::default()).await?;
    let (key, iv) = config.read_secret_key_material()?;
    let cipher = SecretCipher::new(&key, &iv)?;
    let finance_addr = Address::new(config.finance_addr.clone())?;

    let notify: Box<dyn ledgerd_engine::NotificationSink> =
        match RedisNotificationSink::connect(&config.redis_url, &config.redis_notify_key).await {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                tracing::warn!("notification sink unavailable, warnings will be discarded: {e}");
                Box::new(NoopNotificationSink)
            }
        };

    let engine = LedgerEngine::new(storage, lock, cipher, notify, config.txn_expired_seconds);
    let rpc_state = RpcState::new(engine, finance_addr);

    tracing::info!("ledgerd started, press Ctrl+C to stop");
    ledgerd_rpc::start_server(rpc_state, &config.rpc_addr).await?;
    Ok(())
}

fn log_startup_info(config: &StartConfig) {
    tracing::info!("starting {}", config.app_name);
    tracing::info!("  rpc:   {}", config.rpc_addr);
    tracing::info!("  db:    {}@{}:{}/{}", config.db_user, config.db_host, config.db_port, config.db_name);
    tracing::info!("  redis: {}", config.redis_url);
}
