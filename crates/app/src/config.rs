use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ledgerd")]
#[command(version, about = "Account-and-ledger service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the ledger daemon
    Start(Box<StartConfig>),
    /// Display version information
    Version,
}

#[derive(Args)]
pub struct StartConfig {
    /// Application name, used only in log output
    #[arg(long, env = "APP_NAME", default_value = "ledgerd")]
    pub app_name: String,

    /// RPC server bind address
    #[arg(long = "rpc.addr", env = "RPC_ADDR", default_value = "0.0.0.0:3000")]
    pub rpc_addr: String,

    #[arg(long = "db.user", env = "DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long = "db.passwd", env = "DB_PASSWD", default_value = "")]
    pub db_passwd: String,

    #[arg(long = "db.host", env = "DB_HOST", default_value = "127.0.0.1")]
    pub db_host: String,

    #[arg(long = "db.port", env = "DB_PORT", default_value = "3306")]
    pub db_port: u16,

    #[arg(long = "db.name", env = "DB_NAME", default_value = "ledgerd")]
    pub db_name: String,

    #[arg(long = "db.min_conn", env = "DB_MIN_CONN", default_value = "1")]
    pub db_min_conn: u32,

    #[arg(long = "db.max_conn", env = "DB_MAX_CONN", default_value = "10")]
    pub db_max_conn: u32,

    /// Connection recycle interval, in seconds - informational only, sqlx's
    /// pool doesn't expose a direct equivalent of a per-connection max age.
    #[arg(long = "db.recycle_seconds", env = "DB_RECYCLE_SECONDS", default_value = "3600")]
    pub db_recycle_seconds: u64,

    #[arg(long = "redis.url", env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Name of the Redis list the Integrity Verifier's notifications are
    /// pushed onto.
    #[arg(long = "redis.notify_key", env = "REDIS_NOTIFY_KEY", default_value = "ledgerd:warnings")]
    pub redis_notify_key: String,

    /// The address the faucet mints from.
    #[arg(long = "ams.finance_addr", env = "AMS_FINANCE_ADDR")]
    pub finance_addr: String,

    /// How long a built handle remains submittable, in seconds.
    #[arg(long = "txn.expired_seconds", env = "TXN_EXPIRED_SECONDS", default_value = "300")]
    pub txn_expired_seconds: i64,

    /// Path to the raw 32-byte AES-256 key used to encrypt account secrets.
    #[arg(long = "account.secret_aes_key", env = "ACCOUNT_SECRET_AES_KEY")]
    pub account_secret_aes_key: String,

    /// Path to the raw 16-byte AES-CBC IV used to encrypt account secrets.
    #[arg(long = "account.secret_aes_iv", env = "ACCOUNT_SECRET_AES_IV")]
    pub account_secret_aes_iv: String,

    /// Drop and recreate every sharded table on startup. Dev-only.
    #[arg(long = "recreate_tables", env = "RECREATE_TABLES")]
    pub recreate_tables: bool,

    /// Enable debug logging
    #[arg(long = "log.debug")]
    pub debug: bool,
}

impl StartConfig {
    pub fn storage_config(&self) -> ledgerd_storage::StorageConfig {
        ledgerd_storage::StorageConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_passwd.clone(),
            database: self.db_name.clone(),
            min_connections: self.db_min_conn,
            max_connections: self.db_max_conn,
            recreate_tables: self.recreate_tables,
        }
    }

    pub fn read_secret_key_material(&self) -> anyhow::Result<(Vec<u8>, Vec<u8>)> {
        let key = std::fs::read(&self.account_secret_aes_key)?;
        let iv = std::fs::read(&self.account_secret_aes_iv)?;
        Ok((key, iv))
    }
}
