/// Connection parameters for the MySQL-compatible ledger database.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Drop and recreate every sharded/partitioned table on startup - a
    /// development convenience, never set in production.
    pub recreate_tables: bool,
}

impl StorageConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "ledgerd".to_string(),
            min_connections: 1,
            max_connections: 10,
            recreate_tables: false,
        }
    }
}
