pub mod adapter;
pub mod config;
pub mod error;
pub mod router;

pub use adapter::{NewAccountRow, NewTransactionRow, Storage, StorageTx};
pub use config::StorageConfig;
pub use error::StorageError;
