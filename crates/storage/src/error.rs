use thiserror::Error;

/// Errors surfaced by the storage adapter.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("sequence conflict: account {address} expected sequence {expected}")]
    SequenceConflict { address: String, expected: i64 },

    #[error("duplicate transaction handle")]
    DuplicateTransaction,

    #[error("invalid table name: {0}")]
    InvalidTableName(String),

    #[error("asset {asset} is not trusted by {address}")]
    AssetNotTrusted { address: String, asset: String },

    #[error("insufficient funds: {address} holds too little {asset}")]
    InsufficientFunds { address: String, asset: String },

    #[error("balance overflow applying delta to {address}/{asset}")]
    BalanceOverflow { address: String, asset: String },

    #[error("stored account hash mismatch for {0}")]
    InvalidAccount(String),

    #[error("stored transaction hash mismatch for {0}")]
    InvalidTransaction(String),
}

impl StorageError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_) | Self::TransactionNotFound(_))
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::SequenceConflict { .. } | Self::DuplicateTransaction)
    }

    #[must_use]
    pub const fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }

    #[must_use]
    pub const fn is_asset_not_trusted(&self) -> bool {
        matches!(self, Self::AssetNotTrusted { .. })
    }
}
