use thiserror::Error;

/// Engine-level errors, one variant per logical API status code. Maps
/// 1:1 onto `ledgerd_rpc::RpcError`'s envelope.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("address not found: {0}")]
    AddressNotFound(String),

    #[error("asset {asset} is not trusted by {address}")]
    AssetNotTrusted { address: String, asset: String },

    #[error("transaction not found: {0}")]
    TxnNotFound(String),

    #[error("transaction build failed: {0}")]
    TxnBuildFailed(String),

    #[error("transaction expired")]
    TxnExpired,

    #[error("insufficient funds: {address} holds too little {asset}")]
    InsufficientFunds { address: String, asset: String },

    #[error("transaction send failed: {0}")]
    TxnSendFailed(String),

    #[error("self-transfer not allowed: {0}")]
    TxnSelfTransfer(String),

    #[error("bulk submitter {from} is not a party to any leg")]
    BulkFromMissing { from: String },

    #[error("bulk lock on {0} not acquired within blocking timeout")]
    BulkLockFailed(String),

    #[error("stored transaction hash mismatch: {0}")]
    InvalidTransaction(String),

    #[error("stored account hash mismatch: {0}")]
    InvalidAccount(String),

    #[error(transparent)]
    Storage(#[from] ledgerd_storage::StorageError),

    #[error(transparent)]
    Hash(#[from] ledgerd_hash::HashError),

    #[error(transparent)]
    Lock(#[from] ledgerd_lock::LockError),

    #[error(transparent)]
    Crypto(#[from] ledgerd_crypto::CryptoError),
}

impl LedgerError {
    /// The logical code of §7, surfaced to callers instead of an HTTP status.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::AddressNotFound(_) => 40001,
            Self::AssetNotTrusted { .. } => 40002,
            Self::TxnNotFound(_) => 40003,
            Self::TxnBuildFailed(_) => 40005,
            Self::TxnExpired => 40006,
            Self::InsufficientFunds { .. } => 40007,
            Self::TxnSendFailed(_) => 40008,
            Self::TxnSelfTransfer(_) | Self::BulkFromMissing { .. } => 40009,
            Self::BulkLockFailed(_) => 40010,
            Self::InvalidTransaction(_) => 40011,
            Self::InvalidAccount(_) => 40012,
            Self::Storage(storage_err) => Self::code_for_storage(storage_err),
            Self::Hash(_) => 40005,
            Self::Lock(_) => 40010,
            Self::Crypto(_) => 40005,
        }
    }

    fn code_for_storage(err: &ledgerd_storage::StorageError) -> u32 {
        use ledgerd_storage::StorageError;
        match err {
            StorageError::AccountNotFound(_) => 40001,
            StorageError::AssetNotTrusted { .. } => 40002,
            StorageError::TransactionNotFound(_) => 40003,
            StorageError::InsufficientFunds { .. } => 40007,
            StorageError::SequenceConflict { .. } | StorageError::DuplicateTransaction | StorageError::BalanceOverflow { .. } => {
                40008
            }
            StorageError::InvalidAccount(_) => 40012,
            StorageError::InvalidTransaction(_) => 40011,
            StorageError::Database(_) | StorageError::InvalidTableName(_) => 40008,
        }
    }
}
