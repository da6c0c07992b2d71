use ledgerd_storage::{Storage, StorageError};
use ledgerd_types::{Account, Transaction};

use crate::error::LedgerError;
use crate::notify::{NotificationSink, WarningLevel};

/// Wraps the storage adapter's read paths so that a recomputed-hash mismatch
/// (surfaced by `Storage` as `StorageError::InvalidAccount`/
/// `InvalidTransaction`) both emits a notification and maps onto the
/// corresponding `LedgerError` before reaching a caller.
pub struct IntegrityVerifier<'a> {
    storage: &'a Storage,
    sink: &'a (dyn NotificationSink + 'a),
}

impl<'a> IntegrityVerifier<'a> {
    pub fn new(storage: &'a Storage, sink: &'a (dyn NotificationSink + 'a)) -> Self {
        Self { storage, sink }
    }

    pub async fn get_account(&self, address: &str) -> Result<Option<Account>, LedgerError> {
        match self.storage.get_account(address).await {
            Ok(account) => Ok(account),
            Err(StorageError::InvalidAccount(addr)) => {
                self.sink.warn(WarningLevel::InvalidAccount, &format!("account {addr} failed integrity check")).await;
                Err(LedgerError::InvalidAccount(addr))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_transaction(&self, handle: &str, unix_timestamp: i64) -> Result<Option<Transaction>, LedgerError> {
        match self.storage.get_transaction(handle, unix_timestamp).await {
            Ok(txn) => Ok(txn),
            Err(StorageError::InvalidTransaction(h)) => {
                self.sink.warn(WarningLevel::InvalidTransaction, &format!("transaction {h} failed integrity check")).await;
                Err(LedgerError::InvalidTransaction(h))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_account_transactions(
        &self,
        address: &str,
        cursor: Option<&str>,
        ascending: bool,
        limit: i64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        match self.storage.list_account_transactions(address, cursor, ascending, limit).await {
            Ok(txns) => Ok(txns),
            Err(StorageError::InvalidAccount(addr)) => {
                self.sink.warn(WarningLevel::InvalidAccount, &format!("account {addr} failed integrity check")).await;
                Err(LedgerError::InvalidAccount(addr))
            }
            Err(StorageError::InvalidTransaction(h)) => {
                self.sink.warn(WarningLevel::InvalidTransaction, &format!("transaction {h} failed integrity check")).await;
                Err(LedgerError::InvalidTransaction(h))
            }
            Err(e) => Err(e.into()),
        }
    }
}
