pub mod error;
pub mod integrity;
pub mod notify;
mod services;
pub mod transfer;

pub use error::LedgerError;
pub use integrity::IntegrityVerifier;
pub use notify::{NoopNotificationSink, NotificationSink, RedisNotificationSink, WarningLevel};
pub use services::AccountService;
pub use transfer::{BulkTransferRequest, FaucetRequest, SingleTransferRequest, TransferEngine};

use ledgerd_crypto::SecretCipher;
use ledgerd_lock::LockClient;
use ledgerd_storage::Storage;
use ledgerd_types::{Account, CursorDirection, NewAccount, Transaction};

/// Top-level facade over the ledger: account lifecycle, transfers, and
/// integrity-checked reads, each delegated to its own service. The
/// notification sink is boxed since it's a pluggable, runtime-selected
/// dependency (Redis-backed in production, no-op in tests).
pub struct LedgerEngine {
    storage: Storage,
    account: AccountService,
    transfer: TransferEngine,
    notify: Box<dyn NotificationSink>,
}

impl LedgerEngine {
    pub fn new(
        storage: Storage,
        lock: LockClient,
        cipher: SecretCipher,
        notify: Box<dyn NotificationSink>,
        txn_expired_seconds: i64,
    ) -> Self {
        Self {
            account: AccountService::new(storage.clone(), cipher),
            transfer: TransferEngine::new(storage.clone(), lock, txn_expired_seconds),
            storage,
            notify,
        }
    }

    fn verifier(&self) -> IntegrityVerifier<'_> {
        IntegrityVerifier::new(&self.storage, self.notify.as_ref())
    }

    // ------------------------------------------------------------------
    // Account Service
    // ------------------------------------------------------------------

    pub async fn create_account(&self) -> Result<NewAccount, LedgerError> {
        self.account.create_account().await
    }

    pub async fn trust_asset(&self, address: &str, assets_csv: &str) -> Result<Account, LedgerError> {
        self.account.trust_asset(address, assets_csv).await
    }

    pub async fn get_account(&self, address: &str) -> Result<Account, LedgerError> {
        self.verifier().get_account(address).await?.ok_or_else(|| LedgerError::AddressNotFound(address.to_string()))
    }

    pub async fn list_transactions(
        &self,
        address: &str,
        cursor: Option<&str>,
        direction: CursorDirection,
        limit: i64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let ascending = direction == CursorDirection::Asc;
        self.verifier().list_account_transactions(address, cursor, ascending, limit).await
    }

    pub async fn get_transaction(&self, handle: &str) -> Result<Transaction, LedgerError> {
        let (_, ts) = ledgerd_hash::parse_handle(handle).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
        self.verifier().get_transaction(handle, ts).await?.ok_or_else(|| LedgerError::TxnNotFound(handle.to_string()))
    }

    // ------------------------------------------------------------------
    // Transfer Engine
    // ------------------------------------------------------------------

    pub fn build_single_handle(&self, req: &SingleTransferRequest) -> Result<String, LedgerError> {
        self.transfer.build_single_handle(req)
    }

    pub fn build_bulk_handle(&self, req: &BulkTransferRequest) -> Result<String, LedgerError> {
        self.transfer.build_bulk_handle(req)
    }

    pub async fn submit_single(&self, req: SingleTransferRequest) -> Result<Transaction, LedgerError> {
        self.transfer.submit_single(req).await
    }

    pub async fn submit_bulk(&self, req: BulkTransferRequest) -> Result<Transaction, LedgerError> {
        self.transfer.submit_bulk(req).await
    }

    pub async fn faucet_mint(&self, req: FaucetRequest) -> Result<Transaction, LedgerError> {
        self.transfer.faucet_mint(req).await
    }
}
