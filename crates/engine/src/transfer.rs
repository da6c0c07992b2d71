use chrono::Utc;
use ledgerd_hash::{build_handle, parse_handle, OpLeg, TxnRaw};
use ledgerd_lock::LockClient;
use ledgerd_storage::{NewTransactionRow, Storage};
use ledgerd_types::{Address, Amount, BulkLeg, Transaction};

use crate::error::LedgerError;

/// Request to build (and optionally submit) a single-leg transfer.
pub struct SingleTransferRequest {
    pub from: Address,
    pub to: Address,
    pub asset: String,
    pub amount: Amount,
    pub from_sequence: i64,
    pub memo: Option<String>,
    /// A handle built ahead of time via `build_single_handle`. When absent,
    /// one is minted at submission time.
    pub handle: Option<String>,
}

/// Request to build (and optionally submit) a bulk transfer. `from` must
/// appear as some leg's `from` or `to`.
pub struct BulkTransferRequest {
    pub from: Address,
    pub from_sequence: i64,
    pub legs: Vec<BulkLeg>,
    pub memo: Option<String>,
    pub handle: Option<String>,
}

/// Request to mint `amount` of `asset` into `to` from the fixed finance
/// address - backs `POST /v1/faucet/`.
pub struct FaucetRequest {
    pub finance_addr: Address,
    pub to: Address,
    pub asset: String,
    pub amount: Amount,
}

/// Single and bulk transfer state machine: debit, credit, sequence-bump,
/// rehash, and append-to-ledger, all inside one storage transaction. Bulk
/// legs additionally take a per-`from` distributed lease, acquired and
/// released one leg at a time so no two leases are ever held at once.
pub struct TransferEngine {
    storage: Storage,
    lock: LockClient,
    txn_expired_seconds: i64,
}

impl TransferEngine {
    pub fn new(storage: Storage, lock: LockClient, txn_expired_seconds: i64) -> Self {
        Self { storage, lock, txn_expired_seconds }
    }

    /// Build the handle for a single transfer without applying any state
    /// change - backs `POST /v1/transactions/hash`.
    pub fn build_single_handle(&self, req: &SingleTransferRequest) -> Result<String, LedgerError> {
        let now = Utc::now().timestamp();
        let raw = single_raw(req, now);
        build_handle(now, &raw.sha256_hex()).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))
    }

    /// Build the handle for a bulk transfer - backs `POST /v1/transactions/bulk/hash`.
    pub fn build_bulk_handle(&self, req: &BulkTransferRequest) -> Result<String, LedgerError> {
        let now = Utc::now().timestamp();
        let raw = bulk_raw(req, now);
        build_handle(now, &raw.sha256_hex()).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))
    }

    /// Submit a single-leg transfer, minting a handle if `req.handle` is
    /// absent, or verifying and consuming the caller-supplied one.
    pub async fn submit_single(&self, req: SingleTransferRequest) -> Result<Transaction, LedgerError> {
        if req.from == req.to {
            return Err(LedgerError::TxnSelfTransfer(req.from.to_string()));
        }
        if req.amount <= Amount::zero() {
            return Err(LedgerError::TxnBuildFailed("amount must be strictly positive".into()));
        }

        let (handle, created_at) = self.resolve_handle(req.handle.as_deref(), |ts| single_raw(&req, ts), true)?;

        let row = NewTransactionRow {
            handle: &handle,
            asset: Some(&req.asset),
            from: req.from.as_str(),
            to: Some(req.to.as_str()),
            amount: Some(req.amount),
            from_sequence: req.from_sequence,
            op: None,
            memo: req.memo.as_deref(),
            created_at,
        };

        self.storage
            .transfer(&req.asset, req.from.as_str(), req.to.as_str(), req.amount, req.from_sequence, row)
            .await
            .map_err(Into::into)
    }

    /// Submit a bulk transfer: pre-check the submitter's sequence, then walk
    /// the legs in caller-supplied order, acquiring and releasing a
    /// distributed lease on each leg's `from` around its own debit/credit.
    pub async fn submit_bulk(&self, req: BulkTransferRequest) -> Result<Transaction, LedgerError> {
        for leg in &req.legs {
            if leg.from == leg.to {
                return Err(LedgerError::TxnSelfTransfer(leg.from.to_string()));
            }
        }
        if !req.legs.iter().any(|leg| leg.from == req.from || leg.to == req.from) {
            return Err(LedgerError::BulkFromMissing { from: req.from.to_string() });
        }

        let submitter = self
            .storage
            .get_account(req.from.as_str())
            .await?
            .ok_or_else(|| LedgerError::AddressNotFound(req.from.to_string()))?;
        if submitter.sequence != req.from_sequence {
            return Err(LedgerError::TxnSendFailed(format!("stale sequence for {}", req.from)));
        }

        let (handle, created_at) = self.resolve_handle(req.handle.as_deref(), |ts| bulk_raw(&req, ts), true)?;

        let txn_table = self.storage.ensure_transaction_table(created_at.timestamp()).await?;
        let mut tx = self.storage.begin().await?;

        for leg in &req.legs {
            let lock_name = format!("bulk:{}", leg.from);
            let guard = self
                .lock
                .acquire(&lock_name)
                .await
                .map_err(|_| LedgerError::BulkLockFailed(leg.from.to_string()))?;

            tx.debit_leg(&leg.asset, leg.from.as_str(), leg.amount, &handle).await?;
            tx.credit(&leg.asset, leg.to.as_str(), leg.amount, &handle).await?;

            guard.release().await.ok();
        }

        let op: Vec<BulkLeg> = req.legs.clone();
        let row = NewTransactionRow {
            handle: &handle,
            asset: None,
            from: req.from.as_str(),
            to: None,
            amount: None,
            from_sequence: req.from_sequence,
            op: Some(&op),
            memo: req.memo.as_deref(),
            created_at,
        };
        let inserted = tx.insert_transaction(&txn_table, row).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Mint `amount` of `asset` into `to` from the fixed finance address.
    /// Only the finance account's sequence is bumped - its balance is never
    /// debited, per the faucet's bookkeeping-only treatment of that account.
    pub async fn faucet_mint(&self, req: FaucetRequest) -> Result<Transaction, LedgerError> {
        if req.amount <= Amount::zero() {
            return Err(LedgerError::TxnBuildFailed("amount must be strictly positive".into()));
        }

        let finance = self
            .storage
            .get_account(req.finance_addr.as_str())
            .await?
            .ok_or_else(|| LedgerError::AddressNotFound(req.finance_addr.to_string()))?;
        let from_sequence = finance.sequence;

        let to_account = self
            .storage
            .get_account(req.to.as_str())
            .await?
            .ok_or_else(|| LedgerError::AddressNotFound(req.to.to_string()))?;
        if !to_account.balances.iter().any(|b| b.asset == req.asset) {
            return Err(LedgerError::AssetNotTrusted { address: req.to.to_string(), asset: req.asset.clone() });
        }

        let now = Utc::now().timestamp();
        let raw =
            TxnRaw::single(req.asset.as_str(), req.finance_addr.to_string(), req.to.to_string(), req.amount.canonical_string(), from_sequence, now);
        let handle = build_handle(now, &raw.sha256_hex()).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
        let created_at = timestamp_to_utc(now);

        let txn_table = self.storage.ensure_transaction_table(now).await?;
        let mut tx = self.storage.begin().await?;
        tx.bump_sequence(req.finance_addr.as_str(), from_sequence, &handle).await?;
        tx.credit(&req.asset, req.to.as_str(), req.amount, &handle).await?;

        let row = NewTransactionRow {
            handle: &handle,
            asset: Some(&req.asset),
            from: req.finance_addr.as_str(),
            to: Some(req.to.as_str()),
            amount: Some(req.amount),
            from_sequence,
            op: None,
            memo: Some("faucet"),
            created_at,
        };
        let inserted = tx.insert_transaction(&txn_table, row).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    fn resolve_handle(
        &self,
        handle: Option<&str>,
        build_raw: impl Fn(i64) -> TxnRaw,
        enforce_expiry: bool,
    ) -> Result<(String, chrono::DateTime<Utc>), LedgerError> {
        let now = Utc::now().timestamp();
        match handle {
            Some(h) => {
                let (expected_hash, ts) = parse_handle(h).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
                let raw = build_raw(ts);
                if raw.sha256_hex() != expected_hash {
                    return Err(LedgerError::TxnBuildFailed(format!("handle {h} does not match its content")));
                }
                if enforce_expiry && now - ts > self.txn_expired_seconds {
                    return Err(LedgerError::TxnExpired);
                }
                Ok((h.to_string(), timestamp_to_utc(ts)))
            }
            None => {
                let raw = build_raw(now);
                let handle =
                    build_handle(now, &raw.sha256_hex()).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
                Ok((handle, timestamp_to_utc(now)))
            }
        }
    }
}

fn single_raw(req: &SingleTransferRequest, ts: i64) -> TxnRaw {
    TxnRaw::single(req.asset.as_str(), req.from.to_string(), req.to.to_string(), req.amount.canonical_string(), req.from_sequence, ts)
}

fn bulk_raw(req: &BulkTransferRequest, ts: i64) -> TxnRaw {
    let op: Vec<OpLeg> = req
        .legs
        .iter()
        .map(|leg| OpLeg { from: leg.from.to_string(), to: leg.to.to_string(), asset: leg.asset.clone(), amount: leg.amount.canonical_string() })
        .collect();
    TxnRaw::bulk(req.from.to_string(), req.from_sequence, ts, op)
}

fn timestamp_to_utc(ts: i64) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp(ts, 0).expect("valid unix timestamp")
}
