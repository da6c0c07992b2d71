use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ledgerd_hash::{account_hash, verify_account_hash, BalanceRaw, OpLeg, TxnRaw};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, MySqlPool, Row};
use tokio::sync::RwLock;

use ledgerd_types::{Account, Address, Amount, Balance, BulkLeg, Transaction};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::router::{account_table_name, transaction_table_name, validate_table_name};

/// Fields needed to insert a freshly generated account. `hash` is the
/// integrity hash over `{address, sequence=0, secret, balances=[],
/// mnemonic, transactions=[]}`, computed by the caller so the storage layer
/// never has to know the hashing scheme for account creation.
pub struct NewAccountRow {
    pub address: String,
    pub secret_encrypted: String,
    pub mnemonic: String,
    pub hash: String,
}

/// Fields needed to insert a posted transfer row. `asset`/`to`/`amount` are
/// `None` for a bulk transfer, which instead carries its legs in `op`.
pub struct NewTransactionRow<'a> {
    pub handle: &'a str,
    pub asset: Option<&'a str>,
    pub from: &'a str,
    pub to: Option<&'a str>,
    pub amount: Option<Amount>,
    pub from_sequence: i64,
    pub op: Option<&'a [BulkLeg]>,
    pub memo: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// The full row behind an account, including fields the integrity hash is
/// computed over but that the public `Account` DTO never exposes (`secret`).
struct AccountRowFull {
    sequence: i64,
    secret: String,
    mnemonic: Option<String>,
    balances: Vec<Balance>,
    transactions: Vec<String>,
    hash: String,
}

/// Async entry point into the sharded/partitioned MySQL-compatible store.
/// Tables are created lazily on first touch and their names cached so that
/// steady-state traffic never re-issues `CREATE TABLE IF NOT EXISTS`.
#[derive(Clone)]
pub struct Storage {
    pool: MySqlPool,
    known_tables: Arc<RwLock<HashSet<String>>>,
    recreate_tables: bool,
}

impl Storage {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let pool = MySqlPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .connect(&config.connection_url())
            .await?;
        Ok(Self {
            pool,
            known_tables: Arc::new(RwLock::new(HashSet::new())),
            recreate_tables: config.recreate_tables,
        })
    }

    #[cfg(test)]
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool, known_tables: Arc::new(RwLock::new(HashSet::new())), recreate_tables: false }
    }

    async fn ensure_table(&self, name: &str, ddl: &str) -> Result<(), StorageError> {
        validate_table_name(name)?;
        if self.known_tables.read().await.contains(name) {
            return Ok(());
        }
        let mut known = self.known_tables.write().await;
        if known.contains(name) {
            return Ok(());
        }
        if self.recreate_tables {
            sqlx::query(&format!("DROP TABLE IF EXISTS `{name}`")).execute(&self.pool).await?;
        }
        sqlx::query(ddl).execute(&self.pool).await?;
        known.insert(name.to_string());
        Ok(())
    }

    pub async fn ensure_account_table(&self, address: &str) -> Result<String, StorageError> {
        let name = account_table_name(address);
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS `{name}` (\
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                sequence BIGINT NOT NULL DEFAULT 0, \
                address VARCHAR(56) NOT NULL, \
                secret VARCHAR(100) NOT NULL, \
                mnemonic VARCHAR(128) NULL, \
                balances JSON NOT NULL, \
                transactions JSON NOT NULL, \
                hash VARCHAR(64) NOT NULL, \
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP, \
                UNIQUE KEY `{name}_address_uindex` (address)\
            )"
        );
        self.ensure_table(&name, &ddl).await?;
        Ok(name)
    }

    pub async fn ensure_transaction_table(&self, unix_timestamp: i64) -> Result<String, StorageError> {
        let name = transaction_table_name(unix_timestamp)?;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS `{name}` (\
                id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                hash VARCHAR(74) NOT NULL, \
                asset VARCHAR(20) NULL, \
                `from` VARCHAR(56) NOT NULL, \
                `to` VARCHAR(56) NULL, \
                is_bulk BOOLEAN NOT NULL DEFAULT FALSE, \
                op JSON NULL, \
                amount DECIMAL(23,7) NULL, \
                from_sequence BIGINT NOT NULL, \
                is_success BOOLEAN NOT NULL, \
                memo VARCHAR(64) NULL, \
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP, \
                UNIQUE KEY `{name}_hash_uindex` (hash), \
                UNIQUE KEY `{name}_from_seq_uindex` (`from`, from_sequence), \
                KEY `{name}_to_index` (`to`)\
            )"
        );
        self.ensure_table(&name, &ddl).await?;
        Ok(name)
    }

    /// Fetch an account and verify its stored integrity hash before handing
    /// it back. Every caller-visible account read goes through this path, so
    /// a hash tampered with (or corrupted) out from under a running mutation
    /// surfaces here rather than silently propagating.
    pub async fn get_account(&self, address: &str) -> Result<Option<Account>, StorageError> {
        let table = self.ensure_account_table(address).await?;
        let row = sqlx::query(&format!(
            "SELECT sequence, address, secret, mnemonic, balances, transactions, hash, created_at, updated_at \
             FROM `{table}` WHERE address = ?"
        ))
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else { return Ok(None) };
        let account = account_from_row(&row)?;
        let secret: String = row.try_get("secret")?;
        let mnemonic: Option<String> = row.try_get("mnemonic")?;
        verify_account_row(&account, &secret, mnemonic.as_deref())?;
        Ok(Some(account))
    }

    pub async fn insert_account(&self, new: &NewAccountRow) -> Result<(), StorageError> {
        let table = self.ensure_account_table(&new.address).await?;
        let empty_balances = serde_json::to_value(Vec::<Balance>::new()).expect("empty vec always serializes");
        let empty_transactions = serde_json::to_value(Vec::<String>::new()).expect("empty vec always serializes");
        sqlx::query(&format!(
            "INSERT INTO `{table}` (sequence, address, secret, mnemonic, balances, transactions, hash) \
             VALUES (0, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&new.address)
        .bind(&new.secret_encrypted)
        .bind(&new.mnemonic)
        .bind(empty_balances)
        .bind(empty_transactions)
        .bind(&new.hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Add a zero-balance entry for each asset in `assets` iff absent,
    /// bumping `sequence` once per actual append - never once per call - and
    /// recomputing the stored integrity hash. All legs apply within one
    /// transaction, guarded on the account's starting `sequence` so a racing
    /// mutation on the same row is rejected rather than silently lost. If
    /// every asset is already trusted, this is a no-op: no row is written and
    /// `sequence`/`hash` are left untouched, mirroring a 0-rows-affected
    /// `UPDATE ... WHERE JSON_SEARCH(balances,'all',?) IS NULL`.
    pub async fn trust_asset(&self, address: &str, assets: &[String], expected_sequence: i64) -> Result<Account, StorageError> {
        let table = self.ensure_account_table(address).await?;
        let mut tx = self.pool.begin().await?;

        let mut row = fetch_full_row(&mut tx, &table, address).await?;
        if row.sequence != expected_sequence {
            return Err(StorageError::SequenceConflict { address: address.to_string(), expected: expected_sequence });
        }

        let mut appended = false;
        for asset in assets {
            if !row.balances.iter().any(|b| &b.asset == asset) {
                row.balances.push(Balance { asset: asset.clone(), balance: Amount::zero() });
                row.sequence += 1;
                appended = true;
            }
        }

        if !appended {
            tx.commit().await?;
            return self.get_account(address).await?.ok_or_else(|| StorageError::AccountNotFound(address.to_string()));
        }

        row.hash = recompute_hash(address, &row);

        let result = sqlx::query(&format!(
            "UPDATE `{table}` SET balances = ?, `sequence` = ?, hash = ? WHERE address = ? AND `sequence` = ?"
        ))
        .bind(serde_json::to_value(&row.balances).expect("balances always serialize"))
        .bind(row.sequence)
        .bind(&row.hash)
        .bind(address)
        .bind(expected_sequence)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::SequenceConflict { address: address.to_string(), expected: expected_sequence });
        }
        tx.commit().await?;

        self.get_account(address).await?.ok_or_else(|| StorageError::AccountNotFound(address.to_string()))
    }

    /// Open a new atomic unit of work. Callers must `ensure_transaction_table`
    /// (a DDL statement, which implicitly commits in MySQL) before opening
    /// the transaction that will insert into it.
    pub async fn begin(&self) -> Result<StorageTx, StorageError> {
        Ok(StorageTx { tx: self.pool.begin().await? })
    }

    /// Single-leg transfer: debit `from`, credit `to`, record one row. Runs
    /// as one atomic unit; no caller-visible partial application is
    /// possible.
    pub async fn transfer(
        &self,
        asset: &str,
        from: &str,
        to: &str,
        amount: Amount,
        from_sequence: i64,
        row: NewTransactionRow<'_>,
    ) -> Result<Transaction, StorageError> {
        let txn_table = self.ensure_transaction_table(row.created_at.timestamp()).await?;
        let mut tx = self.begin().await?;
        tx.debit(asset, from, amount, from_sequence, row.handle).await?;
        tx.credit(asset, to, amount, row.handle).await?;
        let inserted = tx.insert_transaction(&txn_table, row).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn get_transaction(&self, handle: &str, unix_timestamp: i64) -> Result<Option<Transaction>, StorageError> {
        let table = transaction_table_name(unix_timestamp)?;
        validate_table_name(&table)?;
        let row = sqlx::query(&format!(
            "SELECT id, hash, asset, `from`, `to`, amount, is_bulk, op, from_sequence, is_success, memo, created_at, updated_at \
             FROM `{table}` WHERE hash = ?"
        ))
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else { return Ok(None) };
        let txn = transaction_from_row(&row)?;
        verify_transaction_row(&txn)?;
        Ok(Some(txn))
    }

    /// Resolve and fetch the handles in `address`'s `transactions` list,
    /// newest-first unless `ascending`, starting strictly after `cursor`
    /// (a handle, or `None` for the first page), up to `limit` entries.
    pub async fn list_account_transactions(
        &self,
        address: &str,
        cursor: Option<&str>,
        ascending: bool,
        limit: i64,
    ) -> Result<Vec<Transaction>, StorageError> {
        let account = self.get_account(address).await?.ok_or_else(|| StorageError::AccountNotFound(address.to_string()))?;

        let mut handles: Vec<&String> = account.transactions.iter().collect();
        if !ascending {
            handles.reverse();
        }
        if let Some(cursor) = cursor {
            if let Some(pos) = handles.iter().position(|h| h.as_str() == cursor) {
                handles = handles.split_off(pos + 1);
            }
        }
        handles.truncate(limit.max(0) as usize);

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            let (_, ts) = ledgerd_hash::parse_handle(handle).map_err(|_| StorageError::TransactionNotFound(handle.clone()))?;
            if let Some(txn) = self.get_transaction(handle, ts).await? {
                out.push(txn);
            }
        }
        Ok(out)
    }
}

/// A transaction-scoped handle onto the store, used by the transfer engine
/// to interleave per-leg distributed locks between balance mutations while
/// keeping the whole bulk transfer atomic at the database level.
pub struct StorageTx {
    tx: sqlx::Transaction<'static, MySql>,
}

impl StorageTx {
    pub async fn debit(
        &mut self,
        asset: &str,
        address: &str,
        amount: Amount,
        expected_sequence: i64,
        handle: &str,
    ) -> Result<(), StorageError> {
        self.apply_delta(asset, address, amount, true, Some(expected_sequence), handle).await
    }

    /// Debit without a sequence precondition - used for bulk-transfer legs,
    /// where mutual exclusion comes from the caller holding a distributed
    /// lease on `address` rather than from optimistic sequence matching.
    /// Still bumps `sequence` and appends `handle`.
    pub async fn debit_leg(&mut self, asset: &str, address: &str, amount: Amount, handle: &str) -> Result<(), StorageError> {
        self.apply_delta(asset, address, amount, true, None, handle).await
    }

    pub async fn credit(&mut self, asset: &str, address: &str, amount: Amount, handle: &str) -> Result<(), StorageError> {
        self.apply_delta(asset, address, amount, false, None, handle).await
    }

    async fn apply_delta(
        &mut self,
        asset: &str,
        address: &str,
        amount: Amount,
        debit: bool,
        expected_sequence: Option<i64>,
        handle: &str,
    ) -> Result<(), StorageError> {
        let table = account_table_name(address);
        validate_table_name(&table)?;

        let mut row = fetch_full_row(&mut self.tx, &table, address).await?;
        if let Some(expected) = expected_sequence {
            if row.sequence != expected {
                return Err(StorageError::SequenceConflict { address: address.to_string(), expected });
            }
        }

        let entry = row
            .balances
            .iter_mut()
            .find(|b| b.asset == asset)
            .ok_or_else(|| StorageError::AssetNotTrusted { address: address.to_string(), asset: asset.to_string() })?;

        entry.balance = if debit {
            entry
                .balance
                .checked_sub(&amount)
                .ok_or_else(|| StorageError::InsufficientFunds { address: address.to_string(), asset: asset.to_string() })?
        } else {
            entry
                .balance
                .checked_add(&amount)
                .ok_or_else(|| StorageError::BalanceOverflow { address: address.to_string(), asset: asset.to_string() })?
        };

        if debit {
            row.sequence += 1;
        }
        if !row.transactions.iter().any(|h| h == handle) {
            row.transactions.push(handle.to_string());
        }
        row.hash = recompute_hash(address, &row);

        sqlx::query(&format!("UPDATE `{table}` SET balances = ?, `sequence` = ?, transactions = ?, hash = ? WHERE address = ?"))
            .bind(serde_json::to_value(&row.balances).expect("balances always serialize"))
            .bind(row.sequence)
            .bind(serde_json::to_value(&row.transactions).expect("transactions always serialize"))
            .bind(&row.hash)
            .bind(address)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Bump `sequence` and append `handle` without touching `balances` - the
    /// faucet path's mutation of the finance account, which is debited for
    /// bookkeeping purposes only and never loses balance.
    pub async fn bump_sequence(&mut self, address: &str, expected_sequence: i64, handle: &str) -> Result<(), StorageError> {
        let table = account_table_name(address);
        validate_table_name(&table)?;
        let mut row = fetch_full_row(&mut self.tx, &table, address).await?;
        if row.sequence != expected_sequence {
            return Err(StorageError::SequenceConflict { address: address.to_string(), expected: expected_sequence });
        }
        row.sequence += 1;
        if !row.transactions.iter().any(|h| h == handle) {
            row.transactions.push(handle.to_string());
        }
        row.hash = recompute_hash(address, &row);

        sqlx::query(&format!("UPDATE `{table}` SET `sequence` = ?, transactions = ?, hash = ? WHERE address = ?"))
            .bind(row.sequence)
            .bind(serde_json::to_value(&row.transactions).expect("transactions always serialize"))
            .bind(&row.hash)
            .bind(address)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn insert_transaction(&mut self, table: &str, row: NewTransactionRow<'_>) -> Result<Transaction, StorageError> {
        validate_table_name(table)?;
        let is_bulk = row.op.is_some();
        let op_json = row.op.map(|legs| serde_json::to_value(legs).expect("legs always serialize"));
        let amount_decimal = row.amount.map(|a| a.inner());

        let result = sqlx::query(&format!(
            "INSERT INTO `{table}` (hash, asset, `from`, `to`, is_bulk, op, amount, from_sequence, is_success, memo, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?, ?)"
        ))
        .bind(row.handle)
        .bind(row.asset)
        .bind(row.from)
        .bind(row.to)
        .bind(is_bulk)
        .bind(op_json)
        .bind(amount_decimal)
        .bind(row.from_sequence)
        .bind(row.memo)
        .bind(row.created_at)
        .execute(&mut *self.tx)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(StorageError::DuplicateTransaction);
            }
            Err(e) => return Err(e.into()),
        };

        let id = result.last_insert_id() as i64;
        let inserted = sqlx::query(&format!(
            "SELECT id, hash, asset, `from`, `to`, amount, is_bulk, op, from_sequence, is_success, memo, created_at, updated_at \
             FROM `{table}` WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;
        transaction_from_row(&inserted)
    }

    pub async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await.map_err(Into::into)
    }
}

async fn fetch_full_row<'c>(
    executor: impl sqlx::Executor<'c, Database = MySql>,
    table: &str,
    address: &str,
) -> Result<AccountRowFull, StorageError> {
    validate_table_name(table)?;
    let row = sqlx::query(&format!(
        "SELECT sequence, secret, mnemonic, balances, transactions, hash FROM `{table}` WHERE address = ? FOR UPDATE"
    ))
    .bind(address)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| StorageError::AccountNotFound(address.to_string()))?;

    let balances_raw: serde_json::Value = row.try_get("balances")?;
    let transactions_raw: serde_json::Value = row.try_get("transactions")?;
    Ok(AccountRowFull {
        sequence: row.try_get("sequence")?,
        secret: row.try_get("secret")?,
        mnemonic: row.try_get("mnemonic")?,
        balances: serde_json::from_value(balances_raw).map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?,
        transactions: serde_json::from_value(transactions_raw)
            .map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?,
        hash: row.try_get("hash")?,
    })
}

/// Recompute an account's integrity hash from its current fields and compare
/// against the stored one. `secret`/`mnemonic` never leave this function;
/// the public `Account` DTO does not carry them.
fn verify_account_row(account: &Account, secret: &str, mnemonic: Option<&str>) -> Result<(), StorageError> {
    let balances: Vec<BalanceRaw> =
        account.balances.iter().map(|b| BalanceRaw { asset: b.asset.clone(), balance: b.balance.canonical_string() }).collect();
    verify_account_hash(account.address.as_str(), account.sequence, secret, &balances, mnemonic, &account.transactions)
        .map_err(|_| StorageError::InvalidAccount(account.address.to_string()))
}

/// Recompute a transaction's content hash from its stored fields and compare
/// against the hash embedded in its handle.
fn verify_transaction_row(txn: &Transaction) -> Result<(), StorageError> {
    let (origin_hash, origin_ts) =
        ledgerd_hash::parse_handle(&txn.hash).map_err(|_| StorageError::InvalidTransaction(txn.hash.clone()))?;

    let raw = if let Some(legs) = &txn.op {
        let op: Vec<OpLeg> = legs
            .iter()
            .map(|leg| OpLeg {
                from: leg.from.to_string(),
                to: leg.to.to_string(),
                asset: leg.asset.clone(),
                amount: leg.amount.canonical_string(),
            })
            .collect();
        TxnRaw::bulk(txn.from.to_string(), txn.from_sequence, origin_ts, op)
    } else {
        let to = txn.to.as_ref().ok_or_else(|| StorageError::InvalidTransaction(txn.hash.clone()))?;
        let asset = txn.asset.as_deref().ok_or_else(|| StorageError::InvalidTransaction(txn.hash.clone()))?;
        let amount = txn.amount.ok_or_else(|| StorageError::InvalidTransaction(txn.hash.clone()))?;
        TxnRaw::single(asset, txn.from.to_string(), to.to_string(), amount.canonical_string(), txn.from_sequence, origin_ts)
    };

    if raw.sha256_hex() != origin_hash {
        return Err(StorageError::InvalidTransaction(txn.hash.clone()));
    }
    Ok(())
}

fn recompute_hash(address: &str, row: &AccountRowFull) -> String {
    let balances: Vec<BalanceRaw> =
        row.balances.iter().map(|b| BalanceRaw { asset: b.asset.clone(), balance: b.balance.canonical_string() }).collect();
    account_hash(address, row.sequence, &row.secret, &balances, row.mnemonic.as_deref(), &row.transactions)
}

fn account_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Account, StorageError> {
    let raw_balances: serde_json::Value = row.try_get("balances")?;
    let balances: Vec<Balance> =
        serde_json::from_value(raw_balances).map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;
    let raw_transactions: serde_json::Value = row.try_get("transactions")?;
    let transactions: Vec<String> =
        serde_json::from_value(raw_transactions).map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;
    let address_str: String = row.try_get("address")?;
    let address = Address::new(address_str).map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;

    Ok(Account {
        address,
        sequence: row.try_get("sequence")?,
        balances,
        transactions,
        hash: row.try_get("hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use ledgerd_hash::account_hash;

    use super::*;

    /// Connects to `TEST_DATABASE_URL` if set, otherwise skips - these tests
    /// need a live MySQL-compatible instance and aren't run in environments
    /// without one.
    async fn test_storage() -> Option<Storage> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            tracing::warn!("TEST_DATABASE_URL not set, skipping storage integration test");
            return None;
        };
        let pool = MySqlPoolOptions::new().max_connections(2).connect(&url).await.expect("connect to test database");
        Some(Storage::from_pool(pool))
    }

    async fn seed_account(storage: &Storage, address: &str) {
        let hash = account_hash(address, 0, "secret", &[], Some("test mnemonic"), &[]);
        storage
            .insert_account(&NewAccountRow {
                address: address.to_string(),
                secret_encrypted: "secret".to_string(),
                mnemonic: "test mnemonic".to_string(),
                hash,
            })
            .await
            .expect("insert seed account");
    }

    #[tokio::test]
    async fn trust_asset_is_a_noop_when_already_trusted() {
        let Some(storage) = test_storage().await else { return };
        let address = format!("Atest{}", uuid::Uuid::new_v4().simple());
        seed_account(&storage, &address).await;

        let account = storage.trust_asset(&address, &["BTC".to_string()], 0).await.expect("first trust appends BTC");
        assert_eq!(account.sequence, 1);
        assert!(account.trusts("BTC"));

        let account =
            storage.trust_asset(&address, &["BTC".to_string()], 1).await.expect("re-trusting BTC is a no-op");
        assert_eq!(account.sequence, 1, "sequence must not bump when no balance was appended");
        assert_eq!(account.balances.len(), 1);
    }

    #[tokio::test]
    async fn trust_asset_applies_mixed_csv_atomically() {
        let Some(storage) = test_storage().await else { return };
        let address = format!("Atest{}", uuid::Uuid::new_v4().simple());
        seed_account(&storage, &address).await;

        let account = storage.trust_asset(&address, &["BTC".to_string()], 0).await.expect("seed BTC");
        assert_eq!(account.sequence, 1);

        let account = storage
            .trust_asset(&address, &["BTC".to_string(), "ETH".to_string()], 1)
            .await
            .expect("BTC already trusted, ETH newly trusted");
        assert_eq!(account.sequence, 2, "only the ETH leg should bump sequence");
        assert!(account.trusts("BTC"));
        assert!(account.trusts("ETH"));
    }
}

fn transaction_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Transaction, StorageError> {
    let from_str: String = row.try_get("from")?;
    let from = Address::new(from_str).map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;
    let to: Option<String> = row.try_get("to")?;
    let to = to.map(Address::new).transpose().map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;

    let op_raw: Option<serde_json::Value> = row.try_get("op")?;
    let op: Option<Vec<BulkLeg>> =
        op_raw.map(serde_json::from_value).transpose().map_err(|e| StorageError::Database(sqlx::Error::Decode(Box::new(e))))?;

    let amount_decimal: Option<rust_decimal::Decimal> = row.try_get("amount")?;

    Ok(Transaction {
        id: row.try_get("id")?,
        hash: row.try_get("hash")?,
        asset: row.try_get("asset")?,
        from,
        to,
        amount: amount_decimal.map(Amount::from_decimal),
        is_bulk: row.try_get("is_bulk")?,
        op,
        from_sequence: row.try_get("from_sequence")?,
        is_success: row.try_get("is_success")?,
        memo: row.try_get("memo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
