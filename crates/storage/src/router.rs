use blake2::Blake2s256;
use blake2::Digest;
use chrono::{Local, TimeZone};

use crate::error::StorageError;

/// Number of account shards. Every address maps deterministically onto one
/// of `Account__1` .. `Account__5`, so an address never needs to move
/// between shards once created.
pub const ACCOUNT_SHARD_COUNT: u64 = 5;

/// Which `Account__N` shard an address belongs to: `BLAKE2s-256(address) mod
/// N + 1`, `1`-indexed to match the original's `Arrow`-style partition
/// naming convention of never emitting a zero suffix.
pub fn account_shard(address: &str) -> u64 {
    let mut hasher = Blake2s256::new();
    hasher.update(address.as_bytes());
    let digest = hasher.finalize();
    let n = u64::from_be_bytes(digest[0..8].try_into().expect("digest is 32 bytes"));
    n % ACCOUNT_SHARD_COUNT + 1
}

pub fn account_table_name(address: &str) -> String {
    format!("Account__{}", account_shard(address))
}

/// Which monthly `Transaction__YYYY_MM` partition a handle's embedded
/// timestamp falls into, interpreted in local time as the original does via
/// `Arrow.fromtimestamp(ts)`.
pub fn transaction_table_name(unix_timestamp: i64) -> Result<String, StorageError> {
    let dt = Local
        .timestamp_opt(unix_timestamp, 0)
        .single()
        .ok_or_else(|| StorageError::InvalidTableName(format!("bad timestamp {unix_timestamp}")))?;
    Ok(format!("Transaction__{}", dt.format("%Y_%m")))
}

/// Table names are always produced by `account_table_name`/
/// `transaction_table_name` above, but every call site that interpolates a
/// table name into raw SQL re-validates it against this allowlist shape
/// first, so a malformed or attacker-influenced name can never reach a
/// query string.
pub fn validate_table_name(name: &str) -> Result<(), StorageError> {
    let is_account_shard = name.strip_prefix("Account__").is_some_and(|suffix| {
        suffix.parse::<u64>().is_ok_and(|n| (1..=ACCOUNT_SHARD_COUNT).contains(&n))
    });
    let is_txn_partition = name.strip_prefix("Transaction__").is_some_and(|suffix| {
        suffix.len() == 7
            && suffix.as_bytes()[4] == b'_'
            && suffix[0..4].chars().all(|c| c.is_ascii_digit())
            && suffix[5..7].chars().all(|c| c.is_ascii_digit())
    });

    if is_account_shard || is_txn_partition {
        Ok(())
    } else {
        Err(StorageError::InvalidTableName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_is_stable_and_in_range() {
        let shard = account_shard("some-address");
        assert!((1..=ACCOUNT_SHARD_COUNT).contains(&shard));
        assert_eq!(shard, account_shard("some-address"));
    }

    #[test]
    fn transaction_table_name_formats_year_month() {
        // 2025-03-15T00:00:00Z
        let name = transaction_table_name(1_742_000_000).unwrap();
        assert!(name.starts_with("Transaction__"));
        assert_eq!(name.len(), "Transaction__2025_03".len());
    }

    #[test]
    fn validate_table_name_rejects_foreign_names() {
        assert!(validate_table_name("Account__1").is_ok());
        assert!(validate_table_name("Account__6").is_err());
        assert!(validate_table_name("Transaction__2025_03").is_ok());
        assert!(validate_table_name("Account__1; DROP TABLE Account__1").is_err());
    }
}
