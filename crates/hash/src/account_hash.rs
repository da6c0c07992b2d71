use blake2::Blake2s256;
use blake2::Digest;

use crate::canonical::{AccountRaw, BalanceRaw};
use crate::error::HashError;

/// Rotation applied to the hex digest before it is stored as `Account.hash`
/// - a lightweight obfuscation so the stored value isn't a raw, directly
/// recognizable BLAKE2s digest, matching the `hash_` / `to_json` selective
/// exposure story (spec §4.8): the rotated form is what travels over the
/// wire, the verifier un-rotates it before comparing.
pub const ROTATE_K: usize = 20;

fn rotate_left(s: &str, k: usize) -> String {
    let k = k % s.len();
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[k..]);
    out.push_str(&s[..k]);
    out
}

fn rotate_right(s: &str, k: usize) -> String {
    let k = k % s.len();
    rotate_left(s, s.len() - k)
}

/// Compute the integrity hash stored alongside an account: BLAKE2s-256 over
/// the canonical `{address, sequence, secret, balances, mnemonic,
/// transactions}` projection, hex-encoded and left-rotated by `ROTATE_K`.
pub fn account_hash(
    address: &str,
    sequence: i64,
    secret: &str,
    balances: &[BalanceRaw],
    mnemonic: Option<&str>,
    transactions: &[String],
) -> String {
    let raw = AccountRaw::new(
        address,
        sequence,
        secret,
        balances.to_vec(),
        mnemonic.map(str::to_string),
        transactions.to_vec(),
    );
    let mut hasher = Blake2s256::new();
    hasher.update(raw.canonical_bytes());
    let digest_hex = hex::encode(hasher.finalize());
    rotate_left(&digest_hex, ROTATE_K)
}

/// Recompute the integrity hash for the given fields and compare it against
/// the stored `hash` value.
pub fn verify_account_hash(
    address: &str,
    sequence: i64,
    secret: &str,
    balances: &[BalanceRaw],
    mnemonic: Option<&str>,
    transactions: &[String],
    stored_hash: &str,
) -> Result<(), HashError> {
    let expected = account_hash(address, sequence, secret, balances, mnemonic, transactions);
    if expected == stored_hash {
        Ok(())
    } else {
        Err(HashError::Mismatch)
    }
}

/// Recover the plain (un-rotated) digest from a stored `hash` value, for
/// diagnostics.
pub fn unrotate(stored_hash: &str) -> String {
    rotate_right(stored_hash, ROTATE_K)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_balances() -> Vec<BalanceRaw> {
        vec![BalanceRaw { asset: "USDC".into(), balance: "10.0000000".into() }]
    }

    #[test]
    fn round_trips_rotation() {
        let hash = account_hash("addr1", 3, "ciphertext", &sample_balances(), None, &[]);
        assert_eq!(hash.len(), 64);
        let plain = unrotate(&hash);
        assert_eq!(rotate_left(&plain, ROTATE_K), hash);
    }

    #[test]
    fn verify_detects_tamper() {
        let balances = sample_balances();
        let hash = account_hash("addr1", 3, "ciphertext", &balances, None, &[]);
        assert!(verify_account_hash("addr1", 3, "ciphertext", &balances, None, &[], &hash).is_ok());
        assert!(verify_account_hash("addr1", 4, "ciphertext", &balances, None, &[], &hash).is_err());
    }

    #[test]
    fn mnemonic_and_transactions_affect_hash() {
        let balances = sample_balances();
        let base = account_hash("addr1", 3, "ciphertext", &balances, None, &[]);
        let with_mnemonic = account_hash("addr1", 3, "ciphertext", &balances, Some("seed phrase"), &[]);
        let with_txn = account_hash("addr1", 3, "ciphertext", &balances, None, &["handle1".to_string()]);
        assert_ne!(base, with_mnemonic);
        assert_ne!(base, with_txn);
    }
}
