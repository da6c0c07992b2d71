use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// A single asset entry inside `Account.balances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub balance: Amount,
}

/// An account row, as returned to callers.
///
/// `secret` is deliberately absent here - it only ever appears on the
/// one-shot creation response (`NewAccount` below). `mnemonic` is likewise
/// only attached at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub sequence: i64,
    pub balances: Vec<Balance>,
    /// Handles of every transaction this account has participated in, in
    /// the order they were appended - part of the integrity hash, per §3.
    pub transactions: Vec<String>,
    pub hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn balance_of(&self, asset: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.asset == asset)
    }

    pub fn trusts(&self, asset: &str) -> bool {
        self.balance_of(asset).is_some()
    }
}

/// Response returned exactly once, at account-creation time: the only
/// moment the plaintext secret and mnemonic are ever exposed (spec §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub address: Address,
    pub secret: String,
    pub mnemonic: String,
    pub hash: String,
}
