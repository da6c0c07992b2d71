use serde::Serialize;
use sha2::{Digest, Sha256};

/// One leg of a bulk transfer as it appears inside a canonical `op` array -
/// field order (`from`, `to`, `asset`, `amount`) matches the bulk request
/// schema's declaration order, since that's the order the hash was first
/// computed over.
#[derive(Debug, Clone, Serialize)]
pub struct OpLeg {
    pub from: String,
    pub to: String,
    pub asset: String,
    pub amount: String,
}

/// The exact projection that gets hashed for a transfer, mirroring
/// `AMSCoreClass.build_txn_hash`'s `txn_raw` dict. Field order matters: it
/// is serialized with `serde_json`'s declaration-order, no-whitespace
/// output, equivalent to `json.dumps(txn_raw, separators=(',', ':'))`.
/// `asset`/`to`/`amount` serialize as JSON `null` (not omitted) for a bulk
/// transfer, matching the original passing `None` through unconditionally.
#[derive(Debug, Clone, Serialize)]
pub struct TxnRaw {
    pub asset: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub amount: Option<String>,
    pub from_sequence: i64,
    pub create_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<Vec<OpLeg>>,
}

impl TxnRaw {
    /// A single-leg transfer's raw projection.
    pub fn single(
        asset: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: impl Into<String>,
        from_sequence: i64,
        create_at: i64,
    ) -> Self {
        Self {
            asset: Some(asset.into()),
            from: from.into(),
            to: Some(to.into()),
            amount: Some(amount.into()),
            from_sequence,
            create_at,
            op: None,
        }
    }

    /// A bulk transfer's raw projection: `asset`/`to`/`amount` are absent at
    /// the top level, `op` carries the legs.
    pub fn bulk(from: impl Into<String>, from_sequence: i64, create_at: i64, op: Vec<OpLeg>) -> Self {
        Self {
            asset: None,
            from: from.into(),
            to: None,
            amount: None,
            from_sequence,
            create_at,
            op: Some(op),
        }
    }

    /// Canonical compact-JSON bytes used as the hash preimage.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("TxnRaw always serializes")
    }

    /// sha256 hex digest of the canonical bytes - the `content_hash` half of
    /// the public handle.
    pub fn sha256_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A `{asset, balance}` entry inside the canonical account projection -
/// mirrors the shape actually stored in the `balances` JSON column, so the
/// integrity hash is computed over exactly what's on disk.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceRaw {
    pub asset: String,
    pub balance: String,
}

/// The projection hashed to produce an account's integrity `hash` column:
/// `{address, sequence, secret, balances, mnemonic, transactions}`, in that
/// declaration order, per the account-hash scheme.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRaw {
    pub address: String,
    pub sequence: i64,
    pub secret: String,
    pub balances: Vec<BalanceRaw>,
    pub mnemonic: Option<String>,
    pub transactions: Vec<String>,
}

impl AccountRaw {
    pub fn new(
        address: impl Into<String>,
        sequence: i64,
        secret: impl Into<String>,
        balances: Vec<BalanceRaw>,
        mnemonic: Option<String>,
        transactions: Vec<String>,
    ) -> Self {
        Self {
            address: address.into(),
            sequence,
            secret: secret.into(),
            balances,
            mnemonic,
            transactions,
        }
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("AccountRaw always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_txn_raw_serializes_in_declared_field_order() {
        let raw = TxnRaw::single("USDC", "A1", "A2", "10.0000000", 3, 1_753_000_000);
        let json = String::from_utf8(raw.canonical_bytes()).unwrap();
        assert_eq!(
            json,
            r#"{"asset":"USDC","from":"A1","to":"A2","amount":"10.0000000","from_sequence":3,"create_at":1753000000}"#
        );
    }

    #[test]
    fn bulk_txn_raw_nulls_scalar_fields_and_includes_op() {
        let raw = TxnRaw::bulk(
            "A1",
            3,
            1_753_000_000,
            vec![OpLeg { from: "A1".into(), to: "A2".into(), asset: "USDC".into(), amount: "1".into() }],
        );
        let json = String::from_utf8(raw.canonical_bytes()).unwrap();
        assert_eq!(
            json,
            r#"{"asset":null,"from":"A1","to":null,"amount":null,"from_sequence":3,"create_at":1753000000,"op":[{"from":"A1","to":"A2","asset":"USDC","amount":"1"}]}"#
        );
    }
}
