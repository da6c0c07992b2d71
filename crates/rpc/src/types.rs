use ledgerd_types::{Amount, Balance, BulkLeg, CursorDirection};
use serde::{Deserialize, Serialize};

/// `POST /v1/accounts/{addr}/asset` - form field `asset` is a CSV list of
/// assets to trust.
#[derive(Debug, Deserialize)]
pub struct TrustAssetForm {
    pub asset: String,
}

/// `GET /v1/accounts/{addr}/transactions` query string.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub cursor: Option<String>,
    #[serde(default)]
    pub order: CursorDirection,
    pub limit: Option<i64>,
}

/// `POST /v1/transactions/hash` and `POST /v1/transactions/` - single
/// transfer, submitted as `application/x-www-form-urlencoded`.
#[derive(Debug, Deserialize)]
pub struct SingleTransferForm {
    pub from: String,
    pub to: String,
    pub asset: String,
    pub amount: String,
    pub from_sequence: i64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// `POST /v1/transactions/bulk/hash` and `POST /v1/transactions/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkTransferJson {
    pub op: Vec<BulkLegJson>,
    pub from: String,
    pub from_sequence: i64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkLegJson {
    pub from: String,
    pub to: String,
    pub asset: String,
    pub amount: String,
}

/// `POST /v1/faucet/`.
#[derive(Debug, Deserialize)]
pub struct FaucetForm {
    pub to: String,
    pub asset: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct HashResponse {
    pub hash: String,
}

#[derive(Debug, Serialize)]
pub struct SequenceResponse {
    pub sequence: i64,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub balances: Vec<Balance>,
}

pub(crate) fn bulk_legs_from_json(legs: Vec<BulkLegJson>) -> Result<Vec<BulkLeg>, crate::error::RpcError> {
    use ledgerd_engine::LedgerError;
    use ledgerd_types::Address;

    legs.into_iter()
        .map(|leg| {
            let from = Address::new(leg.from).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
            let to = Address::new(leg.to).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
            let amount = Amount::parse_strict(&leg.amount).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()))?;
            Ok(BulkLeg { from, to, asset: leg.asset, amount })
        })
        .collect::<Result<Vec<_>, LedgerError>>()
        .map_err(Into::into)
}
