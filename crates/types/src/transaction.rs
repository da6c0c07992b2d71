use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// A single posted transfer (or the header row of a bulk transfer), as
/// persisted in a monthly `Transaction__YYYY_MM` partition and returned to
/// callers.
///
/// `asset`/`to`/`amount` are only populated for single-leg transfers; a
/// bulk transfer instead carries `is_bulk = true` and its legs in `op`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal row id (never exposed as the public handle).
    pub id: i64,
    /// The 74-character handle produced by the hash codec.
    pub hash: String,
    pub asset: Option<String>,
    pub from: Address,
    pub to: Option<Address>,
    pub amount: Option<Amount>,
    pub is_bulk: bool,
    pub op: Option<Vec<BulkLeg>>,
    pub from_sequence: i64,
    pub is_success: bool,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One leg of a bulk transfer request: move `amount` of `asset` from `from`
/// to `to`. `from` need not equal the bulk request's top-level submitter -
/// only at least one leg must have the submitter as its `from` or `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLeg {
    pub from: Address,
    pub to: Address,
    pub asset: String,
    pub amount: Amount,
}

/// Pagination order for `list_account_transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CursorDirection {
    Asc,
    Desc,
}

impl Default for CursorDirection {
    fn default() -> Self {
        Self::Desc
    }
}

/// Default page size for transaction listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 30;
