pub mod account_hash;
pub mod canonical;
pub mod error;
pub mod handle;

pub use account_hash::{account_hash, verify_account_hash};
pub use canonical::{AccountRaw, BalanceRaw, OpLeg, TxnRaw};
pub use error::HashError;
pub use handle::{build_handle, parse_handle, verify_handle};
