pub mod account;
pub mod address;
pub mod amount;
pub mod error;
pub mod transaction;

pub use account::{Account, Balance, NewAccount};
pub use address::Address;
pub use amount::Amount;
pub use error::TypesError;
pub use transaction::{BulkLeg, CursorDirection, Transaction, DEFAULT_PAGE_LIMIT};
