use thiserror::Error;

/// Errors raised constructing or parsing the core value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl TypesError {
    #[must_use]
    pub const fn is_address_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_))
    }

    #[must_use]
    pub const fn is_amount_error(&self) -> bool {
        matches!(self, Self::InvalidAmount(_))
    }
}
