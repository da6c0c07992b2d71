use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Maximum length of an account address, matching the `Account.address`
/// column (`VARCHAR(56)`).
pub const MAX_ADDRESS_LEN: usize = 56;

/// A base58check-encoded account address.
///
/// `Address` is an opaque, validated string wrapper rather than a byte array:
/// the wire format (and the address-derivation scheme behind it) is treated
/// as an oracle by the rest of the system - only length and charset are
/// checked here, derivation lives in `ledgerd-crypto`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a string as an `Address`, rejecting anything too long for the
    /// storage column or containing non-base58 characters.
    pub fn new(s: impl Into<String>) -> Result<Self, TypesError> {
        let s = s.into();
        if s.is_empty() || s.len() > MAX_ADDRESS_LEN {
            return Err(TypesError::InvalidAddress(s));
        }
        if !s.bytes().all(is_base58_byte) {
            return Err(TypesError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_base58_byte(b: u8) -> bool {
    const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
    ALPHABET.contains(&b)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_address() {
        let addr = Address::new("ADxyzTestAddress1234567890abcdefghijkl").unwrap();
        assert_eq!(addr.as_str(), "ADxyzTestAddress1234567890abcdefghijkl");
    }

    #[test]
    fn rejects_empty() {
        assert!(Address::new("").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let s = "A".repeat(MAX_ADDRESS_LEN + 1);
        assert!(Address::new(s).is_err());
    }

    #[test]
    fn rejects_non_base58_chars() {
        // '0', 'O', 'I', 'l' are excluded from the base58 alphabet.
        assert!(Address::new("A0address").is_err());
        assert!(Address::new("AOaddress").is_err());
    }
}
