use thiserror::Error;

/// Errors raised by key generation, address derivation, and the secret
/// encryption oracle.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("mnemonic generation failed: {0}")]
    Mnemonic(String),

    #[error("address derivation failed: {0}")]
    AddressDerivation(String),

    #[error("secret encryption failed: {0}")]
    Encrypt(String),

    #[error("secret decryption failed: {0}")]
    Decrypt(String),
}
