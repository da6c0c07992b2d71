use bip39::Mnemonic;
use blake2::Blake2s256;
use blake2::Digest;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::RngCore;
use rand::rngs::OsRng;

use ledgerd_types::Address;

use crate::error::CryptoError;

/// Address version byte, matching the original address scheme's leading
/// `0x17` marker byte ahead of the checksum.
const VERSION_BYTE: u8 = 0x17;

/// A freshly minted keypair plus the recovery phrase handed to the caller
/// exactly once, at account-creation time.
pub struct GeneratedKeypair {
    pub signing_key: SigningKey,
    pub address: Address,
    pub mnemonic: String,
    /// Hex-encoded private key scalar - this is the plaintext that gets
    /// AES-encrypted into `Account.secret`.
    pub secret_hex: String,
}

fn derive_address(verifying_key: &VerifyingKey) -> Result<Address, CryptoError> {
    let encoded = verifying_key.to_encoded_point(false);
    let pubkey_bytes = &encoded.as_bytes()[1..]; // drop the 0x04 SEC1 prefix

    let mut hasher = Blake2s256::new();
    hasher.update(pubkey_bytes);
    let digest = hasher.finalize();

    let mut primitive = Vec::with_capacity(21);
    primitive.push(VERSION_BYTE);
    primitive.extend_from_slice(&digest[digest.len() - 20..]);

    let encoded = bs58::encode(&primitive).with_check().into_string();
    Address::new(encoded).map_err(|e| CryptoError::AddressDerivation(e.to_string()))
}

/// Generate a new keypair and mnemonic, retrying until the derived address
/// starts with `'A'` - a cosmetic convention carried over from the original
/// address generator.
pub fn generate() -> Result<GeneratedKeypair, CryptoError> {
    loop {
        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy);

        let signing_key = SigningKey::from_bytes((&entropy).into())
            .map_err(|e| CryptoError::AddressDerivation(e.to_string()))?;
        let verifying_key = VerifyingKey::from(&signing_key);

        let address = derive_address(&verifying_key)?;
        if !address.as_str().starts_with('A') {
            continue;
        }

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| CryptoError::Mnemonic(e.to_string()))?
            .to_string();

        return Ok(GeneratedKeypair {
            signing_key,
            address,
            mnemonic,
            secret_hex: hex::encode(entropy),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_address_starting_with_a() {
        let kp = generate().unwrap();
        assert!(kp.address.as_str().starts_with('A'));
        assert_eq!(kp.secret_hex.len(), 64);
        assert!(!kp.mnemonic.is_empty());
    }

    #[test]
    fn same_entropy_yields_same_address() {
        let a = generate().unwrap();
        let b = generate().unwrap();
        assert_ne!(a.address, b.address);
    }
}
