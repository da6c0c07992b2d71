use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// AES-256-CBC/PKCS7 oracle over the account secret, mirroring
/// `AMSCrypt.aes_encrypt`/`aes_decrypt`: a single process-wide key and IV,
/// read once from configuration, base64-encoded ciphertext at rest.
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl SecretCipher {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_LEN] = key
            .try_into()
            .map_err(|_| CryptoError::Encrypt(format!("AES key must be {KEY_LEN} bytes")))?;
        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| CryptoError::Encrypt(format!("AES IV must be {IV_LEN} bytes")))?;
        Ok(Self { key, iv })
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        let ciphertext =
            Aes256CbcEnc::new(&self.key.into(), &self.iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        BASE64.encode(ciphertext)
    }

    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String, CryptoError> {
        let ciphertext = BASE64
            .decode(ciphertext_b64)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Decrypt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> SecretCipher {
        SecretCipher::new(&[7u8; KEY_LEN], &[9u8; IV_LEN]).unwrap()
    }

    #[test]
    fn round_trips_secret() {
        let c = cipher();
        let secret = "deadbeef".repeat(8);
        let encrypted = c.encrypt(&secret);
        assert_ne!(encrypted, secret);
        assert_eq!(c.decrypt(&encrypted).unwrap(), secret);
    }

    #[test]
    fn rejects_bad_key_length() {
        assert!(SecretCipher::new(&[0u8; 10], &[0u8; IV_LEN]).is_err());
    }
}
