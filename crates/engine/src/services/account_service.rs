use ledgerd_crypto::{generate, SecretCipher};
use ledgerd_hash::account_hash;
use ledgerd_storage::{NewAccountRow, Storage};
use ledgerd_types::{Account, NewAccount};

use crate::error::LedgerError;

/// Account lifecycle operations that don't belong to the transfer state
/// machine: creation and asset trust.
pub struct AccountService {
    storage: Storage,
    cipher: SecretCipher,
}

impl AccountService {
    pub fn new(storage: Storage, cipher: SecretCipher) -> Self {
        Self { storage, cipher }
    }

    /// Generate a keypair and mnemonic, encrypt the private key, and insert
    /// a fresh account row with a zero sequence and empty balances/
    /// transactions. The plaintext secret and mnemonic are returned once and
    /// never stored or surfaced again.
    pub async fn create_account(&self) -> Result<NewAccount, LedgerError> {
        let keypair = generate()?;
        let secret_encrypted = self.cipher.encrypt(&keypair.secret_hex);
        let hash = account_hash(keypair.address.as_str(), 0, &secret_encrypted, &[], Some(keypair.mnemonic.as_str()), &[]);

        let new_row = NewAccountRow {
            address: keypair.address.as_str().to_string(),
            secret_encrypted,
            mnemonic: keypair.mnemonic.clone(),
            hash: hash.clone(),
        };
        self.storage.insert_account(&new_row).await?;

        Ok(NewAccount { address: keypair.address, secret: keypair.secret_hex, mnemonic: keypair.mnemonic, hash })
    }

    /// Trust every asset in a comma-separated list as one atomic unit: all
    /// legs not already trusted are appended within a single transaction, so
    /// an error partway through never leaves only some of the requested
    /// assets trusted. Bumps the account's sequence once per newly trusted
    /// asset.
    pub async fn trust_asset(&self, address: &str, assets_csv: &str) -> Result<Account, LedgerError> {
        let account =
            self.storage.get_account(address).await?.ok_or_else(|| LedgerError::AddressNotFound(address.to_string()))?;

        let assets: Vec<String> = assets_csv.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
        if assets.is_empty() {
            return Ok(account);
        }

        Ok(self.storage.trust_asset(address, &assets, account.sequence).await?)
    }
}
