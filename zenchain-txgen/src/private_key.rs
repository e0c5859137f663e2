use std::{fmt, str::FromStr};

use alloy_consensus::SignableTransaction;
use alloy_primitives::{hex::FromHexError, Address, PrimitiveSignature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("private key is not 32 bytes of hex: {0}")]
    InvalidHex(#[from] FromHexError),

    #[error("private key is not a valid secp256k1 scalar")]
    OutOfRange,
}

/// secp256k1 signing key. Never prints key material.
#[derive(Clone)]
pub struct PrivateKey {
    signer: PrivateKeySigner,
}

impl PrivateKey {
    /// Parses a hex encoded key, with or without `0x`, and derives its address.
    pub fn parse(private_key: impl AsRef<str>) -> Result<(Address, Self), KeyError> {
        let pk = B256::from_str(private_key.as_ref().trim())?;
        Self::new_with_pk(pk)
    }

    /// Draws keys from `random` until one is a valid scalar.
    pub fn random(random: &mut (impl RngCore + CryptoRng)) -> (Address, Self) {
        loop {
            let mut bytes = [0u8; 32];
            random.fill_bytes(&mut bytes);

            // zero or >= curve order, roughly 2^-128 odds
            if let Ok(key) = Self::new_with_pk(B256::from(bytes)) {
                return key;
            }
        }
    }

    pub fn new_with_pk(pk: B256) -> Result<(Address, Self), KeyError> {
        let signer = PrivateKeySigner::from_bytes(&pk).map_err(|_| KeyError::OutOfRange)?;

        Ok((signer.address(), Self { signer }))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn sign_transaction(
        &self,
        transaction: &impl SignableTransaction<PrimitiveSignature>,
    ) -> Result<PrimitiveSignature, alloy_signer::Error> {
        self.signer.sign_hash_sync(&transaction.signature_hash())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
