//! Recoverable signature envelopes.
//!
//! A relayed transaction is authorized by its signer but submitted by an
//! arbitrary relayer, so the relay must recover the signing account from
//! the signature itself rather than trust the submitter. Ed25519 cannot
//! recover public keys from signatures, so the envelope carries the
//! claimed verifying key alongside the signature: recovery verifies the
//! signature over the digest and, only on success, derives the account
//! address from that key. Any tampering with the digest, the signature or
//! the key makes recovery fail.

use entrada_types::Address;
use serde::{Deserialize, Serialize};

use crate::ed25519::{Signature, SigningKey, VerifyingKey};
use crate::Result;

/// A signature envelope from which the signer's address can be recovered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    /// The signer's verifying key.
    pub verifying_key: VerifyingKey,
    /// Ed25519 signature over the 32-byte digest.
    pub signature: Signature,
}

impl RecoverableSignature {
    /// Sign a digest, producing a recoverable envelope.
    pub fn sign(signing_key: &SigningKey, digest: &[u8; 32]) -> RecoverableSignature {
        RecoverableSignature {
            verifying_key: signing_key.verifying_key(),
            signature: signing_key.sign(digest),
        }
    }

    /// Recover the signer's account address from a digest.
    ///
    /// # Errors
    ///
    /// [`CryptoError::SignatureVerification`](crate::CryptoError::SignatureVerification)
    /// if the signature does not verify over `digest` under the enclosed key.
    pub fn recover_address(&self, digest: &[u8; 32]) -> Result<Address> {
        self.verifying_key.verify(digest, &self.signature)?;
        Ok(self.verifying_key.address())
    }
}
