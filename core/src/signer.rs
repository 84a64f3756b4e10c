/// Signing abstraction that decouples transfer signing from a concrete key type.
use iota_sdk::crypto::ed25519::{Ed25519PrivateKey, Ed25519VerifyingKey};
use iota_sdk::crypto::{IotaSigner, IotaVerifier};
use iota_sdk::types::{Address, PersonalMessage, SimpleSignature, UserSignature};

use crate::error::{Result, WalletError};
use crate::transfer::{SignedTransfer, UnsignedTransfer};

pub trait Signer: Send + Sync {
    /// Encode and sign a transfer.
    fn sign_transfer(&self, transfer: &UnsignedTransfer) -> Result<SignedTransfer>;

    /// The on-chain address controlled by this signer.
    fn address(&self) -> &Address;
}

/// Check a signed transfer's signature against its embedded public key.
/// Returns `Ok(false)` if the signature doesn't match the payload.
pub fn verify_transfer(signed: &SignedTransfer) -> Result<bool> {
    let sig_array: [u8; 64] = signed.signature.as_slice().try_into().map_err(|_| {
        WalletError::Validation(format!(
            "Signature must be 64 bytes, got {}",
            signed.signature.len()
        ))
    })?;
    let pk_array: [u8; 32] = signed.public_key.as_slice().try_into().map_err(|_| {
        WalletError::Validation(format!(
            "Public key must be 32 bytes, got {}",
            signed.public_key.len()
        ))
    })?;

    let signature = iota_sdk::types::Ed25519Signature::new(sig_array);
    let public_key = iota_sdk::types::Ed25519PublicKey::new(pk_array);

    let user_sig = UserSignature::Simple(SimpleSignature::Ed25519 {
        signature,
        public_key: public_key.clone(),
    });
    let message = PersonalMessage(signed.payload.as_slice().into());

    let verifier = Ed25519VerifyingKey::new(&public_key)
        .map_err(|e| WalletError::Validation(format!("Invalid public key: {e}")))?;

    Ok(verifier.verify_personal_message(&message, &user_sig).is_ok())
}

/// Software signer backed by an in-memory Ed25519 private key.
pub struct SoftwareSigner {
    private_key: Ed25519PrivateKey,
    address: Address,
}

impl std::fmt::Debug for SoftwareSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl SoftwareSigner {
    pub fn new(private_key: Ed25519PrivateKey) -> Self {
        let address = private_key.public_key().derive_address();
        Self {
            private_key,
            address,
        }
    }
}

impl Signer for SoftwareSigner {
    fn sign_transfer(&self, transfer: &UnsignedTransfer) -> Result<SignedTransfer> {
        let payload = transfer.to_bytes()?;
        let user_sig = self
            .private_key
            .sign_personal_message(&PersonalMessage(payload.as_slice().into()))
            .map_err(|e| WalletError::Signing(format!("Failed to sign transfer: {e}")))?;

        let (signature, public_key) = match &user_sig {
            UserSignature::Simple(SimpleSignature::Ed25519 {
                signature,
                public_key,
            }) => {
                let sig: &[u8; 64] = signature.as_ref();
                let pk: &[u8; 32] = public_key.as_ref();
                (sig.to_vec(), pk.to_vec())
            }
            _ => {
                return Err(WalletError::Signing(
                    "Unexpected signature type from Ed25519 key".into(),
                ))
            }
        };

        Ok(SignedTransfer {
            payload,
            signature,
            public_key,
        })
    }

    fn address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::KIND_TRANSFER;
    use crate::wallet::tests::TEST_MNEMONIC;
    use crate::wallet::{NetworkConfig, Wallet};

    fn test_signer(index: usize) -> SoftwareSigner {
        Wallet::from_mnemonic(TEST_MNEMONIC, 2, NetworkConfig::default())
            .unwrap()
            .signer(index)
            .unwrap()
    }

    fn transfer(nonce: u64) -> UnsignedTransfer {
        UnsignedTransfer {
            network_id: 1,
            kind: KIND_TRANSFER,
            recipient: "0x01".into(),
            amount: 1_000_000_000,
            fee: 5_000_000,
            nonce,
            timestamp_ms: 1_700_000_000_000,
            memo: Vec::new(),
        }
    }

    #[test]
    fn debug_hides_private_key() {
        let signer = test_signer(0);
        let out = format!("{signer:?}");
        assert!(out.starts_with("SoftwareSigner"));
        assert!(out.contains(".."));
        assert!(!out.contains("private_key"));
    }

    #[test]
    fn sign_verify_round_trip() {
        let signer = test_signer(0);
        let signed = signer.sign_transfer(&transfer(5)).unwrap();
        assert_eq!(signed.signature.len(), 64);
        assert_eq!(signed.public_key.len(), 32);
        assert_eq!(signed.transfer().unwrap().nonce, 5);
        assert!(verify_transfer(&signed).unwrap());
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let signer = test_signer(0);
        let mut signed = signer.sign_transfer(&transfer(5)).unwrap();
        signed.payload = transfer(6).to_bytes().unwrap();
        assert!(!verify_transfer(&signed).unwrap());
    }

    #[test]
    fn wrong_public_key_fails_verification() {
        let signed0 = test_signer(0).sign_transfer(&transfer(1)).unwrap();
        let signed1 = test_signer(1).sign_transfer(&transfer(1)).unwrap();
        let forged = SignedTransfer {
            public_key: signed1.public_key,
            ..signed0
        };
        assert!(!verify_transfer(&forged).unwrap());
    }

    #[test]
    fn short_signature_is_an_error() {
        let mut signed = test_signer(0).sign_transfer(&transfer(1)).unwrap();
        signed.signature.truncate(10);
        assert!(verify_transfer(&signed).is_err());
    }
}
