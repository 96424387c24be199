use crate::address::TronAddress;
use crate::error::{Error, Result};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

/// Length of a recoverable `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

/// Anything that can sign a transaction id.
///
/// Multi-signing is an ordered slice of signers; each one appends its own signature.
pub trait Signer: Send + Sync {
    fn address(&self) -> TronAddress;

    /// Signs a 32-byte digest, returning `r || s || v` with `v` in `{27, 28}`.
    fn sign(&self, hash: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]>;
}

/// Local secp256k1 key.
#[derive(Clone)]
pub struct TronWallet {
    key: SigningKey,
    address: TronAddress,
}

impl TronWallet {
    pub fn new(private_key: [u8; 32]) -> Result<Self> {
        let key = SigningKey::from_slice(&private_key)
            .map_err(|e| Error::InvalidParameter(format!("private key: {e}")))?;
        let address = TronAddress::from_public_key(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Accepts 64 hex chars, with or without `0x`.
    pub fn from_hex(private_key_hex: &str) -> Result<Self> {
        let s = private_key_hex.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(s).map_err(|e| Error::InvalidParameter(format!("private key hex: {e}")))?;
        let key: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidParameter(format!("private key must be 32 bytes, got {}", b.len()))
        })?;
        Self::new(key)
    }

    pub fn address(&self) -> TronAddress {
        self.address
    }

    pub fn public_key(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }

    /// Uncompressed SEC1 public key (65 bytes, `0x04` prefix).
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl std::fmt::Debug for TronWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TronWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Signer for TronWallet {
    fn address(&self) -> TronAddress {
        self.address
    }

    fn sign(&self, hash: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]> {
        let (sig, recid) = self.key.sign_prehash_recoverable(hash)?;
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte() + 27;
        Ok(out)
    }
}

/// Recovers the signing key from a 65-byte signature over `hash`.
pub fn recover_public_key(hash: &[u8; 32], sig: &[u8]) -> Result<VerifyingKey> {
    if sig.len() != SIGNATURE_LEN {
        return Err(Error::InvalidParameter(format!(
            "signature must be {SIGNATURE_LEN} bytes, got {}",
            sig.len()
        )));
    }
    let signature = Signature::from_slice(&sig[..64])?;
    let v = if sig[64] >= 27 { sig[64] - 27 } else { sig[64] };
    let recid = RecoveryId::from_byte(v)
        .ok_or_else(|| Error::InvalidParameter(format!("bad recovery id {}", sig[64])))?;
    Ok(VerifyingKey::recover_from_prehash(hash, &signature, recid)?)
}

/// Address of whoever produced `sig` over `hash`.
pub fn recover_address(hash: &[u8; 32], sig: &[u8]) -> Result<TronAddress> {
    recover_public_key(hash, sig).map(|k| TronAddress::from_public_key(&k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn wallet() -> TronWallet {
        TronWallet::from_hex("0x8e812436a0e3323166e1f0e8ba79e19e217b2c4a53c970d4cca0cfb1078979df")
            .unwrap()
    }

    #[test]
    fn from_hex_accepts_optional_prefix() {
        let a = wallet();
        let b = TronWallet::from_hex(
            "8e812436a0e3323166e1f0e8ba79e19e217b2c4a53c970d4cca0cfb1078979df",
        )
        .unwrap();
        assert_eq!(a.address(), b.address());
        assert!(TronWallet::from_hex("abcd").is_err());
        assert!(TronWallet::from_hex("zz").is_err());
    }

    #[test]
    fn signature_recovers_signer() {
        let w = wallet();
        let hash: [u8; 32] = Sha256::digest(b"hello tron").into();
        let sig = w.sign(&hash).unwrap();
        assert!(sig[64] == 27 || sig[64] == 28);

        let pk = recover_public_key(&hash, &sig).unwrap();
        assert_eq!(&pk, w.public_key());
        assert_eq!(recover_address(&hash, &sig).unwrap(), w.address());
    }

    #[test]
    fn public_key_is_uncompressed() {
        let pk = wallet().public_key_bytes();
        assert_eq!(pk.len(), 65);
        assert_eq!(pk[0], 0x04);
    }

    #[test]
    fn zero_key_is_rejected() {
        assert!(TronWallet::new([0u8; 32]).is_err());
    }
}
