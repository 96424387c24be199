use crate::error::{Error, Result};
use alloy::primitives::{Address, keccak256};
use k256::ecdsa::{SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Version byte of every mainnet/testnet Tron address.
pub const ADDRESS_PREFIX: u8 = 0x41;
pub const ADDRESS_LEN: usize = 21;

/// A Tron account address: `0x41 || evm_address`.
///
/// Equality is byte-equality of the 21-byte form. The canonical text form is base58check
/// (starts with `T`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TronAddress([u8; ADDRESS_LEN]);

impl TronAddress {
    /// Parses the base58check surface (`T...`), verifying the 4-byte double-sha256 checksum.
    pub fn from_base58check(s: &str) -> Result<Self> {
        let payload = bs58::decode(s.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        Self::from_bytes(&payload)
    }

    /// Accepts the 21-byte prefixed form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidAddress(format!("expected {ADDRESS_LEN} bytes, got {}", bytes.len()))
        })?;
        if raw[0] != ADDRESS_PREFIX {
            return Err(Error::InvalidAddress(format!(
                "expected prefix 0x41, got 0x{:02x}",
                raw[0]
            )));
        }
        Ok(Self(raw))
    }

    /// Accepts 42 hex chars starting with `41`, optionally `0x`-prefixed.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != ADDRESS_LEN * 2 {
            return Err(Error::InvalidAddress(format!(
                "expected 42 hex chars, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Widens a 20-byte EVM address by prepending `0x41`.
    pub fn from_evm_bytes(bytes: &[u8]) -> Result<Self> {
        let evm: [u8; 20] = bytes.try_into().map_err(|_| {
            Error::InvalidAddress(format!("expected 20 evm bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_evm(Address::from(evm)))
    }

    pub fn from_evm(addr: Address) -> Self {
        let mut out = [0u8; ADDRESS_LEN];
        out[0] = ADDRESS_PREFIX;
        out[1..].copy_from_slice(addr.as_slice());
        Self(out)
    }

    /// `0x41 || keccak256(uncompressed_pubkey[1..])[12..]`.
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        Self::from_evm(Address::from_slice(&hash[12..]))
    }

    pub fn from_private_key(secret: &[u8]) -> Result<Self> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| Error::InvalidParameter(format!("private key: {e}")))?;
        Ok(Self::from_public_key(key.verifying_key()))
    }

    /// Parses any text surface: base58check, 41-prefixed hex, or 0x-prefixed 20-byte EVM hex.
    pub fn parse_text(s: &str) -> Result<Self> {
        let t = s.trim();
        if t.starts_with('T') {
            return Self::from_base58check(t);
        }
        let h = t.strip_prefix("0x").unwrap_or(t);
        match h.len() {
            42 => Self::from_hex(h),
            40 => {
                let bytes = hex::decode(h).map_err(|e| Error::InvalidAddress(format!("{t}: {e}")))?;
                Self::from_evm_bytes(&bytes)
            }
            _ => Err(Error::InvalidAddress(t.to_string())),
        }
    }

    pub fn prefixed_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// 42 lowercase hex chars, starting with `41`.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base58check(&self) -> String {
        bs58::encode(self.0).with_check().into_string()
    }

    pub fn evm_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[1..]);
        out
    }

    pub fn evm(&self) -> Address {
        Address::from_slice(&self.0[1..])
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58check())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self.to_base58check())
    }
}

impl FromStr for TronAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_text(s)
    }
}

impl From<Address> for TronAddress {
    fn from(addr: Address) -> Self {
        Self::from_evm(addr)
    }
}

impl Serialize for TronAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_text(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const SAMPLE: &str = "TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55";

    #[test]
    fn base58_roundtrips_through_every_surface() {
        for s in [USDT, SAMPLE] {
            let a = TronAddress::from_base58check(s).unwrap();
            assert_eq!(a.to_string(), s);

            let b = TronAddress::from_bytes(&a.bytes()).unwrap();
            assert_eq!(b, a);

            let h = a.hex();
            assert_eq!(h.len(), 42);
            assert!(h.starts_with("41"), "{h}");
            assert_eq!(TronAddress::from_hex(&h).unwrap().to_string(), s);

            let e = TronAddress::from_evm_bytes(&a.evm_bytes()).unwrap();
            assert_eq!(e.to_string(), s);
        }
    }

    #[test]
    fn usdt_contract_hex_is_known() {
        let a = TronAddress::from_base58check(USDT).unwrap();
        assert_eq!(a.hex(), "41a614f803b6fd780986a42c78ec9c7f77e6ded13c");
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        // Last character flipped.
        let bad = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u";
        assert!(matches!(
            TronAddress::from_base58check(bad),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert!(TronAddress::from_bytes(&[0x41; 20]).is_err());
        assert!(TronAddress::from_evm_bytes(&[0u8; 21]).is_err());
        assert!(TronAddress::from_hex("41abcd").is_err());
        let mut raw = [0u8; 21];
        raw[0] = 0x42;
        assert!(TronAddress::from_bytes(&raw).is_err());
    }

    #[test]
    fn parse_text_accepts_all_text_forms() {
        let a = TronAddress::from_base58check(USDT).unwrap();
        assert_eq!(TronAddress::parse_text(&a.hex()).unwrap(), a);
        assert_eq!(TronAddress::parse_text(&format!("0x{}", a.hex())).unwrap(), a);
        assert_eq!(
            TronAddress::parse_text(&format!("0x{}", hex::encode(a.evm_bytes()))).unwrap(),
            a
        );
    }

    #[test]
    fn address_from_known_private_key() {
        // Private key 1 -> well known generator point address.
        let mut sk = [0u8; 32];
        sk[31] = 1;
        let a = TronAddress::from_private_key(&sk).unwrap();
        assert_eq!(
            hex::encode(a.evm_bytes()),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
        assert_eq!(a.prefixed_bytes()[0], ADDRESS_PREFIX);
    }

    #[test]
    fn serde_uses_base58() {
        let a = TronAddress::from_base58check(SAMPLE).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let back: TronAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
