use crate::address::TronAddress;
use crate::error::{Error, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{Address, B256, I256, U256};

/// A contract value, either an argument to encode or a decoded output.
///
/// Inputs are coerced to the ABI type they are encoded as, so a `uint256` accepts
/// `BigUint`, `Uint` or a decimal/hex `String`, and an `address` accepts `Address`, a
/// base58check or hex `String`, or 20/21 raw bytes. Outputs use `Int`/`Uint` for widths up to
/// 64 bits and `BigInt`/`BigUint` above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(TronAddress),
    Int(i64),
    Uint(u64),
    BigInt(I256),
    BigUint(U256),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    List(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_address(&self) -> Option<TronAddress> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Any unsigned integer variant, widened.
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(U256::from(*v)),
            AbiValue::BigUint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Int(_) => "int",
            AbiValue::Uint(_) => "uint",
            AbiValue::BigInt(_) => "big int",
            AbiValue::BigUint(_) => "big uint",
            AbiValue::Bool(_) => "bool",
            AbiValue::String(_) => "string",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::List(_) => "list",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    /// Coerces into the encoder's value for `ty`.
    pub fn to_sol(&self, ty: &DynSolType) -> Result<DynSolValue> {
        let mismatch = || {
            Error::TypeMismatch(format!(
                "{} value cannot be encoded as {}",
                self.kind(),
                ty.sol_type_name()
            ))
        };

        match ty {
            DynSolType::Address => Ok(DynSolValue::Address(self.to_address().ok_or_else(mismatch)?.evm())),
            DynSolType::Bool => match self {
                AbiValue::Bool(b) => Ok(DynSolValue::Bool(*b)),
                _ => Err(mismatch()),
            },
            DynSolType::Uint(bits) => {
                let v = match self {
                    AbiValue::Uint(v) => U256::from(*v),
                    AbiValue::BigUint(v) => *v,
                    AbiValue::String(s) => parse_u256(s)?,
                    _ => return Err(mismatch()),
                };
                if v.bit_len() > *bits {
                    return Err(Error::TypeMismatch(format!("{v} overflows uint{bits}")));
                }
                Ok(DynSolValue::Uint(v, *bits))
            }
            DynSolType::Int(bits) => {
                let v = match self {
                    AbiValue::Int(v) => I256::try_from(*v)
                        .map_err(|e| Error::TypeMismatch(format!("{v}: {e}")))?,
                    AbiValue::BigInt(v) => *v,
                    AbiValue::String(s) => parse_i256(s)?,
                    _ => return Err(mismatch()),
                };
                if v.bits() as usize > *bits {
                    return Err(Error::TypeMismatch(format!("{v} overflows int{bits}")));
                }
                Ok(DynSolValue::Int(v, *bits))
            }
            DynSolType::String => match self {
                AbiValue::String(s) => Ok(DynSolValue::String(s.clone())),
                _ => Err(mismatch()),
            },
            DynSolType::Bytes => match self {
                AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Ok(DynSolValue::Bytes(b.clone())),
                AbiValue::String(s) => Ok(DynSolValue::Bytes(parse_hex(s)?)),
                _ => Err(mismatch()),
            },
            DynSolType::FixedBytes(size) => {
                let raw = match self {
                    AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => b.clone(),
                    AbiValue::String(s) => parse_hex(s)?,
                    AbiValue::List(items) => items
                        .iter()
                        .map(|v| match v {
                            AbiValue::Uint(b) if *b <= u64::from(u8::MAX) => Ok(*b as u8),
                            _ => Err(mismatch()),
                        })
                        .collect::<Result<Vec<u8>>>()?,
                    _ => return Err(mismatch()),
                };
                if raw.len() != *size {
                    return Err(Error::TypeMismatch(format!(
                        "bytes{size} needs {size} bytes, got {}",
                        raw.len()
                    )));
                }
                let mut word = B256::ZERO;
                word[..*size].copy_from_slice(&raw);
                Ok(DynSolValue::FixedBytes(word, *size))
            }
            DynSolType::Array(inner) => match self {
                AbiValue::List(items) => Ok(DynSolValue::Array(
                    items
                        .iter()
                        .map(|v| v.to_sol(inner))
                        .collect::<Result<_>>()?,
                )),
                _ => Err(mismatch()),
            },
            DynSolType::FixedArray(inner, len) => match self {
                AbiValue::List(items) if items.len() == *len => Ok(DynSolValue::FixedArray(
                    items
                        .iter()
                        .map(|v| v.to_sol(inner))
                        .collect::<Result<_>>()?,
                )),
                AbiValue::List(items) => Err(Error::TypeMismatch(format!(
                    "{} needs {len} items, got {}",
                    ty.sol_type_name(),
                    items.len()
                ))),
                _ => Err(mismatch()),
            },
            DynSolType::Tuple(types) => match self {
                AbiValue::Tuple(items) | AbiValue::List(items) if items.len() == types.len() => {
                    Ok(DynSolValue::Tuple(
                        items
                            .iter()
                            .zip(types)
                            .map(|(v, t)| v.to_sol(t))
                            .collect::<Result<_>>()?,
                    ))
                }
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }

    fn to_address(&self) -> Option<TronAddress> {
        match self {
            AbiValue::Address(a) => Some(*a),
            AbiValue::String(s) => TronAddress::parse_text(s).ok(),
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => match b.len() {
                20 => TronAddress::from_evm_bytes(b).ok(),
                21 => TronAddress::from_bytes(b).ok(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Converts a decoded value back into its native shape.
    pub fn from_sol(value: DynSolValue) -> Result<Self> {
        Ok(match value {
            DynSolValue::Address(a) => AbiValue::Address(TronAddress::from_evm(a)),
            DynSolValue::Bool(b) => AbiValue::Bool(b),
            DynSolValue::Uint(v, bits) if bits <= 64 => AbiValue::Uint(v.as_limbs()[0]),
            DynSolValue::Uint(v, _) => AbiValue::BigUint(v),
            DynSolValue::Int(v, bits) if bits <= 64 => AbiValue::Int(
                i64::try_from(v).map_err(|e| Error::Decode(format!("int{bits} {v}: {e}")))?,
            ),
            DynSolValue::Int(v, _) => AbiValue::BigInt(v),
            DynSolValue::String(s) => AbiValue::String(s),
            DynSolValue::Bytes(b) => AbiValue::Bytes(b),
            DynSolValue::FixedBytes(word, size) => AbiValue::FixedBytes(word[..size].to_vec()),
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => AbiValue::List(
                items
                    .into_iter()
                    .map(AbiValue::from_sol)
                    .collect::<Result<_>>()?,
            ),
            DynSolValue::Tuple(items) => AbiValue::Tuple(
                items
                    .into_iter()
                    .map(AbiValue::from_sol)
                    .collect::<Result<_>>()?,
            ),
            other => {
                return Err(Error::Decode(format!(
                    "unsupported decoded value {:?}",
                    other.sol_type_name()
                )));
            }
        })
    }
}

fn parse_u256(s: &str) -> Result<U256> {
    let t = s.trim();
    t.parse::<U256>()
        .map_err(|e| Error::TypeMismatch(format!("{t:?} is not an unsigned integer: {e}")))
}

fn parse_i256(s: &str) -> Result<I256> {
    let t = s.trim();
    let parsed = if t.starts_with("0x") || t.starts_with("-0x") {
        I256::from_hex_str(t)
    } else {
        I256::from_dec_str(t)
    };
    parsed.map_err(|e| Error::TypeMismatch(format!("{t:?} is not an integer: {e}")))
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let t = s.trim();
    let Some(h) = t.strip_prefix("0x") else {
        return Err(Error::TypeMismatch(format!(
            "{t:?}: byte strings must be 0x-prefixed hex"
        )));
    };
    hex::decode(h).map_err(|e| Error::TypeMismatch(format!("{t:?}: {e}")))
}

impl From<TronAddress> for AbiValue {
    fn from(v: TronAddress) -> Self {
        AbiValue::Address(v)
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(TronAddress::from_evm(v))
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<i64> for AbiValue {
    fn from(v: i64) -> Self {
        AbiValue::Int(v)
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::BigUint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::BigInt(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(v: Vec<u8>) -> Self {
        AbiValue::Bytes(v)
    }
}

impl<const N: usize> From<[u8; N]> for AbiValue {
    fn from(v: [u8; N]) -> Self {
        AbiValue::FixedBytes(v.to_vec())
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(v: Vec<AbiValue>) -> Self {
        AbiValue::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    #[test]
    fn address_accepts_every_surface() {
        let want = TronAddress::from_base58check(USDT).unwrap();
        let surfaces: Vec<AbiValue> = vec![
            USDT.into(),
            want.hex().into(),
            format!("0x{}", want.hex()).into(),
            format!("0x{}", hex::encode(want.evm_bytes())).into(),
            AbiValue::Bytes(want.evm_bytes().to_vec()),
            AbiValue::Bytes(want.bytes()),
            want.into(),
            want.evm().into(),
        ];
        for v in surfaces {
            let sol = v.to_sol(&DynSolType::Address).unwrap();
            assert_eq!(sol, DynSolValue::Address(want.evm()), "{v:?}");
        }
        assert!(matches!(
            AbiValue::from("nope").to_sol(&DynSolType::Address),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn integers_check_signedness_and_width() {
        assert!(AbiValue::Uint(255).to_sol(&DynSolType::Uint(8)).is_ok());
        assert!(AbiValue::Uint(256).to_sol(&DynSolType::Uint(8)).is_err());
        assert!(AbiValue::Int(-128).to_sol(&DynSolType::Int(8)).is_ok());
        assert!(AbiValue::Int(-129).to_sol(&DynSolType::Int(8)).is_err());
        assert!(AbiValue::Int(1).to_sol(&DynSolType::Uint(64)).is_err());
        assert!(AbiValue::Bool(true).to_sol(&DynSolType::Uint(256)).is_err());

        let big = AbiValue::from("1000000000000000000")
            .to_sol(&DynSolType::Uint(256))
            .unwrap();
        assert_eq!(
            big,
            DynSolValue::Uint(U256::from(1_000_000_000_000_000_000u64), 256)
        );
        let hex = AbiValue::from("0xff").to_sol(&DynSolType::Uint(256)).unwrap();
        assert_eq!(hex, DynSolValue::Uint(U256::from(255u64), 256));
        let neg = AbiValue::from("-5").to_sol(&DynSolType::Int(256)).unwrap();
        assert_eq!(neg, DynSolValue::Int(I256::try_from(-5i64).unwrap(), 256));
    }

    #[test]
    fn fixed_bytes_need_exact_length() {
        let ty = DynSolType::FixedBytes(4);
        assert!(AbiValue::from([1u8, 2, 3, 4]).to_sol(&ty).is_ok());
        assert!(AbiValue::from("0x01020304").to_sol(&ty).is_ok());
        assert!(
            AbiValue::List((1..=4).map(AbiValue::Uint).collect())
                .to_sol(&ty)
                .is_ok()
        );
        assert!(AbiValue::from([1u8, 2, 3]).to_sol(&ty).is_err());
    }

    #[test]
    fn decoded_widths_pick_native_or_big_variants() {
        assert_eq!(
            AbiValue::from_sol(DynSolValue::Uint(U256::from(7u64), 64)).unwrap(),
            AbiValue::Uint(7)
        );
        assert_eq!(
            AbiValue::from_sol(DynSolValue::Uint(U256::from(7u64), 256)).unwrap(),
            AbiValue::BigUint(U256::from(7u64))
        );
        assert_eq!(
            AbiValue::from_sol(DynSolValue::Int(I256::try_from(-7i64).unwrap(), 32)).unwrap(),
            AbiValue::Int(-7)
        );
        let mut word = B256::ZERO;
        word[0] = 0xab;
        assert_eq!(
            AbiValue::from_sol(DynSolValue::FixedBytes(word, 2)).unwrap(),
            AbiValue::FixedBytes(vec![0xab, 0])
        );
    }
}
