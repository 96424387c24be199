//! Event-log decoding against an ABI event entry.

use crate::abi::{AbiEntry, AbiParam, AbiValue, DecodedParam, decode_params, sol_types};
use crate::error::{Error, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::keccak256;

/// A log decoded against its event entry. `params` follow declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub name: String,
    pub signature: String,
    pub params: Vec<DecodedParam>,
}

impl DecodedEvent {
    /// Value of the parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Indexed values of these types are stored as the hash of their encoding.
fn is_hashed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

fn topic_word(topic: &[u8], param: &AbiParam) -> Result<[u8; 32]> {
    topic.try_into().map_err(|_| {
        Error::Decode(format!(
            "topic for {:?} is {} bytes, expected 32",
            param.name,
            topic.len()
        ))
    })
}

/// Decodes one log. For non-anonymous events `topics[0]` is the event topic and is not
/// checked here; lookups by topic happen on [`crate::Contract`].
pub fn decode_event<B: AsRef<[u8]>>(
    schema: &AbiEntry,
    topics: &[B],
    data: &[u8],
) -> Result<DecodedEvent> {
    let skip = usize::from(!schema.anonymous);
    let (indexed, plain): (Vec<&AbiParam>, Vec<&AbiParam>) =
        schema.inputs.iter().partition(|p| p.indexed);

    if topics.len() < skip + indexed.len() {
        return Err(Error::Decode(format!(
            "event {} has {} indexed parameters but the log carries {} topics",
            schema.name,
            indexed.len(),
            topics.len().saturating_sub(skip)
        )));
    }

    let mut from_topics = Vec::with_capacity(indexed.len());
    for (param, topic) in indexed.iter().zip(&topics[skip..]) {
        let word = topic_word(topic.as_ref(), param)?;
        let ty = param.sol_type()?;
        let decoded = if is_hashed(&ty) {
            DecodedParam {
                name: param.name.clone(),
                ty: param.canonical_type(),
                value: AbiValue::FixedBytes(word.to_vec()),
                indexed: true,
                hashed: true,
            }
        } else {
            let value = ty
                .abi_decode(&word)
                .map_err(|e| Error::Decode(format!("topic {:?}: {e}", param.name)))?;
            DecodedParam {
                name: param.name.clone(),
                ty: param.canonical_type(),
                value: AbiValue::from_sol(value)?,
                indexed: true,
                hashed: false,
            }
        };
        from_topics.push(decoded);
    }

    let plain_params: Vec<AbiParam> = plain.into_iter().cloned().collect();
    let from_data = decode_params(&plain_params, data)?;

    // Stitch both halves back into declaration order.
    let mut topics_iter = from_topics.into_iter();
    let mut data_iter = from_data.into_iter();
    let mut params = Vec::with_capacity(schema.inputs.len());
    for p in &schema.inputs {
        let next = if p.indexed {
            topics_iter.next()
        } else {
            data_iter.next()
        };
        params.push(next.ok_or_else(|| Error::Decode("event parameter missing".into()))?);
    }

    Ok(DecodedEvent {
        name: schema.name.clone(),
        signature: schema.signature(),
        params,
    })
}

/// Encodes `args` the way the EVM logs them: indexed values into topics (hashed for
/// reference types), the rest ABI-encoded into the data blob.
pub fn encode_event_log(schema: &AbiEntry, args: &[AbiValue]) -> Result<(Vec<[u8; 32]>, Vec<u8>)> {
    if args.len() != schema.inputs.len() {
        return Err(Error::TypeMismatch(format!(
            "event {} expects {} arguments, got {}",
            schema.name,
            schema.inputs.len(),
            args.len()
        )));
    }

    let mut topics = Vec::new();
    if !schema.anonymous {
        topics.push(schema.topic());
    }
    let types = sol_types(&schema.inputs)?;
    let mut plain = Vec::new();
    for ((param, ty), arg) in schema.inputs.iter().zip(&types).zip(args) {
        let value = arg.to_sol(ty)?;
        if !param.indexed {
            plain.push(value);
            continue;
        }
        if is_hashed(ty) {
            let mut preimage = Vec::new();
            topic_preimage(&value, false, &mut preimage);
            topics.push(keccak256(&preimage).0);
        } else {
            let word = value.abi_encode();
            let word: [u8; 32] = word.as_slice().try_into().map_err(|_| {
                Error::TypeMismatch(format!("{:?} does not fit one topic", param.name))
            })?;
            topics.push(word);
        }
    }
    Ok((topics, DynSolValue::Tuple(plain).abi_encode_params()))
}

/// In-place encoding hashed into an indexed topic. Top-level strings and bytes are taken
/// raw; inside arrays and tuples they are zero-padded to whole words.
fn topic_preimage(value: &DynSolValue, nested: bool, out: &mut Vec<u8>) {
    match value {
        DynSolValue::String(s) => push_padded(s.as_bytes(), nested, out),
        DynSolValue::Bytes(b) => push_padded(b, nested, out),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            for item in items {
                topic_preimage(item, true, out);
            }
        }
        other => out.extend(other.abi_encode()),
    }
}

fn push_padded(raw: &[u8], pad: bool, out: &mut Vec<u8>) {
    out.extend_from_slice(raw);
    if pad && raw.len() % 32 != 0 {
        out.resize(out.len() + 32 - raw.len() % 32, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TronAddress;
    use alloy::primitives::U256;

    fn transfer_event() -> AbiEntry {
        AbiEntry::event(
            "Transfer",
            vec![
                AbiParam::new("from", "address").indexed(),
                AbiParam::new("to", "address").indexed(),
                AbiParam::new("value", "uint256"),
            ],
        )
    }

    #[test]
    fn static_indexed_values_round_trip() {
        let from = TronAddress::from_base58check("TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55").unwrap();
        let to = TronAddress::from_base58check("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        let schema = transfer_event();
        let (topics, data) =
            encode_event_log(&schema, &[from.into(), to.into(), 42u64.into()]).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], schema.topic());

        let ev = decode_event(&schema, &topics, &data).unwrap();
        assert_eq!(ev.name, "Transfer");
        assert_eq!(ev.signature, "Transfer(address,address,uint256)");
        assert_eq!(ev.get("from"), Some(&AbiValue::Address(from)));
        assert_eq!(ev.get("to"), Some(&AbiValue::Address(to)));
        assert_eq!(ev.get("value"), Some(&AbiValue::BigUint(U256::from(42u64))));
        assert!(ev.params[0].indexed && ev.params[1].indexed);
        assert!(!ev.params[2].indexed);
    }

    #[test]
    fn dynamic_indexed_values_decode_as_hash() {
        let schema = AbiEntry::event(
            "Named",
            vec![
                AbiParam::new("name", "string").indexed(),
                AbiParam::new("id", "uint64"),
            ],
        );
        let (topics, data) = encode_event_log(&schema, &["alice".into(), 7u64.into()]).unwrap();
        assert_eq!(topics[1], keccak256(b"alice").0);

        let ev = decode_event(&schema, &topics, &data).unwrap();
        assert!(ev.params[0].hashed);
        assert_eq!(ev.params[0].value, AbiValue::FixedBytes(keccak256(b"alice").to_vec()));
        assert_eq!(ev.get("id"), Some(&AbiValue::Uint(7)));
    }

    #[test]
    fn parameters_keep_declaration_order() {
        let schema = AbiEntry::event(
            "Mixed",
            vec![
                AbiParam::new("a", "uint8"),
                AbiParam::new("b", "bool").indexed(),
                AbiParam::new("c", "int16"),
            ],
        );
        let (topics, data) =
            encode_event_log(&schema, &[3u64.into(), true.into(), (-2i64).into()]).unwrap();
        let ev = decode_event(&schema, &topics, &data).unwrap();
        let names: Vec<&str> = ev.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(ev.params[2].value, AbiValue::Int(-2));
    }

    #[test]
    fn missing_topics_are_a_decode_error() {
        let schema = transfer_event();
        let err = decode_event(&schema, &[schema.topic()], &[0u8; 32]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "{err}");
    }

    #[test]
    fn nested_strings_pad_to_words() {
        let mut out = Vec::new();
        let v = DynSolValue::Array(vec![DynSolValue::String("ab".into())]);
        topic_preimage(&v, false, &mut out);
        assert_eq!(out.len(), 32);
        assert_eq!(&out[..2], b"ab");
    }
}
