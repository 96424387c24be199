use super::types::{AbiEntry, AbiParam};
use super::value::AbiValue;
use crate::error::{Error, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue};

/// One decoded parameter of a call, result or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    pub name: String,
    /// Canonical type name.
    pub ty: String,
    pub value: AbiValue,
    /// Set for event parameters that came from a topic.
    pub indexed: bool,
    /// The topic held `keccak256` of the value instead of the value itself; `value` is then
    /// the 32-byte hash as `FixedBytes`.
    pub hashed: bool,
}

impl DecodedParam {
    fn new(param: &AbiParam, value: AbiValue) -> Self {
        Self {
            name: param.name.clone(),
            ty: param.canonical_type(),
            value,
            indexed: false,
            hashed: false,
        }
    }
}

pub(crate) fn sol_types(params: &[AbiParam]) -> Result<Vec<DynSolType>> {
    params.iter().map(AbiParam::sol_type).collect()
}

/// ABI-encodes `args` as the parameter tuple `params` (no selector).
pub fn encode_params(params: &[AbiParam], args: &[AbiValue]) -> Result<Vec<u8>> {
    if params.len() != args.len() {
        return Err(Error::TypeMismatch(format!(
            "expected {} arguments, got {}",
            params.len(),
            args.len()
        )));
    }
    let mut values = Vec::with_capacity(args.len());
    for (param, arg) in params.iter().zip(args) {
        let ty = param.sol_type()?;
        let value = arg.to_sol(&ty).map_err(|e| match e {
            Error::TypeMismatch(msg) if !param.name.is_empty() => {
                Error::TypeMismatch(format!("{}: {msg}", param.name))
            }
            other => other,
        })?;
        values.push(value);
    }
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// `selector ‖ encode_params(inputs, args)`.
pub fn encode_call(entry: &AbiEntry, args: &[AbiValue]) -> Result<Vec<u8>> {
    let mut out = entry.selector().to_vec();
    out.extend(encode_params(&entry.inputs, args)?);
    Ok(out)
}

/// Decodes `data` as the parameter tuple `params`, in declaration order.
pub fn decode_params(params: &[AbiParam], data: &[u8]) -> Result<Vec<DecodedParam>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }
    let tuple = DynSolType::Tuple(sol_types(params)?);
    let decoded = tuple
        .abi_decode_params(data)
        .map_err(|e| Error::Decode(e.to_string()))?;
    let DynSolValue::Tuple(values) = decoded else {
        return Err(Error::Decode("parameters did not decode as a tuple".into()));
    };
    params
        .iter()
        .zip(values)
        .map(|(param, value)| Ok(DecodedParam::new(param, AbiValue::from_sol(value)?)))
        .collect()
}
