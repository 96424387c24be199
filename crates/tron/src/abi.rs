//! Contract ABI model and codec.

mod codec;
mod types;
mod value;

pub use codec::{DecodedParam, decode_params, encode_call, encode_params};
pub(crate) use codec::sol_types;
pub use types::{Abi, AbiEntry, AbiParam, EntryKind, StateMutability, selector};
pub use value::AbiValue;
