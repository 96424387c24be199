use crate::error::{Error, Result};
use crate::protocol::smart_contract;
use crate::protocol::smart_contract::abi::entry::{EntryType, StateMutabilityType};
use alloy::dyn_abi::DynSolType;
use alloy::primitives::keccak256;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Function,
    Event,
    Constructor,
    Error,
    Fallback,
    Receive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        match s.to_ascii_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "event" => Ok(Self::Event),
            "constructor" => Ok(Self::Constructor),
            "error" => Ok(Self::Error),
            "fallback" => Ok(Self::Fallback),
            "receive" => Ok(Self::Receive),
            other => Err(serde::de::Error::custom(format!("unknown abi entry type {other:?}"))),
        }
    }
}

impl<'de> Deserialize<'de> for StateMutability {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        match s.to_ascii_lowercase().as_str() {
            "pure" => Ok(Self::Pure),
            "view" => Ok(Self::View),
            "nonpayable" | "" => Ok(Self::Nonpayable),
            "payable" => Ok(Self::Payable),
            other => Err(serde::de::Error::custom(format!(
                "unknown state mutability {other:?}"
            ))),
        }
    }
}

/// One input or output of an ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub indexed: bool,
    /// Members of a `tuple` type.
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            indexed: false,
            components: Vec::new(),
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Type as it appears in a selector preimage: `uint` widened to `uint256`, `int` to
    /// `int256`, tuples spelled `(a,b)`, array suffixes kept.
    pub fn canonical_type(&self) -> String {
        let (base, suffix) = match self.ty.find('[') {
            Some(i) => self.ty.split_at(i),
            None => (self.ty.as_str(), ""),
        };
        let base = match base.trim() {
            "uint" => "uint256".to_string(),
            "int" => "int256".to_string(),
            "byte" => "bytes1".to_string(),
            "tuple" => {
                let inner: Vec<String> =
                    self.components.iter().map(AbiParam::canonical_type).collect();
                format!("({})", inner.join(","))
            }
            other => other.to_string(),
        };
        format!("{base}{suffix}")
    }

    pub fn sol_type(&self) -> Result<DynSolType> {
        let canonical = self.canonical_type();
        DynSolType::parse(&canonical)
            .map_err(|e| Error::AbiParse(format!("type {canonical:?}: {e}")))
    }
}

/// One entry of a contract ABI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: EntryKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: StateMutability,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub payable: bool,
}

fn default_kind() -> EntryKind {
    EntryKind::Function
}

impl AbiEntry {
    pub fn function(name: &str, inputs: Vec<AbiParam>, outputs: Vec<AbiParam>) -> Self {
        Self {
            kind: EntryKind::Function,
            name: name.to_string(),
            inputs,
            outputs,
            state_mutability: StateMutability::Nonpayable,
            anonymous: false,
            constant: false,
            payable: false,
        }
    }

    pub fn event(name: &str, inputs: Vec<AbiParam>) -> Self {
        Self {
            kind: EntryKind::Event,
            ..Self::function(name, inputs, Vec::new())
        }
    }

    /// `name(type1,type2,...)` with canonical types.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(AbiParam::canonical_type).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// First 4 bytes of `keccak256(signature)`.
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    /// Full `keccak256(signature)`, i.e. topic 0 of a non-anonymous event.
    pub fn topic(&self) -> [u8; 32] {
        keccak256(self.signature().as_bytes()).0
    }

    /// Constant calls go through `TriggerConstantContract`.
    pub fn is_constant(&self) -> bool {
        self.constant
            || matches!(
                self.state_mutability,
                StateMutability::View | StateMutability::Pure
            )
    }

    pub fn is_payable(&self) -> bool {
        self.payable || self.state_mutability == StateMutability::Payable
    }
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// A parsed contract ABI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    pub entries: Vec<AbiEntry>,
}

impl Abi {
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON ABI array. `{"entrys": [...]}` as printed by nodes is accepted too.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Doc {
            List(Vec<AbiEntry>),
            Wrapped { entrys: Vec<AbiEntry> },
        }

        let doc: Doc = serde_json::from_str(json).map_err(|e| Error::AbiParse(e.to_string()))?;
        let entries = match doc {
            Doc::List(e) | Doc::Wrapped { entrys: e } => e,
        };
        let abi = Self { entries };
        abi.check()?;
        Ok(abi)
    }

    /// Converts the ABI a node returns from `GetContract`.
    pub fn from_proto(abi: &smart_contract::Abi) -> Result<Self> {
        let param = |p: &smart_contract::abi::entry::Param| AbiParam {
            name: p.name.clone(),
            ty: p.r#type.clone(),
            indexed: p.indexed,
            components: Vec::new(),
        };

        let mut entries = Vec::with_capacity(abi.entrys.len());
        for e in &abi.entrys {
            let kind = match EntryType::try_from(e.r#type) {
                Ok(EntryType::Function) => EntryKind::Function,
                Ok(EntryType::Event) => EntryKind::Event,
                Ok(EntryType::Constructor) => EntryKind::Constructor,
                Ok(EntryType::Error) => EntryKind::Error,
                Ok(EntryType::Fallback) => EntryKind::Fallback,
                Ok(EntryType::Receive) => EntryKind::Receive,
                Ok(EntryType::UnknownEntryType) | Err(_) => {
                    return Err(Error::AbiParse(format!(
                        "entry {:?} has unknown type {}",
                        e.name, e.r#type
                    )));
                }
            };
            let state_mutability = match StateMutabilityType::try_from(e.state_mutability) {
                Ok(StateMutabilityType::Pure) => StateMutability::Pure,
                Ok(StateMutabilityType::View) => StateMutability::View,
                Ok(StateMutabilityType::Payable) => StateMutability::Payable,
                _ => StateMutability::Nonpayable,
            };
            entries.push(AbiEntry {
                kind,
                name: e.name.clone(),
                inputs: e.inputs.iter().map(param).collect(),
                outputs: e.outputs.iter().map(param).collect(),
                state_mutability,
                anonymous: e.anonymous,
                constant: e.constant,
                payable: e.payable,
            });
        }
        let abi = Self { entries };
        abi.check()?;
        Ok(abi)
    }

    /// The node's ABI message, as sent with a deployment. Tuple types are written in their
    /// parenthesised canonical form since `Param` has no components.
    pub fn to_proto(&self) -> smart_contract::Abi {
        use smart_contract::abi::{Entry, entry::Param};

        let param = |p: &AbiParam| Param {
            indexed: p.indexed,
            name: p.name.clone(),
            r#type: if p.components.is_empty() {
                p.ty.clone()
            } else {
                p.canonical_type()
            },
        };
        let entrys = self
            .entries
            .iter()
            .map(|e| Entry {
                anonymous: e.anonymous,
                constant: e.constant,
                name: e.name.clone(),
                inputs: e.inputs.iter().map(param).collect(),
                outputs: e.outputs.iter().map(param).collect(),
                r#type: match e.kind {
                    EntryKind::Function => EntryType::Function,
                    EntryKind::Event => EntryType::Event,
                    EntryKind::Constructor => EntryType::Constructor,
                    EntryKind::Error => EntryType::Error,
                    EntryKind::Fallback => EntryType::Fallback,
                    EntryKind::Receive => EntryType::Receive,
                } as i32,
                payable: e.payable,
                state_mutability: match e.state_mutability {
                    StateMutability::Pure => StateMutabilityType::Pure,
                    StateMutability::View => StateMutabilityType::View,
                    StateMutability::Nonpayable => StateMutabilityType::Nonpayable,
                    StateMutability::Payable => StateMutabilityType::Payable,
                } as i32,
            })
            .collect();
        smart_contract::Abi { entrys }
    }

    /// Every parameter type must parse.
    fn check(&self) -> Result<()> {
        for e in &self.entries {
            for p in e.inputs.iter().chain(&e.outputs) {
                p.sol_type()
                    .map_err(|err| Error::AbiParse(format!("{}: {err}", e.name)))?;
            }
        }
        Ok(())
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Function)
    }

    pub fn events(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Event)
    }

    pub fn constructor(&self) -> Option<&AbiEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == EntryKind::Constructor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRC20: &str = r#"[
        {"constant":false,"inputs":[{"name":"_to","type":"address"},{"name":"_value","type":"uint256"}],
         "name":"transfer","outputs":[{"name":"","type":"bool"}],"stateMutability":"Nonpayable","type":"Function"},
        {"constant":true,"inputs":[{"name":"who","type":"address"}],"name":"balanceOf",
         "outputs":[{"name":"","type":"uint"}],"stateMutability":"View","type":"Function"},
        {"anonymous":false,"inputs":[{"indexed":true,"name":"from","type":"address"},
         {"indexed":true,"name":"to","type":"address"},{"indexed":false,"name":"value","type":"uint256"}],
         "name":"Transfer","type":"Event"}
    ]"#;

    #[test]
    fn parses_mixed_case_json() {
        let abi = Abi::from_json(TRC20).unwrap();
        assert_eq!(abi.functions().count(), 2);
        assert_eq!(abi.events().count(), 1);

        let balance_of = abi.functions().find(|e| e.name == "balanceOf").unwrap();
        assert!(balance_of.is_constant());
        assert_eq!(balance_of.outputs[0].canonical_type(), "uint256");
    }

    #[test]
    fn selectors_match_known_values() {
        let abi = Abi::from_json(TRC20).unwrap();
        let transfer = abi.functions().find(|e| e.name == "transfer").unwrap();
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);

        let ev = abi.events().next().unwrap();
        assert_eq!(
            hex::encode(ev.topic()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn canonical_types_widen_and_render_tuples() {
        let p = AbiParam {
            name: "order".into(),
            ty: "tuple[]".into(),
            indexed: false,
            components: vec![
                AbiParam::new("maker", "address"),
                AbiParam::new("amounts", "uint[2]"),
                AbiParam {
                    name: "inner".into(),
                    ty: "tuple".into(),
                    indexed: false,
                    components: vec![AbiParam::new("x", "int"), AbiParam::new("b", "bytes")],
                },
            ],
        };
        assert_eq!(p.canonical_type(), "(address,uint256[2],(int256,bytes))[]");
        assert!(p.sol_type().is_ok());
    }

    #[test]
    fn rejects_malformed_abi() {
        assert!(matches!(Abi::from_json("{"), Err(Error::AbiParse(_))));
        assert!(matches!(
            Abi::from_json(r#"[{"type":"function","name":"f","inputs":[{"type":"uint7x"}]}]"#),
            Err(Error::AbiParse(_))
        ));
        assert!(matches!(
            Abi::from_json(r#"[{"type":"banana","name":"f"}]"#),
            Err(Error::AbiParse(_))
        ));
    }

    #[test]
    fn proto_form_preserves_entries() {
        let abi = Abi::from_json(TRC20).unwrap();
        let back = Abi::from_proto(&abi.to_proto()).unwrap();
        assert_eq!(back.entries.len(), 3);
        let transfer = back.functions().find(|e| e.name == "transfer").unwrap();
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert!(back.functions().any(|e| e.name == "balanceOf" && e.is_constant()));
        assert!(back.events().all(|e| e.inputs[0].indexed));
    }

    #[test]
    fn wrapped_entrys_document_is_accepted() {
        let abi = Abi::from_json(r#"{"entrys":[{"type":"Function","name":"f","inputs":[]}]}"#)
            .unwrap();
        assert_eq!(abi.entries[0].signature(), "f()");
    }
}
