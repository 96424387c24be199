//! A smart contract bound to one address and ABI.

use crate::abi::{
    Abi, AbiEntry, AbiParam, AbiValue, DecodedParam, EntryKind, decode_params, encode_call,
    encode_params,
};
use crate::address::TronAddress;
use crate::broadcast::{BroadcastOptions, BroadcastResult};
use crate::client::{TronClient, check_envelope};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::event::{DecodedEvent, decode_event};
use crate::grpc::{GrpcTransport, Transport};
use crate::protocol::r#return::ResponseCode;
use crate::protocol::transaction::result::ContractResult;
use crate::protocol::transaction_info::Log;
use crate::protocol::{CreateSmartContract, SmartContract, TransactionExtention, TriggerSmartContract};
use crate::wallet::Signer;
use std::collections::HashMap;
use std::sync::Arc;

/// `Error(string)` revert selector.
const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

pub struct Contract<T: Transport = GrpcTransport> {
    client: Arc<TronClient<T>>,
    address: TronAddress,
    abi: Abi,
    by_name: HashMap<String, Vec<usize>>,
    by_selector: HashMap<[u8; 4], usize>,
    events: HashMap<[u8; 32], Arc<AbiEntry>>,
    /// Events grouped by the first 4 bytes of their topic. Groups of two or more collide.
    event_prefixes: HashMap<[u8; 4], Vec<Arc<AbiEntry>>>,
}

impl<T: Transport> Contract<T> {
    /// Binds `address`. Without an `abi` the contract's ABI is fetched from the node, and a
    /// contract deployed without one fails with [`Error::AbiMissing`].
    pub async fn new(
        ctx: &Context,
        client: Arc<TronClient<T>>,
        address: TronAddress,
        abi: Option<Abi>,
    ) -> Result<Self> {
        let abi = match abi {
            Some(abi) => abi,
            None => {
                let remote = client.get_contract(ctx, address).await?;
                let proto = remote
                    .abi
                    .filter(|a| !a.entrys.is_empty())
                    .ok_or_else(|| Error::AbiMissing(address.to_base58check()))?;
                Abi::from_proto(&proto)?
            }
        };
        Ok(Self::with_abi(client, address, abi))
    }

    pub fn with_abi(client: Arc<TronClient<T>>, address: TronAddress, abi: Abi) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_selector = HashMap::new();
        let mut events = HashMap::new();
        for (i, entry) in abi.entries.iter().enumerate() {
            match entry.kind {
                EntryKind::Function => {
                    by_name.entry(entry.name.clone()).or_default().push(i);
                    by_selector.insert(entry.selector(), i);
                }
                EntryKind::Event if !entry.anonymous => {
                    events.insert(entry.topic(), Arc::new(entry.clone()));
                }
                _ => {}
            }
        }
        let mut event_prefixes: HashMap<[u8; 4], Vec<Arc<AbiEntry>>> = HashMap::new();
        for (topic, entry) in &events {
            let mut prefix = [0u8; 4];
            prefix.copy_from_slice(&topic[..4]);
            event_prefixes.entry(prefix).or_default().push(entry.clone());
        }
        tracing::debug!(
            contract = %address,
            functions = by_selector.len(),
            events = events.len(),
            "bound contract"
        );
        Self {
            client,
            address,
            abi,
            by_name,
            by_selector,
            events,
            event_prefixes,
        }
    }

    pub fn address(&self) -> TronAddress {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn client(&self) -> &Arc<TronClient<T>> {
        &self.client
    }

    /// Resolves a function by name, or by full signature when `method` contains `(`.
    /// Overloads sharing a name are told apart by `argc` when given.
    pub fn method(&self, method: &str, argc: Option<usize>) -> Result<&AbiEntry> {
        if method.contains('(') {
            let wanted: String = method.chars().filter(|c| !c.is_whitespace()).collect();
            return self
                .abi
                .functions()
                .find(|e| e.signature() == wanted)
                .ok_or_else(|| Error::UnknownMethod(method.to_string()));
        }

        let candidates = self
            .by_name
            .get(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;
        let mut matching = candidates
            .iter()
            .map(|&i| &self.abi.entries[i])
            .filter(|e| argc.is_none_or(|n| e.inputs.len() == n));
        match (matching.next(), matching.next()) {
            (Some(entry), None) => Ok(entry),
            (None, _) => Err(Error::UnknownMethod(format!(
                "{method} with {} arguments",
                argc.unwrap_or_default()
            ))),
            (Some(_), Some(_)) => Err(Error::UnknownMethod(format!(
                "{method} is overloaded; call it by signature"
            ))),
        }
    }

    /// `selector ‖ abi-encoded args`.
    pub fn encode_input(&self, method: &str, args: &[AbiValue]) -> Result<Vec<u8>> {
        let entry = self.method(method, Some(args.len()))?;
        encode_call(entry, args)
    }

    /// Identifies the function by its selector and decodes the arguments that follow.
    pub fn decode_input_data(&self, data: &[u8]) -> Result<(&AbiEntry, Vec<DecodedParam>)> {
        let Some((selector, rest)) = data.split_first_chunk::<4>() else {
            return Err(Error::Decode(format!(
                "call data is {} bytes, shorter than a selector",
                data.len()
            )));
        };
        let entry = self
            .by_selector
            .get(selector)
            .map(|&i| &self.abi.entries[i])
            .ok_or_else(|| Error::UnknownMethod(format!("selector 0x{}", hex::encode(selector))))?;
        Ok((entry, decode_params(&entry.inputs, rest)?))
    }

    pub fn decode_result(&self, method: &str, data: &[u8]) -> Result<Vec<DecodedParam>> {
        let entry = self.method(method, None)?;
        decode_params(&entry.outputs, data)
    }

    /// Looks an event up by its full 32-byte topic or by the topic's first 4 bytes. A prefix
    /// shared by several events is rejected rather than guessed.
    pub fn decode_event_signature(&self, topic: &[u8]) -> Result<Arc<AbiEntry>> {
        match topic.len() {
            32 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(topic);
                self.events
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| Error::UnknownEvent(format!("topic 0x{}", hex::encode(topic))))
            }
            4 => {
                let mut prefix = [0u8; 4];
                prefix.copy_from_slice(topic);
                event_by_prefix(&self.event_prefixes, prefix)
            }
            n => Err(Error::InvalidParameter(format!(
                "event signature must be 4 or 32 bytes, got {n}"
            ))),
        }
    }

    /// Decodes one log entry by its first topic.
    pub fn decode_event_log<B: AsRef<[u8]>>(&self, topics: &[B], data: &[u8]) -> Result<DecodedEvent> {
        let first = topics
            .first()
            .ok_or_else(|| Error::UnknownEvent("log has no topics".into()))?;
        let first = first.as_ref();
        if first.len() != 32 {
            return Err(Error::Decode(format!(
                "event topic is {} bytes, expected 32",
                first.len()
            )));
        }
        let schema = self.decode_event_signature(first)?;
        decode_event(&schema, topics, data)
    }

    /// Decodes the logs this contract emitted. Logs of other contracts and events missing
    /// from the ABI are skipped.
    pub fn decode_logs(&self, logs: &[Log]) -> Result<Vec<DecodedEvent>> {
        let mut out = Vec::new();
        for log in logs {
            if !log.address.is_empty() && !self.emitted(&log.address) {
                continue;
            }
            match self.decode_event_log(&log.topics, &log.data) {
                Ok(ev) => out.push(ev),
                Err(e @ Error::UnknownEvent(_)) => {
                    tracing::debug!(contract = %self.address, err = %e, "skipping log");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Events carried by a broadcast's receipt.
    pub fn decode_result_logs(&self, result: &BroadcastResult) -> Result<Vec<DecodedEvent>> {
        self.decode_logs(&result.logs)
    }

    /// Receipts carry the 20-byte form; accept the 21-byte form too.
    fn emitted(&self, address: &[u8]) -> bool {
        match address.len() {
            20 => address == self.address.evm_bytes(),
            21 => address == self.address.prefixed_bytes(),
            _ => false,
        }
    }

    fn trigger(&self, caller: TronAddress, data: Vec<u8>, call_value: i64) -> TriggerSmartContract {
        TriggerSmartContract {
            owner_address: caller.bytes(),
            contract_address: self.address.bytes(),
            call_value,
            data,
            ..Default::default()
        }
    }

    /// Runs `method` as a constant call and decodes its outputs.
    pub async fn call(
        &self,
        ctx: &Context,
        caller: TronAddress,
        method: &str,
        args: &[AbiValue],
    ) -> Result<Vec<DecodedParam>> {
        let entry = self.method(method, Some(args.len()))?;
        let data = encode_call(entry, args)?;
        let ext = self
            .client
            .trigger_constant_contract(ctx, self.trigger(caller, data, 0))
            .await?;
        check_envelope(&ext, "call contract")?;
        check_reverted(&ext, &entry.name)?;

        let output = ext.constant_result.concat();
        decode_params(&entry.outputs, &output).map_err(|e| Error::labelled("call contract", e))
    }

    /// Builds, signs and broadcasts a call to `method`.
    pub async fn invoke(
        &self,
        ctx: &Context,
        caller: TronAddress,
        method: &str,
        args: &[AbiValue],
        opts: BroadcastOptions,
        signers: &[&dyn Signer],
    ) -> Result<BroadcastResult> {
        self.invoke_with_value(ctx, caller, method, args, 0, opts, signers)
            .await
    }

    /// [`Contract::invoke`] sending `call_value_sun` along; the method must be payable.
    #[allow(clippy::too_many_arguments)]
    pub async fn invoke_with_value(
        &self,
        ctx: &Context,
        caller: TronAddress,
        method: &str,
        args: &[AbiValue],
        call_value_sun: i64,
        opts: BroadcastOptions,
        signers: &[&dyn Signer],
    ) -> Result<BroadcastResult> {
        let entry = self.method(method, Some(args.len()))?;
        if call_value_sun != 0 && !entry.is_payable() {
            return Err(Error::InvalidParameter(format!(
                "{} is not payable",
                entry.signature()
            )));
        }
        let data = encode_call(entry, args)?;
        let ext = self
            .client
            .trigger_contract(ctx, self.trigger(caller, data, call_value_sun))
            .await?;
        tracing::debug!(
            contract = %self.address,
            method = %entry.signature(),
            "built contract call"
        );
        self.client
            .sign_and_broadcast(ctx, ext, opts, signers)
            .await
    }
}

/// A contract deployment: ABI, creation bytecode and constructor arguments.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Vec<u8>,
    pub constructor_args: Vec<AbiValue>,
    pub call_value_sun: i64,
    /// Share of the caller's energy the contract pays for, 0..=100.
    pub consume_user_resource_percent: i64,
    pub origin_energy_limit: i64,
}

impl DeployRequest {
    pub fn new(name: impl Into<String>, abi: Abi, bytecode: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            abi,
            bytecode,
            constructor_args: Vec::new(),
            call_value_sun: 0,
            consume_user_resource_percent: 100,
            origin_energy_limit: 10_000_000,
        }
    }

    pub fn with_args(mut self, args: Vec<AbiValue>) -> Self {
        self.constructor_args = args;
        self
    }

    /// The `CreateSmartContract` body; constructor arguments are appended to the bytecode.
    pub fn to_message(&self, owner: TronAddress) -> Result<CreateSmartContract> {
        let mut bytecode = self.bytecode.clone();
        match self.abi.constructor() {
            Some(ctor) => bytecode.extend(encode_params(&ctor.inputs, &self.constructor_args)?),
            None if !self.constructor_args.is_empty() => {
                return Err(Error::TypeMismatch(
                    "constructor arguments given but the abi has no constructor".into(),
                ));
            }
            None => {}
        }
        Ok(CreateSmartContract {
            owner_address: owner.bytes(),
            new_contract: Some(SmartContract {
                origin_address: owner.bytes(),
                abi: Some(self.abi.to_proto()),
                bytecode,
                call_value: self.call_value_sun,
                consume_user_resource_percent: self.consume_user_resource_percent,
                name: self.name.clone(),
                origin_energy_limit: self.origin_energy_limit,
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

impl<T: Transport> TronClient<T> {
    /// Deploys `req` from `owner`. With `opts.wait_for_receipt` the new address is available
    /// through [`BroadcastResult::contract_address`].
    pub async fn deploy(
        &self,
        ctx: &Context,
        owner: TronAddress,
        req: &DeployRequest,
        opts: BroadcastOptions,
        signers: &[&dyn Signer],
    ) -> Result<BroadcastResult> {
        let ext = self.deploy_contract(ctx, req.to_message(owner)?).await?;
        self.sign_and_broadcast(ctx, ext, opts, signers).await
    }
}

/// Constant calls report reverts through the transaction's result, not the envelope.
fn check_reverted(ext: &TransactionExtention, method: &str) -> Result<()> {
    let Some(ret) = ext.transaction.as_ref().and_then(|t| t.ret.first()) else {
        return Ok(());
    };
    match ContractResult::try_from(ret.contract_ret) {
        Ok(ContractResult::Default | ContractResult::Success) => Ok(()),
        other => {
            let output = ext.constant_result.concat();
            let reason = revert_reason(&output)
                .unwrap_or_else(|| format!("0x{}", hex::encode(&output)));
            Err(Error::BuildRejected {
                label: "call contract".to_string(),
                code: ResponseCode::ContractExeError,
                message: format!(
                    "{method} failed ({}): {reason}",
                    other.map(|r| format!("{r:?}")).unwrap_or_else(|_| ret.contract_ret.to_string())
                ),
            })
        }
    }
}

/// Message of an `Error(string)` revert.
fn revert_reason(output: &[u8]) -> Option<String> {
    let rest = output.strip_prefix(&REVERT_SELECTOR)?;
    let params = [AbiParam::new("reason", "string")];
    let mut decoded = decode_params(&params, rest).ok()?;
    match decoded.pop()?.value {
        AbiValue::String(s) => Some(s),
        _ => None,
    }
}

fn event_by_prefix(
    index: &HashMap<[u8; 4], Vec<Arc<AbiEntry>>>,
    prefix: [u8; 4],
) -> Result<Arc<AbiEntry>> {
    match index.get(&prefix).map(Vec::as_slice) {
        Some([only]) => Ok(only.clone()),
        Some(many) if !many.is_empty() => {
            let mut signatures: Vec<String> = many.iter().map(|e| e.signature()).collect();
            signatures.sort();
            Err(Error::InvalidParameter(format!(
                "topic prefix 0x{} is shared by {}; use the full topic",
                hex::encode(prefix),
                signatures.join(", ")
            )))
        }
        _ => Err(Error::UnknownEvent(format!(
            "topic prefix 0x{}",
            hex::encode(prefix)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::StateMutability;
    use crate::event::encode_event_log;
    use prost::Message;
    use std::time::Duration;

    #[derive(Clone)]
    struct Offline;

    impl Transport for Offline {
        async fn unary<Req, Resp>(
            &mut self,
            path: &'static str,
            _request: Req,
        ) -> std::result::Result<Resp, tonic::Status>
        where
            Req: Message + Send + Sync + 'static,
            Resp: Message + Default + Send + Sync + 'static,
        {
            Err(tonic::Status::unavailable(path))
        }
    }

    fn offline_client() -> Arc<TronClient<Offline>> {
        Arc::new(
            TronClient::with_factory(
                "grpc://offline:50051",
                Arc::new(|| Box::pin(async { Ok(Offline) })),
                Default::default(),
                Duration::from_secs(1),
            )
            .unwrap(),
        )
    }

    fn token_abi() -> Abi {
        let mut deposit = AbiEntry::function("deposit", vec![], vec![]);
        deposit.state_mutability = StateMutability::Payable;
        Abi::new(vec![
            AbiEntry::function(
                "transfer",
                vec![AbiParam::new("to", "address"), AbiParam::new("value", "uint256")],
                vec![AbiParam::new("", "bool")],
            ),
            AbiEntry::function("mint", vec![AbiParam::new("value", "uint256")], vec![]),
            AbiEntry::function(
                "mint",
                vec![AbiParam::new("to", "address"), AbiParam::new("value", "uint256")],
                vec![],
            ),
            deposit,
            AbiEntry::event(
                "Transfer",
                vec![
                    AbiParam::new("from", "address").indexed(),
                    AbiParam::new("to", "address").indexed(),
                    AbiParam::new("value", "uint256"),
                ],
            ),
        ])
    }

    fn token() -> Contract<Offline> {
        let addr = TronAddress::from_base58check("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t").unwrap();
        Contract::with_abi(offline_client(), addr, token_abi())
    }

    #[test]
    fn overloads_resolve_by_arity_or_signature() {
        let c = token();
        assert_eq!(c.method("mint", Some(1)).unwrap().signature(), "mint(uint256)");
        assert_eq!(
            c.method("mint", Some(2)).unwrap().signature(),
            "mint(address,uint256)"
        );
        assert!(matches!(c.method("mint", None), Err(Error::UnknownMethod(_))));
        assert_eq!(
            c.method("mint(address, uint256)", None).unwrap().inputs.len(),
            2
        );
        assert!(matches!(c.method("burn", None), Err(Error::UnknownMethod(_))));
    }

    #[test]
    fn input_data_round_trips() {
        let c = token();
        let to = TronAddress::from_base58check("TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55").unwrap();
        let data = c
            .encode_input("transfer", &[to.into(), 5u64.into()])
            .unwrap();
        let (entry, params) = c.decode_input_data(&data).unwrap();
        assert_eq!(entry.name, "transfer");
        assert_eq!(params[0].value, AbiValue::Address(to));
        assert_eq!(params[1].value.as_u256(), Some(alloy::primitives::U256::from(5u64)));

        assert!(matches!(
            c.decode_input_data(&[0xde, 0xad, 0xbe, 0xef]),
            Err(Error::UnknownMethod(_))
        ));
        assert!(matches!(c.decode_input_data(&[1, 2]), Err(Error::Decode(_))));
    }

    #[test]
    fn event_lookup_by_full_topic_and_prefix() {
        let c = token();
        let topic = c.abi().events().next().unwrap().topic();
        assert_eq!(c.decode_event_signature(&topic).unwrap().name, "Transfer");
        assert_eq!(c.decode_event_signature(&topic[..4]).unwrap().name, "Transfer");
        assert!(matches!(
            c.decode_event_signature(&[0u8; 32]),
            Err(Error::UnknownEvent(_))
        ));
        assert!(matches!(
            c.decode_event_signature(&[0u8; 7]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn colliding_prefix_is_an_error() {
        let a = Arc::new(AbiEntry::event("Approval", vec![]));
        let b = Arc::new(AbiEntry::event("Burn", vec![]));
        let prefix = [0xde, 0xad, 0xbe, 0xef];
        let index = HashMap::from([(prefix, vec![b, a.clone()]), ([1, 2, 3, 4], vec![a])]);

        let err = event_by_prefix(&index, prefix).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)), "{err}");
        assert!(err.to_string().contains("Approval(), Burn()"), "{err}");
        assert_eq!(event_by_prefix(&index, [1, 2, 3, 4]).unwrap().name, "Approval");
        assert!(matches!(
            event_by_prefix(&index, [0; 4]),
            Err(Error::UnknownEvent(_))
        ));
    }

    #[test]
    fn logs_of_other_contracts_are_skipped() {
        let c = token();
        let schema = c.abi().events().next().unwrap().clone();
        let from = TronAddress::from_base58check("TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55").unwrap();
        let (topics, data) =
            encode_event_log(&schema, &[from.into(), from.into(), 9u64.into()]).unwrap();
        let log = |address: Vec<u8>| Log {
            address,
            topics: topics.iter().map(|t| t.to_vec()).collect(),
            data: data.clone(),
        };
        let logs = vec![
            log(c.address().evm_bytes().to_vec()),
            log(from.evm_bytes().to_vec()),
            Log {
                address: c.address().evm_bytes().to_vec(),
                topics: vec![vec![0u8; 32]],
                data: Vec::new(),
            },
        ];
        let events = c.decode_logs(&logs).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get("value").and_then(AbiValue::as_u256), Some(alloy::primitives::U256::from(9u64)));
    }

    #[test]
    fn empty_abi_knows_nothing() {
        let c = Contract::with_abi(offline_client(), token().address(), Abi::default());
        assert!(matches!(c.encode_input("transfer", &[]), Err(Error::UnknownMethod(_))));
        assert!(matches!(
            c.decode_event_log(&[[0u8; 32]], &[]),
            Err(Error::UnknownEvent(_))
        ));
    }

    #[tokio::test]
    async fn value_on_non_payable_method_is_rejected_before_rpc() {
        let c = token();
        let caller = TronAddress::from_base58check("TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55").unwrap();
        let err = c
            .invoke_with_value(
                &Context::background(),
                caller,
                "transfer",
                &[caller.into(), 1u64.into()],
                10,
                BroadcastOptions::default(),
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)), "{err}");
    }

    #[test]
    fn revert_reason_is_decoded() {
        let mut output = REVERT_SELECTOR.to_vec();
        output.extend(
            encode_params(&[AbiParam::new("", "string")], &["insufficient balance".into()])
                .unwrap(),
        );
        assert_eq!(revert_reason(&output).as_deref(), Some("insufficient balance"));
        assert_eq!(revert_reason(&[1, 2, 3]), None);
    }

    #[test]
    fn deploy_appends_constructor_args() {
        let mut abi = token_abi();
        abi.entries.push(AbiEntry {
            kind: EntryKind::Constructor,
            ..AbiEntry::function("", vec![AbiParam::new("supply", "uint256")], vec![])
        });
        let owner = TronAddress::from_base58check("TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55").unwrap();
        let msg = DeployRequest::new("Token", abi, vec![0x60, 0x80])
            .with_args(vec![1000u64.into()])
            .to_message(owner)
            .unwrap();
        let sc = msg.new_contract.unwrap();
        assert_eq!(sc.bytecode.len(), 2 + 32);
        assert_eq!(sc.bytecode[33], 0xe8);
        assert_eq!(sc.abi.unwrap().entrys.len(), 6);

        let no_ctor = DeployRequest::new("Token", token_abi(), vec![0x60])
            .with_args(vec![1u64.into()])
            .to_message(owner);
        assert!(matches!(no_ctor, Err(Error::TypeMismatch(_))));
    }
}
