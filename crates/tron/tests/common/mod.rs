#![allow(dead_code)]

use prost::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tonic::Status;
use tron_client::grpc::Transport;
use tron_client::pool::ConnFactory;
use tron_client::protocol::transaction::contract::ContractType;
use tron_client::protocol::transaction::{Contract, Raw};
use tron_client::protocol::{Transaction, TransactionExtention, TriggerSmartContract};
use tron_client::{PoolConfig, TronAddress, TronClient, TronWallet};

pub const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
pub const HOLDER: &str = "TXBwCB1RxvMPZTZE79aJn9KjLbdSXMax55";

type Handler = Box<dyn FnMut(&[u8]) -> Result<Vec<u8>, Status> + Send>;

/// In-memory wallet service. Handlers are registered per gRPC path; every request is
/// recorded so tests can inspect what reached the node.
#[derive(Clone, Default)]
pub struct FakeNode {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    handlers: Mutex<HashMap<&'static str, Handler>>,
    requests: Mutex<Vec<(&'static str, Vec<u8>)>>,
    connects: AtomicUsize,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `path` with `f`.
    pub fn on<Req, Resp, F>(&self, path: &'static str, mut f: F) -> &Self
    where
        Req: Message + Default,
        Resp: Message,
        F: FnMut(Req) -> Result<Resp, Status> + Send + 'static,
    {
        let handler: Handler = Box::new(move |bytes| {
            let req = Req::decode(bytes).map_err(|e| Status::invalid_argument(e.to_string()))?;
            f(req).map(|resp| resp.encode_to_vec())
        });
        self.inner.handlers.lock().unwrap().insert(path, handler);
        self
    }

    pub fn calls(&self, path: &str) -> usize {
        self.inner
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }

    /// Requests received on `path`, decoded as `Req`.
    pub fn requests<Req: Message + Default>(&self, path: &str) -> Vec<Req> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == path)
            .map(|(_, bytes)| Req::decode(bytes.as_slice()).unwrap())
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> TronClient<FakeNode> {
        self.client_with_timeout(Duration::from_secs(5))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> TronClient<FakeNode> {
        let node = self.clone();
        let factory: ConnFactory<FakeNode> = Arc::new(move || {
            let node = node.clone();
            Box::pin(async move {
                node.inner.connects.fetch_add(1, Ordering::SeqCst);
                Ok(node)
            })
        });
        TronClient::with_factory("grpc://fake:50051", factory, PoolConfig::default(), timeout)
            .unwrap()
    }

    fn handle(&self, path: &'static str, body: Vec<u8>) -> Result<Vec<u8>, Status> {
        self.inner.requests.lock().unwrap().push((path, body.clone()));
        let mut handlers = self.inner.handlers.lock().unwrap();
        match handlers.get_mut(path) {
            Some(h) => h(&body),
            None => Err(Status::unimplemented(path)),
        }
    }
}

impl Transport for FakeNode {
    async fn unary<Req, Resp>(
        &mut self,
        path: &'static str,
        request: Req,
    ) -> Result<Resp, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let out = self.handle(path, request.encode_to_vec())?;
        Resp::decode(out.as_slice()).map_err(|e| Status::internal(e.to_string()))
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

pub fn wallet(byte: u8) -> TronWallet {
    TronWallet::new([byte; 32]).unwrap()
}

pub fn addr(s: &str) -> TronAddress {
    TronAddress::from_base58check(s).unwrap()
}

/// An unsigned trigger of `USDT` expiring `expires_in` from now.
pub fn trigger_tx(owner: TronAddress, expires_in: Duration) -> Transaction {
    let msg = TriggerSmartContract {
        owner_address: owner.bytes(),
        contract_address: addr(USDT).bytes(),
        data: vec![0x70, 0xa0, 0x82, 0x31],
        ..Default::default()
    };
    let now = now_millis();
    Transaction {
        raw_data: Some(Raw {
            ref_block_bytes: vec![0x01, 0x02],
            ref_block_hash: vec![0xab; 8],
            expiration: now + expires_in.as_millis() as i64,
            timestamp: now,
            contract: vec![Contract::pack(
                ContractType::TriggerSmartContract,
                "TriggerSmartContract",
                &msg,
            )],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// What `TriggerContract` answers for `msg`: an unsigned body expiring `expires_in` from now,
/// with no envelope set.
pub fn built_trigger(msg: &TriggerSmartContract, expires_in: Duration) -> TransactionExtention {
    let now = now_millis();
    TransactionExtention {
        transaction: Some(Transaction {
            raw_data: Some(Raw {
                ref_block_bytes: vec![0x01, 0x02],
                ref_block_hash: vec![0xab; 8],
                expiration: now + expires_in.as_millis() as i64,
                timestamp: now,
                contract: vec![Contract::pack(
                    ContractType::TriggerSmartContract,
                    "TriggerSmartContract",
                    msg,
                )],
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
