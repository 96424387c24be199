//! TRON node client core: pooled gRPC dispatch, transaction signing and broadcast, and an
//! ABI codec for contract calls and event logs.

pub mod abi;
mod address;
mod broadcast;
mod client;
pub mod config;
mod context;
mod contract;
mod error;
pub mod event;
pub mod grpc;
pub mod pool;
pub mod protocol;
pub mod resources;
mod telemetry;
pub mod tx;
pub mod units;
pub mod wallet;

pub use abi::{Abi, AbiEntry, AbiParam, AbiValue, DecodedParam};
pub use address::TronAddress;
pub use broadcast::{
    BroadcastOptions, BroadcastResult, DEFAULT_FEE_LIMIT_SUN, DEFAULT_POLL_INTERVAL,
    DEFAULT_WAIT_TIMEOUT,
};
pub use client::{Envelope, TronClient, check_envelope};
pub use config::{ClientConfig, Endpoint, PoolConfig};
pub use context::Context;
pub use contract::{Contract, DeployRequest};
pub use error::{Error, Result};
pub use event::DecodedEvent;
pub use tx::{TxId, TxInput};
pub use wallet::{Signer, TronWallet};
