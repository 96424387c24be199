//! Messages of the Tron node `protocol.Wallet` gRPC service.
//!
//! Only the messages and fields consumed by this crate are declared. Field tags follow the
//! node's `Tron.proto`, `Contract.proto`, `smart_contract.proto` and `api.proto`; prost skips
//! unknown fields on decode, so partial declarations stay wire compatible. The exception is
//! `transaction::Raw`: its encoding is the txid preimage, so every field is declared.

use prost::Message;
use std::collections::BTreeMap;

pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/protocol.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResourceCode {
    Bandwidth = 0,
    Energy = 1,
    TronPower = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AccountType {
    Normal = 0,
    AssetIssue = 1,
    Contract = 2,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountId {
    #[prost(bytes = "vec", tag = "1")]
    pub name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Authority {
    #[prost(message, optional, tag = "1")]
    pub account: Option<AccountId>,
    #[prost(bytes = "vec", tag = "2")]
    pub permission_name: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(message, optional, tag = "1")]
    pub raw_data: Option<transaction::Raw>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "5")]
    pub ret: Vec<transaction::Result>,
}

pub mod transaction {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct Raw {
        #[prost(bytes = "vec", tag = "1")]
        pub ref_block_bytes: Vec<u8>,
        #[prost(int64, tag = "3")]
        pub ref_block_num: i64,
        #[prost(bytes = "vec", tag = "4")]
        pub ref_block_hash: Vec<u8>,
        #[prost(int64, tag = "8")]
        pub expiration: i64,
        #[prost(message, repeated, tag = "9")]
        pub auths: Vec<super::Authority>,
        #[prost(bytes = "vec", tag = "10")]
        pub data: Vec<u8>,
        #[prost(message, repeated, tag = "11")]
        pub contract: Vec<Contract>,
        #[prost(bytes = "vec", tag = "12")]
        pub scripts: Vec<u8>,
        #[prost(int64, tag = "14")]
        pub timestamp: i64,
        #[prost(int64, tag = "18")]
        pub fee_limit: i64,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Contract {
        #[prost(enumeration = "contract::ContractType", tag = "1")]
        pub r#type: i32,
        #[prost(message, optional, tag = "2")]
        pub parameter: Option<::prost_types::Any>,
        #[prost(bytes = "vec", tag = "3")]
        pub provider: Vec<u8>,
        #[prost(bytes = "vec", tag = "4")]
        pub contract_name: Vec<u8>,
        #[prost(int32, tag = "5")]
        pub permission_id: i32,
    }

    pub mod contract {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum ContractType {
            AccountCreateContract = 0,
            TransferContract = 1,
            TransferAssetContract = 2,
            VoteAssetContract = 3,
            VoteWitnessContract = 4,
            WitnessCreateContract = 5,
            AssetIssueContract = 6,
            WitnessUpdateContract = 8,
            ParticipateAssetIssueContract = 9,
            AccountUpdateContract = 10,
            FreezeBalanceContract = 11,
            UnfreezeBalanceContract = 12,
            WithdrawBalanceContract = 13,
            UnfreezeAssetContract = 14,
            UpdateAssetContract = 15,
            ProposalCreateContract = 16,
            ProposalApproveContract = 17,
            ProposalDeleteContract = 18,
            SetAccountIdContract = 19,
            CustomContract = 20,
            CreateSmartContract = 30,
            TriggerSmartContract = 31,
            GetContract = 32,
            UpdateSettingContract = 33,
            ExchangeCreateContract = 41,
            ExchangeInjectContract = 42,
            ExchangeWithdrawContract = 43,
            ExchangeTransactionContract = 44,
            UpdateEnergyLimitContract = 45,
            AccountPermissionUpdateContract = 46,
            ClearAbiContract = 48,
            UpdateBrokerageContract = 49,
            ShieldedTransferContract = 51,
            MarketSellAssetContract = 52,
            MarketCancelOrderContract = 53,
            FreezeBalanceV2Contract = 54,
            UnfreezeBalanceV2Contract = 55,
            WithdrawExpireUnfreezeContract = 56,
            DelegateResourceContract = 57,
            UnDelegateResourceContract = 58,
            CancelAllUnfreezeV2Contract = 59,
        }
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Result {
        #[prost(int64, tag = "1")]
        pub fee: i64,
        #[prost(enumeration = "result::Code", tag = "2")]
        pub ret: i32,
        #[prost(enumeration = "result::ContractResult", tag = "3")]
        pub contract_ret: i32,
    }

    pub mod result {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum Code {
            Sucess = 0,
            Failed = 1,
        }

        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum ContractResult {
            Default = 0,
            Success = 1,
            Revert = 2,
            BadJumpDestination = 3,
            OutOfMemory = 4,
            PrecompiledContract = 5,
            StackTooSmall = 6,
            StackTooLarge = 7,
            IllegalOperation = 8,
            StackOverflow = 9,
            OutOfEnergy = 10,
            OutOfTime = 11,
            JvmStackOverFlow = 12,
            Unknown = 13,
            TransferFailed = 14,
            InvalidCode = 15,
        }
    }

    impl Contract {
        /// Wraps a typed contract message into the `Any` parameter.
        pub fn pack<M: Message>(ty: contract::ContractType, name: &str, msg: &M) -> Self {
            Self {
                r#type: ty as i32,
                parameter: Some(::prost_types::Any {
                    type_url: format!("{}{name}", super::TYPE_URL_PREFIX),
                    value: msg.encode_to_vec(),
                }),
                ..Default::default()
            }
        }

        /// Decodes the `Any` parameter as `M`.
        pub fn unpack<M: Message + Default>(&self) -> std::result::Result<M, prost::DecodeError> {
            let any = self
                .parameter
                .as_ref()
                .ok_or_else(|| prost::DecodeError::new("contract has no parameter"))?;
            M::decode(any.value.as_slice())
        }
    }
}

/// Envelope returned by build and broadcast RPCs.
#[derive(Clone, PartialEq, Message)]
pub struct Return {
    #[prost(bool, tag = "1")]
    pub result: bool,
    #[prost(enumeration = "r#return::ResponseCode", tag = "2")]
    pub code: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub message: Vec<u8>,
}

pub mod r#return {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ResponseCode {
        Success = 0,
        Sigerror = 1,
        ContractValidateError = 2,
        ContractExeError = 3,
        BandwithError = 4,
        DupTransactionError = 5,
        TaposError = 6,
        TooBigTransactionError = 7,
        TransactionExpirationError = 8,
        ServerBusy = 9,
        NoConnection = 10,
        NotEnoughEffectiveConnection = 11,
        BlockUnsolidified = 12,
        OtherError = 20,
    }
}

impl Return {
    pub fn response_code(&self) -> r#return::ResponseCode {
        r#return::ResponseCode::try_from(self.code).unwrap_or(r#return::ResponseCode::OtherError)
    }

    pub fn message_utf8(&self) -> String {
        String::from_utf8_lossy(&self.message).into_owned()
    }
}

/// Spelling follows the node's `api.proto`.
#[derive(Clone, PartialEq, Message)]
pub struct TransactionExtention {
    #[prost(message, optional, tag = "1")]
    pub transaction: Option<Transaction>,
    #[prost(bytes = "vec", tag = "2")]
    pub txid: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub constant_result: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "4")]
    pub result: Option<Return>,
    #[prost(int64, tag = "5")]
    pub energy_used: i64,
    #[prost(message, repeated, tag = "6")]
    pub logs: Vec<transaction_info::Log>,
    #[prost(int64, tag = "8")]
    pub energy_penalty: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct EstimateEnergyMessage {
    #[prost(message, optional, tag = "1")]
    pub result: Option<Return>,
    #[prost(int64, tag = "2")]
    pub energy_required: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ResourceReceipt {
    #[prost(int64, tag = "1")]
    pub energy_usage: i64,
    #[prost(int64, tag = "2")]
    pub energy_fee: i64,
    #[prost(int64, tag = "3")]
    pub origin_energy_usage: i64,
    #[prost(int64, tag = "4")]
    pub energy_usage_total: i64,
    #[prost(int64, tag = "5")]
    pub net_usage: i64,
    #[prost(int64, tag = "6")]
    pub net_fee: i64,
    #[prost(enumeration = "transaction::result::ContractResult", tag = "7")]
    pub result: i32,
    #[prost(int64, tag = "8")]
    pub energy_penalty_total: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionInfo {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub fee: i64,
    #[prost(int64, tag = "3")]
    pub block_number: i64,
    #[prost(int64, tag = "4")]
    pub block_time_stamp: i64,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub contract_result: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "6")]
    pub contract_address: Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub receipt: Option<ResourceReceipt>,
    #[prost(message, repeated, tag = "8")]
    pub log: Vec<transaction_info::Log>,
    #[prost(enumeration = "transaction_info::Code", tag = "9")]
    pub result: i32,
    #[prost(bytes = "vec", tag = "10")]
    pub res_message: Vec<u8>,
    #[prost(int64, tag = "15")]
    pub withdraw_amount: i64,
    #[prost(int64, tag = "16")]
    pub unfreeze_amount: i64,
    #[prost(int64, tag = "27")]
    pub packing_fee: i64,
    #[prost(int64, tag = "28")]
    pub withdraw_expire_amount: i64,
}

pub mod transaction_info {
    use prost::Message;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Code {
        Sucess = 0,
        Failed = 1,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Log {
        #[prost(bytes = "vec", tag = "1")]
        pub address: Vec<u8>,
        #[prost(bytes = "vec", repeated, tag = "2")]
        pub topics: Vec<Vec<u8>>,
        #[prost(bytes = "vec", tag = "3")]
        pub data: Vec<u8>,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionInfoList {
    #[prost(message, repeated, tag = "1")]
    pub transaction_info: Vec<TransactionInfo>,
}

// ---- contract payloads ----

#[derive(Clone, PartialEq, Message)]
pub struct TransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TriggerSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub call_value: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_token_value: i64,
    #[prost(int64, tag = "6")]
    pub token_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct CreateSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub new_contract: Option<SmartContract>,
    #[prost(int64, tag = "3")]
    pub call_token_value: i64,
    #[prost(int64, tag = "4")]
    pub token_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct SmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub origin_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub abi: Option<smart_contract::Abi>,
    #[prost(bytes = "vec", tag = "4")]
    pub bytecode: Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_value: i64,
    #[prost(int64, tag = "6")]
    pub consume_user_resource_percent: i64,
    #[prost(string, tag = "7")]
    pub name: String,
    #[prost(int64, tag = "8")]
    pub origin_energy_limit: i64,
    #[prost(bytes = "vec", tag = "9")]
    pub code_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub trx_hash: Vec<u8>,
    #[prost(int32, tag = "11")]
    pub version: i32,
}

pub mod smart_contract {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct Abi {
        #[prost(message, repeated, tag = "1")]
        pub entrys: Vec<abi::Entry>,
    }

    pub mod abi {
        use prost::Message;

        #[derive(Clone, PartialEq, Message)]
        pub struct Entry {
            #[prost(bool, tag = "1")]
            pub anonymous: bool,
            #[prost(bool, tag = "2")]
            pub constant: bool,
            #[prost(string, tag = "3")]
            pub name: String,
            #[prost(message, repeated, tag = "4")]
            pub inputs: Vec<entry::Param>,
            #[prost(message, repeated, tag = "5")]
            pub outputs: Vec<entry::Param>,
            #[prost(enumeration = "entry::EntryType", tag = "6")]
            pub r#type: i32,
            #[prost(bool, tag = "7")]
            pub payable: bool,
            #[prost(enumeration = "entry::StateMutabilityType", tag = "8")]
            pub state_mutability: i32,
        }

        pub mod entry {
            use prost::Message;

            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum EntryType {
                UnknownEntryType = 0,
                Constructor = 1,
                Function = 2,
                Event = 3,
                Fallback = 4,
                Receive = 5,
                Error = 6,
            }

            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum StateMutabilityType {
                UnknownMutabilityType = 0,
                Pure = 1,
                View = 2,
                Nonpayable = 3,
                Payable = 4,
            }

            #[derive(Clone, PartialEq, Message)]
            pub struct Param {
                #[prost(bool, tag = "1")]
                pub indexed: bool,
                #[prost(string, tag = "2")]
                pub name: String,
                #[prost(string, tag = "3")]
                pub r#type: String,
            }
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct FreezeBalanceV2Contract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub frozen_balance: i64,
    #[prost(enumeration = "ResourceCode", tag = "3")]
    pub resource: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct UnfreezeBalanceV2Contract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub unfreeze_balance: i64,
    #[prost(enumeration = "ResourceCode", tag = "3")]
    pub resource: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct DelegateResourceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(enumeration = "ResourceCode", tag = "2")]
    pub resource: i32,
    #[prost(int64, tag = "3")]
    pub balance: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub receiver_address: Vec<u8>,
    #[prost(bool, tag = "5")]
    pub lock: bool,
    #[prost(int64, tag = "6")]
    pub lock_period: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct UnDelegateResourceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(enumeration = "ResourceCode", tag = "2")]
    pub resource: i32,
    #[prost(int64, tag = "3")]
    pub balance: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub receiver_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WithdrawBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WithdrawExpireUnfreezeContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Key {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub weight: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Permission {
    #[prost(enumeration = "permission::PermissionType", tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub id: i32,
    #[prost(string, tag = "3")]
    pub permission_name: String,
    #[prost(int64, tag = "4")]
    pub threshold: i64,
    #[prost(int32, tag = "5")]
    pub parent_id: i32,
    /// 32-byte bitmap of allowed contract types.
    #[prost(bytes = "vec", tag = "6")]
    pub operations: Vec<u8>,
    #[prost(message, repeated, tag = "7")]
    pub keys: Vec<Key>,
}

pub mod permission {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum PermissionType {
        Owner = 0,
        Witness = 1,
        Active = 2,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountPermissionUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub owner: Option<Permission>,
    #[prost(message, optional, tag = "3")]
    pub witness: Option<Permission>,
    #[prost(message, repeated, tag = "4")]
    pub actives: Vec<Permission>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Vote {
    #[prost(bytes = "vec", tag = "1")]
    pub vote_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct VoteWitnessContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub votes: Vec<Vote>,
    #[prost(bool, tag = "3")]
    pub support: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProposalCreateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(btree_map = "int64, int64", tag = "2")]
    pub parameters: BTreeMap<i64, i64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProposalApproveContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub proposal_id: i64,
    #[prost(bool, tag = "3")]
    pub is_add_approval: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProposalDeleteContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub proposal_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ExchangeTransactionContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub exchange_id: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub token_id: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub quant: i64,
    #[prost(int64, tag = "5")]
    pub expected: i64,
}

// ---- query messages ----

#[derive(Clone, PartialEq, Message)]
pub struct EmptyMessage {}

#[derive(Clone, PartialEq, Message)]
pub struct NumberMessage {
    #[prost(int64, tag = "1")]
    pub num: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct BytesMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Account {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: Vec<u8>,
    #[prost(enumeration = "AccountType", tag = "2")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub address: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub balance: i64,
    #[prost(btree_map = "string, int64", tag = "6")]
    pub asset: BTreeMap<String, i64>,
    #[prost(int64, tag = "9")]
    pub create_time: i64,
    #[prost(int64, tag = "10")]
    pub latest_opration_time: i64,
    #[prost(int64, tag = "11")]
    pub allowance: i64,
    #[prost(int64, tag = "12")]
    pub latest_withdraw_time: i64,
    #[prost(int64, tag = "14")]
    pub net_usage: i64,
    #[prost(int64, tag = "20")]
    pub free_net_usage: i64,
    #[prost(btree_map = "string, int64", tag = "56")]
    pub asset_v2: BTreeMap<String, i64>,
    #[prost(message, optional, tag = "31")]
    pub owner_permission: Option<Permission>,
    #[prost(message, optional, tag = "32")]
    pub witness_permission: Option<Permission>,
    #[prost(message, repeated, tag = "33")]
    pub active_permission: Vec<Permission>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountNetMessage {
    #[prost(int64, tag = "1")]
    pub free_net_used: i64,
    #[prost(int64, tag = "2")]
    pub free_net_limit: i64,
    #[prost(int64, tag = "3")]
    pub net_used: i64,
    #[prost(int64, tag = "4")]
    pub net_limit: i64,
    #[prost(int64, tag = "7")]
    pub total_net_limit: i64,
    #[prost(int64, tag = "8")]
    pub total_net_weight: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountResourceMessage {
    #[prost(int64, tag = "1")]
    pub free_net_used: i64,
    #[prost(int64, tag = "2")]
    pub free_net_limit: i64,
    #[prost(int64, tag = "3")]
    pub net_used: i64,
    #[prost(int64, tag = "4")]
    pub net_limit: i64,
    #[prost(int64, tag = "7")]
    pub total_net_limit: i64,
    #[prost(int64, tag = "8")]
    pub total_net_weight: i64,
    #[prost(int64, tag = "9")]
    pub total_tron_power_weight: i64,
    #[prost(int64, tag = "10")]
    pub tron_power_used: i64,
    #[prost(int64, tag = "11")]
    pub tron_power_limit: i64,
    #[prost(int64, tag = "13")]
    pub energy_used: i64,
    #[prost(int64, tag = "14")]
    pub energy_limit: i64,
    #[prost(int64, tag = "15")]
    pub total_energy_limit: i64,
    #[prost(int64, tag = "16")]
    pub total_energy_weight: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChainParameters {
    #[prost(message, repeated, tag = "1")]
    pub chain_parameter: Vec<chain_parameters::ChainParameter>,
}

pub mod chain_parameters {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct ChainParameter {
        #[prost(string, tag = "1")]
        pub key: String,
        #[prost(int64, tag = "2")]
        pub value: i64,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct BlockHeader {
    #[prost(message, optional, tag = "1")]
    pub raw_data: Option<block_header::Raw>,
    #[prost(bytes = "vec", tag = "2")]
    pub witness_signature: Vec<u8>,
}

pub mod block_header {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct Raw {
        #[prost(int64, tag = "1")]
        pub timestamp: i64,
        #[prost(bytes = "vec", tag = "2")]
        pub tx_trie_root: Vec<u8>,
        #[prost(bytes = "vec", tag = "3")]
        pub parent_hash: Vec<u8>,
        #[prost(int64, tag = "7")]
        pub number: i64,
        #[prost(int64, tag = "8")]
        pub witness_id: i64,
        #[prost(bytes = "vec", tag = "9")]
        pub witness_address: Vec<u8>,
        #[prost(int32, tag = "10")]
        pub version: i32,
        #[prost(bytes = "vec", tag = "11")]
        pub account_state_root: Vec<u8>,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Block {
    #[prost(message, repeated, tag = "1")]
    pub transactions: Vec<Transaction>,
    #[prost(message, optional, tag = "2")]
    pub block_header: Option<BlockHeader>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BlockExtention {
    #[prost(message, repeated, tag = "1")]
    pub transactions: Vec<TransactionExtention>,
    #[prost(message, optional, tag = "2")]
    pub block_header: Option<BlockHeader>,
    #[prost(bytes = "vec", tag = "3")]
    pub blockid: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Witness {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub pub_key: Vec<u8>,
    #[prost(string, tag = "4")]
    pub url: String,
    #[prost(int64, tag = "5")]
    pub total_produced: i64,
    #[prost(int64, tag = "6")]
    pub total_missed: i64,
    #[prost(int64, tag = "7")]
    pub latest_block_num: i64,
    #[prost(int64, tag = "8")]
    pub latest_slot_num: i64,
    #[prost(bool, tag = "9")]
    pub is_jobs: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct WitnessList {
    #[prost(message, repeated, tag = "1")]
    pub witnesses: Vec<Witness>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeAddress {
    #[prost(bytes = "vec", tag = "1")]
    pub host: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub port: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Node {
    #[prost(message, optional, tag = "1")]
    pub address: Option<NodeAddress>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeList {
    #[prost(message, repeated, tag = "1")]
    pub nodes: Vec<Node>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NodeInfo {
    #[prost(int64, tag = "1")]
    pub begin_sync_num: i64,
    #[prost(string, tag = "2")]
    pub block: String,
    #[prost(string, tag = "3")]
    pub solidity_block: String,
    #[prost(int32, tag = "4")]
    pub current_connect_count: i32,
    #[prost(int32, tag = "5")]
    pub active_connect_count: i32,
    #[prost(int32, tag = "6")]
    pub passive_connect_count: i32,
    #[prost(int64, tag = "7")]
    pub total_flow: i64,
}

impl BlockExtention {
    pub fn number(&self) -> i64 {
        self.block_header
            .as_ref()
            .and_then(|h| h.raw_data.as_ref())
            .map(|r| r.number)
            .unwrap_or_default()
    }
}
