use crate::config::Endpoint;
use crate::error::{Error, Result};
use crate::protocol::{
    Account, AccountNetMessage, AccountPermissionUpdateContract, AccountResourceMessage,
    AccountUpdateContract, Block, BlockExtention, BytesMessage, ChainParameters,
    CreateSmartContract, DelegateResourceContract, EmptyMessage, EstimateEnergyMessage,
    ExchangeTransactionContract, FreezeBalanceV2Contract, NodeInfo, NodeList, NumberMessage,
    ProposalApproveContract, ProposalCreateContract, ProposalDeleteContract, Return,
    SmartContract, Transaction, TransactionExtention, TransactionInfo, TransactionInfoList,
    TransferAssetContract, TransferContract, TriggerSmartContract, UnDelegateResourceContract,
    UnfreezeBalanceV2Contract, VoteWitnessContract, WithdrawBalanceContract,
    WithdrawExpireUnfreezeContract, WitnessList,
};
use std::future::Future;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{AsciiMetadataValue, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::{Request, Status};

/// Full gRPC paths of the `protocol.Wallet` methods this crate calls.
pub mod methods {
    pub const GET_ACCOUNT: &str = "/protocol.Wallet/GetAccount";
    pub const GET_ACCOUNT_NET: &str = "/protocol.Wallet/GetAccountNet";
    pub const GET_ACCOUNT_RESOURCE: &str = "/protocol.Wallet/GetAccountResource";
    pub const GET_TRANSACTION_BY_ID: &str = "/protocol.Wallet/GetTransactionById";
    pub const GET_TRANSACTION_INFO_BY_ID: &str = "/protocol.Wallet/GetTransactionInfoById";
    pub const GET_TRANSACTION_INFO_BY_BLOCK_NUM: &str =
        "/protocol.Wallet/GetTransactionInfoByBlockNum";
    pub const GET_CONTRACT: &str = "/protocol.Wallet/GetContract";
    pub const GET_NOW_BLOCK2: &str = "/protocol.Wallet/GetNowBlock2";
    pub const GET_BLOCK_BY_NUM2: &str = "/protocol.Wallet/GetBlockByNum2";
    pub const GET_BLOCK_BY_ID: &str = "/protocol.Wallet/GetBlockById";
    pub const GET_CHAIN_PARAMETERS: &str = "/protocol.Wallet/GetChainParameters";
    pub const GET_NODE_INFO: &str = "/protocol.Wallet/GetNodeInfo";
    pub const LIST_NODES: &str = "/protocol.Wallet/ListNodes";
    pub const LIST_WITNESSES: &str = "/protocol.Wallet/ListWitnesses";
    pub const GET_REWARD_INFO: &str = "/protocol.Wallet/GetRewardInfo";

    pub const CREATE_TRANSACTION2: &str = "/protocol.Wallet/CreateTransaction2";
    pub const TRANSFER_ASSET2: &str = "/protocol.Wallet/TransferAsset2";
    pub const TRIGGER_CONTRACT: &str = "/protocol.Wallet/TriggerContract";
    pub const DEPLOY_CONTRACT: &str = "/protocol.Wallet/DeployContract";
    pub const FREEZE_BALANCE_V2: &str = "/protocol.Wallet/FreezeBalanceV2";
    pub const UNFREEZE_BALANCE_V2: &str = "/protocol.Wallet/UnfreezeBalanceV2";
    pub const DELEGATE_RESOURCE: &str = "/protocol.Wallet/DelegateResource";
    pub const UNDELEGATE_RESOURCE: &str = "/protocol.Wallet/UnDelegateResource";
    pub const WITHDRAW_BALANCE2: &str = "/protocol.Wallet/WithdrawBalance2";
    pub const WITHDRAW_EXPIRE_UNFREEZE: &str = "/protocol.Wallet/WithdrawExpireUnfreeze";
    pub const UPDATE_ACCOUNT2: &str = "/protocol.Wallet/UpdateAccount2";
    pub const ACCOUNT_PERMISSION_UPDATE: &str = "/protocol.Wallet/AccountPermissionUpdate";
    pub const VOTE_WITNESS_ACCOUNT2: &str = "/protocol.Wallet/VoteWitnessAccount2";
    pub const PROPOSAL_CREATE: &str = "/protocol.Wallet/ProposalCreate";
    pub const PROPOSAL_APPROVE: &str = "/protocol.Wallet/ProposalApprove";
    pub const PROPOSAL_DELETE: &str = "/protocol.Wallet/ProposalDelete";
    pub const EXCHANGE_TRANSACTION: &str = "/protocol.Wallet/ExchangeTransaction";

    pub const TRIGGER_CONSTANT_CONTRACT: &str = "/protocol.Wallet/TriggerConstantContract";
    pub const ESTIMATE_ENERGY: &str = "/protocol.Wallet/EstimateEnergy";
    pub const BROADCAST_TRANSACTION: &str = "/protocol.Wallet/BroadcastTransaction";
}

/// One long-lived connection able to issue unary calls against the wallet service.
///
/// The production implementation is [`GrpcTransport`]; tests plug in in-memory nodes.
pub trait Transport: Clone + Send + Sync + 'static {
    fn unary<Req, Resp>(
        &mut self,
        path: &'static str,
        request: Req,
    ) -> impl Future<Output = std::result::Result<Resp, Status>> + Send
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static;
}

/// tonic channel to a single node.
#[derive(Clone)]
pub struct GrpcTransport {
    inner: tonic::client::Grpc<Channel>,
    api_key: Option<AsciiMetadataValue>,
}

impl GrpcTransport {
    /// Opens a channel to `endpoint`. TLS is used for `grpcs://`.
    pub async fn connect(endpoint: &Endpoint, api_key: Option<&str>) -> Result<Self> {
        let mut ep = Channel::from_shared(endpoint.http_uri())
            .map_err(|e| Error::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if endpoint.tls() {
            ep = ep.tls_config(ClientTlsConfig::new().with_webpki_roots())?;
        }
        let channel = ep.connect().await?;

        let api_key = match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(k) => Some(
                MetadataValue::try_from(k)
                    .map_err(|e| Error::InvalidParameter(format!("api key: {e}")))?,
            ),
            None => None,
        };

        tracing::debug!(endpoint = %endpoint, "tron grpc channel connected");
        Ok(Self {
            inner: tonic::client::Grpc::new(channel),
            api_key,
        })
    }
}

impl Transport for GrpcTransport {
    async fn unary<Req, Resp>(
        &mut self,
        path: &'static str,
        request: Req,
    ) -> std::result::Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("service was not ready: {e}")))?;

        let mut req = Request::new(request);
        if let Some(key) = &self.api_key {
            req.metadata_mut().insert("tron-pro-api-key", key.clone());
        }

        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let resp = self
            .inner
            .unary(req, PathAndQuery::from_static(path), codec)
            .await?;
        Ok(resp.into_inner())
    }
}

/// Typed surface of the wallet service over any [`Transport`].
#[derive(Clone)]
pub struct WalletClient<T> {
    transport: T,
}

type RpcResult<T> = std::result::Result<T, Status>;

impl<T: Transport> WalletClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    // queries

    pub async fn get_account(&mut self, req: Account) -> RpcResult<Account> {
        self.transport.unary(methods::GET_ACCOUNT, req).await
    }

    pub async fn get_account_net(&mut self, req: Account) -> RpcResult<AccountNetMessage> {
        self.transport.unary(methods::GET_ACCOUNT_NET, req).await
    }

    pub async fn get_account_resource(
        &mut self,
        req: Account,
    ) -> RpcResult<AccountResourceMessage> {
        self.transport.unary(methods::GET_ACCOUNT_RESOURCE, req).await
    }

    pub async fn get_transaction_by_id(&mut self, req: BytesMessage) -> RpcResult<Transaction> {
        self.transport.unary(methods::GET_TRANSACTION_BY_ID, req).await
    }

    pub async fn get_transaction_info_by_id(
        &mut self,
        req: BytesMessage,
    ) -> RpcResult<TransactionInfo> {
        self.transport
            .unary(methods::GET_TRANSACTION_INFO_BY_ID, req)
            .await
    }

    pub async fn get_transaction_info_by_block_num(
        &mut self,
        req: NumberMessage,
    ) -> RpcResult<TransactionInfoList> {
        self.transport
            .unary(methods::GET_TRANSACTION_INFO_BY_BLOCK_NUM, req)
            .await
    }

    pub async fn get_contract(&mut self, req: BytesMessage) -> RpcResult<SmartContract> {
        self.transport.unary(methods::GET_CONTRACT, req).await
    }

    pub async fn get_now_block2(&mut self) -> RpcResult<BlockExtention> {
        self.transport
            .unary(methods::GET_NOW_BLOCK2, EmptyMessage {})
            .await
    }

    pub async fn get_block_by_num2(&mut self, req: NumberMessage) -> RpcResult<BlockExtention> {
        self.transport.unary(methods::GET_BLOCK_BY_NUM2, req).await
    }

    pub async fn get_block_by_id(&mut self, req: BytesMessage) -> RpcResult<Block> {
        self.transport.unary(methods::GET_BLOCK_BY_ID, req).await
    }

    pub async fn get_chain_parameters(&mut self) -> RpcResult<ChainParameters> {
        self.transport
            .unary(methods::GET_CHAIN_PARAMETERS, EmptyMessage {})
            .await
    }

    pub async fn get_node_info(&mut self) -> RpcResult<NodeInfo> {
        self.transport
            .unary(methods::GET_NODE_INFO, EmptyMessage {})
            .await
    }

    pub async fn list_nodes(&mut self) -> RpcResult<NodeList> {
        self.transport.unary(methods::LIST_NODES, EmptyMessage {}).await
    }

    pub async fn list_witnesses(&mut self) -> RpcResult<WitnessList> {
        self.transport
            .unary(methods::LIST_WITNESSES, EmptyMessage {})
            .await
    }

    pub async fn get_reward_info(&mut self, req: BytesMessage) -> RpcResult<NumberMessage> {
        self.transport.unary(methods::GET_REWARD_INFO, req).await
    }

    // builders

    pub async fn create_transaction2(
        &mut self,
        req: TransferContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::CREATE_TRANSACTION2, req).await
    }

    pub async fn transfer_asset2(
        &mut self,
        req: TransferAssetContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::TRANSFER_ASSET2, req).await
    }

    pub async fn trigger_contract(
        &mut self,
        req: TriggerSmartContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::TRIGGER_CONTRACT, req).await
    }

    pub async fn deploy_contract(
        &mut self,
        req: CreateSmartContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::DEPLOY_CONTRACT, req).await
    }

    pub async fn freeze_balance_v2(
        &mut self,
        req: FreezeBalanceV2Contract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::FREEZE_BALANCE_V2, req).await
    }

    pub async fn unfreeze_balance_v2(
        &mut self,
        req: UnfreezeBalanceV2Contract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::UNFREEZE_BALANCE_V2, req).await
    }

    pub async fn delegate_resource(
        &mut self,
        req: DelegateResourceContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::DELEGATE_RESOURCE, req).await
    }

    pub async fn undelegate_resource(
        &mut self,
        req: UnDelegateResourceContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::UNDELEGATE_RESOURCE, req).await
    }

    pub async fn withdraw_balance2(
        &mut self,
        req: WithdrawBalanceContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::WITHDRAW_BALANCE2, req).await
    }

    pub async fn withdraw_expire_unfreeze(
        &mut self,
        req: WithdrawExpireUnfreezeContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport
            .unary(methods::WITHDRAW_EXPIRE_UNFREEZE, req)
            .await
    }

    pub async fn update_account2(
        &mut self,
        req: AccountUpdateContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::UPDATE_ACCOUNT2, req).await
    }

    pub async fn account_permission_update(
        &mut self,
        req: AccountPermissionUpdateContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport
            .unary(methods::ACCOUNT_PERMISSION_UPDATE, req)
            .await
    }

    pub async fn vote_witness_account2(
        &mut self,
        req: VoteWitnessContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::VOTE_WITNESS_ACCOUNT2, req).await
    }

    pub async fn proposal_create(
        &mut self,
        req: ProposalCreateContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::PROPOSAL_CREATE, req).await
    }

    pub async fn proposal_approve(
        &mut self,
        req: ProposalApproveContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::PROPOSAL_APPROVE, req).await
    }

    pub async fn proposal_delete(
        &mut self,
        req: ProposalDeleteContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::PROPOSAL_DELETE, req).await
    }

    pub async fn exchange_transaction(
        &mut self,
        req: ExchangeTransactionContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport.unary(methods::EXCHANGE_TRANSACTION, req).await
    }

    // simulate / submit

    pub async fn trigger_constant_contract(
        &mut self,
        req: TriggerSmartContract,
    ) -> RpcResult<TransactionExtention> {
        self.transport
            .unary(methods::TRIGGER_CONSTANT_CONTRACT, req)
            .await
    }

    pub async fn estimate_energy(
        &mut self,
        req: TriggerSmartContract,
    ) -> RpcResult<EstimateEnergyMessage> {
        self.transport.unary(methods::ESTIMATE_ENERGY, req).await
    }

    pub async fn broadcast_transaction(&mut self, req: Transaction) -> RpcResult<Return> {
        self.transport.unary(methods::BROADCAST_TRANSACTION, req).await
    }
}
