use super::{TronClient, check_envelope};
use crate::address::TronAddress;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::grpc::Transport;
use crate::protocol::{
    Account, AccountNetMessage, AccountResourceMessage, Block, BlockExtention, BytesMessage,
    ChainParameters, EstimateEnergyMessage, NodeInfo, NodeList, NumberMessage, SmartContract,
    Transaction, TransactionExtention, TransactionInfo, TransactionInfoList, TriggerSmartContract,
    WitnessList,
};
use crate::resources::{
    AccountResources, ChainFees, FALLBACK_ENERGY_REQUIRED, FeePolicy, FeeQuote,
    quote_fee_limit_sun,
};
use crate::tx::{self, TxId};
use prost::Message;

fn account(addr: TronAddress) -> Account {
    Account {
        address: addr.bytes(),
        ..Default::default()
    }
}

impl<T: Transport> TronClient<T> {
    pub async fn get_account(&self, ctx: &Context, addr: TronAddress) -> Result<Account> {
        self.dispatch(ctx, "get account", |mut c| async move {
            c.get_account(account(addr)).await
        })
        .await
    }

    pub async fn get_account_net(
        &self,
        ctx: &Context,
        addr: TronAddress,
    ) -> Result<AccountNetMessage> {
        self.dispatch(ctx, "get account net", |mut c| async move {
            c.get_account_net(account(addr)).await
        })
        .await
    }

    pub async fn get_account_resource(
        &self,
        ctx: &Context,
        addr: TronAddress,
    ) -> Result<AccountResourceMessage> {
        self.dispatch(ctx, "get account resource", |mut c| async move {
            c.get_account_resource(account(addr)).await
        })
        .await
    }

    /// [`TronClient::get_account_resource`] parsed into unsigned counters.
    pub async fn account_resources(
        &self,
        ctx: &Context,
        addr: TronAddress,
    ) -> Result<AccountResources> {
        let msg = self.get_account_resource(ctx, addr).await?;
        AccountResources::try_from(&msg)
    }

    pub async fn get_transaction_by_id(&self, ctx: &Context, id: &TxId) -> Result<Transaction> {
        let req = BytesMessage { value: id.to_vec() };
        self.dispatch(ctx, "get transaction by id", |mut c| async move {
            c.get_transaction_by_id(req).await
        })
        .await
    }

    /// Returns the node's answer as-is; an unknown txid yields an empty info whose `id` is
    /// empty.
    pub async fn get_transaction_info_by_id(
        &self,
        ctx: &Context,
        id: &TxId,
    ) -> Result<TransactionInfo> {
        let req = BytesMessage { value: id.to_vec() };
        self.dispatch(ctx, "get transaction info by id", |mut c| async move {
            c.get_transaction_info_by_id(req).await
        })
        .await
    }

    pub async fn get_transaction_info_by_block_num(
        &self,
        ctx: &Context,
        num: i64,
    ) -> Result<TransactionInfoList> {
        self.dispatch(ctx, "get transaction info by block num", |mut c| async move {
            c.get_transaction_info_by_block_num(NumberMessage { num }).await
        })
        .await
    }

    pub async fn get_contract(&self, ctx: &Context, addr: TronAddress) -> Result<SmartContract> {
        let req = BytesMessage { value: addr.bytes() };
        self.dispatch(ctx, "get contract", |mut c| async move {
            c.get_contract(req).await
        })
        .await
    }

    pub async fn get_now_block(&self, ctx: &Context) -> Result<BlockExtention> {
        self.dispatch(ctx, "get now block", |mut c| async move {
            c.get_now_block2().await
        })
        .await
    }

    pub async fn get_block_by_num(&self, ctx: &Context, num: i64) -> Result<BlockExtention> {
        if num < 0 {
            return Err(Error::InvalidParameter(format!(
                "block number must be non-negative, got {num}"
            )));
        }
        self.dispatch(ctx, "get block by num", |mut c| async move {
            c.get_block_by_num2(NumberMessage { num }).await
        })
        .await
    }

    pub async fn get_block_by_id(&self, ctx: &Context, id: &[u8; 32]) -> Result<Block> {
        let req = BytesMessage { value: id.to_vec() };
        self.dispatch(ctx, "get block by id", |mut c| async move {
            c.get_block_by_id(req).await
        })
        .await
    }

    pub async fn get_chain_parameters(&self, ctx: &Context) -> Result<ChainParameters> {
        self.dispatch(ctx, "get chain parameters", |mut c| async move {
            c.get_chain_parameters().await
        })
        .await
    }

    pub async fn get_node_info(&self, ctx: &Context) -> Result<NodeInfo> {
        self.dispatch(ctx, "get node info", |mut c| async move {
            c.get_node_info().await
        })
        .await
    }

    pub async fn list_nodes(&self, ctx: &Context) -> Result<NodeList> {
        self.dispatch(ctx, "list nodes", |mut c| async move { c.list_nodes().await })
            .await
    }

    pub async fn list_witnesses(&self, ctx: &Context) -> Result<WitnessList> {
        self.dispatch(ctx, "list witnesses", |mut c| async move {
            c.list_witnesses().await
        })
        .await
    }

    /// Unclaimed voting reward of `addr`, in sun.
    pub async fn get_reward_info(&self, ctx: &Context, addr: TronAddress) -> Result<i64> {
        let req = BytesMessage { value: addr.bytes() };
        let msg = self
            .dispatch(ctx, "get reward info", |mut c| async move {
                c.get_reward_info(req).await
            })
            .await?;
        Ok(msg.num)
    }

    /// Executes a call without creating a transaction. The envelope is returned unchecked so
    /// reverts can be inspected.
    pub async fn trigger_constant_contract(
        &self,
        ctx: &Context,
        msg: TriggerSmartContract,
    ) -> Result<TransactionExtention> {
        check_trigger(&msg)?;
        self.dispatch(ctx, "trigger constant contract", |mut c| async move {
            c.trigger_constant_contract(msg).await
        })
        .await
    }

    /// Energy the node expects `msg` to consume. A failed estimate is [`Error::BuildRejected`].
    pub async fn estimate_energy(
        &self,
        ctx: &Context,
        msg: TriggerSmartContract,
    ) -> Result<EstimateEnergyMessage> {
        check_trigger(&msg)?;
        self.dispatch_validated(
            ctx,
            "estimate energy",
            |mut c| async move { c.estimate_energy(msg).await },
            check_envelope,
        )
        .await
    }

    /// Builds `msg`, estimates its energy and sizes the signed transaction to derive a fee
    /// limit from the current chain fees.
    ///
    /// The fee limit is part of the body, so the size is computed twice: once without it and
    /// once with the first quote in place.
    pub async fn quote_trigger_fee_limit(
        &self,
        ctx: &Context,
        msg: TriggerSmartContract,
        signers: usize,
        policy: FeePolicy,
    ) -> Result<FeeQuote> {
        let fees = ChainFees::from_parameters(&self.get_chain_parameters(ctx).await?)?;

        let estimate = self.estimate_energy(ctx, msg.clone()).await?;
        let mut energy_required = u64::try_from(estimate.energy_required).map_err(|_| {
            Error::Decode(format!(
                "energy_required out of range: {}",
                estimate.energy_required
            ))
        })?;
        // Some private networks estimate zero for state-changing calls.
        if energy_required == 0 {
            energy_required = FALLBACK_ENERGY_REQUIRED;
        }

        let ext = self.trigger_contract(ctx, msg).await?;
        let mut txn = ext
            .transaction
            .ok_or_else(|| Error::Decode("node returned no transaction".into()))?;
        let sized = |txn: &Transaction| {
            // Each signature adds its 65 bytes plus a tag and a length byte.
            let sig_bytes = signers * (crate::wallet::SIGNATURE_LEN + 2);
            u64::try_from(txn.encoded_len() + sig_bytes).unwrap_or(u64::MAX)
        };

        tx::set_fee_limit(&mut txn, 0)?;
        let size0 = sized(&txn);
        let fee_limit0 = policy.apply(quote_fee_limit_sun(energy_required, size0, fees));

        tx::set_fee_limit(&mut txn, i64::try_from(fee_limit0).unwrap_or(i64::MAX))?;
        let size1 = sized(&txn);
        let fee_limit1 = policy.apply(quote_fee_limit_sun(energy_required, size1, fees));

        tracing::debug!(
            energy_required,
            tx_size_bytes = size1,
            fee_limit_sun = fee_limit1,
            "quoted trigger fee limit"
        );
        Ok(FeeQuote {
            energy_required,
            tx_size_bytes: size1,
            fees,
            fee_limit_sun: fee_limit1,
        })
    }
}

pub(super) fn check_address(bytes: &[u8], field: &str) -> Result<()> {
    TronAddress::from_bytes(bytes)
        .map(|_| ())
        .map_err(|e| Error::InvalidAddress(format!("{field}: {e}")))
}

pub(super) fn check_trigger(msg: &TriggerSmartContract) -> Result<()> {
    check_address(&msg.owner_address, "owner_address")?;
    check_address(&msg.contract_address, "contract_address")?;
    if msg.call_value < 0 {
        return Err(Error::InvalidParameter(format!(
            "call value must be non-negative, got {}",
            msg.call_value
        )));
    }
    Ok(())
}
