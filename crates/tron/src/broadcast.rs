//! Simulate, sign, broadcast and optionally wait for the receipt of one transaction.

use crate::client::TronClient;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::grpc::Transport;
use crate::protocol::r#return::ResponseCode;
use crate::protocol::transaction::contract::ContractType;
use crate::protocol::transaction::result::{Code as RetCode, ContractResult};
use crate::protocol::transaction_info::{Code as InfoCode, Log};
use crate::protocol::{Transaction, TransactionInfo, TriggerSmartContract};
use crate::tx::{self, TxId, TxInput};
use crate::wallet::Signer;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_FEE_LIMIT_SUN: i64 = 150_000_000;
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Caller knobs of [`TronClient::sign_and_broadcast`]. Zero values take the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOptions {
    pub fee_limit_sun: i64,
    /// Written on the contract before signing when non-zero.
    pub permission_id: i32,
    pub wait_for_receipt: bool,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl BroadcastOptions {
    pub fn wait_for_receipt(mut self) -> Self {
        self.wait_for_receipt = true;
        self
    }

    pub fn with_fee_limit(mut self, fee_limit_sun: i64) -> Self {
        self.fee_limit_sun = fee_limit_sun;
        self
    }

    pub fn with_permission_id(mut self, permission_id: i32) -> Self {
        self.permission_id = permission_id;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn effective_fee_limit(&self) -> i64 {
        if self.fee_limit_sun > 0 {
            self.fee_limit_sun
        } else {
            DEFAULT_FEE_LIMIT_SUN
        }
    }

    pub fn effective_wait_timeout(&self) -> Duration {
        if self.wait_timeout.is_zero() {
            DEFAULT_WAIT_TIMEOUT
        } else {
            self.wait_timeout
        }
    }

    pub fn effective_poll_interval(&self) -> Duration {
        if self.poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            self.poll_interval
        }
    }
}

/// Outcome of a simulation or a broadcast.
///
/// `success` starts as the node's envelope result and is ANDed with the on-chain result when
/// one is known. `receipt` is set only when a receipt arrived before the wait timed out.
#[derive(Debug, Clone, Default)]
pub struct BroadcastResult {
    pub txid: String,
    pub success: bool,
    pub code: ResponseCode,
    pub message: String,
    pub constant_return: Vec<Vec<u8>>,
    pub energy_usage: i64,
    pub net_usage: i64,
    pub logs: Vec<Log>,
    pub receipt: Option<TransactionInfo>,
}

impl BroadcastResult {
    /// Execution result of the contract when a receipt is attached.
    pub fn contract_result(&self) -> Option<ContractResult> {
        self.receipt
            .as_ref()
            .and_then(|info| info.receipt.as_ref())
            .and_then(|r| ContractResult::try_from(r.result).ok())
    }

    /// Address of the created contract, for confirmed deployments.
    pub fn contract_address(&self) -> Option<crate::TronAddress> {
        self.receipt
            .as_ref()
            .and_then(|info| crate::TronAddress::from_bytes(&info.contract_address).ok())
    }

    fn append_message(&mut self, extra: &str) {
        if extra.is_empty() {
            return;
        }
        if self.message.is_empty() {
            self.message = extra.to_string();
        } else {
            self.message = format!("{}: {extra}", self.message);
        }
    }

    fn apply_receipt(&mut self, info: TransactionInfo) {
        let receipt = info.receipt.clone().unwrap_or_default();
        let contract_ok = matches!(
            ContractResult::try_from(receipt.result),
            Ok(ContractResult::Default | ContractResult::Success)
        );
        self.success = self.success && info.result == InfoCode::Sucess as i32 && contract_ok;
        self.append_message(&String::from_utf8_lossy(&info.res_message));
        self.energy_usage = receipt.energy_usage_total;
        self.net_usage = receipt.net_usage;
        self.constant_return = info.contract_result.clone();
        self.logs = info.log.clone();
        self.receipt = Some(info);
    }
}

fn waits_for_receipt(ty: Option<ContractType>) -> bool {
    matches!(
        ty,
        Some(ContractType::CreateSmartContract | ContractType::TriggerSmartContract)
    )
}

impl<T: Transport> TronClient<T> {
    /// Runs a trigger through `TriggerConstantContract` without signatures.
    ///
    /// Only `TriggerSmartContract` bodies can be simulated.
    pub async fn simulate(
        &self,
        ctx: &Context,
        input: impl Into<TxInput>,
    ) -> Result<BroadcastResult> {
        let txn = input.into().into_transaction()?;
        let raw = tx::validate(&txn)?;
        let id = tx::txid(raw);
        let contract = tx::contract(&txn)?;
        if tx::contract_type(contract) != Some(ContractType::TriggerSmartContract) {
            return Err(Error::InvalidParameter(format!(
                "only TriggerSmartContract can be simulated, got type {}",
                contract.r#type
            )));
        }
        let msg: TriggerSmartContract = contract.unpack()?;

        let ext = self
            .dispatch(ctx, "simulate", |mut c| async move {
                c.trigger_constant_contract(msg).await
            })
            .await?;

        let mut result = BroadcastResult {
            txid: tx::txid_hex(&id),
            energy_usage: ext.energy_used,
            constant_return: ext.constant_result,
            logs: ext.logs,
            ..Default::default()
        };
        if let Some(ret) = ext.result.as_ref() {
            result.success = ret.result;
            result.code = ret.response_code();
            result.message = ret.message_utf8();
        }
        // Without an on-chain result the envelope decides alone.
        if let Some(ret) = ext.transaction.as_ref().and_then(|t| t.ret.first()) {
            let executed = ret.ret == RetCode::Sucess as i32
                && matches!(
                    ContractResult::try_from(ret.contract_ret),
                    Ok(ContractResult::Default | ContractResult::Success)
                );
            result.success = result.success && executed;
        }

        tracing::debug!(
            txid = %result.txid,
            success = result.success,
            energy = result.energy_usage,
            "simulated transaction"
        );
        Ok(result)
    }

    /// Signs with each of `signers` in order (if any), broadcasts, and waits for the receipt
    /// when asked to.
    ///
    /// With signers, the permission id (when non-zero) and the fee limit are written to the
    /// body first. Without signers the transaction is broadcast as given. A receipt wait that
    /// times out is not an error: the result comes back with `receipt == None`. A failed
    /// broadcast RPC is [`Error::Broadcast`], which still carries the txid.
    pub async fn sign_and_broadcast(
        &self,
        ctx: &Context,
        input: impl Into<TxInput>,
        opts: BroadcastOptions,
        signers: &[&dyn Signer],
    ) -> Result<BroadcastResult> {
        let mut txn = input.into().into_transaction()?;
        let contract_type = tx::contract_type(tx::contract(&txn)?);
        self.ensure_open()?;

        let id = if signers.is_empty() {
            tx::transaction_id(&txn)?
        } else {
            if opts.permission_id != 0 {
                tx::set_permission_id(&mut txn, opts.permission_id)?;
            }
            tx::set_fee_limit(&mut txn, opts.effective_fee_limit())?;
            tx::multi_sign(&mut txn, signers)?
        };

        let mut result = self.broadcast_signed(ctx, txn, &id).await?;

        if !(result.success && opts.wait_for_receipt && waits_for_receipt(contract_type)) {
            return Ok(result);
        }

        let wait = opts.effective_wait_timeout();
        match self
            .wait_for_receipt(ctx, &id, wait, opts.effective_poll_interval())
            .await
        {
            Some(info) => {
                result.apply_receipt(info);
                tracing::info!(
                    txid = %result.txid,
                    success = result.success,
                    energy = result.energy_usage,
                    "transaction confirmed"
                );
            }
            None => {
                tracing::info!(
                    txid = %result.txid,
                    wait_ms = wait.as_millis() as u64,
                    "no receipt before wait timeout"
                );
            }
        }
        Ok(result)
    }

    async fn broadcast_signed(
        &self,
        ctx: &Context,
        txn: Transaction,
        id: &TxId,
    ) -> Result<BroadcastResult> {
        let txid = tx::txid_hex(id);
        let ret = match self
            .dispatch(ctx, "broadcast transaction", |mut c| async move {
                c.broadcast_transaction(txn).await
            })
            .await
        {
            Ok(ret) => ret,
            Err(err) => {
                self.telemetry().broadcast(false);
                tracing::warn!(txid = %txid, err = %err, "broadcast failed");
                return Err(Error::Broadcast {
                    txid,
                    source: Box::new(err),
                });
            }
        };

        let result = BroadcastResult {
            txid,
            success: ret.result,
            code: ret.response_code(),
            message: ret.message_utf8(),
            ..Default::default()
        };
        self.telemetry().broadcast(result.success);
        if result.success {
            tracing::info!(txid = %result.txid, "transaction broadcast");
        } else {
            tracing::warn!(
                txid = %result.txid,
                code = ?result.code,
                message = %result.message,
                "broadcast rejected"
            );
        }
        Ok(result)
    }

    /// Polls `GetTransactionInfoById` every `poll_interval` until the node knows `id`, the wait
    /// times out, or `ctx` expires. Poll failures count as "not yet".
    pub async fn wait_for_receipt(
        &self,
        ctx: &Context,
        id: &TxId,
        wait_timeout: Duration,
        poll_interval: Duration,
    ) -> Option<TransactionInfo> {
        let poll_interval = if poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
        let wait_ctx = ctx.narrowed(wait_timeout);
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut polls = 0u32;
        loop {
            if wait_ctx.run(ticker.tick()).await.is_err() {
                return None;
            }
            polls += 1;
            match self.get_transaction_info_by_id(&wait_ctx, id).await {
                Ok(info) if info.id.as_slice() == id.as_slice() => return Some(info),
                Ok(_) => tracing::debug!(txid = %tx::txid_hex(id), polls, "receipt not yet available"),
                Err(err) if err.is_interrupted() => return None,
                Err(err) => {
                    tracing::debug!(txid = %tx::txid_hex(id), polls, err = %err, "receipt poll failed")
                }
            }
        }
    }
}
