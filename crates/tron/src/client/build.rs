use super::TronClient;
use super::query::{check_address, check_trigger};
use crate::address::TronAddress;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::grpc::Transport;
use crate::protocol::{
    AccountPermissionUpdateContract, AccountUpdateContract, CreateSmartContract,
    DelegateResourceContract, ExchangeTransactionContract, FreezeBalanceV2Contract,
    ProposalApproveContract, ProposalCreateContract, ProposalDeleteContract, ResourceCode,
    TransactionExtention, TransferAssetContract, TransferContract, TriggerSmartContract,
    UnDelegateResourceContract, UnfreezeBalanceV2Contract, Vote, VoteWitnessContract,
    WithdrawBalanceContract, WithdrawExpireUnfreezeContract,
};
use crate::units::validate_transfer_amount;
use std::collections::BTreeMap;

fn positive(value: i64, what: &str) -> Result<()> {
    if value <= 0 {
        return Err(Error::InvalidParameter(format!(
            "{what} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Node-side transaction builders. Every method checks its arguments before any RPC and
/// returns the unsigned transaction only when the node's envelope reports success.
impl<T: Transport> TronClient<T> {
    /// Native TRX transfer of `amount_sun`.
    pub async fn create_transfer(
        &self,
        ctx: &Context,
        from: TronAddress,
        to: TronAddress,
        amount_sun: i64,
    ) -> Result<TransactionExtention> {
        validate_transfer_amount(amount_sun)?;
        if from == to {
            return Err(Error::InvalidParameter(
                "cannot transfer to the owner address".into(),
            ));
        }
        let req = TransferContract {
            owner_address: from.bytes(),
            to_address: to.bytes(),
            amount: amount_sun,
        };
        self.build(ctx, "create transfer", |mut c| async move {
            c.create_transaction2(req).await
        })
        .await
    }

    /// TRC-10 transfer. `asset` is the token id as the node expects it.
    pub async fn transfer_asset(
        &self,
        ctx: &Context,
        from: TronAddress,
        to: TronAddress,
        asset: &str,
        amount: i64,
    ) -> Result<TransactionExtention> {
        positive(amount, "asset amount")?;
        if asset.is_empty() {
            return Err(Error::InvalidParameter("asset name is empty".into()));
        }
        let req = TransferAssetContract {
            asset_name: asset.as_bytes().to_vec(),
            owner_address: from.bytes(),
            to_address: to.bytes(),
            amount,
        };
        self.build(ctx, "transfer asset", |mut c| async move {
            c.transfer_asset2(req).await
        })
        .await
    }

    pub async fn trigger_contract(
        &self,
        ctx: &Context,
        msg: TriggerSmartContract,
    ) -> Result<TransactionExtention> {
        check_trigger(&msg)?;
        self.build(ctx, "trigger contract", |mut c| async move {
            c.trigger_contract(msg).await
        })
        .await
    }

    pub async fn deploy_contract(
        &self,
        ctx: &Context,
        msg: CreateSmartContract,
    ) -> Result<TransactionExtention> {
        check_address(&msg.owner_address, "owner_address")?;
        let Some(new_contract) = msg.new_contract.as_ref() else {
            return Err(Error::InvalidParameter("deploy carries no contract".into()));
        };
        if new_contract.bytecode.is_empty() {
            return Err(Error::InvalidParameter("contract bytecode is empty".into()));
        }
        if !(0..=100).contains(&new_contract.consume_user_resource_percent) {
            return Err(Error::InvalidParameter(format!(
                "consume_user_resource_percent must be within 0..=100, got {}",
                new_contract.consume_user_resource_percent
            )));
        }
        self.build(ctx, "deploy contract", |mut c| async move {
            c.deploy_contract(msg).await
        })
        .await
    }

    pub async fn freeze_balance_v2(
        &self,
        ctx: &Context,
        owner: TronAddress,
        amount_sun: i64,
        resource: ResourceCode,
    ) -> Result<TransactionExtention> {
        positive(amount_sun, "freeze amount")?;
        let req = FreezeBalanceV2Contract {
            owner_address: owner.bytes(),
            frozen_balance: amount_sun,
            resource: resource as i32,
        };
        self.build(ctx, "freeze balance v2", |mut c| async move {
            c.freeze_balance_v2(req).await
        })
        .await
    }

    pub async fn unfreeze_balance_v2(
        &self,
        ctx: &Context,
        owner: TronAddress,
        amount_sun: i64,
        resource: ResourceCode,
    ) -> Result<TransactionExtention> {
        positive(amount_sun, "unfreeze amount")?;
        let req = UnfreezeBalanceV2Contract {
            owner_address: owner.bytes(),
            unfreeze_balance: amount_sun,
            resource: resource as i32,
        };
        self.build(ctx, "unfreeze balance v2", |mut c| async move {
            c.unfreeze_balance_v2(req).await
        })
        .await
    }

    pub async fn delegate_resource(
        &self,
        ctx: &Context,
        msg: DelegateResourceContract,
    ) -> Result<TransactionExtention> {
        check_address(&msg.owner_address, "owner_address")?;
        check_address(&msg.receiver_address, "receiver_address")?;
        positive(msg.balance, "delegated balance")?;
        if msg.lock_period < 0 {
            return Err(Error::InvalidParameter(format!(
                "lock period must be non-negative, got {}",
                msg.lock_period
            )));
        }
        self.build(ctx, "delegate resource", |mut c| async move {
            c.delegate_resource(msg).await
        })
        .await
    }

    pub async fn undelegate_resource(
        &self,
        ctx: &Context,
        msg: UnDelegateResourceContract,
    ) -> Result<TransactionExtention> {
        check_address(&msg.owner_address, "owner_address")?;
        check_address(&msg.receiver_address, "receiver_address")?;
        positive(msg.balance, "undelegated balance")?;
        self.build(ctx, "undelegate resource", |mut c| async move {
            c.undelegate_resource(msg).await
        })
        .await
    }

    /// Claims voting rewards.
    pub async fn withdraw_balance(
        &self,
        ctx: &Context,
        owner: TronAddress,
    ) -> Result<TransactionExtention> {
        let req = WithdrawBalanceContract {
            owner_address: owner.bytes(),
        };
        self.build(ctx, "withdraw balance", |mut c| async move {
            c.withdraw_balance2(req).await
        })
        .await
    }

    /// Withdraws stake whose unfreeze period has elapsed.
    pub async fn withdraw_expire_unfreeze(
        &self,
        ctx: &Context,
        owner: TronAddress,
    ) -> Result<TransactionExtention> {
        let req = WithdrawExpireUnfreezeContract {
            owner_address: owner.bytes(),
        };
        self.build(ctx, "withdraw expire unfreeze", |mut c| async move {
            c.withdraw_expire_unfreeze(req).await
        })
        .await
    }

    pub async fn update_account(
        &self,
        ctx: &Context,
        owner: TronAddress,
        name: &str,
    ) -> Result<TransactionExtention> {
        if name.is_empty() {
            return Err(Error::InvalidParameter("account name is empty".into()));
        }
        let req = AccountUpdateContract {
            account_name: name.as_bytes().to_vec(),
            owner_address: owner.bytes(),
        };
        self.build(ctx, "update account", |mut c| async move {
            c.update_account2(req).await
        })
        .await
    }

    pub async fn account_permission_update(
        &self,
        ctx: &Context,
        msg: AccountPermissionUpdateContract,
    ) -> Result<TransactionExtention> {
        check_address(&msg.owner_address, "owner_address")?;
        if msg.owner.is_none() {
            return Err(Error::InvalidParameter(
                "owner permission is required".into(),
            ));
        }
        for p in msg.owner.iter().chain(msg.witness.iter()).chain(&msg.actives) {
            if p.keys.is_empty() || p.threshold <= 0 {
                return Err(Error::InvalidParameter(format!(
                    "permission {:?} needs keys and a positive threshold",
                    p.permission_name
                )));
            }
            for k in &p.keys {
                check_address(&k.address, "permission key")?;
            }
        }
        self.build(ctx, "account permission update", |mut c| async move {
            c.account_permission_update(msg).await
        })
        .await
    }

    /// Replaces the account's votes with `votes` (witness, count).
    pub async fn vote_witness(
        &self,
        ctx: &Context,
        owner: TronAddress,
        votes: &[(TronAddress, i64)],
    ) -> Result<TransactionExtention> {
        if votes.is_empty() {
            return Err(Error::InvalidParameter("no votes given".into()));
        }
        for (_, count) in votes {
            positive(*count, "vote count")?;
        }
        let req = VoteWitnessContract {
            owner_address: owner.bytes(),
            votes: votes
                .iter()
                .map(|(witness, count)| Vote {
                    vote_address: witness.bytes(),
                    vote_count: *count,
                })
                .collect(),
            support: true,
        };
        self.build(ctx, "vote witness", |mut c| async move {
            c.vote_witness_account2(req).await
        })
        .await
    }

    pub async fn proposal_create(
        &self,
        ctx: &Context,
        owner: TronAddress,
        parameters: BTreeMap<i64, i64>,
    ) -> Result<TransactionExtention> {
        if parameters.is_empty() {
            return Err(Error::InvalidParameter("proposal has no parameters".into()));
        }
        let req = ProposalCreateContract {
            owner_address: owner.bytes(),
            parameters,
        };
        self.build(ctx, "proposal create", |mut c| async move {
            c.proposal_create(req).await
        })
        .await
    }

    pub async fn proposal_approve(
        &self,
        ctx: &Context,
        owner: TronAddress,
        proposal_id: i64,
        approve: bool,
    ) -> Result<TransactionExtention> {
        positive(proposal_id, "proposal id")?;
        let req = ProposalApproveContract {
            owner_address: owner.bytes(),
            proposal_id,
            is_add_approval: approve,
        };
        self.build(ctx, "proposal approve", |mut c| async move {
            c.proposal_approve(req).await
        })
        .await
    }

    pub async fn proposal_delete(
        &self,
        ctx: &Context,
        owner: TronAddress,
        proposal_id: i64,
    ) -> Result<TransactionExtention> {
        positive(proposal_id, "proposal id")?;
        let req = ProposalDeleteContract {
            owner_address: owner.bytes(),
            proposal_id,
        };
        self.build(ctx, "proposal delete", |mut c| async move {
            c.proposal_delete(req).await
        })
        .await
    }

    /// Bancor exchange trade: sells `quant` of `token_id`, expecting at least `expected` back.
    pub async fn exchange_transaction(
        &self,
        ctx: &Context,
        msg: ExchangeTransactionContract,
    ) -> Result<TransactionExtention> {
        check_address(&msg.owner_address, "owner_address")?;
        positive(msg.quant, "exchange quant")?;
        positive(msg.expected, "exchange expected")?;
        self.build(ctx, "exchange transaction", |mut c| async move {
            c.exchange_transaction(msg).await
        })
        .await
    }
}
