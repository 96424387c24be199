//! Fee quoting from chain parameters and typed account resource counters.

use crate::error::{Error, Result};
use crate::protocol::{AccountResourceMessage, ChainParameters};

/// `GetChainParameters` keys consumed for fee quoting.
pub const CHAIN_PARAM_ENERGY_FEE: &str = "getEnergyFee";
pub const CHAIN_PARAM_TX_FEE_PER_BYTE: &str = "getTransactionFee";

/// Energy assumed when a node estimates zero for a state-changing call.
pub const FALLBACK_ENERGY_REQUIRED: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFees {
    /// Sun per energy unit.
    pub energy_fee_sun_per_energy: u64,
    /// Sun per bandwidth byte.
    pub tx_fee_sun_per_byte: u64,
}

impl ChainFees {
    /// Picks the fee parameters out of the node's full list. Both must be present.
    pub fn from_parameters(params: &ChainParameters) -> Result<Self> {
        let find = |key: &str| -> Result<u64> {
            let p = params
                .chain_parameter
                .iter()
                .find(|p| p.key == key)
                .ok_or_else(|| Error::Decode(format!("missing chain parameter {key}")))?;
            non_negative(p.value, key)
        };
        Ok(Self {
            energy_fee_sun_per_energy: find(CHAIN_PARAM_ENERGY_FEE)?,
            tx_fee_sun_per_byte: find(CHAIN_PARAM_TX_FEE_PER_BYTE)?,
        })
    }
}

/// Worst-case burn for a transaction paying all its energy and bandwidth in TRX.
pub fn quote_fee_limit_sun(energy_required: u64, tx_size_bytes: u64, fees: ChainFees) -> u64 {
    energy_required
        .saturating_mul(fees.energy_fee_sun_per_energy)
        .saturating_add(tx_size_bytes.saturating_mul(fees.tx_fee_sun_per_byte))
}

/// Fee limit derived for a contract trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub energy_required: u64,
    pub tx_size_bytes: u64,
    pub fees: ChainFees,
    /// [`quote_fee_limit_sun`] after the [`FeePolicy`].
    pub fee_limit_sun: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Cap (sun) applied after headroom.
    pub fee_limit_cap_sun: u64,
    /// Extra headroom in parts-per-million, clamped to 100%.
    pub fee_limit_headroom_ppm: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee_limit_cap_sun: crate::broadcast::DEFAULT_FEE_LIMIT_SUN as u64,
            fee_limit_headroom_ppm: 100_000,
        }
    }
}

impl FeePolicy {
    pub fn apply(&self, base: u64) -> u64 {
        let ppm = self.fee_limit_headroom_ppm.min(1_000_000);
        let headroom = base.saturating_mul(ppm) / 1_000_000;
        base.saturating_add(headroom).min(self.fee_limit_cap_sun)
    }
}

/// Used and granted amounts of one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub used: u64,
    pub limit: u64,
}

impl Usage {
    pub fn available(self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Network-wide capacity of a resource and the stake weight (sun) behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StakeTotals {
    pub total_limit: u64,
    pub total_weight: u64,
}

/// `GetAccountResource` with every counter checked to be non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountResources {
    pub energy: Usage,
    pub net: Usage,
    pub free_net: Usage,
    pub energy_stake: StakeTotals,
    pub net_stake: StakeTotals,
}

impl TryFrom<&AccountResourceMessage> for AccountResources {
    type Error = Error;

    fn try_from(msg: &AccountResourceMessage) -> Result<Self> {
        let usage = |used, limit, what: &str| -> Result<Usage> {
            Ok(Usage {
                used: non_negative(used, &format!("{what} used"))?,
                limit: non_negative(limit, &format!("{what} limit"))?,
            })
        };
        let stake = |limit, weight, what: &str| -> Result<StakeTotals> {
            Ok(StakeTotals {
                total_limit: non_negative(limit, &format!("total {what} limit"))?,
                total_weight: non_negative(weight, &format!("total {what} weight"))?,
            })
        };
        Ok(Self {
            energy: usage(msg.energy_used, msg.energy_limit, "energy")?,
            net: usage(msg.net_used, msg.net_limit, "net")?,
            free_net: usage(msg.free_net_used, msg.free_net_limit, "free net")?,
            energy_stake: stake(msg.total_energy_limit, msg.total_energy_weight, "energy")?,
            net_stake: stake(msg.total_net_limit, msg.total_net_weight, "net")?,
        })
    }
}

fn non_negative(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Decode(format!("{what} out of range: {value}")))
}
