use crate::error::{Error, Result};

/// 1 TRX = 1,000,000 SUN.
pub const SUN_PER_TRX: i64 = 1_000_000;

/// Largest single transfer accepted by the transfer builder.
pub const MAX_TRANSFER_SUN: i64 = 100_000_000_000 * SUN_PER_TRX;

/// Rejects non-positive amounts and amounts above [`MAX_TRANSFER_SUN`].
pub fn validate_transfer_amount(amount_sun: i64) -> Result<()> {
    if amount_sun <= 0 {
        return Err(Error::InvalidParameter(format!(
            "transfer amount must be positive, got {amount_sun}"
        )));
    }
    if amount_sun > MAX_TRANSFER_SUN {
        return Err(Error::InvalidParameter(format!(
            "transfer amount {amount_sun} exceeds maximum {MAX_TRANSFER_SUN}"
        )));
    }
    Ok(())
}
