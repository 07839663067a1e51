//! Economy reward computation.
//!
//! `amount = base_rate * floor(crop_count * mass_bonus) * tool_multiplier`,
//! computed in [`Decimal`] with checked arithmetic and clamped at zero. A
//! zero amount is never paid out.

use cropplus_types::RewardResult;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::HarvestError;
use crate::policy::EconomyPolicy;

/// Composes the reward multiplier chain for one payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardCalculator {
    base_rate: Decimal,
}

impl RewardCalculator {
    /// A calculator paying `base_rate` per crop.
    pub const fn new(base_rate: Decimal) -> Self {
        Self { base_rate }
    }

    /// A calculator paying `economy.reward-per-crop`.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MalformedPolicy`] if the rate does not fit a
    /// [`Decimal`].
    pub fn from_policy(economy: &EconomyPolicy) -> Result<Self, HarvestError> {
        Ok(Self::new(to_decimal(
            "economy.reward-per-crop",
            economy.reward_per_crop,
        )?))
    }

    /// The configured rate per crop.
    pub const fn base_rate(&self) -> Decimal {
        self.base_rate
    }

    /// Compute the payout for `crop_count` crops.
    ///
    /// Pass a `mass_bonus` of `1.0` for plain harvests.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MalformedPolicy`] for non-finite multipliers
    /// and [`HarvestError::ArithmeticOverflow`] if the product overflows.
    pub fn compute(
        &self,
        crop_count: u32,
        tool_multiplier: f64,
        mass_bonus: f64,
    ) -> Result<RewardResult, HarvestError> {
        let tool_multiplier = to_decimal("tool multiplier", tool_multiplier)?;
        let mass_bonus = to_decimal("mass bonus", mass_bonus)?;

        let boosted = Decimal::from(crop_count)
            .checked_mul(mass_bonus)
            .ok_or_else(|| overflow("crop count * mass bonus"))?
            .floor()
            .max(Decimal::ZERO);
        let effective_count = boosted.to_u32().unwrap_or(u32::MAX);

        let amount = self
            .base_rate
            .checked_mul(Decimal::from(effective_count))
            .and_then(|v| v.checked_mul(tool_multiplier))
            .ok_or_else(|| overflow("reward amount"))?
            .max(Decimal::ZERO)
            .normalize();

        Ok(RewardResult {
            base_rate: self.base_rate,
            crop_count,
            mass_bonus,
            effective_count,
            tool_multiplier,
            amount,
        })
    }
}

fn to_decimal(key: &str, value: f64) -> Result<Decimal, HarvestError> {
    Decimal::try_from(value).map_err(|e| HarvestError::MalformedPolicy {
        key: key.to_owned(),
        value: format!("{value} ({e})"),
    })
}

fn overflow(context: &str) -> HarvestError {
    HarvestError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}
