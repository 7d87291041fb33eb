//! Swap Math
//!
//! One step of the swap walk: move the price from `current` toward `target`
//! within a single liquidity range.

use crate::constants::{FEE_RATE_DENOMINATOR, Q64};
use crate::errors::AmmError;
use crate::math::full_math::{mul_div, mul_div_round_up};
use crate::math::liquidity_math::{get_amount_0_delta_u128, get_amount_1_delta_u128};
use crate::math::sqrt_price_math::{get_next_sqrt_price_from_input, get_next_sqrt_price_from_output};
use anchor_lang::prelude::*;

/// Result of a single swap step computation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// The sqrt price after the step
    pub sqrt_price_next_x64: u128,
    /// Input consumed, excluding fee
    pub amount_in: u64,
    /// Output produced
    pub amount_out: u64,
    /// Trade fee charged on the input leg
    pub fee_amount: u64,
}

/// Amount that fully moves the price from `current` to `target`
///
/// The exact leg (input for exact-in, output for exact-out). `None` when it
/// does not fit in u64, which means the step cannot reach the target.
fn amount_to_target(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    zero_for_one: bool,
    is_base_input: bool,
) -> Result<Option<u64>> {
    let amount = match (zero_for_one, is_base_input) {
        (true, true) => {
            get_amount_0_delta_u128(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, true)?
        }
        (true, false) => {
            get_amount_1_delta_u128(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, false)?
        }
        (false, true) => {
            get_amount_1_delta_u128(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, true)?
        }
        (false, false) => {
            get_amount_0_delta_u128(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, false)?
        }
    };
    Ok(u64::try_from(amount).ok())
}

fn narrow(amount: u128) -> Result<u64> {
    u64::try_from(amount).map_err(|_| AmmError::MaxTokenOverflow.into())
}

/// Compute the result of a single swap step
///
/// # Arguments
/// * `sqrt_price_current_x64` - Current sqrt price (Q64.64)
/// * `sqrt_price_target_x64` - Next tick boundary clipped by the price limit
/// * `liquidity` - Liquidity active in this range
/// * `amount_remaining` - Input left (exact-in) or output left (exact-out)
/// * `fee_rate` - Trade fee rate over `FEE_RATE_DENOMINATOR`
/// * `is_base_input` - true for exact input, false for exact output
/// * `zero_for_one` - true if token 0 goes in (price decreasing)
pub fn compute_swap_step(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    amount_remaining: u64,
    fee_rate: u32,
    is_base_input: bool,
    zero_for_one: bool,
) -> Result<SwapStep> {
    require!(fee_rate < FEE_RATE_DENOMINATOR, AmmError::InvalidConfig);

    let mut step = SwapStep::default();

    let reach_target = if is_base_input {
        let amount_remaining_less_fee = mul_div(
            amount_remaining as u128,
            (FEE_RATE_DENOMINATOR - fee_rate) as u128,
            FEE_RATE_DENOMINATOR as u128,
        )? as u64;
        match amount_to_target(
            sqrt_price_current_x64,
            sqrt_price_target_x64,
            liquidity,
            zero_for_one,
            true,
        )? {
            Some(amount_in) if amount_remaining_less_fee >= amount_in => {
                step.amount_in = amount_in;
                true
            }
            _ => {
                step.sqrt_price_next_x64 = get_next_sqrt_price_from_input(
                    sqrt_price_current_x64,
                    liquidity,
                    amount_remaining_less_fee,
                    zero_for_one,
                )?;
                false
            }
        }
    } else {
        match amount_to_target(
            sqrt_price_current_x64,
            sqrt_price_target_x64,
            liquidity,
            zero_for_one,
            false,
        )? {
            Some(amount_out) if amount_remaining >= amount_out => {
                step.amount_out = amount_out;
                true
            }
            _ => {
                step.sqrt_price_next_x64 = get_next_sqrt_price_from_output(
                    sqrt_price_current_x64,
                    liquidity,
                    amount_remaining,
                    zero_for_one,
                )?;
                false
            }
        }
    };

    if reach_target {
        step.sqrt_price_next_x64 = sqrt_price_target_x64;
    }
    let sqrt_price_next_x64 = step.sqrt_price_next_x64;

    // Derive whichever legs were not fixed above
    if zero_for_one {
        if !(reach_target && is_base_input) {
            step.amount_in = narrow(get_amount_0_delta_u128(
                sqrt_price_next_x64,
                sqrt_price_current_x64,
                liquidity,
                true,
            )?)?;
        }
        if !(reach_target && !is_base_input) {
            step.amount_out = narrow(get_amount_1_delta_u128(
                sqrt_price_next_x64,
                sqrt_price_current_x64,
                liquidity,
                false,
            )?)?;
        }
    } else {
        if !(reach_target && is_base_input) {
            step.amount_in = narrow(get_amount_1_delta_u128(
                sqrt_price_current_x64,
                sqrt_price_next_x64,
                liquidity,
                true,
            )?)?;
        }
        if !(reach_target && !is_base_input) {
            step.amount_out = narrow(get_amount_0_delta_u128(
                sqrt_price_current_x64,
                sqrt_price_next_x64,
                liquidity,
                false,
            )?)?;
        }
    }

    // Rounding of the next price must never hand out more than asked for
    if !is_base_input && step.amount_out > amount_remaining {
        step.amount_out = amount_remaining;
    }

    step.fee_amount = if is_base_input && !reach_target {
        // Everything not swapped is kept as fee
        amount_remaining
            .checked_sub(step.amount_in)
            .ok_or(AmmError::MathOverflow)?
    } else {
        narrow(mul_div_round_up(
            step.amount_in as u128,
            fee_rate as u128,
            (FEE_RATE_DENOMINATOR - fee_rate) as u128,
        )?)?
    };

    Ok(step)
}

/// Split of one step's trade fee
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub protocol_fee: u64,
    pub fund_fee: u64,
    /// Remainder credited to in-range liquidity
    pub lp_fee: u64,
}

/// Carve the protocol share, then the fund share, out of a trade fee
///
/// Each share is `rate / FEE_RATE_DENOMINATOR` of the whole fee, rounded down.
pub fn split_fee(fee_amount: u64, protocol_fee_rate: u32, fund_fee_rate: u32) -> Result<FeeSplit> {
    let protocol_fee = mul_div(
        fee_amount as u128,
        protocol_fee_rate as u128,
        FEE_RATE_DENOMINATOR as u128,
    )? as u64;
    let fund_fee = mul_div(
        fee_amount as u128,
        fund_fee_rate as u128,
        FEE_RATE_DENOMINATOR as u128,
    )? as u64;
    let lp_fee = fee_amount
        .checked_sub(protocol_fee)
        .and_then(|fee| fee.checked_sub(fund_fee))
        .ok_or(AmmError::InvalidConfig)?;

    Ok(FeeSplit {
        protocol_fee,
        fund_fee,
        lp_fee,
    })
}

/// Fee growth per unit of liquidity, Q64.64
/// fee_growth = fee_amount * 2^64 / liquidity
pub fn calculate_fee_growth(fee_amount: u64, liquidity: u128) -> Result<u128> {
    if liquidity == 0 || fee_amount == 0 {
        return Ok(0);
    }
    mul_div(fee_amount as u128, Q64, liquidity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_price_at_tick;
    use proptest::prelude::*;

    #[test]
    fn test_exact_input_within_range() {
        let target = get_sqrt_price_at_tick(-1000).unwrap();
        let step =
            compute_swap_step(Q64, target, 100_000_000, 1_000_000, 2500, true, true).unwrap();

        assert!(step.sqrt_price_next_x64 < Q64);
        assert!(step.sqrt_price_next_x64 > target);
        // Whole input consumed: amount + fee
        assert_eq!(step.amount_in + step.fee_amount, 1_000_000);
        assert_eq!(step.amount_in, 997_500);
        assert!(step.amount_out > 980_000 && step.amount_out < step.amount_in);
    }

    #[test]
    fn test_exact_input_reaches_target() {
        let target = get_sqrt_price_at_tick(-10).unwrap();
        let step =
            compute_swap_step(Q64, target, 1_000_000, u32::MAX as u64, 2500, true, true).unwrap();

        assert_eq!(step.sqrt_price_next_x64, target);
        assert!(step.amount_in + step.fee_amount < u32::MAX as u64);
        assert_eq!(
            step.fee_amount,
            mul_div_round_up(step.amount_in as u128, 2500, 997_500).unwrap() as u64
        );
    }

    #[test]
    fn test_exact_output_caps_output() {
        let target = get_sqrt_price_at_tick(1000).unwrap();
        let step = compute_swap_step(Q64, target, 100_000_000, 500_000, 2500, false, false).unwrap();

        assert_eq!(step.amount_out, 500_000);
        assert!(step.sqrt_price_next_x64 > Q64 && step.sqrt_price_next_x64 < target);
        // Input is worth at least the output at price >= 1
        assert!(step.amount_in >= step.amount_out);
        assert!(step.fee_amount > 0);
    }

    #[test]
    fn test_zero_liquidity_jumps_to_target() {
        let target = get_sqrt_price_at_tick(-600).unwrap();
        let step = compute_swap_step(Q64, target, 0, 1_000, 2500, true, true).unwrap();
        assert_eq!(step.sqrt_price_next_x64, target);
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
        assert_eq!(step.fee_amount, 0);
    }

    #[test]
    fn test_split_fee() {
        let split = split_fee(10_000, 800, 0).unwrap();
        assert_eq!(split.protocol_fee, 8);
        assert_eq!(split.fund_fee, 0);
        assert_eq!(split.lp_fee, 9_992);

        let split = split_fee(10_000, 120_000, 40_000).unwrap();
        assert_eq!(split.protocol_fee, 1_200);
        assert_eq!(split.fund_fee, 400);
        assert_eq!(split.lp_fee, 8_400);
    }

    #[test]
    fn test_calculate_fee_growth() {
        assert_eq!(calculate_fee_growth(100, 0).unwrap(), 0);
        assert_eq!(calculate_fee_growth(1, 1).unwrap(), Q64);
        assert_eq!(calculate_fee_growth(50, 100).unwrap(), Q64 / 2);
    }

    proptest! {
        #[test]
        fn prop_exact_input_never_overspends(
            amount in 1u64..1_000_000_000_000,
            liquidity in 1_000u128..1_000_000_000_000_000,
            tick_target in -20_000i32..20_000,
            fee_rate in 0u32..100_000,
        ) {
            prop_assume!(tick_target != 0);
            let target = get_sqrt_price_at_tick(tick_target).unwrap();
            let zero_for_one = target < Q64;
            let step = compute_swap_step(
                Q64, target, liquidity, amount, fee_rate, true, zero_for_one,
            ).unwrap();
            prop_assert!(step.amount_in as u128 + step.fee_amount as u128 <= amount as u128);
            if zero_for_one {
                prop_assert!(step.sqrt_price_next_x64 >= target && step.sqrt_price_next_x64 <= Q64);
            } else {
                prop_assert!(step.sqrt_price_next_x64 <= target && step.sqrt_price_next_x64 >= Q64);
            }
        }
    }
}
