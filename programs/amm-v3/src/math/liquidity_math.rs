//! Liquidity Math
//!
//! Token amounts backing a liquidity range. Amounts the user pays are rounded
//! up and amounts the user receives are rounded down, so the pool never
//! under-collects.

use crate::constants::Q64;
use crate::errors::AmmError;
use crate::math::full_math::{mul_div, mul_div_round_up, U256};
use crate::math::tick_math::get_sqrt_price_at_tick;
use anchor_lang::prelude::*;

/// Add a signed liquidity delta to existing liquidity
pub fn add_liquidity_delta(x: u128, y: i128) -> Result<u128> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or_else(|| AmmError::MathOverflow.into())
    } else {
        x.checked_add(y as u128)
            .ok_or_else(|| AmmError::MathOverflow.into())
    }
}

fn sorted(sqrt_price_a_x64: u128, sqrt_price_b_x64: u128) -> (u128, u128) {
    if sqrt_price_a_x64 > sqrt_price_b_x64 {
        (sqrt_price_b_x64, sqrt_price_a_x64)
    } else {
        (sqrt_price_a_x64, sqrt_price_b_x64)
    }
}

/// Amount of token 0 between two sqrt prices, without narrowing to u64
///
/// amount_0 = L * 2^64 * (sp_upper - sp_lower) / (sp_upper * sp_lower)
pub fn get_amount_0_delta_u128(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    require!(sqrt_price_lower > 0, AmmError::DivisionByZero);

    let numerator_1 = U256::from(liquidity) << 64;
    let numerator_2 = U256::from(sqrt_price_upper - sqrt_price_lower);
    let product = numerator_1 * numerator_2;
    let upper = U256::from(sqrt_price_upper);
    let lower = U256::from(sqrt_price_lower);

    let result = if round_up {
        let (step, rem) = product.div_mod(upper);
        let step = if rem.is_zero() { step } else { step + U256::one() };
        let (result, rem) = step.div_mod(lower);
        if rem.is_zero() { result } else { result + U256::one() }
    } else {
        product / upper / lower
    };

    result.try_into_u128()
}

/// Amount of token 1 between two sqrt prices, without narrowing to u64
///
/// amount_1 = L * (sp_upper - sp_lower) / 2^64
pub fn get_amount_1_delta_u128(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    let diff = sqrt_price_upper - sqrt_price_lower;
    if round_up {
        mul_div_round_up(liquidity, diff, Q64)
    } else {
        mul_div(liquidity, diff, Q64)
    }
}

/// Amount of token 0 between two sqrt prices for `liquidity`
pub fn get_amount_0_delta(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    let amount = get_amount_0_delta_u128(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?;
    u64::try_from(amount).map_err(|_| AmmError::MaxTokenOverflow.into())
}

/// Amount of token 1 between two sqrt prices for `liquidity`
pub fn get_amount_1_delta(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64> {
    let amount = get_amount_1_delta_u128(sqrt_price_a_x64, sqrt_price_b_x64, liquidity, round_up)?;
    u64::try_from(amount).map_err(|_| AmmError::MaxTokenOverflow.into())
}

/// Token amounts backing `liquidity` over [tick_lower, tick_upper) at the current price
///
/// Below the range the position is all token 0, above it all token 1.
/// Rounds up when `round_up` (deposits) and down otherwise (withdrawals).
pub fn get_amounts_for_liquidity(
    sqrt_price_current_x64: u128,
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    round_up: bool,
) -> Result<(u64, u64)> {
    if liquidity == 0 {
        return Ok((0, 0));
    }

    let sqrt_price_lower = get_sqrt_price_at_tick(tick_lower)?;
    let sqrt_price_upper = get_sqrt_price_at_tick(tick_upper)?;

    if tick_current < tick_lower {
        let amount_0 = get_amount_0_delta(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((amount_0, 0))
    } else if tick_current < tick_upper {
        let amount_0 =
            get_amount_0_delta(sqrt_price_current_x64, sqrt_price_upper, liquidity, round_up)?;
        let amount_1 =
            get_amount_1_delta(sqrt_price_lower, sqrt_price_current_x64, liquidity, round_up)?;
        Ok((amount_0, amount_1))
    } else {
        let amount_1 = get_amount_1_delta(sqrt_price_lower, sqrt_price_upper, liquidity, round_up)?;
        Ok((0, amount_1))
    }
}

/// Liquidity bought by `amount_0` of token 0 between two sqrt prices, rounded down
///
/// L = amount_0 * sp_upper * sp_lower / (2^64 * (sp_upper - sp_lower))
pub fn get_liquidity_from_amount_0(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_0: u64,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    require!(
        sqrt_price_upper > sqrt_price_lower,
        AmmError::DivisionByZero
    );
    let numerator =
        U256::from(amount_0) * U256::from(sqrt_price_lower) * U256::from(sqrt_price_upper);
    let denominator = U256::from(Q64) * U256::from(sqrt_price_upper - sqrt_price_lower);
    (numerator / denominator).try_into_u128()
}

/// Liquidity bought by `amount_1` of token 1 between two sqrt prices, rounded down
///
/// L = amount_1 * 2^64 / (sp_upper - sp_lower)
pub fn get_liquidity_from_amount_1(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_1: u64,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    require!(
        sqrt_price_upper > sqrt_price_lower,
        AmmError::DivisionByZero
    );
    mul_div(u128::from(amount_1), Q64, sqrt_price_upper - sqrt_price_lower)
}

/// Largest liquidity over [sp_a, sp_b] that both amounts can fund at the current price
///
/// Below the range only token 0 counts, above it only token 1, inside it the
/// smaller of the two.
pub fn get_liquidity_from_amounts(
    sqrt_price_current_x64: u128,
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_0: u64,
    amount_1: u64,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    if sqrt_price_current_x64 <= sqrt_price_lower {
        get_liquidity_from_amount_0(sqrt_price_lower, sqrt_price_upper, amount_0)
    } else if sqrt_price_current_x64 < sqrt_price_upper {
        let liquidity_0 =
            get_liquidity_from_amount_0(sqrt_price_current_x64, sqrt_price_upper, amount_0)?;
        let liquidity_1 =
            get_liquidity_from_amount_1(sqrt_price_lower, sqrt_price_current_x64, amount_1)?;
        Ok(liquidity_0.min(liquidity_1))
    } else {
        get_liquidity_from_amount_1(sqrt_price_lower, sqrt_price_upper, amount_1)
    }
}

/// Liquidity funded by one token alone, zero when the price leaves no room for it
pub fn get_liquidity_from_single_amount(
    sqrt_price_current_x64: u128,
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount: u64,
    is_token_0: bool,
) -> Result<u128> {
    let (sqrt_price_lower, sqrt_price_upper) = sorted(sqrt_price_a_x64, sqrt_price_b_x64);
    if is_token_0 {
        if sqrt_price_current_x64 >= sqrt_price_upper {
            return Ok(0);
        }
        get_liquidity_from_amount_0(
            sqrt_price_current_x64.max(sqrt_price_lower),
            sqrt_price_upper,
            amount,
        )
    } else {
        if sqrt_price_current_x64 <= sqrt_price_lower {
            return Ok(0);
        }
        get_liquidity_from_amount_1(
            sqrt_price_lower,
            sqrt_price_current_x64.min(sqrt_price_upper),
            amount,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_TICK, MIN_TICK};
    use proptest::prelude::*;

    #[test]
    fn test_add_liquidity_delta() {
        assert_eq!(add_liquidity_delta(100, 50).unwrap(), 150);
        assert_eq!(add_liquidity_delta(100, -50).unwrap(), 50);
        assert_eq!(
            add_liquidity_delta(100, -101).unwrap_err(),
            AmmError::MathOverflow.into()
        );
        assert_eq!(
            add_liquidity_delta(u128::MAX, 1).unwrap_err(),
            AmmError::MathOverflow.into()
        );
    }

    #[test]
    fn test_amount_deltas_symmetric_range() {
        // [-1000, 1000] around price 1.0 with L = 1e8
        let current = Q64;
        let (amount_0, amount_1) =
            get_amounts_for_liquidity(current, 0, -1000, 1000, 100_000_000, true).unwrap();
        assert!(amount_0 > 0 && amount_1 > 0);
        // Symmetric in log space, so the two legs are nearly equal
        let diff = amount_0.abs_diff(amount_1);
        assert!(diff * 100 < amount_0, "{} vs {}", amount_0, amount_1);
    }

    #[test]
    fn test_amounts_out_of_range() {
        let sp = get_sqrt_price_at_tick(-2000).unwrap();
        let (amount_0, amount_1) =
            get_amounts_for_liquidity(sp, -2000, -1000, 1000, 1_000_000, true).unwrap();
        assert!(amount_0 > 0);
        assert_eq!(amount_1, 0);

        let sp = get_sqrt_price_at_tick(2000).unwrap();
        let (amount_0, amount_1) =
            get_amounts_for_liquidity(sp, 2000, -1000, 1000, 1_000_000, true).unwrap();
        assert_eq!(amount_0, 0);
        assert!(amount_1 > 0);
    }

    #[test]
    fn test_amount_overflow_is_reported() {
        let lower = get_sqrt_price_at_tick(MIN_TICK).unwrap();
        let upper = get_sqrt_price_at_tick(MAX_TICK).unwrap();
        assert_eq!(
            get_amount_0_delta(lower, upper, u64::MAX as u128, true).unwrap_err(),
            AmmError::MaxTokenOverflow.into()
        );
        assert!(get_amount_0_delta_u128(lower, upper, u64::MAX as u128, true).is_ok());
    }

    #[test]
    fn test_liquidity_from_amounts_by_price_position() {
        let lower = get_sqrt_price_at_tick(-1000).unwrap();
        let upper = get_sqrt_price_at_tick(1000).unwrap();

        // Below the range token 1 is irrelevant
        let below = get_sqrt_price_at_tick(-2000).unwrap();
        assert_eq!(
            get_liquidity_from_amounts(below, lower, upper, 1_000_000, 0).unwrap(),
            get_liquidity_from_amount_0(lower, upper, 1_000_000).unwrap()
        );

        // Above the range token 0 is irrelevant
        let above = get_sqrt_price_at_tick(2000).unwrap();
        assert_eq!(
            get_liquidity_from_amounts(above, lower, upper, 0, 1_000_000).unwrap(),
            get_liquidity_from_amount_1(lower, upper, 1_000_000).unwrap()
        );

        // Inside the range the scarcer token binds
        let rich_0 = get_liquidity_from_amounts(Q64, lower, upper, 10_000_000, 1_000_000).unwrap();
        let rich_1 = get_liquidity_from_amounts(Q64, lower, upper, 1_000_000, 10_000_000).unwrap();
        assert_eq!(rich_0, get_liquidity_from_amount_1(lower, Q64, 1_000_000).unwrap());
        assert_eq!(rich_1, get_liquidity_from_amount_0(Q64, upper, 1_000_000).unwrap());
    }

    #[test]
    fn test_single_amount_outside_its_side_is_zero() {
        let lower = get_sqrt_price_at_tick(-1000).unwrap();
        let upper = get_sqrt_price_at_tick(1000).unwrap();
        let above = get_sqrt_price_at_tick(2000).unwrap();
        let below = get_sqrt_price_at_tick(-2000).unwrap();

        assert_eq!(
            get_liquidity_from_single_amount(above, lower, upper, 1_000_000, true).unwrap(),
            0
        );
        assert_eq!(
            get_liquidity_from_single_amount(below, lower, upper, 1_000_000, false).unwrap(),
            0
        );
        assert!(get_liquidity_from_single_amount(below, lower, upper, 1_000_000, true).unwrap() > 0);
        assert!(get_liquidity_from_single_amount(above, lower, upper, 1_000_000, false).unwrap() > 0);
    }

    proptest! {
        #[test]
        fn prop_liquidity_from_amounts_fits_the_amounts(
            tick_current in -50_000i32..50_000,
            tick_lower in -60_000i32..60_000,
            width in 1i32..20_000,
            amount_0 in 1u64..1_000_000_000_000,
            amount_1 in 1u64..1_000_000_000_000,
        ) {
            let tick_upper = tick_lower + width;
            let current = get_sqrt_price_at_tick(tick_current).unwrap();
            let lower = get_sqrt_price_at_tick(tick_lower).unwrap();
            let upper = get_sqrt_price_at_tick(tick_upper).unwrap();
            let liquidity =
                get_liquidity_from_amounts(current, lower, upper, amount_0, amount_1).unwrap();
            let (need_0, need_1) = get_amounts_for_liquidity(
                current, tick_current, tick_lower, tick_upper, liquidity, true,
            ).unwrap();
            prop_assert!(need_0 <= amount_0, "{} > {}", need_0, amount_0);
            prop_assert!(need_1 <= amount_1, "{} > {}", need_1, amount_1);
        }

        #[test]
        fn prop_round_up_never_below_round_down(
            tick_a in -100_000i32..100_000,
            width in 1i32..50_000,
            liquidity in 1u128..u64::MAX as u128,
        ) {
            let a = get_sqrt_price_at_tick(tick_a).unwrap();
            let b = get_sqrt_price_at_tick(tick_a + width).unwrap();
            let up_0 = get_amount_0_delta_u128(a, b, liquidity, true).unwrap();
            let down_0 = get_amount_0_delta_u128(a, b, liquidity, false).unwrap();
            prop_assert!(up_0 >= down_0 && up_0 - down_0 <= 2);
            let up_1 = get_amount_1_delta_u128(a, b, liquidity, true).unwrap();
            let down_1 = get_amount_1_delta_u128(a, b, liquidity, false).unwrap();
            prop_assert!(up_1 >= down_1 && up_1 - down_1 <= 1);
        }
    }
}
