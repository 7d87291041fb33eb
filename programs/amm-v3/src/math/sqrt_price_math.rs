//! Sqrt Price Math
//!
//! Next sqrt price after moving a token amount through a liquidity range.

use crate::errors::AmmError;
use crate::math::full_math::U256;
use anchor_lang::prelude::*;

/// Next sqrt price after adding or removing `amount` of token 0
///
///   add:    L * sp / (L + amount * sp)
///   remove: L * sp / (L - amount * sp)
///
/// Always rounds up so the price moves no further than the amount allows.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }

    let numerator = U256::from(liquidity) << 64;
    let product = U256::from(amount) * U256::from(sqrt_price_x64);

    let denominator = if add {
        numerator + product
    } else {
        require!(numerator > product, AmmError::MathOverflow);
        numerator - product
    };

    let (quotient, remainder) = (numerator * U256::from(sqrt_price_x64)).div_mod(denominator);
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    quotient.try_into_u128()
}

/// Next sqrt price after adding or removing `amount` of token 1
///
///   add:    sp + amount / L
///   remove: sp - amount / L
///
/// Always rounds down.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }

    let numerator = U256::from(amount) << 64;
    let liquidity = U256::from(liquidity);

    if add {
        let quotient = (numerator / liquidity).try_into_u128()?;
        sqrt_price_x64
            .checked_add(quotient)
            .ok_or_else(|| AmmError::MathOverflow.into())
    } else {
        let (quotient, remainder) = numerator.div_mod(liquidity);
        let quotient = if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::one()
        };
        let quotient = quotient.try_into_u128()?;
        require!(sqrt_price_x64 > quotient, AmmError::MathOverflow);
        Ok(sqrt_price_x64 - quotient)
    }
}

/// Next sqrt price after swapping `amount_in` into the pool
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require!(sqrt_price_x64 > 0, AmmError::SqrtPriceOutOfRange);
    require!(liquidity > 0, AmmError::ZeroLiquidity);

    if zero_for_one {
        // Token 0 in, price decreases
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_in, true)
    } else {
        // Token 1 in, price increases
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_in, true)
    }
}

/// Next sqrt price after taking `amount_out` out of the pool
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_out: u64,
    zero_for_one: bool,
) -> Result<u128> {
    require!(sqrt_price_x64 > 0, AmmError::SqrtPriceOutOfRange);
    require!(liquidity > 0, AmmError::ZeroLiquidity);

    if zero_for_one {
        // Token 1 out, price decreases
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_out, false)
    } else {
        // Token 0 out, price increases
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_out, false)
    }
}
