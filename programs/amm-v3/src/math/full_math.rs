//! Full precision math operations
//!
//! 256-bit intermediate products for liquidity, price and fee calculations.
//! Every (a * b) / d is evaluated in U256 before narrowing back to u128.

use crate::errors::AmmError;
use anchor_lang::prelude::*;

mod u256 {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer backed by four u64 limbs
        pub struct U256(4);
    }
}
pub use u256::U256;

impl U256 {
    /// Narrow to u128, failing if any of the upper 128 bits are set
    pub fn try_into_u128(self) -> Result<u128> {
        if self.bits() > 128 {
            return Err(AmmError::MathOverflow.into());
        }
        Ok(self.low_u128())
    }
}

/// Multiply two u128 numbers and divide by a third, rounding down
///
/// # Formula
/// result = floor(a * b / denominator)
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, AmmError::DivisionByZero);
    let product = U256::from(a) * U256::from(b);
    (product / U256::from(denominator)).try_into_u128()
}

/// Multiply two u128 numbers and divide by a third, rounding up
///
/// # Formula
/// result = ceil(a * b / denominator)
pub fn mul_div_round_up(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, AmmError::DivisionByZero);
    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(U256::from(denominator));
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    quotient.try_into_u128()
}

/// High 128 bits of a 128x128 product, i.e. (a * b) >> 128
pub fn mul_shr_128(a: u128, b: u128) -> u128 {
    ((U256::from(a) * U256::from(b)) >> 128).low_u128()
}
