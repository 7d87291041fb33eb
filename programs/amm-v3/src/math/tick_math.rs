//! Tick Math
//!
//! Converts between tick indices and Q64.64 sqrt prices.
//!
//! tick = log_{1.0001}(price)
//! sqrt_price = 1.0001^(tick/2) * 2^64

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK};
use crate::errors::AmmError;
use crate::math::full_math::{mul_shr_128, U256};
use anchor_lang::prelude::*;

/// 1/sqrt(1.0001)^(2^i) in Q128.128 for i in 0..19
const INVERSE_SQRT_RATIOS_X128: [u128; 19] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
];

/// Get sqrt price at a given tick
/// sqrt_price_x64 = sqrt(1.0001^tick) * 2^64
///
/// Multiplies the precomputed 1/sqrt(1.0001)^(2^i) factor for every bit set in
/// |tick|, then inverts for positive ticks.
pub fn get_sqrt_price_at_tick(tick: i32) -> Result<u128> {
    require!(
        (MIN_TICK..=MAX_TICK).contains(&tick),
        AmmError::TickOutOfRange
    );

    let abs_tick = tick.unsigned_abs();

    // 1.0 in Q128.128 is 2^128, approximated by u128::MAX
    let mut ratio: u128 = if abs_tick & 0x1 != 0 {
        INVERSE_SQRT_RATIOS_X128[0]
    } else {
        u128::MAX
    };

    for (bit, factor) in INVERSE_SQRT_RATIOS_X128.iter().enumerate().skip(1) {
        if abs_tick & (1u32 << bit) != 0 {
            ratio = mul_shr_128(ratio, *factor);
        }
    }

    if tick > 0 {
        // (2^256 / ratio) >> 64, rounded up
        let inverted = (U256::one() << 192) / U256::from(ratio);
        return inverted
            .try_into_u128()?
            .checked_add(1)
            .ok_or_else(|| AmmError::MathOverflow.into());
    }

    // Q128.128 -> Q64.64, rounded up
    Ok((ratio >> 64) + u128::from(ratio % (1u128 << 64) > 0))
}

/// Get the greatest tick whose sqrt price is <= `sqrt_price_x64`
///
/// Binary search over the tick range; exact inverse of `get_sqrt_price_at_tick`
/// on every valid tick.
pub fn get_tick_at_sqrt_price(sqrt_price_x64: u128) -> Result<i32> {
    require!(
        (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64),
        AmmError::SqrtPriceOutOfRange
    );

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    // Invariant: price(low) <= sqrt_price_x64 < price(high + 1)
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_price_at_tick(mid)? <= sqrt_price_x64 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}
