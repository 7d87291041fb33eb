//! Position core shared by open, increase, decrease and close
//!
//! Works on plain state so it can run against synthetic pools in tests. Every
//! change is computed on copies and written back only after the last check.

use anchor_lang::prelude::*;

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::AmmError;
use crate::math::liquidity_math::{
    add_liquidity_delta, get_amounts_for_liquidity, get_liquidity_from_amounts,
    get_liquidity_from_single_amount,
};
use crate::math::tick_math::get_sqrt_price_at_tick;
use crate::state::{
    bitmap_bit_index, flip_tick_array_bit, get_fee_growth_inside, is_in_native_span,
    PersonalPositionState, PoolState, TickArrayBitmapExtension, TickArrayState, TickState,
};

/// Token amounts moved by a liquidity change
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityChange {
    /// Principal deposited (increase) or released (decrease)
    pub amount_0: u64,
    pub amount_1: u64,
    /// Owed fees paid out with a decrease
    pub fee_amount_0: u64,
    pub fee_amount_1: u64,
}

/// Validate a position range against the pool's tick spacing
pub fn check_ticks_order(tick_lower: i32, tick_upper: i32, tick_spacing: u16) -> Result<()> {
    require!(tick_lower < tick_upper, AmmError::TickRangeInvalid);
    require!(
        tick_lower >= MIN_TICK && tick_upper <= MAX_TICK,
        AmmError::TickOutOfRange
    );
    let spacing = i32::from(tick_spacing);
    require!(
        tick_lower % spacing == 0 && tick_upper % spacing == 0,
        AmmError::TickRangeInvalid
    );
    Ok(())
}

/// Index of the supplied array starting at `start_index`
fn find_array(tick_arrays: &[&mut TickArrayState], start_index: i32) -> Result<usize> {
    tick_arrays
        .iter()
        .position(|array| array.start_tick_index == start_index)
        .ok_or_else(|| AmmError::ArrayNotLoaded.into())
}

/// Initialized-tick count change planned for one array
struct ArrayCountUpdate {
    index: usize,
    count: u8,
    flip_bitmap: bool,
}

fn plan_count_update(array: &TickArrayState, index: usize, delta: i32) -> Result<ArrayCountUpdate> {
    let before = i32::from(array.initialized_tick_count);
    let after = before + delta;
    let count = u8::try_from(after).map_err(|_| AmmError::MathOverflow)?;
    Ok(ArrayCountUpdate {
        index,
        count,
        flip_bitmap: (before == 0) != (after == 0),
    })
}

fn count_delta(flipped: bool, tick: &TickState) -> i32 {
    match (flipped, tick.is_initialized()) {
        (false, _) => 0,
        (true, true) => 1,
        (true, false) => -1,
    }
}

/// Apply `liquidity_delta` to a position, its boundary ticks and the pool
///
/// Positive deltas round amounts up and must stay within the limits as maxima;
/// negative deltas round down and must reach the limits as minima. A zero delta
/// only settles fees. The position's owed fees are refreshed but not paid out.
pub fn modify_position(
    pool: &mut PoolState,
    position: &mut PersonalPositionState,
    tick_arrays: &mut [&mut TickArrayState],
    mut extension: Option<&mut TickArrayBitmapExtension>,
    liquidity_delta: i128,
    amount_0_limit: u64,
    amount_1_limit: u64,
) -> Result<LiquidityChange> {
    let tick_spacing = pool.tick_spacing;
    let tick_lower_index = position.tick_lower_index;
    let tick_upper_index = position.tick_upper_index;
    check_ticks_order(tick_lower_index, tick_upper_index, tick_spacing)?;

    let lower_array = find_array(
        tick_arrays,
        TickArrayState::get_array_start_index(tick_lower_index, tick_spacing),
    )?;
    let upper_array = find_array(
        tick_arrays,
        TickArrayState::get_array_start_index(tick_upper_index, tick_spacing),
    )?;
    let lower_offset = tick_arrays[lower_array].tick_offset(tick_lower_index, tick_spacing)?;
    let upper_offset = tick_arrays[upper_array].tick_offset(tick_upper_index, tick_spacing)?;

    let mut tick_lower = tick_arrays[lower_array].ticks[lower_offset];
    let mut tick_upper = tick_arrays[upper_array].ticks[upper_offset];

    let tick_current = pool.tick_current;
    let fee_growth_global_0 = pool.fee_growth_global_0_x64;
    let fee_growth_global_1 = pool.fee_growth_global_1_x64;

    let (flipped_lower, flipped_upper) = if liquidity_delta != 0 {
        (
            tick_lower.update(
                tick_current,
                liquidity_delta,
                fee_growth_global_0,
                fee_growth_global_1,
                false,
            )?,
            tick_upper.update(
                tick_current,
                liquidity_delta,
                fee_growth_global_0,
                fee_growth_global_1,
                true,
            )?,
        )
    } else {
        (false, false)
    };

    let (fee_growth_inside_0, fee_growth_inside_1) = get_fee_growth_inside(
        &tick_lower,
        &tick_upper,
        tick_current,
        fee_growth_global_0,
        fee_growth_global_1,
    );

    let mut updated_position = position.clone();
    updated_position.update_fees(fee_growth_inside_0, fee_growth_inside_1)?;
    updated_position.liquidity = add_liquidity_delta(position.liquidity, liquidity_delta)
        .map_err(|_| AmmError::InsufficientPositionLiquidity)?;

    let (amount_0, amount_1) = if liquidity_delta != 0 {
        get_amounts_for_liquidity(
            pool.sqrt_price_x64,
            tick_current,
            tick_lower_index,
            tick_upper_index,
            liquidity_delta.unsigned_abs(),
            liquidity_delta > 0,
        )?
    } else {
        (0, 0)
    };

    if liquidity_delta > 0 {
        require!(
            amount_0 <= amount_0_limit && amount_1 <= amount_1_limit,
            AmmError::SlippageExceeded
        );
    } else if liquidity_delta < 0 {
        require!(
            amount_0 >= amount_0_limit && amount_1 >= amount_1_limit,
            AmmError::SlippageExceeded
        );
    }

    let in_range = tick_current >= tick_lower_index && tick_current < tick_upper_index;
    let pool_liquidity = if in_range {
        add_liquidity_delta(pool.liquidity, liquidity_delta)?
    } else {
        pool.liquidity
    };

    // Ticks going back to zero gross liquidity drop their snapshots
    if flipped_lower && !tick_lower.is_initialized() {
        tick_lower.clear();
    }
    if flipped_upper && !tick_upper.is_initialized() {
        tick_upper.clear();
    }

    let lower_delta = count_delta(flipped_lower, &tick_lower);
    let upper_delta = count_delta(flipped_upper, &tick_upper);
    let mut count_updates = Vec::with_capacity(2);
    if lower_array == upper_array {
        count_updates.push(plan_count_update(
            &tick_arrays[lower_array],
            lower_array,
            lower_delta + upper_delta,
        )?);
    } else {
        count_updates.push(plan_count_update(&tick_arrays[lower_array], lower_array, lower_delta)?);
        count_updates.push(plan_count_update(&tick_arrays[upper_array], upper_array, upper_delta)?);
    }

    for update in count_updates.iter().filter(|update| update.flip_bitmap) {
        let bit = bitmap_bit_index(tick_arrays[update.index].start_tick_index, tick_spacing)?;
        require!(
            is_in_native_span(bit) || extension.is_some(),
            AmmError::BitmapExtensionNotLoaded
        );
    }

    // Commit
    for update in &count_updates {
        let array = &mut tick_arrays[update.index];
        array.initialized_tick_count = update.count;
        if update.flip_bitmap {
            flip_tick_array_bit(
                &mut pool.tick_array_bitmap,
                extension.as_deref_mut(),
                array.start_tick_index,
                tick_spacing,
            )?;
        }
    }
    tick_arrays[lower_array].ticks[lower_offset] = tick_lower;
    tick_arrays[upper_array].ticks[upper_offset] = tick_upper;
    pool.liquidity = pool_liquidity;
    *position = updated_position;

    Ok(LiquidityChange {
        amount_0,
        amount_1,
        fee_amount_0: 0,
        fee_amount_1: 0,
    })
}

/// Run `f` over the boundary arrays of a position, loading a shared array once
pub fn with_boundary_arrays<R>(
    tick_array_lower: &AccountLoader<TickArrayState>,
    tick_array_upper: &AccountLoader<TickArrayState>,
    f: impl FnOnce(&mut [&mut TickArrayState]) -> Result<R>,
) -> Result<R> {
    if tick_array_lower.key() == tick_array_upper.key() {
        let mut array = tick_array_lower.load_mut()?;
        f(&mut [&mut *array])
    } else {
        let mut lower = tick_array_lower.load_mut()?;
        let mut upper = tick_array_upper.load_mut()?;
        f(&mut [&mut *lower, &mut *upper])
    }
}

/// Liquidity a deposit adds to `position`
///
/// A nonzero `liquidity` is used as given. Zero derives it from the maxima at
/// the pool's current price: `base_flag == Some(true)` funds it from
/// `amount_0_max` alone, `Some(false)` from `amount_1_max` alone and `None`
/// from both.
pub fn liquidity_for_deposit(
    pool: &PoolState,
    position: &PersonalPositionState,
    liquidity: u128,
    amount_0_max: u64,
    amount_1_max: u64,
    base_flag: Option<bool>,
) -> Result<u128> {
    if liquidity != 0 {
        return Ok(liquidity);
    }
    let sqrt_price_lower = get_sqrt_price_at_tick(position.tick_lower_index)?;
    let sqrt_price_upper = get_sqrt_price_at_tick(position.tick_upper_index)?;
    let liquidity = match base_flag {
        Some(is_token_0) => get_liquidity_from_single_amount(
            pool.sqrt_price_x64,
            sqrt_price_lower,
            sqrt_price_upper,
            if is_token_0 { amount_0_max } else { amount_1_max },
            is_token_0,
        )?,
        None => get_liquidity_from_amounts(
            pool.sqrt_price_x64,
            sqrt_price_lower,
            sqrt_price_upper,
            amount_0_max,
            amount_1_max,
        )?,
    };
    require!(liquidity > 0, AmmError::ZeroLiquidity);
    Ok(liquidity)
}

/// Add liquidity to a position, depositing at most the given amounts
pub fn increase_liquidity_core(
    pool: &mut PoolState,
    position: &mut PersonalPositionState,
    tick_arrays: &mut [&mut TickArrayState],
    extension: Option<&mut TickArrayBitmapExtension>,
    liquidity: u128,
    amount_0_max: u64,
    amount_1_max: u64,
) -> Result<LiquidityChange> {
    require!(liquidity > 0, AmmError::ZeroLiquidity);
    let delta = i128::try_from(liquidity).map_err(|_| AmmError::MathOverflow)?;
    modify_position(
        pool,
        position,
        tick_arrays,
        extension,
        delta,
        amount_0_max,
        amount_1_max,
    )
}

/// Remove liquidity and pay out every owed fee
///
/// `liquidity == 0` only collects fees.
pub fn decrease_liquidity_core(
    pool: &mut PoolState,
    position: &mut PersonalPositionState,
    tick_arrays: &mut [&mut TickArrayState],
    extension: Option<&mut TickArrayBitmapExtension>,
    liquidity: u128,
    amount_0_min: u64,
    amount_1_min: u64,
) -> Result<LiquidityChange> {
    require!(
        liquidity <= position.liquidity,
        AmmError::InsufficientPositionLiquidity
    );
    let delta = i128::try_from(liquidity)
        .map_err(|_| AmmError::MathOverflow)?
        .checked_neg()
        .ok_or(AmmError::MathOverflow)?;
    let mut change = modify_position(
        pool,
        position,
        tick_arrays,
        extension,
        delta,
        amount_0_min,
        amount_1_min,
    )?;

    change.fee_amount_0 = std::mem::take(&mut position.token_fees_owed_0);
    change.fee_amount_1 = std::mem::take(&mut position.token_fees_owed_1);
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::state::TickArrayBitmap;
    use crate::test_fixtures::*;

    #[test]
    fn test_open_straddling_position() {
        let mut pool = pool_at_price(50, Q64);
        let mut arrays = [tick_array_at(-3000, 50), tick_array_at(0, 50)];
        let mut position = position_in(-1000, 1000);
        let [a, b] = &mut arrays;
        let mut refs = [a, b];

        let change = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            100_000_000,
            u64::MAX,
            u64::MAX,
        )
        .unwrap();

        assert!(change.amount_0 > 0 && change.amount_1 > 0);
        assert_eq!(pool.liquidity, 100_000_000);
        assert_eq!(position.liquidity, 100_000_000);
        assert_eq!(refs[0].initialized_tick_count, 1);
        assert_eq!(refs[1].initialized_tick_count, 1);
        assert_eq!(refs[0].get_tick(-1000, 50).unwrap().liquidity_net, 100_000_000);
        assert_eq!(refs[1].get_tick(1000, 50).unwrap().liquidity_net, -100_000_000);

        let bitmap = TickArrayBitmap::new(&pool.tick_array_bitmap, None, 50);
        assert!(bitmap.is_initialized(-3000).unwrap());
        assert!(bitmap.is_initialized(0).unwrap());
    }

    #[test]
    fn test_both_ticks_in_one_array() {
        let mut pool = pool_at_price(50, Q64);
        let mut array = tick_array_at(0, 50);
        let mut position = position_in(100, 1000);
        let mut refs = [&mut array];

        let change = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            1_000_000,
            u64::MAX,
            u64::MAX,
        )
        .unwrap();

        // Range above the price: token 0 only, pool liquidity unchanged
        assert!(change.amount_0 > 0);
        assert_eq!(change.amount_1, 0);
        assert_eq!(pool.liquidity, 0);
        assert_eq!(refs[0].initialized_tick_count, 2);
    }

    #[test]
    fn test_missing_array_rejected() {
        let mut pool = pool_at_price(50, Q64);
        let mut array = tick_array_at(0, 50);
        let mut position = position_in(-1000, 1000);
        let mut refs = [&mut array];
        assert_eq!(
            increase_liquidity_core(&mut pool, &mut position, &mut refs, None, 1, u64::MAX, u64::MAX)
                .unwrap_err(),
            AmmError::ArrayNotLoaded.into()
        );
    }

    #[test]
    fn test_slippage_leaves_state_untouched() {
        let mut pool = pool_at_price(50, Q64);
        let mut arrays = [tick_array_at(-3000, 50), tick_array_at(0, 50)];
        let mut position = position_in(-1000, 1000);
        let [a, b] = &mut arrays;
        let mut refs = [a, b];

        let err = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            100_000_000,
            10,
            10,
        )
        .unwrap_err();
        assert_eq!(err, AmmError::SlippageExceeded.into());
        assert_eq!(pool.liquidity, 0);
        assert_eq!(pool.tick_array_bitmap, [0; 16]);
        assert_eq!(position.liquidity, 0);
        assert_eq!(refs[0].initialized_tick_count, 0);
        assert!(!refs[0].get_tick(-1000, 50).unwrap().is_initialized());
    }

    #[test]
    fn test_far_ticks_need_extension() {
        let mut pool = pool_at_price(1, Q64);
        let far = 600 * 60;
        let mut lower = tick_array_at(0, 1);
        let mut upper = tick_array_at(far, 1);
        let mut position = position_in(0, far);
        let mut refs = [&mut lower, &mut upper];

        assert_eq!(
            increase_liquidity_core(&mut pool, &mut position, &mut refs, None, 1_000, u64::MAX, u64::MAX)
                .unwrap_err(),
            AmmError::BitmapExtensionNotLoaded.into()
        );
        assert_eq!(refs[0].initialized_tick_count, 0);

        let mut extension: TickArrayBitmapExtension = bytemuck::Zeroable::zeroed();
        increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            Some(&mut extension),
            1_000,
            u64::MAX,
            u64::MAX,
        )
        .unwrap();
        let bitmap = TickArrayBitmap::new(&pool.tick_array_bitmap, Some(&extension), 1);
        assert!(bitmap.is_initialized(far).unwrap());
    }

    #[test]
    fn test_open_then_close_returns_deposit() {
        let mut pool = pool_at_price(50, Q64);
        let mut arrays = [tick_array_at(-3000, 50), tick_array_at(0, 50)];
        let mut position = position_in(-1000, 1000);
        let [a, b] = &mut arrays;
        let mut refs = [a, b];

        let deposit = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            100_000_000,
            u64::MAX,
            u64::MAX,
        )
        .unwrap();
        let withdrawal =
            decrease_liquidity_core(&mut pool, &mut position, &mut refs, None, 100_000_000, 0, 0)
                .unwrap();

        assert!(withdrawal.amount_0 <= deposit.amount_0);
        assert!(withdrawal.amount_1 <= deposit.amount_1);
        assert!(deposit.amount_0 - withdrawal.amount_0 <= 2);
        assert!(deposit.amount_1 - withdrawal.amount_1 <= 1);

        assert!(position.is_empty());
        assert_eq!(pool.liquidity, 0);
        assert_eq!(pool.tick_array_bitmap, [0; 16]);
        assert_eq!(refs[0].initialized_tick_count, 0);
        assert_eq!(*refs[0].get_tick(-1000, 50).unwrap(), TickState { tick: -1000, ..Default::default() });
    }

    #[test]
    fn test_liquidity_from_token_0_below_range() {
        // Price 1 sits below [1000, 2000): the deposit is token 0 only
        let mut pool = pool_at_price(50, Q64);
        let mut array = tick_array_at(0, 50);
        let mut position = position_in(1000, 2000);

        assert_eq!(
            liquidity_for_deposit(&pool, &position, 0, 1_000_000, 0, Some(false)).unwrap_err(),
            AmmError::ZeroLiquidity.into()
        );
        let liquidity =
            liquidity_for_deposit(&pool, &position, 0, 1_000_000, 0, Some(true)).unwrap();
        assert_eq!(
            liquidity_for_deposit(&pool, &position, 0, 1_000_000, 0, None).unwrap(),
            liquidity
        );

        let mut refs = [&mut array];
        let change = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            liquidity,
            1_000_000,
            0,
        )
        .unwrap();
        assert_eq!(change.amount_1, 0);
        assert!(change.amount_0 <= 1_000_000 && change.amount_0 > 999_000);
        assert_eq!(position.liquidity, liquidity);
        assert_eq!(pool.liquidity, 0);
    }

    #[test]
    fn test_liquidity_from_amounts_straddling() {
        let mut pool = pool_at_price(50, Q64);
        let mut arrays = [tick_array_at(-3000, 50), tick_array_at(0, 50)];
        let mut position = position_in(-1000, 1000);

        let from_0 =
            liquidity_for_deposit(&pool, &position, 0, 1_000_000, u64::MAX, Some(true)).unwrap();
        let from_1 =
            liquidity_for_deposit(&pool, &position, 0, u64::MAX, 1_000_000, Some(false)).unwrap();
        // Symmetric range around price 1: either side buys about the same liquidity
        assert!(from_0.abs_diff(from_1) * 100 < from_0);

        // Token 0 is the scarcer side, so it binds
        let both =
            liquidity_for_deposit(&pool, &position, 0, 1_000_000, 2_000_000, None).unwrap();
        assert_eq!(both, from_0);

        let [a, b] = &mut arrays;
        let mut refs = [a, b];
        let change = increase_liquidity_core(
            &mut pool,
            &mut position,
            &mut refs,
            None,
            both,
            1_000_000,
            2_000_000,
        )
        .unwrap();
        assert!(change.amount_0 <= 1_000_000 && change.amount_0 > 999_000);
        assert!(change.amount_1.abs_diff(change.amount_0) <= 2);
        assert_eq!(pool.liquidity, both);
    }

    #[test]
    fn test_explicit_liquidity_ignores_base_flag() {
        let pool = pool_at_price(50, Q64);
        let position = position_in(-1000, 1000);
        assert_eq!(
            liquidity_for_deposit(&pool, &position, 42, 0, 0, Some(true)).unwrap(),
            42
        );
    }

    #[test]
    fn test_decrease_more_than_position_rejected() {
        let mut pool = pool_at_price(50, Q64);
        let mut array = tick_array_at(0, 50);
        let mut position = position_in(0, 1000);
        let mut refs = [&mut array];
        increase_liquidity_core(&mut pool, &mut position, &mut refs, None, 500, u64::MAX, u64::MAX)
            .unwrap();
        assert_eq!(
            decrease_liquidity_core(&mut pool, &mut position, &mut refs, None, 501, 0, 0).unwrap_err(),
            AmmError::InsufficientPositionLiquidity.into()
        );
    }

    #[test]
    fn test_decrease_minimums_enforced() {
        let mut pool = pool_at_price(50, Q64);
        let mut array = tick_array_at(0, 50);
        let mut position = position_in(0, 1000);
        let mut refs = [&mut array];
        increase_liquidity_core(&mut pool, &mut position, &mut refs, None, 1_000_000, u64::MAX, u64::MAX)
            .unwrap();
        assert_eq!(
            decrease_liquidity_core(&mut pool, &mut position, &mut refs, None, 1_000_000, u64::MAX, 0)
                .unwrap_err(),
            AmmError::SlippageExceeded.into()
        );
        assert_eq!(position.liquidity, 1_000_000);
    }

    #[test]
    fn test_collect_only_pays_owed_fees() {
        let mut pool = pool_at_price(50, Q64);
        let mut arrays = [tick_array_at(-3000, 50), tick_array_at(0, 50)];
        let mut position = position_in(-1000, 1000);
        let [a, b] = &mut arrays;
        let mut refs = [a, b];
        increase_liquidity_core(&mut pool, &mut position, &mut refs, None, 1_000, u64::MAX, u64::MAX)
            .unwrap();

        // Three tokens of fee per unit of liquidity accrued in range
        pool.fee_growth_global_0_x64 = 3 * Q64;
        let change =
            decrease_liquidity_core(&mut pool, &mut position, &mut refs, None, 0, 0, 0).unwrap();
        assert_eq!(change.amount_0, 0);
        assert_eq!(change.fee_amount_0, 3_000);
        assert_eq!(change.fee_amount_1, 0);
        assert_eq!(position.token_fees_owed_0, 0);
        assert_eq!(position.liquidity, 1_000);
    }

    #[test]
    fn test_check_ticks_order() {
        assert!(check_ticks_order(-100, 100, 50).is_ok());
        assert_eq!(
            check_ticks_order(100, 100, 50).unwrap_err(),
            AmmError::TickRangeInvalid.into()
        );
        assert_eq!(
            check_ticks_order(-110, 100, 50).unwrap_err(),
            AmmError::TickRangeInvalid.into()
        );
        assert_eq!(
            check_ticks_order(MIN_TICK - 1, 100, 1).unwrap_err(),
            AmmError::TickOutOfRange.into()
        );
    }
}
