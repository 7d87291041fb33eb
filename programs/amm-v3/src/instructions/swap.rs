use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::cell::RefMut;

use crate::constants::{seeds, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use crate::errors::AmmError;
use crate::events::SwapEvent;
use crate::hooks::{
    authorize_mint, transfer_from_pool_vault_to_user, transfer_from_user_to_pool_vault,
    TokenTransfer,
};
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::swap_math::{calculate_fee_growth, compute_swap_step, split_fee};
use crate::math::tick_math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price};
use crate::state::{
    AmmConfig, HooksAccount, ObservationState, PoolState, TickArrayBitmap,
    TickArrayBitmapExtension, TickArrayState, TickState,
};

/// Swap against a pool
///
/// Remaining accounts: the tick arrays the walk needs, in swap order, then
/// the extra accounts of any transfer hook on either mint.
#[derive(Accounts)]
pub struct Swap<'info> {
    /// The user performing the swap
    pub payer: Signer<'info>,

    /// Fee config the pool was created under
    #[account(address = pool_state.load()?.amm_config_pubkey())]
    pub amm_config: Box<Account<'info, AmmConfig>>,

    /// The pool to swap on (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// User's account for the input token
    #[account(mut)]
    pub input_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// User's account for the output token
    #[account(mut)]
    pub output_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool vault receiving the input token
    #[account(mut)]
    pub input_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool vault paying out the output token
    #[account(mut)]
    pub output_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = pool_state.load()?.observation_key_pubkey())]
    pub observation_state: Box<Account<'info, ObservationState>>,

    /// Hook program registry
    #[account(seeds = [seeds::HOOKS_SEED], bump = hooks.bump)]
    pub hooks: Box<Account<'info, HooksAccount>>,

    /// Required once the walk leaves the pool's own bitmap span
    #[account(
        seeds = [seeds::TICK_ARRAY_BITMAP_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub tick_array_bitmap: Option<AccountLoader<'info, TickArrayBitmapExtension>>,

    pub input_token_program: Interface<'info, TokenInterface>,

    pub output_token_program: Interface<'info, TokenInterface>,

    #[account(address = input_vault.mint @ AmmError::InvalidTokenMint)]
    pub input_vault_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = output_vault.mint @ AmmError::InvalidTokenMint)]
    pub output_vault_mint: Box<InterfaceAccount<'info, Mint>>,
}

/// Swap parameters
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct SwapParams {
    /// Exact input when `is_base_input`, exact output otherwise
    pub amount: u64,
    /// Minimum output (exact input) or maximum input (exact output)
    pub other_amount_threshold: u64,
    /// Price the walk may not pass; 0 for no limit
    pub sqrt_price_limit_x64: u128,
    pub is_base_input: bool,
    /// true if token 0 goes in (price decreasing)
    pub zero_for_one: bool,
}

/// Settled amounts of a swap
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_in: u64,
    pub amount_out: u64,
    /// Trade fee charged on the input token, all shares included
    pub fee_amount: u64,
    pub protocol_fee: u64,
    pub fund_fee: u64,
    pub ticks_crossed: u32,
}

/// Internal swap state to track progress through tick arrays
struct SwapState {
    amount_remaining: u64,
    amount_calculated: u64,
    sqrt_price_x64: u128,
    tick: i32,
    liquidity: u128,
    fee_growth_global_x64: u128,
    fee_amount: u64,
    protocol_fee: u64,
    fund_fee: u64,
}

/// A tick crossed during the walk, written back on commit
struct TickCrossing {
    array: usize,
    offset: usize,
    tick: TickState,
}

/// Position `position` of the supplied arrays, which must start at `start_index`
fn expect_array(
    tick_arrays: &[&mut TickArrayState],
    position: usize,
    start_index: i32,
) -> Result<usize> {
    let array = tick_arrays
        .get(position)
        .ok_or(AmmError::OutOfTickArrays)?;
    require!(
        array.start_tick_index == start_index,
        AmmError::ArrayNotLoaded
    );
    Ok(position)
}

/// Walk the curve from the pool's price and settle the swap
///
/// `tick_arrays` must follow the bitmap: first the array holding the current
/// tick if populated, else the next populated one in the swap direction, then
/// each next populated array. Nothing is written until every check passes.
pub fn swap_internal(
    amm_config: &AmmConfig,
    pool: &mut PoolState,
    tick_arrays: &mut [&mut TickArrayState],
    extension: Option<&TickArrayBitmapExtension>,
    params: &SwapParams,
    block_timestamp: u64,
) -> Result<SwapResult> {
    require!(params.amount != 0, AmmError::ZeroAmountSpecified);
    require!(pool.is_open(block_timestamp), AmmError::PoolNotOpen);

    let zero_for_one = params.zero_for_one;
    let is_base_input = params.is_base_input;
    let tick_spacing = pool.tick_spacing;

    let sqrt_price_limit_x64 = if params.sqrt_price_limit_x64 == 0 {
        if zero_for_one {
            MIN_SQRT_PRICE_X64 + 1
        } else {
            MAX_SQRT_PRICE_X64 - 1
        }
    } else {
        params.sqrt_price_limit_x64
    };
    if zero_for_one {
        require!(
            sqrt_price_limit_x64 < pool.sqrt_price_x64
                && sqrt_price_limit_x64 > MIN_SQRT_PRICE_X64,
            AmmError::InvalidPriceLimit
        );
    } else {
        require!(
            sqrt_price_limit_x64 > pool.sqrt_price_x64
                && sqrt_price_limit_x64 < MAX_SQRT_PRICE_X64,
            AmmError::InvalidPriceLimit
        );
    }

    let (fee_growth_global_0, fee_growth_global_1) =
        (pool.fee_growth_global_0_x64, pool.fee_growth_global_1_x64);
    let mut state = SwapState {
        amount_remaining: params.amount,
        amount_calculated: 0,
        sqrt_price_x64: pool.sqrt_price_x64,
        tick: pool.tick_current,
        liquidity: pool.liquidity,
        fee_growth_global_x64: if zero_for_one {
            fee_growth_global_0
        } else {
            fee_growth_global_1
        },
        fee_amount: 0,
        protocol_fee: 0,
        fund_fee: 0,
    };

    let pool_bitmap = pool.tick_array_bitmap;
    let bitmap = TickArrayBitmap::new(&pool_bitmap, extension, tick_spacing);
    let (visible_lower, visible_upper) = bitmap.visible_tick_range();

    let arrays: &[&mut TickArrayState] = tick_arrays;
    let mut crossings: Vec<TickCrossing> = Vec::new();
    let mut current = match bitmap.first_initialized_start(state.tick, zero_for_one)? {
        Some(start) => Some(expect_array(arrays, 0, start)?),
        None => None,
    };

    while state.amount_remaining != 0 && state.sqrt_price_x64 != sqrt_price_limit_x64 {
        // Next initialized tick, moving on through the supplied arrays
        let mut next = None;
        while let Some(index) = current {
            if let Some(offset) =
                arrays[index].next_initialized_tick(state.tick, tick_spacing, zero_for_one)
            {
                next = Some((index, offset));
                break;
            }
            current = match bitmap
                .next_initialized_start(arrays[index].start_tick_index, zero_for_one)?
            {
                Some(start) => Some(expect_array(arrays, index + 1, start)?),
                None => None,
            };
        }

        let tick_next = match next {
            Some((index, offset)) => arrays[index].tick_index_at(offset, tick_spacing),
            None => {
                // Past the last populated array the walk runs to the visible edge
                if zero_for_one {
                    require!(
                        state.tick >= visible_lower,
                        AmmError::BitmapExtensionNotLoaded
                    );
                    visible_lower
                } else {
                    require!(
                        state.tick < visible_upper,
                        AmmError::BitmapExtensionNotLoaded
                    );
                    visible_upper
                }
            }
        };

        let sqrt_price_start_x64 = state.sqrt_price_x64;
        let sqrt_price_next_x64 = get_sqrt_price_at_tick(tick_next)?;
        let sqrt_price_target_x64 = if zero_for_one {
            sqrt_price_next_x64.max(sqrt_price_limit_x64)
        } else {
            sqrt_price_next_x64.min(sqrt_price_limit_x64)
        };

        let step = compute_swap_step(
            state.sqrt_price_x64,
            sqrt_price_target_x64,
            state.liquidity,
            state.amount_remaining,
            amm_config.trade_fee_rate,
            is_base_input,
            zero_for_one,
        )?;
        state.sqrt_price_x64 = step.sqrt_price_next_x64;

        let amount_in_with_fee = step
            .amount_in
            .checked_add(step.fee_amount)
            .ok_or(AmmError::MathOverflow)?;
        if is_base_input {
            state.amount_remaining = state
                .amount_remaining
                .checked_sub(amount_in_with_fee)
                .ok_or(AmmError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(step.amount_out)
                .ok_or(AmmError::MathOverflow)?;
        } else {
            state.amount_remaining = state
                .amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(AmmError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(amount_in_with_fee)
                .ok_or(AmmError::MathOverflow)?;
        }

        // Protocol share first, then fund share, remainder to in-range LPs
        let split = split_fee(
            step.fee_amount,
            amm_config.protocol_fee_rate,
            amm_config.fund_fee_rate,
        )?;
        state.fee_amount = state
            .fee_amount
            .checked_add(step.fee_amount)
            .ok_or(AmmError::MathOverflow)?;
        state.protocol_fee = state
            .protocol_fee
            .checked_add(split.protocol_fee)
            .ok_or(AmmError::MathOverflow)?;
        state.fund_fee = state
            .fund_fee
            .checked_add(split.fund_fee)
            .ok_or(AmmError::MathOverflow)?;
        if state.liquidity > 0 {
            state.fee_growth_global_x64 = state
                .fee_growth_global_x64
                .wrapping_add(calculate_fee_growth(split.lp_fee, state.liquidity)?);
        }

        if state.sqrt_price_x64 == sqrt_price_next_x64 {
            if let Some((index, offset)) = next {
                let mut tick = arrays[index].ticks[offset];
                let (fee_growth_0, fee_growth_1) = if zero_for_one {
                    (state.fee_growth_global_x64, fee_growth_global_1)
                } else {
                    (fee_growth_global_0, state.fee_growth_global_x64)
                };
                let liquidity_net = tick.cross(fee_growth_0, fee_growth_1);
                let liquidity_delta = if zero_for_one {
                    liquidity_net.checked_neg().ok_or(AmmError::MathOverflow)?
                } else {
                    liquidity_net
                };
                state.liquidity = add_liquidity_delta(state.liquidity, liquidity_delta)?;
                crossings.push(TickCrossing {
                    array: index,
                    offset,
                    tick,
                });
            }
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x64 != sqrt_price_start_x64 {
            state.tick = get_tick_at_sqrt_price(state.sqrt_price_x64)?;
        }
    }

    let amount_settled = params
        .amount
        .checked_sub(state.amount_remaining)
        .ok_or(AmmError::MathOverflow)?;
    let (amount_in, amount_out) = if is_base_input {
        (amount_settled, state.amount_calculated)
    } else {
        (state.amount_calculated, amount_settled)
    };
    require!(
        amount_in > 0 && amount_out > 0,
        AmmError::TooSmallInputOrOutputAmount
    );

    if is_base_input {
        require!(
            amount_out >= params.other_amount_threshold,
            AmmError::SlippageExceeded
        );
    } else {
        require!(
            amount_in <= params.other_amount_threshold,
            AmmError::SlippageExceeded
        );
    }

    // Commit
    let ticks_crossed = crossings.len() as u32;
    for crossing in crossings {
        tick_arrays[crossing.array].ticks[crossing.offset] = crossing.tick;
    }
    pool.sqrt_price_x64 = state.sqrt_price_x64;
    pool.tick_current = state.tick;
    pool.liquidity = state.liquidity;
    if zero_for_one {
        pool.fee_growth_global_0_x64 = state.fee_growth_global_x64;
    } else {
        pool.fee_growth_global_1_x64 = state.fee_growth_global_x64;
    }
    pool.accrue_fees(zero_for_one, state.protocol_fee, state.fund_fee)?;
    pool.record_swap_volume(zero_for_one, amount_in, amount_out)?;

    Ok(SwapResult {
        amount_in,
        amount_out,
        fee_amount: state.fee_amount,
        protocol_fee: state.protocol_fee,
        fund_fee: state.fund_fee,
        ticks_crossed,
    })
}

/// Split remaining accounts into the leading tick arrays of `pool` and the rest
pub fn load_tick_arrays<'c: 'info, 'info>(
    remaining_accounts: &'c [AccountInfo<'info>],
    pool: &Pubkey,
) -> Result<(Vec<AccountLoader<'info, TickArrayState>>, &'c [AccountInfo<'info>])> {
    let mut loaders = Vec::new();
    for account in remaining_accounts {
        let is_tick_array = *account.owner == crate::ID
            && account
                .try_borrow_data()?
                .starts_with(TickArrayState::DISCRIMINATOR);
        if !is_tick_array {
            break;
        }
        let loader = AccountLoader::<TickArrayState>::try_from(account)?;
        require_keys_eq!(
            loader.load()?.pool_pubkey(),
            *pool,
            AmmError::InvalidTickArray
        );
        loaders.push(loader);
    }
    let rest = &remaining_accounts[loaders.len()..];
    Ok((loaders, rest))
}

/// Swap handler
pub fn handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, Swap<'info>>,
    amount: u64,
    other_amount_threshold: u64,
    sqrt_price_limit_x64: u128,
    is_base_input: bool,
) -> Result<()> {
    let block_timestamp = Clock::get()?.unix_timestamp as u64;
    let pool_key = ctx.accounts.pool_state.key();

    let zero_for_one = {
        let pool = ctx.accounts.pool_state.load()?;
        let input_vault = ctx.accounts.input_vault.key();
        let output_vault = ctx.accounts.output_vault.key();
        if input_vault == pool.token_vault_0_pubkey() {
            require_keys_eq!(output_vault, pool.token_vault_1_pubkey(), AmmError::InvalidVault);
            true
        } else {
            require_keys_eq!(input_vault, pool.token_vault_1_pubkey(), AmmError::InvalidVault);
            require_keys_eq!(output_vault, pool.token_vault_0_pubkey(), AmmError::InvalidVault);
            false
        }
    };

    let (tick_array_loaders, hook_accounts) =
        load_tick_arrays(ctx.remaining_accounts, &pool_key)?;

    // Hooks are authorized before anything moves
    let input_hook = authorize_mint(
        &ctx.accounts.hooks,
        &ctx.accounts.input_vault_mint.to_account_info(),
        hook_accounts,
    )?;
    let output_hook = authorize_mint(
        &ctx.accounts.hooks,
        &ctx.accounts.output_vault_mint.to_account_info(),
        hook_accounts,
    )?;

    let params = SwapParams {
        amount,
        other_amount_threshold,
        sqrt_price_limit_x64,
        is_base_input,
        zero_for_one,
    };

    let (result, pool_signer, sqrt_price_x64, liquidity, tick) = {
        let mut guards = tick_array_loaders
            .iter()
            .map(|loader| loader.load_mut())
            .collect::<Result<Vec<RefMut<TickArrayState>>>>()?;
        let mut tick_arrays: Vec<&mut TickArrayState> =
            guards.iter_mut().map(|guard| &mut **guard).collect();
        let extension = match &ctx.accounts.tick_array_bitmap {
            Some(loader) => Some(loader.load()?),
            None => None,
        };

        let mut pool = ctx.accounts.pool_state.load_mut()?;
        let result = swap_internal(
            &ctx.accounts.amm_config,
            &mut pool,
            &mut tick_arrays,
            extension.as_deref(),
            &params,
            block_timestamp,
        )?;
        (
            result,
            pool.signer(),
            pool.sqrt_price_x64,
            pool.liquidity,
            pool.tick_current,
        )
    };

    ctx.accounts
        .observation_state
        .update(block_timestamp as u32, tick);

    let input_token_program = ctx.accounts.input_token_program.to_account_info();
    let output_token_program = ctx.accounts.output_token_program.to_account_info();

    transfer_from_user_to_pool_vault(
        &TokenTransfer {
            token_program: &input_token_program,
            mint: &ctx.accounts.input_vault_mint,
            from: &ctx.accounts.input_token_account,
            to: &ctx.accounts.input_vault,
            hook_program: input_hook,
            hook_accounts,
        },
        ctx.accounts.payer.to_account_info(),
        result.amount_in,
    )?;

    transfer_from_pool_vault_to_user(
        &TokenTransfer {
            token_program: &output_token_program,
            mint: &ctx.accounts.output_vault_mint,
            from: &ctx.accounts.output_vault,
            to: &ctx.accounts.output_token_account,
            hook_program: output_hook,
            hook_accounts,
        },
        ctx.accounts.pool_state.to_account_info(),
        &pool_signer.seeds(),
        result.amount_out,
    )?;

    let (token_account_0, token_account_1, amount_0, amount_1) = if zero_for_one {
        (
            ctx.accounts.input_token_account.key(),
            ctx.accounts.output_token_account.key(),
            result.amount_in,
            result.amount_out,
        )
    } else {
        (
            ctx.accounts.output_token_account.key(),
            ctx.accounts.input_token_account.key(),
            result.amount_out,
            result.amount_in,
        )
    };

    emit!(SwapEvent {
        pool_state: pool_key,
        sender: ctx.accounts.payer.key(),
        token_account_0,
        token_account_1,
        amount_0,
        amount_1,
        fee_amount: result.fee_amount,
        zero_for_one,
        sqrt_price_x64,
        liquidity,
        tick,
    });

    msg!("Swap: {}", if zero_for_one { "0 -> 1" } else { "1 -> 0" });
    msg!(
        "In: {}, Out: {}, Fee: {}, Ticks crossed: {}",
        result.amount_in,
        result.amount_out,
        result.fee_amount,
        result.ticks_crossed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;
    use crate::math::liquidity_math::{get_amount_0_delta, get_amount_1_delta};
    use crate::test_fixtures::*;
    use proptest::prelude::*;

    fn exact_in(amount: u64, threshold: u64, limit: u128, zero_for_one: bool) -> SwapParams {
        SwapParams {
            amount,
            other_amount_threshold: threshold,
            sqrt_price_limit_x64: limit,
            is_base_input: true,
            zero_for_one,
        }
    }

    /// Pool at price 1 with 1e8 liquidity over [-1000, 1000)
    fn seeded_pool() -> (AmmConfig, PoolState, TickArrayState, TickArrayState) {
        let config = config_with(50, 2500, 800, 0);
        let mut pool = pool_at_price(50, Q64);
        let mut lower = tick_array_at(-3000, 50);
        let mut upper = tick_array_at(0, 50);
        seed_position(&mut pool, &mut [&mut lower, &mut upper], -1000, 1000, 100_000_000);
        (config, pool, lower, upper)
    }

    #[test]
    fn test_exact_input_within_range() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut lower],
            None,
            &exact_in(1_000_000, 500_000, 0, true),
            0,
        )
        .unwrap();

        assert_eq!(result.amount_in, 1_000_000);
        assert!((987_000..=988_000).contains(&result.amount_out));
        assert!((2_499..=2_501).contains(&result.fee_amount));
        assert_eq!(result.protocol_fee, 2);
        assert_eq!(result.ticks_crossed, 0);
        assert!(pool.sqrt_price_x64 < Q64);
        assert!(pool.tick_current < 0 && pool.tick_current > -1000);
        assert_eq!(pool.liquidity, 100_000_000);
        assert_eq!(pool.protocol_fees_token_0, 2);
        assert_eq!(
            pool.fee_growth_global_0_x64,
            calculate_fee_growth(result.fee_amount - result.protocol_fee, 100_000_000).unwrap()
        );
        assert_eq!(pool.swap_in_amount_token_0, 1_000_000);
        assert_eq!(pool.swap_out_amount_token_1, result.amount_out as u128);
    }

    #[test]
    fn test_threshold_violation_leaves_pool_untouched() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let before = (pool.sqrt_price_x64, pool.tick_current, pool.fee_growth_global_0_x64);
        let err = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut lower],
            None,
            &exact_in(1_000_000, 999_999, 0, true),
            0,
        )
        .unwrap_err();
        assert_eq!(err, AmmError::SlippageExceeded.into());
        assert_eq!(
            (pool.sqrt_price_x64, pool.tick_current, pool.fee_growth_global_0_x64),
            before
        );
        assert_eq!(pool.swap_in_amount_token_0, 0);
    }

    #[test]
    fn test_exact_output() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let params = SwapParams {
            amount: 100_000,
            other_amount_threshold: u64::MAX,
            sqrt_price_limit_x64: 0,
            is_base_input: false,
            zero_for_one: true,
        };
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut lower],
            None,
            &params,
            0,
        )
        .unwrap();
        assert_eq!(result.amount_out, 100_000);
        assert!(result.amount_in > result.amount_out);

        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let capped = SwapParams {
            other_amount_threshold: 100_000,
            ..params
        };
        assert_eq!(
            swap_internal(&config, &mut pool, &mut [&mut upper, &mut lower], None, &capped, 0)
                .unwrap_err(),
            AmmError::SlippageExceeded.into()
        );
    }

    #[test]
    fn test_crosses_tick_and_stops_at_limit() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let limit = get_sqrt_price_at_tick(-2000).unwrap();
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut lower],
            None,
            &exact_in(1_000_000_000, 0, limit, true),
            0,
        )
        .unwrap();

        assert_eq!(result.ticks_crossed, 1);
        assert!(result.amount_in < 1_000_000_000);
        assert_eq!(pool.sqrt_price_x64, limit);
        assert_eq!(pool.tick_current, -2000);
        assert_eq!(pool.liquidity, 0);

        // Crossing records the fee growth seen below the tick
        let crossed = lower.get_tick(-1000, 50).unwrap();
        assert_eq!(crossed.fee_growth_outside_0_x64, pool.fee_growth_global_0_x64);
    }

    #[test]
    fn test_liquidity_matches_crossed_nets() {
        let config = config_with(50, 2500, 800, 0);
        let mut pool = pool_at_price(50, Q64);
        let mut lower = tick_array_at(-3000, 50);
        let mut upper = tick_array_at(0, 50);
        seed_position(&mut pool, &mut [&mut lower, &mut upper], -1000, 1000, 100_000_000);
        seed_position(&mut pool, &mut [&mut lower, &mut upper], 500, 2000, 200_000_000);

        let limit = get_sqrt_price_at_tick(1500).unwrap();
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut lower],
            None,
            &exact_in(1_000_000_000, 0, limit, false),
            0,
        )
        .unwrap();
        assert_eq!(result.ticks_crossed, 2);
        assert_eq!(pool.tick_current, 1500);
        assert_eq!(pool.liquidity, 200_000_000);

        let net_below: i128 = [&lower, &upper]
            .iter()
            .flat_map(|array| array.ticks.iter())
            .filter(|tick| tick.is_initialized() && tick.tick <= pool.tick_current)
            .map(|tick| tick.liquidity_net)
            .sum();
        assert_eq!(net_below, pool.liquidity as i128);
    }

    #[test]
    fn test_array_sequence_enforced() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let params = exact_in(1_000_000_000, 0, get_sqrt_price_at_tick(-2000).unwrap(), true);

        // The walk starts in the array holding tick 0
        assert_eq!(
            swap_internal(&config, &mut pool, &mut [&mut lower], None, &params, 0).unwrap_err(),
            AmmError::ArrayNotLoaded.into()
        );
        // ...and needs the array below it to cross -1000
        assert_eq!(
            swap_internal(&config, &mut pool, &mut [&mut upper], None, &params, 0).unwrap_err(),
            AmmError::OutOfTickArrays.into()
        );
        assert_eq!(pool.sqrt_price_x64, Q64);
        assert_eq!(pool.liquidity, 100_000_000);
    }

    #[test]
    fn test_arrays_past_the_walk_are_not_inspected() {
        let (config, mut pool, _, mut upper) = seeded_pool();
        let mut stray = tick_array_at(-6000, 50);
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut upper, &mut stray],
            None,
            &exact_in(1_000_000, 0, 0, false),
            0,
        )
        .unwrap();
        assert_eq!(result.ticks_crossed, 0);
        assert!(pool.tick_current > 0 && pool.tick_current < 1000);
    }

    #[test]
    fn test_rejects_bad_requests() {
        let (config, mut pool, mut lower, mut upper) = seeded_pool();
        let mut arrays = [&mut upper, &mut lower];

        assert_eq!(
            swap_internal(&config, &mut pool, &mut arrays, None, &exact_in(0, 0, 0, true), 0)
                .unwrap_err(),
            AmmError::ZeroAmountSpecified.into()
        );
        assert_eq!(
            swap_internal(&config, &mut pool, &mut arrays, None, &exact_in(10, 0, Q64 + 1, true), 0)
                .unwrap_err(),
            AmmError::InvalidPriceLimit.into()
        );
        assert_eq!(
            swap_internal(&config, &mut pool, &mut arrays, None, &exact_in(10, 0, Q64 - 1, false), 0)
                .unwrap_err(),
            AmmError::InvalidPriceLimit.into()
        );

        pool.open_time = 100;
        assert_eq!(
            swap_internal(&config, &mut pool, &mut arrays, None, &exact_in(10, 0, 0, true), 99)
                .unwrap_err(),
            AmmError::PoolNotOpen.into()
        );
    }

    #[test]
    fn test_empty_pool_moves_nothing() {
        let config = config_with(50, 2500, 800, 0);
        let mut pool = pool_at_price(50, Q64);
        assert_eq!(
            swap_internal(&config, &mut pool, &mut [], None, &exact_in(1_000, 0, 0, true), 0)
                .unwrap_err(),
            AmmError::TooSmallInputOrOutputAmount.into()
        );
        assert_eq!(pool.sqrt_price_x64, Q64);
    }

    #[test]
    fn test_walk_past_native_span_needs_extension() {
        let config = config_with(1, 2500, 0, 0);
        let mut pool = pool_at_price(1, Q64);
        let mut array = tick_array_at(0, 1);
        seed_position(&mut pool, &mut [&mut array], 0, 10, 1_000_000_000_000);

        // Spacing 1 keeps only ticks [-30720, 30720) in the pool bitmap
        let limit = get_sqrt_price_at_tick(40_000).unwrap();
        assert_eq!(
            swap_internal(
                &config,
                &mut pool,
                &mut [&mut array],
                None,
                &exact_in(u64::MAX / 2, 0, limit, false),
                0
            )
            .unwrap_err(),
            AmmError::BitmapExtensionNotLoaded.into()
        );

        let extension: TickArrayBitmapExtension = bytemuck::Zeroable::zeroed();
        let result = swap_internal(
            &config,
            &mut pool,
            &mut [&mut array],
            Some(&extension),
            &exact_in(u64::MAX / 2, 0, limit, false),
            0,
        )
        .unwrap();
        assert_eq!(pool.tick_current, 40_000);
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(pool.liquidity, 0);
    }

    /// Overlapping ranges so a walk from tick 0 crosses several initialized ticks
    const LADDER: [(i32, i32, u128); 3] = [
        (-1000, 1000, 100_000_000),
        (-2000, -500, 200_000_000),
        (500, 2500, 300_000_000),
    ];

    /// Most the curve can pay out between two prices, summed per liquidity segment
    fn curve_output_bound(start: u128, end: u128, zero_for_one: bool) -> u64 {
        let (low, high) = if start < end { (start, end) } else { (end, start) };
        let mut bounds = vec![low, high];
        for (lower, upper, _) in LADDER {
            for tick in [lower, upper] {
                let price = get_sqrt_price_at_tick(tick).unwrap();
                if price > low && price < high {
                    bounds.push(price);
                }
            }
        }
        bounds.sort_unstable();

        bounds
            .windows(2)
            .map(|segment| {
                let (a, b) = (segment[0], segment[1]);
                let liquidity: u128 = LADDER
                    .iter()
                    .filter(|(lower, upper, _)| {
                        get_sqrt_price_at_tick(*lower).unwrap() <= a
                            && b <= get_sqrt_price_at_tick(*upper).unwrap()
                    })
                    .map(|(_, _, liquidity)| liquidity)
                    .sum();
                if zero_for_one {
                    get_amount_1_delta(a, b, liquidity, false).unwrap()
                } else {
                    get_amount_0_delta(a, b, liquidity, false).unwrap()
                }
            })
            .sum()
    }

    proptest! {
        #[test]
        fn prop_multi_crossing_output_stays_under_curve(
            amount in 10_000u64..2_000_000_000,
            limit_tick in 1i32..2950,
            zero_for_one in any::<bool>(),
        ) {
            let config = config_with(50, 2500, 800, 0);
            let mut pool = pool_at_price(50, Q64);
            let mut lower = tick_array_at(-3000, 50);
            let mut upper = tick_array_at(0, 50);
            for (tick_lower, tick_upper, liquidity) in LADDER {
                seed_position(
                    &mut pool,
                    &mut [&mut lower, &mut upper],
                    tick_lower,
                    tick_upper,
                    liquidity,
                );
            }

            let start = pool.sqrt_price_x64;
            let limit_tick = if zero_for_one { -limit_tick } else { limit_tick };
            let limit = get_sqrt_price_at_tick(limit_tick).unwrap();
            let params = exact_in(amount, 0, limit, zero_for_one);
            let result = if zero_for_one {
                swap_internal(&config, &mut pool, &mut [&mut upper, &mut lower], None, &params, 0)
            } else {
                swap_internal(&config, &mut pool, &mut [&mut upper], None, &params, 0)
            }
            .unwrap();

            let end = pool.sqrt_price_x64;
            if zero_for_one {
                prop_assert!(limit <= end && end <= start);
            } else {
                prop_assert!(start <= end && end <= limit);
            }
            prop_assert!(result.amount_in <= amount);
            prop_assert!(result.amount_out <= curve_output_bound(start, end, zero_for_one));
        }
    }
}
