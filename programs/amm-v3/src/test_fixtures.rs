//! Shared builders for unit tests

use anchor_lang::prelude::*;

use crate::instructions::increase_liquidity_core;
use crate::state::{AmmConfig, PersonalPositionState, PoolBinding, PoolState, TickArrayState};
use crate::utils::sort_mints;

pub fn config_with(
    tick_spacing: u16,
    trade_fee_rate: u32,
    protocol_fee_rate: u32,
    fund_fee_rate: u32,
) -> AmmConfig {
    let admin = Pubkey::new_unique();
    let mut config = AmmConfig::default();
    config
        .initialize(
            &admin,
            &admin,
            255,
            0,
            tick_spacing,
            trade_fee_rate,
            protocol_fee_rate,
            fund_fee_rate,
        )
        .unwrap();
    config
}

pub fn binding_for(amm_config: Pubkey) -> PoolBinding {
    let (token_mint_0, token_mint_1) = sort_mints(Pubkey::new_unique(), Pubkey::new_unique());
    PoolBinding {
        amm_config,
        owner: Pubkey::new_unique(),
        token_mint_0,
        token_mint_1,
        token_vault_0: Pubkey::new_unique(),
        token_vault_1: Pubkey::new_unique(),
        observation_key: Pubkey::new_unique(),
        mint_decimals_0: 6,
        mint_decimals_1: 9,
    }
}

/// Open pool with a 0.25% trade fee and an 8% protocol share
pub fn pool_at_price(tick_spacing: u16, sqrt_price_x64: u128) -> PoolState {
    let config = config_with(tick_spacing, 2500, 800, 0);
    let mut pool: PoolState = bytemuck::Zeroable::zeroed();
    pool.initialize(
        254,
        &binding_for(Pubkey::new_unique()),
        &config,
        sqrt_price_x64,
        0,
    )
    .unwrap();
    pool
}

pub fn tick_array_at(start_tick_index: i32, tick_spacing: u16) -> TickArrayState {
    let mut array: TickArrayState = bytemuck::Zeroable::zeroed();
    array
        .initialize(Pubkey::new_unique(), start_tick_index, tick_spacing, 253)
        .unwrap();
    array
}

pub fn position_in(tick_lower_index: i32, tick_upper_index: i32) -> PersonalPositionState {
    let mut position = PersonalPositionState::default();
    position.initialize(
        252,
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        tick_lower_index,
        tick_upper_index,
    );
    position
}

/// Deposit `liquidity` over [lower, upper) without slippage limits
pub fn seed_position(
    pool: &mut PoolState,
    tick_arrays: &mut [&mut TickArrayState],
    tick_lower_index: i32,
    tick_upper_index: i32,
    liquidity: u128,
) -> PersonalPositionState {
    let mut position = position_in(tick_lower_index, tick_upper_index);
    increase_liquidity_core(
        pool,
        &mut position,
        tick_arrays,
        None,
        liquidity,
        u64::MAX,
        u64::MAX,
    )
    .unwrap();
    position
}
