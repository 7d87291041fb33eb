//! AMM V3 - Concentrated Liquidity AMM with governed transfer hooks on Solana
//!
//! Liquidity providers deposit into bounded tick ranges; swaps walk the
//! initialized ticks of the active range, charging a trade fee split between
//! the protocol, a fund and the LPs.
//!
//! ## Architecture
//!
//! - **Core CLMM**: Q64.64 sqrt prices, 60-tick arrays, bitmap-indexed array search
//! - **Positions**: NFT-owned `PersonalPositionState` accounts with per-range fee accounting
//! - **Hook Governance**: Token-2022 transfer-hook programs must be registered and approved
//!   before any pool moves a hooked token
//! - **Configs**: Fee tiers and tick spacing live in `AmmConfig` accounts shared by pools
//!
//! ## Security
//!
//! - All arithmetic uses checked operations
//! - Core state transitions compute on copies and commit last
//! - Account relationships validated by Anchor constraints

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod hooks;
pub mod instructions;
pub mod math;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_fixtures;

use instructions::*;

declare_id!("HRirSzCVC8k1ktbCB4bkP2KVxq1iMMmyZGQ7jWmrTyYH");

/// Protocol admin allowed to create configs and the hook registry
pub mod admin {
    use super::*;
    declare_id!("2X5y4TtnS89QDog1KhvyBxsVL1aqu3cG29NQ1cpfjsFS");
}

#[program]
pub mod amm_v3 {
    use super::*;

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMIN INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a fee/tick-spacing configuration
    /// Only the protocol admin can call this
    ///
    /// # Arguments
    /// * `index` - Config index, part of the config address
    /// * `tick_spacing` - Tick spacing of pools under this config
    /// * `trade_fee_rate` - Trade fee in millionths of the input amount
    /// * `protocol_fee_rate` - Protocol share of the trade fee, in millionths
    /// * `fund_fee_rate` - Fund share of the trade fee, in millionths
    pub fn create_amm_config(
        ctx: Context<CreateAmmConfig>,
        index: u16,
        tick_spacing: u16,
        trade_fee_rate: u32,
        protocol_fee_rate: u32,
        fund_fee_rate: u32,
    ) -> Result<()> {
        instructions::create_amm_config::handler(
            ctx,
            index,
            tick_spacing,
            trade_fee_rate,
            protocol_fee_rate,
            fund_fee_rate,
        )
    }

    /// Create the transfer-hook program registry
    /// Only the protocol admin can call this
    pub fn initialize_hook_programs(ctx: Context<InitializeHookPrograms>) -> Result<()> {
        instructions::initialize_hook_programs::handler(ctx)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HOOK GOVERNANCE INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Propose a transfer-hook program, pending approval
    ///
    /// # Arguments
    /// * `program_id` - Hook program to register
    pub fn register_hook_program(
        ctx: Context<RegisterHookProgram>,
        program_id: Pubkey,
    ) -> Result<()> {
        instructions::register_hook_program::handler(ctx, program_id)
    }

    /// Approve a pending transfer-hook program
    /// Only the registry authority can call this
    ///
    /// # Arguments
    /// * `program_id` - Pending hook program to approve
    pub fn approve_hook_program(ctx: Context<ApproveHookProgram>, program_id: Pubkey) -> Result<()> {
        instructions::approve_hook_program::handler(ctx, program_id)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a pool for a mint pair under a config
    ///
    /// # Arguments
    /// * `sqrt_price_x64` - Initial sqrt(price) in Q64.64 format
    /// * `open_time` - Unix timestamp before which swaps are rejected
    pub fn create_pool(ctx: Context<CreatePool>, sqrt_price_x64: u128, open_time: u64) -> Result<()> {
        instructions::create_pool::handler(ctx, sqrt_price_x64, open_time)
    }

    /// Initialize a tick array for a pool
    ///
    /// # Arguments
    /// * `start_tick_index` - Starting tick index (multiple of 60 * tick spacing)
    pub fn initialize_tick_array(
        ctx: Context<InitializeTickArray>,
        start_tick_index: i32,
    ) -> Result<()> {
        instructions::initialize_tick_array::handler(ctx, start_tick_index)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSITION INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a position NFT over a tick range and deposit liquidity
    ///
    /// # Arguments
    /// * `tick_lower_index` - Lower tick bound of position
    /// * `tick_upper_index` - Upper tick bound of position
    /// * `tick_array_lower_start_index` - Start of the array holding the lower tick
    /// * `tick_array_upper_start_index` - Start of the array holding the upper tick
    /// * `liquidity` - Liquidity to deposit, 0 to derive it from the maxima
    /// * `amount_0_max` - Maximum amount of token 0 to deposit
    /// * `amount_1_max` - Maximum amount of token 1 to deposit
    /// * `base_flag` - With zero liquidity: fund from token 0 only (`Some(true)`),
    ///   token 1 only (`Some(false)`) or both (`None`)
    #[allow(clippy::too_many_arguments)]
    pub fn open_position<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, OpenPosition<'info>>,
        tick_lower_index: i32,
        tick_upper_index: i32,
        tick_array_lower_start_index: i32,
        tick_array_upper_start_index: i32,
        liquidity: u128,
        amount_0_max: u64,
        amount_1_max: u64,
        base_flag: Option<bool>,
    ) -> Result<()> {
        instructions::open_position::handler(
            ctx,
            tick_lower_index,
            tick_upper_index,
            tick_array_lower_start_index,
            tick_array_upper_start_index,
            liquidity,
            amount_0_max,
            amount_1_max,
            base_flag,
        )
    }

    /// Close an empty position and reclaim rent
    pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
        instructions::close_position::handler(ctx)
    }

    /// Add liquidity to an existing position
    ///
    /// # Arguments
    /// * `liquidity` - Amount of liquidity to add, 0 to derive it from the maxima
    /// * `amount_0_max` - Maximum amount of token 0 to deposit
    /// * `amount_1_max` - Maximum amount of token 1 to deposit
    /// * `base_flag` - With zero liquidity: fund from token 0 only (`Some(true)`),
    ///   token 1 only (`Some(false)`) or both (`None`)
    pub fn increase_liquidity<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, IncreaseLiquidity<'info>>,
        liquidity: u128,
        amount_0_max: u64,
        amount_1_max: u64,
        base_flag: Option<bool>,
    ) -> Result<()> {
        instructions::increase_liquidity::handler(
            ctx,
            liquidity,
            amount_0_max,
            amount_1_max,
            base_flag,
        )
    }

    /// Remove liquidity from a position and collect its owed fees
    /// Zero liquidity collects fees only
    ///
    /// # Arguments
    /// * `liquidity` - Amount of liquidity to remove
    /// * `amount_0_min` - Minimum amount of token 0 to receive
    /// * `amount_1_min` - Minimum amount of token 1 to receive
    pub fn decrease_liquidity<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, DecreaseLiquidity<'info>>,
        liquidity: u128,
        amount_0_min: u64,
        amount_1_min: u64,
    ) -> Result<()> {
        instructions::decrease_liquidity::handler(ctx, liquidity, amount_0_min, amount_1_min)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute a swap on a pool
    /// Remaining accounts: tick arrays in traversal order, then hook accounts
    ///
    /// # Arguments
    /// * `amount` - Exact input (base input) or exact output amount
    /// * `other_amount_threshold` - Minimum output or maximum input
    /// * `sqrt_price_limit_x64` - Price the swap may not cross, 0 for none
    /// * `is_base_input` - Whether `amount` is the input side
    pub fn swap<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, Swap<'info>>,
        amount: u64,
        other_amount_threshold: u64,
        sqrt_price_limit_x64: u128,
        is_base_input: bool,
    ) -> Result<()> {
        instructions::swap::handler(
            ctx,
            amount,
            other_amount_threshold,
            sqrt_price_limit_x64,
            is_base_input,
        )
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FEE COLLECTION INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Collect accumulated protocol fees from a pool
    /// Only callable by the config owner
    ///
    /// # Arguments
    /// * `amount_0_requested` - Maximum amount of token 0 to collect
    /// * `amount_1_requested` - Maximum amount of token 1 to collect
    pub fn collect_protocol_fee<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, CollectProtocolFee<'info>>,
        amount_0_requested: u64,
        amount_1_requested: u64,
    ) -> Result<()> {
        instructions::collect_protocol_fee::protocol_fee_handler(
            ctx,
            amount_0_requested,
            amount_1_requested,
        )
    }

    /// Collect accumulated fund fees from a pool
    /// Only callable by the config fund owner
    ///
    /// # Arguments
    /// * `amount_0_requested` - Maximum amount of token 0 to collect
    /// * `amount_1_requested` - Maximum amount of token 1 to collect
    pub fn collect_fund_fee<'a, 'b, 'c: 'info, 'info>(
        ctx: Context<'a, 'b, 'c, 'info, CollectProtocolFee<'info>>,
        amount_0_requested: u64,
        amount_1_requested: u64,
    ) -> Result<()> {
        instructions::collect_protocol_fee::fund_fee_handler(
            ctx,
            amount_0_requested,
            amount_1_requested,
        )
    }
}
