//! Events
//!
//! Emitted for indexers; every state-changing instruction emits one.

use anchor_lang::prelude::*;

/// Emitted when a fee config is created
#[event]
pub struct ConfigCreatedEvent {
    pub amm_config: Pubkey,
    pub index: u16,
    pub tick_spacing: u16,
    pub trade_fee_rate: u32,
    pub protocol_fee_rate: u32,
    pub fund_fee_rate: u32,
}

/// Emitted when a pool is created
#[event]
pub struct PoolCreatedEvent {
    /// The address of the newly created pool
    pub pool_state: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub tick_spacing: u16,
    /// Initial sqrt price, Q64.64
    pub sqrt_price_x64: u128,
    /// Tick derived from the initial price
    pub tick: i32,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
}

/// Emitted when a position NFT is minted
#[event]
pub struct CreatePersonalPositionEvent {
    pub pool_state: Pubkey,
    pub minter: Pubkey,
    pub nft_owner: Pubkey,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub liquidity: u128,
    pub deposit_amount_0: u64,
    pub deposit_amount_1: u64,
}

/// Emitted when liquidity is added to an existing position
#[event]
pub struct IncreaseLiquidityEvent {
    pub position_nft_mint: Pubkey,
    pub liquidity: u128,
    pub amount_0: u64,
    pub amount_1: u64,
}

/// Emitted when liquidity is removed or fees are collected
#[event]
pub struct DecreaseLiquidityEvent {
    pub position_nft_mint: Pubkey,
    pub liquidity: u128,
    /// Principal returned, excluding fees
    pub decrease_amount_0: u64,
    pub decrease_amount_1: u64,
    pub fee_amount_0: u64,
    pub fee_amount_1: u64,
}

/// Emitted after every swap
#[event]
pub struct SwapEvent {
    pub pool_state: Pubkey,
    pub sender: Pubkey,
    pub token_account_0: Pubkey,
    pub token_account_1: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
    /// Trade fee charged on the input token
    pub fee_amount: u64,
    /// true if token 0 was the input
    pub zero_for_one: bool,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    pub tick: i32,
}

/// Emitted when protocol or fund fees leave a pool
#[event]
pub struct CollectProtocolFeeEvent {
    pub pool_state: Pubkey,
    pub recipient_token_account_0: Pubkey,
    pub recipient_token_account_1: Pubkey,
    pub amount_0: u64,
    pub amount_1: u64,
}

#[event]
pub struct HookProgramRegisteredEvent {
    pub program_id: Pubkey,
}

#[event]
pub struct HookProgramApprovedEvent {
    pub program_id: Pubkey,
    pub authority: Pubkey,
}
