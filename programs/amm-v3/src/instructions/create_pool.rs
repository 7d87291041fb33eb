use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::events::PoolCreatedEvent;
use crate::state::{
    AmmConfig, ObservationState, PoolBinding, PoolState, TickArrayBitmapExtension,
};

/// Create a pool for a mint pair under a fee config
#[derive(Accounts)]
pub struct CreatePool<'info> {
    /// Pays for every account created here
    #[account(mut)]
    pub pool_creator: Signer<'info>,

    /// The fee config for this pool
    pub amm_config: Box<Account<'info, AmmConfig>>,

    /// The pool account to initialize (zero-copy)
    #[account(
        init,
        payer = pool_creator,
        space = PoolState::LEN,
        seeds = [
            seeds::POOL_SEED,
            amm_config.key().as_ref(),
            token_mint_0.key().as_ref(),
            token_mint_1.key().as_ref(),
        ],
        bump
    )]
    pub pool_state: AccountLoader<'info, PoolState>,

    /// Token 0 mint (must be < token 1 mint)
    #[account(
        constraint = token_mint_0.key() < token_mint_1.key() @ AmmError::InvalidTokenOrder,
        mint::token_program = token_program_0,
    )]
    pub token_mint_0: Box<InterfaceAccount<'info, Mint>>,

    /// Token 1 mint
    #[account(mint::token_program = token_program_1)]
    pub token_mint_1: Box<InterfaceAccount<'info, Mint>>,

    /// Token 0 vault, owned by the pool
    #[account(
        init,
        payer = pool_creator,
        seeds = [seeds::POOL_VAULT_SEED, pool_state.key().as_ref(), token_mint_0.key().as_ref()],
        bump,
        token::mint = token_mint_0,
        token::authority = pool_state,
        token::token_program = token_program_0,
    )]
    pub token_vault_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token 1 vault, owned by the pool
    #[account(
        init,
        payer = pool_creator,
        seeds = [seeds::POOL_VAULT_SEED, pool_state.key().as_ref(), token_mint_1.key().as_ref()],
        bump,
        token::mint = token_mint_1,
        token::authority = pool_state,
        token::token_program = token_program_1,
    )]
    pub token_vault_1: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = pool_creator,
        space = ObservationState::LEN,
        seeds = [seeds::OBSERVATION_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub observation_state: Box<Account<'info, ObservationState>>,

    #[account(
        init,
        payer = pool_creator,
        space = TickArrayBitmapExtension::LEN,
        seeds = [seeds::TICK_ARRAY_BITMAP_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub tick_array_bitmap: AccountLoader<'info, TickArrayBitmapExtension>,

    pub token_program_0: Interface<'info, TokenInterface>,

    pub token_program_1: Interface<'info, TokenInterface>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Create pool handler
pub fn handler(ctx: Context<CreatePool>, sqrt_price_x64: u128, open_time: u64) -> Result<()> {
    let pool_id = ctx.accounts.pool_state.key();

    let binding = PoolBinding {
        amm_config: ctx.accounts.amm_config.key(),
        owner: ctx.accounts.pool_creator.key(),
        token_mint_0: ctx.accounts.token_mint_0.key(),
        token_mint_1: ctx.accounts.token_mint_1.key(),
        token_vault_0: ctx.accounts.token_vault_0.key(),
        token_vault_1: ctx.accounts.token_vault_1.key(),
        observation_key: ctx.accounts.observation_state.key(),
        mint_decimals_0: ctx.accounts.token_mint_0.decimals,
        mint_decimals_1: ctx.accounts.token_mint_1.decimals,
    };

    let tick = {
        let mut pool = ctx.accounts.pool_state.load_init()?;
        pool.initialize(
            ctx.bumps.pool_state,
            &binding,
            &ctx.accounts.amm_config,
            sqrt_price_x64,
            open_time,
        )?;
        pool.tick_current
    };

    ctx.accounts.observation_state.initialize(pool_id);
    ctx.accounts
        .tick_array_bitmap
        .load_init()?
        .initialize(pool_id);

    emit!(PoolCreatedEvent {
        pool_state: pool_id,
        token_mint_0: binding.token_mint_0,
        token_mint_1: binding.token_mint_1,
        tick_spacing: ctx.accounts.amm_config.tick_spacing,
        sqrt_price_x64,
        tick,
        token_vault_0: binding.token_vault_0,
        token_vault_1: binding.token_vault_1,
    });

    msg!("Pool created: {}", pool_id);
    msg!("Token 0: {}", binding.token_mint_0);
    msg!("Token 1: {}", binding.token_mint_1);
    msg!("Initial sqrt price: {}", sqrt_price_x64);
    msg!("Initial tick: {}", tick);

    Ok(())
}
