use anchor_lang::prelude::*;

use crate::constants::seeds;
use crate::state::{PoolState, TickArrayState};

/// Initialize a tick array for a pool
/// Positions and swaps can only touch ticks whose array exists
#[derive(Accounts)]
#[instruction(start_tick_index: i32)]
pub struct InitializeTickArray<'info> {
    /// The pool this tick array belongs to (zero-copy)
    pub pool_state: AccountLoader<'info, PoolState>,

    /// The tick array to initialize (zero-copy)
    #[account(
        init,
        payer = payer,
        space = TickArrayState::LEN,
        seeds = [
            seeds::TICK_ARRAY_SEED,
            pool_state.key().as_ref(),
            &start_tick_index.to_be_bytes()
        ],
        bump
    )]
    pub tick_array: AccountLoader<'info, TickArrayState>,

    /// The payer for account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Initialize tick array handler
pub fn handler(ctx: Context<InitializeTickArray>, start_tick_index: i32) -> Result<()> {
    let pool_key = ctx.accounts.pool_state.key();
    let tick_spacing = ctx.accounts.pool_state.load()?.tick_spacing;

    ctx.accounts.tick_array.load_init()?.initialize(
        pool_key,
        start_tick_index,
        tick_spacing,
        ctx.bumps.tick_array,
    )?;

    msg!("Tick array initialized");
    msg!("Pool: {}", pool_key);
    msg!("Start tick index: {}", start_tick_index);

    Ok(())
}
