use anchor_lang::prelude::*;

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::state::HooksAccount;

/// Create the hook program registry
/// Only the protocol admin can call this; the admin becomes its authority
#[derive(Accounts)]
pub struct InitializeHookPrograms<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = HooksAccount::LEN,
        seeds = [seeds::HOOKS_SEED],
        bump
    )]
    pub hooks: Account<'info, HooksAccount>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Initialize hook programs handler
pub fn handler(ctx: Context<InitializeHookPrograms>) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    require_keys_eq!(admin, crate::admin::ID, AmmError::Unauthorized);

    ctx.accounts.hooks.initialize(admin, ctx.bumps.hooks);

    msg!("Hook registry initialized, authority {}", admin);

    Ok(())
}
