use anchor_lang::prelude::*;

use crate::constants::seeds;
use crate::events::HookProgramRegisteredEvent;
use crate::state::HooksAccount;

/// Propose a transfer-hook program for approval
/// Anyone can register; the program stays pending until the authority approves it
#[derive(Accounts)]
pub struct RegisterHookProgram<'info> {
    #[account(
        mut,
        seeds = [seeds::HOOKS_SEED],
        bump = hooks.bump
    )]
    pub hooks: Account<'info, HooksAccount>,
}

/// Register hook program handler
pub fn handler(ctx: Context<RegisterHookProgram>, program_id: Pubkey) -> Result<()> {
    ctx.accounts.hooks.register(program_id)?;

    emit!(HookProgramRegisteredEvent { program_id });
    msg!("Hook program {} registered, pending approval", program_id);

    Ok(())
}
