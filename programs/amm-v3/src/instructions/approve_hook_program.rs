use anchor_lang::prelude::*;

use crate::constants::seeds;
use crate::events::HookProgramApprovedEvent;
use crate::state::HooksAccount;

/// Approve a pending transfer-hook program
#[derive(Accounts)]
pub struct ApproveHookProgram<'info> {
    #[account(
        mut,
        seeds = [seeds::HOOKS_SEED],
        bump = hooks.bump
    )]
    pub hooks: Account<'info, HooksAccount>,

    /// Must be the registry authority
    pub authority: Signer<'info>,
}

/// Approve hook program handler
pub fn handler(ctx: Context<ApproveHookProgram>, program_id: Pubkey) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    ctx.accounts.hooks.approve(&authority, &program_id)?;

    emit!(HookProgramApprovedEvent {
        program_id,
        authority,
    });
    msg!("Hook program {} approved", program_id);

    Ok(())
}
