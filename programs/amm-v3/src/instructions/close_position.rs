use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    burn, close_account, Burn, CloseAccount, Mint, TokenAccount, TokenInterface,
};

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::state::PersonalPositionState;

/// Close an empty position, burn its NFT and reclaim rent
#[derive(Accounts)]
pub struct ClosePosition<'info> {
    /// Holder of the position NFT, receives the rent
    #[account(mut)]
    pub nft_owner: Signer<'info>,

    #[account(mut, address = personal_position.nft_mint @ AmmError::InvalidPosition)]
    pub position_nft_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = position_nft_mint,
        token::authority = nft_owner,
        constraint = position_nft_account.amount == 1 @ AmmError::NotPositionOwner,
    )]
    pub position_nft_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [seeds::POSITION_SEED, position_nft_mint.key().as_ref()],
        bump = personal_position.bump,
        constraint = personal_position.is_empty() @ AmmError::PositionNotEmpty,
        close = nft_owner
    )]
    pub personal_position: Box<Account<'info, PersonalPositionState>>,

    /// Token program of the position NFT
    pub token_program: Interface<'info, TokenInterface>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Close position handler
pub fn handler(ctx: Context<ClosePosition>) -> Result<()> {
    burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.position_nft_mint.to_account_info(),
                from: ctx.accounts.position_nft_account.to_account_info(),
                authority: ctx.accounts.nft_owner.to_account_info(),
            },
        ),
        1,
    )?;

    close_account(CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        CloseAccount {
            account: ctx.accounts.position_nft_account.to_account_info(),
            destination: ctx.accounts.nft_owner.to_account_info(),
            authority: ctx.accounts.nft_owner.to_account_info(),
        },
    ))?;

    msg!("Position closed: {}", ctx.accounts.position_nft_mint.key());

    Ok(())
}
