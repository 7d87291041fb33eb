use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::events::DecreaseLiquidityEvent;
use crate::hooks::{authorize_mint, transfer_from_pool_vault_to_user, TokenTransfer};
use crate::instructions::modify_position::{decrease_liquidity_core, with_boundary_arrays};
use crate::state::{
    HooksAccount, PersonalPositionState, PoolState, TickArrayBitmapExtension, TickArrayState,
};

/// Remove liquidity from a position and collect its fees
///
/// Remaining accounts: extra accounts of any transfer hook on either mint.
#[derive(Accounts)]
pub struct DecreaseLiquidity<'info> {
    /// Holder of the position NFT
    pub nft_owner: Signer<'info>,

    /// Proves ownership of the position
    #[account(
        constraint = nft_account.mint == personal_position.nft_mint @ AmmError::NotPositionOwner,
        constraint = nft_account.amount == 1 @ AmmError::NotPositionOwner,
        token::authority = nft_owner,
    )]
    pub nft_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// The pool of the position (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    #[account(
        mut,
        constraint = personal_position.pool_id == pool_state.key() @ AmmError::InvalidPosition
    )]
    pub personal_position: Box<Account<'info, PersonalPositionState>>,

    #[account(
        mut,
        constraint = tick_array_lower.load()?.pool_pubkey() == pool_state.key() @ AmmError::InvalidTickArray
    )]
    pub tick_array_lower: AccountLoader<'info, TickArrayState>,

    #[account(
        mut,
        constraint = tick_array_upper.load()?.pool_pubkey() == pool_state.key() @ AmmError::InvalidTickArray
    )]
    pub tick_array_upper: AccountLoader<'info, TickArrayState>,

    #[account(
        mut,
        constraint = token_vault_0.key() == pool_state.load()?.token_vault_0_pubkey() @ AmmError::InvalidVault
    )]
    pub token_vault_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = token_vault_1.key() == pool_state.load()?.token_vault_1_pubkey() @ AmmError::InvalidVault
    )]
    pub token_vault_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Receives token 0
    #[account(mut, token::mint = token_vault_0.mint)]
    pub recipient_token_account_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Receives token 1
    #[account(mut, token::mint = token_vault_1.mint)]
    pub recipient_token_account_1: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = pool_state.load()?.token_mint_0_pubkey() @ AmmError::InvalidTokenMint)]
    pub vault_0_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = pool_state.load()?.token_mint_1_pubkey() @ AmmError::InvalidTokenMint)]
    pub vault_1_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [seeds::TICK_ARRAY_BITMAP_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub tick_array_bitmap: Option<AccountLoader<'info, TickArrayBitmapExtension>>,

    /// Hook program registry
    #[account(seeds = [seeds::HOOKS_SEED], bump = hooks.bump)]
    pub hooks: Box<Account<'info, HooksAccount>>,

    pub token_program_0: Interface<'info, TokenInterface>,

    pub token_program_1: Interface<'info, TokenInterface>,
}

/// Decrease liquidity handler
///
/// `liquidity == 0` only collects the owed fees.
pub fn handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, DecreaseLiquidity<'info>>,
    liquidity: u128,
    amount_0_min: u64,
    amount_1_min: u64,
) -> Result<()> {
    let hook_accounts = ctx.remaining_accounts;
    let hook_0 = authorize_mint(
        &ctx.accounts.hooks,
        &ctx.accounts.vault_0_mint.to_account_info(),
        hook_accounts,
    )?;
    let hook_1 = authorize_mint(
        &ctx.accounts.hooks,
        &ctx.accounts.vault_1_mint.to_account_info(),
        hook_accounts,
    )?;

    let personal_position = &mut ctx.accounts.personal_position;
    let (change, pool_signer) = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        let mut extension = match &ctx.accounts.tick_array_bitmap {
            Some(loader) => Some(loader.load_mut()?),
            None => None,
        };
        let change = with_boundary_arrays(
            &ctx.accounts.tick_array_lower,
            &ctx.accounts.tick_array_upper,
            |tick_arrays| {
                decrease_liquidity_core(
                    &mut pool,
                    personal_position,
                    tick_arrays,
                    extension.as_deref_mut(),
                    liquidity,
                    amount_0_min,
                    amount_1_min,
                )
            },
        )?;
        (change, pool.signer())
    };

    let amount_0 = change
        .amount_0
        .checked_add(change.fee_amount_0)
        .ok_or(AmmError::MathOverflow)?;
    let amount_1 = change
        .amount_1
        .checked_add(change.fee_amount_1)
        .ok_or(AmmError::MathOverflow)?;

    let token_program_0 = ctx.accounts.token_program_0.to_account_info();
    let token_program_1 = ctx.accounts.token_program_1.to_account_info();
    let pool_info = ctx.accounts.pool_state.to_account_info();
    transfer_from_pool_vault_to_user(
        &TokenTransfer {
            token_program: &token_program_0,
            mint: &ctx.accounts.vault_0_mint,
            from: &ctx.accounts.token_vault_0,
            to: &ctx.accounts.recipient_token_account_0,
            hook_program: hook_0,
            hook_accounts,
        },
        pool_info.clone(),
        &pool_signer.seeds(),
        amount_0,
    )?;
    transfer_from_pool_vault_to_user(
        &TokenTransfer {
            token_program: &token_program_1,
            mint: &ctx.accounts.vault_1_mint,
            from: &ctx.accounts.token_vault_1,
            to: &ctx.accounts.recipient_token_account_1,
            hook_program: hook_1,
            hook_accounts,
        },
        pool_info,
        &pool_signer.seeds(),
        amount_1,
    )?;

    emit!(DecreaseLiquidityEvent {
        position_nft_mint: ctx.accounts.personal_position.nft_mint,
        liquidity,
        decrease_amount_0: change.amount_0,
        decrease_amount_1: change.amount_1,
        fee_amount_0: change.fee_amount_0,
        fee_amount_1: change.fee_amount_1,
    });

    msg!("Liquidity decreased by {}", liquidity);
    msg!(
        "Withdrawn: {} / {}, fees: {} / {}",
        change.amount_0,
        change.amount_1,
        change.fee_amount_0,
        change.fee_amount_1
    );

    Ok(())
}
