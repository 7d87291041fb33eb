use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::events::CollectProtocolFeeEvent;
use crate::hooks::{authorize_mint, transfer_from_pool_vault_to_user, TokenTransfer};
use crate::state::{AmmConfig, HooksAccount, PoolState};

/// Withdraw accrued protocol or fund fees from a pool
///
/// The signer must be the config owner (protocol fees) or the fund owner
/// (fund fees). Remaining accounts: extra accounts of any transfer hook on
/// either mint.
#[derive(Accounts)]
pub struct CollectProtocolFee<'info> {
    pub owner: Signer<'info>,

    /// The pool to collect fees from (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    #[account(address = pool_state.load()?.amm_config_pubkey())]
    pub amm_config: Box<Account<'info, AmmConfig>>,

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

    #[account(address = pool_state.load()?.token_mint_0_pubkey() @ AmmError::InvalidTokenMint)]
    pub vault_0_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = pool_state.load()?.token_mint_1_pubkey() @ AmmError::InvalidTokenMint)]
    pub vault_1_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = token_vault_0.mint)]
    pub recipient_token_account_0: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, token::mint = token_vault_1.mint)]
    pub recipient_token_account_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Hook program registry
    #[account(seeds = [seeds::HOOKS_SEED], bump = hooks.bump)]
    pub hooks: Box<Account<'info, HooksAccount>>,

    pub token_program_0: Interface<'info, TokenInterface>,

    pub token_program_1: Interface<'info, TokenInterface>,
}

/// Which accrued share is being withdrawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeRecipient {
    Protocol,
    Fund,
}

/// Collect protocol fee handler
pub fn protocol_fee_handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, CollectProtocolFee<'info>>,
    amount_0_requested: u64,
    amount_1_requested: u64,
) -> Result<()> {
    handler(
        ctx,
        FeeRecipient::Protocol,
        amount_0_requested,
        amount_1_requested,
    )
}

/// Collect fund fee handler
pub fn fund_fee_handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, CollectProtocolFee<'info>>,
    amount_0_requested: u64,
    amount_1_requested: u64,
) -> Result<()> {
    handler(
        ctx,
        FeeRecipient::Fund,
        amount_0_requested,
        amount_1_requested,
    )
}

fn handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, CollectProtocolFee<'info>>,
    recipient: FeeRecipient,
    amount_0_requested: u64,
    amount_1_requested: u64,
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let authorized = match recipient {
        FeeRecipient::Protocol => ctx.accounts.amm_config.is_owner(&owner),
        FeeRecipient::Fund => ctx.accounts.amm_config.is_fund_owner(&owner),
    };
    require!(authorized, AmmError::Unauthorized);

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

    let requested = (amount_0_requested, amount_1_requested);
    let vault_balances = (
        ctx.accounts.token_vault_0.amount,
        ctx.accounts.token_vault_1.amount,
    );
    let ((amount_0, amount_1), pool_signer) = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        let amounts = match recipient {
            FeeRecipient::Protocol => pool.take_protocol_fees(requested, vault_balances),
            FeeRecipient::Fund => pool.take_fund_fees(requested, vault_balances),
        };
        (amounts, pool.signer())
    };

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

    emit!(CollectProtocolFeeEvent {
        pool_state: ctx.accounts.pool_state.key(),
        recipient_token_account_0: ctx.accounts.recipient_token_account_0.key(),
        recipient_token_account_1: ctx.accounts.recipient_token_account_1.key(),
        amount_0,
        amount_1,
    });

    msg!("{:?} fees collected: {} / {}", recipient, amount_0, amount_1);

    Ok(())
}
