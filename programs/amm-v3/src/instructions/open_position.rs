use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{mint_to, Mint, MintTo, TokenAccount, TokenInterface};

use crate::constants::seeds;
use crate::errors::AmmError;
use crate::events::CreatePersonalPositionEvent;
use crate::hooks::{authorize_mint, transfer_from_user_to_pool_vault, TokenTransfer};
use crate::instructions::modify_position::{
    increase_liquidity_core, liquidity_for_deposit, with_boundary_arrays,
};
use crate::state::{
    HooksAccount, PersonalPositionState, PoolState, TickArrayBitmapExtension, TickArrayState,
};

/// Open a position and mint its NFT
///
/// Remaining accounts: extra accounts of any transfer hook on either mint.
#[derive(Accounts)]
#[instruction(
    tick_lower_index: i32,
    tick_upper_index: i32,
    tick_array_lower_start_index: i32,
    tick_array_upper_start_index: i32
)]
pub struct OpenPosition<'info> {
    /// Pays for the new accounts and the deposit
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: receives the position NFT
    pub position_nft_owner: UncheckedAccount<'info>,

    /// One-supply mint representing the position
    #[account(
        init,
        payer = payer,
        mint::decimals = 0,
        mint::authority = pool_state,
        mint::token_program = token_program,
    )]
    pub position_nft_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = payer,
        associated_token::mint = position_nft_mint,
        associated_token::authority = position_nft_owner,
        associated_token::token_program = token_program,
    )]
    pub position_nft_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// The pool to open a position in (zero-copy)
    #[account(mut)]
    pub pool_state: AccountLoader<'info, PoolState>,

    #[account(
        init,
        payer = payer,
        space = PersonalPositionState::LEN,
        seeds = [seeds::POSITION_SEED, position_nft_mint.key().as_ref()],
        bump
    )]
    pub personal_position: Box<Account<'info, PersonalPositionState>>,

    #[account(
        mut,
        seeds = [
            seeds::TICK_ARRAY_SEED,
            pool_state.key().as_ref(),
            &tick_array_lower_start_index.to_be_bytes()
        ],
        bump
    )]
    pub tick_array_lower: AccountLoader<'info, TickArrayState>,

    #[account(
        mut,
        seeds = [
            seeds::TICK_ARRAY_SEED,
            pool_state.key().as_ref(),
            &tick_array_upper_start_index.to_be_bytes()
        ],
        bump
    )]
    pub tick_array_upper: AccountLoader<'info, TickArrayState>,

    /// Payer's token 0 account
    #[account(mut, token::mint = token_vault_0.mint)]
    pub token_account_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Payer's token 1 account
    #[account(mut, token::mint = token_vault_1.mint)]
    pub token_account_1: Box<InterfaceAccount<'info, TokenAccount>>,

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

    /// Required when a boundary array lies outside the pool's own bitmap span
    #[account(
        mut,
        seeds = [seeds::TICK_ARRAY_BITMAP_SEED, pool_state.key().as_ref()],
        bump
    )]
    pub tick_array_bitmap: Option<AccountLoader<'info, TickArrayBitmapExtension>>,

    /// Hook program registry
    #[account(seeds = [seeds::HOOKS_SEED], bump = hooks.bump)]
    pub hooks: Box<Account<'info, HooksAccount>>,

    /// Token program of the position NFT
    pub token_program: Interface<'info, TokenInterface>,

    pub token_program_0: Interface<'info, TokenInterface>,

    pub token_program_1: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Open position handler
#[allow(clippy::too_many_arguments)]
pub fn handler<'a, 'b, 'c: 'info, 'info>(
    ctx: Context<'a, 'b, 'c, 'info, OpenPosition<'info>>,
    tick_lower_index: i32,
    tick_upper_index: i32,
    _tick_array_lower_start_index: i32,
    _tick_array_upper_start_index: i32,
    liquidity: u128,
    amount_0_max: u64,
    amount_1_max: u64,
    base_flag: Option<bool>,
) -> Result<()> {
    let pool_key = ctx.accounts.pool_state.key();
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
    personal_position.initialize(
        ctx.bumps.personal_position,
        ctx.accounts.position_nft_mint.key(),
        pool_key,
        tick_lower_index,
        tick_upper_index,
    );

    let (liquidity, change, pool_signer) = {
        let mut pool = ctx.accounts.pool_state.load_mut()?;
        let liquidity = liquidity_for_deposit(
            &pool,
            personal_position,
            liquidity,
            amount_0_max,
            amount_1_max,
            base_flag,
        )?;
        let mut extension = match &ctx.accounts.tick_array_bitmap {
            Some(loader) => Some(loader.load_mut()?),
            None => None,
        };
        let change = with_boundary_arrays(
            &ctx.accounts.tick_array_lower,
            &ctx.accounts.tick_array_upper,
            |tick_arrays| {
                increase_liquidity_core(
                    &mut pool,
                    personal_position,
                    tick_arrays,
                    extension.as_deref_mut(),
                    liquidity,
                    amount_0_max,
                    amount_1_max,
                )
            },
        )?;
        (liquidity, change, pool.signer())
    };

    let token_program_0 = ctx.accounts.token_program_0.to_account_info();
    let token_program_1 = ctx.accounts.token_program_1.to_account_info();
    transfer_from_user_to_pool_vault(
        &TokenTransfer {
            token_program: &token_program_0,
            mint: &ctx.accounts.vault_0_mint,
            from: &ctx.accounts.token_account_0,
            to: &ctx.accounts.token_vault_0,
            hook_program: hook_0,
            hook_accounts,
        },
        ctx.accounts.payer.to_account_info(),
        change.amount_0,
    )?;
    transfer_from_user_to_pool_vault(
        &TokenTransfer {
            token_program: &token_program_1,
            mint: &ctx.accounts.vault_1_mint,
            from: &ctx.accounts.token_account_1,
            to: &ctx.accounts.token_vault_1,
            hook_program: hook_1,
            hook_accounts,
        },
        ctx.accounts.payer.to_account_info(),
        change.amount_1,
    )?;

    // The pool is the NFT mint authority
    mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.position_nft_mint.to_account_info(),
                to: ctx.accounts.position_nft_account.to_account_info(),
                authority: ctx.accounts.pool_state.to_account_info(),
            },
            &[&pool_signer.seeds()],
        ),
        1,
    )?;

    emit!(CreatePersonalPositionEvent {
        pool_state: pool_key,
        minter: ctx.accounts.payer.key(),
        nft_owner: ctx.accounts.position_nft_owner.key(),
        tick_lower_index,
        tick_upper_index,
        liquidity,
        deposit_amount_0: change.amount_0,
        deposit_amount_1: change.amount_1,
    });

    msg!("Position opened: {}", ctx.accounts.position_nft_mint.key());
    msg!("Tick range: [{}, {})", tick_lower_index, tick_upper_index);
    msg!(
        "Liquidity: {}, deposited: {} / {}",
        liquidity,
        change.amount_0,
        change.amount_1
    );

    Ok(())
}
