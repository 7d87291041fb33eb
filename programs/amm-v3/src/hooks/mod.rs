//! Transfer Hooks
//!
//! Token-2022 mints may carry a TransferHook extension naming a program the
//! token program calls back on every transfer. Pools only move such tokens
//! once that program is approved in the `HooksAccount` registry.

use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    self,
    extension::{transfer_hook, StateWithExtensions},
};

use crate::errors::AmmError;
use crate::state::HooksAccount;

pub mod transfer;

pub use transfer::*;

/// Hook program configured on `mint`, if any
pub fn transfer_hook_program_id(mint: &AccountInfo) -> Result<Option<Pubkey>> {
    if *mint.owner != spl_token_2022::ID {
        return Ok(None);
    }
    let data = mint.try_borrow_data()?;
    let state = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(&data)
        .map_err(|_| AmmError::InvalidMintAccount)?;
    Ok(transfer_hook::get_program_id(&state))
}

/// Check a resolved hook program against the registry and the supplied accounts
///
/// Returns the program that will run, `None` for mints without a hook.
pub fn authorize_hook_program<'a>(
    hooks: &HooksAccount,
    hook_program: Option<Pubkey>,
    mut provided: impl Iterator<Item = &'a Pubkey>,
) -> Result<Option<Pubkey>> {
    let Some(program_id) = hook_program else {
        return Ok(None);
    };
    hooks.require_approved(&program_id)?;
    require!(
        provided.any(|key| *key == program_id),
        AmmError::HookProgramNotProvided
    );
    Ok(Some(program_id))
}

/// Resolve and authorize the hook of one mint
pub fn authorize_mint<'info>(
    hooks: &HooksAccount,
    mint: &AccountInfo<'info>,
    hook_accounts: &[AccountInfo<'info>],
) -> Result<Option<Pubkey>> {
    let hook_program = transfer_hook_program_id(mint)?;
    let authorized = authorize_hook_program(
        hooks,
        hook_program,
        hook_accounts.iter().map(|account| account.key),
    )?;
    if let Some(program_id) = authorized {
        msg!("Transfer hook {} approved for mint {}", program_id, mint.key());
    }
    Ok(authorized)
}
