//! Token movement between users and pool vaults
//!
//! Plain `transfer_checked` CPIs for mints without a hook. Mints with an
//! authorized hook go through the Token-2022 helper that appends the hook's
//! extra accounts from the trailing remaining accounts.

use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::onchain::invoke_transfer_checked;
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount, TransferChecked};

/// One leg of a token movement
pub struct TokenTransfer<'a, 'info> {
    pub token_program: &'a AccountInfo<'info>,
    pub mint: &'a InterfaceAccount<'info, Mint>,
    pub from: &'a InterfaceAccount<'info, TokenAccount>,
    pub to: &'a InterfaceAccount<'info, TokenAccount>,
    /// Hook program already authorized for `mint`
    pub hook_program: Option<Pubkey>,
    /// Trailing accounts holding the hook's extra accounts
    pub hook_accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> TokenTransfer<'a, 'info> {
    fn execute(
        &self,
        authority: AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        if self.hook_program.is_some() {
            invoke_transfer_checked(
                self.token_program.key,
                self.from.to_account_info(),
                self.mint.to_account_info(),
                self.to.to_account_info(),
                authority,
                self.hook_accounts,
                amount,
                self.mint.decimals,
                signer_seeds,
            )?;
            return Ok(());
        }

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                TransferChecked {
                    from: self.from.to_account_info(),
                    mint: self.mint.to_account_info(),
                    to: self.to.to_account_info(),
                    authority,
                },
                signer_seeds,
            ),
            amount,
            self.mint.decimals,
        )
    }
}

/// Move `amount` from a user's account into a pool vault
pub fn transfer_from_user_to_pool_vault<'a, 'info>(
    transfer: &TokenTransfer<'a, 'info>,
    user: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    transfer.execute(user, &[], amount)
}

/// Move `amount` out of a pool vault, signed by the pool
pub fn transfer_from_pool_vault_to_user<'a, 'info>(
    transfer: &TokenTransfer<'a, 'info>,
    pool: AccountInfo<'info>,
    pool_seeds: &[&[u8]],
    amount: u64,
) -> Result<()> {
    transfer.execute(pool, &[pool_seeds], amount)
}
