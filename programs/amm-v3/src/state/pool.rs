use anchor_lang::prelude::*;

use crate::constants::{bitmap::POOL_BITMAP_WORDS, seeds, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use crate::errors::AmmError;
use crate::math::tick_math::get_tick_at_sqrt_price;
use crate::state::AmmConfig;

/// Pool state - the core AMM state for a token pair
/// PDA: ["pool", amm_config, token_mint_0, token_mint_1]
///
/// Using zero-copy for efficient memory access and reduced stack usage
/// All fields are carefully ordered to avoid implicit padding
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct PoolState {
    // === 16-byte aligned fields first (u128) ===

    /// Liquidity currently in range
    pub liquidity: u128,                          // 16 bytes, offset 0

    /// Current sqrt price as Q64.64 fixed point
    pub sqrt_price_x64: u128,                     // 16 bytes, offset 16

    /// Fee growth per unit of liquidity for token 0 (Q64.64)
    pub fee_growth_global_0_x64: u128,            // 16 bytes, offset 32

    /// Fee growth per unit of liquidity for token 1 (Q64.64)
    pub fee_growth_global_1_x64: u128,            // 16 bytes, offset 48

    /// Cumulative token 0 swapped into the pool
    pub swap_in_amount_token_0: u128,             // 16 bytes, offset 64

    /// Cumulative token 1 swapped out of the pool
    pub swap_out_amount_token_1: u128,            // 16 bytes, offset 80

    /// Cumulative token 1 swapped into the pool
    pub swap_in_amount_token_1: u128,             // 16 bytes, offset 96

    /// Cumulative token 0 swapped out of the pool
    pub swap_out_amount_token_0: u128,            // 16 bytes, offset 112

    // === 8-byte aligned fields (u64) ===

    /// Protocol fees owed in token 0
    pub protocol_fees_token_0: u64,               // 8 bytes, offset 128

    /// Protocol fees owed in token 1
    pub protocol_fees_token_1: u64,               // 8 bytes, offset 136

    /// Fund fees owed in token 0
    pub fund_fees_token_0: u64,                   // 8 bytes, offset 144

    /// Fund fees owed in token 1
    pub fund_fees_token_1: u64,                   // 8 bytes, offset 152

    /// Unix timestamp from which swaps are allowed
    pub open_time: u64,                           // 8 bytes, offset 160

    /// One bit per tick array start in [-512, 512) arrays around tick 0
    pub tick_array_bitmap: [u64; POOL_BITMAP_WORDS], // 128 bytes, offset 168

    // === 4-byte aligned fields (i32) ===

    /// Current tick index
    pub tick_current: i32,                        // 4 bytes, offset 296

    // === 2-byte aligned fields (u16) ===

    /// Tick spacing copied from the config
    pub tick_spacing: u16,                        // 2 bytes, offset 300

    // === 1-byte fields ===

    /// Bump seed for PDA derivation
    pub bump: u8,                                 // 1 byte, offset 302

    /// Token 0 decimals
    pub mint_decimals_0: u8,                      // 1 byte, offset 303

    /// Token 1 decimals
    pub mint_decimals_1: u8,                      // 1 byte, offset 304

    /// Padding to 16-byte boundary
    pub _padding: [u8; 15],                       // 15 bytes, offset 305

    // === Pubkey-sized fields (32 bytes, no alignment requirement) ===

    /// The config this pool belongs to
    pub amm_config: [u8; 32],                     // 32 bytes, offset 320

    /// Pool creator
    pub owner: [u8; 32],                          // 32 bytes, offset 352

    /// Token 0 mint (token_mint_0 < token_mint_1)
    pub token_mint_0: [u8; 32],                   // 32 bytes, offset 384

    /// Token 1 mint
    pub token_mint_1: [u8; 32],                   // 32 bytes, offset 416

    /// Token 0 vault (PDA owned by pool)
    pub token_vault_0: [u8; 32],                  // 32 bytes, offset 448

    /// Token 1 vault (PDA owned by pool)
    pub token_vault_1: [u8; 32],                  // 32 bytes, offset 480

    /// Observation account
    pub observation_key: [u8; 32],                // 32 bytes, offset 512

    /// Reserved for future use
    pub _reserved: [u8; 32],                      // 32 bytes, offset 544
}
// Total: 576 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<PoolState>() == 576);

/// Owned copy of the pool's signer seeds, detached from the account borrow
pub struct PoolSigner {
    amm_config: [u8; 32],
    token_mint_0: [u8; 32],
    token_mint_1: [u8; 32],
    bump: [u8; 1],
}

impl PoolSigner {
    pub fn seeds(&self) -> [&[u8]; 5] {
        [
            seeds::POOL_SEED,
            &self.amm_config,
            &self.token_mint_0,
            &self.token_mint_1,
            &self.bump,
        ]
    }
}

/// Accounts a new pool is bound to
pub struct PoolBinding {
    pub amm_config: Pubkey,
    pub owner: Pubkey,
    pub token_mint_0: Pubkey,
    pub token_mint_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub observation_key: Pubkey,
    pub mint_decimals_0: u8,
    pub mint_decimals_1: u8,
}

impl PoolState {
    pub const LEN: usize = 8 + std::mem::size_of::<PoolState>();

    /// Bind a freshly allocated pool to its config, mints and starting price
    pub fn initialize(
        &mut self,
        bump: u8,
        binding: &PoolBinding,
        config: &AmmConfig,
        sqrt_price_x64: u128,
        open_time: u64,
    ) -> Result<()> {
        require!(
            binding.token_mint_0 < binding.token_mint_1,
            AmmError::InvalidTokenOrder
        );
        require!(
            (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64),
            AmmError::SqrtPriceOutOfRange
        );
        let tick = get_tick_at_sqrt_price(sqrt_price_x64)?;

        self.bump = bump;
        self.amm_config = binding.amm_config.to_bytes();
        self.owner = binding.owner.to_bytes();
        self.token_mint_0 = binding.token_mint_0.to_bytes();
        self.token_mint_1 = binding.token_mint_1.to_bytes();
        self.token_vault_0 = binding.token_vault_0.to_bytes();
        self.token_vault_1 = binding.token_vault_1.to_bytes();
        self.observation_key = binding.observation_key.to_bytes();
        self.mint_decimals_0 = binding.mint_decimals_0;
        self.mint_decimals_1 = binding.mint_decimals_1;
        self.tick_spacing = config.tick_spacing;
        self.sqrt_price_x64 = sqrt_price_x64;
        self.tick_current = tick;
        self.liquidity = 0;
        self.fee_growth_global_0_x64 = 0;
        self.fee_growth_global_1_x64 = 0;
        self.protocol_fees_token_0 = 0;
        self.protocol_fees_token_1 = 0;
        self.fund_fees_token_0 = 0;
        self.fund_fees_token_1 = 0;
        self.swap_in_amount_token_0 = 0;
        self.swap_out_amount_token_1 = 0;
        self.swap_in_amount_token_1 = 0;
        self.swap_out_amount_token_0 = 0;
        self.open_time = open_time;
        self.tick_array_bitmap = [0; POOL_BITMAP_WORDS];
        Ok(())
    }

    /// Get amm_config as Pubkey
    pub fn amm_config_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.amm_config)
    }

    /// Get token_mint_0 as Pubkey
    pub fn token_mint_0_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_0)
    }

    /// Get token_mint_1 as Pubkey
    pub fn token_mint_1_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_mint_1)
    }

    /// Get token_vault_0 as Pubkey
    pub fn token_vault_0_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_0)
    }

    /// Get token_vault_1 as Pubkey
    pub fn token_vault_1_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.token_vault_1)
    }

    /// Get observation_key as Pubkey
    pub fn observation_key_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.observation_key)
    }

    /// Signer seeds copied out of the account
    pub fn signer(&self) -> PoolSigner {
        PoolSigner {
            amm_config: self.amm_config,
            token_mint_0: self.token_mint_0,
            token_mint_1: self.token_mint_1,
            bump: [self.bump],
        }
    }

    /// Whether swaps are allowed at `block_timestamp`
    pub fn is_open(&self, block_timestamp: u64) -> bool {
        block_timestamp >= self.open_time
    }

    /// Credit accrued protocol and fund fees on the input token of a swap
    pub fn accrue_fees(&mut self, zero_for_one: bool, protocol_fee: u64, fund_fee: u64) -> Result<()> {
        let (protocol_fees, fund_fees) = if zero_for_one {
            (&mut self.protocol_fees_token_0, &mut self.fund_fees_token_0)
        } else {
            (&mut self.protocol_fees_token_1, &mut self.fund_fees_token_1)
        };
        *protocol_fees = protocol_fees
            .checked_add(protocol_fee)
            .ok_or(AmmError::MathOverflow)?;
        *fund_fees = fund_fees.checked_add(fund_fee).ok_or(AmmError::MathOverflow)?;
        Ok(())
    }

    /// Withdraw protocol fees, capped at what accrued and what the vaults hold
    pub fn take_protocol_fees(
        &mut self,
        requested: (u64, u64),
        vault_balances: (u64, u64),
    ) -> (u64, u64) {
        (
            take_fee(&mut self.protocol_fees_token_0, requested.0, vault_balances.0),
            take_fee(&mut self.protocol_fees_token_1, requested.1, vault_balances.1),
        )
    }

    /// Withdraw fund fees, capped at what accrued and what the vaults hold
    pub fn take_fund_fees(
        &mut self,
        requested: (u64, u64),
        vault_balances: (u64, u64),
    ) -> (u64, u64) {
        (
            take_fee(&mut self.fund_fees_token_0, requested.0, vault_balances.0),
            take_fee(&mut self.fund_fees_token_1, requested.1, vault_balances.1),
        )
    }

    /// Add a settled swap to the cumulative volumes
    pub fn record_swap_volume(&mut self, zero_for_one: bool, amount_in: u64, amount_out: u64) -> Result<()> {
        let (swap_in, swap_out) = if zero_for_one {
            (&mut self.swap_in_amount_token_0, &mut self.swap_out_amount_token_1)
        } else {
            (&mut self.swap_in_amount_token_1, &mut self.swap_out_amount_token_0)
        };
        *swap_in = swap_in
            .checked_add(amount_in as u128)
            .ok_or(AmmError::MathOverflow)?;
        *swap_out = swap_out
            .checked_add(amount_out as u128)
            .ok_or(AmmError::MathOverflow)?;
        Ok(())
    }
}

fn take_fee(accrued: &mut u64, requested: u64, vault_balance: u64) -> u64 {
    let amount = requested.min(*accrued).min(vault_balance);
    *accrued -= amount;
    amount
}
