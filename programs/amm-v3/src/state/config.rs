use anchor_lang::prelude::*;

use crate::constants::{FEE_RATE_DENOMINATOR, MAX_TICK_SPACING};
use crate::errors::AmmError;

/// Fee and tick-spacing configuration shared by every pool created under it
/// PDA: ["amm_config", index.to_be_bytes()]
#[account]
#[derive(Debug, Default)]
pub struct AmmConfig {
    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Config index, part of the address
    pub index: u16,

    /// Owner allowed to collect protocol fees
    pub owner: Pubkey,

    /// Protocol share of each trade fee, over FEE_RATE_DENOMINATOR
    pub protocol_fee_rate: u32,

    /// Trade fee charged on swap input, over FEE_RATE_DENOMINATOR
    pub trade_fee_rate: u32,

    /// Tick spacing for pools under this config
    pub tick_spacing: u16,

    /// Fund share of each trade fee, over FEE_RATE_DENOMINATOR
    pub fund_fee_rate: u32,

    /// Recipient allowed to collect fund fees
    pub fund_owner: Pubkey,

    /// Reserved for future use
    pub _reserved: [u64; 3],
}

impl AmmConfig {
    pub const LEN: usize = 8 +  // discriminator
        1 +                      // bump
        2 +                      // index
        32 +                     // owner
        4 +                      // protocol_fee_rate
        4 +                      // trade_fee_rate
        2 +                      // tick_spacing
        4 +                      // fund_fee_rate
        32 +                     // fund_owner
        8 * 3;                   // reserved

    /// Validate parameters and write a fresh config
    ///
    /// `signer` must be the protocol admin.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        signer: &Pubkey,
        admin: &Pubkey,
        bump: u8,
        index: u16,
        tick_spacing: u16,
        trade_fee_rate: u32,
        protocol_fee_rate: u32,
        fund_fee_rate: u32,
    ) -> Result<()> {
        require_keys_eq!(*signer, *admin, AmmError::Unauthorized);
        require!(
            tick_spacing > 0 && tick_spacing <= MAX_TICK_SPACING,
            AmmError::InvalidConfig
        );
        let total = (trade_fee_rate as u64) + (protocol_fee_rate as u64) + (fund_fee_rate as u64);
        require!(
            total <= FEE_RATE_DENOMINATOR as u64 && trade_fee_rate < FEE_RATE_DENOMINATOR,
            AmmError::InvalidConfig
        );

        self.bump = bump;
        self.index = index;
        self.owner = *signer;
        self.tick_spacing = tick_spacing;
        self.trade_fee_rate = trade_fee_rate;
        self.protocol_fee_rate = protocol_fee_rate;
        self.fund_fee_rate = fund_fee_rate;
        self.fund_owner = *signer;
        Ok(())
    }

    pub fn is_owner(&self, signer: &Pubkey) -> bool {
        self.owner == *signer
    }

    pub fn is_fund_owner(&self, signer: &Pubkey) -> bool {
        self.fund_owner == *signer
    }
}
