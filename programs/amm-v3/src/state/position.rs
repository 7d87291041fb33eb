use anchor_lang::prelude::*;

use crate::constants::Q64;
use crate::errors::AmmError;
use crate::math::full_math::mul_div;

/// Liquidity position - an LP's range in one pool, owned by whoever holds the NFT
/// PDA: ["position", nft_mint]
#[account]
#[derive(Debug, Default)]
pub struct PersonalPositionState {
    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Mint of the position NFT
    pub nft_mint: Pubkey,

    /// The pool this position belongs to
    pub pool_id: Pubkey,

    /// Lower tick of the position range
    pub tick_lower_index: i32,

    /// Upper tick of the position range
    pub tick_upper_index: i32,

    /// Amount of liquidity in this position
    pub liquidity: u128,

    /// Fee growth inside the range at last settlement (token 0, Q64.64)
    pub fee_growth_inside_0_last_x64: u128,

    /// Fee growth inside the range at last settlement (token 1, Q64.64)
    pub fee_growth_inside_1_last_x64: u128,

    /// Uncollected fees owed to the position (token 0)
    pub token_fees_owed_0: u64,

    /// Uncollected fees owed to the position (token 1)
    pub token_fees_owed_1: u64,

    /// Reserved for future use
    pub _reserved: [u64; 4],
}

impl PersonalPositionState {
    pub const LEN: usize = 8 +  // discriminator
        1 +                      // bump
        32 +                     // nft_mint
        32 +                     // pool_id
        4 +                      // tick_lower_index
        4 +                      // tick_upper_index
        16 +                     // liquidity
        16 +                     // fee_growth_inside_0_last_x64
        16 +                     // fee_growth_inside_1_last_x64
        8 +                      // token_fees_owed_0
        8 +                      // token_fees_owed_1
        8 * 4;                   // reserved

    /// Bind a fresh position to its NFT, pool and range
    pub fn initialize(
        &mut self,
        bump: u8,
        nft_mint: Pubkey,
        pool_id: Pubkey,
        tick_lower_index: i32,
        tick_upper_index: i32,
    ) {
        self.bump = bump;
        self.nft_mint = nft_mint;
        self.pool_id = pool_id;
        self.tick_lower_index = tick_lower_index;
        self.tick_upper_index = tick_upper_index;
        self.liquidity = 0;
        self.fee_growth_inside_0_last_x64 = 0;
        self.fee_growth_inside_1_last_x64 = 0;
        self.token_fees_owed_0 = 0;
        self.token_fees_owed_1 = 0;
    }

    /// Check if position is empty (no liquidity and no owed tokens)
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.token_fees_owed_0 == 0 && self.token_fees_owed_1 == 0
    }

    /// Fees accrued since the last snapshot
    ///
    /// tokens = liquidity * (fee_growth_inside - last) / 2^64
    pub fn pending_fees(
        &self,
        fee_growth_inside_0_x64: u128,
        fee_growth_inside_1_x64: u128,
    ) -> Result<(u64, u64)> {
        let accrued = |inside: u128, last: u128| -> Result<u64> {
            let delta = inside.wrapping_sub(last);
            if delta == 0 || self.liquidity == 0 {
                return Ok(0);
            }
            let amount = mul_div(delta, self.liquidity, Q64)?;
            u64::try_from(amount).map_err(|_| AmmError::MaxTokenOverflow.into())
        };
        Ok((
            accrued(fee_growth_inside_0_x64, self.fee_growth_inside_0_last_x64)?,
            accrued(fee_growth_inside_1_x64, self.fee_growth_inside_1_last_x64)?,
        ))
    }

    /// Settle accrued fees into owed tokens and refresh the snapshot
    pub fn update_fees(
        &mut self,
        fee_growth_inside_0_x64: u128,
        fee_growth_inside_1_x64: u128,
    ) -> Result<()> {
        let (fees_0, fees_1) = self.pending_fees(fee_growth_inside_0_x64, fee_growth_inside_1_x64)?;
        self.token_fees_owed_0 = self
            .token_fees_owed_0
            .checked_add(fees_0)
            .ok_or(AmmError::MathOverflow)?;
        self.token_fees_owed_1 = self
            .token_fees_owed_1
            .checked_add(fees_1)
            .ok_or(AmmError::MathOverflow)?;
        self.fee_growth_inside_0_last_x64 = fee_growth_inside_0_x64;
        self.fee_growth_inside_1_last_x64 = fee_growth_inside_1_x64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_with(liquidity: u128) -> PersonalPositionState {
        PersonalPositionState {
            tick_lower_index: -1000,
            tick_upper_index: 1000,
            liquidity,
            ..Default::default()
        }
    }

    #[test]
    fn test_is_empty() {
        let mut position = position_with(0);
        assert!(position.is_empty());
        position.token_fees_owed_1 = 1;
        assert!(!position.is_empty());
    }

    #[test]
    fn test_update_fees_accrues_and_snapshots() {
        let mut position = position_with(1_000);
        // 2.5 tokens per unit of liquidity
        position.update_fees(Q64 * 5 / 2, Q64).unwrap();
        assert_eq!(position.token_fees_owed_0, 2_500);
        assert_eq!(position.token_fees_owed_1, 1_000);
        assert_eq!(position.fee_growth_inside_0_last_x64, Q64 * 5 / 2);

        // Same snapshot again accrues nothing
        position.update_fees(Q64 * 5 / 2, Q64).unwrap();
        assert_eq!(position.token_fees_owed_0, 2_500);
    }

    #[test]
    fn test_update_fees_handles_wrapped_growth() {
        let mut position = position_with(1_000);
        position.fee_growth_inside_0_last_x64 = u128::MAX - Q64 + 1;
        // Growth wrapped around by exactly one token per unit of liquidity
        position.update_fees(0, 0).unwrap();
        assert_eq!(position.token_fees_owed_0, 1_000);
    }

    #[test]
    fn test_zero_liquidity_accrues_nothing() {
        let position = position_with(0);
        assert_eq!(position.pending_fees(Q64, Q64).unwrap(), (0, 0));
    }
}
