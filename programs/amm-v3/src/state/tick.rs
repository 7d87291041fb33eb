use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};

use crate::errors::AmmError;
use crate::math::liquidity_math::add_liquidity_delta;

/// Tick data - stored within tick arrays
/// Each tick is a price point where in-range liquidity changes
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct TickState {
    /// Net liquidity change when crossing this tick left to right
    pub liquidity_net: i128,                      // 16 bytes, offset 0

    /// Total liquidity referencing this tick
    pub liquidity_gross: u128,                    // 16 bytes, offset 16

    /// Fee growth on the other side of this tick (token 0, Q64.64)
    pub fee_growth_outside_0_x64: u128,           // 16 bytes, offset 32

    /// Fee growth on the other side of this tick (token 1, Q64.64)
    pub fee_growth_outside_1_x64: u128,           // 16 bytes, offset 48

    /// Tick index
    pub tick: i32,                                // 4 bytes, offset 64

    /// Padding for 16-byte alignment
    pub _padding: [u8; 12],                       // 12 bytes, offset 68
}
// Total: 80 bytes

const _: () = assert!(std::mem::size_of::<TickState>() == 80);

impl TickState {
    pub const LEN: usize = 80;

    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross != 0
    }

    /// Apply a position's liquidity delta to this boundary tick
    ///
    /// Returns true when the tick flipped between initialized and uninitialized.
    pub fn update(
        &mut self,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_0_x64: u128,
        fee_growth_global_1_x64: u128,
        upper: bool,
    ) -> Result<bool> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = add_liquidity_delta(liquidity_gross_before, liquidity_delta)
            .map_err(|_| AmmError::InsufficientPositionLiquidity)?;

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // Fees are assumed to have accrued below the current tick
            if self.tick <= tick_current {
                self.fee_growth_outside_0_x64 = fee_growth_global_0_x64;
                self.fee_growth_outside_1_x64 = fee_growth_global_1_x64;
            }
        }

        self.liquidity_gross = liquidity_gross_after;

        // Lower boundary adds liquidity when crossed upward, upper removes it
        self.liquidity_net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(AmmError::MathOverflow)?;

        Ok(flipped)
    }

    /// Cross this tick, flipping its outside fee growth
    ///
    /// Returns the tick's liquidity_net for the caller to apply.
    pub fn cross(&mut self, fee_growth_global_0_x64: u128, fee_growth_global_1_x64: u128) -> i128 {
        self.fee_growth_outside_0_x64 =
            fee_growth_global_0_x64.wrapping_sub(self.fee_growth_outside_0_x64);
        self.fee_growth_outside_1_x64 =
            fee_growth_global_1_x64.wrapping_sub(self.fee_growth_outside_1_x64);
        self.liquidity_net
    }

    /// Reset everything but the index once no position references the tick
    pub fn clear(&mut self) {
        let tick = self.tick;
        *self = Self::default();
        self.tick = tick;
    }
}

/// Fee growth inside `[tick_lower, tick_upper)` per unit of liquidity
pub fn get_fee_growth_inside(
    tick_lower: &TickState,
    tick_upper: &TickState,
    tick_current: i32,
    fee_growth_global_0_x64: u128,
    fee_growth_global_1_x64: u128,
) -> (u128, u128) {
    let (fee_growth_below_0, fee_growth_below_1) = if tick_current >= tick_lower.tick {
        (tick_lower.fee_growth_outside_0_x64, tick_lower.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(tick_lower.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(tick_lower.fee_growth_outside_1_x64),
        )
    };

    let (fee_growth_above_0, fee_growth_above_1) = if tick_current < tick_upper.tick {
        (tick_upper.fee_growth_outside_0_x64, tick_upper.fee_growth_outside_1_x64)
    } else {
        (
            fee_growth_global_0_x64.wrapping_sub(tick_upper.fee_growth_outside_0_x64),
            fee_growth_global_1_x64.wrapping_sub(tick_upper.fee_growth_outside_1_x64),
        )
    };

    (
        fee_growth_global_0_x64
            .wrapping_sub(fee_growth_below_0)
            .wrapping_sub(fee_growth_above_0),
        fee_growth_global_1_x64
            .wrapping_sub(fee_growth_below_1)
            .wrapping_sub(fee_growth_above_1),
    )
}
