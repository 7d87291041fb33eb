use anchor_lang::prelude::*;

use crate::constants::{MAX_TICK, MIN_TICK, TICK_ARRAY_SIZE, TICK_ARRAY_SIZE_I32};
use crate::errors::AmmError;
use crate::state::tick::TickState;

/// Tick Array - stores a contiguous range of tick data
/// PDA: ["tick_array", pool, start_tick_index.to_be_bytes()]
/// Using zero-copy for efficient memory access
/// Fields ordered to ensure proper alignment (TickState needs 16-byte alignment)
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct TickArrayState {
    /// The pool this tick array belongs to
    pub pool: [u8; 32],                           // 32 bytes, offset 0

    /// Starting tick index for this array
    /// Must be divisible by (TICK_ARRAY_SIZE * tick_spacing)
    pub start_tick_index: i32,                    // 4 bytes, offset 32

    /// Number of initialized ticks in this array
    pub initialized_tick_count: u8,               // 1 byte, offset 36

    /// Bump seed for PDA derivation
    pub bump: u8,                                 // 1 byte, offset 37

    /// Padding to align ticks array to 16 bytes (38 -> 48)
    pub _padding: [u8; 10],                       // 10 bytes, offset 38

    /// Array of ticks (60 ticks per array, each 80 bytes)
    pub ticks: [TickState; TICK_ARRAY_SIZE],      // 4800 bytes, offset 48
}
// Total: 4848 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<TickArrayState>() == 4848);

impl TickArrayState {
    pub const LEN: usize = 8 + std::mem::size_of::<TickArrayState>();

    /// Get pool as Pubkey
    pub fn pool_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.pool)
    }

    /// Number of ticks covered by one array
    pub fn tick_count(tick_spacing: u16) -> i32 {
        TICK_ARRAY_SIZE_I32 * i32::from(tick_spacing)
    }

    /// Start index of the array containing `tick_index` (floor division)
    pub fn get_array_start_index(tick_index: i32, tick_spacing: u16) -> i32 {
        let ticks_in_array = Self::tick_count(tick_spacing);
        tick_index.div_euclid(ticks_in_array) * ticks_in_array
    }

    /// Whether `start_index` is aligned and its array overlaps the valid tick range
    pub fn check_is_valid_start_index(start_index: i32, tick_spacing: u16) -> bool {
        if tick_spacing == 0 || start_index % Self::tick_count(tick_spacing) != 0 {
            return false;
        }
        start_index >= Self::get_array_start_index(MIN_TICK, tick_spacing)
            && start_index <= Self::get_array_start_index(MAX_TICK, tick_spacing)
    }

    /// Bind a freshly allocated array to its pool and start index
    pub fn initialize(
        &mut self,
        pool: Pubkey,
        start_tick_index: i32,
        tick_spacing: u16,
        bump: u8,
    ) -> Result<()> {
        require!(
            Self::check_is_valid_start_index(start_tick_index, tick_spacing),
            AmmError::InvalidTickArrayStart
        );
        self.pool = pool.to_bytes();
        self.start_tick_index = start_tick_index;
        self.initialized_tick_count = 0;
        self.bump = bump;
        for (i, tick) in self.ticks.iter_mut().enumerate() {
            *tick = TickState {
                tick: start_tick_index + (i as i32) * i32::from(tick_spacing),
                ..Default::default()
            };
        }
        Ok(())
    }

    /// Offset of an initializable tick inside this array
    pub fn tick_offset(&self, tick_index: i32, tick_spacing: u16) -> Result<usize> {
        require!(
            tick_index % i32::from(tick_spacing) == 0,
            AmmError::TickRangeInvalid
        );
        require!(
            Self::get_array_start_index(tick_index, tick_spacing) == self.start_tick_index,
            AmmError::InvalidTickArray
        );
        Ok(((tick_index - self.start_tick_index) / i32::from(tick_spacing)) as usize)
    }

    pub fn get_tick(&self, tick_index: i32, tick_spacing: u16) -> Result<&TickState> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    /// Next initialized tick in this array from `tick_current` in the swap direction
    ///
    /// Price going down (`zero_for_one`) includes the slot holding
    /// `tick_current`; going up starts strictly above it. `tick_current` may lie
    /// outside the array, in which case the whole array is searched from the
    /// edge the walk enters through. Returns the tick's offset.
    pub fn next_initialized_tick(
        &self,
        tick_current: i32,
        tick_spacing: u16,
        zero_for_one: bool,
    ) -> Option<usize> {
        let spacing = i32::from(tick_spacing);
        let relative = tick_current - self.start_tick_index;

        if zero_for_one {
            if relative < 0 {
                return None;
            }
            let from = (relative / spacing).min(TICK_ARRAY_SIZE_I32 - 1) as usize;
            (0..=from).rev().find(|&i| self.ticks[i].is_initialized())
        } else {
            let from = if relative < 0 {
                0
            } else {
                (relative / spacing + 1) as usize
            };
            (from..TICK_ARRAY_SIZE).find(|&i| self.ticks[i].is_initialized())
        }
    }

    /// Tick index of the slot at `offset`
    pub fn tick_index_at(&self, offset: usize, tick_spacing: u16) -> i32 {
        self.start_tick_index + (offset as i32) * i32::from(tick_spacing)
    }
}
