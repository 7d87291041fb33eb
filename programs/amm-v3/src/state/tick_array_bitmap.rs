use anchor_lang::prelude::*;

use crate::constants::bitmap::{
    EXTENSION_ROWS, EXTENSION_ROW_WORDS, EXTENSION_SIDE_BITS, POOL_BITMAP_HALF_SPAN,
    POOL_BITMAP_WORDS, TOTAL_BITS,
};
use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::AmmError;
use crate::math::bit_math::{is_bit_set_in, scan_down, scan_up, toggle_bit};
use crate::state::tick_array::TickArrayState;

/// Words of the negative extension side, laid out before the pool bitmap
const NEGATIVE_WORDS: usize = EXTENSION_SIDE_BITS / 64;

/// First global word past the pool bitmap
const POSITIVE_WORD_START: usize = NEGATIVE_WORDS + POOL_BITMAP_WORDS;

/// Bitmap extension - presence bits for tick arrays beyond the pool's native span
/// PDA: ["tick_array_bitmap", pool]
///
/// Together with `PoolState::tick_array_bitmap` this forms one linear bitmap:
/// negative side, pool bitmap, positive side, ordered by array start index.
#[account(zero_copy)]
#[repr(C)]
#[derive(Debug)]
pub struct TickArrayBitmapExtension {
    /// The pool this extension belongs to
    pub pool_id: [u8; 32],                                                     // 32 bytes, offset 0

    /// Arrays above the native span, lowest start index first
    pub positive_tick_array_bitmap: [[u64; EXTENSION_ROW_WORDS]; EXTENSION_ROWS], // 896 bytes, offset 32

    /// Arrays below the native span, lowest start index first
    pub negative_tick_array_bitmap: [[u64; EXTENSION_ROW_WORDS]; EXTENSION_ROWS], // 896 bytes, offset 928
}
// Total: 1824 bytes (divisible by 16)

const _: () = assert!(std::mem::size_of::<TickArrayBitmapExtension>() == 1824);

impl TickArrayBitmapExtension {
    pub const LEN: usize = 8 + std::mem::size_of::<TickArrayBitmapExtension>();

    pub fn initialize(&mut self, pool_id: Pubkey) {
        self.pool_id = pool_id.to_bytes();
        self.positive_tick_array_bitmap = [[0; EXTENSION_ROW_WORDS]; EXTENSION_ROWS];
        self.negative_tick_array_bitmap = [[0; EXTENSION_ROW_WORDS]; EXTENSION_ROWS];
    }

    fn negative_words(&self) -> &[u64] {
        bytemuck::cast_slice(&self.negative_tick_array_bitmap[..])
    }

    fn positive_words(&self) -> &[u64] {
        bytemuck::cast_slice(&self.positive_tick_array_bitmap[..])
    }
}

/// Position of a tick array start in the combined bitmap
pub fn bitmap_bit_index(start_index: i32, tick_spacing: u16) -> Result<usize> {
    require!(
        TickArrayState::check_is_valid_start_index(start_index, tick_spacing),
        AmmError::InvalidTickArrayStart
    );
    let compressed = start_index / TickArrayState::tick_count(tick_spacing);
    let bit = i64::from(compressed) + (EXTENSION_SIDE_BITS as i64) + i64::from(POOL_BITMAP_HALF_SPAN);
    require!(
        bit >= 0 && (bit as usize) < TOTAL_BITS,
        AmmError::InvalidTickArrayStart
    );
    Ok(bit as usize)
}

/// Tick array start index for a bit of the combined bitmap
pub fn start_index_from_bit(bit: usize, tick_spacing: u16) -> i32 {
    let compressed =
        bit as i32 - EXTENSION_SIDE_BITS as i32 - POOL_BITMAP_HALF_SPAN;
    compressed * TickArrayState::tick_count(tick_spacing)
}

/// Whether the bit lies in the pool's own bitmap
pub fn is_in_native_span(bit: usize) -> bool {
    (NEGATIVE_WORDS * 64..POSITIVE_WORD_START * 64).contains(&bit)
}

/// Read-only view over the pool bitmap and, when supplied, its extension
pub struct TickArrayBitmap<'a> {
    pool_bitmap: &'a [u64; POOL_BITMAP_WORDS],
    extension: Option<&'a TickArrayBitmapExtension>,
    tick_spacing: u16,
}

impl<'a> TickArrayBitmap<'a> {
    pub fn new(
        pool_bitmap: &'a [u64; POOL_BITMAP_WORDS],
        extension: Option<&'a TickArrayBitmapExtension>,
        tick_spacing: u16,
    ) -> Self {
        Self {
            pool_bitmap,
            extension,
            tick_spacing,
        }
    }

    /// Global word, or `None` when it lives in an extension that was not supplied
    fn word_at(&self, index: usize) -> Option<u64> {
        if index < NEGATIVE_WORDS {
            self.extension.map(|ext| ext.negative_words()[index])
        } else if index < POSITIVE_WORD_START {
            Some(self.pool_bitmap[index - NEGATIVE_WORDS])
        } else {
            let ext = self.extension?;
            ext.positive_words().get(index - POSITIVE_WORD_START).copied()
        }
    }

    /// Whether the array starting at `start_index` holds initialized ticks
    pub fn is_initialized(&self, start_index: i32) -> Result<bool> {
        let bit = bitmap_bit_index(start_index, self.tick_spacing)?;
        let word = self
            .word_at(bit / 64)
            .ok_or(AmmError::BitmapExtensionNotLoaded)?;
        Ok(is_bit_set_in(&[word], bit % 64))
    }

    /// Next populated array start strictly beyond `start_index` in the swap direction
    ///
    /// The search stops at the edge of the visible bitmap; without the
    /// extension that is the native span.
    pub fn next_initialized_start(&self, start_index: i32, zero_for_one: bool) -> Result<Option<i32>> {
        let bit = bitmap_bit_index(start_index, self.tick_spacing)?;
        let found = if zero_for_one {
            if bit == 0 {
                None
            } else {
                scan_down(|i| self.word_at(i), bit - 1)
            }
        } else {
            scan_up(|i| self.word_at(i), bit + 1, TOTAL_BITS)
        };
        Ok(found.map(|b| start_index_from_bit(b, self.tick_spacing)))
    }

    /// Ticks whose arrays this view can see, as `[lower, upper)`
    pub fn visible_tick_range(&self) -> (i32, i32) {
        if self.extension.is_some() {
            return (MIN_TICK, MAX_TICK);
        }
        (
            start_index_from_bit(NEGATIVE_WORDS * 64, self.tick_spacing).max(MIN_TICK),
            start_index_from_bit(POSITIVE_WORD_START * 64, self.tick_spacing).min(MAX_TICK),
        )
    }

    /// The array a swap from `tick_current` must begin with
    ///
    /// The current array when populated, otherwise the next populated one in
    /// the swap direction.
    pub fn first_initialized_start(&self, tick_current: i32, zero_for_one: bool) -> Result<Option<i32>> {
        let current_start = TickArrayState::get_array_start_index(tick_current, self.tick_spacing);
        if self.is_initialized(current_start)? {
            return Ok(Some(current_start));
        }
        self.next_initialized_start(current_start, zero_for_one)
    }
}

/// Toggle the presence bit of the array at `start_index`
pub fn flip_tick_array_bit(
    pool_bitmap: &mut [u64; POOL_BITMAP_WORDS],
    extension: Option<&mut TickArrayBitmapExtension>,
    start_index: i32,
    tick_spacing: u16,
) -> Result<()> {
    let bit = bitmap_bit_index(start_index, tick_spacing)?;
    if is_in_native_span(bit) {
        toggle_bit(pool_bitmap, bit - NEGATIVE_WORDS * 64);
        return Ok(());
    }
    let ext = extension.ok_or(AmmError::BitmapExtensionNotLoaded)?;
    if bit < NEGATIVE_WORDS * 64 {
        toggle_bit(
            bytemuck::cast_slice_mut(&mut ext.negative_tick_array_bitmap[..]),
            bit,
        );
    } else {
        toggle_bit(
            bytemuck::cast_slice_mut(&mut ext.positive_tick_array_bitmap[..]),
            bit - POSITIVE_WORD_START * 64,
        );
    }
    Ok(())
}
