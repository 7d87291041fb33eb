// AMM V3 Protocol Constants
// Raydium-style CLMM geometry: 60 ticks per array, Q64.64 prices, 1e6 fee denominator

/// Number of ticks per tick array
pub const TICK_ARRAY_SIZE: usize = 60;

/// Same as `TICK_ARRAY_SIZE`, as i32 for tick arithmetic
pub const TICK_ARRAY_SIZE_I32: i32 = TICK_ARRAY_SIZE as i32;

/// Minimum tick index (p(i) = 1.0001^i, this gives price ~= 0)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price (Q64.64), equal to `get_sqrt_price_at_tick(MIN_TICK)`
pub const MIN_SQRT_PRICE_X64: u128 = 4295048017;

/// Maximum sqrt price (Q64.64), equal to `get_sqrt_price_at_tick(MAX_TICK)`
pub const MAX_SQRT_PRICE_X64: u128 = 79226673515401279992447579062;

/// Q64 multiplier (2^64)
pub const Q64: u128 = 1 << 64;

/// Fee rate denominator (1_000_000 = 100%)
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Maximum tick spacing accepted by `create_amm_config`
pub const MAX_TICK_SPACING: u16 = 16384;

/// Maximum number of hook program ids per governance status
pub const MAX_HOOK_PROGRAMS: usize = 20;

/// Tick array bitmap geometry
pub mod bitmap {
    /// Words in the pool's own bitmap (1024 bits, arrays -512..512 around tick 0)
    pub const POOL_BITMAP_WORDS: usize = 16;

    /// Number of tick arrays the pool bitmap covers on each side of tick 0
    pub const POOL_BITMAP_HALF_SPAN: i32 = 512;

    /// Rows per side of the bitmap extension
    pub const EXTENSION_ROWS: usize = 14;

    /// Words per extension row (512 bits)
    pub const EXTENSION_ROW_WORDS: usize = 8;

    /// Bits per extension row
    pub const EXTENSION_ROW_BITS: usize = EXTENSION_ROW_WORDS * 64;

    /// Bits covered by one side of the extension
    pub const EXTENSION_SIDE_BITS: usize = EXTENSION_ROWS * EXTENSION_ROW_BITS;

    /// Total addressable bits: negative extension, pool bitmap, positive extension
    pub const TOTAL_BITS: usize = 2 * EXTENSION_SIDE_BITS + POOL_BITMAP_WORDS * 64;
}

/// Account seeds for PDA derivation
pub mod seeds {
    pub const AMM_CONFIG_SEED: &[u8] = b"amm_config";
    pub const POOL_SEED: &[u8] = b"pool";
    pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";
    pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";
    pub const TICK_ARRAY_BITMAP_SEED: &[u8] = b"tick_array_bitmap";
    pub const OBSERVATION_SEED: &[u8] = b"observation";
    pub const POSITION_SEED: &[u8] = b"position";
    pub const HOOKS_SEED: &[u8] = b"hooks";
}

/// Observation ring constants
pub mod oracle {
    /// Number of observations kept per pool
    pub const OBSERVATION_NUM: usize = 32;
}
