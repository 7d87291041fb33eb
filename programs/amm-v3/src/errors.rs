use anchor_lang::prelude::*;

/// AMM V3 error codes
/// Every variant aborts the whole instruction; nothing is retried internally
#[error_code]
pub enum AmmError {
    // ═══════════════════════════════════════════════════════════════════════
    // MATH ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Fixed-point arithmetic exceeded the representable range
    #[msg("Math overflow")]
    MathOverflow, // 6000

    /// Division by zero attempted
    #[msg("Division by zero")]
    DivisionByZero, // 6001

    /// A token amount does not fit in u64
    #[msg("Token amount exceeds u64")]
    MaxTokenOverflow, // 6002

    // ═══════════════════════════════════════════════════════════════════════
    // TICK ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Tick index outside [MIN_TICK, MAX_TICK]
    #[msg("Tick out of range")]
    TickOutOfRange, // 6003

    /// Sqrt price outside [MIN_SQRT_PRICE_X64, MAX_SQRT_PRICE_X64]
    #[msg("Sqrt price out of range")]
    SqrtPriceOutOfRange, // 6004

    /// Lower tick not below upper tick, or a bound not aligned to tick spacing
    #[msg("Invalid tick range")]
    TickRangeInvalid, // 6005

    /// Tick array start index not aligned or out of range
    #[msg("Invalid tick array start index")]
    InvalidTickArrayStart, // 6006

    /// Tick array belongs to another pool or is out of sequence
    #[msg("Invalid tick array")]
    InvalidTickArray, // 6007

    /// The tick array holding the required tick was not supplied
    #[msg("Tick array not loaded")]
    ArrayNotLoaded, // 6008

    /// The supplied tick arrays ran out before the swap completed
    #[msg("Out of tick arrays")]
    OutOfTickArrays, // 6009

    /// The bitmap extension is required for this tick array
    #[msg("Tick array bitmap extension not loaded")]
    BitmapExtensionNotLoaded, // 6010

    // ═══════════════════════════════════════════════════════════════════════
    // LIQUIDITY / POSITION ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Liquidity amount is zero where a positive amount is required
    #[msg("Zero liquidity")]
    ZeroLiquidity, // 6011

    /// Removing more liquidity than the position holds
    #[msg("Insufficient position liquidity")]
    InsufficientPositionLiquidity, // 6012

    /// Position still has liquidity or owed tokens
    #[msg("Position not empty")]
    PositionNotEmpty, // 6013

    /// Position does not belong to this pool
    #[msg("Invalid position")]
    InvalidPosition, // 6014

    /// Signer does not hold the position NFT
    #[msg("Not the position owner")]
    NotPositionOwner, // 6015

    // ═══════════════════════════════════════════════════════════════════════
    // SWAP ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Slippage tolerance exceeded
    #[msg("Slippage exceeded")]
    SlippageExceeded, // 6016

    /// Swap amount is zero
    #[msg("Zero amount specified")]
    ZeroAmountSpecified, // 6017

    /// Sqrt price limit on the wrong side of the current price or out of range
    #[msg("Invalid sqrt price limit")]
    InvalidPriceLimit, // 6018

    /// Swap moved zero input or zero output
    #[msg("Input or output amount too small")]
    TooSmallInputOrOutputAmount, // 6019

    // ═══════════════════════════════════════════════════════════════════════
    // POOL / CONFIG ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Fee shares exceed the denominator or tick spacing invalid
    #[msg("Invalid config")]
    InvalidConfig, // 6020

    /// Operation before pool open time
    #[msg("Pool not open")]
    PoolNotOpen, // 6021

    /// Token mints not in canonical order
    #[msg("Token mint 0 must be less than token mint 1")]
    InvalidTokenOrder, // 6022

    /// Mint does not match pool
    #[msg("Invalid token mint")]
    InvalidTokenMint, // 6023

    /// Vault does not match pool
    #[msg("Invalid vault")]
    InvalidVault, // 6024

    /// Mint account data could not be parsed
    #[msg("Invalid mint account")]
    InvalidMintAccount, // 6025

    // ═══════════════════════════════════════════════════════════════════════
    // HOOK GOVERNANCE ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Hook program id already pending or approved
    #[msg("Hook program already registered")]
    AlreadyRegistered, // 6026

    /// Hook program id is not pending approval
    #[msg("Hook program not pending")]
    NotPending, // 6027

    /// Too many hook programs in one status
    #[msg("Too many hook programs")]
    TooManyHooks, // 6028

    /// Transfer hook program is not approved
    #[msg("Hook program not approved")]
    HookNotApproved, // 6029

    /// Approved hook program account missing from the remaining accounts
    #[msg("Hook program account not provided")]
    HookProgramNotProvided, // 6030

    // ═══════════════════════════════════════════════════════════════════════
    // AUTHORIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Signer is not the admin or owner for a gated action
    #[msg("Unauthorized")]
    Unauthorized, // 6031
}
