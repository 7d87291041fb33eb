//! Utility functions for AMM V3
//!
//! Deterministic account addresses, usable off-chain and in tests.

use anchor_lang::prelude::*;

use crate::constants::seeds;

/// Order two mints the way pools store them (mint_0 < mint_1)
pub fn sort_mints(mint_a: Pubkey, mint_b: Pubkey) -> (Pubkey, Pubkey) {
    if mint_a < mint_b {
        (mint_a, mint_b)
    } else {
        (mint_b, mint_a)
    }
}

/// ["amm_config", index BE]
pub fn amm_config_address(index: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::AMM_CONFIG_SEED, &index.to_be_bytes()], &crate::ID)
}

/// ["pool", amm_config, mint_0, mint_1], mints sorted first
pub fn pool_address(amm_config: &Pubkey, mint_a: &Pubkey, mint_b: &Pubkey) -> (Pubkey, u8) {
    let (mint_0, mint_1) = sort_mints(*mint_a, *mint_b);
    Pubkey::find_program_address(
        &[
            seeds::POOL_SEED,
            amm_config.as_ref(),
            mint_0.as_ref(),
            mint_1.as_ref(),
        ],
        &crate::ID,
    )
}

/// ["pool_vault", pool, mint]
pub fn pool_vault_address(pool: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::POOL_VAULT_SEED, pool.as_ref(), mint.as_ref()],
        &crate::ID,
    )
}

/// ["tick_array", pool, start_index BE]
pub fn tick_array_address(pool: &Pubkey, start_index: i32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::TICK_ARRAY_SEED, pool.as_ref(), &start_index.to_be_bytes()],
        &crate::ID,
    )
}

/// ["tick_array_bitmap", pool]
pub fn tick_array_bitmap_address(pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::TICK_ARRAY_BITMAP_SEED, pool.as_ref()], &crate::ID)
}

/// ["observation", pool]
pub fn observation_address(pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::OBSERVATION_SEED, pool.as_ref()], &crate::ID)
}

/// ["position", nft_mint]
pub fn position_address(nft_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::POSITION_SEED, nft_mint.as_ref()], &crate::ID)
}

/// ["hooks"]
pub fn hooks_address() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::HOOKS_SEED], &crate::ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_address_ignores_mint_order() {
        let config = amm_config_address(1).0;
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        assert_eq!(
            pool_address(&config, &mint_a, &mint_b),
            pool_address(&config, &mint_b, &mint_a)
        );
    }

    #[test]
    fn test_addresses_are_distinct_per_input() {
        let pool = Pubkey::new_unique();
        assert_ne!(amm_config_address(0).0, amm_config_address(1).0);
        assert_ne!(tick_array_address(&pool, -3000).0, tick_array_address(&pool, 3000).0);
        assert_ne!(tick_array_bitmap_address(&pool).0, observation_address(&pool).0);
        assert_eq!(hooks_address(), hooks_address());
    }

    #[test]
    fn test_tick_array_seed_is_big_endian() {
        let pool = Pubkey::new_unique();
        let expected = Pubkey::find_program_address(
            &[b"tick_array", pool.as_ref(), &[0xff, 0xff, 0xf4, 0x48]],
            &crate::ID,
        );
        assert_eq!(tick_array_address(&pool, -3000), expected);
    }

    #[test]
    fn test_sort_mints() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        assert_eq!(sort_mints(b, a), (a, b));
        assert_eq!(sort_mints(a, b), (a, b));
    }
}
