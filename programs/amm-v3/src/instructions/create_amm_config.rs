use anchor_lang::prelude::*;

use crate::constants::seeds;
use crate::events::ConfigCreatedEvent;
use crate::state::AmmConfig;

/// Create a fee config
/// Only the protocol admin can call this
#[derive(Accounts)]
#[instruction(index: u16)]
pub struct CreateAmmConfig<'info> {
    /// Protocol admin, recorded as config owner
    #[account(mut)]
    pub owner: Signer<'info>,

    /// The config account to initialize
    #[account(
        init,
        payer = owner,
        space = AmmConfig::LEN,
        seeds = [seeds::AMM_CONFIG_SEED, &index.to_be_bytes()],
        bump
    )]
    pub amm_config: Account<'info, AmmConfig>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Create config handler
pub fn handler(
    ctx: Context<CreateAmmConfig>,
    index: u16,
    tick_spacing: u16,
    trade_fee_rate: u32,
    protocol_fee_rate: u32,
    fund_fee_rate: u32,
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let amm_config = &mut ctx.accounts.amm_config;
    amm_config.initialize(
        &owner,
        &crate::admin::ID,
        ctx.bumps.amm_config,
        index,
        tick_spacing,
        trade_fee_rate,
        protocol_fee_rate,
        fund_fee_rate,
    )?;

    emit!(ConfigCreatedEvent {
        amm_config: amm_config.key(),
        index,
        tick_spacing,
        trade_fee_rate,
        protocol_fee_rate,
        fund_fee_rate,
    });

    msg!("AMM config {} created", index);
    msg!("Tick spacing: {}", tick_spacing);
    msg!(
        "Fee rates: trade {}, protocol {}, fund {}",
        trade_fee_rate,
        protocol_fee_rate,
        fund_fee_rate
    );

    Ok(())
}
