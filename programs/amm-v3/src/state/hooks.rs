use anchor_lang::prelude::*;

use crate::constants::MAX_HOOK_PROGRAMS;
use crate::errors::AmmError;

/// Governance status of a transfer-hook program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum HookStatus {
    /// Registered, waiting for the authority
    Pending,
    /// Allowed to run during pool transfers
    Approved,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct HookProgramEntry {
    pub program_id: Pubkey,
    pub status: HookStatus,
}

/// Registry of transfer-hook programs the pools may invoke
/// PDA: ["hooks"]
///
/// A program id appears at most once, so it is never pending and approved at
/// the same time.
#[account]
#[derive(Debug, Default)]
pub struct HooksAccount {
    /// Signer allowed to approve pending programs
    pub authority: Pubkey,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Registered programs with their status
    pub hook_programs: Vec<HookProgramEntry>,
}

impl HooksAccount {
    pub const LEN: usize = 8 +  // discriminator
        32 +                     // authority
        1 +                      // bump
        4 +                      // vec length
        2 * MAX_HOOK_PROGRAMS * HookProgramEntry::INIT_SPACE;

    pub fn initialize(&mut self, authority: Pubkey, bump: u8) {
        self.authority = authority;
        self.bump = bump;
        self.hook_programs = Vec::new();
    }

    /// Current status of `program_id`, `None` when unregistered
    pub fn status_of(&self, program_id: &Pubkey) -> Option<HookStatus> {
        self.hook_programs
            .iter()
            .find(|entry| entry.program_id == *program_id)
            .map(|entry| entry.status)
    }

    fn count(&self, status: HookStatus) -> usize {
        self.hook_programs
            .iter()
            .filter(|entry| entry.status == status)
            .count()
    }

    pub fn pending_programs(&self) -> impl Iterator<Item = &Pubkey> {
        self.programs_with(HookStatus::Pending)
    }

    pub fn approved_programs(&self) -> impl Iterator<Item = &Pubkey> {
        self.programs_with(HookStatus::Approved)
    }

    fn programs_with(&self, status: HookStatus) -> impl Iterator<Item = &Pubkey> {
        self.hook_programs
            .iter()
            .filter(move |entry| entry.status == status)
            .map(|entry| &entry.program_id)
    }

    /// Unregistered -> Pending
    pub fn register(&mut self, program_id: Pubkey) -> Result<()> {
        require!(
            self.status_of(&program_id).is_none(),
            AmmError::AlreadyRegistered
        );
        require!(
            self.count(HookStatus::Pending) < MAX_HOOK_PROGRAMS,
            AmmError::TooManyHooks
        );
        self.hook_programs.push(HookProgramEntry {
            program_id,
            status: HookStatus::Pending,
        });
        Ok(())
    }

    /// Pending -> Approved, authority only
    pub fn approve(&mut self, signer: &Pubkey, program_id: &Pubkey) -> Result<()> {
        require_keys_eq!(*signer, self.authority, AmmError::Unauthorized);
        let index = self
            .hook_programs
            .iter()
            .position(|entry| entry.program_id == *program_id && entry.status == HookStatus::Pending)
            .ok_or(AmmError::NotPending)?;
        require!(
            self.count(HookStatus::Approved) < MAX_HOOK_PROGRAMS,
            AmmError::TooManyHooks
        );
        self.hook_programs[index].status = HookStatus::Approved;
        Ok(())
    }

    /// Fail unless `program_id` is approved
    pub fn require_approved(&self, program_id: &Pubkey) -> Result<()> {
        require!(
            self.status_of(program_id) == Some(HookStatus::Approved),
            AmmError::HookNotApproved
        );
        Ok(())
    }
}
