use anchor_lang::prelude::*;

use crate::constants::oracle::OBSERVATION_NUM;

/// Oracle observation - one tick accumulator sample
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Block timestamp of the observation
    pub block_timestamp: u32,

    /// Cumulative tick value (tick * time elapsed)
    pub tick_cumulative: i64,
}

impl Observation {
    pub const LEN: usize =
        4 +     // block_timestamp
        8;      // tick_cumulative
}

/// Ring of recent observations written after every swap
/// PDA: ["observation", pool]
#[account]
#[derive(Debug, Default)]
pub struct ObservationState {
    /// The pool this oracle belongs to
    pub pool_id: Pubkey,

    /// Whether the first observation has been written
    pub initialized: bool,

    /// Index of the most recent observation
    pub observation_index: u16,

    pub observations: [Observation; OBSERVATION_NUM],
}

impl ObservationState {
    pub const LEN: usize = 8 +  // discriminator
        32 +                     // pool_id
        1 +                      // initialized
        2 +                      // observation_index
        Observation::LEN * OBSERVATION_NUM;

    pub fn initialize(&mut self, pool_id: Pubkey) {
        self.pool_id = pool_id;
        self.initialized = false;
        self.observation_index = 0;
        self.observations = [Observation::default(); OBSERVATION_NUM];
    }

    /// Record the tick in effect until `block_timestamp`
    ///
    /// At most one observation per timestamp; the ring overwrites the oldest.
    pub fn update(&mut self, block_timestamp: u32, tick: i32) {
        if !self.initialized {
            self.initialized = true;
            self.observation_index = 0;
            self.observations[0] = Observation {
                block_timestamp,
                tick_cumulative: 0,
            };
            return;
        }

        let last = self.observations[self.observation_index as usize];
        if block_timestamp <= last.block_timestamp {
            return;
        }

        let delta = i64::from(block_timestamp - last.block_timestamp);
        let next_index = (self.observation_index as usize + 1) % OBSERVATION_NUM;
        self.observations[next_index] = Observation {
            block_timestamp,
            tick_cumulative: last
                .tick_cumulative
                .wrapping_add(i64::from(tick).wrapping_mul(delta)),
        };
        self.observation_index = next_index as u16;
    }
}
