pub mod approve_hook_program;
pub mod close_position;
pub mod collect_protocol_fee;
pub mod create_amm_config;
pub mod create_pool;
pub mod decrease_liquidity;
pub mod increase_liquidity;
pub mod initialize_hook_programs;
pub mod initialize_tick_array;
pub mod modify_position;
pub mod open_position;
pub mod register_hook_program;
pub mod swap;

pub use approve_hook_program::*;
pub use close_position::*;
pub use collect_protocol_fee::*;
pub use create_amm_config::*;
pub use create_pool::*;
pub use decrease_liquidity::*;
pub use increase_liquidity::*;
pub use initialize_hook_programs::*;
pub use initialize_tick_array::*;
pub use modify_position::*;
pub use open_position::*;
pub use register_hook_program::*;
pub use swap::*;
