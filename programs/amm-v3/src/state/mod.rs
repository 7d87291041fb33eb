pub mod config;
pub mod hooks;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_array;
pub mod tick_array_bitmap;

pub use config::*;
pub use hooks::*;
pub use oracle::*;
pub use pool::*;
pub use position::*;
pub use tick::*;
pub use tick_array::*;
pub use tick_array_bitmap::*;
