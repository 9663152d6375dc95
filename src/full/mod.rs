//! Full Shogi (本将棋): the standard 9x9 variant (spec §4.A, §4.C, §4.D).

pub mod board;
pub mod codec;
pub mod moves;
pub mod state;
pub mod types;

pub use state::FullState;
