//! Animal Shogi (どうぶつしょうぎ): the 3x4 variant (spec §4.A-§4.D).

pub mod board;
pub mod codec;
pub mod moves;
pub mod state;
pub mod types;

pub use state::AnimalState;
