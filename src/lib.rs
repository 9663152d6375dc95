//! `shogi_zero`: rule engines, search, neural evaluator, and self-play
//! training loop for Animal Shogi and Full Shogi (see spec.md / SPEC_FULL.md
//! §2 for the component table this module layout mirrors).
//!
//! The crate is organized bottom-up: variant-specific rule engines
//! (`animal`, `full`) each implement the shared [`game::GameState`]
//! capability bound, and everything above that line — [`negamax`],
//! [`mcts`], [`selfplay`], [`trainer`], [`arena`], [`training_loop`] — is
//! written once, generic over `S: GameState`, rather than duplicated per
//! variant or dispatched through a trait object.

pub mod animal;
pub mod arena;
pub mod error;
pub mod eval;
pub mod full;
pub mod game;
pub mod mcts;
pub mod negamax;
pub mod nn;
pub mod player;
pub mod progress;
pub mod selfplay;
pub mod trainer;
pub mod training_loop;

pub use error::{ShogiError, ShogiResult};
pub use game::GameState;
pub use player::Player;
