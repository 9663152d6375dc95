//! Static evaluation used by negamax (spec §4.F).
//!
//! Terminal positions dominate material score by a wide margin so that
//! negamax always prefers a forced win over any material gain, and mate
//! distance is folded in so it prefers the *fastest* win and the *slowest*
//! loss (spec §4.F "mate-distance scoring").

use crate::game::{GameState, MaterialEval};
use crate::player::Player;

/// A terminal position is worth strictly more than any reachable material
/// score; both variants' material tables top out around 100 (a king/lion),
/// so 1000 leaves a wide margin.
pub const TERMINAL_SCORE: f32 = 1000.0;

/// Evaluate `state` from its current player's perspective, folding in
/// terminal status and mate distance.
pub fn evaluate<S: MaterialEval>(state: &S, ply_from_root: u32) -> f32 {
    match state.winner() {
        Some(winner) if winner == state.current_player() => TERMINAL_SCORE - ply_from_root as f32,
        Some(_) => -(TERMINAL_SCORE - ply_from_root as f32),
        None => state.material_score(),
    }
}

/// `state.winner()`, reinterpreted as "did `perspective` win" for code that
/// already has a fixed player in mind (the arena, self-play outcome
/// bookkeeping).
pub fn winner_is(state: &impl MaterialEval, perspective: Player) -> Option<bool> {
    state.winner().map(|w| w == perspective)
}
