//! The variant-agnostic `GameState` capability bound (spec §3 "GameState",
//! design note §9: "model this as a bounded generic parameter ... over the
//! components that must be variant-agnostic (MCTS, self-play, arena,
//! trainer)"). Both `animal::AnimalState` and `full::FullState` implement
//! this trait; everything above the rule engines (negamax, MCTS, self-play,
//! the trainer, the arena, the generational loop) is written once, generic
//! over `S: GameState`.

use crate::error::ShogiResult;
use crate::player::Player;

/// Dense input-plane encoding of a position, always from the current
/// player's perspective (spec §4.D "Tensor planes").
///
/// `data` is row-major within each plane: index `channel * rows * cols +
/// row * cols + col`.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorPlanes {
    pub data: Vec<f32>,
    pub channels: usize,
    pub rows: usize,
    pub cols: usize,
}

impl TensorPlanes {
    pub fn new(channels: usize, rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; channels * rows * cols],
            channels,
            rows,
            cols,
        }
    }

    pub fn plane_mut(&mut self, channel: usize) -> &mut [f32] {
        let stride = self.rows * self.cols;
        let start = channel * stride;
        &mut self.data[start..start + stride]
    }

    pub fn fill_plane(&mut self, channel: usize, value: f32) {
        self.plane_mut(channel).iter_mut().for_each(|x| *x = value);
    }

    pub fn set(&mut self, channel: usize, row: usize, col: usize, value: f32) {
        let stride = self.rows * self.cols;
        self.data[channel * stride + row * self.cols + col] = value;
    }
}

/// A dense, non-negative action index (spec §3 "ActionIndex"). A single
/// integer carries all information needed to reconstruct a move; codecs
/// live per-variant (`animal::codec`, `full::codec`).
pub type ActionIndex = u32;

/// The capability bound shared by both variants. Every method here is a
/// pure function of `&self` except `apply_move`, which returns a fresh
/// state (spec §3: "Lifecycles are all functional").
pub trait GameState: Clone + Send + Sync + 'static {
    /// Total size of the dense action space for this variant (180 for
    /// animal shogi, 13689 for full shogi).
    const ACTION_SPACE_SIZE: usize;
    /// Number of input-plane channels `to_tensor_planes` produces.
    const PLANE_CHANNELS: usize;
    const BOARD_ROWS: usize;
    const BOARD_COLS: usize;

    fn current_player(&self) -> Player;

    /// `Some(player)` if the game has concluded in that player's favour,
    /// `None` for an ongoing game. Draws are represented at a higher layer
    /// (self-play/arena) as "terminal with no winner", not as a distinct
    /// variant here, matching spec §3/§4.D.
    fn winner(&self) -> Option<Player>;

    /// A state is terminal exactly when it has a winner or the side to
    /// move has no legal moves; both rule engines fold the latter into
    /// `winner` already, so the default holds for both variants.
    fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    fn legal_moves(&self) -> Vec<ActionIndex>;

    /// Apply `action`. Undefined (the rule engines may panic) when `action`
    /// is not present in `self.legal_moves()` — callers that accept
    /// untrusted input should check membership first and surface
    /// `ShogiError::InvalidAction` themselves.
    fn apply_move(&self, action: ActionIndex) -> Self;

    /// Fallible variant of `apply_move` for boundary code that accepts
    /// caller-supplied action indices (spec §7 `InvalidAction`).
    fn try_apply_move(&self, action: ActionIndex) -> ShogiResult<Self>
    where
        Self: Sized,
    {
        if self.is_terminal() {
            return Err(crate::error::ShogiError::TerminalState);
        }
        if !self.legal_moves().contains(&action) {
            return Err(crate::error::ShogiError::InvalidAction { action });
        }
        Ok(self.apply_move(action))
    }

    fn to_tensor_planes(&self) -> TensorPlanes;

    fn action_space_size(&self) -> usize {
        Self::ACTION_SPACE_SIZE
    }
}

/// Static material evaluation, from the current player's perspective
/// (spec §4.F). Kept separate from `GameState` because the piece-value
/// table differs per variant and has no meaning at the generic-search
/// level beyond "a number used by negamax".
pub trait MaterialEval: GameState {
    /// Material score of the position, current player's perspective,
    /// ignoring terminal status (negamax/eval.rs layer that on top).
    fn material_score(&self) -> f32;
}
