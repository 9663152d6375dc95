//! `FullState`: the `GameState` facade for Full Shogi (spec §4.D).

use crate::full::board::Board;
use crate::full::codec::ACTION_SPACE_SIZE;
use crate::full::moves;
use crate::full::types::{PieceKind, COLS, HAND_PIECE_KINDS, NUM_SQUARES, ROWS};
use crate::game::{ActionIndex, GameState, MaterialEval, TensorPlanes};
use crate::player::Player;

pub const PLANE_CHANNELS: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullState {
    board: Board,
    current_player: Player,
}

impl FullState {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            current_player: Player::First,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Construct a state from an arbitrary board and side to move. Used by
    /// search/test code that needs to set up specific positions rather than
    /// replaying moves from the start position.
    pub fn from_parts(board: Board, current_player: Player) -> Self {
        Self { board, current_player }
    }

    /// King-missing check, then no-legal-moves (spec §4.D): king capture
    /// should never arise given full legal filtering, but is still checked
    /// defensively since it is cheaper than scanning for checkmate directly.
    fn compute_winner(board: &Board, current_player: Player) -> Option<Player> {
        if board.find_king(Player::First).is_none() {
            return Some(Player::Second);
        }
        if board.find_king(Player::Second).is_none() {
            return Some(Player::First);
        }
        if moves::legal_moves(board, current_player).is_empty() {
            return Some(current_player.opponent());
        }
        None
    }
}

impl Default for FullState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for FullState {
    const ACTION_SPACE_SIZE: usize = ACTION_SPACE_SIZE;
    const PLANE_CHANNELS: usize = PLANE_CHANNELS;
    const BOARD_ROWS: usize = ROWS;
    const BOARD_COLS: usize = COLS;

    fn current_player(&self) -> Player {
        self.current_player
    }

    fn winner(&self) -> Option<Player> {
        Self::compute_winner(&self.board, self.current_player)
    }

    fn legal_moves(&self) -> Vec<ActionIndex> {
        if Self::compute_winner(&self.board, self.current_player).is_some() {
            return Vec::new();
        }
        moves::legal_moves(&self.board, self.current_player)
    }

    fn apply_move(&self, action: ActionIndex) -> Self {
        let board = moves::apply_move(&self.board, self.current_player, action);
        Self {
            board,
            current_player: self.current_player.opponent(),
        }
    }

    fn to_tensor_planes(&self) -> TensorPlanes {
        let mut planes = TensorPlanes::new(PLANE_CHANNELS, ROWS, COLS);
        let me = self.current_player;
        let opp = me.opponent();

        for square in 0..NUM_SQUARES {
            let (row, col) = (square / COLS, square % COLS);
            if let Some(piece) = self.board.piece_at(row, col) {
                let base = if piece.owner == me { 0 } else { 14 };
                planes.set(base + piece.kind.as_index(), row, col, 1.0);
            }
        }

        for (i, &kind) in HAND_PIECE_KINDS.iter().enumerate() {
            let my_count = self.board.hands[me.as_index()].iter().filter(|&&k| k == kind).count() as f32;
            let opp_count = self.board.hands[opp.as_index()].iter().filter(|&&k| k == kind).count() as f32;
            if my_count > 0.0 {
                planes.fill_plane(28 + i, my_count);
            }
            if opp_count > 0.0 {
                planes.fill_plane(35 + i, opp_count);
            }
        }

        planes.fill_plane(42, if me == Player::First { 1.0 } else { 0.0 });

        planes
    }
}

impl MaterialEval for FullState {
    fn material_score(&self) -> f32 {
        fn value(kind: PieceKind) -> f32 {
            match kind {
                PieceKind::Pawn => 1.0,
                PieceKind::Lance
                | PieceKind::Knight
                | PieceKind::Silver
                | PieceKind::Gold
                | PieceKind::Bishop
                | PieceKind::Rook => 3.0,
                PieceKind::King => 100.0,
                PieceKind::ProPawn
                | PieceKind::ProLance
                | PieceKind::ProKnight
                | PieceKind::ProSilver
                | PieceKind::Horse
                | PieceKind::Dragon => 5.0,
            }
        }

        let me = self.current_player;
        let opp = me.opponent();
        let mut score = 0.0;

        for square in 0..NUM_SQUARES {
            let (row, col) = (square / COLS, square % COLS);
            if let Some(piece) = self.board.piece_at(row, col) {
                let v = value(piece.kind);
                score += if piece.owner == me { v } else { -v };
            }
        }
        for &kind in self.board.hands[me.as_index()].iter() {
            score += value(kind.base_of());
        }
        for &kind in self.board.hands[opp.as_index()].iter() {
            score -= value(kind.base_of());
        }

        score
    }
}
