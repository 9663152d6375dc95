//! Variant constants and movement tables for Animal Shogi (どうぶつしょうぎ),
//! a 3 column x 4 row board (spec §4.A).

use strum_macros::EnumIter;

pub const ROWS: usize = 4;
pub const COLS: usize = 3;
pub const NUM_SQUARES: usize = ROWS * COLS;

/// Piece kinds. Integer indices 0..4 are part of the tensor-plane contract
/// (spec §3 "PieceKind (animal)") — do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, PartialOrd, Ord)]
pub enum PieceKind {
    Chick = 0,
    Giraffe = 1,
    Elephant = 2,
    Lion = 3,
    Hen = 4,
}

impl PieceKind {
    pub const COUNT: usize = 5;

    pub fn as_index(self) -> usize {
        self as usize
    }
}

/// Kinds that may be held in hand, in the order the move codec's
/// `drop_kind_idx` enumerates them (spec §6.1).
pub const HAND_PIECE_KINDS: [PieceKind; 3] =
    [PieceKind::Chick, PieceKind::Giraffe, PieceKind::Elephant];

pub fn hand_kind_index(kind: PieceKind) -> Option<usize> {
    HAND_PIECE_KINDS.iter().position(|&k| k == kind)
}

/// One-square step offsets `(row_delta, col_delta)` from FIRST's
/// perspective (forward = decreasing row). Animal shogi has no sliding or
/// knight-jump pieces.
pub fn step_offsets(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Chick => &[(-1, 0)],
        PieceKind::Giraffe => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
        PieceKind::Elephant => &[(-1, -1), (-1, 1), (1, -1), (1, 1)],
        PieceKind::Lion => &[
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ],
        PieceKind::Hen => &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0)],
    }
}

/// A piece is (kind, owner), immutable (spec §3 "Piece").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: crate::player::Player,
}

impl Piece {
    pub fn new(kind: PieceKind, owner: crate::player::Player) -> Self {
        Self { kind, owner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_kind_indices_match_drop_encoding_order() {
        assert_eq!(hand_kind_index(PieceKind::Chick), Some(0));
        assert_eq!(hand_kind_index(PieceKind::Giraffe), Some(1));
        assert_eq!(hand_kind_index(PieceKind::Elephant), Some(2));
        assert_eq!(hand_kind_index(PieceKind::Lion), None);
        assert_eq!(hand_kind_index(PieceKind::Hen), None);
    }
}
