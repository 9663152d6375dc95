//! Dense `ActionIndex` encoding for Animal Shogi (spec §6.1).
//!
//! Action space layout, total size 180:
//! - `[0, 144)`: board moves, `from * 12 + to` (12 squares x 12 squares).
//! - `[144, 180)`: drops, `144 + drop_kind_idx * 12 + to` (3 hand kinds x 12
//!   squares).

use crate::animal::types::{hand_kind_index, PieceKind, HAND_PIECE_KINDS, NUM_SQUARES};
use crate::game::ActionIndex;

pub const DROP_OFFSET: u32 = (NUM_SQUARES * NUM_SQUARES) as u32;
pub const ACTION_SPACE_SIZE: usize = DROP_OFFSET as usize + HAND_PIECE_KINDS.len() * NUM_SQUARES;

/// A decoded move: either a board move or a drop from hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Board { from: usize, to: usize },
    Drop { kind: PieceKind, to: usize },
}

pub fn encode_board_move(from: usize, to: usize) -> ActionIndex {
    (from * NUM_SQUARES + to) as ActionIndex
}

pub fn encode_drop_move(kind: PieceKind, to: usize) -> ActionIndex {
    let kind_idx = hand_kind_index(kind).expect("drop kind must be hand-eligible");
    DROP_OFFSET + (kind_idx * NUM_SQUARES + to) as ActionIndex
}

pub fn decode_move(action: ActionIndex) -> Move {
    if action < DROP_OFFSET {
        let action = action as usize;
        Move::Board {
            from: action / NUM_SQUARES,
            to: action % NUM_SQUARES,
        }
    } else {
        let offset = (action - DROP_OFFSET) as usize;
        let kind_idx = offset / NUM_SQUARES;
        let to = offset % NUM_SQUARES;
        Move::Drop {
            kind: HAND_PIECE_KINDS[kind_idx],
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_move_round_trips() {
        for from in 0..NUM_SQUARES {
            for to in 0..NUM_SQUARES {
                let action = encode_board_move(from, to);
                assert_eq!(decode_move(action), Move::Board { from, to });
            }
        }
    }

    #[test]
    fn drop_move_round_trips() {
        for &kind in HAND_PIECE_KINDS.iter() {
            for to in 0..NUM_SQUARES {
                let action = encode_drop_move(kind, to);
                assert_eq!(decode_move(action), Move::Drop { kind, to });
            }
        }
    }

    #[test]
    fn action_space_size_is_180() {
        assert_eq!(ACTION_SPACE_SIZE, 180);
    }

    #[test]
    fn board_and_drop_ranges_do_not_overlap() {
        let max_board = encode_board_move(NUM_SQUARES - 1, NUM_SQUARES - 1);
        assert!(max_board < DROP_OFFSET);
    }
}
