//! Dense `ActionIndex` encoding for Full Shogi (spec §6.2).
//!
//! Action space layout, total size 13689:
//! - `[0, 6561)`: board moves without promotion, `from * 81 + to`.
//! - `[6561, 13122)`: board moves with promotion, `6561 + from * 81 + to`.
//! - `[13122, 13689)`: drops, `13122 + drop_kind_idx * 81 + to` (7 hand
//!   kinds x 81 squares = 567).
//!
//! 13689 is authoritative here, not the 2187 seen in stale reference
//! configuration — see the design notes for why.

use crate::full::types::{hand_kind_index, PieceKind, HAND_PIECE_KINDS, NUM_SQUARES};
use crate::game::ActionIndex;

pub const PROMO_BASE: u32 = (NUM_SQUARES * NUM_SQUARES) as u32;
pub const DROP_BASE: u32 = PROMO_BASE * 2;
pub const ACTION_SPACE_SIZE: usize = DROP_BASE as usize + HAND_PIECE_KINDS.len() * NUM_SQUARES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Board {
        from: usize,
        to: usize,
        promote: bool,
    },
    Drop {
        kind: PieceKind,
        to: usize,
    },
}

pub fn encode_board_move(from: usize, to: usize, promote: bool) -> ActionIndex {
    let base = if promote { PROMO_BASE } else { 0 };
    base + (from * NUM_SQUARES + to) as ActionIndex
}

pub fn encode_drop_move(kind: PieceKind, to: usize) -> ActionIndex {
    let kind_idx = hand_kind_index(kind).expect("drop kind must be hand-eligible");
    DROP_BASE + (kind_idx * NUM_SQUARES + to) as ActionIndex
}

pub fn decode_move(action: ActionIndex) -> Move {
    if action < PROMO_BASE {
        let action = action as usize;
        Move::Board {
            from: action / NUM_SQUARES,
            to: action % NUM_SQUARES,
            promote: false,
        }
    } else if action < DROP_BASE {
        let adjusted = (action - PROMO_BASE) as usize;
        Move::Board {
            from: adjusted / NUM_SQUARES,
            to: adjusted % NUM_SQUARES,
            promote: true,
        }
    } else {
        let adjusted = (action - DROP_BASE) as usize;
        let kind_idx = adjusted / NUM_SQUARES;
        let to = adjusted % NUM_SQUARES;
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
    fn action_space_size_is_13689() {
        assert_eq!(ACTION_SPACE_SIZE, 13689);
    }

    #[test]
    fn board_move_round_trips_with_and_without_promotion() {
        for &promote in &[false, true] {
            let action = encode_board_move(10, 20, promote);
            assert_eq!(
                decode_move(action),
                Move::Board {
                    from: 10,
                    to: 20,
                    promote
                }
            );
        }
    }

    #[test]
    fn drop_move_round_trips() {
        for &kind in HAND_PIECE_KINDS.iter() {
            let action = encode_drop_move(kind, 40);
            assert_eq!(decode_move(action), Move::Drop { kind, to: 40 });
        }
    }

    #[test]
    fn ranges_do_not_overlap() {
        assert!(encode_board_move(80, 80, false) < PROMO_BASE);
        assert!(encode_board_move(80, 80, true) < DROP_BASE);
        assert!(encode_drop_move(PieceKind::Rook, 80) < ACTION_SPACE_SIZE as u32);
    }
}
