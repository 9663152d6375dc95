//! Legal move generation and application for Animal Shogi (spec §4.B, §4.D).
//!
//! Unlike full shogi, animal shogi applies **no check-safety filtering**:
//! capturing the opponent's lion is itself the win condition, so a move that
//! leaves one's own lion attacked is legal (spec §4.D "no check-safety
//! filtering on moves; lion capture is itself the win condition").

use crate::animal::board::Board;
use crate::animal::codec::{encode_board_move, encode_drop_move, Move};
use crate::animal::types::{step_offsets, PieceKind, COLS, HAND_PIECE_KINDS, NUM_SQUARES, ROWS};
use crate::game::ActionIndex;
use crate::player::Player;

fn in_bounds(row: i8, col: i8) -> bool {
    row >= 0 && row < ROWS as i8 && col >= 0 && col < COLS as i8
}

/// Mirror a FIRST-perspective step offset for SECOND, whose forward
/// direction is increasing row.
fn oriented_offset(owner: Player, offset: (i8, i8)) -> (i8, i8) {
    match owner {
        Player::First => offset,
        Player::Second => (-offset.0, -offset.1),
    }
}

/// The last row a pawn promotes on reaching, from `owner`'s perspective
/// (spec §4.D "Chick promotes to Hen on reaching the far row").
fn promotion_row(owner: Player) -> usize {
    match owner {
        Player::First => 0,
        Player::Second => ROWS - 1,
    }
}

pub fn legal_moves(board: &Board, player: Player) -> Vec<ActionIndex> {
    let mut moves = Vec::new();

    for from in 0..NUM_SQUARES {
        let (row, col) = (from / COLS, from % COLS);
        let Some(piece) = board.piece_at(row, col) else {
            continue;
        };
        if piece.owner != player {
            continue;
        }
        for &offset in step_offsets(piece.kind) {
            let (dr, dc) = oriented_offset(player, offset);
            let (nr, nc) = (row as i8 + dr, col as i8 + dc);
            if !in_bounds(nr, nc) {
                continue;
            }
            let to = nr as usize * COLS + nc as usize;
            let occupant = board.piece_at(nr as usize, nc as usize);
            if occupant.is_some_and(|p| p.owner == player) {
                continue;
            }
            moves.push(encode_board_move(from, to));
        }
    }

    for &kind in HAND_PIECE_KINDS.iter() {
        if !board.hands[player.as_index()].contains(&kind) {
            continue;
        }
        for to in 0..NUM_SQUARES {
            let (row, col) = (to / COLS, to % COLS);
            if board.piece_at(row, col).is_some() {
                continue;
            }
            moves.push(encode_drop_move(kind, to));
        }
    }

    moves
}

pub fn apply_move(board: &Board, player: Player, action: ActionIndex) -> Board {
    match crate::animal::codec::decode_move(action) {
        Move::Board { from, to } => {
            let (fr, fc) = (from / COLS, from % COLS);
            let (tr, tc) = (to / COLS, to % COLS);
            let piece = board
                .piece_at(fr, fc)
                .expect("apply_move called with a from-square holding no piece");

            let mut next = board.set_piece(fr, fc, None);
            if let Some(captured) = board.piece_at(tr, tc) {
                next = next.add_to_hand(player, captured.kind);
            }

            let promoted = piece.kind == PieceKind::Chick && tr == promotion_row(player);
            let landing_kind = if promoted { PieceKind::Hen } else { piece.kind };
            next.set_piece(tr, tc, Some(crate::animal::types::Piece::new(landing_kind, player)))
        }
        Move::Drop { kind, to } => {
            let (tr, tc) = (to / COLS, to % COLS);
            let next = board
                .remove_from_hand(player, kind)
                .expect("apply_move called with a drop kind not held in hand");
            next.set_piece(tr, tc, Some(crate::animal::types::Piece::new(kind, player)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::types::Piece;
    use proptest::prelude::*;

    #[test]
    fn initial_position_has_legal_moves_for_both_sides() {
        let board = Board::initial();
        assert!(!legal_moves(&board, Player::First).is_empty());
        assert!(!legal_moves(&board, Player::Second).is_empty());
    }

    #[test]
    fn drop_targets_only_empty_squares() {
        let board = Board::initial().add_to_hand(Player::First, PieceKind::Chick);
        let moves = legal_moves(&board, Player::First);
        for action in moves {
            if let Move::Drop { to, .. } = crate::animal::codec::decode_move(action) {
                let (r, c) = (to / COLS, to % COLS);
                assert!(board.piece_at(r, c).is_none());
            }
        }
    }

    #[test]
    fn chick_promotes_to_hen_on_far_row() {
        let board = Board::empty().set_piece(1, 1, Some(Piece::new(PieceKind::Chick, Player::First)));
        let action = encode_board_move(1 * COLS + 1, 0 * COLS + 1);
        let next = apply_move(&board, Player::First, action);
        let landed = next.piece_at(0, 1).unwrap();
        assert_eq!(landed.kind, PieceKind::Hen);
    }

    #[test]
    fn capturing_adds_unpromoted_kind_to_hand() {
        let board = Board::empty()
            .set_piece(2, 1, Some(Piece::new(PieceKind::Giraffe, Player::First)))
            .set_piece(1, 1, Some(Piece::new(PieceKind::Hen, Player::Second)));
        let action = encode_board_move(2 * COLS + 1, 1 * COLS + 1);
        let next = apply_move(&board, Player::First, action);
        assert_eq!(next.hands[Player::First.as_index()], vec![PieceKind::Chick]);
    }

    #[test]
    fn own_piece_blocks_move_but_not_capture_of_opponent() {
        let board = Board::empty()
            .set_piece(2, 1, Some(Piece::new(PieceKind::Giraffe, Player::First)))
            .set_piece(1, 1, Some(Piece::new(PieceKind::Chick, Player::First)));
        let moves = legal_moves(&board, Player::First);
        let blocked = encode_board_move(2 * COLS + 1, 1 * COLS + 1);
        assert!(!moves.contains(&blocked));
    }

    proptest! {
        /// A drop target is always an empty square, across randomly played
        /// games, not just the starting position.
        #[test]
        fn drop_targets_stay_empty_across_random_play(seed in any::<u64>()) {
            use rand::rngs::StdRng;
            use rand::Rng;
            use rand::SeedableRng;

            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::initial().add_to_hand(Player::First, PieceKind::Chick);
            let mut player = Player::First;

            for _ in 0..40 {
                let moves = legal_moves(&board, player);
                if moves.is_empty() {
                    break;
                }
                for &action in &moves {
                    if let Move::Drop { to, .. } = crate::animal::codec::decode_move(action) {
                        let (r, c) = (to / COLS, to % COLS);
                        prop_assert!(board.piece_at(r, c).is_none());
                    }
                }
                let action = moves[rng.random_range(0..moves.len())];
                board = apply_move(&board, player, action);
                player = player.opponent();
            }
        }
    }
}
