//! Legal move generation and application for Full Shogi (spec §4.C, §4.D).
//!
//! Unlike animal shogi, full shogi filters pseudo-legal moves down to moves
//! that do not leave the mover's own king in check, and additionally
//! restricts pawn drops under 二歩 (nifu), 行き所のない駒 (dead-piece drops),
//! and 打ち歩詰め (uchifuzume, dropped-pawn checkmate).

use crate::full::board::Board;
use crate::full::codec::{encode_board_move, encode_drop_move, Move};
use crate::full::types::{
    slide_offsets, step_offsets, PieceKind, COLS, DRAGON_EXTRA_STEPS, HAND_PIECE_KINDS,
    HORSE_EXTRA_STEPS, KNIGHT_OFFSETS, NUM_SQUARES, ROWS,
};
use crate::game::ActionIndex;
use crate::player::Player;

fn in_bounds(row: i8, col: i8) -> bool {
    row >= 0 && row < ROWS as i8 && col >= 0 && col < COLS as i8
}

fn oriented(owner: Player, offset: (i8, i8)) -> (i8, i8) {
    match owner {
        Player::First => offset,
        Player::Second => (-offset.0, -offset.1),
    }
}

fn in_promotion_zone(player: Player, row: usize) -> bool {
    match player {
        Player::First => row <= 2,
        Player::Second => row >= 6,
    }
}

fn must_promote(kind: PieceKind, player: Player, dest_row: usize) -> bool {
    match kind {
        PieceKind::Pawn | PieceKind::Lance => match player {
            Player::First => dest_row == 0,
            Player::Second => dest_row == ROWS - 1,
        },
        PieceKind::Knight => match player {
            Player::First => dest_row <= 1,
            Player::Second => dest_row >= ROWS - 2,
        },
        _ => false,
    }
}

fn push_move_with_promotion(
    moves: &mut Vec<ActionIndex>,
    from: usize,
    to: usize,
    kind: PieceKind,
    player: Player,
    from_row: usize,
    to_row: usize,
) {
    let can_promote = kind.promotion_of().is_some();
    let zone = in_promotion_zone(player, from_row) || in_promotion_zone(player, to_row);
    let forced = must_promote(kind, player, to_row);

    if can_promote && zone {
        moves.push(encode_board_move(from, to, true));
        if !forced {
            moves.push(encode_board_move(from, to, false));
        }
    } else if !forced {
        moves.push(encode_board_move(from, to, false));
    }
}

fn generate_board_moves(board: &Board, player: Player, moves: &mut Vec<ActionIndex>) {
    for from in 0..NUM_SQUARES {
        let (row, col) = (from / COLS, from % COLS);
        let Some(piece) = board.piece_at(row, col) else {
            continue;
        };
        if piece.owner != player {
            continue;
        }
        let kind = piece.kind;

        for &offset in step_offsets(kind) {
            let (dr, dc) = oriented(player, offset);
            let (nr, nc) = (row as i8 + dr, col as i8 + dc);
            if !in_bounds(nr, nc) {
                continue;
            }
            let occupant = board.piece_at(nr as usize, nc as usize);
            if occupant.is_some_and(|p| p.owner == player) {
                continue;
            }
            let to = nr as usize * COLS + nc as usize;
            push_move_with_promotion(moves, from, to, kind, player, row, nr as usize);
        }

        if kind == PieceKind::Knight {
            for &offset in KNIGHT_OFFSETS.iter() {
                let (dr, dc) = oriented(player, offset);
                let (nr, nc) = (row as i8 + dr, col as i8 + dc);
                if !in_bounds(nr, nc) {
                    continue;
                }
                let occupant = board.piece_at(nr as usize, nc as usize);
                if occupant.is_some_and(|p| p.owner == player) {
                    continue;
                }
                let to = nr as usize * COLS + nc as usize;
                push_move_with_promotion(moves, from, to, kind, player, row, nr as usize);
            }
        }

        for &offset in slide_offsets(kind) {
            let (dr, dc) = oriented(player, offset);
            let (mut nr, mut nc) = (row as i8 + dr, col as i8 + dc);
            while in_bounds(nr, nc) {
                let occupant = board.piece_at(nr as usize, nc as usize);
                if occupant.is_some_and(|p| p.owner == player) {
                    break;
                }
                let to = nr as usize * COLS + nc as usize;
                push_move_with_promotion(moves, from, to, kind, player, row, nr as usize);
                if occupant.is_some() {
                    break;
                }
                nr += dr;
                nc += dc;
            }
        }

        if kind == PieceKind::Horse {
            for &offset in HORSE_EXTRA_STEPS.iter() {
                let (dr, dc) = oriented(player, offset);
                let (nr, nc) = (row as i8 + dr, col as i8 + dc);
                if !in_bounds(nr, nc) {
                    continue;
                }
                let occupant = board.piece_at(nr as usize, nc as usize);
                if occupant.is_some_and(|p| p.owner == player) {
                    continue;
                }
                moves.push(encode_board_move(from, nr as usize * COLS + nc as usize, false));
            }
        }

        if kind == PieceKind::Dragon {
            for &offset in DRAGON_EXTRA_STEPS.iter() {
                let (dr, dc) = oriented(player, offset);
                let (nr, nc) = (row as i8 + dr, col as i8 + dc);
                if !in_bounds(nr, nc) {
                    continue;
                }
                let occupant = board.piece_at(nr as usize, nc as usize);
                if occupant.is_some_and(|p| p.owner == player) {
                    continue;
                }
                moves.push(encode_board_move(from, nr as usize * COLS + nc as usize, false));
            }
        }
    }
}

/// True if dropping a pawn at `to` delivers uchifuzume (打ち歩詰め): the
/// drop checks the opponent's king and the opponent has no legal response.
/// Ordinary pawn-drop checkmates via promoted pawns or other pieces are not
/// restricted; only the freshly-dropped unpromoted pawn triggers this rule.
fn drops_uchifuzume(board: &Board, player: Player, to: usize) -> bool {
    let next = apply_drop(board, player, encode_drop_move(PieceKind::Pawn, to));
    let opponent = player.opponent();
    if !is_in_check(&next, opponent) {
        return false;
    }
    legal_moves(&next, opponent).is_empty()
}

fn pseudo_legal_moves(board: &Board, player: Player) -> Vec<ActionIndex> {
    let mut moves = Vec::new();
    generate_board_moves(board, player, &mut moves);
    generate_drop_moves(board, player, &mut moves);
    moves
}

/// Drop generation applying nifu and dead-piece restrictions. Uchifuzume is
/// filtered separately in [`legal_moves`], which needs the opponent's full
/// legal-move set and would recurse forever if called from here.
fn generate_drop_moves(board: &Board, player: Player, moves: &mut Vec<ActionIndex>) {
    let mut seen = Vec::new();
    for &kind in &board.hands[player.as_index()] {
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);

        for to in 0..NUM_SQUARES {
            let (row, col) = (to / COLS, to % COLS);
            if board.piece_at(row, col).is_some() {
                continue;
            }
            if kind == PieceKind::Pawn && board.count_pawns_in_column(player, col) > 0 {
                continue;
            }
            if matches!(kind, PieceKind::Pawn | PieceKind::Lance) {
                let dead = match player {
                    Player::First => row == 0,
                    Player::Second => row == ROWS - 1,
                };
                if dead {
                    continue;
                }
            }
            if kind == PieceKind::Knight {
                let dead = match player {
                    Player::First => row <= 1,
                    Player::Second => row >= ROWS - 2,
                };
                if dead {
                    continue;
                }
            }
            moves.push(encode_drop_move(kind, to));
        }
    }
}

pub fn legal_moves(board: &Board, player: Player) -> Vec<ActionIndex> {
    pseudo_legal_moves(board, player)
        .into_iter()
        .filter(|&action| {
            let next = apply_move(board, player, action);
            if is_in_check(&next, player) {
                return false;
            }
            if let Move::Drop {
                kind: PieceKind::Pawn,
                to,
            } = crate::full::codec::decode_move(action)
            {
                if drops_uchifuzume(board, player, to) {
                    return false;
                }
            }
            true
        })
        .collect()
}

fn apply_board_move(board: &Board, player: Player, from: usize, to: usize, promote: bool) -> Board {
    let (fr, fc) = (from / COLS, from % COLS);
    let (tr, tc) = (to / COLS, to % COLS);
    let piece = board
        .piece_at(fr, fc)
        .expect("apply_move called with a from-square holding no piece");

    let mut next = board.set_piece(fr, fc, None);
    if let Some(captured) = board.piece_at(tr, tc) {
        next = next.add_to_hand(player, captured.kind);
    }

    let landing_kind = if promote {
        piece.kind.promotion_of().unwrap_or(piece.kind)
    } else {
        piece.kind
    };
    next.set_piece(tr, tc, Some(crate::full::types::Piece::new(landing_kind, player)))
}

fn apply_drop(board: &Board, player: Player, action: ActionIndex) -> Board {
    let Move::Drop { kind, to } = crate::full::codec::decode_move(action) else {
        panic!("apply_drop called with a non-drop action");
    };
    let (tr, tc) = (to / COLS, to % COLS);
    let next = board
        .remove_from_hand(player, kind)
        .expect("apply_move called with a drop kind not held in hand");
    next.set_piece(tr, tc, Some(crate::full::types::Piece::new(kind, player)))
}

pub fn apply_move(board: &Board, player: Player, action: ActionIndex) -> Board {
    match crate::full::codec::decode_move(action) {
        Move::Board { from, to, promote } => apply_board_move(board, player, from, to, promote),
        Move::Drop { .. } => apply_drop(board, player, action),
    }
}

pub fn is_in_check(board: &Board, player: Player) -> bool {
    let Some(king_square) = board.find_king(player) else {
        return true;
    };
    let (king_row, king_col) = (king_square / COLS, king_square % COLS);
    let opponent = player.opponent();

    (0..NUM_SQUARES).any(|idx| {
        let (row, col) = (idx / COLS, idx % COLS);
        board
            .piece_at(row, col)
            .is_some_and(|p| p.owner == opponent && attacks_square(board, p.kind, row, col, king_row, king_col, opponent))
    })
}

fn attacks_square(
    board: &Board,
    kind: PieceKind,
    row: usize,
    col: usize,
    target_row: usize,
    target_col: usize,
    attacker: Player,
) -> bool {
    for &offset in step_offsets(kind) {
        let (dr, dc) = oriented(attacker, offset);
        if row as i8 + dr == target_row as i8 && col as i8 + dc == target_col as i8 {
            return true;
        }
    }

    if kind == PieceKind::Knight {
        for &offset in KNIGHT_OFFSETS.iter() {
            let (dr, dc) = oriented(attacker, offset);
            if row as i8 + dr == target_row as i8 && col as i8 + dc == target_col as i8 {
                return true;
            }
        }
    }

    for &offset in slide_offsets(kind) {
        let (dr, dc) = oriented(attacker, offset);
        let (mut nr, mut nc) = (row as i8 + dr, col as i8 + dc);
        while in_bounds(nr, nc) {
            if nr == target_row as i8 && nc == target_col as i8 {
                return true;
            }
            if board.piece_at(nr as usize, nc as usize).is_some() {
                break;
            }
            nr += dr;
            nc += dc;
        }
    }

    if kind == PieceKind::Horse {
        for &offset in HORSE_EXTRA_STEPS.iter() {
            let (dr, dc) = oriented(attacker, offset);
            if row as i8 + dr == target_row as i8 && col as i8 + dc == target_col as i8 {
                return true;
            }
        }
    }

    if kind == PieceKind::Dragon {
        for &offset in DRAGON_EXTRA_STEPS.iter() {
            let (dr, dc) = oriented(attacker, offset);
            if row as i8 + dr == target_row as i8 && col as i8 + dc == target_col as i8 {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::full::types::Piece;
    use proptest::prelude::*;

    #[test]
    fn initial_position_has_30_legal_moves_per_side() {
        let board = Board::initial();
        assert_eq!(legal_moves(&board, Player::First).len(), 30);
        assert_eq!(legal_moves(&board, Player::Second).len(), 30);
    }

    #[test]
    fn nifu_blocks_second_pawn_drop_in_column() {
        let board = Board::empty()
            .set_piece(7, 0, Some(Piece::new(PieceKind::King, Player::First)))
            .set_piece(0, 0, Some(Piece::new(PieceKind::King, Player::Second)))
            .set_piece(5, 3, Some(Piece::new(PieceKind::Pawn, Player::First)));
        let board = board.add_to_hand(Player::First, PieceKind::Pawn);
        let moves = legal_moves(&board, Player::First);
        let blocked = encode_drop_move(PieceKind::Pawn, 4 * COLS + 3);
        assert!(!moves.contains(&blocked));
    }

    #[test]
    fn pawn_reaching_last_row_must_promote() {
        let board = Board::empty()
            .set_piece(7, 0, Some(Piece::new(PieceKind::King, Player::First)))
            .set_piece(5, 0, Some(Piece::new(PieceKind::King, Player::Second)))
            .set_piece(1, 4, Some(Piece::new(PieceKind::Pawn, Player::First)));
        let moves = legal_moves(&board, Player::First);
        let to = 0 * COLS + 4;
        let no_promote = encode_board_move(1 * COLS + 4, to, false);
        let promote = encode_board_move(1 * COLS + 4, to, true);
        assert!(!moves.contains(&no_promote));
        assert!(moves.contains(&promote));
    }

    #[test]
    fn king_cannot_move_into_check() {
        let board = Board::empty()
            .set_piece(0, 0, Some(Piece::new(PieceKind::King, Player::First)))
            .set_piece(0, 8, Some(Piece::new(PieceKind::King, Player::Second)))
            .set_piece(5, 1, Some(Piece::new(PieceKind::Rook, Player::Second)));
        let moves = legal_moves(&board, Player::First);
        let into_check = encode_board_move(0 * COLS + 0, 1 * COLS + 1, false);
        assert!(!moves.contains(&into_check));
    }

    /// Plays up to `max_plies` random legal moves from the initial position,
    /// returning the sequence of (board, player-to-move) pairs visited.
    fn random_playout(seed: u64, max_plies: usize) -> Vec<(Board, Player)> {
        use rand::rngs::StdRng;
        use rand::Rng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::initial();
        let mut player = Player::First;
        let mut visited = vec![(board.clone(), player)];

        for _ in 0..max_plies {
            let moves = legal_moves(&board, player);
            if moves.is_empty() {
                break;
            }
            let action = moves[rng.random_range(0..moves.len())];
            board = apply_move(&board, player, action);
            player = player.opponent();
            visited.push((board.clone(), player));
        }

        visited
    }

    proptest! {
        /// 二歩: no legal set ever offers a pawn drop into a column the
        /// mover already holds an unpromoted pawn in.
        #[test]
        fn nifu_never_offered_across_random_play(seed in any::<u64>()) {
            for (board, player) in random_playout(seed, 40) {
                for &kind in &[PieceKind::Pawn] {
                    for col in 0..COLS {
                        if board.count_pawns_in_column(player, col) == 0 {
                            continue;
                        }
                        let moves = legal_moves(&board, player);
                        for row in 0..ROWS {
                            let to = row * COLS + col;
                            let drop = encode_drop_move(kind, to);
                            prop_assert!(!moves.contains(&drop));
                        }
                    }
                }
            }
        }

        /// Dead-piece drops (pawn/lance on the far rank, knight on the far
        /// two ranks) never appear in a legal set, across random play.
        #[test]
        fn dead_piece_drops_never_offered_across_random_play(seed in any::<u64>()) {
            for (board, player) in random_playout(seed, 40) {
                let moves = legal_moves(&board, player);
                let far_row = match player {
                    Player::First => 0,
                    Player::Second => ROWS - 1,
                };
                for col in 0..COLS {
                    let to = far_row * COLS + col;
                    prop_assert!(!moves.contains(&encode_drop_move(PieceKind::Pawn, to)));
                    prop_assert!(!moves.contains(&encode_drop_move(PieceKind::Lance, to)));
                }
                let far_rows: [usize; 2] = match player {
                    Player::First => [0, 1],
                    Player::Second => [ROWS - 1, ROWS - 2],
                };
                for row in far_rows {
                    for col in 0..COLS {
                        let to = row * COLS + col;
                        prop_assert!(!moves.contains(&encode_drop_move(PieceKind::Knight, to)));
                    }
                }
            }
        }

        /// No legal move ever leaves the mover's own king in check.
        #[test]
        fn legal_moves_never_leave_mover_in_check(seed in any::<u64>()) {
            for (board, player) in random_playout(seed, 30) {
                for action in legal_moves(&board, player) {
                    let next = apply_move(&board, player, action);
                    prop_assert!(!is_in_check(&next, player));
                }
            }
        }

        /// Both kings stay on the board for the whole playout: full legal
        /// filtering means a king is never actually captured, only ever
        /// found missing via the defensive terminal check.
        #[test]
        fn kings_never_vanish_across_random_play(seed in any::<u64>()) {
            for (board, _) in random_playout(seed, 60) {
                prop_assert!(board.find_king(Player::First).is_some());
                prop_assert!(board.find_king(Player::Second).is_some());
            }
        }
    }
}
