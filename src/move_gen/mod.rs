//! Pseudo-legal move generation plus the legality filter, per spec §4.1.
//!
//! Generation is deliberately the textbook two-pass approach the spec
//! describes (generate everything pseudo-legal, then discard moves that
//! leave the mover's own king attacked) rather than the pin-mask
//! single-pass approach the teacher crate uses for perft throughput -- see
//! DESIGN.md.

pub mod lookups;
mod pawn_moves;

use crate::board::{
    chess_move::{Move, POSSIBLE_PROMOTIONS},
    position::{Board, Position},
    Castling, Color, Piece, PieceType, Square,
};

use lookups::Lookups;

/// True if `square` is attacked by any piece of color `by`, given the
/// current board occupancy. Symmetric attack-table lookup: to find out if a
/// knight of color `by` attacks `square`, look up the knight attacks *from*
/// `square` and see if they land on one of `by`'s knights (attacks are their
/// own inverse for these piece types).
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    let lookups = Lookups::get();

    let pawn_attackers = match by {
        Color::White => pawn_moves::white_pawn_attacks(board.pieces_of_type(Color::White, PieceType::Pawn)),
        Color::Black => pawn_moves::black_pawn_attacks(board.pieces_of_type(Color::Black, PieceType::Pawn)),
    };
    if pawn_attackers.get(square) {
        return true;
    }

    if (lookups.knight_attacks(square) & board.pieces_of_type(by, PieceType::Knight)).has_piece() {
        return true;
    }

    if (lookups.king_attacks(square) & board.pieces_of_type(by, PieceType::King)).has_piece() {
        return true;
    }

    let occupied = board.occupied();
    let diagonal_attackers =
        board.pieces_of_type(by, PieceType::Bishop) | board.pieces_of_type(by, PieceType::Queen);
    if (lookups.bishop_attacks(occupied, square) & diagonal_attackers).has_piece() {
        return true;
    }

    let orthogonal_attackers =
        board.pieces_of_type(by, PieceType::Rook) | board.pieces_of_type(by, PieceType::Queen);
    if (lookups.rook_attacks(occupied, square) & orthogonal_attackers).has_piece() {
        return true;
    }

    false
}

/// All pseudo-legal moves for the side to move in `position`: every move
/// that obeys individual piece movement rules, without checking whether it
/// leaves the mover's own king in check.
fn pseudo_legal_moves(position: &Position) -> Vec<Move> {
    let board = position.board();
    let color = position.turn();
    let mut moves = Vec::with_capacity(48);

    pawn_moves::pawn_moves(board, color, position.en_passant(), &mut moves);
    knight_moves(board, color, &mut moves);
    sliding_moves(board, color, PieceType::Bishop, &mut moves);
    sliding_moves(board, color, PieceType::Rook, &mut moves);
    sliding_moves(board, color, PieceType::Queen, &mut moves);
    king_moves(board, color, &mut moves);
    castling_moves(position, &mut moves);

    moves
}

fn knight_moves(board: &Board, color: Color, out: &mut Vec<Move>) {
    let piece = PieceType::Knight.with_color(color);
    let own = board.color_occupied(color);
    let lookups = Lookups::get();

    for from in board.pieces_of_type(color, PieceType::Knight).squares() {
        let targets = lookups.knight_attacks(from) & !own;
        push_targets(board, from, piece, targets, out);
    }
}

fn king_moves(board: &Board, color: Color, out: &mut Vec<Move>) {
    let piece = PieceType::King.with_color(color);
    let own = board.color_occupied(color);
    let lookups = Lookups::get();

    if let Some(from) = board.king_square(color) {
        let targets = lookups.king_attacks(from) & !own;
        push_targets(board, from, piece, targets, out);
    }
}

fn sliding_moves(board: &Board, color: Color, piece_type: PieceType, out: &mut Vec<Move>) {
    let piece = piece_type.with_color(color);
    let own = board.color_occupied(color);
    let occupied = board.occupied();
    let lookups = Lookups::get();

    for from in board.pieces_of_type(color, piece_type).squares() {
        let attacks = match piece_type {
            PieceType::Bishop => lookups.bishop_attacks(occupied, from),
            PieceType::Rook => lookups.rook_attacks(occupied, from),
            PieceType::Queen => lookups.queen_attacks(occupied, from),
            _ => unreachable!("sliding_moves called with non-sliding piece type"),
        };
        push_targets(board, from, piece, attacks & !own, out);
    }
}

fn push_targets(
    board: &Board,
    from: Square,
    piece: Piece,
    targets: crate::board::Bitboard,
    out: &mut Vec<Move>,
) {
    for to in targets.squares() {
        let mut builder = Move::builder(from, to, piece);
        if let Some(captured) = board.piece_at(to) {
            builder = builder.captures(captured);
        }
        out.push(builder.build());
    }
}

struct CastlingSpec {
    right: Castling,
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
    must_be_empty: crate::board::Bitboard,
    king_path: [Square; 3],
    is_king_side: bool,
}

fn castling_specs(color: Color) -> [CastlingSpec; 2] {
    use crate::board::Bitboard;

    let rank = if color.is_white() { 0 } else { 7 };
    let e = Square::new_unchecked(rank, 4);
    let f = Square::new_unchecked(rank, 5);
    let g = Square::new_unchecked(rank, 6);
    let d = Square::new_unchecked(rank, 3);
    let c = Square::new_unchecked(rank, 2);
    let b = Square::new_unchecked(rank, 1);
    let a = Square::new_unchecked(rank, 0);
    let h = Square::new_unchecked(rank, 7);

    let (king_side_right, queen_side_right) = if color.is_white() {
        (Castling::WHITE_KINGSIDE, Castling::WHITE_QUEENSIDE)
    } else {
        (Castling::BLACK_KINGSIDE, Castling::BLACK_QUEENSIDE)
    };

    [
        CastlingSpec {
            right: king_side_right,
            king_from: e,
            king_to: g,
            rook_from: h,
            rook_to: f,
            must_be_empty: Bitboard::from_square(f) | Bitboard::from_square(g),
            king_path: [e, f, g],
            is_king_side: true,
        },
        CastlingSpec {
            right: queen_side_right,
            king_from: e,
            king_to: c,
            rook_from: a,
            rook_to: d,
            must_be_empty: Bitboard::from_square(b) | Bitboard::from_square(c) | Bitboard::from_square(d),
            king_path: [e, d, c],
            is_king_side: false,
        },
    ]
}

fn castling_moves(position: &Position, out: &mut Vec<Move>) {
    let color = position.turn();
    let board = position.board();
    let opponent = color.flip();

    for spec in castling_specs(color) {
        if !position.castling().contains(spec.right) {
            continue;
        }
        if board.piece_at(spec.king_from) != Some(Piece::king(color)) {
            continue;
        }
        if board.piece_at(spec.rook_from) != Some(Piece::rook(color)) {
            continue;
        }
        if (board.occupied() & spec.must_be_empty).has_piece() {
            continue;
        }
        if spec
            .king_path
            .iter()
            .any(|&sq| is_square_attacked(board, sq, opponent))
        {
            continue;
        }

        let piece = Piece::king(color);
        let mut builder = Move::builder(spec.king_from, spec.king_to, piece);
        builder = if spec.is_king_side {
            builder.is_king_side_castle()
        } else {
            builder.is_queen_side_castle()
        };
        out.push(builder.build());
        let _ = spec.rook_to; // rook relocation is performed by Position::apply_move
    }
}

/// All legal moves for the side to move: pseudo-legal generation, the
/// legality filter described in spec §4.1, and Check/Checkmate tagging based
/// on the resulting position.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    pseudo_legal_moves(position)
        .into_iter()
        .filter_map(|mv| {
            let after = position.apply_move(mv);
            let stays_legal = match after.board().king_square(position.turn()) {
                Some(king_square) => !is_square_attacked(after.board(), king_square, after.turn()),
                None => true,
            };
            if !stays_legal {
                return None;
            }

            let is_check = after.in_check();
            let is_checkmate = is_check && legal_moves(&after).is_empty();
            Some(mv.with_check_tags(is_check, is_checkmate))
        })
        .collect()
}

/// Ensures promotion-piece handling stays centralized; re-exported so
/// notation codecs can enumerate valid promotion targets without depending
/// on `move_gen` internals.
pub const PROMOTION_TARGETS: [PieceType; 4] = POSSIBLE_PROMOTIONS;

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::assert_in_any_order;
    use pretty_assertions::assert_eq;

    #[test]
    fn starting_position_has_20_legal_moves() {
        let position = Position::starting_position();
        assert_eq!(legal_moves(&position).len(), 20);
    }

    #[test]
    fn king_cannot_move_into_check() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        let moves = legal_moves(&position);
        assert!(moves.iter().all(|m| m.to_square() != Square::E2));
    }

    #[test]
    fn castling_requires_empty_and_unattacked_path() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = legal_moves(&position);
        assert!(moves.iter().any(|m| m.is_king_side_castle()));
        assert!(moves.iter().any(|m| m.is_queen_side_castle()));
    }

    #[test]
    fn castling_blocked_by_attacked_transit_square() {
        // Black rook on f8 bears down on f1, which the white king must pass
        // through to castle kingside.
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let before_extra = legal_moves(&position);
        assert!(before_extra.iter().any(|m| m.is_king_side_castle()));

        let position = Position::from_fen("5r2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = legal_moves(&position);
        assert!(!moves.iter().any(|m| m.is_king_side_castle()));
    }

    #[test]
    fn en_passant_capture_is_generated() {
        let position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let moves = legal_moves(&position);
        assert!(moves.iter().any(|m| m.is_en_passant() && m.to_square() == Square::D6));
    }

    #[test]
    fn stalemate_has_no_legal_moves() {
        let position = Position::from_fen("k1K5/8/8/8/8/8/8/1Q6 b - - 0 1").unwrap();
        assert!(legal_moves(&position).is_empty());
        assert!(!position.in_check());
    }

    #[test]
    fn promotion_generates_all_four_targets() {
        let position = Position::from_fen("8/3P4/8/8/8/7k/7p/7K w - - 2 70").unwrap();
        let promo_moves: Vec<_> = legal_moves(&position)
            .into_iter()
            .filter(|m| m.from_square() == Square::D7 && m.to_square() == Square::D8)
            .collect();
        assert_in_any_order(
            promo_moves.iter().map(|m| m.promotion().unwrap()),
            [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight],
        );
    }
}
