use crate::board::{chess_move::POSSIBLE_PROMOTIONS, position::Board, Bitboard, Color, Move, PieceType, Square};

/// Pawn pseudo-legal move generation: pushes, double pushes, captures, and
/// en passant. Ported from the teacher crate's bitwise pawn-move generator,
/// adapted to a plain [`Board`] (no generation-time check masks -- legality
/// is enforced uniformly afterwards by applying the move and checking
/// whether the mover's king ends up attacked, per spec §4.1).
pub(super) fn pawn_moves(board: &Board, color: Color, en_passant: Option<Square>, out: &mut Vec<Move>) {
    let piece = PieceType::Pawn.with_color(color);
    let pawns = board.pieces_of_type(color, PieceType::Pawn);
    let empty = !board.occupied();
    let enemies = board.color_occupied(color.flip());

    let rank_before_promotion = if color.is_white() { 6 } else { 1 };

    let (single_push_srcs, double_push_srcs) = match color {
        Color::White => (
            empty.step_south() & pawns,
            double_push_sources_white(pawns, empty),
        ),
        Color::Black => (
            empty.step_north() & pawns,
            double_push_sources_black(pawns, empty),
        ),
    };

    for from in single_push_srcs.squares() {
        let to = pawn_push_dest(from, color);
        push_pawn_move(out, from, to, piece, None, from.rank() == rank_before_promotion);
    }

    for from in double_push_srcs.squares() {
        let to = pawn_double_push_dest(from, color);
        out.push(
            Move::builder(from, to, piece)
                .is_double_pawn_push()
                .build(),
        );
    }

    let (east_srcs, west_srcs) = match color {
        Color::White => (
            pawns & enemies.step_south_west(),
            pawns & enemies.step_south_east(),
        ),
        Color::Black => (
            pawns & enemies.step_north_west(),
            pawns & enemies.step_north_east(),
        ),
    };

    for from in east_srcs.squares() {
        let to = pawn_east_capture_dest(from, color);
        let captured = board.piece_at(to).expect("capture destination must be occupied");
        push_pawn_capture(out, from, to, piece, captured, from.rank() == rank_before_promotion);
    }

    for from in west_srcs.squares() {
        let to = pawn_west_capture_dest(from, color);
        let captured = board.piece_at(to).expect("capture destination must be occupied");
        push_pawn_capture(out, from, to, piece, captured, from.rank() == rank_before_promotion);
    }

    if let Some(ep_square) = en_passant {
        let ep_bb = Bitboard::from_square(ep_square);
        let (east_srcs, west_srcs) = match color {
            Color::White => (pawns & ep_bb.step_south_west(), pawns & ep_bb.step_south_east()),
            Color::Black => (pawns & ep_bb.step_north_west(), pawns & ep_bb.step_north_east()),
        };

        let captured_piece = PieceType::Pawn.with_color(color.flip());
        for from in east_srcs.squares().chain(west_srcs.squares()) {
            out.push(
                Move::builder(from, ep_square, piece)
                    .captures(captured_piece)
                    .is_en_passant()
                    .build(),
            );
        }
    }
}

fn push_pawn_move(out: &mut Vec<Move>, from: Square, to: Square, piece: crate::board::Piece, captured: Option<crate::board::Piece>, promotes: bool) {
    if promotes {
        for &promo in &POSSIBLE_PROMOTIONS {
            let mut builder = Move::builder(from, to, piece).promotes_to(promo);
            if let Some(captured) = captured {
                builder = builder.captures(captured);
            }
            out.push(builder.build());
        }
    } else {
        let mut builder = Move::builder(from, to, piece);
        if let Some(captured) = captured {
            builder = builder.captures(captured);
        }
        out.push(builder.build());
    }
}

fn push_pawn_capture(out: &mut Vec<Move>, from: Square, to: Square, piece: crate::board::Piece, captured: crate::board::Piece, promotes: bool) {
    push_pawn_move(out, from, to, piece, Some(captured), promotes);
}

fn double_push_sources_white(pawns: Bitboard, empty: Bitboard) -> Bitboard {
    let passable_rank3 = (Bitboard::RANK_4 & empty).step_south() & empty;
    passable_rank3.step_south() & pawns
}

fn double_push_sources_black(pawns: Bitboard, empty: Bitboard) -> Bitboard {
    let passable_rank6 = (Bitboard::RANK_5 & empty).step_north() & empty;
    passable_rank6.step_north() & pawns
}

fn pawn_push_dest(square: Square, color: Color) -> Square {
    square.offset(if color.is_white() { 8 } else { -8 })
}

fn pawn_double_push_dest(square: Square, color: Color) -> Square {
    square.offset(if color.is_white() { 16 } else { -16 })
}

fn pawn_east_capture_dest(square: Square, color: Color) -> Square {
    square.offset(if color.is_white() { 9 } else { -7 })
}

fn pawn_west_capture_dest(square: Square, color: Color) -> Square {
    square.offset(if color.is_white() { 7 } else { -9 })
}

pub fn white_pawn_attacks(white_pawns: Bitboard) -> Bitboard {
    white_pawns.step_north_east() | white_pawns.step_north_west()
}

pub fn black_pawn_attacks(black_pawns: Bitboard) -> Bitboard {
    black_pawns.step_south_east() | black_pawns.step_south_west()
}
