use std::fmt::{Display, Write};

use thiserror::Error;

use crate::move_gen;

use super::{
    chess_move::Move, Castling, Color, Piece, PieceType, Square, ZobristHash,
};

/// Plain piece placement plus derived occupancy bitboards. Carries no turn,
/// castling, or move-history information -- see [`Position`] for the full
/// picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    // Indexed by `Piece::get()` (1..=6 white, 9..=14 black); unused slots
    // stay empty. Mirrors the indexing scheme `ZobristHash` already uses for
    // its own per-piece table.
    piece_bb: [super::Bitboard; 16],
    color_bb: [super::Bitboard; 2],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            piece_bb: [super::Bitboard::EMPTY; 16],
            color_bb: [super::Bitboard::EMPTY; 2],
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        self.remove_piece(square);
        self.squares[square.index()] = Some(piece);
        self.piece_bb[piece.get() as usize].set(square);
        self.color_bb[piece.color().index()].set(square);
    }

    pub fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        let removed = self.squares[square.index()].take();
        if let Some(piece) = removed {
            self.piece_bb[piece.get() as usize].reset(square);
            self.color_bb[piece.color().index()].reset(square);
        }
        removed
    }

    pub fn pieces(&self, piece: Piece) -> super::Bitboard {
        self.piece_bb[piece.get() as usize]
    }

    pub fn pieces_of_type(&self, color: Color, piece_type: PieceType) -> super::Bitboard {
        self.pieces(piece_type.with_color(color))
    }

    pub fn color_occupied(&self, color: Color) -> super::Bitboard {
        self.color_bb[color.index()]
    }

    pub fn occupied(&self) -> super::Bitboard {
        self.color_bb[0] | self.color_bb[1]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(Piece::king(color)).lsb().map(Square::from_u8_unchecked)
    }

    pub fn all_pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, piece)| piece.map(|p| (Square::from_index_unchecked(index), p)))
    }
}

/// A chess position: board, side to move, castling rights, en-passant
/// target, clocks, and a cached in-check flag and Zobrist-style hash.
///
/// Treated as an immutable value after construction: [`Position::apply_move`]
/// returns a *new* `Position` rather than mutating `self`, matching the
/// language-neutral spec's "Positions are treated as immutable" design note.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: BoardKey,
    turn: Color,
    castling: Castling,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmoves: u32,
    in_check: bool,
}

/// Wraps [`Board`] to provide the `Hash`/`Eq` the same-position comparator
/// needs (piece placement only -- turn/castling/en-passant are compared as
/// `Position`'s own fields).
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardKey(Board);

impl std::hash::Hash for BoardKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for square in Square::all() {
            self.0.piece_at(square).map(Piece::get).hash(state);
        }
    }
}

impl Position {
    pub fn starting_position() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting position FEN is valid")
    }

    pub fn board(&self) -> &Board {
        &self.board.0
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling(&self) -> Castling {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    /// A 64-bit Zobrist-style fingerprint built from piece placement, turn,
    /// castling rights, and en-passant square -- stable across positions that
    /// the same-position comparator considers equal.
    ///
    /// Per the preserved source behavior (see DESIGN.md Open Question), this
    /// counts en-passant *square presence*, not whether a capture from it is
    /// actually legal.
    pub fn zobrist_hash(&self) -> ZobristHash {
        let mut hash = ZobristHash::default();
        for (square, piece) in self.board.0.all_pieces() {
            hash ^= ZobristHash::piece(piece, square);
        }
        hash ^= ZobristHash::color(self.turn);
        hash ^= ZobristHash::castling(self.castling);
        hash ^= ZobristHash::en_passant(self.en_passant);
        hash
    }

    /// The set of all legal moves for the side to move: pseudo-legal
    /// generation followed by a legality filter (apply to a copy, reject if
    /// the mover's own king ends up attacked), per spec §4.1.
    pub fn legal_moves(&self) -> Vec<Move> {
        move_gen::legal_moves(self)
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check && self.legal_moves().is_empty()
    }

    /// Applies `mv` and returns the resulting position, per spec §4.2. Does
    /// not validate that `mv` is legal in `self` -- callers that need
    /// validation should check `self.legal_moves()` first (this is exactly
    /// what [`crate::game::Game::try_move`] does).
    pub fn apply_move(&self, mv: Move) -> Position {
        let mut board = self.board.0.clone();

        let moved_piece = mv.piece();
        board.remove_piece(mv.from_square());

        if mv.is_en_passant() {
            let captured_square =
                Square::new_unchecked(mv.from_square().rank(), mv.to_square().file());
            board.remove_piece(captured_square);
        } else {
            board.remove_piece(mv.to_square());
        }

        let placed_piece = match mv.promotion() {
            Some(promo) => promo.with_color(self.turn),
            None => moved_piece,
        };
        board.set_piece(mv.to_square(), placed_piece);

        if mv.is_king_side_castle() || mv.is_queen_side_castle() {
            let rank = mv.from_square().rank();
            let (rook_from, rook_to) = if mv.is_king_side_castle() {
                (Square::new_unchecked(rank, 7), Square::new_unchecked(rank, 5))
            } else {
                (Square::new_unchecked(rank, 0), Square::new_unchecked(rank, 3))
            };
            if let Some(rook) = board.remove_piece(rook_from) {
                board.set_piece(rook_to, rook);
            }
        }

        let mut castling = self.castling;
        if moved_piece.is_king() {
            castling -= match self.turn {
                Color::White => Castling::WHITE,
                Color::Black => Castling::BLACK,
            };
        }
        for (square, right) in [
            (Square::WHITE_QUEENSIDE_ROOK, Castling::WHITE_QUEENSIDE),
            (Square::WHITE_KINGSIDE_ROOK, Castling::WHITE_KINGSIDE),
            (Square::BLACK_QUEENSIDE_ROOK, Castling::BLACK_QUEENSIDE),
            (Square::BLACK_KINGSIDE_ROOK, Castling::BLACK_KINGSIDE),
        ] {
            if mv.from_square() == square || mv.to_square() == square {
                castling -= right;
            }
        }

        let en_passant = if mv.is_double_pawn_push() {
            Some(Square::new_unchecked(
                (mv.from_square().rank() + mv.to_square().rank()) / 2,
                mv.from_square().file(),
            ))
        } else {
            None
        };

        let halfmove_clock = if moved_piece.is_pawn() || mv.is_capture() {
            0
        } else {
            self.halfmove_clock + 1
        };

        let fullmoves = if self.turn.is_black() {
            self.fullmoves + 1
        } else {
            self.fullmoves
        };

        let turn = self.turn.flip();
        let king_square = board.king_square(turn);
        let in_check = king_square
            .map(|sq| move_gen::is_square_attacked(&board, sq, turn.flip()))
            .unwrap_or(false);

        Position {
            board: BoardKey(board),
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmoves,
            in_check,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, side, castling, en_passant, halfmove_clock, fullmoves] = fields
            .as_slice()
        else {
            return Err(FenError::WrongFieldCount(fields.len()));
        };

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount(ranks.len()));
        }

        let mut board = Board::empty();
        for (rank_index, rank_pieces) in ranks.iter().enumerate() {
            let rank = 7 - rank_index as u8;
            let mut file: u32 = 0;
            for c in rank_pieces.chars() {
                if file >= 8 {
                    return Err(FenError::RankDoesNotSumToEight(rank_pieces.to_string()));
                }
                if let Some(digit) = c.to_digit(10) {
                    file += digit;
                } else {
                    let piece = Piece::try_from_fen_char(c)
                        .ok_or(FenError::InvalidPieceChar(c))?;
                    board.set_piece(Square::new_unchecked(rank, file as u8), piece);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::RankDoesNotSumToEight(rank_pieces.to_string()));
            }
        }

        let turn = match *side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        let castling = if *castling == "-" {
            Castling::empty()
        } else {
            let mut flags = Castling::empty();
            for c in castling.chars() {
                flags |= match c {
                    'K' => Castling::WHITE_KINGSIDE,
                    'Q' => Castling::WHITE_QUEENSIDE,
                    'k' => Castling::BLACK_KINGSIDE,
                    'q' => Castling::BLACK_QUEENSIDE,
                    _ => return Err(FenError::InvalidCastlingField(castling.to_string())),
                };
            }
            flags
        };

        let en_passant = if *en_passant == "-" {
            None
        } else {
            Some(
                en_passant
                    .parse()
                    .map_err(|_| FenError::InvalidEnPassantSquare(en_passant.to_string()))?,
            )
        };

        let halfmove_clock = halfmove_clock
            .parse()
            .map_err(|_| FenError::InvalidHalfmoveClock(halfmove_clock.to_string()))?;
        let fullmoves = fullmoves
            .parse()
            .map_err(|_| FenError::InvalidFullmoveNumber(fullmoves.to_string()))?;

        let king_square = board.king_square(turn);
        let in_check = king_square
            .map(|sq| move_gen::is_square_attacked(&board, sq, turn.flip()))
            .unwrap_or(false);

        Ok(Position {
            board: BoardKey(board),
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmoves,
            in_check,
        })
    }

    pub fn to_fen(&self) -> String {
        self.to_string()
    }

    /// The same-position comparator used for repetition counting: equal
    /// piece placement, side to move, castling rights, and en-passant
    /// square. Implemented via [`Self::zobrist_hash`] equality, which folds
    /// in exactly those fields and none of the clocks.
    pub fn same_position(&self, other: &Self) -> bool {
        self.zobrist_hash() == other.zobrist_hash()
    }
}

const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let square = Square::new_unchecked(rank, file);
                match self.board.0.piece_at(square) {
                    None => empty_run += 1,
                    Some(piece) => {
                        if empty_run > 0 {
                            write!(f, "{empty_run}")?;
                            empty_run = 0;
                        }
                        f.write_char(piece.as_fen_char())?;
                    }
                }
            }
            if empty_run > 0 {
                write!(f, "{empty_run}")?;
            }
            if rank > 0 {
                f.write_char('/')?;
            }
        }

        write!(f, " {} ", if self.turn.is_white() { 'w' } else { 'b' })?;
        f.write_str(&self.castling.as_fen_str())?;
        f.write_char(' ')?;
        match self.en_passant {
            Some(square) => write!(f, "{square}")?,
            None => f.write_char('-')?,
        };
        write!(f, " {} {}", self.halfmove_clock, self.fullmoves)
    }
}

impl std::str::FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

/// Errors raised while decoding a FEN string, per spec §4.8.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 6 space-separated fields, found {0}")]
    WrongFieldCount(usize),
    #[error("expected 8 ranks in piece placement field, found {0}")]
    WrongRankCount(usize),
    #[error("rank '{0}' does not sum to 8 files")]
    RankDoesNotSumToEight(String),
    #[error("invalid piece character '{0}'")]
    InvalidPieceChar(char),
    #[error("invalid side to move '{0}', expected 'w' or 'b'")]
    InvalidSideToMove(String),
    #[error("invalid castling field '{0}'")]
    InvalidCastlingField(String),
    #[error("invalid en-passant square '{0}'")]
    InvalidEnPassantSquare(String),
    #[error("invalid half-move clock '{0}'")]
    InvalidHalfmoveClock(String),
    #[error("invalid full-move number '{0}'")]
    InvalidFullmoveNumber(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starting_position_round_trips() {
        let position = Position::starting_position();
        assert_eq!(position.to_fen(), STARTING_FEN);
        assert_eq!(position.legal_moves().len(), 20);
        assert!(!position.in_check());
    }

    #[test]
    fn from_fen_rejects_bad_rank_count() {
        assert_eq!(
            Position::from_fen("8/8/8 w - - 0 1"),
            Err(FenError::WrongRankCount(3))
        );
    }

    #[test]
    fn from_fen_rejects_bad_side() {
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 x - - 0 1"),
            Err(FenError::InvalidSideToMove(_))
        ));
    }

    #[test]
    fn double_pawn_push_sets_en_passant() {
        let position = Position::starting_position();
        let mv = position
            .legal_moves()
            .into_iter()
            .find(|m| m.from_square() == Square::E2 && m.to_square() == Square::E4)
            .unwrap();

        let after = position.apply_move(mv);
        assert_eq!(after.en_passant(), Some(Square::E3));
        assert_eq!(after.halfmove_clock(), 0);
    }
}
