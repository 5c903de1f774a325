use std::fmt::{Debug, Display, Write};

use bitflags::bitflags;

use super::{Piece, PieceType, Square};

bitflags! {
    /// Tag bits carried on a [`Move`], describing special move semantics that
    /// cannot be derived from `from`/`to`/`promotion` alone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        const DOUBLE_PAWN_PUSH  = 1 << 0;
        const KING_SIDE_CASTLE  = 1 << 1;
        const QUEEN_SIDE_CASTLE = 1 << 2;
        const EN_PASSANT        = 1 << 3;
        const CHECK             = 1 << 4;
        const CHECKMATE         = 1 << 5;
    }
}

/// A single chess move: origin, destination, the piece that moved, what (if
/// anything) it captured, promotion target, and tag bits.
///
/// This is a pure value -- it carries no tree or position information. The
/// tree-carrying counterpart is [`crate::game::MoveNode`], which wraps an
/// `Option<Move>` together with the position it produced and its place in the
/// game tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
    promotion: Option<PieceType>,
    flags: MoveFlags,
}

impl Move {
    pub fn builder(from: Square, to: Square, piece: Piece) -> MoveBuilder {
        MoveBuilder::new(from, to, piece)
    }

    pub const fn from_square(self) -> Square {
        self.from
    }

    pub const fn to_square(self) -> Square {
        self.to
    }

    pub const fn piece(self) -> Piece {
        self.piece
    }

    pub const fn captured_piece(self) -> Option<Piece> {
        self.captured
    }

    pub const fn promotion(self) -> Option<PieceType> {
        self.promotion
    }

    pub const fn flags(self) -> MoveFlags {
        self.flags
    }

    pub const fn is_capture(self) -> bool {
        self.captured.is_some()
    }

    pub const fn is_promotion(self) -> bool {
        self.promotion.is_some()
    }

    pub const fn is_double_pawn_push(self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH)
    }

    pub const fn is_king_side_castle(self) -> bool {
        self.flags.contains(MoveFlags::KING_SIDE_CASTLE)
    }

    pub const fn is_queen_side_castle(self) -> bool {
        self.flags.contains(MoveFlags::QUEEN_SIDE_CASTLE)
    }

    pub const fn is_castle(self) -> bool {
        self.is_king_side_castle() || self.is_queen_side_castle()
    }

    pub const fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    pub const fn is_check(self) -> bool {
        self.flags.contains(MoveFlags::CHECK)
    }

    pub const fn is_checkmate(self) -> bool {
        self.flags.contains(MoveFlags::CHECKMATE)
    }

    /// Returns a copy of this move with the check/checkmate tag bits set as
    /// given. Used by the move generator once it knows the post-move position.
    pub(crate) fn with_check_tags(mut self, is_check: bool, is_checkmate: bool) -> Self {
        self.flags.set(MoveFlags::CHECK, is_check);
        self.flags.set(MoveFlags::CHECKMATE, is_checkmate);
        self
    }

    /// Returns true if `from`/`to`/`promotion` match -- the identity used
    /// when matching a decoded notation move or a tree child against this
    /// move, per spec (matches are by origin, destination, and promotion
    /// target, ignoring tag bits).
    pub fn matches(self, from: Square, to: Square, promotion: Option<PieceType>) -> bool {
        self.from == from && self.to == to && self.promotion == promotion
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Move")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("piece", &self.piece)
            .field("captured", &self.captured)
            .field("promotion", &self.promotion)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Long-algebraic-ish debug rendering: `e2-e4`, `d7xe8=Q`.
impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_king_side_castle() {
            return f.write_str("O-O");
        }
        if self.is_queen_side_castle() {
            return f.write_str("O-O-O");
        }

        write!(f, "{}", self.from)?;
        f.write_char(if self.is_capture() { 'x' } else { '-' })?;
        write!(f, "{}", self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "={}", promo.as_uppercase_char())?;
        }
        Ok(())
    }
}

/// Builder for [`Move`], mirroring the teacher crate's fluent construction
/// style used throughout the pseudo-legal generators.
pub struct MoveBuilder {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
    promotion: Option<PieceType>,
    flags: MoveFlags,
}

impl MoveBuilder {
    pub fn new(from: Square, to: Square, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            flags: MoveFlags::empty(),
        }
    }

    pub fn captures(mut self, captured: Piece) -> Self {
        self.captured = Some(captured);
        self
    }

    pub fn promotes_to(mut self, promotion: PieceType) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn is_double_pawn_push(mut self) -> Self {
        self.flags |= MoveFlags::DOUBLE_PAWN_PUSH;
        self
    }

    pub fn is_king_side_castle(mut self) -> Self {
        self.flags |= MoveFlags::KING_SIDE_CASTLE;
        self
    }

    pub fn is_queen_side_castle(mut self) -> Self {
        self.flags |= MoveFlags::QUEEN_SIDE_CASTLE;
        self
    }

    pub fn is_en_passant(mut self) -> Self {
        self.flags |= MoveFlags::EN_PASSANT;
        self
    }

    pub fn build(self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            piece: self.piece,
            captured: self.captured,
            promotion: self.promotion,
            flags: self.flags,
        }
    }
}

/// The only legal promotion targets. Promoting to a king or a pawn is
/// illegal and never generated.
pub const POSSIBLE_PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_roundtrip() {
        let m = Move::builder(Square::E2, Square::E4, Piece::WHITE_PAWN)
            .is_double_pawn_push()
            .build();

        assert_eq!(m.from_square(), Square::E2);
        assert_eq!(m.to_square(), Square::E4);
        assert_eq!(m.piece(), Piece::WHITE_PAWN);
        assert!(m.is_double_pawn_push());
        assert!(!m.is_capture());
    }

    #[test]
    fn capture_and_promotion() {
        let m = Move::builder(Square::E7, Square::D8, Piece::WHITE_PAWN)
            .captures(Piece::BLACK_ROOK)
            .promotes_to(PieceType::Queen)
            .build();

        assert!(m.is_capture());
        assert_eq!(m.captured_piece(), Some(Piece::BLACK_ROOK));
        assert_eq!(m.promotion(), Some(PieceType::Queen));
        assert_eq!(format!("{m}"), "e7xd8=Q");
    }

    #[test]
    fn matches_ignores_tags() {
        let m = Move::builder(Square::G1, Square::F3, Piece::WHITE_KNIGHT).build();
        assert!(m.matches(Square::G1, Square::F3, None));
        assert!(!m.matches(Square::G1, Square::F3, Some(PieceType::Queen)));
    }
}
