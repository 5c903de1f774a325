use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use super::{chess_move::Move, Piece, PieceType, Square};

/// Long algebraic notation: `piece? s1 [-|x] s2 [=piece] [+|#]`, e.g. `e2-e4`,
/// `Ng1-f3`, `Pe7xd8=Q+`. Unlike [`super::San`], the origin square is always
/// written out in full, so decoding it needs no legal-move context beyond
/// matching origin/destination/promotion exactly (per spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LongAlgebraic {
    pub piece_type: Option<PieceType>,
    pub from: Square,
    pub to: Square,
    pub is_capture: bool,
    pub promotion: Option<PieceType>,
}

impl LongAlgebraic {
    /// Builds the long-algebraic rendering of `mv`. The piece letter is
    /// included for every non-pawn move, matching the examples in spec §4.8.
    pub fn from_move(mv: Move) -> Self {
        let piece_type = (mv.piece().piece_type() != PieceType::Pawn).then(|| mv.piece().piece_type());
        Self {
            piece_type,
            from: mv.from_square(),
            to: mv.to_square(),
            is_capture: mv.is_capture(),
            promotion: mv.promotion(),
        }
    }

    /// Matches this token's origin, destination, and promotion target
    /// against `mv`, ignoring tag bits and the written capture marker.
    pub fn matches(self, mv: Move) -> bool {
        mv.matches(self.from, self.to, self.promotion)
    }

    /// Decodes `s` against `legal_moves`, requiring a unique origin/
    /// destination/promotion match.
    pub fn decode(s: &str, legal_moves: &[Move]) -> Result<Move, LongAlgebraicError> {
        let token: LongAlgebraic = s.parse()?;
        let matches: Vec<Move> = legal_moves
            .iter()
            .copied()
            .filter(|&m| token.matches(m))
            .collect();

        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(LongAlgebraicError::IllegalMove(s.to_string())),
            _ => Err(LongAlgebraicError::Ambiguous(s.to_string())),
        }
    }
}

impl Display for LongAlgebraic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(piece_type) = self.piece_type {
            write!(f, "{}", piece_type.as_uppercase_char())?;
        }
        write!(f, "{}", self.from)?;
        f.write_str(if self.is_capture { "x" } else { "-" })?;
        write!(f, "{}", self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion.as_uppercase_char())?;
        }
        Ok(())
    }
}

impl FromStr for LongAlgebraic {
    type Err = LongAlgebraicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_end_matches(['+', '#']);
        let chars: Vec<char> = trimmed.chars().collect();
        if chars.is_empty() {
            return Err(LongAlgebraicError::Malformed(s.to_string()));
        }

        let mut pos = 0;
        let piece_type = match chars[0] {
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            'P' => Some(PieceType::Pawn),
            _ => None,
        };
        if piece_type.is_some() {
            pos += 1;
        }

        let from_str: String = chars.get(pos..pos + 2).map(|c| c.iter().collect()).ok_or_else(|| {
            LongAlgebraicError::Malformed(s.to_string())
        })?;
        let from: Square = from_str
            .parse()
            .map_err(|_| LongAlgebraicError::InvalidSquare(from_str))?;
        pos += 2;

        let is_capture = match chars.get(pos) {
            Some('x') => true,
            Some('-') => false,
            _ => return Err(LongAlgebraicError::Malformed(s.to_string())),
        };
        pos += 1;

        let to_str: String = chars.get(pos..pos + 2).map(|c| c.iter().collect()).ok_or_else(|| {
            LongAlgebraicError::Malformed(s.to_string())
        })?;
        let to: Square = to_str
            .parse()
            .map_err(|_| LongAlgebraicError::InvalidSquare(to_str))?;
        pos += 2;

        let promotion = match chars.get(pos) {
            None => None,
            Some('=') => {
                let promo_char = *chars
                    .get(pos + 1)
                    .ok_or_else(|| LongAlgebraicError::Malformed(s.to_string()))?;
                Some(
                    Piece::try_from_fen_char(promo_char)
                        .ok_or(LongAlgebraicError::InvalidPromoTarget(promo_char))?
                        .piece_type(),
                )
            }
            Some(other) => return Err(LongAlgebraicError::Malformed(format!("{s} (at '{other}')"))),
        };

        Ok(Self {
            piece_type,
            from,
            to,
            is_capture,
            promotion,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LongAlgebraicError {
    #[error("malformed long algebraic move '{0}'")]
    Malformed(String),
    #[error("invalid square '{0}'")]
    InvalidSquare(String),
    #[error("invalid promotion target '{0}'")]
    InvalidPromoTarget(char),
    #[error("'{0}' does not match any legal move")]
    IllegalMove(String),
    #[error("'{0}' matches more than one legal move")]
    Ambiguous(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_pawn_push() {
        let parsed: LongAlgebraic = "e2-e4".parse().unwrap();
        assert_eq!(parsed.from, Square::E2);
        assert_eq!(parsed.to, Square::E4);
        assert!(!parsed.is_capture);
    }

    #[test]
    fn parse_piece_capture_with_promotion() {
        let parsed: LongAlgebraic = "Pe7xd8=Q+".parse().unwrap();
        assert_eq!(parsed.from, Square::E7);
        assert_eq!(parsed.to, Square::D8);
        assert!(parsed.is_capture);
        assert_eq!(parsed.promotion, Some(PieceType::Queen));
    }

    #[test]
    fn decode_against_legal_moves() {
        let position = Position::starting_position();
        let mv = LongAlgebraic::decode("e2-e4", &position.legal_moves()).unwrap();
        assert_eq!(mv.from_square(), Square::E2);
        assert_eq!(mv.to_square(), Square::E4);
    }

    #[test]
    fn display_roundtrip() {
        let position = Position::starting_position();
        let mv = position
            .legal_moves()
            .into_iter()
            .find(|m| m.from_square() == Square::G1 && m.to_square() == Square::F3)
            .unwrap();
        assert_eq!(LongAlgebraic::from_move(mv).to_string(), "Ng1-f3");
    }
}
