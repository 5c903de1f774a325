use std::{
    fmt::{Display, Write},
    str::FromStr,
};

use thiserror::Error;

use super::{chess_move::Move, Piece, PieceType, Square};

/// Utility type representing a move as used in the Universal Chess Interface
/// (UCI).
///
/// This type is intended for parsing the move format used in UCI, which simply
/// specifies the start and end squares as well as optional promotion. Some
/// examples are:
///
/// * `e2e4`
/// * `e7e5`
/// * `e1g1` (white short castling)
/// * `e7e8q` (for promotion)
///
/// This is sometimes called long algebraic notation, but long algebraic
/// notation may have additional information than required by UCI, e.g. the
/// piece being moved, captures etc.
///
/// ```
/// # use tafl::board::{UciMove, Square};
/// assert_eq!(
///     "e2e4".parse(),
///     Ok(UciMove {
///         from: Square::E2,
///         to: Square::E4,
///         promotion: None,
///     })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Display for UciMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.from.fmt(f)?;
        self.to.fmt(f)?;
        if let Some(promotion) = self.promotion {
            f.write_char(promotion.as_lowercase_char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseUciMoveError {
    #[error("Expected 4 or 5 characters")]
    IncorrectLength,
    #[error("Invalid square {0}")]
    InvalidSquare(String),
    #[error("Invalid promo target")]
    InvalidPromoTarget(char),
}

impl FromStr for UciMove {
    type Err = ParseUciMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // UCI is case-insensitive (spec §4.8); normalize before parsing the
        // square slices, which otherwise only accept lowercase files.
        let lowercase = s.to_ascii_lowercase();
        let chars = lowercase.chars().collect::<Vec<_>>();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(ParseUciMoveError::IncorrectLength);
        }

        let from_str = String::from_iter(&chars[0..2]);
        let from = from_str
            .parse()
            .map_err(|_| ParseUciMoveError::InvalidSquare(from_str))?;

        let to_str = String::from_iter(&chars[2..4]);
        let to = to_str
            .parse()
            .map_err(|_| ParseUciMoveError::InvalidSquare(to_str))?;

        let promotion = match chars.get(4) {
            Some(&c) => Some(
                Piece::try_from_fen_char(c)
                    .ok_or(ParseUciMoveError::InvalidPromoTarget(c))?
                    .piece_type(),
            ),
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl From<Move> for UciMove {
    fn from(value: Move) -> Self {
        Self {
            from: value.from_square(),
            to: value.to_square(),
            promotion: value.promotion().map(|p| p.piece_type()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_normal_move() {
        assert_eq!(
            "e2e4".parse(),
            Ok(UciMove {
                from: Square::E2,
                to: Square::E4,
                promotion: None,
            })
        );

        assert_eq!(
            "b8c6".parse(),
            Ok(UciMove {
                from: Square::B8,
                to: Square::C6,
                promotion: None,
            })
        );
    }

    #[test]
    fn parse_promotion() {
        assert_eq!(
            "e7e8q".parse(),
            Ok(UciMove {
                from: Square::E7,
                to: Square::E8,
                promotion: Some(PieceType::Queen)
            })
        );

        assert_eq!(
            "a2a1b".parse(),
            Ok(UciMove {
                from: Square::A2,
                to: Square::A1,
                promotion: Some(PieceType::Bishop),
            })
        );

        assert_eq!(
            "a2a1r".parse(),
            Ok(UciMove {
                from: Square::A2,
                to: Square::A1,
                promotion: Some(PieceType::Rook),
            })
        );

        assert_eq!(
            "a2a1n".parse(),
            Ok(UciMove {
                from: Square::A2,
                to: Square::A1,
                promotion: Some(PieceType::Knight),
            })
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "E2E4".parse(),
            Ok(UciMove {
                from: Square::E2,
                to: Square::E4,
                promotion: None,
            })
        );
        assert_eq!(
            "E7E8Q".parse(),
            Ok(UciMove {
                from: Square::E7,
                to: Square::E8,
                promotion: Some(PieceType::Queen),
            })
        );
    }

    #[test]
    fn parse_invalid_cases() {
        assert_eq!(
            UciMove::from_str(""),
            Err(ParseUciMoveError::IncorrectLength)
        );
        assert_eq!(
            UciMove::from_str("e7e8qq"),
            Err(ParseUciMoveError::IncorrectLength)
        );

        assert_eq!(
            UciMove::from_str("a9e4"),
            Err(ParseUciMoveError::InvalidSquare("a9".to_string())),
        );
        assert_eq!(
            UciMove::from_str("a1xx"),
            Err(ParseUciMoveError::InvalidSquare("xx".to_string())),
        );

        assert_eq!(
            UciMove::from_str("e7e8x"),
            Err(ParseUciMoveError::InvalidPromoTarget('x'))
        );
    }

    #[test]
    fn display_impl() {
        assert_eq!(format!("{}", UciMove::from_str("e2e4").unwrap()), "e2e4");
        assert_eq!(format!("{}", UciMove::from_str("b8c6").unwrap()), "b8c6");
        assert_eq!(format!("{}", UciMove::from_str("e7e8q").unwrap()), "e7e8q");
    }
}
