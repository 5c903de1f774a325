use std::fmt::{Display, Write};

use thiserror::Error;

use super::{chess_move::Move, piece::PieceType, position::Position, square::Square};

#[derive(Debug, Clone, Copy)]
enum Disambiguator {
    File(u8),
    Rank(u8),
    Square(Square),
}

impl Display for Disambiguator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disambiguator::File(file) => f.write_char((file + b'a') as char),
            Disambiguator::Rank(rank) => f.write_char((rank + b'1') as char),
            Disambiguator::Square(square) => write!(f, "{square}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RegularSan {
    piece_type: PieceType,
    disambiguator: Option<Disambiguator>,
    is_capture: bool,
    to_square: Square,
    promotion: Option<PieceType>,
}

impl Display for RegularSan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.piece_type != PieceType::Pawn {
            f.write_char(self.piece_type.as_uppercase_char())?;
        }

        if let Some(disambiguator) = self.disambiguator {
            write!(f, "{disambiguator}")?;
        }

        if self.is_capture {
            f.write_char('x')?;
        }

        write!(f, "{}", self.to_square)?;

        if let Some(promotion) = self.promotion {
            f.write_char('=')?;
            f.write_char(promotion.as_uppercase_char())?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum SanRepr {
    Regular(RegularSan),
    Castle { is_long: bool },
}

impl Display for SanRepr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanRepr::Regular(r) => write!(f, "{r}"),
            SanRepr::Castle { is_long: false } => write!(f, "O-O"),
            SanRepr::Castle { is_long: true } => write!(f, "O-O-O"),
        }
    }
}

/// Standard Algebraic Notation rendering of a single move, per spec §4.8.
#[derive(Debug, Clone, Copy)]
pub struct San {
    repr: SanRepr,
    is_check: bool,
    is_checkmate: bool,
}

impl Display for San {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repr)?;

        if self.is_checkmate {
            f.write_char('#')?;
        } else if self.is_check {
            f.write_char('+')?;
        }

        Ok(())
    }
}

impl San {
    /// Encodes `mv` (assumed legal in `position`) to SAN, choosing the
    /// shortest disambiguator that uniquely identifies the origin among
    /// legal same-target moves of the same piece type, per spec §4.8.
    pub fn encode(position: &Position, mv: Move) -> Self {
        let legal_moves = position.legal_moves();

        let repr = if mv.is_king_side_castle() {
            SanRepr::Castle { is_long: false }
        } else if mv.is_queen_side_castle() {
            SanRepr::Castle { is_long: true }
        } else {
            let piece_type = mv.piece().piece_type();
            // Pawn captures always carry the origin file (`exd5`), whether
            // or not another pawn could reach the same square; pawn pushes
            // never need disambiguation at all.
            let disambiguator = if piece_type == PieceType::Pawn {
                mv.is_capture().then(|| Disambiguator::File(mv.from_square().file()))
            } else {
                disambiguator(mv, &legal_moves)
            };

            SanRepr::Regular(RegularSan {
                piece_type,
                disambiguator,
                is_capture: mv.is_capture(),
                to_square: mv.to_square(),
                promotion: mv.promotion(),
            })
        };

        let after = position.apply_move(mv);
        let is_check = after.in_check();
        let is_checkmate = is_check && after.legal_moves().is_empty();

        San {
            repr,
            is_check,
            is_checkmate,
        }
    }

    /// Decodes a SAN string against `position`'s legal-move set, per spec
    /// §4.6. Requires a unique match.
    pub fn decode(s: &str, position: &Position) -> Result<Move, SanError> {
        let legal_moves = position.legal_moves();
        let trimmed = s.trim_end_matches(['+', '#']);

        // Literal digit `0-0`/`0-0-0` is deliberately not accepted here --
        // only the letter-O castling notation is valid SAN.
        if trimmed == "O-O" {
            return legal_moves
                .into_iter()
                .find(|m| m.is_king_side_castle())
                .ok_or(SanError::IllegalMove(s.to_string()));
        }
        if trimmed == "O-O-O" {
            return legal_moves
                .into_iter()
                .find(|m| m.is_queen_side_castle())
                .ok_or(SanError::IllegalMove(s.to_string()));
        }

        let parsed = parse_regular(trimmed).ok_or_else(|| SanError::Malformed(s.to_string()))?;

        let matches: Vec<Move> = legal_moves
            .into_iter()
            .filter(|m| {
                m.piece().piece_type() == parsed.piece_type
                    && m.to_square() == parsed.to_square
                    && m.is_capture() == parsed.is_capture
                    && m.promotion() == parsed.promotion
                    && parsed
                        .origin_file
                        .map_or(true, |f| m.from_square().file() == f)
                    && parsed
                        .origin_rank
                        .map_or(true, |r| m.from_square().rank() == r)
            })
            .collect();

        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(SanError::IllegalMove(s.to_string())),
            _ => Err(SanError::Ambiguous(s.to_string())),
        }
    }

    /// Pure syntactic check reusing the same grammar as [`San::decode`],
    /// without reference to any position -- per spec §4.8 `ValidateSAN`.
    pub fn validate(s: &str) -> Result<(), SanError> {
        let trimmed = s.trim_end_matches(['+', '#']);
        if trimmed == "O-O" || trimmed == "O-O-O" {
            return Ok(());
        }
        parse_regular(trimmed)
            .map(|_| ())
            .ok_or_else(|| SanError::Malformed(s.to_string()))
    }
}

fn disambiguator(mv: Move, legal_moves: &[Move]) -> Option<Disambiguator> {
    let mut ambiguous = false;
    let mut same_rank = false;
    let mut same_file = false;

    for m in legal_moves {
        if m.piece() == mv.piece() && m.from_square() != mv.from_square() && m.to_square() == mv.to_square() {
            ambiguous = true;
            same_rank |= m.from_square().rank() == mv.from_square().rank();
            same_file |= m.from_square().file() == mv.from_square().file();
        }
    }

    if !ambiguous {
        None
    } else if !same_file {
        Some(Disambiguator::File(mv.from_square().file()))
    } else if !same_rank {
        Some(Disambiguator::Rank(mv.from_square().rank()))
    } else {
        Some(Disambiguator::Square(mv.from_square()))
    }
}

struct ParsedRegular {
    piece_type: PieceType,
    origin_file: Option<u8>,
    origin_rank: Option<u8>,
    is_capture: bool,
    to_square: Square,
    promotion: Option<PieceType>,
}

/// Hand-rolled recursive-descent-free parser for the non-castling SAN
/// grammar: `piece? (file? rank? | fullSquare)? x? destSquare (=promo)?`.
/// Also accepts the non-standard `DeambiguationSquare` form (a full origin
/// square directly before the destination, e.g. `Qe8f7`) per spec §9.
fn parse_regular(s: &str) -> Option<ParsedRegular> {
    let bytes: Vec<char> = s.chars().collect();
    let mut pos = 0;

    let piece_type = match bytes.first()? {
        'N' => Some(PieceType::Knight),
        'B' => Some(PieceType::Bishop),
        'R' => Some(PieceType::Rook),
        'Q' => Some(PieceType::Queen),
        'K' => Some(PieceType::King),
        _ => None,
    };
    if piece_type.is_some() {
        pos += 1;
    }
    let piece_type = piece_type.unwrap_or(PieceType::Pawn);

    // Collect remaining tokens before an optional trailing `=promo`.
    let (body, promotion) = match bytes.iter().position(|&c| c == '=') {
        Some(eq_index) => {
            let promo_char = *bytes.get(eq_index + 1)?;
            let promotion = match promo_char {
                'Q' => PieceType::Queen,
                'R' => PieceType::Rook,
                'B' => PieceType::Bishop,
                'N' => PieceType::Knight,
                _ => return None,
            };
            (&bytes[pos..eq_index], Some(promotion))
        }
        None => (&bytes[pos..], None),
    };

    let is_capture = body.contains(&'x');
    let body: Vec<char> = body.iter().copied().filter(|&c| c != 'x').collect();

    // body is now some combination of disambiguation + destination square,
    // expressed as file/rank characters: a run of 2, 4 (DeambiguationSquare
    // + destination), 3 (single file-or-rank disambiguator + destination),
    // or 1 (file disambiguator only, no rank -- invalid for a destination,
    // rejected below) characters.
    if body.len() < 2 || body.len() > 4 {
        return None;
    }

    let dest_str: String = body[body.len() - 2..].iter().collect();
    let to_square: Square = dest_str.parse().ok()?;

    let disambig: Vec<char> = body[..body.len() - 2].to_vec();
    let (origin_file, origin_rank) = match disambig.as_slice() {
        [] => (None, None),
        [f] if f.is_ascii_lowercase() => (Some(*f as u8 - b'a'), None),
        [r] if r.is_ascii_digit() => (None, Some(*r as u8 - b'1')),
        [f, r] => {
            let square_str: String = [*f, *r].iter().collect();
            let square: Square = square_str.parse().ok()?;
            (Some(square.file()), Some(square.rank()))
        }
        _ => return None,
    };

    Some(ParsedRegular {
        piece_type,
        origin_file,
        origin_rank,
        is_capture,
        to_square,
        promotion,
    })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("malformed SAN token '{0}'")]
    Malformed(String),
    #[error("'{0}' does not match any legal move")]
    IllegalMove(String),
    #[error("'{0}' matches more than one legal move")]
    Ambiguous(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_pawn_push() {
        let position = Position::starting_position();
        let mv = position
            .legal_moves()
            .into_iter()
            .find(|m| m.from_square() == Square::E2 && m.to_square() == Square::E4)
            .unwrap();
        assert_eq!(San::encode(&position, mv).to_string(), "e4");
    }

    #[test]
    fn encode_pawn_capture_always_carries_origin_file() {
        // Only the e-pawn can take on d5, but the file prefix is required
        // regardless of whether another pawn could reach the same square.
        let position = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        )
        .unwrap();
        let mv = position
            .legal_moves()
            .into_iter()
            .find(|m| m.from_square() == Square::E4 && m.to_square() == Square::D5)
            .unwrap();
        assert_eq!(San::encode(&position, mv).to_string(), "exd5");
    }

    #[test]
    fn decode_pawn_push() {
        let position = Position::starting_position();
        let mv = San::decode("e4", &position).unwrap();
        assert_eq!(mv.from_square(), Square::E2);
        assert_eq!(mv.to_square(), Square::E4);
    }

    #[test]
    fn decode_checkmate_scenario() {
        let position = Position::from_fen(
            "rn1qkbnr/pbpp1ppp/1p6/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 0 1",
        )
        .unwrap();
        let mv = San::decode("Qxf7#", &position).unwrap();
        let after = position.apply_move(mv);
        assert!(after.is_checkmate());
    }

    #[test]
    fn decode_castle() {
        let position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = San::decode("O-O", &position).unwrap();
        assert!(mv.is_king_side_castle());
    }

    #[test]
    fn validate_san_rejects_garbage() {
        assert!(San::validate("e4").is_ok());
        assert!(San::validate("Nf3").is_ok());
        assert!(San::validate("not-a-move").is_err());
    }

    #[test]
    fn disambiguates_by_file() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        let moves = position.legal_moves();
        let rook_to_d1 = moves
            .iter()
            .find(|m| m.piece().is_rook() && m.to_square() == Square::D1 && m.from_square() == Square::A1)
            .copied()
            .unwrap();
        assert_eq!(San::encode(&position, rook_to_d1).to_string(), "Rad1");
    }
}
