//! Board representation, position value type, move representation, and
//! notation codecs (SAN, Long Algebraic, UCI, FEN).

pub mod bitboard;
pub mod castling;
pub mod chess_move;
pub mod long_algebraic;
pub mod piece;
pub mod position;
pub mod san;
pub mod square;
pub mod uci_move;
mod zobrist;

pub use bitboard::Bitboard;
pub use castling::Castling;
pub use chess_move::{Move, MoveFlags};
pub use long_algebraic::{LongAlgebraic, LongAlgebraicError};
pub use piece::{Color, Piece, PieceType};
pub use position::{Board, FenError, Position};
pub use san::{SanError, San};
pub use square::{ParseSquareError, Square};
pub use uci_move::{ParseUciMoveError as UciError, UciMove};
pub use zobrist::ZobristHash;
