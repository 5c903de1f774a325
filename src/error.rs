use thiserror::Error;

use crate::board::{FenError, LongAlgebraicError, ParseSquareError, SanError, UciError};
use crate::game::GameError;
use crate::pgn::PgnError;

/// Crate-level umbrella error, per spec §7. Individual modules return their
/// own narrower error types; this exists for callers that want one type to
/// match on across the whole library surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    San(#[from] SanError),
    #[error(transparent)]
    LongAlgebraic(#[from] LongAlgebraicError),
    #[error(transparent)]
    Uci(#[from] UciError),
    #[error(transparent)]
    Square(#[from] ParseSquareError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Pgn(#[from] PgnError),
}
