//! Rules-accurate chess position engine, game tree, and PGN/FEN interchange.
//!
//! - [`board`] holds the position/move value types and notation codecs.
//! - [`move_gen`] generates legal moves for a [`board::Position`].
//! - [`game`] is the move-tree/game-state layer built on top of those.
//! - [`pgn`] reads and writes PGN text against a [`game::Game`].
//! - [`error`] is a crate-level umbrella error for callers who want one type.

pub mod board;
pub mod error;
pub mod game;
pub mod move_gen;
pub mod pgn;

#[cfg(test)]
mod test_utils;

pub use board::{Board, Move, Piece, PieceType, Position, Square};
pub use error::ChessError;
pub use game::Game;
