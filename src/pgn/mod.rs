//! PGN scanning, tokenizing, parsing, and serialization, per spec §4.6/§4.7.

mod parser;
mod scanner;
mod serializer;
mod token;

use thiserror::Error;

use crate::game::Game;

pub use token::Token;

/// Structured PGN error, per spec §7's `ParserError`: carries the token
/// index (or byte offset, for tokenizer-level failures) and a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("no parseable game found in input")]
    NoGameFound,
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("malformed {0} at offset {1}")]
    Malformed(String, usize),
    #[error("unterminated {0} starting at offset {1}")]
    UnterminatedToken(String, usize),
    #[error("unexpected token at index {index}: {message} (found {found})")]
    Unexpected {
        index: usize,
        found: String,
        message: String,
    },
    #[error("'{text}' at token {index} does not match any legal move: {message}")]
    IllegalMove {
        index: usize,
        text: String,
        message: String,
    },
    #[error("invalid FEN tag: {0}")]
    Fen(String),
}

/// Parses the first game out of `input`.
pub fn parse_one(input: &str) -> Result<Game, PgnError> {
    parser::parse_one(input)
}

/// Parses every game out of a multi-game PGN stream.
pub fn parse_all(input: &str) -> Result<Vec<Game>, PgnError> {
    scanner::split_games(input)
        .iter()
        .map(|chunk| parser::parse_one(chunk))
        .collect()
}

/// Renders `game` back to PGN text, per spec §4.7.
pub fn serialize(game: &Game) -> String {
    serializer::serialize(game)
}
