//! Header and movetext parsing, per spec §4.6.

use indexmap::IndexMap;

use crate::board::{San, UciMove};
use crate::game::Game;

use super::token::{tokenize, Token};
use super::PgnError;

/// Parses the first game out of `input`.
pub fn parse_one(input: &str) -> Result<Game, PgnError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(PgnError::NoGameFound);
    }
    parse_tokens(&tokens)
}

fn parse_tokens(tokens: &[Token]) -> Result<Game, PgnError> {
    let mut pos = 0;
    let mut tag_pairs = IndexMap::new();

    while let Some(Token::Tag(key, value)) = tokens.get(pos) {
        tag_pairs.insert(key.clone(), value.clone());
        pos += 1;
    }

    let mut game = match tag_pairs.get("FEN") {
        Some(fen) => Game::from_fen(fen).map_err(|e| PgnError::Fen(e.to_string()))?,
        None => Game::new(),
    };
    for (key, value) in tag_pairs {
        game.add_tag_pair(key, value);
    }

    if is_whole_game_uci_fallback(tokens, pos) {
        parse_coordinate_movetext(&mut game, tokens, pos)?;
    } else {
        parse_movetext(&mut game, tokens, &mut pos, false)?;
    }

    Ok(game)
}

/// Whether the movetext starting at `start` should be read as a whole-game
/// coordinate-move list rather than SAN, per spec §4.6's last paragraph:
/// no tag/variation/comment/NAG tokens anywhere, and every move token is a
/// lowercase 4-or-5-character coordinate move.
fn is_whole_game_uci_fallback(tokens: &[Token], start: usize) -> bool {
    let mut saw_move = false;
    for token in &tokens[start..] {
        match token {
            Token::Move(text) => {
                saw_move = true;
                if !is_coordinate_token(text) {
                    return false;
                }
            }
            Token::MoveNumber(_, _) | Token::Result(_) => {}
            _ => return false,
        }
    }
    saw_move
}

fn is_coordinate_token(text: &str) -> bool {
    matches!(text.len(), 4 | 5)
        && text.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && text.parse::<UciMove>().is_ok()
}

/// Parses `tokens[start..]` as a bare UCI move list from the game's current
/// (root) position, per [`is_whole_game_uci_fallback`].
fn parse_coordinate_movetext(game: &mut Game, tokens: &[Token], start: usize) -> Result<(), PgnError> {
    for (index, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::MoveNumber(_, _) => {}
            Token::Move(text) => {
                let uci: UciMove = text.parse().expect("gated by is_coordinate_token");
                let legal_moves = game.position().legal_moves();
                let mv = legal_moves
                    .into_iter()
                    .find(|m| m.matches(uci.from, uci.to, uci.promotion))
                    .ok_or_else(|| PgnError::IllegalMove {
                        index,
                        text: text.to_string(),
                        message: "does not match any legal move".into(),
                    })?;
                game.move_(mv).map_err(|e| PgnError::IllegalMove {
                    index,
                    text: text.to_string(),
                    message: e.to_string(),
                })?;
            }
            Token::Result(result) => {
                apply_result(game, result);
                return Ok(());
            }
            _ => unreachable!("gated by is_whole_game_uci_fallback"),
        }
    }
    Ok(())
}

/// Parses moves/comments/NAGs/variations/result starting at `*pos`. Returns
/// when it consumes a [`Token::Result`], when it hits a [`Token::VariationEnd`]
/// (leaving it unconsumed, for the caller -- only valid when `in_variation`),
/// or when tokens run out.
fn parse_movetext(game: &mut Game, tokens: &[Token], pos: &mut usize, in_variation: bool) -> Result<(), PgnError> {
    while let Some(token) = tokens.get(*pos) {
        match token {
            Token::MoveNumber(_, _) => {
                *pos += 1;
            }
            Token::Move(text) => {
                let index = *pos;
                apply_move_token(game, text, index)?;
                *pos += 1;
                attach_annotations(game, tokens, pos);
            }
            Token::VariationStart => {
                *pos += 1;
                let saved = game.current_move();
                if !game.go_back() {
                    return Err(PgnError::Unexpected {
                        index: *pos - 1,
                        found: "(".into(),
                        message: "variation cannot open at the root".into(),
                    });
                }
                parse_movetext(game, tokens, pos, true)?;
                match tokens.get(*pos) {
                    Some(Token::VariationEnd) => *pos += 1,
                    _ => {
                        return Err(PgnError::Unexpected {
                            index: *pos,
                            found: format!("{:?}", tokens.get(*pos)),
                            message: "expected ')' to close variation".into(),
                        })
                    }
                }
                game.set_current_move(saved);
            }
            Token::VariationEnd => {
                if in_variation {
                    return Ok(());
                }
                return Err(PgnError::Unexpected {
                    index: *pos,
                    found: ")".into(),
                    message: "unmatched ')'".into(),
                });
            }
            Token::Comment(text) => {
                apply_comment(game, text);
                *pos += 1;
            }
            Token::Nag(nag) => {
                game.current_node_mut().set_nag(*nag);
                *pos += 1;
            }
            Token::Result(result) => {
                apply_result(game, result);
                *pos += 1;
                return Ok(());
            }
            Token::Tag(key, _) => {
                return Err(PgnError::Unexpected {
                    index: *pos,
                    found: key.clone(),
                    message: "tag pair found inside movetext".into(),
                });
            }
        }
    }

    if in_variation {
        return Err(PgnError::Unexpected {
            index: tokens.len(),
            found: "<eof>".into(),
            message: "unterminated variation".into(),
        });
    }
    Ok(())
}

fn attach_annotations(game: &mut Game, tokens: &[Token], pos: &mut usize) {
    while let Some(token) = tokens.get(*pos) {
        match token {
            Token::Nag(nag) => {
                game.current_node_mut().set_nag(*nag);
                *pos += 1;
            }
            Token::Comment(text) => {
                apply_comment(game, text);
                *pos += 1;
            }
            _ => break,
        }
    }
}

/// Attaches one `{…}` comment token to the current move. Multiple comment
/// tokens following the same move are concatenated space-separated (spec.md
/// line 188), and any `[%name params]` command tokens embedded anywhere in
/// the body are pulled out into the move's command map rather than kept as
/// comment text.
fn apply_comment(game: &mut Game, text: &str) {
    let (remaining, commands) = extract_commands(text);
    for (name, params) in commands {
        game.current_node_mut().command_mut().insert(name, params);
    }
    let remaining = remaining.trim();
    if !remaining.is_empty() {
        game.current_node_mut().append_comment(remaining);
    }
}

/// Scans `text` for `[%name params]` command tokens and returns the comment
/// text with those tokens removed (whitespace collapsed), plus the
/// extracted `(name, params)` pairs in encounter order.
fn extract_commands(text: &str) -> (String, Vec<(String, String)>) {
    let mut remaining = String::new();
    let mut commands = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("[%") {
        remaining.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(']') {
            Some(end) => {
                let body = &after[..end];
                let mut parts = body.splitn(2, char::is_whitespace);
                if let Some(name) = parts.next().filter(|s| !s.is_empty()) {
                    let params = parts.next().unwrap_or("").trim().to_string();
                    commands.push((name.to_string(), params));
                }
                rest = &after[end + 1..];
            }
            None => {
                remaining.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }
    remaining.push_str(rest);

    (remaining.split_whitespace().collect::<Vec<_>>().join(" "), commands)
}

fn apply_result(game: &mut Game, result: &str) {
    use crate::board::Color;
    use crate::game::Outcome;

    // The result token only confirms/records the already-evaluated outcome;
    // resignation is the one case `reevaluate_termination` cannot infer on
    // its own, since the board gives no signal for it.
    if game.outcome() == Outcome::NoOutcome {
        match result {
            "1-0" => game.resign(Color::Black),
            "0-1" => game.resign(Color::White),
            _ => {}
        }
    }
}

/// Decodes `text` as SAN and plays it. The coordinate/UCI fallback is a
/// whole-game decision made up front in [`is_whole_game_uci_fallback`], not
/// a per-token retry -- a single stray coordinate-looking word in an
/// otherwise SAN game is a SAN error, not a silently-accepted UCI move.
fn apply_move_token(game: &mut Game, text: &str, index: usize) -> Result<(), PgnError> {
    let mv = San::decode(text, game.position()).map_err(|e| PgnError::IllegalMove {
        index,
        text: text.to_string(),
        message: e.to_string(),
    })?;
    game.move_(mv).map_err(|e| PgnError::IllegalMove {
        index,
        text: text.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_game() {
        let game = parse_one("1. e4 e5 2. Nf3 *").unwrap();
        assert_eq!(game.moves().len(), 3);
    }

    #[test]
    fn parses_header_tags() {
        let game = parse_one("[Event \"Test Match\"]\n[Site \"Somewhere\"]\n\n1. e4 *").unwrap();
        assert_eq!(game.get_tag_pair("Event"), Some("Test Match"));
        assert_eq!(game.get_tag_pair("Site"), Some("Somewhere"));
    }

    #[test]
    fn fen_tag_replaces_root_position() {
        let pgn = "[FEN \"4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1\"]\n\n1. O-O *";
        let game = parse_one(pgn).unwrap();
        assert!(game.moves()[0].is_king_side_castle());
    }

    #[test]
    fn variation_is_recorded_as_sibling() {
        let game = parse_one("1. e4 (1. d4) 1... c5 *").unwrap();
        assert_eq!(game.moves().len(), 2);
        let root = game.root_move();
        assert_eq!(game.variations(root).len(), 1);
    }

    #[test]
    fn comment_is_attached_to_its_move() {
        let game = parse_one("1. e4 {a strong opener} e5 *").unwrap();
        let white_move = game.node_at(*game_main_line_nodes(&game).first().unwrap());
        assert_eq!(white_move.comment(), Some("a strong opener"));
    }

    #[test]
    fn nag_is_attached_to_its_move() {
        let game = parse_one("1. e4 $1 e5 *").unwrap();
        let white_move = game.node_at(*game_main_line_nodes(&game).first().unwrap());
        assert_eq!(white_move.nag(), Some(1));
    }

    #[test]
    fn result_records_resignation() {
        use crate::game::{Method, Outcome};
        let game = parse_one("1. e4 e5 1-0").unwrap();
        assert_eq!(game.outcome(), Outcome::WhiteWon);
        assert_eq!(game.method(), Method::Resignation);
    }

    #[test]
    fn malformed_move_reports_an_error() {
        let err = parse_one("1. e4 Zz9 *").unwrap_err();
        assert!(matches!(err, PgnError::IllegalMove { .. }));
    }

    #[test]
    fn consecutive_comments_are_concatenated() {
        let game = parse_one("1. e4 {first} {second} e5 *").unwrap();
        let white_move = game.node_at(*game_main_line_nodes(&game).first().unwrap());
        assert_eq!(white_move.comment(), Some("first second"));
    }

    #[test]
    fn embedded_command_is_split_from_comment_text() {
        let game = parse_one("1. e4 {great move [%clk 0:05:00]} e5 *").unwrap();
        let white_move = game.node_at(*game_main_line_nodes(&game).first().unwrap());
        assert_eq!(white_move.comment(), Some("great move"));
        assert_eq!(white_move.command().get("clk").map(String::as_str), Some("0:05:00"));
    }

    #[test]
    fn comment_that_is_only_a_command_leaves_no_comment_text() {
        let game = parse_one("1. e4 {[%clk 0:05:00]} e5 *").unwrap();
        let white_move = game.node_at(*game_main_line_nodes(&game).first().unwrap());
        assert_eq!(white_move.comment(), None);
        assert_eq!(white_move.command().get("clk").map(String::as_str), Some("0:05:00"));
    }

    #[test]
    fn whole_game_coordinate_list_is_parsed_as_uci() {
        let game = parse_one("1. e2e4 e7e5 2. g1f3 *").unwrap();
        assert_eq!(game.moves().len(), 3);
    }

    #[test]
    fn stray_coordinate_looking_token_in_san_game_is_an_error() {
        // e2e4 is not valid SAN from the opening position, and the rest of
        // the game isn't all coordinate-shaped, so this must not silently
        // fall back to UCI for just this one token.
        let err = parse_one("1. e2e4 e5 2. Nf3 *").unwrap_err();
        assert!(matches!(err, PgnError::IllegalMove { .. }));
    }

    fn game_main_line_nodes(game: &Game) -> Vec<crate::game::NodeId> {
        let mut nodes = Vec::new();
        let mut cursor = game.root_move();
        while let Some(&child) = game.node_at(cursor).children().first() {
            nodes.push(child);
            cursor = child;
        }
        nodes
    }
}
