//! PGN export, per spec §4.7.

use std::fmt::Write;

use crate::board::{Color, San};
use crate::game::{Game, NodeId, Outcome};

const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Renders `game` as PGN text: tag pairs in roster order, then the movetext
/// with inline variations, then the result token.
pub fn serialize(game: &Game) -> String {
    let mut out = String::new();
    write_tag_pairs(game, &mut out);
    out.push('\n');

    if let Some(comment) = game.node_at(game.root_move()).comment() {
        let _ = write!(out, "{{{comment}}} ");
    }

    let mut needs_number = true;
    write_line(game, game.root_move(), &mut out, &mut needs_number);

    let _ = write!(out, "{}", result_token(game));
    out.push('\n');
    out
}

fn write_tag_pairs(game: &Game, out: &mut String) {
    for key in SEVEN_TAG_ROSTER {
        if let Some(value) = game.get_tag_pair(key) {
            let _ = writeln!(out, "[{key} \"{}\"]", escape(value));
        }
    }

    let mut rest: Vec<(&str, &str)> = game
        .tag_pairs()
        .iter()
        .filter(|(k, _)| !SEVEN_TAG_ROSTER.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    rest.sort_by_key(|(k, _)| *k);
    for (key, value) in rest {
        let _ = writeln!(out, "[{key} \"{}\"]", escape(value));
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn result_token(game: &Game) -> &'static str {
    match game.outcome() {
        Outcome::WhiteWon => "1-0",
        Outcome::BlackWon => "0-1",
        Outcome::Draw => "1/2-1/2",
        Outcome::NoOutcome => "*",
    }
}

/// Walks the main line from `node`, writing each move with its move-number
/// prefix, comment, NAG, and any non-mainline variations inline.
fn write_line(game: &Game, node: NodeId, out: &mut String, needs_number: &mut bool) {
    let mut cursor = node;
    loop {
        let Some(&child) = game.node_at(cursor).children().first() else {
            break;
        };

        write_move(game, child, out, *needs_number);
        *needs_number = false;

        for &variation_root in game.variations(cursor) {
            let _ = write!(out, "(");
            let mut inner_needs_number = true;
            write_move(game, variation_root, out, inner_needs_number);
            inner_needs_number = false;
            write_line(game, variation_root, out, &mut inner_needs_number);
            let _ = write!(out, ") ");
            // A variation breaks move-number continuity for the line after it.
            *needs_number = true;
        }

        cursor = child;
    }
}

fn write_move(game: &Game, node_id: NodeId, out: &mut String, needs_number: bool) {
    let node = game.node_at(node_id);
    let mv = node.mv().expect("non-root node always has a move");
    let parent_position = game.node_at(node.parent().expect("non-root has a parent")).position();
    let san = San::encode(parent_position, mv);
    let is_black_to_move_before = parent_position.turn() == Color::Black;

    if needs_number {
        if is_black_to_move_before {
            let _ = write!(out, "{}... ", node.number());
        } else {
            let _ = write!(out, "{}. ", node.number());
        }
    } else if !is_black_to_move_before {
        let _ = write!(out, "{}. ", node.number());
    }

    let _ = write!(out, "{san} ");

    if let Some(nag) = node.nag() {
        let _ = write!(out, "${nag} ");
    }
    if let Some(comment) = node.comment() {
        let _ = write!(out, "{{{comment}}} ");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_simple_mainline() {
        let mut game = Game::new();
        game.push_move("e4").unwrap();
        game.push_move("e5").unwrap();
        let pgn = serialize(&game);
        assert!(pgn.contains("1. e4 e5"));
        assert!(pgn.trim_end().ends_with('*'));
    }

    #[test]
    fn serializes_tag_pairs_in_roster_order() {
        let mut game = Game::new();
        game.add_tag_pair("White", "Alice");
        game.add_tag_pair("Event", "Casual");
        let pgn = serialize(&game);
        let event_pos = pgn.find("[Event").unwrap();
        let white_pos = pgn.find("[White").unwrap();
        assert!(event_pos < white_pos);
    }

    #[test]
    fn serializes_a_variation() {
        let mut game = Game::new();
        game.push_move("e4").unwrap();
        game.go_back();
        game.push_move("d4").unwrap();
        game.go_back();
        game.push_move("e4").unwrap();
        let pgn = serialize(&game);
        assert!(pgn.contains("(1. d4)"));
    }
}
