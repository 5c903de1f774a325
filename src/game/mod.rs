//! Move tree, navigation, outcome tracking, and game construction, per spec
//! §3/§4.3/§4.5.

mod node;
mod outcome;

use indexmap::IndexMap;
use thiserror::Error;

use crate::board::{FenError, LongAlgebraic, LongAlgebraicError, Move, Position, San, SanError, UciError, UciMove};
use crate::pgn::{self, PgnError};

pub use node::{MoveNode, NodeId};
pub use outcome::{Method, Outcome};

/// Which notation [`Game::push_notation_move`] should decode against the
/// current position, per spec §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    San,
    LongAlgebraic,
    Uci,
}

/// Options controlling how a move is attached to the tree, per spec §4.5
/// step 2/3's `ForceMainline` parameter and spec §9's "Game options pattern".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    force_mainline: bool,
}

impl MoveOptions {
    /// When `true`, an existing matching child is reordered to position 0
    /// (or a new child is prepended), making this move the main-line
    /// continuation regardless of move order played so far.
    pub fn force_mainline(mut self, force_mainline: bool) -> Self {
        self.force_mainline = force_mainline;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    San(#[from] SanError),
    #[error(transparent)]
    LongAlgebraic(#[from] LongAlgebraicError),
    #[error(transparent)]
    Uci(#[from] UciError),
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Pgn(#[from] PgnError),
    #[error("move is not legal in the current position")]
    IllegalMove,
    #[error("{0:?} is not available: its precondition is not met")]
    DrawMethodNotAvailable(Method),
}

/// A chess game: the move tree (main line plus variations), navigation
/// cursor, outcome tracking, and PGN metadata, per spec §3.
///
/// Treated as a value: [`Clone`] performs a full deep copy (the arena is a
/// plain `Vec`, so `#[derive(Clone)]` already satisfies the spec's "mutating
/// the clone must never observably mutate the original" requirement).
#[derive(Debug, Clone)]
pub struct Game {
    nodes: Vec<MoveNode>,
    current: NodeId,
    outcome: Outcome,
    method: Method,
    tag_pairs: IndexMap<String, String>,
    comments: Vec<Vec<String>>,
    ignore_fivefold_repetition_draw: bool,
    ignore_seventy_five_move_rule_draw: bool,
    ignore_insufficient_material_draw: bool,
}

const ROOT: NodeId = NodeId(0);

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting_position())
    }

    /// A new game whose root position is decoded from `fen`, per spec §6's
    /// "Game constructors with optional modifier values".
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Parses `pgn` and returns the first game it contains.
    pub fn from_pgn(pgn_text: &str) -> Result<Self, GameError> {
        pgn::parse_one(pgn_text).map_err(GameError::from)
    }

    fn from_position(position: Position) -> Self {
        Self {
            nodes: vec![MoveNode::root(position)],
            current: ROOT,
            outcome: Outcome::NoOutcome,
            method: Method::NoMethod,
            tag_pairs: IndexMap::new(),
            comments: Vec::new(),
            ignore_fivefold_repetition_draw: false,
            ignore_seventy_five_move_rule_draw: false,
            ignore_insufficient_material_draw: false,
        }
    }

    /// Builder modifier: stop auto-declaring fivefold-repetition draws, per
    /// spec §9's "Game options pattern".
    pub fn ignoring_fivefold_repetition(mut self) -> Self {
        self.ignore_fivefold_repetition_draw = true;
        self
    }

    pub fn ignoring_seventy_five_move_rule(mut self) -> Self {
        self.ignore_seventy_five_move_rule_draw = true;
        self
    }

    pub fn ignoring_insufficient_material(mut self) -> Self {
        self.ignore_insufficient_material_draw = true;
        self
    }

    fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    pub fn root_move(&self) -> NodeId {
        ROOT
    }

    pub fn current_move(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &MoveNode {
        self.node(self.current)
    }

    pub fn current_node_mut(&mut self) -> &mut MoveNode {
        let current = self.current;
        self.node_mut(current)
    }

    pub fn node_at(&self, id: NodeId) -> &MoveNode {
        self.node(id)
    }

    /// Moves the cursor directly to `id`, without validating adjacency. Used
    /// by the PGN parser to rewind/restore around a variation.
    pub(crate) fn set_current_move(&mut self, id: NodeId) {
        self.current = id;
    }

    pub fn position(&self) -> &Position {
        self.node(self.current).position()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn tag_pairs(&self) -> &IndexMap<String, String> {
        &self.tag_pairs
    }

    pub fn add_tag_pair(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tag_pairs.insert(key.into(), value.into());
    }

    pub fn get_tag_pair(&self, key: &str) -> Option<&str> {
        self.tag_pairs.get(key).map(String::as_str)
    }

    pub fn remove_tag_pair(&mut self, key: &str) -> Option<String> {
        self.tag_pairs.shift_remove(key)
    }

    pub fn comments(&self) -> &[Vec<String>] {
        &self.comments
    }

    // --- Move application (spec §4.5) ---------------------------------

    /// Decodes `san` against the current position and plays it if it
    /// uniquely matches a legal move.
    pub fn push_move(&mut self, san: &str) -> Result<(), GameError> {
        self.push_move_with_options(san, MoveOptions::default())
    }

    /// As [`Self::push_move`], but with [`MoveOptions`] controlling how the
    /// move attaches to the tree (e.g. `ForceMainline`, per spec §4.5).
    pub fn push_move_with_options(&mut self, san: &str, options: MoveOptions) -> Result<(), GameError> {
        let mv = San::decode(san, self.position())?;
        self.move_with_options(mv, options)
    }

    /// Decodes `notation_str` using `notation` and plays it.
    pub fn push_notation_move(&mut self, notation_str: &str, notation: Notation) -> Result<(), GameError> {
        self.push_notation_move_with_options(notation_str, notation, MoveOptions::default())
    }

    /// As [`Self::push_notation_move`], but with [`MoveOptions`] controlling
    /// how the move attaches to the tree.
    pub fn push_notation_move_with_options(
        &mut self,
        notation_str: &str,
        notation: Notation,
        options: MoveOptions,
    ) -> Result<(), GameError> {
        let legal_moves = self.position().legal_moves();
        let mv = match notation {
            Notation::San => San::decode(notation_str, self.position())?,
            Notation::LongAlgebraic => LongAlgebraic::decode(notation_str, &legal_moves)?,
            Notation::Uci => {
                let token: UciMove = notation_str.parse().map_err(GameError::from)?;
                legal_moves
                    .into_iter()
                    .find(|m| m.matches(token.from, token.to, token.promotion))
                    .ok_or(GameError::IllegalMove)?
            }
        };
        self.move_with_options(mv, options)
    }

    /// Validates `mv` against the current position's legal-move set (by
    /// origin, destination, promotion) and plays it. A failed call leaves
    /// the game completely unchanged, per spec §7's propagation policy.
    pub fn move_(&mut self, mv: Move) -> Result<(), GameError> {
        self.move_with_options(mv, MoveOptions::default())
    }

    /// As [`Self::move_`], but with [`MoveOptions`] controlling how the move
    /// attaches to the tree.
    pub fn move_with_options(&mut self, mv: Move, options: MoveOptions) -> Result<(), GameError> {
        let legal_moves = self.position().legal_moves();
        let matched = legal_moves
            .into_iter()
            .find(|m| m.matches(mv.from_square(), mv.to_square(), mv.promotion()))
            .ok_or(GameError::IllegalMove)?;
        self.move_unchecked(matched, options.force_mainline);
        Ok(())
    }

    /// Plays `mv` without validating it against the legal-move set.
    pub fn unsafe_move(&mut self, mv: Move) {
        self.unsafe_move_with_options(mv, MoveOptions::default());
    }

    /// As [`Self::unsafe_move`], but with [`MoveOptions`] controlling how the
    /// move attaches to the tree.
    pub fn unsafe_move_with_options(&mut self, mv: Move, options: MoveOptions) {
        self.move_unchecked(mv, options.force_mainline);
    }

    /// The shared mutator described in spec §4.5: find-or-attach a child of
    /// the current node, update the cursor, cache the resulting position,
    /// and re-evaluate termination status.
    fn move_unchecked(&mut self, mv: Move, force_mainline: bool) -> NodeId {
        let current = self.current;
        let existing = self
            .node(current)
            .children()
            .iter()
            .position(|&child| self.node(child).mv().is_some_and(|m| {
                m.matches(mv.from_square(), mv.to_square(), mv.promotion())
            }));

        let child_id = match existing {
            Some(index) => {
                let child = self.node(current).children()[index];
                if force_mainline && index != 0 {
                    let children = &mut self.node_mut(current).children;
                    let entry = children.remove(index);
                    children.insert(0, entry);
                }
                child
            }
            None => {
                let number = self.position().fullmoves();
                let new_position = self.position().apply_move(mv);
                let node = MoveNode::child(new_position, mv, current, number);
                let id = NodeId(self.nodes.len());
                self.nodes.push(node);

                let children = &mut self.node_mut(current).children;
                if force_mainline {
                    children.insert(0, id);
                } else {
                    children.push(id);
                }
                id
            }
        };

        self.current = child_id;
        self.reevaluate_termination();
        child_id
    }

    /// Appends `mv` as a variation (non-mainline child) of `parent`.
    ///
    /// `parent` must be a valid id obtained from this `Game`. `NodeId`s are
    /// produced only by the crate itself and never attacker-controlled, so
    /// an out-of-range id reaching here indicates an internal bug, not a
    /// caller mistake worth a typed error -- per spec §9's "Panic vs error"
    /// design note.
    pub fn add_variation(&mut self, parent: NodeId, mv: Move) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "add_variation: invalid parent node id");
        let base_position = self.node(parent).position().clone();
        let number = base_position.fullmoves();
        let new_position = base_position.apply_move(mv);
        let node = MoveNode::child(new_position, mv, parent, number);
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Returns `move.children[1..]`, the sibling lines alternative to the
    /// main-line continuation, per spec §4.5.
    pub fn variations(&self, node: NodeId) -> &[NodeId] {
        let children = self.node(node).children();
        if children.len() >= 2 {
            &children[1..]
        } else {
            &[]
        }
    }

    // --- Navigation (spec §4.5/§6) -------------------------------------

    pub fn go_back(&mut self) -> bool {
        match self.node(self.current).parent() {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    pub fn go_forward(&mut self) -> bool {
        match self.node(self.current).children().first().copied() {
            Some(child) => {
                self.current = child;
                true
            }
            None => false,
        }
    }

    /// Walks up from the current node until it lands on a main-line node
    /// (root, or `node == node.parent.children[0]` recursively), then steps
    /// to `root.children[0]` if one exists; if root has no children, the
    /// cursor stays at root.
    pub fn navigate_to_main_line(&mut self) {
        self.current = self.node(ROOT).children().first().copied().unwrap_or(ROOT);
    }

    pub fn is_at_start(&self) -> bool {
        self.current == ROOT
    }

    pub fn is_at_end(&self) -> bool {
        self.node(self.current).children().is_empty()
    }

    /// The main-line move sequence: start from root, follow `children[0]`
    /// until a leaf, omitting the root sentinel.
    pub fn moves(&self) -> Vec<Move> {
        let mut result = Vec::new();
        let mut cursor = ROOT;
        while let Some(&child) = self.node(cursor).children().first() {
            result.push(self.node(child).mv().expect("non-root node always has a move"));
            cursor = child;
        }
        result
    }

    /// Positions along the main line, including the starting position.
    pub fn positions(&self) -> Vec<Position> {
        let mut result = vec![self.node(ROOT).position().clone()];
        let mut cursor = ROOT;
        while let Some(&child) = self.node(cursor).children().first() {
            result.push(self.node(child).position().clone());
            cursor = child;
        }
        result
    }

    /// Enumerates every root-to-leaf path and returns a standalone [`Game`]
    /// per path, sharing tags/flags but containing only that single line.
    pub fn split(&self) -> Vec<Game> {
        let mut leaves = Vec::new();
        self.collect_leaves(ROOT, &mut leaves);

        leaves
            .into_iter()
            .map(|leaf| {
                let mut path = Vec::new();
                let mut cursor = leaf;
                while let Some(parent) = self.node(cursor).parent() {
                    path.push(self.node(cursor).mv().expect("non-root node has a move"));
                    cursor = parent;
                }
                path.reverse();

                let mut game = Game::from_position(self.node(ROOT).position().clone());
                game.tag_pairs = self.tag_pairs.clone();
                game.comments = self.comments.clone();
                game.ignore_fivefold_repetition_draw = self.ignore_fivefold_repetition_draw;
                game.ignore_seventy_five_move_rule_draw = self.ignore_seventy_five_move_rule_draw;
                game.ignore_insufficient_material_draw = self.ignore_insufficient_material_draw;
                for mv in path {
                    game.unsafe_move(mv);
                }
                game
            })
            .collect()
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let children = self.node(node).children();
        if children.is_empty() {
            out.push(node);
        } else {
            for &child in children {
                self.collect_leaves(child, out);
            }
        }
    }

    // --- Termination (spec §4.3) ---------------------------------------

    pub fn resign(&mut self, color: crate::board::Color) {
        if self.outcome != Outcome::NoOutcome {
            return;
        }
        self.outcome = match color {
            crate::board::Color::White => Outcome::BlackWon,
            crate::board::Color::Black => Outcome::WhiteWon,
        };
        self.method = Method::Resignation;
    }

    /// The draw methods a caller could currently invoke via [`Self::draw`].
    pub fn eligible_draws(&self) -> Vec<Method> {
        let mut eligible = vec![Method::DrawOffer];
        if self.repetition_count() >= 3 {
            eligible.push(Method::ThreefoldRepetition);
        }
        if self.position().halfmove_clock() >= 100 {
            eligible.push(Method::FiftyMoveRule);
        }
        eligible
    }

    /// Claims a draw by `method`, per spec §4.3's claimable-draw semantics.
    pub fn draw(&mut self, method: Method) -> Result<(), GameError> {
        let available = match method {
            Method::DrawOffer => true,
            Method::ThreefoldRepetition => self.repetition_count() >= 3,
            Method::FiftyMoveRule => self.position().halfmove_clock() >= 100,
            _ => false,
        };
        if !available {
            return Err(GameError::DrawMethodNotAvailable(method));
        }
        self.outcome = Outcome::Draw;
        self.method = method;
        Ok(())
    }

    fn repetition_count(&self) -> u32 {
        let history = self.positions();
        outcome::repetition_count(&history, self.position())
    }

    fn reevaluate_termination(&mut self) {
        if self.outcome != Outcome::NoOutcome {
            return;
        }

        let position = self.position().clone();
        let legal_moves = position.legal_moves();

        if legal_moves.is_empty() {
            if position.in_check() {
                self.outcome = if position.turn().is_white() {
                    Outcome::BlackWon
                } else {
                    Outcome::WhiteWon
                };
                self.method = Method::Checkmate;
            } else {
                self.outcome = Outcome::Draw;
                self.method = Method::Stalemate;
            }
            return;
        }

        if !self.ignore_fivefold_repetition_draw && self.repetition_count() >= 5 {
            self.outcome = Outcome::Draw;
            self.method = Method::FivefoldRepetition;
            return;
        }

        if !self.ignore_seventy_five_move_rule_draw && position.halfmove_clock() >= 150 {
            self.outcome = Outcome::Draw;
            self.method = Method::SeventyFiveMoveRule;
            return;
        }

        if !self.ignore_insufficient_material_draw && outcome::is_insufficient_material(position.board()) {
            self.outcome = Outcome::Draw;
            self.method = Method::InsufficientMaterial;
        }
    }
}
