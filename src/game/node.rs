use indexmap::IndexMap;

use crate::board::{Move, Position};

/// Arena index into [`super::Game`]'s node vector. The idiomatic
/// Rust substitute for the spec's owning-child/non-owning-parent move tree
/// (see DESIGN.md and spec §9's "arena indices" design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(super) usize);

/// One node in the game tree: the move that led to it (`None` only for the
/// synthetic root), the resulting position, its place in the tree, and any
/// PGN annotations attached to it.
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub(super) mv: Option<Move>,
    pub(super) position: Position,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) comment: Option<String>,
    pub(super) command: IndexMap<String, String>,
    pub(super) nag: Option<u8>,
    pub(super) number: u32,
}

impl MoveNode {
    pub(super) fn root(position: Position) -> Self {
        Self {
            mv: None,
            position,
            parent: None,
            children: Vec::new(),
            comment: None,
            command: IndexMap::new(),
            nag: None,
            number: 0,
        }
    }

    pub(super) fn child(position: Position, mv: Move, parent: NodeId, number: u32) -> Self {
        Self {
            mv: Some(mv),
            position,
            parent: Some(parent),
            children: Vec::new(),
            comment: None,
            command: IndexMap::new(),
            nag: None,
            number,
        }
    }

    /// The move that produced this node's position. `None` only for the
    /// synthetic root.
    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    /// Appends `comment` to any comment already attached, space-separated.
    /// Multiple consecutive `{…}` PGN comment tokens following the same move
    /// are concatenated this way rather than the last one winning.
    pub fn append_comment(&mut self, comment: &str) {
        match &mut self.comment {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(comment);
            }
            None => self.comment = Some(comment.to_string()),
        }
    }

    pub fn command(&self) -> &IndexMap<String, String> {
        &self.command
    }

    pub fn command_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.command
    }

    pub fn nag(&self) -> Option<u8> {
        self.nag
    }

    pub fn set_nag(&mut self, nag: u8) {
        self.nag = Some(nag);
    }

    /// Full-move number in effect when this move was played (spec §4.7's
    /// serializer needs this to decide `N.`/`N...` prefixes).
    pub fn number(&self) -> u32 {
        self.number
    }
}
