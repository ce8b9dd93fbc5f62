// Comment tree search.
// Imgur returns comments as a forest: top-level comments with nested replies.
// This module answers one question about that forest - "is this comment in it?" -
// without knowing anything about HTTP or Discord.

use std::collections::VecDeque;

/// One comment and its replies.
///
/// Children are owned by their parent, so a forest of `CommentNode`s can never
/// share nodes or contain cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub id: u64,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(id: u64, children: Vec<CommentNode>) -> Self {
        Self { id, children }
    }

    #[cfg(test)]
    pub fn leaf(id: u64) -> Self {
        Self::new(id, Vec::new())
    }
}

/// Check whether `target` appears anywhere in `forest`.
///
/// **Breadth-first:** the queue holds the current frontier followed by the level
/// being collected behind it. Roots are checked before any descent, and the
/// first match short-circuits.
pub fn contains_identifier(forest: &[CommentNode], target: u64) -> bool {
    let mut frontier: VecDeque<&CommentNode> = forest.iter().collect();

    while let Some(node) = frontier.pop_front() {
        if node.id == target {
            return true;
        }
        frontier.extend(node.children.iter());
    }

    false
}
