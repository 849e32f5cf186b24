//! Leftmost token per physical line of a construct.

use plumb_decree_abi::NodeId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct LineSet {
    lines: BTreeMap<usize, (usize, NodeId)>,
}

impl LineSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a token at `column` on `line`; the leftmost token of a line wins.
    pub fn add(&mut self, line: usize, column: usize, node: NodeId) {
        self.lines
            .entry(line)
            .and_modify(|entry| {
                if column < entry.0 {
                    *entry = (column, node);
                }
            })
            .or_insert((column, node));
    }

    #[must_use]
    pub fn first_line(&self) -> Option<usize> {
        self.lines.keys().next().copied()
    }

    #[must_use]
    pub fn last_line(&self) -> Option<usize> {
        self.lines.keys().next_back().copied()
    }

    #[must_use]
    pub fn min_column_of(&self, line: usize) -> Option<usize> {
        self.lines.get(&line).map(|&(column, _)| column)
    }

    /// Token holding the minimum column of `line`.
    #[must_use]
    pub fn node_at(&self, line: usize) -> Option<NodeId> {
        self.lines.get(&line).map(|&(_, node)| node)
    }

    /// Recorded lines in ascending order.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_decree_abi::{NodeSpec, SyntaxTree, TokenKind};

    fn ids() -> Vec<NodeId> {
        let root = NodeSpec::at(TokenKind::CompilationUnit, 1, 0, "").with([
            NodeSpec::at(TokenKind::Ident, 1, 0, "a"),
            NodeSpec::at(TokenKind::Ident, 1, 1, "b"),
        ]);
        let tree = SyntaxTree::from_spec("ab\n", &root).unwrap();
        tree.nodes().map(|n| n.id()).collect()
    }

    #[test]
    fn keeps_leftmost_per_line() {
        let ids = ids();
        let mut set = LineSet::new();
        set.add(5, 8, ids[0]);
        set.add(5, 4, ids[1]);
        set.add(5, 4, ids[2]);
        set.add(3, 12, ids[2]);
        assert_eq!(set.min_column_of(5), Some(4));
        assert_eq!(set.node_at(5), Some(ids[1]));
        assert_eq!(set.first_line(), Some(3));
        assert_eq!(set.last_line(), Some(5));
        assert_eq!(set.lines().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(set.min_column_of(4), None);
    }

    #[test]
    fn empty_set_has_no_span() {
        let set = LineSet::new();
        assert!(set.is_empty());
        assert_eq!(set.first_line(), None);
    }
}
