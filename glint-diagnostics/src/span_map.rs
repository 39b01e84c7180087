/// Span tracking without modifying AST nodes.
///
/// Every AST node carries a stable integer id (`NodeId`) assigned by the
/// parser's arena at construction time; this side table is the only place
/// that maps a node id back to a source range, so later passes (semantic
/// analysis, codegen) can attach diagnostics to nodes without AST nodes
/// themselves growing a `Span` field.
use crate::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Global span tracker for AST nodes.
#[derive(Debug, Default, Clone)]
pub struct SpanMap {
    spans: HashMap<NodeId, Span>,
    next_id: u32,
}

impl SpanMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, unique node id.
    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record the span for a node id, allocating the id if none was given.
    pub fn record(&mut self, id: NodeId, span: Span) {
        self.spans.insert(id, span);
    }

    /// Allocate a node id and record its span in one step.
    pub fn alloc(&mut self, span: Span) -> NodeId {
        let id = self.next_node_id();
        self.record(id, span);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Span> {
        self.spans.get(&id)
    }

    /// Get span or fall back to an unknown location — used when emitting a
    /// diagnostic for a node whose id was never recorded (should not happen
    /// for well-formed trees, but diagnostics must never panic on it).
    pub fn get_or_unknown(&self, id: NodeId) -> Span {
        self.get(id).cloned().unwrap_or_else(Span::unknown)
    }

    pub fn clear(&mut self) {
        self.spans.clear();
        self.next_id = 0;
    }

    pub fn stats(&self) -> usize {
        self.spans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_fetch_by_id() {
        let mut map = SpanMap::new();
        let span = Span::new("test.gl".to_string(), 10, 5, 2);

        let id = map.alloc(span.clone());
        assert_eq!(map.get(id), Some(&span));
    }

    #[test]
    fn ids_are_stable_and_distinct() {
        let mut map = SpanMap::new();

        let span1 = Span::new("test.gl".to_string(), 1, 1, 5);
        let span2 = Span::new("test.gl".to_string(), 2, 1, 5);

        let id1 = map.alloc(span1.clone());
        let id2 = map.alloc(span2.clone());

        assert_ne!(id1, id2);
        assert_eq!(map.get(id1), Some(&span1));
        assert_eq!(map.get(id2), Some(&span2));
    }

    #[test]
    fn unknown_id_falls_back() {
        let map = SpanMap::new();
        assert_eq!(map.get_or_unknown(NodeId(999)), Span::unknown());
    }
}
