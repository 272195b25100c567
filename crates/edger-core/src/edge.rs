//! Traversal result tree

use serde::{Deserialize, Serialize};

/// One node of a traversal result.
///
/// The tree is rooted at the queried identifier; `edges` holds the related
/// identifiers found for `item`, in key order. A child equal to `item` marks
/// `item` as a root (it carries a self-edge).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier of this node
    pub item: Vec<u8>,
    /// Related nodes reached from `item`
    pub edges: Vec<Edge>,
}

impl Edge {
    /// Leaf node for `item`
    pub fn new(item: impl Into<Vec<u8>>) -> Self {
        Self {
            item: item.into(),
            edges: Vec::new(),
        }
    }

    /// Node for `item` with the given children
    pub fn with_edges(item: impl Into<Vec<u8>>, edges: Vec<Edge>) -> Self {
        Self {
            item: item.into(),
            edges,
        }
    }

    /// All identifiers in depth-first order, optionally without this node's own id
    pub fn ids(&self, skip_self: bool) -> Vec<&[u8]> {
        let mut ids = Vec::new();
        if !skip_self {
            ids.push(self.item.as_slice());
        }
        for edge in &self.edges {
            edge.collect_ids(&mut ids);
        }
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a [u8]>) {
        ids.push(self.item.as_slice());
        for edge in &self.edges {
            edge.collect_ids(ids);
        }
    }

    /// Identifiers of the direct children
    pub fn children(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.edges.iter().map(|e| e.item.as_slice())
    }

    /// True if `id` appears anywhere below this node
    pub fn contains(&self, id: &[u8]) -> bool {
        self.edges
            .iter()
            .any(|e| e.item == id || e.contains(id))
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.edges.iter().map(|e| 1 + e.descendant_count()).sum()
    }

    /// True if nothing was found below this node
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    /// True if this node carries a self-edge
    pub fn is_root(&self) -> bool {
        self.edges.iter().any(|e| e.item == self.item)
    }

    /// Number of levels below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.edges.iter().map(|e| 1 + e.depth()).max().unwrap_or(0)
    }
}
