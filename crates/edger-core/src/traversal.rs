//! Traversal engine
//!
//! Both backends answer ancestor/descendant queries with the same walk:
//! encode the scan prefix of the current node, collect every key sharing it,
//! attach the decoded neighbours as children and recurse. The backends only
//! provide [`PrefixScan`]; everything else lives here so their results are
//! identical by construction.
//!
//! Each call remembers, per identifier, the most levels it was expanded with.
//! A later occurrence is expanded again only when it is reached with more
//! levels left (a shorter path in a DAG under a depth bound); otherwise it is
//! attached as a leaf. Cycles and a root's self-edge therefore end as leaves.

use crate::edge::Edge;
use crate::keys::{self, Pair, RelationOrder};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Ordered key space that can list every key starting with a prefix
pub trait PrefixScan {
    /// All keys starting with `prefix`, in ascending byte order
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>>;
}

/// Walk over one relation type in one direction
pub struct Traversal<'a, S: ?Sized> {
    scan: &'a S,
    store_prefix: &'a [u8],
    key_size: usize,
    rel_type: u8,
    order: RelationOrder,
}

impl<'a, S: PrefixScan + ?Sized> Traversal<'a, S> {
    /// Create a walk over `scan` for keys written with `store_prefix`
    pub fn new(
        scan: &'a S,
        store_prefix: &'a [u8],
        key_size: usize,
        rel_type: u8,
        order: RelationOrder,
    ) -> Self {
        Self {
            scan,
            store_prefix,
            key_size,
            rel_type,
            order,
        }
    }

    /// Identifiers directly related to `item`, in key order
    pub fn neighbours(&self, item: &[u8]) -> Result<Vec<Vec<u8>>> {
        let prefix = keys::encode_prefix(self.store_prefix, self.rel_type, self.order, item);
        let found = self.scan.scan_prefix(&prefix)?;
        trace!(
            rel_type = self.rel_type,
            order = ?self.order,
            found = found.len(),
            "prefix scan"
        );

        let mut related = Vec::with_capacity(found.len());
        for key in &found {
            let stripped = key.get(self.store_prefix.len()..).unwrap_or_default();
            let Some((_, right)) = keys::decode_edge(stripped, self.key_size) else {
                warn!(len = key.len(), "malformed edge key under scan prefix");
                return Err(Error::storage(format!(
                    "malformed edge key of {} bytes (expected {})",
                    key.len(),
                    keys::key_len(self.key_size, self.store_prefix.len())
                )));
            };
            related.push(right.to_vec());
        }
        Ok(related)
    }

    /// Expand `item` up to `max_level` levels; `None` or `Some(0)` means unbounded
    pub fn bounded(&self, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        let remaining = max_level.filter(|level| *level > 0);
        let mut root = Edge::new(item);
        let mut visited = HashMap::new();
        self.expand(&mut root, remaining, None, &mut visited)?;
        Ok(root)
    }

    /// Expand `item` until `target` is reached on each branch
    pub fn until(&self, item: &[u8], target: &[u8]) -> Result<Edge> {
        let mut root = Edge::new(item);
        let mut visited = HashMap::new();
        self.expand(&mut root, None, Some(target), &mut visited)?;
        Ok(root)
    }

    fn expand(
        &self,
        node: &mut Edge,
        remaining: Option<usize>,
        target: Option<&[u8]>,
        visited: &mut HashMap<Vec<u8>, Option<usize>>,
    ) -> Result<()> {
        if remaining == Some(0) {
            return Ok(());
        }
        if visited
            .get(&node.item)
            .is_some_and(|&best| !deeper(remaining, best))
        {
            return Ok(());
        }
        visited.insert(node.item.clone(), remaining);

        let related = self.neighbours(&node.item)?;
        let reached = target.is_some_and(|t| node.item == t || related.iter().any(|r| r == t));
        node.edges = related.into_iter().map(Edge::new).collect();
        if reached {
            return Ok(());
        }

        let next = remaining.map(|r| r - 1);
        for child in &mut node.edges {
            self.expand(child, next, target, visited)?;
        }
        Ok(())
    }
}

// `None` is an unbounded budget and beats every bound.
fn deeper(remaining: Option<usize>, best: Option<usize>) -> bool {
    match (remaining, best) {
        (None, Some(_)) => true,
        (Some(r), Some(b)) => r > b,
        (_, None) => false,
    }
}

/// Every relationship `item` takes part in directly, as `(left, right)` pairs.
///
/// Used by `delete_item`: parents become `(item, parent)`, children `(child, item)`.
pub fn direct_pairs<S: PrefixScan + ?Sized>(
    scan: &S,
    store_prefix: &[u8],
    key_size: usize,
    rel_type: u8,
    item: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let walk = move |order| Traversal::new(scan, store_prefix, key_size, rel_type, order);
    let parents = walk(RelationOrder::LeftToRight).neighbours(item)?;
    let children = walk(RelationOrder::RightToLeft).neighbours(item)?;

    let mut pairs = Vec::with_capacity(parents.len() + children.len());
    pairs.extend(parents.into_iter().map(|parent| (item.to_vec(), parent)));
    pairs.extend(children.into_iter().map(|child| (child, item.to_vec())));
    Ok(pairs)
}

/// Borrow owned pairs as codec [`Pair`]s
pub fn borrow_pairs(pairs: &[(Vec<u8>, Vec<u8>)]) -> Vec<Pair<'_>> {
    pairs
        .iter()
        .map(|(left, right)| (left.as_slice(), right.as_slice()))
        .collect()
}
