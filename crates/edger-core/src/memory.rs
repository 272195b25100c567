//! Volatile backend
//!
//! Keys live in a `BTreeSet` behind one `parking_lot::RwLock`. Writers hold the
//! write lock for the whole call, readers the read lock for the whole walk.
//! Nothing survives the process.

use crate::actions::Actions;
use crate::config::EdgerConfig;
use crate::edge::Edge;
use crate::keys::{self, Pair, RelationOrder};
use crate::traversal::{self, PrefixScan, Traversal};
use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::ops::Bound;
use tracing::debug;

impl PrefixScan for BTreeSet<Vec<u8>> {
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// In-memory edge store
#[derive(Debug)]
pub struct MemoryEdger {
    tree: RwLock<BTreeSet<Vec<u8>>>,
    prefix: Vec<u8>,
    key_size: usize,
}

impl MemoryEdger {
    /// Create an empty store
    pub fn new(config: EdgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tree: RwLock::new(BTreeSet::new()),
            prefix: config.prefix,
            key_size: config.key_size,
        })
    }

    /// Create an empty store for identifiers of `key_size` bytes, without prefix
    pub fn with_key_size(key_size: usize) -> Result<Self> {
        Self::new(EdgerConfig::new(key_size))
    }

    /// Identifier width of this store
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Number of stored keys (two per relationship)
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// True if no relationship is stored
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// See [`Actions::save_edges`]
    pub fn save_edges(&self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        let mut tree = self.tree.write();
        let keys = keys::build_pairs(rel_type, self.key_size, &self.prefix, pairs)?;
        debug!(rel_type, pairs = pairs.len(), "saving edges");
        tree.extend(keys);
        Ok(())
    }

    /// See [`Actions::delete_edges`]
    pub fn delete_edges(&self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        let mut tree = self.tree.write();
        let keys = keys::build_pairs(rel_type, self.key_size, &self.prefix, pairs)?;
        debug!(rel_type, pairs = pairs.len(), "deleting edges");
        for key in &keys {
            tree.remove(key);
        }
        Ok(())
    }

    /// See [`Actions::delete_item`]. The scan and the delete run under one write lock.
    pub fn delete_item(&self, rel_type: u8, item: &[u8]) -> Result<()> {
        let mut tree = self.tree.write();
        let pairs = traversal::direct_pairs(&*tree, &self.prefix, self.key_size, rel_type, item)?;
        let keys = keys::build_pairs(
            rel_type,
            self.key_size,
            &self.prefix,
            &traversal::borrow_pairs(&pairs),
        )?;
        debug!(rel_type, pairs = pairs.len(), "detaching item");
        for key in &keys {
            tree.remove(key);
        }
        Ok(())
    }

    /// See [`Actions::load_parents`]
    pub fn load_parents(
        &self,
        rel_type: u8,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        self.load(rel_type, RelationOrder::LeftToRight, item, max_level)
    }

    /// See [`Actions::load_children`]
    pub fn load_children(
        &self,
        rel_type: u8,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        self.load(rel_type, RelationOrder::RightToLeft, item, max_level)
    }

    /// See [`Actions::load_parents_until`]
    pub fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        self.load_until(rel_type, RelationOrder::LeftToRight, child, parent)
    }

    /// See [`Actions::load_children_until`]
    pub fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        self.load_until(rel_type, RelationOrder::RightToLeft, parent, child)
    }

    fn load(
        &self,
        rel_type: u8,
        order: RelationOrder,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        let tree = self.tree.read();
        Traversal::new(&*tree, &self.prefix, self.key_size, rel_type, order)
            .bounded(item, max_level)
    }

    fn load_until(
        &self,
        rel_type: u8,
        order: RelationOrder,
        from: &[u8],
        target: &[u8],
    ) -> Result<Edge> {
        let tree = self.tree.read();
        Traversal::new(&*tree, &self.prefix, self.key_size, rel_type, order).until(from, target)
    }
}

impl Actions for MemoryEdger {
    fn save_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        MemoryEdger::save_edges(self, rel_type, pairs)
    }

    fn delete_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        MemoryEdger::delete_edges(self, rel_type, pairs)
    }

    fn delete_item(&mut self, rel_type: u8, item: &[u8]) -> Result<()> {
        MemoryEdger::delete_item(self, rel_type, item)
    }

    fn load_parents(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        MemoryEdger::load_parents(self, rel_type, item, max_level)
    }

    fn load_children(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        MemoryEdger::load_children(self, rel_type, item, max_level)
    }

    fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        MemoryEdger::load_parents_until(self, rel_type, child, parent)
    }

    fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        MemoryEdger::load_children_until(self, rel_type, parent, child)
    }
}
