//! Public edge store interface shared by every backend
//!
//! Pairs are `(left, right)` = `(child, parent)`. Saving a pair makes `right`
//! a parent of `left` and `left` a child of `right`; a pair whose halves are
//! equal marks the identifier as a root.

use crate::Result;
use crate::edge::Edge;
use crate::keys::Pair;

/// Mutations and traversal queries over one key space
pub trait Actions {
    /// Store every pair. Fails without writing anything if an identifier has the wrong width.
    fn save_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()>;

    /// Remove every pair. Missing pairs are ignored.
    fn delete_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()>;

    /// Detach `item` from its direct parents and direct children
    fn delete_item(&mut self, rel_type: u8, item: &[u8]) -> Result<()>;

    /// Ancestors of `item`; `max_level` of `None` or `Some(0)` is unbounded
    fn load_parents(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge>;

    /// Descendants of `item`; `max_level` of `None` or `Some(0)` is unbounded
    fn load_children(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge>;

    /// Ancestors of `child`, walking up until `parent` is reached
    fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge>;

    /// Descendants of `parent`, walking down until `child` is reached
    fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge>;
}

/// A unit of work over a transactional backend.
///
/// Dropping a transaction without calling [`Transaction::commit`] rolls it back.
pub trait Transaction: Actions {
    /// Make every mutation of this transaction durable and visible
    fn commit(self) -> Result<()>
    where
        Self: Sized;

    /// Discard every mutation of this transaction
    fn rollback(self)
    where
        Self: Sized;
}

/// Backend able to group several [`Actions`] calls into one atomic transaction
pub trait AcidEdger: Actions {
    /// Read-write transaction type
    type Txn<'a>: Transaction
    where
        Self: 'a;

    /// Open a read-write transaction
    fn transaction(&self) -> Result<Self::Txn<'_>>;
}
