//! Read-write transactions over the LMDB backend

use super::Keyspace;
use crate::Result;
use crate::actions::{Actions, Transaction};
use crate::edge::Edge;
use crate::keys::{Pair, RelationOrder};
use heed::RwTxn;
use tracing::debug;

/// Transaction owned by the edge store.
///
/// Reads inside the transaction see its own uncommitted writes. Dropping it
/// without [`Transaction::commit`] aborts every write.
pub struct LmdbTransaction<'e> {
    txn: RwTxn<'e>,
    space: Keyspace<'e>,
}

impl<'e> LmdbTransaction<'e> {
    pub(crate) fn new(txn: RwTxn<'e>, space: Keyspace<'e>) -> Self {
        Self { txn, space }
    }

    /// Underlying heed transaction, for reads of other databases in the same environment
    pub fn raw_txn(&self) -> &RwTxn<'e> {
        &self.txn
    }

    /// Underlying heed transaction, for writes that must commit together with the edges
    pub fn raw_txn_mut(&mut self) -> &mut RwTxn<'e> {
        &mut self.txn
    }
}

impl Actions for LmdbTransaction<'_> {
    fn save_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        self.space.put(&mut self.txn, rel_type, pairs)
    }

    fn delete_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        self.space.delete(&mut self.txn, rel_type, pairs)
    }

    fn delete_item(&mut self, rel_type: u8, item: &[u8]) -> Result<()> {
        self.space.delete_item(&mut self.txn, rel_type, item)
    }

    fn load_parents(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        self.space
            .load(&self.txn, rel_type, RelationOrder::LeftToRight, item, max_level)
    }

    fn load_children(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        self.space
            .load(&self.txn, rel_type, RelationOrder::RightToLeft, item, max_level)
    }

    fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        self.space
            .load_until(&self.txn, rel_type, RelationOrder::LeftToRight, child, parent)
    }

    fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        self.space
            .load_until(&self.txn, rel_type, RelationOrder::RightToLeft, parent, child)
    }
}

impl Transaction for LmdbTransaction<'_> {
    fn commit(self) -> Result<()> {
        self.txn.commit()?;
        debug!("edge transaction committed");
        Ok(())
    }

    fn rollback(self) {
        self.txn.abort();
        debug!("edge transaction rolled back");
    }
}

/// Edge actions running inside a write transaction owned by the host.
///
/// Nothing is committed here; the host commits or aborts its transaction.
pub struct AttachedTransaction<'a, 'e> {
    txn: &'a mut RwTxn<'e>,
    space: Keyspace<'a>,
}

impl<'a, 'e> AttachedTransaction<'a, 'e> {
    pub(crate) fn new(txn: &'a mut RwTxn<'e>, space: Keyspace<'a>) -> Self {
        Self { txn, space }
    }
}

impl Actions for AttachedTransaction<'_, '_> {
    fn save_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        self.space.put(self.txn, rel_type, pairs)
    }

    fn delete_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        self.space.delete(self.txn, rel_type, pairs)
    }

    fn delete_item(&mut self, rel_type: u8, item: &[u8]) -> Result<()> {
        self.space.delete_item(self.txn, rel_type, item)
    }

    fn load_parents(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        self.space
            .load(&*self.txn, rel_type, RelationOrder::LeftToRight, item, max_level)
    }

    fn load_children(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        self.space
            .load(&*self.txn, rel_type, RelationOrder::RightToLeft, item, max_level)
    }

    fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        self.space
            .load_until(&*self.txn, rel_type, RelationOrder::LeftToRight, child, parent)
    }

    fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        self.space
            .load_until(&*self.txn, rel_type, RelationOrder::RightToLeft, parent, child)
    }
}
