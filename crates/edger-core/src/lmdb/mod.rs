//! Durable backend over LMDB (heed)
//!
//! All keys live in one named database of an LMDB environment. The
//! environment can be owned by the store ([`LmdbEdger::open`]) or shared with
//! the host application ([`LmdbEdger::with_env`]); in the latter case the host
//! can also run edge mutations inside its own write transaction through
//! [`LmdbEdger::attach`].
//!
//! Store-level mutations open one write transaction per call and commit it;
//! store-level queries run inside one read transaction. A transaction that is
//! dropped before commit is aborted by heed, so no half-written relationship
//! is ever visible.

mod transaction;

pub use transaction::{AttachedTransaction, LmdbTransaction};

use crate::actions::{AcidEdger, Actions, Transaction};
use crate::config::{EdgerConfig, LmdbConfig};
use crate::edge::Edge;
use crate::keys::{self, Pair, RelationOrder};
use crate::traversal::{self, PrefixScan, Traversal};
use crate::{Error, Result};
use heed::types::{Bytes, DecodeIgnore, Unit};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Edge store backed by an LMDB database
pub struct LmdbEdger {
    /// LMDB environment
    env: Arc<Env>,
    /// Key-only database holding both directions of every relationship
    db: Database<Bytes, Unit>,
    prefix: Vec<u8>,
    key_size: usize,
}

impl LmdbEdger {
    /// Open (or create) an LMDB environment at `path` dedicated to this store
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use edger_core::config::{EdgerConfig, LmdbConfig};
    /// use edger_core::lmdb::LmdbEdger;
    ///
    /// let edger =
    ///     LmdbEdger::open("./data/edges", EdgerConfig::new(16), LmdbConfig::default()).unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, config: EdgerConfig, lmdb: LmdbConfig) -> Result<Self> {
        config.validate()?;
        lmdb.validate()?;

        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(lmdb.map_size)
                .max_dbs(lmdb.max_dbs)
                .open(path)?
        };
        info!(path = %path.display(), map_size = lmdb.map_size, "opened LMDB environment");

        Self::with_env(Arc::new(env), config, &lmdb.database)
    }

    /// Use the database `database` inside an environment owned by the host
    pub fn with_env(env: Arc<Env>, config: EdgerConfig, database: &str) -> Result<Self> {
        config.validate()?;
        if database.is_empty() {
            return Err(Error::invalid_configuration("database name is empty"));
        }

        let mut wtxn = env.write_txn()?;
        let db: Database<Bytes, Unit> = env.create_database(&mut wtxn, Some(database))?;
        wtxn.commit()?;
        info!(database, key_size = config.key_size, "opened edge database");

        Ok(Self {
            env,
            db,
            prefix: config.prefix,
            key_size: config.key_size,
        })
    }

    /// The LMDB environment holding the edge database
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// The edge database handle
    pub fn database(&self) -> Database<Bytes, Unit> {
        self.db
    }

    /// Identifier width of this store
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Store-wide key prefix
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Open a read-write transaction; commit it or drop it to roll back
    pub fn transaction(&self) -> Result<LmdbTransaction<'_>> {
        let txn = self.env.write_txn()?;
        Ok(LmdbTransaction::new(txn, self.keyspace()))
    }

    /// Run edge actions inside a write transaction owned by the host.
    ///
    /// The host stays responsible for committing or aborting `txn`.
    pub fn attach<'a, 'e>(&'a self, txn: &'a mut RwTxn<'e>) -> AttachedTransaction<'a, 'e> {
        AttachedTransaction::new(txn, self.keyspace())
    }

    /// Number of stored keys under this store's prefix (two per relationship)
    pub fn len(&self) -> Result<usize> {
        let rtxn = self.env.read_txn()?;
        if self.prefix.is_empty() {
            return Ok(self.db.len(&rtxn)? as usize);
        }
        Ok(self.keyspace().scanner(&rtxn).scan_prefix(&self.prefix)?.len())
    }

    /// True if no relationship is stored under this store's prefix
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// See [`Actions::save_edges`]; runs in its own committed transaction
    pub fn save_edges(&self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        let mut txn = self.transaction()?;
        txn.save_edges(rel_type, pairs)?;
        txn.commit()
    }

    /// See [`Actions::delete_edges`]; runs in its own committed transaction
    pub fn delete_edges(&self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        let mut txn = self.transaction()?;
        txn.delete_edges(rel_type, pairs)?;
        txn.commit()
    }

    /// See [`Actions::delete_item`]; runs in its own committed transaction
    pub fn delete_item(&self, rel_type: u8, item: &[u8]) -> Result<()> {
        let mut txn = self.transaction()?;
        txn.delete_item(rel_type, item)?;
        txn.commit()
    }

    /// See [`Actions::load_parents`]; runs in a read-only transaction
    pub fn load_parents(
        &self,
        rel_type: u8,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        let rtxn = self.env.read_txn()?;
        self.keyspace()
            .load(&rtxn, rel_type, RelationOrder::LeftToRight, item, max_level)
    }

    /// See [`Actions::load_children`]; runs in a read-only transaction
    pub fn load_children(
        &self,
        rel_type: u8,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        let rtxn = self.env.read_txn()?;
        self.keyspace()
            .load(&rtxn, rel_type, RelationOrder::RightToLeft, item, max_level)
    }

    /// See [`Actions::load_parents_until`]; runs in a read-only transaction
    pub fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        let rtxn = self.env.read_txn()?;
        self.keyspace()
            .load_until(&rtxn, rel_type, RelationOrder::LeftToRight, child, parent)
    }

    /// See [`Actions::load_children_until`]; runs in a read-only transaction
    pub fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        let rtxn = self.env.read_txn()?;
        self.keyspace()
            .load_until(&rtxn, rel_type, RelationOrder::RightToLeft, parent, child)
    }

    fn keyspace(&self) -> Keyspace<'_> {
        Keyspace {
            db: self.db,
            prefix: &self.prefix,
            key_size: self.key_size,
        }
    }
}

impl Actions for LmdbEdger {
    fn save_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        LmdbEdger::save_edges(self, rel_type, pairs)
    }

    fn delete_edges(&mut self, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        LmdbEdger::delete_edges(self, rel_type, pairs)
    }

    fn delete_item(&mut self, rel_type: u8, item: &[u8]) -> Result<()> {
        LmdbEdger::delete_item(self, rel_type, item)
    }

    fn load_parents(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        LmdbEdger::load_parents(self, rel_type, item, max_level)
    }

    fn load_children(&self, rel_type: u8, item: &[u8], max_level: Option<usize>) -> Result<Edge> {
        LmdbEdger::load_children(self, rel_type, item, max_level)
    }

    fn load_parents_until(&self, rel_type: u8, child: &[u8], parent: &[u8]) -> Result<Edge> {
        LmdbEdger::load_parents_until(self, rel_type, child, parent)
    }

    fn load_children_until(&self, rel_type: u8, parent: &[u8], child: &[u8]) -> Result<Edge> {
        LmdbEdger::load_children_until(self, rel_type, parent, child)
    }
}

impl AcidEdger for LmdbEdger {
    type Txn<'a> = LmdbTransaction<'a>;

    fn transaction(&self) -> Result<LmdbTransaction<'_>> {
        LmdbEdger::transaction(self)
    }
}

/// Database, prefix and key width of one store, shared by its transactions
#[derive(Clone, Copy)]
pub(crate) struct Keyspace<'a> {
    db: Database<Bytes, Unit>,
    prefix: &'a [u8],
    key_size: usize,
}

impl Keyspace<'_> {
    fn scanner<'t, 'e>(&self, txn: &'t RoTxn<'e>) -> LmdbScan<'t, 'e> {
        LmdbScan {
            db: self.db.remap_data_type::<DecodeIgnore>(),
            txn,
        }
    }

    pub(crate) fn put(&self, wtxn: &mut RwTxn<'_>, rel_type: u8, pairs: &[Pair<'_>]) -> Result<()> {
        let keys = keys::build_pairs(rel_type, self.key_size, self.prefix, pairs)?;
        debug!(rel_type, pairs = pairs.len(), keys = keys.len(), "saving edges");
        for key in &keys {
            self.db.put(wtxn, key, &())?;
        }
        Ok(())
    }

    pub(crate) fn delete(
        &self,
        wtxn: &mut RwTxn<'_>,
        rel_type: u8,
        pairs: &[Pair<'_>],
    ) -> Result<()> {
        let keys = keys::build_pairs(rel_type, self.key_size, self.prefix, pairs)?;
        debug!(rel_type, pairs = pairs.len(), keys = keys.len(), "deleting edges");
        for key in &keys {
            self.db.delete(wtxn, key)?;
        }
        Ok(())
    }

    pub(crate) fn delete_item(
        &self,
        wtxn: &mut RwTxn<'_>,
        rel_type: u8,
        item: &[u8],
    ) -> Result<()> {
        let pairs = traversal::direct_pairs(
            &self.scanner(&*wtxn),
            self.prefix,
            self.key_size,
            rel_type,
            item,
        )?;
        debug!(rel_type, pairs = pairs.len(), "detaching item");
        self.delete(wtxn, rel_type, &traversal::borrow_pairs(&pairs))
    }

    pub(crate) fn load(
        &self,
        txn: &RoTxn<'_>,
        rel_type: u8,
        order: RelationOrder,
        item: &[u8],
        max_level: Option<usize>,
    ) -> Result<Edge> {
        let scan = self.scanner(txn);
        Traversal::new(&scan, self.prefix, self.key_size, rel_type, order).bounded(item, max_level)
    }

    pub(crate) fn load_until(
        &self,
        txn: &RoTxn<'_>,
        rel_type: u8,
        order: RelationOrder,
        from: &[u8],
        target: &[u8],
    ) -> Result<Edge> {
        let scan = self.scanner(txn);
        Traversal::new(&scan, self.prefix, self.key_size, rel_type, order).until(from, target)
    }
}

/// Prefix scans inside one LMDB transaction. Values are never decoded.
struct LmdbScan<'t, 'e> {
    db: Database<Bytes, DecodeIgnore>,
    txn: &'t RoTxn<'e>,
}

impl PrefixScan for LmdbScan<'_, '_> {
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        // LMDB rejects zero-length keys, so an empty prefix walks the whole database
        if prefix.is_empty() {
            return collect_keys(self.db.iter(self.txn)?);
        }
        collect_keys(self.db.prefix_iter(self.txn, prefix)?)
    }
}

fn collect_keys<'t>(
    entries: impl Iterator<Item = heed::Result<(&'t [u8], ())>>,
) -> Result<Vec<Vec<u8>>> {
    let mut keys = Vec::new();
    for entry in entries {
        let (key, ()) = entry?;
        keys.push(key.to_vec());
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestContext, create_test_lmdb_edger};
    use heed::types::Str;

    #[test]
    fn test_invalid_configuration() {
        let ctx = TestContext::new();
        let err = LmdbEdger::open(ctx.path(), EdgerConfig::new(0), LmdbConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(3));
        let err = LmdbEdger::with_env(edger.env().clone(), EdgerConfig::new(3), "")
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_end_to_end_example() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(3));
        edger
            .save_edges(0, &[(&b"001"[..], &b"010"[..]), (&b"010"[..], &b"100"[..])])
            .unwrap();

        let full = edger.load_parents(0, b"001", None).unwrap();
        assert_eq!(
            full,
            Edge::with_edges(
                b"001".to_vec(),
                vec![Edge::with_edges(b"010".to_vec(), vec![Edge::new(b"100".to_vec())])]
            )
        );

        let direct = edger.load_parents(0, b"001", Some(1)).unwrap();
        assert_eq!(
            direct,
            Edge::with_edges(b"001".to_vec(), vec![Edge::new(b"010".to_vec())])
        );
        assert_eq!(edger.len().unwrap(), 4);
    }

    #[test]
    fn test_len_without_prefix() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
        assert_eq!(edger.len().unwrap(), 0);
        assert!(edger.is_empty().unwrap());

        edger.save_edges(0, &[(&b"a"[..], &b"b"[..])]).unwrap();
        assert_eq!(edger.len().unwrap(), 2);
        assert!(!edger.is_empty().unwrap());

        // an unprefixed scan sees every key of the database
        let rtxn = edger.env().read_txn().unwrap();
        let keys = edger.keyspace().scanner(&rtxn).scan_prefix(b"").unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_persistence() {
        let ctx = TestContext::new();
        let path = ctx.path().to_path_buf();

        {
            let edger = LmdbEdger::open(&path, EdgerConfig::new(2), LmdbConfig::default()).unwrap();
            edger.save_edges(1, &[(&b"aa"[..], &b"bb"[..])]).unwrap();
        }

        {
            let edger = LmdbEdger::open(&path, EdgerConfig::new(2), LmdbConfig::default()).unwrap();
            let edge = edger.load_children(1, b"bb", None).unwrap();
            assert_eq!(edge.ids(true), vec![&b"aa"[..]]);
        }
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
        {
            let mut txn = edger.transaction().unwrap();
            txn.save_edges(0, &[(&b"a"[..], &b"b"[..])]).unwrap();
            // visible inside the transaction
            assert!(txn.load_parents(0, b"a", None).unwrap().contains(b"b"));
        }
        assert!(edger.is_empty().unwrap());

        let mut txn = edger.transaction().unwrap();
        txn.save_edges(0, &[(&b"a"[..], &b"b"[..])]).unwrap();
        txn.rollback();
        assert!(edger.is_empty().unwrap());
    }

    #[test]
    fn test_multi_step_transaction_commits_atomically() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
        edger
            .save_edges(0, &[(&b"b"[..], &b"a"[..]), (&b"c"[..], &b"b"[..])])
            .unwrap();

        let mut txn = edger.transaction().unwrap();
        txn.delete_item(0, b"b").unwrap();
        txn.save_edges(0, &[(&b"c"[..], &b"a"[..])]).unwrap();
        // not yet visible to readers
        assert!(edger.load_children(0, b"a", None).unwrap().contains(b"b"));
        txn.commit().unwrap();

        let edge = edger.load_children(0, b"a", None).unwrap();
        assert_eq!(edge.ids(true), vec![&b"c"[..]]);
    }

    #[test]
    fn test_failed_save_leaves_nothing() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(3));
        let err = edger
            .save_edges(0, &[(&b"001"[..], &b"010"[..]), (&b"0100"[..], &b"100"[..])])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyLength { expected: 3, actual: 4 }));
        assert!(edger.is_empty().unwrap());
    }

    #[test]
    fn test_attach_to_host_transaction() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
        let env = edger.env().clone();

        let mut wtxn = env.write_txn().unwrap();
        let meta: Database<Str, Str> = env.create_database(&mut wtxn, Some("meta")).unwrap();
        meta.put(&mut wtxn, "owner", "host").unwrap();
        {
            let mut attached = edger.attach(&mut wtxn);
            attached.save_edges(0, &[(&b"x"[..], &b"y"[..])]).unwrap();
        }
        wtxn.abort();
        assert!(edger.is_empty().unwrap());

        let mut wtxn = env.write_txn().unwrap();
        edger
            .attach(&mut wtxn)
            .save_edges(0, &[(&b"x"[..], &b"y"[..])])
            .unwrap();
        wtxn.commit().unwrap();
        assert!(edger.load_parents(0, b"x", None).unwrap().contains(b"y"));
    }

    #[test]
    fn test_raw_txn_shares_atomic_unit() {
        let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
        let env = edger.env().clone();

        let mut txn = edger.transaction().unwrap();
        let meta: Database<Str, Str> =
            env.create_database(txn.raw_txn_mut(), Some("meta")).unwrap();
        meta.put(txn.raw_txn_mut(), "version", "1").unwrap();
        txn.save_edges(0, &[(&b"x"[..], &b"y"[..])]).unwrap();
        txn.commit().unwrap();

        let rtxn = env.read_txn().unwrap();
        assert_eq!(meta.get(&rtxn, "version").unwrap(), Some("1"));
        assert_eq!(edger.len().unwrap(), 2);
    }

    #[test]
    fn test_prefixed_stores_share_database() {
        let (a, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1).with_prefix(b"a".to_vec()));
        let b = LmdbEdger::with_env(
            a.env().clone(),
            EdgerConfig::new(1).with_prefix(b"b".to_vec()),
            "edges",
        )
        .unwrap();

        a.save_edges(0, &[(&b"x"[..], &b"y"[..])]).unwrap();
        b.save_edges(0, &[(&b"x"[..], &b"z"[..])]).unwrap();

        assert_eq!(a.load_parents(0, b"x", None).unwrap().ids(true), vec![&b"y"[..]]);
        assert_eq!(b.load_parents(0, b"x", None).unwrap().ids(true), vec![&b"z"[..]]);
        assert_eq!(a.len().unwrap(), 2);
    }
}
