//! LMDB store tests: durability across reopen, transactions, shared environments

use edger_core::testing::{TestContext, create_test_lmdb_edger};
use edger_core::{AcidEdger, Actions, EdgerConfig, Error, LmdbConfig, LmdbEdger, Transaction};
use std::sync::Arc;
use std::thread;

fn config() -> LmdbConfig {
    LmdbConfig {
        map_size: 16 * 1024 * 1024,
        database: "reports_to".to_string(),
        ..LmdbConfig::default()
    }
}

// Moves `child` from `from` to `to` in one transaction, on any transactional backend
fn reparent<E: AcidEdger>(
    edger: &E,
    child: &[u8],
    from: &[u8],
    to: &[u8],
) -> edger_core::Result<()> {
    let mut txn = edger.transaction()?;
    txn.delete_edges(0, &[(child, from)])?;
    txn.save_edges(0, &[(child, to)])?;
    txn.commit()
}

#[test]
fn test_reopen_keeps_edges_and_prefix() {
    let ctx = TestContext::new();
    let path = ctx.path().join("store");
    let edger_config = EdgerConfig::new(3).with_prefix(b"org".to_vec());

    {
        let edger = LmdbEdger::open(&path, edger_config.clone(), config()).unwrap();
        edger
            .save_edges(2, &[(&b"bob"[..], &b"amy"[..]), (&b"amy"[..], &b"ceo"[..])])
            .unwrap();
    }

    let edger = LmdbEdger::open(&path, edger_config, config()).unwrap();
    assert_eq!(edger.prefix(), b"org");
    assert_eq!(edger.key_size(), 3);
    let chain = edger.load_parents(2, b"bob", None).unwrap();
    assert_eq!(chain.ids(true), vec![&b"amy"[..], &b"ceo"[..]]);

    // a store without the prefix sees nothing
    drop(edger);
    let bare = LmdbEdger::open(&path, EdgerConfig::new(3), config()).unwrap();
    assert!(bare.load_parents(2, b"bob", None).unwrap().is_leaf());
}

#[test]
fn test_reparent_is_atomic() {
    let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
    edger.save_edges(0, &[(&b"c"[..], &b"a"[..])]).unwrap();

    reparent(&edger, b"c", b"a", b"b").unwrap();
    assert!(edger.load_children(0, b"a", None).unwrap().is_leaf());
    assert!(edger.load_children(0, b"b", None).unwrap().contains(b"c"));

    // second step fails, first step must not survive
    let err = reparent(&edger, b"c", b"b", b"toolong").unwrap_err();
    assert!(matches!(err, Error::InvalidKeyLength { expected: 1, actual: 7 }));
    assert!(edger.load_children(0, b"b", None).unwrap().contains(b"c"));
}

#[test]
fn test_uncommitted_writes_are_private() {
    let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));

    let mut txn = AcidEdger::transaction(&edger).unwrap();
    txn.save_edges(0, &[(&b"x"[..], &b"y"[..])]).unwrap();
    assert!(txn.load_children_until(0, b"y", b"x").unwrap().contains(b"x"));
    assert!(edger.load_children(0, b"y", None).unwrap().is_leaf());

    txn.rollback();
    assert!(edger.is_empty().unwrap());
}

#[test]
fn test_stores_share_environment() {
    let (orgs, _ctx) = create_test_lmdb_edger(EdgerConfig::new(1));
    let folders = LmdbEdger::with_env(orgs.env().clone(), EdgerConfig::new(1), "folders").unwrap();

    orgs.save_edges(0, &[(&b"a"[..], &b"b"[..])]).unwrap();
    folders.save_edges(0, &[(&b"a"[..], &b"c"[..])]).unwrap();

    // one host transaction spanning both stores
    let env = orgs.env().clone();
    let mut wtxn = env.write_txn().unwrap();
    orgs.attach(&mut wtxn).delete_item(0, b"a").unwrap();
    folders.attach(&mut wtxn).save_edges(0, &[(&b"d"[..], &b"c"[..])]).unwrap();
    wtxn.commit().unwrap();

    assert!(orgs.is_empty().unwrap());
    assert_eq!(folders.len().unwrap(), 4);
    assert_eq!(
        folders.load_children(0, b"c", None).unwrap().ids(true),
        vec![&b"a"[..], &b"d"[..]]
    );
}

#[test]
fn test_invalid_lmdb_config() {
    let ctx = TestContext::new();
    let lmdb = LmdbConfig {
        max_dbs: 0,
        ..LmdbConfig::default()
    };
    let err = LmdbEdger::open(ctx.path(), EdgerConfig::new(1), lmdb).err().unwrap();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let (edger, _ctx) = create_test_lmdb_edger(EdgerConfig::new(2));
    let edger = Arc::new(edger);
    edger.save_edges(0, &[(&b"r0"[..], &b"r0"[..])]).unwrap();

    let handles: Vec<_> = (0u8..4)
        .map(|worker| {
            let edger = Arc::clone(&edger);
            thread::spawn(move || {
                for i in 0u8..25 {
                    let child = [b'a' + worker, i];
                    edger.save_edges(0, &[(&child[..], &b"r0"[..])]).unwrap();
                    let up = edger.load_parents(0, &child, None).unwrap();
                    assert!(up.contains(b"r0"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let down = edger.load_children(0, b"r0", Some(1)).unwrap();
    // 100 children plus the root's self-edge
    assert_eq!(down.edges.len(), 101);
}
