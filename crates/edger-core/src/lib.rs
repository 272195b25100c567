//! Edger Core - Bidirectional Graph-Edge Store
//!
//! This crate stores directed parent/child relationships between fixed-width
//! binary identifiers inside an ordered key-value space:
//! - Every relationship is written twice (child→parent and parent→child), so
//!   ancestors and descendants are both one prefix scan away
//! - Relationships are partitioned by a one-byte relation type
//! - Ancestor and descendant queries return a tree ([`Edge`]), bounded by depth
//!   or by a target identifier
//! - A durable backend over LMDB with atomic transactions and a volatile
//!   in-memory backend answer every query identically
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        Actions / Transaction / AcidEdger     │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴───────────┐ ┌────────────────┐
//! │  LmdbEdger (heed, LMDB)  │ │  MemoryEdger   │
//! │  LmdbTransaction         │ │  (BTreeSet)    │
//! └──────────────┬───────────┘ └───────┬────────┘
//!                │                     │
//! ┌──────────────┴─────────────────────┴────────┐
//! │     Traversal Engine (PrefixScan, Edge)      │
//! └──────────────┬──────────────────────────────┘
//!                │
//! ┌──────────────┴──────────────────────────────┐
//! │   Key Codec [prefix][type][order][l][r]      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use edger_core::MemoryEdger;
//!
//! let edger = MemoryEdger::with_key_size(3).unwrap();
//! edger
//!     .save_edges(0, &[(&b"001"[..], &b"010"[..]), (&b"010"[..], &b"100"[..])])
//!     .unwrap();
//!
//! let ancestors = edger.load_parents(0, b"001", None).unwrap();
//! assert_eq!(ancestors.ids(true), vec![&b"010"[..], &b"100"[..]]);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod config;
pub mod edge;
pub mod error;
pub mod keys;
pub mod lmdb;
pub mod memory;
pub mod testing;
pub mod traversal;

pub use actions::{AcidEdger, Actions, Transaction};
pub use config::{EdgerConfig, LmdbConfig};
pub use edge::Edge;
pub use error::{Error, Result};
pub use keys::{Pair, RelationOrder};
pub use lmdb::{AttachedTransaction, LmdbEdger, LmdbTransaction};
pub use memory::MemoryEdger;
