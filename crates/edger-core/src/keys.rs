//! Key codec
//!
//! Every relationship `(left, right)` (child, parent) is stored as two
//! key-only records so either direction can be prefix-scanned:
//!
//! ```text
//! [prefix..] [rel type] [LTR] [left  (key_size)] [right (key_size)]   -> parents of left
//! [prefix..] [rel type] [RTL] [right (key_size)] [left  (key_size)]   -> children of right
//! ```
//!
//! Values are always empty; the existence of a key is the fact.

use crate::{Error, Result};

/// One `(left, right)` relationship: `left` is the child, `right` the parent.
pub type Pair<'a> = (&'a [u8], &'a [u8]);

/// Number of header bytes (relation type + relation order) after the store prefix
pub const HEADER_LEN: usize = 2;

/// Scan direction of a stored key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RelationOrder {
    /// child -> parent, scanned by "load parents"
    LeftToRight = 0,
    /// parent -> child, scanned by "load children"
    RightToLeft = 1,
}

impl RelationOrder {
    /// Byte written into the key header
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a key header byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::LeftToRight),
            1 => Some(Self::RightToLeft),
            _ => None,
        }
    }

    /// The opposite direction
    pub const fn reverse(self) -> Self {
        match self {
            Self::LeftToRight => Self::RightToLeft,
            Self::RightToLeft => Self::LeftToRight,
        }
    }
}

/// Full length of a stored key for the given identifier width and store prefix
pub const fn key_len(key_size: usize, prefix_len: usize) -> usize {
    prefix_len + HEADER_LEN + 2 * key_size
}

/// Encode one directional key. `left` and `right` are not validated.
pub fn encode_key(
    prefix: &[u8],
    rel_type: u8,
    order: RelationOrder,
    left: &[u8],
    right: &[u8],
) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + HEADER_LEN + left.len() + right.len());
    key.extend_from_slice(prefix);
    key.push(rel_type);
    key.push(order.as_byte());
    key.extend_from_slice(left);
    key.extend_from_slice(right);
    key
}

/// Encode both keys of one relationship as `(ltr, rtl)`. Identifier width is not validated.
pub fn encode_edge_pair(
    prefix: &[u8],
    rel_type: u8,
    left: &[u8],
    right: &[u8],
) -> (Vec<u8>, Vec<u8>) {
    (
        encode_key(prefix, rel_type, RelationOrder::LeftToRight, left, right),
        encode_key(prefix, rel_type, RelationOrder::RightToLeft, right, left),
    )
}

/// Scan prefix selecting every relation of `item` in one direction
pub fn encode_prefix(prefix: &[u8], rel_type: u8, order: RelationOrder, item: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + HEADER_LEN + item.len());
    key.extend_from_slice(prefix);
    key.push(rel_type);
    key.push(order.as_byte());
    key.extend_from_slice(item);
    key
}

/// Split a stored key (store prefix already stripped) into its two identifier halves.
///
/// Returns `None` if the key is not exactly `2 + 2 * key_size` bytes long.
pub fn decode_edge(key: &[u8], key_size: usize) -> Option<(&[u8], &[u8])> {
    if key_size == 0 || key.len() != HEADER_LEN + 2 * key_size {
        return None;
    }
    Some(key[HEADER_LEN..].split_at(key_size))
}

/// Number of pairs in a flat identifier list, or `None` if its length is odd
pub fn count_pairs<T>(flat: &[T]) -> Option<usize> {
    if flat.len() % 2 != 0 {
        return None;
    }
    Some(flat.len() / 2)
}

/// Group a flat `[left, right, left, right, ..]` list into pairs
pub fn pair_up<'a, T: AsRef<[u8]>>(flat: &'a [T]) -> Result<Vec<Pair<'a>>> {
    if count_pairs(flat).is_none() {
        return Err(Error::OddPairCount(flat.len()));
    }
    Ok(flat
        .chunks_exact(2)
        .map(|pair| (pair[0].as_ref(), pair[1].as_ref()))
        .collect())
}

/// Check that an identifier has the configured width
pub fn check_width(item: &[u8], key_size: usize) -> Result<()> {
    if item.len() != key_size {
        return Err(Error::InvalidKeyLength {
            expected: key_size,
            actual: item.len(),
        });
    }
    Ok(())
}

/// Build the full key list (both directions for every pair) to insert or delete.
///
/// Fails before producing any key if an identifier has the wrong width.
pub fn build_pairs(
    rel_type: u8,
    key_size: usize,
    prefix: &[u8],
    pairs: &[Pair<'_>],
) -> Result<Vec<Vec<u8>>> {
    let mut keys = Vec::with_capacity(pairs.len() * 2);
    for (left, right) in pairs {
        check_width(left, key_size)?;
        check_width(right, key_size)?;
        let (ltr, rtl) = encode_edge_pair(prefix, rel_type, left, right);
        keys.push(ltr);
        keys.push(rtl);
    }
    Ok(keys)
}
