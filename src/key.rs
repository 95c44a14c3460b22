// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::cowvec::CowVec;
use crate::cursor::{Reader, Writer};
use crate::element::{Element, Skip, decode_element, encode_element, kind, skip_element};
use crate::error::{Error, Result};
use crate::tuple::encode_tuple;

/// An order-preserving encoded tuple, held as a `CowVec<u8>` so a `Key`
/// built from a scan cursor's page can share that page's buffer instead of
/// copying it (`spec.md` §5's *Shared* key; the `Copied` mode named there
/// collapses into `Owned` here — see `DESIGN.md`).
///
/// A `Key` never stores a prefix: construction strips it (`from_raw`) and
/// serialization reattaches one (`to_raw`), possibly a different one than
/// the key was built with.
#[derive(Clone)]
pub struct Key {
    bytes: CowVec<u8>,
    hash_cache: Cell<Option<i64>>,
}

impl Key {
    fn from_owned(bytes: Vec<u8>) -> Key {
        Key { bytes: CowVec::new(bytes), hash_cache: Cell::new(None) }
    }

    /// Encodes `elems` as a tuple with no prefix.
    pub fn from_tuple(elems: &[Element]) -> Result<Key> {
        Ok(Key::from_owned(encode_tuple(&[], elems)?))
    }

    /// Encodes a single element as a one-element tuple.
    pub fn from_element(elem: &Element) -> Result<Key> {
        Key::from_tuple(std::slice::from_ref(elem))
    }

    /// Builds a `Key` from a raw `(prefix, bytes)` pair, validated only to
    /// the extent that `bytes` starts with `prefix`. The prefix itself is
    /// not retained — `to_raw` reattaches one independently.
    pub fn from_raw(prefix: &[u8], bytes: &[u8]) -> Option<Key> {
        if !bytes.starts_with(prefix) {
            return None;
        }
        Some(Key::from_owned(bytes[prefix.len()..].to_vec()))
    }

    /// Decodes a hex string into a `Key`, matching whatever `to_hex` on the
    /// same bytes would have produced.
    pub fn from_hex(hex: &str) -> Result<Key> {
        let bytes = hex::decode(hex).map_err(|_| Error::Corrupt { byte: 0 })?;
        Ok(Key::from_owned(bytes))
    }

    /// Shares this key's storage with a new `Key` handle rather than
    /// copying it, promoting `self` to `Shared` storage in the process.
    pub fn share(&mut self) -> Key {
        let rc = match &self.bytes {
            CowVec::Owned(v) => Rc::new(v.clone()),
            CowVec::Shared(rc) => rc.clone(),
        };
        self.bytes = CowVec::Shared(rc.clone());
        Key { bytes: CowVec::Shared(rc), hash_cache: Cell::new(None) }
    }

    /// Prepends `prefix` to the encoded bytes.
    pub fn to_raw(&self, prefix: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(prefix.len() + self.bytes.as_slice().len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(self.bytes.as_slice());
        out
    }

    /// Lowercase hex of the raw (prefix-less) encoded bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes.as_slice())
    }

    /// Counts elements by repeated skip. `O(n)`, as is `get`.
    pub fn len(&self) -> usize {
        let mut r = Reader::new(self.bytes.as_slice());
        let mut n = 0usize;
        loop {
            match skip_element(&mut r) {
                Ok(Some(Skip::Advanced)) => n += 1,
                _ => break,
            }
        }
        n
    }

    /// True for a zero-element tuple.
    pub fn is_empty(&self) -> bool {
        self.bytes.as_slice().is_empty()
    }

    /// Element at `index`, which may be negative (`-1` is the last
    /// element). Computes `len` first, then walks from the start.
    pub fn get(&self, index: isize) -> Option<Element> {
        let len = self.len() as isize;
        let idx = if index < 0 { len + index } else { index };
        if idx < 0 || idx >= len {
            return None;
        }
        let mut r = Reader::new(self.bytes.as_slice());
        for _ in 0..idx {
            match skip_element(&mut r) {
                Ok(Some(Skip::Advanced)) => {}
                _ => return None,
            }
        }
        decode_element(&mut r).ok()
    }

    /// Lazily decodes elements one at a time, without materializing the
    /// full tuple.
    pub fn iter(&self) -> KeyIter<'_> {
        KeyIter { r: Reader::new(self.bytes.as_slice()) }
    }

    /// FNV-like hash over the raw bytes, remapped away from `-1` (some host
    /// protocols reserve that value to signal "no hash computed yet"),
    /// cached on first use.
    pub fn hash_value(&self) -> i64 {
        if let Some(h) = self.hash_cache.get() {
            return h;
        }
        let mut h: i64 = 0;
        for &b in self.bytes.as_slice() {
            h = h.wrapping_mul(1_000_003) ^ (b as i64);
        }
        if h == -1 {
            h = -2;
        }
        self.hash_cache.set(Some(h));
        h
    }

    /// Compares `self` against a raw tuple by encoding it element-by-element
    /// into a scratch buffer and comparing incrementally against `self`'s
    /// bytes, stopping as soon as a mismatch or exhaustion is determined.
    pub fn cmp_tuple(&self, tuple: &[Element]) -> Result<Ordering> {
        let mut r = Reader::new(self.bytes.as_slice());
        for elem in tuple {
            let mut scratch = Writer::new();
            encode_element(&mut scratch, elem)?;
            let enc = scratch.finish();
            let avail = r.rest();
            let n = enc.len().min(avail.len());
            match avail[..n].cmp(&enc[..n]) {
                Ordering::Equal => {}
                other => return Ok(other),
            }
            if avail.len() < enc.len() {
                return Ok(Ordering::Less);
            }
            r.skip(enc.len())?;
        }
        Ok(if r.is_empty() { Ordering::Equal } else { Ordering::Greater })
    }

    /// `key + tuple` — encodes `tuple` with no prefix and appends it.
    pub fn concat_tuple(&self, tuple: &[Element]) -> Result<Key> {
        let mut out = self.bytes.as_slice().to_vec();
        out.extend_from_slice(&encode_tuple(&[], tuple)?);
        Ok(Key::from_owned(out))
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.to_hex())
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        self.bytes.as_slice() == other.bytes.as_slice()
    }
}

impl Eq for Key {}

impl Ord for Key {
    fn cmp(&self, other: &Key) -> Ordering {
        self.bytes.as_slice().cmp(other.bytes.as_slice())
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Key) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i64(self.hash_value());
    }
}

impl PartialEq<[Element]> for Key {
    fn eq(&self, other: &[Element]) -> bool {
        self.cmp_tuple(other).map(Ordering::is_eq).unwrap_or(false)
    }
}

impl PartialEq<Vec<Element>> for Key {
    fn eq(&self, other: &Vec<Element>) -> bool {
        self == other.as_slice()
    }
}

impl PartialOrd<[Element]> for Key {
    fn partial_cmp(&self, other: &[Element]) -> Option<Ordering> {
        self.cmp_tuple(other).ok()
    }
}

impl PartialOrd<Vec<Element>> for Key {
    fn partial_cmp(&self, other: &Vec<Element>) -> Option<Ordering> {
        self.partial_cmp(other.as_slice())
    }
}

/// `key + key` — byte concatenation.
impl std::ops::Add<&Key> for &Key {
    type Output = Key;
    fn add(self, rhs: &Key) -> Key {
        let mut out = Vec::with_capacity(self.bytes.as_slice().len() + rhs.bytes.as_slice().len());
        out.extend_from_slice(self.bytes.as_slice());
        out.extend_from_slice(rhs.bytes.as_slice());
        Key::from_owned(out)
    }
}

/// Lazy element-at-a-time decoder over a `Key`, returned by `Key::iter`.
pub struct KeyIter<'a> {
    r: Reader<'a>,
}

impl<'a> Iterator for KeyIter<'a> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        if self.r.is_empty() || self.r.peek() == Some(kind::SEP) {
            return None;
        }
        decode_element(&mut self.r).ok()
    }
}

impl<'a> IntoIterator for &'a Key {
    type Item = Element;
    type IntoIter = KeyIter<'a>;
    fn into_iter(self) -> KeyIter<'a> {
        self.iter()
    }
}
