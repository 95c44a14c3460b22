// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::batch::{decode_batch, encode_batch};
use crate::cursor::Writer;
use crate::element::Element;
use crate::error::Result;
use crate::key::Key;
use crate::tuple::{decode_tuple, encode_tuple};
use crate::varint::write_varint;

/// Anything `pack`/`packs` can turn into bytes: a single element, a whole
/// tuple, or an already-encoded `Key` (`spec.md` §6).
pub enum Packable {
    /// Packed as a one-element tuple.
    Element(Element),
    /// Packed as-is.
    Tuple(Vec<Element>),
    /// Packed by re-encoding the key's own elements.
    Key(Key),
}

impl From<Element> for Packable {
    fn from(e: Element) -> Self {
        Packable::Element(e)
    }
}

impl From<Vec<Element>> for Packable {
    fn from(t: Vec<Element>) -> Self {
        Packable::Tuple(t)
    }
}

impl From<Key> for Packable {
    fn from(k: Key) -> Self {
        Packable::Key(k)
    }
}

fn as_tuple(value: &Packable) -> Vec<Element> {
    match value {
        Packable::Element(e) => vec![e.clone()],
        Packable::Tuple(t) => t.clone(),
        Packable::Key(k) => k.iter().collect(),
    }
}

/// Encodes a single element, tuple, or key with `prefix` prepended.
pub fn pack(prefix: &[u8], value: impl Into<Packable>) -> Result<Vec<u8>> {
    encode_tuple(prefix, &as_tuple(&value.into()))
}

/// Encodes a list of elements/tuples/keys as a batch, joined by `KIND_SEP`.
pub fn packs(prefix: &[u8], values: &[Packable]) -> Result<Vec<u8>> {
    let tuples: Vec<Vec<Element>> = values.iter().map(as_tuple).collect();
    encode_batch(prefix, &tuples)
}

/// Decodes one tuple, returning `None` on a prefix mismatch.
pub fn unpack(prefix: &[u8], data: &[u8]) -> Result<Option<Vec<Element>>> {
    decode_tuple(prefix, data)
}

/// Decodes an entire batch, returning `None` on a prefix mismatch.
pub fn unpacks(prefix: &[u8], data: &[u8]) -> Result<Option<Vec<Vec<Element>>>> {
    decode_batch(prefix, data)
}

/// Encodes `v` as a plain (non-negative, unmasked) varint with `prefix`
/// prepended and no kind byte — used to build raw index keys that embed a
/// bare integer rather than a full `Element::Integer`.
pub fn pack_int(prefix: &[u8], v: u64) -> Vec<u8> {
    let mut w = Writer::with_capacity(prefix.len() + 9);
    w.put_bytes(prefix);
    write_varint(&mut w, v, 0x00);
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_element_matches_single_element_tuple() {
        let a = pack(&[], Element::Integer(5)).unwrap();
        let b = pack(&[], vec![Element::Integer(5)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pack_key_reencodes_its_tuple() {
        let key = Key::from_tuple(&[Element::Integer(1), Element::Bool(true)]).unwrap();
        let bytes = pack(&[], key).unwrap();
        assert_eq!(unpack(&[], &bytes).unwrap(), Some(vec![Element::Integer(1), Element::Bool(true)]));
    }

    #[test]
    fn packs_mixes_elements_tuples_and_keys() {
        let key = Key::from_tuple(&[Element::Integer(9)]).unwrap();
        let values = vec![
            Packable::Element(Element::Bool(false)),
            Packable::Tuple(vec![Element::Integer(1), Element::Integer(2)]),
            Packable::Key(key),
        ];
        let bytes = packs(&[], &values).unwrap();
        let decoded = unpacks(&[], &bytes).unwrap().unwrap();
        assert_eq!(
            decoded,
            vec![
                vec![Element::Bool(false)],
                vec![Element::Integer(1), Element::Integer(2)],
                vec![Element::Integer(9)],
            ]
        );
    }

    #[test]
    fn pack_int_is_a_bare_varint_behind_the_prefix() {
        let bytes = pack_int(b"ix/", 300);
        assert!(bytes.starts_with(b"ix/"));
        assert_eq!(bytes.len(), 3 + 2);
    }

    #[test]
    fn unpack_prefix_mismatch_is_none() {
        let bytes = pack(b"a/", Element::Integer(1)).unwrap();
        assert_eq!(unpack(b"b/", &bytes).unwrap(), None);
    }
}
