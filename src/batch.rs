// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::cursor::{Reader, Writer};
use crate::element::{Element, decode_element, encode_element, kind};
use crate::error::Result;

/// Encodes a list of tuples as `tuple_0 || SEP || tuple_1 || ... ||
/// tuple_n-1`, with `prefix` applied once at the start and no trailing
/// separator (`spec.md` §4.5).
pub fn encode_batch(prefix: &[u8], tuples: &[Vec<Element>]) -> Result<Vec<u8>> {
    let mut w = Writer::with_capacity(prefix.len() + tuples.len() * 4);
    w.put_bytes(prefix);
    for (i, tuple) in tuples.iter().enumerate() {
        if i > 0 {
            w.put_byte(kind::SEP);
        }
        for e in tuple {
            encode_element(&mut w, e)?;
        }
    }
    Ok(w.finish())
}

/// Decodes an entire batch out of `bytes`, which must start with `prefix`.
/// Returns `None` on a prefix mismatch, matching `decode_tuple`.
///
/// End-of-buffer always terminates the last (possibly empty) tuple, so
/// this always yields at least one tuple — the same split-on-separator
/// convention `decode_tuple` uses for an empty buffer. As a consequence,
/// `packs(p, [])` and `packs(p, [[]])` (a batch of zero tuples vs. a batch
/// of one empty tuple) produce identical bytes and decode to the latter;
/// this is a property of the wire format, not a bug in this decoder.
pub fn decode_batch(prefix: &[u8], bytes: &[u8]) -> Result<Option<Vec<Vec<Element>>>> {
    if !bytes.starts_with(prefix) {
        return Ok(None);
    }
    let mut r = Reader::new(&bytes[prefix.len()..]);
    let mut tuples = Vec::new();
    let mut current = Vec::new();
    loop {
        if r.is_empty() {
            tuples.push(current);
            break;
        }
        if r.peek() == Some(kind::SEP) {
            r.skip(1)?;
            tuples.push(std::mem::take(&mut current));
            continue;
        }
        current.push(decode_element(&mut r)?);
    }
    Ok(Some(tuples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s7_two_single_element_tuples() {
        let bytes =
            encode_batch(&[], &[vec![Element::Integer(0)], vec![Element::Integer(1)]]).unwrap();
        assert_eq!(bytes, vec![0x13, 0x00, 0x18, 0x13, 0x01]);
    }

    #[test]
    fn batch_roundtrip() {
        let batch = vec![
            vec![Element::Integer(1), Element::Text("a".to_string())],
            vec![Element::Bool(false)],
            vec![Element::Blob(vec![9, 9, 9])],
        ];
        let bytes = encode_batch(&[], &batch).unwrap();
        assert_eq!(decode_batch(&[], &bytes).unwrap(), Some(batch));
    }

    #[test]
    fn batch_with_one_empty_tuple_roundtrips() {
        let batch = vec![vec![]];
        let bytes = encode_batch(&[], &batch).unwrap();
        assert!(bytes.is_empty());
        assert_eq!(decode_batch(&[], &bytes).unwrap(), Some(batch));
    }

    #[test]
    fn batch_prefix_mismatch_is_none() {
        let bytes = encode_batch(b"a/", &[vec![Element::Integer(1)]]).unwrap();
        assert_eq!(decode_batch(b"b/", &bytes).unwrap(), None);
    }

    #[test]
    fn batch_with_prefix_roundtrips() {
        let batch = vec![vec![Element::Integer(1)], vec![Element::Integer(2)]];
        let bytes = encode_batch(b"ix/", &batch).unwrap();
        assert_eq!(decode_batch(b"ix/", &bytes).unwrap(), Some(batch));
    }
}
