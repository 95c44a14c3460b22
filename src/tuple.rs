// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::cursor::{Reader, Writer};
use crate::element::{Element, decode_element, encode_element, skip_element, Skip};
use crate::error::Result;

/// Encodes `elems` with `prefix` prepended, with no delimiter between
/// elements — each element's kind tag and self-terminating payload make
/// the boundary unambiguous (`spec.md` §4.4, §9).
pub fn encode_tuple(prefix: &[u8], elems: &[Element]) -> Result<Vec<u8>> {
    let mut w = Writer::with_capacity(prefix.len() + elems.len() * 2);
    w.put_bytes(prefix);
    for e in elems {
        encode_element(&mut w, e)?;
    }
    Ok(w.finish())
}

/// Decodes a tuple out of `bytes`, which must start with `prefix`. Returns
/// `None` — not an error — when it doesn't, so prefix-scan callers can
/// filter out foreign keys (`spec.md` §4.4).
pub fn decode_tuple(prefix: &[u8], bytes: &[u8]) -> Result<Option<Vec<Element>>> {
    if !bytes.starts_with(prefix) {
        return Ok(None);
    }
    let mut r = Reader::new(&bytes[prefix.len()..]);
    let mut elems = Vec::new();
    loop {
        if r.is_empty() {
            break;
        }
        // Peek the separator without disturbing element decoding: a
        // dedicated lookahead avoids decoding a fake element for KIND_SEP.
        if r.peek() == Some(crate::element::kind::SEP) {
            r.skip(1)?;
            break;
        }
        elems.push(decode_element(&mut r)?);
    }
    Ok(Some(elems))
}

/// Advances `r` past one encoded tuple (its elements and the trailing
/// separator, if any), without materializing the elements. Used by batch
/// decoding and by `Key` indexing across tuple boundaries.
pub fn skip_tuple(r: &mut Reader) -> Result<()> {
    loop {
        match skip_element(r)? {
            None => break,
            Some(Skip::TupleEnd) => break,
            Some(Skip::Advanced) => continue,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_two_ints_no_delimiter() {
        let bytes = encode_tuple(&[], &[Element::Integer(0), Element::Integer(1)]).unwrap();
        assert_eq!(bytes, vec![0x13, 0x00, 0x13, 0x01]);
    }

    #[test]
    fn tuple_roundtrip() {
        let tuple = vec![
            Element::Integer(42),
            Element::Text("hello".to_string()),
            Element::Bool(true),
            Element::Blob(vec![1, 2, 3]),
        ];
        let bytes = encode_tuple(&[], &tuple).unwrap();
        assert_eq!(decode_tuple(&[], &bytes).unwrap(), Some(tuple));
    }

    #[test]
    fn prefix_mismatch_is_none_not_error() {
        let bytes = encode_tuple(b"ns1/", &[Element::Integer(1)]).unwrap();
        assert_eq!(decode_tuple(b"ns2/", &bytes).unwrap(), None);
    }

    #[test]
    fn prefix_is_stripped_before_decoding() {
        let tuple = vec![Element::Integer(7)];
        let bytes = encode_tuple(b"ns/", &tuple).unwrap();
        assert_eq!(decode_tuple(b"ns/", &bytes).unwrap(), Some(tuple));
    }

    #[test]
    fn empty_tuple_roundtrips() {
        let bytes = encode_tuple(&[], &[]).unwrap();
        assert!(bytes.is_empty());
        assert_eq!(decode_tuple(&[], &bytes).unwrap(), Some(vec![]));
    }

    #[test]
    fn order_preservation_across_same_shape_tuples() {
        // spec.md §8 property 4: for tuples of the same element-kind
        // signature whose component-wise (decoded) order is `lesser <
        // greater`, the encoded bytes must agree under memcmp.
        let pairs = [
            (vec![Element::Integer(1)], vec![Element::Integer(2)]),
            (
                vec![Element::Integer(1), Element::Text("a".to_string())],
                vec![Element::Integer(1), Element::Text("z".to_string())],
            ),
            (vec![Element::Bool(false)], vec![Element::Bool(true)]),
            (vec![Element::Integer(-5)], vec![Element::Integer(-1)]),
        ];
        for (lesser, greater) in pairs {
            let lesser_bytes = encode_tuple(&[], &lesser).unwrap();
            let greater_bytes = encode_tuple(&[], &greater).unwrap();
            assert!(
                lesser_bytes < greater_bytes,
                "memcmp order must agree for {lesser:?} vs {greater:?}"
            );
        }
    }
}
