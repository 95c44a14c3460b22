// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::varint::{read_varint, skip_varint, write_varint};
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// Kind-byte tags. Order matters: memcmp of tag-prefixed encodings must
/// reproduce the desired element-type order, so these values are frozen
/// as part of the on-disk format (`spec.md` §3, §6).
pub mod kind {
    /// `Element::Null`.
    pub const NULL: u8 = 0x0F;
    /// `Element::Time` with a negative epoch, magnitude XOR-masked.
    pub const NEG_TIME: u8 = 0x10;
    /// `Element::Integer` with a negative value, magnitude XOR-masked.
    pub const NEG_INTEGER: u8 = 0x11;
    /// `Element::Bool`.
    pub const BOOL: u8 = 0x12;
    /// `Element::Integer` with a non-negative value.
    pub const INTEGER: u8 = 0x13;
    /// `Element::Time` with a non-negative epoch.
    pub const TIME: u8 = 0x14;
    /// `Element::Blob`.
    pub const BLOB: u8 = 0x15;
    /// `Element::Text`.
    pub const TEXT: u8 = 0x16;
    /// `Element::Uuid`.
    pub const UUID: u8 = 0x17;
    /// Tuple/batch separator. Not a real element kind, but shares the tag
    /// space so a dense `match` over the byte covers every case.
    pub const SEP: u8 = 0x18;
}

/// The tuple codec's closed set of primitive values. Intentionally a small,
/// dense union rather than an extensible/dyn-dispatched type, per `spec.md`
/// §9: "a tagged variant with a dense match on the kind byte is preferred
/// over interface/trait dispatch."
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    /// The absence of a value.
    Null,
    /// A single boolean.
    Bool(bool),
    /// Representable range is `-(2^64-1)..=2^64-1`; anything wider fails
    /// to encode with `Error::OutOfRange`.
    Integer(i128),
    /// An arbitrary byte string.
    Blob(Vec<u8>),
    /// A UTF-8 string.
    Text(String),
    /// Millisecond precision, UTC offset quantized to 15-minute units.
    Time(DateTime<FixedOffset>),
    /// A 128-bit UUID.
    Uuid(Uuid),
}

/// The maximum magnitude an `Element::Integer` may hold.
const MAX_MAGNITUDE: u128 = u64::MAX as u128;

fn out_of_range(msg: impl Into<String>) -> Error {
    Error::OutOfRange(msg.into())
}

/// Encodes one element as `kind_byte || payload`.
pub fn encode_element(w: &mut Writer, elem: &Element) -> Result<()> {
    match elem {
        Element::Null => w.put_byte(kind::NULL),
        Element::Bool(b) => {
            w.put_byte(kind::BOOL);
            w.put_byte(if *b { 0x01 } else { 0x00 });
        }
        Element::Integer(v) => encode_integer(w, *v)?,
        Element::Blob(bytes) => {
            w.put_byte(kind::BLOB);
            pack7(w, bytes);
        }
        Element::Text(s) => {
            w.put_byte(kind::TEXT);
            pack7(w, s.as_bytes());
        }
        Element::Time(dt) => encode_time(w, dt)?,
        Element::Uuid(id) => {
            w.put_byte(kind::UUID);
            w.put_bytes(id.as_bytes());
        }
    }
    Ok(())
}

fn encode_integer(w: &mut Writer, v: i128) -> Result<()> {
    if v >= 0 {
        let mag = v as u128;
        if mag > MAX_MAGNITUDE {
            return Err(out_of_range(format!("integer {v} exceeds u64::MAX")));
        }
        w.put_byte(kind::INTEGER);
        write_varint(w, mag as u64, 0x00);
    } else {
        let mag = v.unsigned_abs();
        if mag > MAX_MAGNITUDE {
            return Err(out_of_range(format!("integer {v} exceeds -(u64::MAX)")));
        }
        w.put_byte(kind::NEG_INTEGER);
        write_varint(w, mag as u64, 0xFF);
    }
    Ok(())
}

/// Packs the UTC offset (seconds) into one of the 128 quarter-hour slots
/// the wire format allots it, per `spec.md` §4.3: `offset_bits = 64 +
/// offset_seconds/900`, rounded to the nearest slot and rejected outside
/// `[-31, 32]` quarter-hours.
fn offset_to_units(offset_seconds: i32) -> Result<i32> {
    let units = if offset_seconds >= 0 {
        (offset_seconds + 450) / 900
    } else {
        -((-offset_seconds + 450) / 900)
    };
    if !(-31..=32).contains(&units) {
        return Err(out_of_range(format!("utc offset {offset_seconds}s is out of range")));
    }
    Ok(units)
}

fn encode_time(w: &mut Writer, dt: &DateTime<FixedOffset>) -> Result<()> {
    let epoch_ms = dt.timestamp_millis() as i128;
    let offset_units = offset_to_units(dt.offset().local_minus_utc())?;
    let offset_bits = (64 + offset_units) as i128;
    let composite = epoch_ms * 128 + offset_bits;

    if composite >= 0 {
        let v: u64 = composite
            .try_into()
            .map_err(|_| out_of_range(format!("timestamp {dt} overflows the wire format")))?;
        w.put_byte(kind::TIME);
        write_varint(w, v, 0x00);
    } else {
        let mag: u128 = (-composite)
            .try_into()
            .map_err(|_| out_of_range(format!("timestamp {dt} overflows the wire format")))?;
        if mag > MAX_MAGNITUDE {
            return Err(out_of_range(format!("timestamp {dt} overflows the wire format")));
        }
        w.put_byte(kind::NEG_TIME);
        write_varint(w, mag as u64, 0xFF);
    }
    Ok(())
}

fn decode_time(composite: i128) -> Result<DateTime<FixedOffset>> {
    let epoch_ms: i64 = composite
        .div_euclid(128)
        .try_into()
        .map_err(|_| Error::Corrupt { byte: 0 })?;
    let offset_bits = composite.rem_euclid(128) as u8;
    let offset_seconds = (offset_bits as i32 - 64) * 900;
    let offset = FixedOffset::east_opt(offset_seconds).ok_or(Error::Corrupt { byte: offset_bits })?;
    let utc = DateTime::from_timestamp_millis(epoch_ms).ok_or(Error::Corrupt { byte: offset_bits })?;
    Ok(utc.with_timezone(&offset))
}

/// Decodes one element, consuming its kind byte and payload.
pub fn decode_element(r: &mut Reader) -> Result<Element> {
    let tag = r.take_byte()?;
    match tag {
        kind::NULL => Ok(Element::Null),
        kind::BOOL => match r.take_byte()? {
            0x00 => Ok(Element::Bool(false)),
            0x01 => Ok(Element::Bool(true)),
            b => Err(Error::Corrupt { byte: b }),
        },
        kind::INTEGER => {
            let v = read_varint(r, 0x00)?;
            Ok(Element::Integer(v as i128))
        }
        kind::NEG_INTEGER => {
            let mag = read_varint(r, 0xFF)?;
            Ok(Element::Integer(-(mag as i128)))
        }
        kind::TIME => {
            let v = read_varint(r, 0x00)?;
            Ok(Element::Time(decode_time(v as i128)?))
        }
        kind::NEG_TIME => {
            let mag = read_varint(r, 0xFF)?;
            Ok(Element::Time(decode_time(-(mag as i128))?))
        }
        kind::BLOB => Ok(Element::Blob(unpack7(r)?)),
        kind::TEXT => {
            let bytes = unpack7(r)?;
            String::from_utf8(bytes).map(Element::Text).map_err(|_| Error::Corrupt { byte: kind::TEXT })
        }
        kind::UUID => {
            let bytes = r.take(16)?;
            let mut arr = [0u8; 16];
            arr.copy_from_slice(bytes);
            Ok(Element::Uuid(Uuid::from_bytes(arr)))
        }
        other => Err(Error::Corrupt { byte: other }),
    }
}

/// The outcome of `skip_element`: either it advanced past exactly one
/// element, or it consumed a `KIND_SEP` and the caller's tuple has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// Advanced past exactly one element.
    Advanced,
    /// Consumed a `KIND_SEP`; the current tuple has ended.
    TupleEnd,
}

/// Advances `r` past one element without materializing it. Used by `Key`'s
/// `len`, `get`, and iteration so that indexing stays allocation-free.
pub fn skip_element(r: &mut Reader) -> Result<Option<Skip>> {
    if r.is_empty() {
        return Ok(None);
    }
    let tag = r.take_byte()?;
    match tag {
        kind::NULL => {}
        kind::BOOL => r.skip(1)?,
        kind::INTEGER => {
            skip_varint(r, 0x00)?;
        }
        kind::NEG_INTEGER => {
            skip_varint(r, 0xFF)?;
        }
        kind::TIME => {
            skip_varint(r, 0x00)?;
        }
        kind::NEG_TIME => {
            skip_varint(r, 0xFF)?;
        }
        kind::BLOB | kind::TEXT => {
            while let Some(b) = r.peek() {
                if b & 0x80 == 0 {
                    break;
                }
                r.skip(1)?;
            }
        }
        kind::UUID => r.skip(16)?,
        kind::SEP => return Ok(Some(Skip::TupleEnd)),
        other => return Err(Error::Corrupt { byte: other }),
    }
    Ok(Some(Skip::Advanced))
}

/// Packs `bytes` so that every emitted byte has its high bit set, per
/// `spec.md` §4.3. This treats the input as a bitstream and re-chunks it
/// into 7-bit groups tagged with `0x80`, so any byte with the high bit
/// clear unambiguously marks the end (a `KIND_SEP` or end-of-buffer).
fn pack7(w: &mut Writer, bytes: &[u8]) {
    w.need((bytes.len() * 8).div_ceil(7));

    let mut shift: u32 = 1;
    let mut trailer: u8 = 0;
    for &o in bytes {
        w.put_byte(0x80 | trailer | (o >> shift));
        if shift < 7 {
            trailer = (o << (7 - shift)) & 0x7F;
            shift += 1;
        } else {
            w.put_byte(0x80 | (o & 0x7F));
            shift = 1;
            trailer = 0;
        }
    }
    if shift > 1 {
        w.put_byte(0x80 | trailer);
    }
}

/// Reverses `pack7`, consuming bytes while the high bit is set.
fn unpack7(r: &mut Reader) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut bitbuf: u32 = 0;
    let mut bitcount: u32 = 0;

    while let Some(b) = r.peek() {
        if b & 0x80 == 0 {
            break;
        }
        r.skip(1)?;
        bitbuf = (bitbuf << 7) | (b & 0x7F) as u32;
        bitcount += 7;
        if bitcount >= 8 {
            let shift = bitcount - 8;
            out.push((bitbuf >> shift) as u8);
            bitcount -= 8;
            bitbuf &= (1u32 << bitcount) - 1;
        }
    }
    Ok(out)
}
