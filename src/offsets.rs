// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::varint::{read_varint, write_varint};

/// Encodes `deltas` as `count || delta_0 || delta_1 || ... || delta_n-1`,
/// the layout the external value layer uses to index into a batched value
/// (`spec.md` §4.6).
pub fn encode_offsets(deltas: &[u64]) -> Vec<u8> {
    let mut w = Writer::with_capacity(1 + deltas.len() * 2);
    write_varint(&mut w, deltas.len() as u64, 0x00);
    for &d in deltas {
        write_varint(&mut w, d, 0x00);
    }
    w.finish()
}

/// Decodes the offset table at the start of `data`, returning the running
/// sum `[0, d_0, d_0+d_1, ...]` (length `count + 1`) and the number of
/// bytes consumed, so the caller can resume reading right after it.
pub fn decode_offsets(data: &[u8]) -> Result<(Vec<u64>, usize)> {
    let mut r = Reader::new(data);
    let count = read_varint(&mut r, 0x00)?;

    let mut offsets = Vec::with_capacity(count as usize + 1);
    offsets.push(0u64);
    let mut running = 0u64;
    for _ in 0..count {
        let delta = read_varint(&mut r, 0x00)?;
        running = running.saturating_add(delta);
        offsets.push(running);
    }
    Ok((offsets, r.position()))
}
