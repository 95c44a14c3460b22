// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::fmt::{Display, Formatter};

/// Errors produced while encoding or decoding tuple keys.
///
/// `unpack`/`unpacks` do not use this type for a prefix mismatch — that is
/// a normal signal for prefix-scan filtering, surfaced as `None` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended mid-element or mid-varint.
    Truncated,
    /// An unknown kind byte, or a varint first byte implying an impossible width.
    Corrupt { byte: u8 },
    /// `pack` was given a value that is not one of the element variants.
    UnsupportedType,
    /// A timestamp's UTC offset was outside `[-31*900, 32*900]` seconds, or a
    /// signed integer's magnitude exceeded `u64::MAX`.
    OutOfRange(String),
    /// The writer could not grow its buffer.
    OutOfMemory,
    /// `Key` was compared with `<`/`>` against a value that is neither a
    /// `Key` nor a tuple of elements.
    TypeMismatch,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Truncated => write!(f, "truncated: buffer ended mid-element"),
            Error::Corrupt { byte } => write!(f, "corrupt: unexpected kind byte {byte:#04x}"),
            Error::UnsupportedType => write!(f, "unsupported type for pack"),
            Error::OutOfRange(msg) => write!(f, "out of range: {msg}"),
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::TypeMismatch => write!(f, "type mismatch: expected a Key or a tuple"),
        }
    }
}

impl std::error::Error for Error {}

/// Shorthand for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
