//! Canonical protobuf codec for dag-pb nodes
//!
//! Schema (field numbers are fixed by the format):
//!
//! ```text
//! message PBLink {
//!   optional bytes  Hash  = 1;
//!   optional string Name  = 2;
//!   optional uint64 Tsize = 3;
//! }
//!
//! message PBNode {
//!   repeated PBLink Links = 2;
//!   optional bytes  Data  = 1;
//! }
//! ```
//!
//! **Canonical form:**
//! 1. Links are written first, in canonical (name-sorted) order, then Data
//! 2. Within a link: Hash, Name, Tsize. Name and Tsize are always written,
//!    Hash is omitted only when it is empty
//! 3. Zero-length Data is omitted entirely, as is an empty link list,
//!    so an empty node encodes to zero bytes
//!
//! Decoding is strict about framing (unknown fields, wrong wire types,
//!  repeated singular fields and truncation are all errors) but accepts
//!  fields in any order and re-sorts links into canonical order.

use std::str::Utf8Error;

use bytes::Bytes;

use super::link::{sort_links, Link};
use crate::linked_data::Digest;

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

const NODE_DATA: u64 = 1;
const NODE_LINKS: u64 = 2;

const LINK_HASH: u64 = 1;
const LINK_NAME: u64 = 2;
const LINK_TSIZE: u64 = 3;

/// Errors raised when wire bytes do not form a valid node
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("varint overflows 64 bits")]
    VarintOverflow,
    #[error("invalid wire type {wire_type} for field {field}")]
    InvalidWireType { field: &'static str, wire_type: u64 },
    #[error("unknown field {field} in {message}")]
    UnknownField { message: &'static str, field: u64 },
    #[error("field {0} appears more than once")]
    DuplicateField(&'static str),
    #[error("link name is not valid utf-8: {0}")]
    InvalidName(#[from] Utf8Error),
}

/// The `(data, links)` view of a decoded node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    pub data: Bytes,
    pub links: Vec<Link>,
}

/// Encode a node. `links` must already be in canonical order.
pub fn encode(data: &[u8], links: &[Link]) -> Vec<u8> {
    let mut buf = Vec::new();

    for link in links {
        let mut inner = Vec::new();
        if !link.digest().is_empty() {
            write_len_delimited(LINK_HASH, link.digest().bytes(), &mut inner);
        }
        write_len_delimited(LINK_NAME, link.name().as_bytes(), &mut inner);
        write_key(LINK_TSIZE, WIRE_VARINT, &mut inner);
        encode_varint(link.size(), &mut inner);

        write_len_delimited(NODE_LINKS, &inner, &mut buf);
    }

    if !data.is_empty() {
        write_len_delimited(NODE_DATA, data, &mut buf);
    }

    buf
}

/// Decode wire bytes into data and canonically ordered links.
///
/// Absent Data decodes to an empty byte string. Absent link fields
///  decode to an empty name, a zero size and an empty digest.
pub fn decode(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    let mut pos = 0;
    let mut data: Option<Bytes> = None;
    let mut links = Vec::new();

    while pos < bytes.len() {
        let (field, wire_type) = read_key(bytes, &mut pos)?;
        match field {
            NODE_DATA => {
                expect_wire_type("Data", wire_type, WIRE_LEN)?;
                let payload = read_len_delimited(bytes, &mut pos)?;
                if data.is_some() {
                    return Err(DecodeError::DuplicateField("Data"));
                }
                data = Some(Bytes::copy_from_slice(payload));
            }
            NODE_LINKS => {
                expect_wire_type("Links", wire_type, WIRE_LEN)?;
                let payload = read_len_delimited(bytes, &mut pos)?;
                links.push(decode_link(payload)?);
            }
            other => {
                return Err(DecodeError::UnknownField {
                    message: "PBNode",
                    field: other,
                })
            }
        }
    }

    sort_links(&mut links);

    Ok(Decoded {
        data: data.unwrap_or_default(),
        links,
    })
}

fn decode_link(bytes: &[u8]) -> Result<Link, DecodeError> {
    let mut pos = 0;
    let mut hash: Option<&[u8]> = None;
    let mut name: Option<&str> = None;
    let mut tsize: Option<u64> = None;

    while pos < bytes.len() {
        let (field, wire_type) = read_key(bytes, &mut pos)?;
        match field {
            LINK_HASH => {
                expect_wire_type("Hash", wire_type, WIRE_LEN)?;
                let payload = read_len_delimited(bytes, &mut pos)?;
                if hash.replace(payload).is_some() {
                    return Err(DecodeError::DuplicateField("Hash"));
                }
            }
            LINK_NAME => {
                expect_wire_type("Name", wire_type, WIRE_LEN)?;
                let payload = std::str::from_utf8(read_len_delimited(bytes, &mut pos)?)?;
                if name.replace(payload).is_some() {
                    return Err(DecodeError::DuplicateField("Name"));
                }
            }
            LINK_TSIZE => {
                expect_wire_type("Tsize", wire_type, WIRE_VARINT)?;
                let value = decode_varint(bytes, &mut pos)?;
                if tsize.replace(value).is_some() {
                    return Err(DecodeError::DuplicateField("Tsize"));
                }
            }
            other => {
                return Err(DecodeError::UnknownField {
                    message: "PBLink",
                    field: other,
                })
            }
        }
    }

    Ok(Link::new(
        name.unwrap_or_default(),
        tsize.unwrap_or_default(),
        Digest::from(hash.unwrap_or_default()),
    ))
}

fn expect_wire_type(field: &'static str, got: u64, want: u64) -> Result<(), DecodeError> {
    if got != want {
        return Err(DecodeError::InvalidWireType {
            field,
            wire_type: got,
        });
    }
    Ok(())
}

fn write_key(field: u64, wire_type: u64, buf: &mut Vec<u8>) {
    encode_varint((field << 3) | wire_type, buf);
}

fn write_len_delimited(field: u64, payload: &[u8], buf: &mut Vec<u8>) {
    write_key(field, WIRE_LEN, buf);
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}

fn read_key(bytes: &[u8], pos: &mut usize) -> Result<(u64, u64), DecodeError> {
    let key = decode_varint(bytes, pos)?;
    Ok((key >> 3, key & 0x7))
}

fn read_len_delimited<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8], DecodeError> {
    let len = decode_varint(bytes, pos)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::Truncated)?;
    let end = pos.checked_add(len).ok_or(DecodeError::Truncated)?;
    if end > bytes.len() {
        return Err(DecodeError::Truncated);
    }
    let payload = &bytes[*pos..end];
    *pos = end;
    Ok(payload)
}

/// Append `value` as an unsigned LEB128 varint
fn encode_varint(value: u64, buf: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Read an unsigned LEB128 varint starting at `pos`, advancing it
fn decode_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, DecodeError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    while let Some(&byte) = bytes.get(*pos) {
        *pos += 1;
        let low = u64::from(byte & 0x7F);
        if shift == 63 && low > 1 {
            return Err(DecodeError::VarintOverflow);
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(DecodeError::VarintOverflow);
        }
    }
    Err(DecodeError::Truncated)
}
