//! Columnar wire encoding of `varchar` values.
//!
//! A block carries a null flag per value, the UTF-8 byte length of each value,
//! and all values concatenated without a delimiter (base64 on the wire).
//! Sizes are per value, not offsets; decoders prefix-sum them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tabulon_common::wire::{Block, VarcharData};
use tabulon_common::{Error, Result};

pub fn encode<S: AsRef<str>>(values: &[S]) -> Block {
    let mut sizes = Vec::with_capacity(values.len());
    let mut payload = Vec::with_capacity(values.iter().map(|v| v.as_ref().len()).sum());
    for value in values {
        let bytes = value.as_ref().as_bytes();
        sizes.push(bytes.len());
        payload.extend_from_slice(bytes);
    }
    Block {
        varchar_data: VarcharData {
            nulls: vec![false; values.len()],
            sizes,
            bytes: STANDARD.encode(payload),
        },
    }
}

/// Value offsets into the payload, `sizes.len() + 1` entries. Null values take no bytes.
///
/// Fails when the sizes add up past `payload_len`.
pub fn offsets(sizes: &[usize], nulls: &[bool], payload_len: usize) -> Result<Vec<usize>> {
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    let mut current = 0usize;
    offsets.push(current);
    for (i, &size) in sizes.iter().enumerate() {
        if !nulls.get(i).copied().unwrap_or(false) {
            current = current
                .checked_add(size)
                .filter(|&end| end <= payload_len)
                .ok_or_else(|| {
                    Error::InvalidBlock(format!(
                        "value {} of {} bytes runs past the {} byte payload",
                        i, size, payload_len
                    ))
                })?;
        }
        offsets.push(current);
    }
    Ok(offsets)
}

/// Raw payload bytes and offsets of a block, checked for consistency.
pub fn decode_raw(data: &VarcharData) -> Result<(Vec<u8>, Vec<usize>)> {
    if data.nulls.len() != data.sizes.len() {
        return Err(Error::InvalidBlock(format!(
            "{} null flags for {} sizes",
            data.nulls.len(),
            data.sizes.len()
        )));
    }
    let payload = STANDARD
        .decode(data.bytes.as_bytes())
        .map_err(|e| Error::InvalidBlock(format!("bad base64 payload: {}", e)))?;
    let offsets = offsets(&data.sizes, &data.nulls, payload.len())?;
    let total = offsets.last().copied().unwrap_or(0);
    if total != payload.len() {
        return Err(Error::InvalidBlock(format!(
            "sizes add up to {} bytes but payload has {}",
            total,
            payload.len()
        )));
    }
    Ok((payload, offsets))
}

/// Values of a block; `None` marks a null.
pub fn decode(block: &Block) -> Result<Vec<Option<String>>> {
    let data = &block.varchar_data;
    let (payload, offsets) = decode_raw(data)?;
    offsets
        .windows(2)
        .zip(&data.nulls)
        .map(|(bounds, &is_null)| {
            if is_null {
                return Ok(None);
            }
            std::str::from_utf8(&payload[bounds[0]..bounds[1]])
                .map(|s| Some(s.to_string()))
                .map_err(|e| Error::InvalidBlock(format!("value is not UTF-8: {}", e)))
        })
        .collect()
}
