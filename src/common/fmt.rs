//! Lane dump formatting
//!
//! Renders raw vector payloads for diagnostics. A payload is split into lanes
//! of the element width; each lane is printed as a single value, so a 32-bit
//! lane holding `1` reads `00000001` in hex regardless of host byte order.
//!
//! # Examples
//!
//! ```rust
//! use lanekit::common::fmt::hex_lanes;
//!
//! let lanes = [0x0102u16, 0xABCD];
//! let bytes: Vec<u8> = lanes.iter().flat_map(|l| l.to_ne_bytes()).collect();
//! assert_eq!(hex_lanes(&bytes, 2), "0102 abcd");
//! ```

use crate::lane::{ElementKind, Lane, bits_from_ne_bytes};

/// Lookup table for converting nibbles to lowercase hex (0-9, a-f)
const HEX_CHARS_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Format `bytes` as space separated hex lanes of `lane_width` bytes each
///
/// Every lane is zero-padded to `lane_width * 2` digits, most significant
/// nibble first. Trailing bytes that do not fill a lane are ignored.
pub fn hex_lanes(bytes: &[u8], lane_width: usize) -> String {
    if bytes.is_empty() || lane_width == 0 {
        return String::new();
    }

    let lanes = bytes.len() / lane_width;
    let mut result = String::with_capacity(lanes * (lane_width * 2 + 1));

    for (i, lane) in bytes.chunks_exact(lane_width).enumerate() {
        if i > 0 {
            result.push(' ');
        }
        push_lane_hex(lane, &mut result);
    }

    result
}

fn push_lane_hex(lane: &[u8], output: &mut String) {
    // SAFETY: We're only pushing valid ASCII characters
    let buf = unsafe { output.as_mut_vec() };

    let mut emit = |byte: u8| {
        buf.push(HEX_CHARS_LOWER[(byte >> 4) as usize]);
        buf.push(HEX_CHARS_LOWER[(byte & 0x0F) as usize]);
    };

    if cfg!(target_endian = "little") {
        lane.iter().rev().for_each(|&byte| emit(byte));
    } else {
        lane.iter().for_each(|&byte| emit(byte));
    }
}

/// Format `bytes` as space separated decimal lanes of `kind`
///
/// Integers print exactly; floats print the shortest text that reads back to
/// the same value.
pub fn decimal_lanes(bytes: &[u8], kind: ElementKind) -> String {
    let mut result = String::new();

    for (i, lane) in bytes.chunks_exact(kind.size()).enumerate() {
        if i > 0 {
            result.push(' ');
        }
        let bits = bits_from_ne_bytes(lane);
        match kind {
            ElementKind::U8 => u8::from_bits(bits).push_decimal(&mut result),
            ElementKind::I8 => i8::from_bits(bits).push_decimal(&mut result),
            ElementKind::U16 => u16::from_bits(bits).push_decimal(&mut result),
            ElementKind::I16 => i16::from_bits(bits).push_decimal(&mut result),
            ElementKind::U32 => u32::from_bits(bits).push_decimal(&mut result),
            ElementKind::I32 => i32::from_bits(bits).push_decimal(&mut result),
            ElementKind::U64 => u64::from_bits(bits).push_decimal(&mut result),
            ElementKind::I64 => i64::from_bits(bits).push_decimal(&mut result),
            ElementKind::F32 => <f32 as Lane>::from_bits(bits).push_decimal(&mut result),
            ElementKind::F64 => <f64 as Lane>::from_bits(bits).push_decimal(&mut result),
        }
    }

    result
}

/// Format a packed bitmask as `0`/`1` digits, lowest bit first
pub fn binary_bits(bits: u64, count: usize) -> String {
    (0..count.min(64))
        .map(|i| if (bits >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}
