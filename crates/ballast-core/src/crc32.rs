//! Reflected CRC-32 over byte ranges.
//!
//! Standard reflected CRC-32: polynomial `0xEDB88320`, initial value
//! `0xFFFF_FFFF`, final one's complement. Check value:
//! `crc32_bytes(b"123456789") == 0xCBF4_3926`. The mirrored arena stores
//! one checksum per half-window and compares them for equality only, so
//! the exact parameterization matters less than it being fixed.

/// Reversed CRC-32 polynomial.
const POLY: u32 = 0xEDB8_8320;

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut crc = n as u32;
        let mut k = 0;
        while k < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            k += 1;
        }
        table[n] = crc;
        n += 1;
    }
    table
}

static TABLE: [u32; 256] = build_table();

/// CRC-32 of a byte slice.
#[must_use]
pub fn crc32_bytes(data: &[u8]) -> u32 {
    let mut crc = u32::MAX;
    for &byte in data {
        crc = (crc >> 8) ^ TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize];
    }
    !crc
}

/// CRC-32 over the raw byte range `[start, end)`.
///
/// # Safety
///
/// `start..end` must be a valid readable range with `start <= end`.
pub unsafe fn crc32(start: *const u8, end: *const u8) -> u32 {
    debug_assert!(start as usize <= end as usize);
    let len = end as usize - start as usize;
    crc32_bytes(core::slice::from_raw_parts(start, len))
}
