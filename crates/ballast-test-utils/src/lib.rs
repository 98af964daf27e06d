//! Test fixtures for ballast development.
//!
//! Provides [`WindowBuffer`], the backing-memory fixture every arena
//! test builds on: a word-aligned owned byte buffer that hands out raw
//! `(lo, hi)` windows, direct byte access for fault injection, and
//! whole-window byte images for no-op-on-failure assertions.

#![deny(rustdoc::broken_intra_doc_links)]
#![allow(missing_docs)]

/// Word-aligned byte buffer standing in for a linker section or static
/// region.
///
/// Storage is `u64`-backed so the window base is always word-aligned,
/// matching how real backing sections are declared. The logical window
/// may still be any byte length — the arenas themselves never assume
/// alignment.
pub struct WindowBuffer {
    words: Vec<u64>,
    len: usize,
}

impl WindowBuffer {
    /// Create a zeroed buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(8)],
            len,
        }
    }

    /// Logical window length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base address of the window.
    pub fn lo(&mut self) -> *mut u8 {
        self.words.as_mut_ptr() as *mut u8
    }

    /// The raw `(lo, hi)` window an arena is constructed over.
    pub fn window(&mut self) -> (*mut u8, *mut u8) {
        let lo = self.lo();
        (lo, unsafe { lo.add(self.len) })
    }

    /// Read the byte at `index` (fault-injection observer side).
    pub fn byte(&self, index: usize) -> u8 {
        assert!(index < self.len);
        unsafe { *(self.words.as_ptr() as *const u8).add(index) }
    }

    /// Overwrite the byte at `index` (fault-injection writer side).
    pub fn set_byte(&mut self, index: usize, value: u8) {
        assert!(index < self.len);
        unsafe { *(self.words.as_mut_ptr() as *mut u8).add(index) = value }
    }

    /// Snapshot of the whole window, for byte-for-byte comparisons.
    pub fn image(&self) -> Vec<u8> {
        let base = self.words.as_ptr() as *const u8;
        (0..self.len).map(|i| unsafe { *base.add(i) }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_the_requested_length() {
        let mut buf = WindowBuffer::new(500);
        let (lo, hi) = buf.window();
        assert_eq!(hi as usize - lo as usize, 500);
        assert_eq!(buf.len(), 500);
    }

    #[test]
    fn base_is_word_aligned() {
        let mut buf = WindowBuffer::new(13);
        assert_eq!(buf.lo() as usize % 8, 0);
    }

    #[test]
    fn bytes_round_trip_and_show_in_the_image() {
        let mut buf = WindowBuffer::new(16);
        buf.set_byte(3, 0x5A);
        buf.set_byte(15, 0xA5);
        assert_eq!(buf.byte(3), 0x5A);
        let image = buf.image();
        assert_eq!(image.len(), 16);
        assert_eq!(image[3], 0x5A);
        assert_eq!(image[15], 0xA5);
    }

    #[test]
    fn images_compare_equal_until_a_write() {
        let mut buf = WindowBuffer::new(32);
        let before = buf.image();
        assert_eq!(buf.image(), before);
        buf.set_byte(0, 1);
        assert_ne!(buf.image(), before);
    }
}
