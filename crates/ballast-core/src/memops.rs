//! Overlap-tolerant byte copies.
//!
//! Compaction slides payloads within a single window, so source and
//! destination ranges routinely overlap — in either direction. [`copy`]
//! picks its traversal direction from the address order of the two
//! ranges so a byte is always read before anything overwrites it.
//! [`copy_inverted`] is the same discipline for the bit-inverted image
//! the mirrored arena maintains, and [`mirror_mismatches`] counts how
//! far two ranges have drifted from that relationship.

/// Copy `len` bytes from `src` to `dst`, tolerating overlap.
///
/// When `dst >= src` the ranges are walked high-to-low, otherwise
/// low-to-high.
///
/// # Safety
///
/// `src` must be valid for reads of `len` bytes and `dst` must be valid
/// for writes of `len` bytes. The two ranges may overlap arbitrarily.
pub unsafe fn copy(dst: *mut u8, src: *const u8, len: usize) {
    if (dst as usize) >= (src as usize) {
        let mut i = len;
        while i > 0 {
            i -= 1;
            *dst.add(i) = *src.add(i);
        }
    } else {
        for i in 0..len {
            *dst.add(i) = *src.add(i);
        }
    }
}

/// Copy `len` bytes from `src` to `dst`, writing the bitwise complement
/// of every byte.
///
/// Traversal direction is the opposite of [`copy`]'s for the same
/// address order, matching the mirror refresh in the original layout
/// where the shadow half always sits above the primary half.
///
/// # Safety
///
/// `src` must be valid for reads of `len` bytes and `dst` must be valid
/// for writes of `len` bytes. The two ranges may overlap arbitrarily,
/// although the mirrored arena only ever passes disjoint halves.
pub unsafe fn copy_inverted(dst: *mut u8, src: *const u8, len: usize) {
    if (dst as usize) >= (src as usize) {
        for i in 0..len {
            *dst.add(i) = !*src.add(i);
        }
    } else {
        let mut i = len;
        while i > 0 {
            i -= 1;
            *dst.add(i) = !*src.add(i);
        }
    }
}

/// Count positions where `a[i] != !b[i]`.
///
/// Zero means `b` is an exact bit-inverted image of `a`. Useful as a
/// diagnostic when a consistency check reports damage: the count tells
/// the caller how localized the divergence is.
///
/// # Safety
///
/// Both `a` and `b` must be valid for reads of `len` bytes.
pub unsafe fn mirror_mismatches(a: *const u8, b: *const u8, len: usize) -> usize {
    let mut mismatches = 0;
    for i in 0..len {
        if *a.add(i) != !*b.add(i) {
            mismatches += 1;
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_disjoint_ranges() {
        let src = [1u8, 2, 3, 4, 5];
        let mut dst = [0u8; 5];
        unsafe { copy(dst.as_mut_ptr(), src.as_ptr(), 5) };
        assert_eq!(dst, src);
    }

    #[test]
    fn copy_zero_len_is_noop() {
        let src = [1u8, 2, 3];
        let mut dst = [9u8; 3];
        unsafe { copy(dst.as_mut_ptr(), src.as_ptr(), 0) };
        assert_eq!(dst, [9, 9, 9]);
    }

    #[test]
    fn copy_overlapping_rightward() {
        // Slide [0..5) right by 2 within one buffer: dst > src.
        let mut buf = [1u8, 2, 3, 4, 5, 0, 0];
        unsafe {
            let p = buf.as_mut_ptr();
            copy(p.add(2), p, 5);
        }
        assert_eq!(&buf[2..7], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn copy_overlapping_leftward() {
        // Slide [2..7) left by 2 within one buffer: dst < src.
        let mut buf = [0u8, 0, 1, 2, 3, 4, 5];
        unsafe {
            let p = buf.as_mut_ptr();
            copy(p, p.add(2), 5);
        }
        assert_eq!(&buf[0..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn copy_inverted_writes_complement() {
        let src = [0x00u8, 0xFF, 0x5A, 0xA5];
        let mut dst = [0u8; 4];
        unsafe { copy_inverted(dst.as_mut_ptr(), src.as_ptr(), 4) };
        assert_eq!(dst, [0xFF, 0x00, 0xA5, 0x5A]);
    }

    #[test]
    fn copy_inverted_twice_restores_original() {
        let src = [7u8, 13, 42, 0, 255];
        let mut mid = [0u8; 5];
        let mut out = [0u8; 5];
        unsafe {
            copy_inverted(mid.as_mut_ptr(), src.as_ptr(), 5);
            copy_inverted(out.as_mut_ptr(), mid.as_ptr(), 5);
        }
        assert_eq!(out, src);
    }

    #[test]
    fn mirror_mismatches_zero_for_exact_mirror() {
        let a = [1u8, 2, 3, 4];
        let b = [!1u8, !2, !3, !4];
        let n = unsafe { mirror_mismatches(a.as_ptr(), b.as_ptr(), 4) };
        assert_eq!(n, 0);
    }

    #[test]
    fn mirror_mismatches_counts_each_divergent_byte() {
        let a = [1u8, 2, 3, 4];
        let mut b = [!1u8, !2, !3, !4];
        b[1] = 0x11;
        b[3] = 0x22;
        let n = unsafe { mirror_mismatches(a.as_ptr(), b.as_ptr(), 4) };
        assert_eq!(n, 2);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn copy_matches_slice_copy(data in prop::collection::vec(any::<u8>(), 0..256)) {
                let mut dst = vec![0u8; data.len()];
                unsafe { copy(dst.as_mut_ptr(), data.as_ptr(), data.len()) };
                prop_assert_eq!(dst, data);
            }

            #[test]
            fn overlapping_slide_preserves_bytes(
                data in prop::collection::vec(any::<u8>(), 1..128),
                shift in 1usize..16,
            ) {
                // Rightward slide by `shift` must behave like memmove.
                let len = data.len();
                let mut buf = data.clone();
                buf.resize(len + shift, 0);
                unsafe {
                    let p = buf.as_mut_ptr();
                    copy(p.add(shift), p, len);
                }
                prop_assert_eq!(&buf[shift..shift + len], &data[..]);
            }

            #[test]
            fn inverted_copy_round_trips(data in prop::collection::vec(any::<u8>(), 0..256)) {
                let mut mid = vec![0u8; data.len()];
                let mut out = vec![0u8; data.len()];
                unsafe {
                    copy_inverted(mid.as_mut_ptr(), data.as_ptr(), data.len());
                    copy_inverted(out.as_mut_ptr(), mid.as_ptr(), data.len());
                    prop_assert_eq!(mirror_mismatches(data.as_ptr(), mid.as_ptr(), data.len()), 0);
                }
                prop_assert_eq!(out, data);
            }
        }
    }
}
