//! `dst[i] += src[i]` over `u8` lanes, SIMD-accelerated where available.
//!
//! Dispatch follows the same `#[cfg(target_arch = "...")]`-gated intrinsics-with-scalar-fallback
//! shape used elsewhere for per-architecture byte processing: SSE2 on `x86_64`, NEON on
//! `aarch64`, plain scalar everywhere else. Callers (see [`crate::kernel`]) guarantee at most 64
//! accumulations between flushes of the byte accumulator into the 16-bit score buffer, so every
//! lane stays within `0..=255` regardless of which path executes; the two paths must therefore
//! always agree bit-for-bit (`SPEC_FULL.md` §8, property 3).

/// Add `src` into `dst` lane-wise. `dst` and `src` must have equal length.
pub fn byte_add(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse2") {
            // SAFETY: checked `sse2` support above; `byte_add_sse2` only requires `dst`/`src` to
            // have equal length, which the caller guarantees and we just asserted.
            unsafe { byte_add_sse2(dst, src) };
            return;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: NEON is part of the aarch64 baseline ABI, no runtime detection needed.
        unsafe { byte_add_neon(dst, src) };
        return;
    }

    #[allow(unreachable_code)]
    byte_add_scalar(dst, src);
}

fn byte_add_scalar(dst: &mut [u8], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = d.wrapping_add(s);
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn byte_add_sse2(dst: &mut [u8], src: &[u8]) {
    use std::arch::x86_64::{_mm_add_epi8, _mm_loadu_si128, _mm_storeu_si128};

    let len = dst.len();
    let chunks = len / 16;

    for i in 0..chunks {
        let offset = i * 16;
        let d = _mm_loadu_si128(dst.as_ptr().add(offset) as *const _);
        let s = _mm_loadu_si128(src.as_ptr().add(offset) as *const _);
        let sum = _mm_add_epi8(d, s);
        _mm_storeu_si128(dst.as_mut_ptr().add(offset) as *mut _, sum);
    }

    byte_add_scalar(&mut dst[chunks * 16..], &src[chunks * 16..]);
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn byte_add_neon(dst: &mut [u8], src: &[u8]) {
    use std::arch::aarch64::{vaddq_u8, vld1q_u8, vst1q_u8};

    let len = dst.len();
    let chunks = len / 16;

    for i in 0..chunks {
        let offset = i * 16;
        let d = vld1q_u8(dst.as_ptr().add(offset));
        let s = vld1q_u8(src.as_ptr().add(offset));
        let sum = vaddq_u8(d, s);
        vst1q_u8(dst.as_mut_ptr().add(offset), sum);
    }

    byte_add_scalar(&mut dst[chunks * 16..], &src[chunks * 16..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_scalar_reference_for_arbitrary_lengths() {
        for len in [0usize, 1, 3, 15, 16, 17, 31, 32, 100, 257] {
            let src: Vec<u8> = (0..len).map(|i| (i % 5) as u8).collect();
            let mut dst_simd: Vec<u8> = (0..len).map(|i| (i % 3) as u8).collect();
            let mut dst_scalar = dst_simd.clone();

            byte_add(&mut dst_simd, &src);
            byte_add_scalar(&mut dst_scalar, &src);

            assert_eq!(dst_simd, dst_scalar, "mismatch at len={len}");
        }
    }

    #[test]
    fn wraps_like_a_byte_add_would_if_overdriven() {
        let mut dst = vec![250u8; 20];
        let src = vec![10u8; 20];
        byte_add(&mut dst, &src);
        assert_eq!(dst, vec![4u8; 20]);
    }
}
