//! Bulk normal fill paths
//!
//! Contiguous outputs of at least 16 elements are filled with uniforms
//! first and then transformed in place, 16 elements at a time, by the
//! Box–Muller formula. Single-precision outputs additionally take an
//! 8-lane vector block when the host supports it.

#[cfg(target_arch = "x86_64")]
use super::simd;

use crate::dtype::Element;
use crate::generator::Engine;

/// Transform one block of 16 stored uniforms into normal samples
///
/// Positions 0..8 carry `u1` sources, positions 8..16 carry `u2` sources.
/// `u1` is remapped from `[0, 1)` to `(0, 1]` so the logarithm never
/// receives 0; the cosine branch lands in the low half and the sine branch
/// in the high half.
pub(crate) fn fill_16<T: Element>(block: &mut [T], mean: f64, std: f64) {
    debug_assert_eq!(block.len(), 16);
    for j in 0..8 {
        let u1 = 1.0 - block[j].to_f64();
        let u2 = block[j + 8].to_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        block[j] = T::from_f64(radius * theta.cos() * std + mean);
        block[j + 8] = T::from_f64(radius * theta.sin() * std + mean);
    }
}

/// Contiguous normal fill for any float element type
///
/// First pass stores one type-width uniform per element (drawn while the
/// caller holds the generator lock); second pass transforms whole blocks
/// of 16. When the size is not a multiple of 16, a fresh block of 16
/// uniforms is drawn at `size - 16` and re-transformed, overwriting up to
/// 15 already-written values. The recompute keeps the hot loop branch-free
/// and is part of the draw-count contract; do not "fix" it.
///
/// # Safety
/// - `data` must be valid for `size` elements, `size >= 16`
pub(crate) unsafe fn fill_contiguous<T: Element>(
    data: *mut T,
    size: usize,
    mean: f64,
    std: f64,
    engine: &mut Engine,
) {
    debug_assert!(size >= 16);
    let out = std::slice::from_raw_parts_mut(data, size);

    for elem in out.iter_mut() {
        *elem = T::from_f64(engine.uniform_mantissa(T::MANTISSA_DIGITS));
    }

    let mut i = 0;
    while i + 16 <= size {
        fill_16(&mut out[i..i + 16], mean, std);
        i += 16;
    }

    if size % 16 != 0 {
        // Recompute the last 16 values.
        let tail = &mut out[size - 16..];
        for elem in tail.iter_mut() {
            *elem = T::from_f64(engine.uniform_mantissa(T::MANTISSA_DIGITS));
        }
        fill_16(tail, mean, std);
    }
}

/// Contiguous normal fill for f32 with the vector block
///
/// Same structure as [`fill_contiguous`], but uniforms are single-precision
/// draws and each 16-element block goes through the 8-lane AVX2 transform
/// when available. Hosts without an 8-lane vector unit run the scalar block
/// instead; the tail recompute policy is identical.
///
/// # Safety
/// - `data` must be valid for `size` elements, `size >= 16`
pub(crate) unsafe fn fill_vectorize(
    data: *mut f32,
    size: usize,
    mean: f32,
    std: f32,
    engine: &mut Engine,
) {
    debug_assert!(size >= 16);

    {
        let out = std::slice::from_raw_parts_mut(data, size);
        for elem in out.iter_mut() {
            *elem = engine.uniform_f32();
        }
    }

    #[cfg(target_arch = "x86_64")]
    let vector = simd::has_avx2_fma();

    let mut i = 0;
    while i + 16 <= size {
        #[cfg(target_arch = "x86_64")]
        if vector {
            simd::normal_block_16(data.add(i), mean, std);
            i += 16;
            continue;
        }

        fill_16(
            std::slice::from_raw_parts_mut(data.add(i), 16),
            mean as f64,
            std as f64,
        );
        i += 16;
    }

    if size % 16 != 0 {
        // Recompute the last 16 values.
        let tail = data.add(size - 16);
        {
            let t = std::slice::from_raw_parts_mut(tail, 16);
            for elem in t.iter_mut() {
                *elem = engine.uniform_f32();
            }
        }

        #[cfg(target_arch = "x86_64")]
        if vector {
            simd::normal_block_16(tail, mean, std);
            return;
        }

        fill_16(
            std::slice::from_raw_parts_mut(tail, 16),
            mean as f64,
            std as f64,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_16_is_standard_normal_shape() {
        // Uniform inputs at fixed positions give finite, deterministic output
        let mut block: Vec<f64> = (0..16).map(|i| i as f64 / 16.0).collect();
        fill_16(&mut block, 0.0, 1.0);
        assert!(block.iter().all(|v| v.is_finite()));

        let mut again: Vec<f64> = (0..16).map(|i| i as f64 / 16.0).collect();
        fill_16(&mut again, 0.0, 1.0);
        assert_eq!(block, again);
    }

    #[test]
    fn test_fill_16_mean_std_applied() {
        let mut a: Vec<f64> = (0..16).map(|i| i as f64 / 16.0).collect();
        let mut b = a.clone();
        fill_16(&mut a, 0.0, 1.0);
        fill_16(&mut b, 10.0, 2.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((y - (x * 2.0 + 10.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fill_contiguous_exact_multiple() {
        let mut buf = vec![0.0f64; 64];
        let mut engine = Engine::from_seed(21);
        unsafe { fill_contiguous(buf.as_mut_ptr(), 64, 0.0, 1.0, &mut engine) };
        assert!(buf.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_fill_contiguous_tail_consumes_extra_block() {
        // size 17 draws 17 + 16 uniforms; the engine afterwards must sit
        // exactly 33 draws in.
        let mut buf = vec![0.0f64; 17];
        let mut engine = Engine::from_seed(33);
        unsafe { fill_contiguous(buf.as_mut_ptr(), 17, 0.0, 1.0, &mut engine) };
        assert!(buf.iter().all(|v| v.is_finite()));

        let mut reference = Engine::from_seed(33);
        for _ in 0..33 {
            reference.next_u64();
        }
        assert_eq!(engine.next_u64(), reference.next_u64());
    }

    #[test]
    fn test_fill_vectorize_finite_and_deterministic() {
        for &size in &[16usize, 17, 31, 32, 100] {
            let mut a = vec![0.0f32; size];
            let mut b = vec![0.0f32; size];
            let mut ea = Engine::from_seed(77);
            let mut eb = Engine::from_seed(77);
            unsafe {
                fill_vectorize(a.as_mut_ptr(), size, 0.0, 1.0, &mut ea);
                fill_vectorize(b.as_mut_ptr(), size, 0.0, 1.0, &mut eb);
            }
            assert!(a.iter().all(|v| v.is_finite()), "size {}", size);
            assert_eq!(a, b, "size {}", size);
        }
    }

    #[test]
    fn test_vectorize_statistics() {
        let n = 100_000;
        let mut buf = vec![0.0f32; n];
        let mut engine = Engine::from_seed(5);
        unsafe { fill_vectorize(buf.as_mut_ptr(), n, 0.0, 1.0, &mut engine) };

        let mean: f64 = buf.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let var: f64 = buf.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02, "mean = {}", mean);
        assert!((var - 1.0).abs() < 0.05, "var = {}", var);
    }
}
