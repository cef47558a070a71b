//! SIMD support for the vectorized normal path
//!
//! Runtime AVX2+FMA detection plus the vector math the 8-lane Box–Muller
//! block needs: natural log, sine, and cosine for f32. The approximations
//! use exponent extraction (log) and quadrant folding (sin/cos) with
//! polynomial cores; relative error is below 1e-6 over the ranges the
//! normal block feeds them (`u1` in (0, 1], `theta` in [0, 2pi)).

use std::sync::OnceLock;

/// Whether this host runs the 8-lane vector block
///
/// Detection is cached; the first call probes CPUID, later calls are a
/// load. Hosts without AVX2+FMA (including every non-x86_64 target) take
/// the scalar 16-element block instead.
pub(crate) fn has_avx2_fma() -> bool {
    static LEVEL: OnceLock<bool> = OnceLock::new();
    *LEVEL.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use std::arch::x86_64::*;

    const EXP_BIAS: i32 = 127;
    const MANTISSA_MASK: i32 = 0x007F_FFFF;
    const EXP_ZERO: i32 = 0x3F80_0000;

    // log(1+f) polynomial over f in [-0.2929, 0.4142]
    const LOG_C1: f32 = 0.9999999995;
    const LOG_C2: f32 = -0.4999999206;
    const LOG_C3: f32 = 0.3333320848;
    const LOG_C4: f32 = -0.2500097652;
    const LOG_C5: f32 = 0.1999796621;
    const LOG_C6: f32 = -0.1666316004;
    const LOG_C7: f32 = 0.1428962594;

    /// Vector natural log for positive normal f32 inputs
    ///
    /// Splits x into 2^n * m with m in [1, 2), renormalizes m above
    /// sqrt(2), and evaluates log(1 + f) by Horner polynomial, so small
    /// inputs (large negative logs) stay exact through the exponent term.
    ///
    /// # Safety
    /// Requires AVX2 and FMA CPU features.
    #[target_feature(enable = "avx2", enable = "fma")]
    pub unsafe fn ln_f32(x: __m256) -> __m256 {
        let one = _mm256_set1_ps(1.0);
        let half = _mm256_set1_ps(0.5);
        let ln2 = _mm256_set1_ps(std::f32::consts::LN_2);
        let sqrt2 = _mm256_set1_ps(std::f32::consts::SQRT_2);

        let x_bits = _mm256_castps_si256(x);
        let exp_raw = _mm256_srli_epi32::<23>(x_bits);
        let exp_unbiased = _mm256_sub_epi32(exp_raw, _mm256_set1_epi32(EXP_BIAS));
        let mut n = _mm256_cvtepi32_ps(exp_unbiased);

        let m_bits = _mm256_or_si256(
            _mm256_and_si256(x_bits, _mm256_set1_epi32(MANTISSA_MASK)),
            _mm256_set1_epi32(EXP_ZERO),
        );
        let mut m = _mm256_castsi256_ps(m_bits);

        // Keep f = m - 1 in [-0.2929, 0.4142] for polynomial accuracy
        let adjust = _mm256_cmp_ps::<_CMP_GT_OQ>(m, sqrt2);
        m = _mm256_blendv_ps(m, _mm256_mul_ps(m, half), adjust);
        n = _mm256_blendv_ps(n, _mm256_add_ps(n, one), adjust);

        let f = _mm256_sub_ps(m, one);

        let mut poly = _mm256_set1_ps(LOG_C7);
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C6));
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C5));
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C4));
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C3));
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C2));
        poly = _mm256_fmadd_ps(poly, f, _mm256_set1_ps(LOG_C1));
        poly = _mm256_mul_ps(poly, f);

        _mm256_fmadd_ps(n, ln2, poly)
    }

    /// Vector sine via pi/2 range reduction and quadrant folding
    ///
    /// # Safety
    /// Requires AVX2 and FMA CPU features.
    #[target_feature(enable = "avx2", enable = "fma")]
    pub unsafe fn sin_f32(x: __m256) -> __m256 {
        let two_over_pi = _mm256_set1_ps(std::f32::consts::FRAC_2_PI);
        let pi_over_2 = _mm256_set1_ps(std::f32::consts::FRAC_PI_2);

        let j = _mm256_round_ps::<{ _MM_FROUND_TO_NEAREST_INT | _MM_FROUND_NO_EXC }>(
            _mm256_mul_ps(x, two_over_pi),
        );
        let j_int = _mm256_cvtps_epi32(j);
        let y = _mm256_fnmadd_ps(j, pi_over_2, x);

        let y2 = _mm256_mul_ps(y, y);

        // sin(y) = y - y^3/6 + y^5/120 - y^7/5040
        let mut sin_y = _mm256_set1_ps(-1.0 / 5040.0);
        sin_y = _mm256_fmadd_ps(sin_y, y2, _mm256_set1_ps(1.0 / 120.0));
        sin_y = _mm256_fmadd_ps(sin_y, y2, _mm256_set1_ps(-1.0 / 6.0));
        sin_y = _mm256_fmadd_ps(sin_y, y2, _mm256_set1_ps(1.0));
        sin_y = _mm256_mul_ps(sin_y, y);

        // cos(y) = 1 - y^2/2 + y^4/24 - y^6/720
        let mut cos_y = _mm256_set1_ps(-1.0 / 720.0);
        cos_y = _mm256_fmadd_ps(cos_y, y2, _mm256_set1_ps(1.0 / 24.0));
        cos_y = _mm256_fmadd_ps(cos_y, y2, _mm256_set1_ps(-0.5));
        cos_y = _mm256_fmadd_ps(cos_y, y2, _mm256_set1_ps(1.0));

        // Quadrant: j mod 4 = 0 -> sin, 1 -> cos, 2 -> -sin, 3 -> -cos
        let use_cos = _mm256_castsi256_ps(_mm256_cmpeq_epi32(
            _mm256_and_si256(j_int, _mm256_set1_epi32(1)),
            _mm256_set1_epi32(1),
        ));
        let negate = _mm256_castsi256_ps(_mm256_cmpeq_epi32(
            _mm256_and_si256(j_int, _mm256_set1_epi32(2)),
            _mm256_set1_epi32(2),
        ));

        let result = _mm256_blendv_ps(sin_y, cos_y, use_cos);
        let negated = _mm256_xor_ps(result, _mm256_set1_ps(-0.0));
        _mm256_blendv_ps(result, negated, negate)
    }

    /// Vector cosine: cos(x) = sin(x + pi/2)
    ///
    /// # Safety
    /// Requires AVX2 and FMA CPU features.
    #[target_feature(enable = "avx2", enable = "fma")]
    pub unsafe fn cos_f32(x: __m256) -> __m256 {
        sin_f32(_mm256_add_ps(x, _mm256_set1_ps(std::f32::consts::FRAC_PI_2)))
    }

    /// Transform one block of 16 uniforms into 16 normal samples, in place
    ///
    /// Lanes compute the same formula as the scalar 16-element block: the
    /// first 8 slots carry `u1`, the next 8 carry `u2`;
    /// `radius = sqrt(-2 ln(1 - u1))`, `theta = 2 pi u2`, cosine branch
    /// into the first half and sine branch into the second.
    ///
    /// # Safety
    /// - Requires AVX2 and FMA CPU features
    /// - `data` must be valid for 16 f32 reads and writes
    #[target_feature(enable = "avx2", enable = "fma")]
    pub unsafe fn normal_block_16(data: *mut f32, mean: f32, std: f32) {
        let one = _mm256_set1_ps(1.0);
        let minus_two = _mm256_set1_ps(-2.0);
        let two_pi = _mm256_set1_ps(std::f32::consts::TAU);
        let mean_v = _mm256_set1_ps(mean);
        let std_v = _mm256_set1_ps(std);

        let u1 = _mm256_sub_ps(one, _mm256_loadu_ps(data));
        let u2 = _mm256_loadu_ps(data.add(8));

        let radius = _mm256_sqrt_ps(_mm256_mul_ps(minus_two, ln_f32(u1)));
        let theta = _mm256_mul_ps(two_pi, u2);

        let first = _mm256_fmadd_ps(_mm256_mul_ps(radius, cos_f32(theta)), std_v, mean_v);
        let second = _mm256_fmadd_ps(_mm256_mul_ps(radius, sin_f32(theta)), std_v, mean_v);

        _mm256_storeu_ps(data, first);
        _mm256_storeu_ps(data.add(8), second);
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) use avx2::normal_block_16;
