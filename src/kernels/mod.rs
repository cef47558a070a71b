//! Fill kernels: one public entry point per distribution
//!
//! Every kernel fills its output tensor in place. Shared control flow:
//! validate the output dtype against the kernel's admissible set (before
//! any generator state is consumed — a rejected call leaves the output
//! untouched), resolve the generator, hold its lock for the entire fill,
//! dispatch the runtime dtype to a concrete element type, and drive the
//! iteration engine with a sampler, narrowing each sample to the output
//! type as the last step.

mod normal;
mod simd;

use crate::distributions::{
    Bernoulli, Cauchy, Exponential, Geometric, LogNormal, Normal, Uniform, UniformInt,
    UniformIntFromTo, UniformIntFullRange,
};
use crate::dtype::{DType, DTypeSet, Element};
use crate::error::{Error, Result};
use crate::generator::{default_generator, Generator};
use crate::tensor::{iter, Tensor};
use crate::{dispatch_dtype, dispatch_dtype_and_bool};

/// Resolve an optional generator reference to the process default
#[inline]
fn resolve(gen: Option<&Generator>) -> &Generator {
    gen.unwrap_or_else(|| default_generator())
}

#[inline]
fn check_dtype(dtype: DType, allowed: DTypeSet, op: &'static str) -> Result<()> {
    if allowed.contains(dtype) {
        Ok(())
    } else {
        Err(Error::UnsupportedDType { dtype, op })
    }
}

/// Fill with uniform reals in `[from, to)`
///
/// Floating outputs only. Each element is one double-precision uniform
/// draw rescaled linearly into the interval.
pub fn uniform(out: &mut Tensor, from: f64, to: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::FLOATS, "uniform")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = Uniform::new(from, to);
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
    }, "uniform");
    Ok(())
}

/// Fill with normal samples
///
/// Floating outputs only. Contiguous outputs of 16 or more elements take a
/// bulk Box–Muller path (vectorized for f32); everything else runs the
/// serial double-precision sampler. The bulk paths redraw the final 16
/// elements when the size is not a multiple of 16, so the two paths — and
/// the serial path — consume different draw sequences for the same size.
pub fn normal(out: &mut Tensor, mean: f64, std: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::FLOATS, "normal")?;
    let size = out.numel();
    if size == 0 {
        return Ok(());
    }

    let generator = resolve(gen);

    if out.dtype() == DType::F32 && size >= 16 && out.is_contiguous() {
        let mut engine = generator.lock();
        let ptr = out.storage().ptr() as *mut f32;
        unsafe { normal::fill_vectorize(ptr, size, mean as f32, std as f32, &mut engine) };
        return Ok(());
    }

    let mut engine = generator.lock();
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        if size >= 16 && out.is_contiguous() {
            unsafe { normal::fill_contiguous::<T>(ptr, size, mean, std, &mut engine) };
        } else {
            let mut dist = Normal::new(mean, std);
            unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
        }
    }, "normal");
    Ok(())
}

/// Fill with Cauchy samples (exact inverse CDF)
///
/// Floating outputs only.
pub fn cauchy(out: &mut Tensor, median: f64, sigma: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::FLOATS, "cauchy")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = Cauchy::new(median, sigma);
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
    }, "cauchy");
    Ok(())
}

/// Fill with log-normal samples (exp of a normal draw)
///
/// Floating outputs only.
pub fn log_normal(out: &mut Tensor, mean: f64, std: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::FLOATS, "log_normal")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let mut dist = LogNormal::new(mean, std);
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
    }, "log_normal");
    Ok(())
}

/// Fill with exponential samples (inverse CDF)
///
/// The exponential distribution is continuous, so a non-floating output is
/// a type-domain error.
pub fn exponential(out: &mut Tensor, lambda: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::FLOATS, "exponential")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = Exponential::new(lambda);
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
    }, "exponential");
    Ok(())
}

/// Fill with geometric samples (trials to first success, k >= 1)
///
/// Numeric outputs (floats and integers).
pub fn geometric(out: &mut Tensor, p: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::NUMERIC, "geometric")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = Geometric::new(p);
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_f64(dist.sample(&mut engine))) };
    }, "geometric");
    Ok(())
}

/// Fill with draws over the element type's natural domain
///
/// Integers cover `[0, MAX+1)`, booleans draw one bit, and floating types
/// cover `[0, 2^mantissa_digits]` so every produced value is exactly
/// representable.
pub fn random(out: &mut Tensor, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::NUMERIC_AND_BOOL, "random")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();

    if out.dtype() == DType::Bool {
        let ptr = out.storage().ptr() as *mut u8;
        unsafe { iter::fill_serial(ptr, out.layout(), || (engine.next_u32() & 1) as u8) };
        return Ok(());
    }

    dispatch_dtype!(out.dtype(), T => {
        let dist = UniformInt::new::<T>();
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_i64(dist.sample(&mut engine))) };
    }, "random");
    Ok(())
}

/// Fill with uniform integers in `[base, base + range)`
///
/// All integer, boolean, and floating outputs. The offset draw is bias-free
/// (masked rejection at the range's bit width); `base + range - 1` fitting
/// the output type is the caller's contract.
pub fn random_from_to(
    out: &mut Tensor,
    range: u64,
    base: i64,
    gen: Option<&Generator>,
) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::NUMERIC_AND_BOOL, "random_from_to")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = UniformIntFromTo::new(range, base);
    dispatch_dtype_and_bool!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_i64(dist.sample(&mut engine))) };
    }, "random_from_to");
    Ok(())
}

/// Fill with draws over the full 64-bit domain
///
/// Handles the one interval `(range, base)` cannot express: base =
/// `i64::MIN` with width 2^64. Only i64 and the floating types that can
/// faithfully hold a rounded full-range draw (f64, f32, bf16) are
/// accepted; anything else is a type-domain error rather than a silent
/// truncation.
pub fn random_full_64_bit_range(out: &mut Tensor, gen: Option<&Generator>) -> Result<()> {
    check_dtype(
        out.dtype(),
        DTypeSet::FULL_64_BIT_RANGE,
        "random_full_64_bit_range",
    )?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = UniformIntFullRange;
    dispatch_dtype!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe { iter::fill_serial(ptr, out.layout(), || T::from_i64(dist.sample(&mut engine))) };
    }, "random_full_64_bit_range");
    Ok(())
}

/// Fill with Bernoulli samples at a single probability
///
/// Any numeric or boolean output: each element is `one()` with probability
/// `p` via one double-precision comparison draw.
pub fn bernoulli(out: &mut Tensor, p: f64, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::NUMERIC_AND_BOOL, "bernoulli")?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    let dist = Bernoulli::new(p);
    dispatch_dtype_and_bool!(out.dtype(), T => {
        let ptr = out.storage().ptr() as *mut T;
        unsafe {
            iter::fill_serial(ptr, out.layout(), || {
                if dist.sample(&mut engine) { T::one() } else { T::zero() }
            })
        };
    }, "bernoulli");
    Ok(())
}

/// Fill with Bernoulli samples at per-element probabilities
///
/// The probability tensor (floating dtype, possibly different from the
/// output's) is broadcast-expanded to the output's shape, then both arrays
/// are walked in lockstep: one Bernoulli draw per output element against
/// the aligned probability. Double-precision probabilities compare against
/// a double-precision draw; narrower float probabilities take the
/// single-precision draw path.
pub fn bernoulli_tensor(out: &mut Tensor, p: &Tensor, gen: Option<&Generator>) -> Result<()> {
    check_dtype(out.dtype(), DTypeSet::NUMERIC_AND_BOOL, "bernoulli_tensor")?;
    check_dtype(p.dtype(), DTypeSet::FLOATS, "bernoulli_tensor")?;

    let p_view = p.broadcast_to(out.shape())?;
    if out.numel() == 0 {
        return Ok(());
    }

    let generator = resolve(gen);
    let mut engine = generator.lock();
    dispatch_dtype_and_bool!(out.dtype(), T => {
        let out_ptr = out.storage().ptr() as *mut T;
        if p_view.dtype() == DType::F64 {
            let in_ptr = p_view.storage().ptr() as *const f64;
            unsafe {
                iter::zip_fill_serial(out_ptr, out.layout(), in_ptr, p_view.layout(), |pv: f64| {
                    if Bernoulli::new(pv).sample(&mut engine) { T::one() } else { T::zero() }
                })
            };
        } else {
            dispatch_dtype!(p_view.dtype(), P => {
                let in_ptr = p_view.storage().ptr() as *const P;
                unsafe {
                    iter::zip_fill_serial(out_ptr, out.layout(), in_ptr, p_view.layout(), |pv: P| {
                        if Bernoulli::new(pv.to_f64()).sample_single(&mut engine) {
                            T::one()
                        } else {
                            T::zero()
                        }
                    })
                };
            }, "bernoulli_tensor");
        }
    }, "bernoulli_tensor");
    Ok(())
}
