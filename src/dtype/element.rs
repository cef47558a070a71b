//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to tenrand's runtime dtype system.
/// It's implemented for all primitive numeric types (and for `half::f16` /
/// `half::bf16` behind the "f16" feature).
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
///
/// Note: `bool` does not implement `Pod`, so it has no `Element` impl.
/// Boolean tensors use `u8` internally (values 0/1).
pub trait Element: Copy + Send + Sync + Pod + Zeroable + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Number of values an unbounded integer draw produces for this type.
    ///
    /// Integers span their natural domain `[0, MAX+1)`; floating types span
    /// `[0, 2^mantissa_digits]` so every drawn value is exactly
    /// representable. `0` encodes the full 64-bit domain (2^64 values).
    const NATIVE_RANGE: u64;

    /// Mantissa digits used for type-width uniform draws.
    ///
    /// Only meaningful for floating types; integer types carry 0 and never
    /// reach the code paths that read this.
    const MANTISSA_DIGITS: u32;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type (standard `as`-cast narrowing)
    fn from_f64(v: f64) -> Self;

    /// Convert from a 64-bit integer draw to this type.
    ///
    /// Integer targets truncate like a C cast; floating targets round to
    /// nearest. This path exists so wide integer draws never lose precision
    /// through an f64 intermediate.
    fn from_i64(v: i64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
    const NATIVE_RANGE: u64 = (1u64 << 53) + 1;
    const MANTISSA_DIGITS: u32 = 53;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as f64
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
    const NATIVE_RANGE: u64 = (1u64 << 24) + 1;
    const MANTISSA_DIGITS: u32 = 24;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as f32
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;
    const NATIVE_RANGE: u64 = 0;
    const MANTISSA_DIGITS: u32 = 0;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as i64
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        v
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn one() -> Self {
        1
    }
}

macro_rules! impl_element_int {
    ($ty:ty, $dtype:expr, $range:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;
            const NATIVE_RANGE: u64 = $range;
            const MANTISSA_DIGITS: u32 = 0;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            #[inline]
            fn from_i64(v: i64) -> Self {
                v as $ty
            }

            #[inline]
            fn zero() -> Self {
                0
            }

            #[inline]
            fn one() -> Self {
                1
            }
        }
    };
}

impl_element_int!(i32, DType::I32, 1u64 << 31);
impl_element_int!(i16, DType::I16, 1u64 << 15);
impl_element_int!(i8, DType::I8, 1u64 << 7);
impl_element_int!(u64, DType::U64, 0);
impl_element_int!(u32, DType::U32, 1u64 << 32);
impl_element_int!(u16, DType::U16, 1u64 << 16);
impl_element_int!(u8, DType::U8, 1u64 << 8);

// ============================================================================
// Half-precision floating point types (requires "f16" feature)
// ============================================================================

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;
    const NATIVE_RANGE: u64 = (1u64 << 11) + 1;
    const MANTISSA_DIGITS: u32 = 11;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        half::f16::from_f64(v as f64)
    }

    #[inline]
    fn zero() -> Self {
        half::f16::ZERO
    }

    #[inline]
    fn one() -> Self {
        half::f16::ONE
    }
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;
    const NATIVE_RANGE: u64 = (1u64 << 8) + 1;
    const MANTISSA_DIGITS: u32 = 8;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        half::bf16::from_f64(v as f64)
    }

    #[inline]
    fn zero() -> Self {
        half::bf16::ZERO
    }

    #[inline]
    fn one() -> Self {
        half::bf16::ONE
    }
}
