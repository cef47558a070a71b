//! # tenrand
//!
//! **In-place pseudorandom fill kernels for dense numeric tensors.**
//!
//! tenrand fills tensors with samples from uniform, normal, log-normal,
//! Cauchy, exponential, geometric, Bernoulli, and bounded/unbounded integer
//! distributions — for a dozen storage types from one set of canonical
//! double-precision algorithms.
//!
//! ## Why tenrand?
//!
//! - **One algorithm, many dtypes**: samplers compute in f64 and narrow to
//!   the output element type as the last step (f64, f32, f16, bf16, all
//!   integer widths, bool)
//! - **Fast common case**: contiguous f32 normal fills take an 8-lane
//!   vectorized Box–Muller path with a scalar fallback that computes the
//!   same formula
//! - **Race-free sharing**: a fill call holds its generator's lock for the
//!   whole call, so concurrent fills against one generator linearize
//! - **Deterministic**: a fill's output is a pure function of the
//!   generator's pre-call state, per code path
//!
//! ## Quick Start
//!
//! ```rust
//! use tenrand::prelude::*;
//!
//! let gen = Generator::from_seed(42);
//! let mut t = Tensor::zeros(&[4, 256], DType::F32)?;
//!
//! kernels::uniform(&mut t, 0.0, 1.0, Some(&gen))?;
//! kernels::normal(&mut t, 0.0, 1.0, Some(&gen))?;
//! # Ok::<(), tenrand::error::Error>(())
//! ```
//!
//! Passing `None` for the generator uses a process-wide, entropy-seeded
//! default.
//!
//! ## Feature Flags
//!
//! - `f16` (default): half-precision element types (F16, BF16) via `half`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distributions;
pub mod dtype;
pub mod error;
pub mod generator;
pub mod kernels;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, DTypeSet, Element};
    pub use crate::error::{Error, Result};
    pub use crate::generator::{default_generator, Generator};
    pub use crate::kernels;
    pub use crate::tensor::Tensor;
}
