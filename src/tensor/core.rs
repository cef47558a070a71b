//! Core Tensor type

use super::{Layout, Storage};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};

/// Dense N-dimensional array, mutated in place by the fill kernels
///
/// `Tensor` consists of:
/// - **Storage**: reference-counted buffer of a single runtime-tagged dtype
/// - **Layout**: shape, strides, and offset defining the view into storage
///
/// Views (`transpose`, `broadcast_to`) share storage zero-copy through
/// modified layouts, so a fill through a view writes the viewed elements of
/// the original buffer.
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    layout: Layout,
}

impl Tensor {
    /// Create a tensor from a slice of data
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_slice(data)?,
            layout: Layout::contiguous(shape),
        })
    }

    /// Create a zero-initialized tensor
    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Self> {
        let len: usize = shape.iter().product();
        Ok(Self {
            storage: Storage::new(len, dtype)?,
            layout: Layout::contiguous(shape),
        })
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Total number of elements in the view
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Check if the view is contiguous (row-major, offset 0)
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Create a transposed view (zero-copy, shares storage)
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Result<Self> {
        let layout = self
            .layout
            .transpose(dim0, dim1)
            .ok_or_else(|| Error::shape_mismatch(self.shape(), self.shape()))?;
        Ok(Self {
            storage: self.storage.clone(),
            layout,
        })
    }

    /// Create a broadcast view with the target shape (zero-copy)
    ///
    /// This is the broadcast-expansion step used to reconcile a probability
    /// tensor to an output's shape before a lockstep walk.
    pub fn broadcast_to(&self, target: &[usize]) -> Result<Self> {
        let layout = self
            .layout
            .broadcast_to(target)
            .ok_or_else(|| Error::broadcast(self.shape(), target))?;
        Ok(Self {
            storage: self.storage.clone(),
            layout,
        })
    }

    /// Copy the underlying buffer out as a typed vector
    ///
    /// Copies the raw storage in buffer order, not view order; callers
    /// reading through a strided view should index via the layout.
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.storage.to_vec()
    }

    /// Copy the underlying buffer out as raw bytes
    ///
    /// Useful for bit-exact comparisons across dtypes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.storage.to_bytes()
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("dtype", &self.dtype())
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(t.shape(), &[2, 2]);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.numel(), 4);
        assert!(t.is_contiguous());
    }

    #[test]
    fn test_from_slice_shape_mismatch() {
        let err = Tensor::from_slice(&[1.0f32, 2.0], &[3]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(&[3, 3], DType::I32).unwrap();
        assert_eq!(t.to_vec::<i32>(), vec![0; 9]);
    }

    #[test]
    fn test_transpose_view() {
        let t = Tensor::zeros(&[2, 3], DType::F64).unwrap();
        let v = t.transpose(0, 1).unwrap();
        assert_eq!(v.shape(), &[3, 2]);
        assert!(!v.is_contiguous());
        assert_eq!(v.storage().ptr(), t.storage().ptr());
    }

    #[test]
    fn test_broadcast_view() {
        let p = Tensor::from_slice(&[0.5f64], &[1]).unwrap();
        let v = p.broadcast_to(&[4, 4]).unwrap();
        assert_eq!(v.shape(), &[4, 4]);
        assert_eq!(v.numel(), 16);
    }
}
