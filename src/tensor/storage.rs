//! Storage: CPU memory management with Arc-based sharing

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::alloc;
use std::sync::Arc;

/// Storage for tensor data
///
/// Storage wraps a heap buffer with reference counting, enabling zero-copy
/// views (transpose, broadcast) that share the underlying buffer. Memory is
/// deallocated when the last reference is dropped.
///
/// The pointer is kept as a `u64` so Storage stays `Send + Sync`; all typed
/// access goes through the kernels, which own the aliasing discipline.
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    /// Buffer address (0 for empty storage)
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
}

impl Storage {
    /// Create new storage with zero-initialized memory
    ///
    /// Allocates `len` elements of type `dtype`.
    pub fn new(len: usize, dtype: DType) -> Result<Self> {
        let size_bytes = len * dtype.size_in_bytes();
        let ptr = if size_bytes == 0 {
            0u64
        } else {
            let layout = alloc_layout(size_bytes, dtype);
            // Safety: layout has non-zero size
            let p = unsafe { alloc::alloc_zeroed(layout) };
            if p.is_null() {
                return Err(Error::OutOfMemory { size: size_bytes });
            }
            p as u64
        };

        Ok(Self {
            inner: Arc::new(StorageInner { ptr, len, dtype }),
        })
    }

    /// Create storage by copying a slice; dtype is inferred from the
    /// Element type.
    pub fn from_slice<T: Element>(data: &[T]) -> Result<Self> {
        let storage = Self::new(data.len(), T::DTYPE)?;
        if !data.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(data);
            // Safety: the fresh allocation is exactly bytes.len() long
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), storage.ptr() as *mut u8, bytes.len());
            }
        }
        Ok(storage)
    }

    /// Get the raw buffer address
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Copy the whole buffer out as a typed vector
    ///
    /// `T` must be the buffer's element type.
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Vec<T> {
        debug_assert_eq!(std::mem::size_of::<T>(), self.inner.dtype.size_in_bytes());
        let mut result = vec![T::zeroed(); self.inner.len];
        if self.inner.len > 0 {
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
            // Safety: buffer holds exactly len elements of this dtype
            unsafe {
                std::ptr::copy_nonoverlapping(self.inner.ptr as *const u8, bytes.as_mut_ptr(), bytes.len());
            }
        }
        result
    }

    /// Copy the whole buffer out as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let size_bytes = self.inner.len * self.inner.dtype.size_in_bytes();
        let mut result = vec![0u8; size_bytes];
        if size_bytes > 0 {
            // Safety: buffer is exactly size_bytes long
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.inner.ptr as *const u8,
                    result.as_mut_ptr(),
                    size_bytes,
                );
            }
        }
        result
    }
}

impl Clone for Storage {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for StorageInner {
    fn drop(&mut self) {
        if self.ptr != 0 {
            let size_bytes = self.len * self.dtype.size_in_bytes();
            let layout = alloc_layout(size_bytes, self.dtype);
            // Safety: ptr was allocated with this exact layout
            unsafe { alloc::dealloc(self.ptr as *mut u8, layout) };
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

fn alloc_layout(size_bytes: usize, dtype: DType) -> alloc::Layout {
    // Element sizes are powers of two, so the element size is the alignment
    alloc::Layout::from_size_align(size_bytes, dtype.size_in_bytes())
        .expect("invalid storage layout")
}
