//! Element-wise iteration engine
//!
//! Serial walkers that visit every element of a (possibly strided) view in
//! logical row-major order, writing each output element exactly once per
//! call. The fill kernels drive these with a sampler closure.

use super::Layout;
use crate::dtype::Element;
use smallvec::SmallVec;

/// Invoke `f` once per element of the view and store the result
///
/// Elements are visited in logical row-major order, so the sequence of `f`
/// invocations (and therefore of generator draws) is a pure function of the
/// view's shape, independent of its strides.
///
/// # Safety
/// - `ptr` must point to storage valid for every offset the layout reaches
pub unsafe fn fill_serial<T: Element>(ptr: *mut T, layout: &Layout, mut f: impl FnMut() -> T) {
    let total = layout.elem_count();
    if total == 0 {
        return;
    }

    // Fast path: flat contiguous buffer
    if layout.is_contiguous() {
        let out = std::slice::from_raw_parts_mut(ptr, total);
        for elem in out.iter_mut() {
            *elem = f();
        }
        return;
    }

    let shape = layout.shape();
    let strides = layout.strides();
    let ndim = shape.len();

    if ndim == 0 {
        *ptr.add(layout.offset()) = f();
        return;
    }

    // General strided iteration with incremental offset updates
    // (avoids O(ndim) recalculation per element)
    let mut indices: SmallVec<[usize; 4]> = SmallVec::from_elem(0, ndim);
    let mut off = layout.offset() as isize;

    for _ in 0..total {
        *ptr.offset(off) = f();

        for d in (0..ndim).rev() {
            indices[d] += 1;
            off += strides[d];
            if indices[d] < shape[d] {
                break;
            }
            off -= strides[d] * shape[d] as isize;
            indices[d] = 0;
        }
    }
}

/// Walk an output view and a broadcast-resolved input view in lockstep
///
/// For each output position, reads the aligned input element, invokes `f`
/// on it, and stores the result. The two views may have different element
/// types; their shapes must already agree (broadcast-expansion happens
/// before this call — a mismatch here is a caller-contract violation).
///
/// # Safety
/// - `out` and `input` must point to storage valid for every offset their
///   respective layouts reach
pub unsafe fn zip_fill_serial<T: Element, P: Element>(
    out: *mut T,
    out_layout: &Layout,
    input: *const P,
    in_layout: &Layout,
    mut f: impl FnMut(P) -> T,
) {
    debug_assert_eq!(out_layout.shape(), in_layout.shape());

    let total = out_layout.elem_count();
    if total == 0 {
        return;
    }

    let shape = out_layout.shape();
    let out_strides = out_layout.strides();
    let in_strides = in_layout.strides();
    let ndim = shape.len();

    if ndim == 0 {
        *out.add(out_layout.offset()) = f(*input.add(in_layout.offset()));
        return;
    }

    let mut indices: SmallVec<[usize; 4]> = SmallVec::from_elem(0, ndim);
    let mut out_off = out_layout.offset() as isize;
    let mut in_off = in_layout.offset() as isize;

    for _ in 0..total {
        *out.offset(out_off) = f(*input.offset(in_off));

        for d in (0..ndim).rev() {
            indices[d] += 1;
            out_off += out_strides[d];
            in_off += in_strides[d];
            if indices[d] < shape[d] {
                break;
            }
            out_off -= out_strides[d] * shape[d] as isize;
            in_off -= in_strides[d] * shape[d] as isize;
            indices[d] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_contiguous() {
        let mut buf = [0i32; 6];
        let layout = Layout::contiguous(&[2, 3]);
        let mut counter = 0;
        unsafe {
            fill_serial(buf.as_mut_ptr(), &layout, || {
                counter += 1;
                counter
            });
        }
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_fill_strided_writes_each_element_once() {
        // Transposed 2x3 view over a 3x2 buffer: logical order must still
        // touch all six distinct offsets exactly once.
        let mut buf = [0i32; 6];
        let layout = Layout::contiguous(&[3, 2]).transpose(0, 1).unwrap();
        let mut counter = 0;
        unsafe {
            fill_serial(buf.as_mut_ptr(), &layout, || {
                counter += 1;
                counter
            });
        }
        // Logical (2,3) walk: (0,0)(0,1)(0,2)(1,0)(1,1)(1,2)
        // maps to buffer offsets 0,2,4,1,3,5.
        assert_eq!(buf, [1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_zip_broadcast_input() {
        let mut out = [0.0f32; 4];
        let out_layout = Layout::contiguous(&[2, 2]);
        let input = [10.0f64, 20.0];
        let in_layout = Layout::contiguous(&[2, 1]).broadcast_to(&[2, 2]).unwrap();
        unsafe {
            zip_fill_serial(
                out.as_mut_ptr(),
                &out_layout,
                input.as_ptr(),
                &in_layout,
                |p| p as f32 + 1.0,
            );
        }
        assert_eq!(out, [11.0, 11.0, 21.0, 21.0]);
    }

    #[test]
    fn test_fill_scalar_view() {
        let mut buf = [0u8; 1];
        let layout = Layout::contiguous(&[]);
        unsafe { fill_serial(buf.as_mut_ptr(), &layout, || 9u8) };
        assert_eq!(buf[0], 9);
    }
}
