//! Matrix helpers: defensive copies and per-row preprocessing.
//!
//! Accumulator-owned matrices are always row-major contiguous
//! ("standard layout" in `ndarray` terms). Helpers that rely on that say so
//! with a debug assertion instead of assuming a stride of one. Caller data
//! may have any strides or offset; it goes through `assign`, which walks the
//! view element by element.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

/// Copy `src` into freshly allocated row-major storage.
pub fn owned_copy(src: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut out = Array2::zeros(src.raw_dim());
    out.assign(&src);
    out
}

/// Copy `src` into a reusable vector of the same length.
pub fn copy_vector(dst: &mut Array1<f64>, src: ArrayView1<'_, f64>) {
    debug_assert_eq!(dst.len(), src.len());
    dst.assign(&src);
}

/// Copy one row-major matrix into another of identical shape.
pub fn copy_contiguous(dst: &mut Array2<f64>, src: &Array2<f64>) {
    debug_assert_eq!(dst.dim(), src.dim());
    debug_assert!(dst.is_standard_layout() && src.is_standard_layout());
    match (dst.as_slice_mut(), src.as_slice()) {
        (Some(d), Some(s)) => d.copy_from_slice(s),
        _ => dst.assign(src),
    }
}

/// Scale `x` in place to unit L2 norm. A zero vector is left as is.
pub fn normalize(mut x: ArrayViewMut1<'_, f64>) {
    let norm = x.dot(&x).sqrt();
    if norm > 0.0 {
        x.mapv_inplace(|v| v / norm);
    }
}

/// [`normalize`] every row of `m`.
pub fn normalize_rows(mut m: ArrayViewMut2<'_, f64>) {
    for row in m.rows_mut() {
        normalize(row);
    }
}

/// Standardize `x` in place using a `d x 2` table of `{mean, stdev}` pairs.
///
/// A dimension with zero standard deviation is centered but not scaled.
pub fn standardize(mut x: ArrayViewMut1<'_, f64>, moments: ArrayView2<'_, f64>) {
    debug_assert_eq!(moments.dim(), (x.len(), 2));
    for (xi, m) in x.iter_mut().zip(moments.rows()) {
        let (mean, stdev) = (m[0], m[1]);
        *xi -= mean;
        if stdev > 0.0 {
            *xi /= stdev;
        }
    }
}

/// [`standardize`] every row of `m` with the same moments table.
pub fn standardize_rows(mut m: ArrayViewMut2<'_, f64>, moments: ArrayView2<'_, f64>) {
    for row in m.rows_mut() {
        standardize(row, moments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn owned_copy_is_row_major_and_detached() {
        let src = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let t = src.t();
        let copy = owned_copy(t);
        assert!(copy.is_standard_layout());
        assert_eq!(copy, arr2(&[[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]));
    }

    #[test]
    fn copy_contiguous_copies_everything() {
        let src = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut dst = Array2::zeros((2, 2));
        copy_contiguous(&mut dst, &src);
        assert_eq!(dst, src);
    }

    #[test]
    fn copy_vector_from_strided_view() {
        let m = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let mut dst = Array1::zeros(3);
        copy_vector(&mut dst, m.column(1));
        assert_eq!(dst, arr1(&[2.0, 4.0, 6.0]));
    }

    #[test]
    fn normalize_gives_unit_norm() {
        let mut x = arr1(&[3.0, 4.0]);
        normalize(x.view_mut());
        assert_relative_eq!(x[0], 0.6);
        assert_relative_eq!(x[1], 0.8);
    }

    #[test]
    fn normalize_leaves_zero_vector() {
        let mut x = arr1(&[0.0, 0.0, 0.0]);
        normalize(x.view_mut());
        assert_eq!(x, arr1(&[0.0, 0.0, 0.0]));
    }

    #[test]
    fn normalize_rows_each_row() {
        let mut m = arr2(&[[3.0, 4.0], [0.0, 2.0]]);
        normalize_rows(m.view_mut());
        for row in m.rows() {
            assert_relative_eq!(row.dot(&row), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn standardize_uses_interleaved_moments() {
        let moments = arr2(&[[1.0, 2.0], [10.0, 0.0]]);
        let mut m = arr2(&[[3.0, 12.0], [1.0, 8.0]]);
        standardize_rows(m.view_mut(), moments.view());
        // Second dimension has zero spread: centered only.
        assert_eq!(m, arr2(&[[1.0, 2.0], [0.0, -2.0]]));
    }
}
