use super::{Scalar, collect, map, write_into, zip_with};
use crate::tensor::Tensor;

/// `c = k1 * a`
pub fn linear<T: Scalar>(k1: T, a: &Tensor<T>, c: &mut Tensor<T>) {
    write_into(&map(a, "linear", |x| k1 * x), c);
}

/// `c = k1 * a + k2 * b`; `(n)` and `(n, 1)` operands mix freely.
pub fn linear2<T: Scalar>(k1: T, a: &Tensor<T>, k2: T, b: &Tensor<T>, c: &mut Tensor<T>) {
    tensor_assert!(
        a.is_same_size_virtually(b),
        "linear combination of {} and {}",
        a.shape(),
        b.shape()
    );
    write_into(&zip_with(a, b, "linear", |x, y| k1 * x + k2 * y), c);
}

/// `a = k1 * a + k2 * b`
pub fn linear_to_a<T: Scalar>(k1: T, a: &mut Tensor<T>, k2: T, b: &Tensor<T>) {
    let result = combine(k1, a, k2, b);
    write_into(&result, a);
}

/// `b = k1 * a + k2 * b`
pub fn linear_to_b<T: Scalar>(k1: T, a: &Tensor<T>, k2: T, b: &mut Tensor<T>) {
    let result = combine(k1, a, k2, b);
    write_into(&result, b);
}

fn combine<T: Scalar>(k1: T, a: &Tensor<T>, k2: T, b: &Tensor<T>) -> Tensor<T> {
    tensor_assert!(
        a.is_same_size_virtually(b),
        "linear combination of {} and {}",
        a.shape(),
        b.shape()
    );
    zip_with(a, b, "linear", |x, y| k1 * x + k2 * y)
}

/// Logical `(rows, cols)` of a matrix, or `(n, 1)` for a vector.
fn matrix_dims<T: Scalar>(a: &Tensor<T>) -> (usize, usize) {
    tensor_assert!(
        !a.is_empty() && a.dims() <= 2,
        "expected a vector or matrix, got {}",
        a.shape()
    );
    (a.nrows(), a.ncols())
}

/// Row-major values with optional transposition.
fn matrix_values<T: Scalar>(a: &Tensor<T>, transpose: bool) -> (usize, usize, Vec<T>) {
    let (rows, cols) = matrix_dims(a);
    let values = a.to_row_major_vec();
    if !transpose {
        return (rows, cols, values);
    }
    let mut t = Vec::with_capacity(values.len());
    for j in 0..cols {
        for i in 0..rows {
            t.push(values[i * cols + j]);
        }
    }
    (cols, rows, t)
}

fn product<T: Scalar>(
    s: T,
    a: &Tensor<T>,
    ta: bool,
    b: &Tensor<T>,
    tb: bool,
    c: &mut Tensor<T>,
) {
    let (m, k, va) = matrix_values(a, ta);
    let (k2, n, vb) = matrix_values(b, tb);
    tensor_assert!(
        k == k2,
        "matrix product of {} and {}",
        a.shape(),
        b.shape()
    );
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for l in 0..k {
            let x = va[i * k + l];
            for j in 0..n {
                out[i * n + j] = out[i * n + j] + x * vb[l * n + j];
            }
        }
    }
    let result = collect((m, n).into(), out.into_iter().map(|v| s * v));
    write_into(&result, c);
}

/// `c = s * a * b`, vectors taken as columns.
pub fn matrix_multiply<T: Scalar>(s: T, a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    product(s, a, false, b, false, c);
}

/// `c = s * aᵀ * b`
pub fn trans_multiply<T: Scalar>(s: T, a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    product(s, a, true, b, false, c);
}

/// `c = s * a * bᵀ`
pub fn multiply_trans<T: Scalar>(s: T, a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    product(s, a, false, b, true, c);
}

/// `k * Σ a_i b_i`; a non-finite result is fatal.
pub fn inner_product<T: Scalar>(k: T, a: &Tensor<T>, b: &Tensor<T>) -> T {
    tensor_assert!(
        !a.is_empty() && a.volume() == b.volume(),
        "inner product of {} and {}",
        a.shape(),
        b.shape()
    );
    let sum = a
        .to_row_major_vec()
        .into_iter()
        .zip(b.to_row_major_vec())
        .fold(T::zero(), |acc, (x, y)| acc + x * y);
    tensor_assert_finite!(k * sum, "inner product")
}
