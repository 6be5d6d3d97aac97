use super::{NEAR_ZERO, Scalar, cast, map, write_into, zip_with};
use crate::tensor::Tensor;

/// `c = a + b`
pub fn add<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    write_into(&zip_with(a, b, "add", |x, y| x + y), c);
}

/// `a += b`
pub fn add_to_a<T: Scalar>(a: &mut Tensor<T>, b: &Tensor<T>) {
    let sum = zip_with(a, b, "add", |x, y| x + y);
    write_into(&sum, a);
}

/// `b += a`
pub fn add_to_b<T: Scalar>(a: &Tensor<T>, b: &mut Tensor<T>) {
    let sum = zip_with(a, b, "add", |x, y| x + y);
    write_into(&sum, b);
}

/// `y = k + x`
pub fn add_scalar<T: Scalar>(k: T, x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "add", |v| k + v), y);
}

pub fn add_scalar_to<T: Scalar>(k: T, x: &mut Tensor<T>) {
    let sum = map(x, "add", |v| k + v);
    write_into(&sum, x);
}

/// Elementwise product `c = a ∘ b`.
pub fn schur_product<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    write_into(&zip_with(a, b, "schur product", |x, y| x * y), c);
}

pub fn schur_product_to_a<T: Scalar>(a: &mut Tensor<T>, b: &Tensor<T>) {
    let product = zip_with(a, b, "schur product", |x, y| x * y);
    write_into(&product, a);
}

pub fn schur_product_to_b<T: Scalar>(a: &Tensor<T>, b: &mut Tensor<T>) {
    let product = zip_with(a, b, "schur product", |x, y| x * y);
    write_into(&product, b);
}

/// `y = k * x`
pub fn scale<T: Scalar>(k: T, x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "scale", |v| k * v), y);
}

pub fn scale_to<T: Scalar>(k: T, x: &mut Tensor<T>) {
    let scaled = map(x, "scale", |v| k * v);
    write_into(&scaled, x);
}

/// `y = x / k`
///
/// # Panics
///
/// Panics if `|k|` is below [`NEAR_ZERO`].
pub fn divide_scalar<T: Scalar>(x: &Tensor<T>, k: T, y: &mut Tensor<T>) {
    tensor_assert!(k.abs() >= cast(NEAR_ZERO), "divide by near-zero {k:?}");
    write_into(&map(x, "divide", |v| v / k), y);
}

/// Elementwise `c = a / b`.
///
/// # Panics
///
/// Panics if any `|b_i|` is below [`NEAR_ZERO`].
pub fn divide<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, c: &mut Tensor<T>) {
    let eps: T = cast(NEAR_ZERO);
    let quotient = zip_with(a, b, "divide", |x, y| {
        tensor_assert!(y.abs() >= eps, "divide by near-zero {y:?}");
        x / y
    });
    write_into(&quotient, c);
}

pub fn sin<T: Scalar>(x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "sin", T::sin), y);
}

pub fn sin_to<T: Scalar>(x: &mut Tensor<T>) {
    let s = map(x, "sin", T::sin);
    write_into(&s, x);
}

pub fn cos<T: Scalar>(x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "cos", T::cos), y);
}

pub fn cos_to<T: Scalar>(x: &mut Tensor<T>) {
    let c = map(x, "cos", T::cos);
    write_into(&c, x);
}

/// Elementwise `e^x`; overflow is fatal.
pub fn exp<T: Scalar>(x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "exp", |v| tensor_assert_finite!(v.exp(), "exp")), y);
}

/// Natural logarithm; non-positive inputs are fatal.
pub fn log<T: Scalar>(x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "log", |v| tensor_assert_finite!(v.ln(), "log")), y);
}

pub fn sqrt<T: Scalar>(x: &Tensor<T>, y: &mut Tensor<T>) {
    write_into(&map(x, "sqrt", |v| tensor_assert_finite!(v.sqrt(), "sqrt")), y);
}

/// `true` when shapes agree virtually and every element differs by at most `eps`.
pub fn is_equal<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, eps: T) -> bool {
    a.is_same_size_virtually(b)
        && a
            .to_row_major_vec()
            .into_iter()
            .zip(b.to_row_major_vec())
            .all(|(x, y)| (x - y).abs() <= eps)
}
