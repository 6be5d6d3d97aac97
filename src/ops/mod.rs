//! Shape-checked numeric kernels over [`Tensor`].
//!
//! Kernels write into an output tensor resized to the result shape. Mismatched
//! operands are fatal. Inputs are read before the output is written, so an
//! output may alias an input.

pub mod elementwise;
pub mod linear;
pub mod reduce;

use num_traits::Float;

use crate::{
    shape::Shape,
    storage::Storage,
    tensor::{Element, Tensor},
};

/// Magnitudes below this are treated as zero divisors.
pub const NEAR_ZERO: f64 = 1e-6;

/// Numeric element types the kernels operate on.
pub trait Scalar: Element + Float {}

impl<T: Element + Float> Scalar for T {}

pub(crate) fn cast<T: Scalar>(value: f64) -> T {
    num_traits::cast(value).unwrap_or_else(T::nan)
}

/// Row-major tensor of `shape` over exactly `volume` values.
pub(crate) fn collect<T: Element>(shape: Shape, values: impl IntoIterator<Item = T>) -> Tensor<T> {
    if shape.is_empty() {
        return Tensor::empty();
    }
    let volume = shape.volume();
    Tensor::from_storage(shape, Storage::from_iter_exact(volume, values))
}

/// Stores `result` into `y`. A `y` whose shape already matches virtually
/// keeps it, anything else is resized.
pub(crate) fn write_into<T: Element>(result: &Tensor<T>, y: &mut Tensor<T>) {
    if y.is_empty() || y.space().is_none() || !y.is_same_size_virtually(result) {
        y.set_size(result.shape().clone());
    }
    y.assign(result);
}

fn broadcast_shape<'a, T: Element>(a: &'a Tensor<T>, b: &'a Tensor<T>) -> &'a Shape {
    if a.volume() == 1 && b.volume() != 1 {
        b.shape()
    } else {
        a.shape()
    }
}

/// Elementwise `f(a, b)`; a one-element operand is broadcast against the other.
pub(crate) fn zip_with<T: Element>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    what: &str,
    f: impl Fn(T, T) -> T,
) -> Tensor<T> {
    tensor_assert!(
        !a.is_empty() && !b.is_empty(),
        "{what} of an empty tensor"
    );
    tensor_assert!(
        a.is_same_size_virtually(b) || a.volume() == 1 || b.volume() == 1,
        "{what} of {} and {}",
        a.shape(),
        b.shape()
    );
    let shape = broadcast_shape(a, b).clone();
    let (va, vb) = (a.to_row_major_vec(), b.to_row_major_vec());
    let values = (0..shape.volume()).map(|i| {
        let x = if va.len() == 1 { va[0] } else { va[i] };
        let y = if vb.len() == 1 { vb[0] } else { vb[i] };
        f(x, y)
    });
    collect(shape, values)
}

/// Elementwise `f(x)` in `x`'s own layout.
pub(crate) fn map<T: Element>(x: &Tensor<T>, what: &str, f: impl Fn(T) -> T) -> Tensor<T> {
    tensor_assert!(!x.is_empty(), "{what} of an empty tensor");
    let mut out = x.clone();
    out.as_mut_slice().iter_mut().for_each(|v| *v = f(*v));
    out
}
