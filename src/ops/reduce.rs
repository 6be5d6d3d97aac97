use super::{Scalar, cast};
use crate::tensor::Tensor;

fn values<T: Scalar>(a: &Tensor<T>, what: &str) -> Vec<T> {
    tensor_assert!(!a.is_empty(), "{what} of an empty tensor");
    a.to_vec()
}

pub fn sum<T: Scalar>(a: &Tensor<T>) -> T {
    values(a, "sum").into_iter().fold(T::zero(), |acc, v| acc + v)
}

pub fn multiply_all<T: Scalar>(a: &Tensor<T>) -> T {
    values(a, "product").into_iter().fold(T::one(), |acc, v| acc * v)
}

pub fn mean<T: Scalar>(a: &Tensor<T>) -> T {
    sum(a) / cast(a.volume() as f64)
}

pub fn max<T: Scalar>(a: &Tensor<T>) -> T {
    values(a, "max").into_iter().fold(T::neg_infinity(), T::max)
}

pub fn min<T: Scalar>(a: &Tensor<T>) -> T {
    values(a, "min").into_iter().fold(T::infinity(), T::min)
}

/// 1-based storage position of the first maximum.
pub fn argmax<T: Scalar>(a: &Tensor<T>) -> usize {
    arg_by(a, "argmax", |candidate, best| candidate > best)
}

/// 1-based storage position of the first minimum.
pub fn argmin<T: Scalar>(a: &Tensor<T>) -> usize {
    arg_by(a, "argmin", |candidate, best| candidate < best)
}

fn arg_by<T: Scalar>(a: &Tensor<T>, what: &str, better: impl Fn(T, T) -> bool) -> usize {
    let values = values(a, what);
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if better(*v, values[best]) {
            best = i;
        }
    }
    best + 1
}

/// L1 (`n == 1`) or L2 (`n == 2`) norm; a non-finite result is fatal.
pub fn norm<T: Scalar>(a: &Tensor<T>, n: u32) -> T {
    let values = values(a, "norm");
    let result = match n {
        1 => values.into_iter().fold(T::zero(), |acc, v| acc + v.abs()),
        2 => values
            .into_iter()
            .fold(T::zero(), |acc, v| acc + v * v)
            .sqrt(),
        _ => panic!("unsupported norm order {n}"),
    };
    tensor_assert_finite!(result, "norm")
}
