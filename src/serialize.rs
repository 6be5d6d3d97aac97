//! Tensor persistence as `[is_column_major][shape][elements]`.
//!
//! Elements are written in storage order, so a column-major tensor round-trips
//! without transposition.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{
    error::TensorError,
    tensor::{Element, Tensor},
};

#[derive(Serialize)]
struct TensorRef<'a, T> {
    is_column_major: u32,
    shape: &'a [usize],
    elements: Vec<T>,
}

#[derive(Deserialize)]
struct TensorRepr<T> {
    is_column_major: u32,
    shape: Vec<usize>,
    elements: Vec<T>,
}

impl<T: Element + Serialize> Serialize for Tensor<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TensorRef {
            is_column_major: u32::from(self.is_column_major()),
            shape: self.shape().dims(),
            elements: self.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<T: Element> TryFrom<TensorRepr<T>> for Tensor<T> {
    type Error = TensorError;

    fn try_from(repr: TensorRepr<T>) -> Result<Self, Self::Error> {
        let mut t = Tensor::from_vec(repr.shape, repr.elements)?;
        t.set_column_major(repr.is_column_major != 0);
        Ok(t)
    }
}

impl<'de, T: Element + Deserialize<'de>> Deserialize<'de> for Tensor<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TensorRepr::<T>::deserialize(deserializer)?;
        Tensor::try_from(repr).map_err(D::Error::custom)
    }
}
