use crate::{
    error::{Result, TensorError},
    shape::Shape,
    storage::Storage,
    tensor::{Element, Tensor},
};

pub trait Tensorizable<T> {
    /// Converts nested data into a row-major tensor.
    ///
    /// # Errors
    /// Returns an error if conversion fails.
    fn to_tensor(self) -> Result<Tensor<T>>;
}

fn build<T: Element>(shape: Shape, buf: Vec<T>) -> Tensor<T> {
    if buf.is_empty() {
        return Tensor::empty();
    }
    Tensor::from_storage(shape, Storage::from_iter_exact(buf.len(), buf))
}

impl<T: Element> Tensorizable<T> for Vec<T> {
    fn to_tensor(self) -> Result<Tensor<T>> {
        let shape = Shape::from(self.len());
        Ok(build(shape, self))
    }
}

impl<T: Element> Tensorizable<T> for Vec<Vec<T>> {
    fn to_tensor(self) -> Result<Tensor<T>> {
        let (dim0, dim1) = (self.len(), self.first().map_or(0, Vec::len));
        if let Some(row) = self.iter().find(|x| x.len() != dim1) {
            let expected = (self.len(), dim1).into();
            let received = (self.len(), row.len()).into();
            return Err(TensorError::InconsistentDimensions { expected, received });
        }

        let buf: Vec<T> = self.into_iter().flatten().collect();
        Ok(build((dim0, dim1).into(), buf))
    }
}

fn check_vec_3d<T>(data: &[Vec<Vec<T>>]) -> Result<Shape> {
    if data.is_empty() {
        return Ok(Shape::empty());
    }
    let planes = data.len();

    let expected_rows = data[0].len();
    let expected_columns = data[0].first().map_or(0, Vec::len);

    for plane in data {
        let actual_rows = plane.len();
        if actual_rows != expected_rows {
            return Err(TensorError::InconsistentDimensions {
                expected: (planes, expected_rows, expected_columns).into(),
                received: (planes, actual_rows, expected_columns).into(),
            });
        }

        for row in plane {
            let actual_columns = row.len();
            if actual_columns != expected_columns {
                return Err(TensorError::InconsistentDimensions {
                    expected: (planes, expected_rows, expected_columns).into(),
                    received: (planes, actual_rows, actual_columns).into(),
                });
            }
        }
    }

    Ok((planes, expected_rows, expected_columns).into())
}

impl<T: Element> Tensorizable<T> for Vec<Vec<Vec<T>>> {
    fn to_tensor(self) -> Result<Tensor<T>> {
        let shape = check_vec_3d(&self)?;

        let buf: Vec<_> = self
            .into_iter()
            .flat_map(|v| v.into_iter().flatten())
            .collect();

        Ok(build(shape, buf))
    }
}

impl<T: Element, const N: usize> Tensorizable<T> for [T; N] {
    fn to_tensor(self) -> Result<Tensor<T>> {
        Ok(build(Shape::from(N), self.to_vec()))
    }
}

impl<T: Element, const N0: usize, const N1: usize> Tensorizable<T> for [[T; N1]; N0] {
    fn to_tensor(self) -> Result<Tensor<T>> {
        let buf: Vec<T> = self.into_iter().flatten().collect();
        Ok(build((N0, N1).into(), buf))
    }
}

impl<T: Element, const N0: usize, const N1: usize, const N2: usize> Tensorizable<T>
    for [[[T; N2]; N1]; N0]
{
    fn to_tensor(self) -> Result<Tensor<T>> {
        let buf: Vec<_> = self
            .into_iter()
            .flat_map(|v| v.into_iter().flatten())
            .collect();

        Ok(build((N0, N1, N2).into(), buf))
    }
}
