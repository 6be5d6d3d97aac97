use std::fmt::{Debug, Display};

use crate::{
    error::{Result, TensorError},
    shape::{Layout, Shape, Strides},
    shared::{ReadGuard, SharedBuffer, Space, WriteGuard},
    storage::Storage,
    tensorizable::Tensorizable,
};

/// Element types a [`Tensor`] can hold.
pub trait Element: Copy + Default + PartialEq + Debug + 'static {}

impl<T: Copy + Default + PartialEq + Debug + 'static> Element for T {}

/// N-dimensional array over a [`SharedBuffer`], indexed from 1.
///
/// `Clone` and [`Tensor::copy_to`] always produce independent storage.
/// Aliasing is opt-in through [`Tensor::share_reshape`],
/// [`Tensor::sub_tensor`] and [`Tensor::set_size_with_space`].
pub struct Tensor<T> {
    shape: Shape,
    layout: Layout,
    strides: Strides,
    buffer: SharedBuffer<T>,
}

impl<T> Default for Tensor<T> {
    fn default() -> Self {
        Self {
            shape: Shape::empty(),
            layout: Layout::RowMajor,
            strides: Strides::default(),
            buffer: SharedBuffer::empty(),
        }
    }
}

impl<T: Element> Tensor<T> {
    /// Builds a tensor from nested vectors or arrays.
    ///
    /// # Errors
    ///
    /// [`TensorError::InconsistentDimensions`] for ragged input.
    pub fn new(data: impl Tensorizable<T>) -> Result<Self> {
        data.to_tensor()
    }

    /// An empty tensor without storage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A default-filled (zero for numbers) tensor of `shape`.
    pub fn with_shape(shape: impl Into<Shape>) -> Self {
        let mut t = Self::empty();
        t.set_size(shape);
        t
    }

    /// A tensor of shape `(1)` holding `value`.
    pub fn scalar(value: T) -> Self {
        Self::from_parts(Shape::from(1), SharedBuffer::filled(1, value))
    }

    /// Row-major tensor over `data`.
    ///
    /// # Errors
    ///
    /// [`TensorError::InvalidOp`] for a zero dimension or a volume that overflows,
    /// [`TensorError::InconsistentDimensions`] if `data.len()` is not the volume of `shape`.
    pub fn from_vec(shape: impl Into<Shape>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        if shape.dims().contains(&0) {
            return Err(TensorError::InvalidOp {
                op: "from_vec",
                why: format!("{shape} has a zero dimension"),
            });
        }
        let Some(volume) = shape.checked_volume() else {
            return Err(TensorError::InvalidOp {
                op: "from_vec",
                why: format!("volume of {shape} overflows"),
            });
        };
        if volume != data.len() {
            return Err(TensorError::InconsistentDimensions {
                expected: shape,
                received: Shape::from(data.len()),
            });
        }
        if data.is_empty() {
            let mut t = Self::empty();
            t.set_size_no_space(shape);
            return Ok(t);
        }
        Ok(Self::from_storage(shape, Storage::from_iter_exact(data.len(), data)))
    }

    pub(crate) fn from_storage(shape: Shape, storage: Storage<T>) -> Self {
        Self::from_parts(shape, SharedBuffer::from_storage(storage))
    }

    fn from_parts(shape: Shape, buffer: SharedBuffer<T>) -> Self {
        let strides = Strides::new(&shape, Layout::RowMajor);
        Self {
            shape,
            layout: Layout::RowMajor,
            strides,
            buffer,
        }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.shape.ndims()
    }

    /// Size of axis `k`, counted from 1.
    #[inline]
    pub fn dim(&self, k: usize) -> usize {
        tensor_assert_index!(
            k >= 1 && k <= self.dims(),
            "axis {k} out of {}",
            self.shape
        );
        self.shape.dims()[k - 1]
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.shape.volume()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// A one-axis tensor holding one element.
    pub fn is_scalar(&self) -> bool {
        self.dims() == 1 && self.volume() == 1
    }

    pub fn nrows(&self) -> usize {
        self.dim(1)
    }

    /// 1 for vectors.
    pub fn ncols(&self) -> usize {
        if self.dims() == 1 { 1 } else { self.dim(2) }
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn is_column_major(&self) -> bool {
        self.layout == Layout::ColumnMajor
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn is_same_size(&self, shape: &Shape) -> bool {
        &self.shape == shape
    }

    /// Same shape, or `(n)` against `(n, 1)`.
    pub fn is_same_size_virtually(&self, other: &Tensor<T>) -> bool {
        self.shape.is_same_virtually(&other.shape)
    }

    /// Allocates `product(shape)` default elements.
    ///
    /// An unchanged shape keeps both data and storage. Otherwise the tensor
    /// detaches from whatever it viewed before.
    pub fn set_size(&mut self, shape: impl Into<Shape>) {
        let shape = shape.into();
        if shape == self.shape && (self.buffer.has_space() || self.is_empty()) {
            return;
        }
        tensor_assert!(
            shape.dims().iter().all(|d| *d > 0),
            "dimensions must be positive, got {shape}"
        );
        self.buffer = SharedBuffer::filled(shape.volume(), T::default());
        self.strides = Strides::new(&shape, self.layout);
        self.shape = shape;
    }

    /// Sets the shape without storage; [`Tensor::set_space`] must follow before access.
    pub fn set_size_no_space(&mut self, shape: impl Into<Shape>) {
        let shape = shape.into();
        self.buffer.clear();
        self.strides = Strides::new(&shape, self.layout);
        self.shape = shape;
    }

    /// Views the front of `space` as elements of this tensor.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if `space` is smaller than the volume.
    pub fn set_space(&mut self, space: &Space<T>) -> Result<()> {
        let view = space.sub(0, self.volume())?;
        self.buffer = SharedBuffer::attach(&view);
        Ok(())
    }

    /// Reshapes onto `space` without copying.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if `space` is smaller than `product(shape)`.
    pub fn set_size_with_space(&mut self, shape: impl Into<Shape>, space: &Space<T>) -> Result<()> {
        let shape = shape.into();
        let view = space.sub(0, shape.volume())?;
        self.buffer = SharedBuffer::attach(&view);
        self.strides = Strides::new(&shape, self.layout);
        self.shape = shape;
        Ok(())
    }

    /// The viewed window, or `None` before space is attached.
    pub fn space(&self) -> Option<Space<T>> {
        self.buffer.space().cloned()
    }

    /// `len` elements of this tensor's storage starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`TensorError::MemoryViolation`] without storage,
    /// [`TensorError::OutOfRange`] if the window does not fit.
    pub fn space_at(&self, offset: usize, len: usize) -> Result<Space<T>> {
        self.buffer
            .space()
            .ok_or_else(|| TensorError::MemoryViolation {
                why: format!("tensor of {} has no space", self.shape),
            })?
            .sub(offset, len)
    }

    pub fn ref_count(&self) -> usize {
        self.buffer.ref_count()
    }

    pub fn is_independent(&self) -> bool {
        self.buffer.is_independent()
    }

    /// Replaces shared storage with a private copy of the viewed elements.
    pub fn ensure_independence(&mut self) {
        self.buffer.ensure_independence();
    }

    /// Back to the empty state, releasing this handle's storage reference.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.shape = Shape::empty();
        self.strides = Strides::default();
    }

    fn check_space(&self) {
        tensor_assert!(
            self.is_empty() || self.buffer.has_space(),
            "tensor of {} has no space attached",
            self.shape
        );
    }

    /// Elements in storage order.
    pub fn as_slice(&self) -> ReadGuard<'_, T> {
        self.check_space();
        self.buffer.read()
    }

    /// Mutable elements in storage order. Writes are visible to every alias.
    pub fn as_mut_slice(&mut self) -> WriteGuard<'_, T> {
        self.check_space();
        self.buffer.write()
    }

    /// Elements in storage order.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Elements in row-major logical order regardless of layout.
    pub fn to_row_major_vec(&self) -> Vec<T> {
        if self.layout == Layout::RowMajor || self.dims() == 1 {
            return self.to_vec();
        }
        let data = self.as_slice();
        self.shape
            .indices()
            .map(|index| data[self.strides.offset(&index)])
            .collect()
    }

    fn offset_of(&self, index: &[usize]) -> usize {
        tensor_assert_index!(
            index.len() == self.dims(),
            "index {index:?} has wrong arity for {}",
            self.shape
        );
        tensor_assert_index!(
            index
                .iter()
                .zip(self.shape.dims())
                .all(|(i, d)| *i >= 1 && i <= d),
            "index {index:?} out of {}",
            self.shape
        );
        self.strides.offset(index)
    }

    /// Element at the 1-based multi-index.
    pub fn get(&self, index: &[usize]) -> T {
        let offset = self.offset_of(index);
        self.as_slice()[offset]
    }

    pub fn set(&mut self, index: &[usize], value: T) {
        let offset = self.offset_of(index);
        self.as_mut_slice()[offset] = value;
    }

    /// Element at 1-based position `i` in storage order.
    pub fn at(&self, i: usize) -> T {
        tensor_assert_index!(i >= 1 && i <= self.volume(), "position {i} out of {}", self.shape);
        self.as_slice()[i - 1]
    }

    pub fn set_at(&mut self, i: usize, value: T) {
        tensor_assert_index!(i >= 1 && i <= self.volume(), "position {i} out of {}", self.shape);
        self.as_mut_slice()[i - 1] = value;
    }

    /// Writes `value` into every element.
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    pub fn zeros(&mut self) {
        self.fill(T::default());
    }

    fn is_vector_like(&self) -> bool {
        matches!(self.shape.dims(), [_] | [_, 1])
    }

    /// Copies the elements of `other` into this tensor's storage.
    ///
    /// # Panics
    ///
    /// Panics unless the shapes match exactly or are `(n)` against `(n, 1)`.
    pub fn assign(&mut self, other: &Tensor<T>) {
        tensor_assert!(
            self.is_same_size_virtually(other),
            "cannot assign {} to {}",
            other.shape,
            self.shape
        );
        if self.layout == other.layout || self.is_vector_like() {
            let values = other.to_vec();
            self.as_mut_slice().copy_from_slice(&values);
        } else {
            let values = other.to_row_major_vec();
            let offsets: Vec<_> = self
                .shape
                .indices()
                .map(|index| self.strides.offset(&index))
                .collect();
            let mut data = self.as_mut_slice();
            for (offset, value) in offsets.into_iter().zip(values) {
                data[offset] = value;
            }
        }
    }

    /// Independent copy of this tensor into `dst`, keeping `dst`'s layout.
    pub fn copy_to(&self, dst: &mut Tensor<T>) {
        if !dst.is_independent() {
            dst.buffer.clear();
        }
        dst.set_size(self.shape.clone());
        dst.assign(self);
    }

    /// Makes this tensor an independent copy of `src`.
    pub fn copy_from(&mut self, src: &Tensor<T>) {
        src.copy_to(self);
    }

    /// Exchanges everything with `other` in O(1).
    pub fn swap(&mut self, other: &mut Tensor<T>) {
        std::mem::swap(self, other);
    }

    /// Recomputes strides; stored elements are reinterpreted, not moved.
    pub fn set_column_major(&mut self, column_major: bool) {
        self.layout = if column_major {
            Layout::ColumnMajor
        } else {
            Layout::RowMajor
        };
        self.strides = Strides::new(&self.shape, self.layout);
    }

    /// A new tensor of `shape` over the same storage.
    ///
    /// # Panics
    ///
    /// Panics if the volumes differ.
    pub fn share_reshape(&self, shape: impl Into<Shape>) -> Tensor<T> {
        let shape = shape.into();
        tensor_assert!(
            shape.volume() == self.volume(),
            "cannot share {} as {shape}",
            self.shape
        );
        self.check_space();
        let strides = Strides::new(&shape, self.layout);
        Tensor {
            shape,
            layout: self.layout,
            strides,
            buffer: match self.buffer.space() {
                Some(space) => SharedBuffer::attach(space),
                None => SharedBuffer::empty(),
            },
        }
    }

    pub fn share_reshape_to_vector(&self) -> Tensor<T> {
        self.share_reshape(self.volume())
    }

    /// Views a `(m, n)` matrix as `(1, m, n)`.
    pub fn share_reshape_2d_to_3d(&self) -> Tensor<T> {
        tensor_assert!(self.dims() == 2, "expected a matrix, got {}", self.shape);
        self.share_reshape((1, self.dim(1), self.dim(2)))
    }

    /// Changes the shape in place; volume must not change.
    pub fn reshape(&mut self, shape: impl Into<Shape>) {
        self.shape.change(shape);
        self.strides = Strides::new(&self.shape, self.layout);
    }

    pub fn to_vector(&mut self) {
        let volume = self.volume();
        self.reshape(volume);
    }

    /// Aliasing view of slice `i` along the outermost axis of the storage order:
    /// the first axis for row-major, the last for column-major.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn sub_tensor(&self, i: usize) -> Tensor<T> {
        let dims = self.shape.dims();
        let (outer, rest) = match self.layout {
            Layout::RowMajor => (self.dim(1), dims[1..].to_vec()),
            Layout::ColumnMajor => (self.dim(self.dims()), dims[..dims.len() - 1].to_vec()),
        };
        tensor_assert!(i >= 1 && i <= outer, "slice {i} out of {}", self.shape);
        let shape = if rest.is_empty() {
            Shape::from(1)
        } else {
            Shape::from(rest)
        };
        let len = shape.volume();
        let space = self.space_at((i - 1) * len, len).unwrap_or_else(|e| {
            panic!("slice {i} of {} has no backing space: {e}", self.shape)
        });
        Tensor {
            strides: Strides::new(&shape, self.layout),
            shape,
            layout: self.layout,
            buffer: SharedBuffer::attach(&space),
        }
    }
}

impl<T: Element> Clone for Tensor<T> {
    fn clone(&self) -> Self {
        Tensor {
            shape: self.shape.clone(),
            layout: self.layout,
            strides: self.strides.clone(),
            buffer: self.buffer.deep_copy(),
        }
    }
}

impl<T: Element> PartialEq for Tensor<T> {
    /// Same shape and same elements in logical order.
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.to_row_major_vec() == other.to_row_major_vec()
    }
}

impl<T: Element> Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Tensor");
        s.field("shape", &self.shape).field("layout", &self.layout);
        if self.is_empty() || self.buffer.has_space() {
            s.field("data", &self.to_row_major_vec());
        }
        s.finish()
    }
}

impl<T: Element + Display> Tensor<T> {
    fn fmt_axis(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        prefix: &mut Vec<usize>,
    ) -> std::fmt::Result {
        let axis = prefix.len();
        write!(f, "[")?;
        for i in 1..=self.shape.dims()[axis] {
            if i > 1 {
                if axis + 1 < self.dims() {
                    write!(f, ",\n{}", " ".repeat(axis + 1))?;
                } else {
                    write!(f, ", ")?;
                }
            }
            prefix.push(i);
            if axis + 1 == self.dims() {
                write!(f, "{}", self.get(prefix))?;
            } else {
                self.fmt_axis(f, prefix)?;
            }
            prefix.pop();
        }
        write!(f, "]")
    }
}

impl<T: Element + Display> Display for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "[]");
        }
        if !self.buffer.has_space() {
            return write!(f, "<{} without space>", self.shape);
        }
        self.fmt_axis(f, &mut Vec::with_capacity(self.dims()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix_2x3() -> Tensor<f64> {
        Tensor::from_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn one_based_row_major_indexing() {
        let a = matrix_2x3();
        assert_eq!(a.get(&[1, 1]), 1.0);
        assert_eq!(a.get(&[1, 3]), 3.0);
        assert_eq!(a.get(&[2, 2]), 5.0);
        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 3);
        assert_eq!(a.dim(2), 3);
    }

    #[test]
    fn from_vec_checks_volume() {
        let err = Tensor::from_vec((2, 2), vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            TensorError::InconsistentDimensions {
                expected: Shape::from((2, 2)),
                received: Shape::from(3),
            }
        );
    }

    #[test]
    fn from_vec_rejects_degenerate_shapes() {
        let err = Tensor::<f64>::from_vec((0, 3), Vec::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to perform from_vec: Shape(0, 3) has a zero dimension"
        );
        let huge = 1usize << (usize::BITS / 2 + 1);
        assert!(matches!(
            Tensor::<f64>::from_vec((huge, huge), vec![1.0]),
            Err(TensorError::InvalidOp { op: "from_vec", .. })
        ));
    }

    #[test]
    fn set_size_keeps_data_for_same_shape() {
        let mut a = matrix_2x3();
        a.set_size((2, 3));
        assert_eq!(a.get(&[2, 3]), 6.0);
        a.set_size((3, 3));
        assert_eq!(a.to_vec(), vec![0.0; 9]);
    }

    #[test]
    fn plain_copy_is_independent() {
        let a = matrix_2x3();
        let mut b = Tensor::empty();
        a.copy_to(&mut b);
        b.set(&[2, 2], 9.0);
        assert_eq!(a.get(&[2, 2]), 5.0);
        assert_eq!(b.get(&[2, 2]), 9.0);

        let mut c = a.clone();
        c.fill(0.0);
        assert_eq!(a.get(&[1, 1]), 1.0);
        assert!(a.is_independent());
    }

    #[test]
    fn copy_to_detaches_a_shared_destination() {
        let a = matrix_2x3();
        let source = Tensor::from_vec((2, 3), vec![7.0; 6]).unwrap();
        let mut view = a.share_reshape((3, 2));
        source.copy_to(&mut view);
        assert_eq!(view.shape(), &Shape::from((2, 3)));
        assert_eq!(a.get(&[1, 1]), 1.0);
    }

    #[test]
    fn share_reshape_aliases() {
        let a = matrix_2x3();
        let mut v = a.share_reshape(6);
        assert_eq!(a.ref_count(), 2);
        v.set(&[5], 50.0);
        assert_eq!(a.get(&[2, 2]), 50.0);
        drop(v);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot share")]
    fn share_reshape_requires_equal_volume() {
        let _ = matrix_2x3().share_reshape((4, 2));
    }

    #[test]
    fn assign_accepts_virtual_sizes() {
        let column = Tensor::from_vec((3, 1), vec![1, 2, 3]).unwrap();
        let mut v = Tensor::with_shape(3);
        v.assign(&column);
        assert_eq!(v.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "cannot assign")]
    fn assign_rejects_other_shapes() {
        let mut v = Tensor::<i32>::with_shape(3);
        v.assign(&Tensor::with_shape((1, 3)));
    }

    #[test]
    fn assign_across_layouts_keeps_logical_values() {
        let a = matrix_2x3();
        let mut b = Tensor::empty();
        b.set_column_major(true);
        a.copy_to(&mut b);
        assert!(b.is_column_major());
        assert_eq!(b.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(b, a);
    }

    #[test]
    fn column_major_reinterprets_bytes() {
        let mut a = matrix_2x3();
        a.set_column_major(true);
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.get(&[2, 1]), 2.0);
        assert_eq!(a.get(&[1, 2]), 3.0);
    }

    #[test]
    fn swap_exchanges_headers() {
        let mut a = matrix_2x3();
        let mut b = Tensor::from_vec(2, vec![8.0, 9.0]).unwrap();
        a.swap(&mut b);
        assert_eq!(a.shape(), &Shape::from(2));
        assert_eq!(b.get(&[2, 3]), 6.0);
    }

    #[test]
    fn spaces_and_placeholders() {
        let owner = matrix_2x3();
        let mut t = Tensor::empty();
        t.set_size_no_space(2);
        t.set_space(&owner.space_at(4, 2).unwrap()).unwrap();
        assert_eq!(t.to_vec(), vec![5.0, 6.0]);

        let err = t.set_size_with_space(3, &owner.space_at(4, 2).unwrap());
        assert!(matches!(err, Err(TensorError::OutOfRange { .. })));
        assert!(matches!(
            owner.space_at(5, 2),
            Err(TensorError::OutOfRange { offset: 5, len: 2, available: 6 })
        ));
        assert!(matches!(
            Tensor::<f64>::empty().space_at(0, 1),
            Err(TensorError::MemoryViolation { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "no space attached")]
    fn placeholder_access_is_fatal() {
        let mut t = Tensor::<f64>::empty();
        t.set_size_no_space((2, 2));
        let _ = t.get(&[1, 1]);
    }

    #[test]
    fn sub_tensor_views_rows() {
        let a = matrix_2x3();
        let mut row = a.sub_tensor(2);
        assert_eq!(row.shape(), &Shape::from(3));
        assert_eq!(row.to_vec(), vec![4.0, 5.0, 6.0]);
        row.set(&[1], 40.0);
        assert_eq!(a.get(&[2, 1]), 40.0);
    }

    #[test]
    fn scalar_and_display() {
        assert!(Tensor::scalar(3.0).is_scalar());
        assert!(!Tensor::<f64>::with_shape((1, 1)).is_scalar());
        assert_eq!(Tensor::from_vec(2, vec![1, 2]).unwrap().to_string(), "[1, 2]");
        let m = Tensor::from_vec((2, 2), vec![1, 2, 3, 4]).unwrap();
        assert_eq!(m.to_string(), "[[1, 2],\n [3, 4]]");
    }

    #[test]
    fn clear_releases_storage() {
        let a = matrix_2x3();
        let mut v = a.share_reshape(6);
        v.clear();
        assert!(v.is_empty());
        assert_eq!(a.ref_count(), 1);
    }

    proptest! {
        #[test]
        fn copy_round_trip(data in prop::collection::vec(-1e3f64..1e3, 1..24)) {
            let a = Tensor::from_vec(data.len(), data).unwrap();
            let mut b = Tensor::empty();
            a.copy_to(&mut b);
            b.assign(&a);
            prop_assert_eq!(a.to_vec(), b.to_vec());
        }

        #[test]
        fn share_reshape_sees_same_elements(rows in 1usize..6, cols in 1usize..6, pos in 0usize..36) {
            let n = rows * cols;
            let a = Tensor::from_vec((rows, cols), (0..n).map(|v| v as f64).collect()).unwrap();
            let mut flat = a.share_reshape(n);
            prop_assert_eq!(flat.to_vec(), a.to_vec());

            let pos = pos % n + 1;
            flat.set_at(pos, -1.0);
            prop_assert_eq!(a.at(pos), -1.0);
        }
    }
}
