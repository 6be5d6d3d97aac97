use std::{fmt::Display, ops::Index};

/// Ordered dimension sizes of a tensor. An empty shape describes an empty tensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl From<(usize, usize, usize)> for Shape {
    fn from(value: (usize, usize, usize)) -> Self {
        Shape(vec![value.0, value.1, value.2])
    }
}

impl From<(usize, usize)> for Shape {
    fn from(value: (usize, usize)) -> Self {
        Shape(vec![value.0, value.1])
    }
}

impl From<usize> for Shape {
    fn from(value: usize) -> Self {
        Shape(vec![value])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Shape(value)
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Shape(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(value: [usize; N]) -> Self {
        Shape(value.to_vec())
    }
}

impl From<&Shape> for Shape {
    fn from(value: &Shape) -> Self {
        value.clone()
    }
}

impl Shape {
    /// The shape of an empty tensor.
    pub fn empty() -> Self {
        Shape(Vec::new())
    }

    /// Replaces the dimensions, keeping the element count.
    ///
    /// # Panics
    ///
    /// Panics if the new shape has a different volume.
    pub fn change(&mut self, shape: impl Into<Shape>) {
        let shape = shape.into();
        tensor_assert!(
            shape.volume() == self.volume(),
            "cannot change {self} into {shape}"
        );
        self.0 = shape.0;
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of addressable elements; 0 for the empty shape.
    ///
    /// # Panics
    ///
    /// Panics if the product overflows `usize`.
    #[inline]
    pub fn volume(&self) -> usize {
        match self.checked_volume() {
            Some(v) => v,
            None => panic!("volume of {self} overflows"),
        }
    }

    /// [`Shape::volume`], or `None` on overflow.
    pub fn checked_volume(&self) -> Option<usize> {
        if self.0.is_empty() {
            return Some(0);
        }
        self.0.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// `true` for `(n)` against `(n, 1)` and for identical shapes.
    pub fn is_same_virtually(&self, other: &Shape) -> bool {
        if self == other {
            return true;
        }
        match (self.dims(), other.dims()) {
            ([n], [m, 1]) | ([m, 1], [n]) => n == m,
            _ => false,
        }
    }

    /// Every 1-based multi-index, last axis varying fastest.
    pub fn indices(&self) -> Indices {
        Indices {
            dims: self.0.clone(),
            next: if self.is_empty() {
                None
            } else {
                Some(vec![1; self.0.len()])
            },
        }
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Index<usize> for Shape {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        tensor_assert_index!(index < self.ndims(), "axis {index} out of {self}");
        &self.0[index]
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shape(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

/// Iterator over the 1-based multi-indices of a [`Shape`].
pub struct Indices {
    dims: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl Iterator for Indices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut following = current.clone();
        for axis in (0..self.dims.len()).rev() {
            if following[axis] < self.dims[axis] {
                following[axis] += 1;
                self.next = Some(following);
                break;
            }
            following[axis] = 1;
        }
        Some(current)
    }
}

/// Element ordering in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    #[default]
    RowMajor,
    ColumnMajor,
}

/// Per-axis element distances derived from a shape and a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Strides(Vec<usize>);

impl Strides {
    pub fn new(shape: &Shape, layout: Layout) -> Self {
        let dims = shape.dims();
        let mut strides = vec![0; dims.len()];
        let mut acc = 1;
        match layout {
            Layout::RowMajor => {
                for axis in (0..dims.len()).rev() {
                    strides[axis] = acc;
                    acc *= dims[axis];
                }
            }
            Layout::ColumnMajor => {
                for axis in 0..dims.len() {
                    strides[axis] = acc;
                    acc *= dims[axis];
                }
            }
        }
        Strides(strides)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// 0-based storage offset of a 1-based multi-index.
    #[inline]
    pub fn offset(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(&self.0)
            .map(|(i, s)| (i - 1) * s)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn volume_and_display() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.volume(), 24);
        assert_eq!(s.ndims(), 3);
        assert_eq!(s.to_string(), "Shape(2, 3, 4)");
        assert_eq!(Shape::empty().volume(), 0);
        assert!(Shape::empty().is_empty());
    }

    #[test]
    fn overflowing_volume_is_detected() {
        let huge = 1usize << (usize::BITS / 2 + 1);
        assert_eq!(Shape::from((huge, huge)).checked_volume(), None);
        assert_eq!(Shape::from((huge, 2)).checked_volume(), Some(huge * 2));
    }

    #[test]
    fn virtual_sizes() {
        assert!(Shape::from(3).is_same_virtually(&Shape::from((3, 1))));
        assert!(Shape::from((3, 1)).is_same_virtually(&Shape::from(3)));
        assert!(!Shape::from(3).is_same_virtually(&Shape::from((1, 3))));
    }

    #[test]
    fn strides_by_layout() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(Strides::new(&s, Layout::RowMajor).as_slice(), &[12, 4, 1]);
        assert_eq!(Strides::new(&s, Layout::ColumnMajor).as_slice(), &[1, 2, 6]);
    }

    #[test]
    fn indices_run_last_axis_fastest() {
        let all: Vec<_> = Shape::from((2, 2)).indices().collect();
        assert_eq!(all, vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![2, 2]]);
        assert_eq!(Shape::empty().indices().count(), 0);
    }

    #[test]
    #[should_panic(expected = "cannot change")]
    fn change_rejects_other_volume() {
        Shape::from((2, 3)).change((4, 2));
    }

    proptest! {
        #[test]
        fn offsets_cover_storage_once(
            dims in prop::collection::vec(1usize..5, 1..4),
            column_major in any::<bool>(),
        ) {
            let shape = Shape::from(dims);
            let layout = if column_major { Layout::ColumnMajor } else { Layout::RowMajor };
            let strides = Strides::new(&shape, layout);
            let mut seen = vec![false; shape.volume()];
            for index in shape.indices() {
                let offset = strides.offset(&index);
                prop_assert!(!seen[offset]);
                seen[offset] = true;
            }
            prop_assert!(seen.into_iter().all(|s| s));
        }
    }
}
