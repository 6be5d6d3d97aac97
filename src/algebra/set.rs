use std::fmt::Display;

/// Insertion-ordered collection without duplicates, addressed from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T> {
    items: Vec<T>,
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy + PartialEq> Set<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `x` unless already present.
    pub fn add(&mut self, x: T) {
        if !self.contains(&x) {
            self.items.push(x);
        }
    }

    pub fn add_set(&mut self, other: &Set<T>) {
        for x in other {
            self.add(*x);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at 1-based position `i`.
    pub fn get(&self, i: usize) -> T {
        tensor_assert_index!(
            i >= 1 && i <= self.len(),
            "position {i} out of a set of {}",
            self.len()
        );
        self.items[i - 1]
    }

    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<T> {
        self.items.last().copied()
    }

    pub fn contains(&self, x: &T) -> bool {
        self.items.contains(x)
    }

    /// Members also in `other`, in this set's order.
    pub fn intersect(&self, other: &Set<T>) -> Set<T> {
        self.items
            .iter()
            .filter(|x| other.contains(x))
            .copied()
            .collect()
    }

    /// Members not in `other`, in this set's order.
    pub fn difference(&self, other: &Set<T>) -> Set<T> {
        self.items
            .iter()
            .filter(|x| !other.contains(x))
            .copied()
            .collect()
    }

    /// A copy without `x`.
    pub fn without(&self, x: T) -> Set<T> {
        self.items.iter().filter(|y| **y != x).copied().collect()
    }

    /// Same members regardless of order.
    pub fn is_equal(&self, other: &Set<T>) -> bool {
        self.len() == other.len() && self.items.iter().all(|x| other.contains(x))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Copy + Ord> Set<T> {
    pub fn sort(&mut self) {
        self.items.sort_unstable();
    }

    pub fn max(&self) -> Option<T> {
        self.items.iter().max().copied()
    }
}

impl<T: Copy + PartialEq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new();
        for x in iter {
            set.add(x);
        }
        set
    }
}

impl<T: Copy + PartialEq, const N: usize> From<[T; N]> for Set<T> {
    fn from(value: [T; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Display> Display for Set<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, x) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "}}")
    }
}
