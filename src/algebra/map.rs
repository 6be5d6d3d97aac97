use std::fmt::Display;

use super::Set;

/// Key/value pairs kept as parallel sequences with linear lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq, V: Clone> Map<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the value for `k`.
    pub fn add(&mut self, k: K, v: V) {
        match self.position(&k) {
            Some(i) => self.values[i - 1] = v,
            None => {
                self.keys.push(k);
                self.values.push(v);
            }
        }
    }

    /// 1-based position of `k`.
    pub fn position(&self, k: &K) -> Option<usize> {
        self.keys.iter().position(|x| x == k).map(|i| i + 1)
    }

    pub fn has(&self, k: &K) -> bool {
        self.position(k).is_some()
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.position(k).map(|i| &self.values[i - 1])
    }

    pub fn get_mut(&mut self, k: &K) -> Option<&mut V> {
        self.position(k).map(|i| &mut self.values[i - 1])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Key at 1-based position `i`.
    pub fn key_at(&self, i: usize) -> K {
        tensor_assert_index!(i >= 1 && i <= self.len(), "position {i} out of a map of {}", self.len());
        self.keys[i - 1]
    }

    /// Value at 1-based position `i`.
    pub fn value_at(&self, i: usize) -> &V {
        tensor_assert_index!(i >= 1 && i <= self.len(), "position {i} out of a map of {}", self.len());
        &self.values[i - 1]
    }

    /// Entries whose key is in `keys`, ordered as in `keys`.
    pub fn restrict_to(&self, keys: &Set<K>) -> Map<K, V> {
        let mut out = Map::new();
        for k in keys {
            if let Some(v) = self.get(k) {
                out.add(*k, v.clone());
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(&self.values)
    }
}

impl<K: Display, V: Display> Display for Map<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.keys.iter().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k} -> {v}")?;
        }
        write!(f, "}}")
    }
}
