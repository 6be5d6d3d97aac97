//! Reference-counted element storage shared between tensor views.
//!
//! A [`Space`] names a window `[offset, offset + len)` inside one shared
//! allocation. Several tensors may hold spaces into the same allocation; it is
//! released when the last handle drops.

use std::{
    cell::{Ref, RefCell, RefMut},
    ops::{Deref, DerefMut},
    rc::Rc,
};

use crate::{
    error::{Result, TensorError},
    storage::Storage,
};

/// A window into a shared allocation.
pub struct Space<T> {
    storage: Rc<RefCell<Storage<T>>>,
    offset: usize,
    len: usize,
}

impl<T> Clone for Space<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            offset: self.offset,
            len: self.len,
        }
    }
}

impl<T> std::fmt::Debug for Space<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Space")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

impl<T> Space<T> {
    fn whole(storage: Storage<T>) -> Self {
        let len = storage.len();
        Self {
            storage: Rc::new(RefCell::new(storage)),
            offset: 0,
            len,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live handles on the underlying allocation.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.storage)
    }

    /// `len` elements starting `offset` elements into this window.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if the window does not fit.
    pub fn sub(&self, offset: usize, len: usize) -> Result<Self> {
        if offset.checked_add(len).is_none_or(|end| end > self.len) {
            return Err(TensorError::OutOfRange {
                offset,
                len,
                available: self.len,
            });
        }
        Ok(Self {
            storage: Rc::clone(&self.storage),
            offset: self.offset + offset,
            len,
        })
    }

    /// `true` when both windows point into the same allocation.
    pub fn shares_storage(&self, other: &Space<T>) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    fn read(&self) -> Ref<'_, [T]> {
        let (offset, len) = (self.offset, self.len);
        Ref::map(self.storage.borrow(), |s| &s.as_slice()[offset..offset + len])
    }

    fn write(&self) -> RefMut<'_, [T]> {
        let (offset, len) = (self.offset, self.len);
        RefMut::map(self.storage.borrow_mut(), |s| {
            &mut s.as_mut_slice()[offset..offset + len]
        })
    }
}

/// Handle on a possibly shared window of elements, or on nothing.
pub struct SharedBuffer<T> {
    space: Option<Space<T>>,
}

impl<T> Default for SharedBuffer<T> {
    fn default() -> Self {
        Self { space: None }
    }
}

impl<T> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("space", &self.space)
            .finish()
    }
}

impl<T> SharedBuffer<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Takes sole ownership of `storage`; an empty storage yields an empty handle.
    pub fn from_storage(storage: Storage<T>) -> Self {
        if storage.is_empty() {
            return Self::empty();
        }
        Self {
            space: Some(Space::whole(storage)),
        }
    }

    /// Aliases `space`.
    pub fn attach(space: &Space<T>) -> Self {
        Self {
            space: Some(space.clone()),
        }
    }

    pub fn space(&self) -> Option<&Space<T>> {
        self.space.as_ref()
    }

    pub fn has_space(&self) -> bool {
        self.space.is_some()
    }

    pub fn len(&self) -> usize {
        self.space.as_ref().map_or(0, Space::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 0 when no space is attached.
    pub fn ref_count(&self) -> usize {
        self.space.as_ref().map_or(0, Space::ref_count)
    }

    /// `true` when nothing else observes these elements.
    pub fn is_independent(&self) -> bool {
        self.ref_count() <= 1
    }

    /// Drops this handle's reference.
    pub fn clear(&mut self) {
        self.space = None;
    }

    pub fn read(&self) -> ReadGuard<'_, T> {
        match &self.space {
            Some(space) => ReadGuard::Shared(space.read()),
            None => ReadGuard::Empty,
        }
    }

    pub fn write(&self) -> WriteGuard<'_, T> {
        match &self.space {
            Some(space) => WriteGuard::Shared(space.write()),
            None => WriteGuard::Empty,
        }
    }
}

impl<T: Clone> SharedBuffer<T> {
    /// Fresh private allocation of `len` copies of `value`.
    pub fn filled(len: usize, value: T) -> Self {
        if len == 0 {
            return Self::empty();
        }
        Self::from_storage(Storage::filled_with(len, value))
    }

    pub fn from_slice(values: &[T]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        Self::from_storage(Storage::from_slice(values))
    }

    /// Private copy of the viewed elements.
    pub fn deep_copy(&self) -> Self {
        Self::from_slice(&self.read())
    }

    /// Copies the viewed window into a private allocation when shared.
    pub fn ensure_independence(&mut self) {
        if !self.is_independent() {
            *self = self.deep_copy();
        }
    }
}

/// Read access to the elements of a [`SharedBuffer`].
pub enum ReadGuard<'a, T> {
    Empty,
    Shared(Ref<'a, [T]>),
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            ReadGuard::Empty => &[],
            ReadGuard::Shared(slice) => slice,
        }
    }
}

/// Write access to the elements of a [`SharedBuffer`].
pub enum WriteGuard<'a, T> {
    Empty,
    Shared(RefMut<'a, [T]>),
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match self {
            WriteGuard::Empty => &[],
            WriteGuard::Shared(slice) => slice,
        }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            WriteGuard::Empty => &mut [],
            WriteGuard::Shared(slice) => slice,
        }
    }
}
