//! Single-assignment result slot
//!
//! Background results cross threads only through a [`ResultSlot`]: the value
//! is replaced as a whole under a write lock, so a reader sees either the old
//! result or the new one, never a mix.

use parking_lot::RwLock;

#[derive(Debug)]
pub struct ResultSlot<T> {
    // (version, value)
    inner: RwLock<(u64, Option<T>)>,
}

impl<T: Clone> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new((0, None)),
        }
    }

    /// Replace the stored value
    pub fn store(&self, value: T) {
        let mut inner = self.inner.write();
        *inner = (inner.0 + 1, Some(value));
    }

    /// Copy of the stored value
    pub fn load(&self) -> Option<T> {
        self.inner.read().1.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        *inner = (inner.0 + 1, None);
    }

    /// Number of stores and clears so far; lets a reader notice new results
    pub fn version(&self) -> u64 {
        self.inner.read().0
    }
}

impl<T: Clone> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
