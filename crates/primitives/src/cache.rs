//! Lazily computed values
//!
//! Hashing a sealed transaction walks its whole serialization, so the
//! result is computed on first use and kept.

use std::sync::OnceLock;

/// A value computed at most once.
#[derive(Debug)]
pub(crate) struct OnceCache<T> {
    /// The cached value
    value: OnceLock<T>,
}

impl<T> OnceCache<T> {
    /// Create a new empty cache
    pub(crate) const fn new() -> Self {
        Self {
            value: OnceLock::new(),
        }
    }

    /// Get the cached value, computing it if necessary
    pub(crate) fn get_or_compute<F>(&self, compute_fn: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.value.get_or_init(compute_fn)
    }
}

impl<T> Default for OnceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for OnceCache<T> {
    fn clone(&self) -> Self {
        let cache = Self::new();
        if let Some(value) = self.value.get() {
            // A fresh cache is empty, so this cannot fail
            let _ = cache.value.set(value.clone());
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once() {
        let calls = Cell::new(0);
        let cache = OnceCache::new();

        assert_eq!(*cache.get_or_compute(|| {
            calls.set(calls.get() + 1);
            7
        }), 7);
        assert_eq!(*cache.get_or_compute(|| {
            calls.set(calls.get() + 1);
            8
        }), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_clone_keeps_value() {
        let cache = OnceCache::new();
        cache.get_or_compute(|| 3u8);
        let cloned = cache.clone();
        assert_eq!(*cloned.get_or_compute(|| 4), 3);
    }
}
