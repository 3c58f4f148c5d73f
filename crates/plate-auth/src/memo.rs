//! Single-entry memo used by the profile resolver.

/// One-entry cache with an explicit invalidation key.
///
/// The slot tracks the key it was last asked about. Asking about a different
/// key (including `None`) empties it, and a value is only stored while its key
/// is still the observed one, so a late writer for an old key can never
/// repopulate the slot.
#[derive(Debug, Clone)]
pub struct SingleSlot<K, V> {
    key: Option<K>,
    value: Option<V>,
}

impl<K, V> Default for SingleSlot<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            value: None,
        }
    }
}

impl<K: PartialEq + Clone, V: Clone> SingleSlot<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` the current key and return the cached value for it, if any.
    pub fn observe(&mut self, key: Option<&K>) -> Option<V> {
        if self.key.as_ref() != key {
            self.key = key.cloned();
            self.value = None;
            return None;
        }
        self.value.clone()
    }

    /// Store `value` under `key` if `key` is still current.
    pub fn store(&mut self, key: &K, value: V) -> bool {
        if self.key.as_ref() != Some(key) {
            return false;
        }
        self.value = Some(value);
        true
    }

    /// Drop the cached value but keep the current key.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Forget both key and value.
    pub fn reset(&mut self) {
        self.key = None;
        self.value = None;
    }

    #[cfg(test)]
    const fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    #[cfg(test)]
    const fn is_filled(&self) -> bool {
        self.value.is_some()
    }
}
