// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A typed side-channel for ad hoc data shared between components.
//!
//! The host makes no assumption about who writes here or what is stored:
//! [`Items`] is an extension point, keyed by the stored value's type.
//! Components define their own newtypes so that unrelated entries never
//! collide.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Entry = Arc<dyn Any + Send + Sync>;

/// A type-map of shared values, safe to read and write from any thread.
///
/// Values are stored as `Arc<T>` so readers can keep them past the lock.
/// Writes are visible to every holder of the host.
///
/// # Example
///
/// ```rust
/// use servhost_core::Items;
///
/// struct RequestBudget(u32);
///
/// let items = Items::new();
/// items.insert(RequestBudget(64));
///
/// let budget = items.get::<RequestBudget>().unwrap();
/// assert_eq!(budget.0, 64);
/// ```
#[derive(Default)]
pub struct Items {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Items {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `value` under `T`'s type, returning the previous value if any.
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) -> Option<Arc<T>> {
        self.insert_arc(Arc::new(value))
    }

    /// Stores an already shared value under `T`'s type.
    pub fn insert_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Option<Arc<T>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .insert(TypeId::of::<T>(), value)
            .and_then(|previous| previous.downcast::<T>().ok())
    }

    /// Returns the value stored under `T`'s type.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Removes and returns the value stored under `T`'s type.
    pub fn remove<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Returns `true` if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Items").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Region {
        name: String,
    }

    struct Shard(u16);

    #[test]
    fn test_insert_and_get() {
        let items = Items::new();
        items.insert(Region {
            name: "eu-west".to_string(),
        });

        let region = items.get::<Region>().unwrap();
        assert_eq!(region.name, "eu-west");
    }

    #[test]
    fn test_get_missing_returns_none() {
        let items = Items::new();
        assert!(items.get::<Region>().is_none());
        assert!(!items.contains::<Region>());
    }

    #[test]
    fn test_replace_returns_previous() {
        let items = Items::new();
        assert!(items.insert(Shard(1)).is_none());

        let previous = items.insert(Shard(2)).unwrap();
        assert_eq!(previous.0, 1);
        assert_eq!(items.get::<Shard>().unwrap().0, 2);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_remove() {
        let items = Items::new();
        items.insert(Shard(7));
        items.insert(Region {
            name: "us".to_string(),
        });

        assert_eq!(items.remove::<Shard>().unwrap().0, 7);
        assert!(!items.contains::<Shard>());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_shared_arc_is_returned_as_is() {
        let items = Items::new();
        let shard = Arc::new(Shard(3));
        items.insert_arc(Arc::clone(&shard));

        assert!(Arc::ptr_eq(&shard, &items.get::<Shard>().unwrap()));
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Items::default().is_empty());
    }
}
