//! Slot arena with generation-checked handles.
//!
//! The half-edge structure is a dense cyclic graph: vertices, faces and
//! half-edges all refer to each other. Instead of shared pointers, every
//! element lives in a [`Pool`] and is addressed by a [`Key`]. Freed slots
//! are reused, and each reuse bumps the slot's generation, so a key that
//! outlived its element is detected instead of silently aliasing the next
//! occupant.
use slab::Slab;
use std::{fmt, ops::Index, ops::IndexMut};

/// Handle to an element stored in a [`Pool`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    index: u32,
    generation: u32,
}

impl Key {
    /// A key that never refers to a live element.
    pub(crate) const DANGLING: Key = Key {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Get the slot index of the key.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Get the generation of the key.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Reusable-instance allocator backing the mesh and the sweep.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Slab<T>,
    generations: Vec<u32>,
    created: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Pool {
            slots: Slab::new(),
            generations: Vec::new(),
            created: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            slots: Slab::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            created: 0,
        }
    }

    /// Store the value built by `f`, which receives the key the value
    /// will live under. Elements that refer to themselves (a half-edge
    /// pair forming a loop) are constructed this way.
    pub fn insert_with<F: FnOnce(Key) -> T>(&mut self, f: F) -> Key {
        let entry = self.slots.vacant_entry();
        let index = entry.key();
        if index == self.generations.len() {
            self.generations.push(0);
        }
        let key = Key {
            index: u32::try_from(index).expect("pool: slot index exceeds u32"),
            generation: self.generations[index],
        };
        entry.insert(f(key));
        if index + 1 > self.created {
            self.created = index + 1;
        }
        key
    }

    pub fn insert(&mut self, value: T) -> Key {
        self.insert_with(|_| value)
    }

    /// Return the slot of `key` to the free list, yielding its value.
    ///
    /// Panics if the key is stale: releasing an element twice is an
    /// internal contradiction, never an input condition.
    pub fn repool(&mut self, key: Key) -> T {
        assert!(self.contains(key), "pool: repool of stale key {key:?}");
        let index = key.index();
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.slots.remove(index)
    }

    /// Check that `key` refers to a live element.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        let index = key.index();
        self.slots.contains(index) && self.generations[index] == key.generation
    }

    #[must_use]
    pub fn get(&self, key: Key) -> Option<&T> {
        if self.contains(key) {
            self.slots.get(key.index())
        } else {
            None
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        if self.contains(key) {
            self.slots.get_mut(key.index())
        } else {
            None
        }
    }

    /// Keys of all live elements, in slot order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.slots.iter().map(move |(index, _)| Key {
            index: index as u32,
            generation: self.generations[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, &T)> + '_ {
        self.slots.iter().map(move |(index, value)| {
            (
                Key {
                    index: index as u32,
                    generation: self.generations[index],
                },
                value,
            )
        })
    }

    /// Release every live element at once.
    ///
    /// All outstanding keys become stale; slots (and their generation
    /// counters) are kept for reuse.
    pub fn reset(&mut self) {
        for (index, _) in self.slots.iter() {
            self.generations[index] = self.generations[index].wrapping_add(1);
        }
        self.slots.clear();
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of distinct slots ever handed out.
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.created
    }
}

impl<T: Default> Pool<T> {
    /// Get a default-constructed instance, reusing a free slot if any.
    pub fn pull(&mut self) -> Key {
        self.insert_with(|_| T::default())
    }
}

impl<T> Index<Key> for Pool<T> {
    type Output = T;

    fn index(&self, key: Key) -> &T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("pool: access through stale key {key:?}"),
        }
    }
}

impl<T> IndexMut<Key> for Pool<T> {
    fn index_mut(&mut self, key: Key) -> &mut T {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("pool: access through stale key {key:?}"),
        }
    }
}
