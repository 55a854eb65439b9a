//! Two-phase event queue.
//!
//! The sweep knows most of its events up front: every input vertex.
//! Those are collected in a flat buffer and sorted once by [`init`].
//! Events discovered during the sweep (edge intersections) go into a
//! binary heap instead. [`extract_min`] merges the two transparently by
//! comparing the heap minimum with the next unconsumed sorted entry.
//!
//! [`init`]: EventQueue::init
//! [`extract_min`]: EventQueue::extract_min
use geo::GeoFloat;
use log::trace;
use smallvec::SmallVec;

use crate::geom::{vert_leq, SweepPoint};

mod heap;
use heap::Heap;

/// Locates a queued event so that it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueHandle {
    /// Inserted before [`EventQueue::init`]: index into the sort buffer.
    Sorted(usize),
    /// Inserted after [`EventQueue::init`]: heap handle.
    Heap(usize),
}

/// An entry of the queue: the key is ordered by its point.
#[derive(Debug, Clone, Copy)]
pub struct Event<T: GeoFloat, K> {
    pub point: SweepPoint<T>,
    pub key: K,
}

/// Partitions at most this long are finished with insertion sort.
const INSERTION_SORT_THRESHOLD: isize = 10;

#[derive(Debug, Clone)]
pub struct EventQueue<T: GeoFloat, K: Copy> {
    keys: Vec<Option<Event<T, K>>>,
    /// Indices into `keys`, sorted in decreasing order so that the
    /// minimum is at the end.
    order: Vec<usize>,
    /// Number of `order` entries not yet consumed.
    size: usize,
    heap: Heap<T, K>,
    initialized: bool,
}

impl<T: GeoFloat, K: Copy> Default for EventQueue<T, K> {
    fn default() -> Self {
        EventQueue::with_capacity(0)
    }
}

impl<T: GeoFloat, K: Copy> EventQueue<T, K> {
    pub fn with_capacity(capacity: usize) -> Self {
        EventQueue {
            keys: Vec::with_capacity(capacity),
            order: Vec::new(),
            size: 0,
            heap: Heap::new(),
            initialized: false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.heap.is_empty()
    }

    /// Queue `key` at `point`.
    pub fn insert(&mut self, point: SweepPoint<T>, key: K) -> QueueHandle {
        let event = Event { point, key };
        if self.initialized {
            return QueueHandle::Heap(self.heap.insert(event));
        }
        let curr = self.keys.len();
        self.keys.push(Some(event));
        self.size = self.keys.len();
        QueueHandle::Sorted(curr)
    }

    /// Sort the events inserted so far and switch to heap insertion.
    ///
    /// Quicksort with a pseudo-random pivot; the generator is seeded
    /// with a constant so that runs are reproducible.
    pub fn init(&mut self) {
        let n = self.keys.len();
        self.order = (0..n).collect();
        if n > 1 {
            sort_decreasing(&self.keys, &mut self.order);
        }
        debug_assert!(self
            .order
            .windows(2)
            .all(|w| leq(&self.keys, w[1], w[0])));
        self.size = n;
        self.initialized = true;
        trace!("event queue: sorted {n} events");
    }

    fn last_sorted(&self) -> Option<&Event<T, K>> {
        if self.size == 0 {
            return None;
        }
        self.keys[self.order[self.size - 1]].as_ref()
    }

    /// Remove and return the smallest key.
    pub fn extract_min(&mut self) -> Option<K> {
        assert!(self.initialized, "event queue: extract_min before init");
        let sort_min = match self.last_sorted() {
            Some(ev) => *ev,
            None => return self.heap.extract_min().map(|ev| ev.key),
        };
        if let Some(heap_min) = self.heap.minimum() {
            if vert_leq(heap_min.point, sort_min.point) {
                return self.heap.extract_min().map(|ev| ev.key);
            }
        }
        loop {
            self.size -= 1;
            if self.size == 0 || self.keys[self.order[self.size - 1]].is_some() {
                break;
            }
        }
        Some(sort_min.key)
    }

    /// The smallest key, without removing it.
    #[must_use]
    pub fn minimum(&self) -> Option<K> {
        assert!(self.initialized, "event queue: minimum before init");
        let sort_min = match self.last_sorted() {
            Some(ev) => ev,
            None => return self.heap.minimum().map(|ev| ev.key),
        };
        if let Some(heap_min) = self.heap.minimum() {
            if vert_leq(heap_min.point, sort_min.point) {
                return Some(heap_min.key);
            }
        }
        Some(sort_min.key)
    }

    /// Cancel a queued event.
    ///
    /// Panics if the handle does not refer to a queued event.
    pub fn remove(&mut self, handle: QueueHandle) {
        assert!(self.initialized, "event queue: remove before init");
        match handle {
            QueueHandle::Heap(h) => self.heap.remove(h),
            QueueHandle::Sorted(curr) => {
                assert!(
                    curr < self.keys.len() && self.keys[curr].is_some(),
                    "event queue: invalid handle {handle:?}"
                );
                self.keys[curr] = None;
                while self.size > 0 && self.keys[self.order[self.size - 1]].is_none() {
                    self.size -= 1;
                }
            }
        }
    }
}

#[inline]
fn leq<T: GeoFloat, K>(keys: &[Option<Event<T, K>>], a: usize, b: usize) -> bool {
    match (&keys[a], &keys[b]) {
        (Some(a), Some(b)) => vert_leq(a.point, b.point),
        _ => unreachable!("event queue: sorting a removed event"),
    }
}

/// Sort `order` so that `keys[order[i]]` is non-increasing.
fn sort_decreasing<T: GeoFloat, K>(keys: &[Option<Event<T, K>>], order: &mut [usize]) {
    let mut seed: u32 = 2016473283;
    let mut stack: SmallVec<[(isize, isize); 32]> = SmallVec::new();
    stack.push((0, order.len() as isize - 1));

    while let Some((mut p, mut r)) = stack.pop() {
        while r > p + INSERTION_SORT_THRESHOLD {
            seed = seed.wrapping_mul(1539415821).wrapping_add(1);
            let i = p + (seed % (r - p + 1) as u32) as isize;
            let piv = order[i as usize];
            order.swap(i as usize, p as usize);

            let mut i = p - 1;
            let mut j = r + 1;
            loop {
                loop {
                    i += 1;
                    if leq(keys, order[i as usize], piv) {
                        break;
                    }
                }
                loop {
                    j -= 1;
                    if leq(keys, piv, order[j as usize]) {
                        break;
                    }
                }
                order.swap(i as usize, j as usize);
                if i >= j {
                    break;
                }
            }
            // Undo the last swap.
            order.swap(i as usize, j as usize);

            // Recurse on the smaller side later; loop on the larger one.
            if i - p < r - j {
                stack.push((j + 1, r));
                r = i - 1;
            } else {
                stack.push((p, i - 1));
                p = j + 1;
            }
        }

        // Insertion sort the small partition.
        let mut i = p + 1;
        while i <= r {
            let piv = order[i as usize];
            let mut j = i;
            while j > p && !leq(keys, piv, order[(j - 1) as usize]) {
                order[j as usize] = order[(j - 1) as usize];
                j -= 1;
            }
            order[j as usize] = piv;
            i += 1;
        }
    }
}
