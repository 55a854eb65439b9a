use geo::GeoFloat;

use super::Event;
use crate::geom::vert_leq;

#[derive(Debug, Clone)]
struct HandleElem<T: GeoFloat, K> {
    key: Option<Event<T, K>>,
    /// Position in `nodes` while queued, next free handle otherwise.
    node: usize,
}

/// Binary min-heap with stable handles.
///
/// `nodes[1..=size]` is the heap proper and holds handles;
/// `handles[h].node` is the inverse mapping. Freed handles are chained
/// through their `node` field, with `0` ending the list.
#[derive(Debug, Clone)]
pub(super) struct Heap<T: GeoFloat, K> {
    nodes: Vec<usize>,
    handles: Vec<HandleElem<T, K>>,
    size: usize,
    free_list: usize,
}

impl<T: GeoFloat, K: Copy> Heap<T, K> {
    pub fn new() -> Self {
        Heap {
            nodes: vec![0],
            handles: vec![HandleElem { key: None, node: 0 }],
            size: 0,
            free_list: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn event(&self, handle: usize) -> &Event<T, K> {
        self.handles[handle]
            .key
            .as_ref()
            .expect("heap: handle without key")
    }

    fn leq(&self, a: usize, b: usize) -> bool {
        vert_leq(self.event(a).point, self.event(b).point)
    }

    fn float_down(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        loop {
            let mut child = curr << 1;
            if child < self.size && self.leq(self.nodes[child + 1], self.nodes[child]) {
                child += 1;
            }
            if child > self.size || self.leq(h_curr, self.nodes[child]) {
                self.nodes[curr] = h_curr;
                self.handles[h_curr].node = curr;
                break;
            }
            let h_child = self.nodes[child];
            self.nodes[curr] = h_child;
            self.handles[h_child].node = curr;
            curr = child;
        }
    }

    fn float_up(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        loop {
            let parent = curr >> 1;
            if parent == 0 || self.leq(self.nodes[parent], h_curr) {
                self.nodes[curr] = h_curr;
                self.handles[h_curr].node = curr;
                break;
            }
            let h_parent = self.nodes[parent];
            self.nodes[curr] = h_parent;
            self.handles[h_parent].node = curr;
            curr = parent;
        }
    }

    pub fn insert(&mut self, event: Event<T, K>) -> usize {
        self.size += 1;
        let curr = self.size;
        if curr == self.nodes.len() {
            self.nodes.push(0);
        }

        let free = if self.free_list == 0 {
            self.handles.push(HandleElem { key: None, node: 0 });
            self.handles.len() - 1
        } else {
            let free = self.free_list;
            self.free_list = self.handles[free].node;
            free
        };

        self.nodes[curr] = free;
        self.handles[free] = HandleElem {
            key: Some(event),
            node: curr,
        };
        self.float_up(curr);
        free
    }

    pub fn minimum(&self) -> Option<&Event<T, K>> {
        if self.size == 0 {
            return None;
        }
        self.handles[self.nodes[1]].key.as_ref()
    }

    pub fn extract_min(&mut self) -> Option<Event<T, K>> {
        if self.size == 0 {
            return None;
        }
        let h_min = self.nodes[1];
        let min = self.handles[h_min].key.take();

        self.nodes[1] = self.nodes[self.size];
        let h_first = self.nodes[1];
        self.handles[h_first].node = 1;

        self.handles[h_min].node = self.free_list;
        self.free_list = h_min;

        self.size -= 1;
        if self.size > 0 {
            self.float_down(1);
        }
        min
    }

    /// Panics if `h_curr` is not a queued handle.
    pub fn remove(&mut self, h_curr: usize) {
        assert!(
            h_curr >= 1 && h_curr < self.handles.len() && self.handles[h_curr].key.is_some(),
            "heap: invalid handle {h_curr}"
        );
        let curr = self.handles[h_curr].node;
        self.nodes[curr] = self.nodes[self.size];
        let h_moved = self.nodes[curr];
        self.handles[h_moved].node = curr;

        self.size -= 1;
        if curr <= self.size {
            if curr <= 1 || self.leq(self.nodes[curr >> 1], self.nodes[curr]) {
                self.float_down(curr);
            } else {
                self.float_up(curr);
            }
        }

        self.handles[h_curr].key = None;
        self.handles[h_curr].node = self.free_list;
        self.free_list = h_curr;
    }
}
