//! Ordered dictionary of active regions.
//!
//! A circular doubly linked list with a head node holding no key. The
//! sweep's ordering of regions is only meaningful relative to the
//! current event, and the list is kept sorted by inserting new regions
//! next to a known neighbour, so lookups are linear walks. In practice
//! the walks are short: insertions start from a hint and the dictionary
//! holds only the edges crossing the sweep line.
use slab::Slab;

#[derive(Debug, Clone)]
struct Node<K> {
    key: Option<K>,
    prev: usize,
    next: usize,
}

/// Handle to a dictionary node.
pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
pub(crate) struct Dict<K> {
    nodes: Slab<Node<K>>,
    head: NodeId,
}

impl<K: Copy> Dict<K> {
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let entry = nodes.vacant_entry();
        let head = entry.key();
        entry.insert(Node {
            key: None,
            prev: head,
            next: head,
        });
        Dict { nodes, head }
    }

    /// Get the key of a node; `None` for the head.
    #[must_use]
    pub fn key(&self, node: NodeId) -> Option<K> {
        self.nodes[node].key
    }

    #[must_use]
    pub fn next(&self, node: NodeId) -> NodeId {
        self.nodes[node].next
    }

    #[must_use]
    pub fn prev(&self, node: NodeId) -> NodeId {
        self.nodes[node].prev
    }

    /// Smallest key.
    #[must_use]
    pub fn min(&self) -> Option<K> {
        self.key(self.next(self.head))
    }

    /// Insert `key` at the largest position.
    pub fn insert<F: FnMut(K, K) -> bool>(&mut self, key: K, leq: F) -> NodeId {
        self.insert_before(self.head, key, leq)
    }

    /// Insert `key` walking down from `node`: the new node goes right
    /// after the first predecessor whose key is `leq` to `key`.
    pub fn insert_before<F: FnMut(K, K) -> bool>(
        &mut self,
        mut node: NodeId,
        key: K,
        mut leq: F,
    ) -> NodeId {
        loop {
            node = self.prev(node);
            match self.key(node) {
                Some(k) if !leq(k, key) => continue,
                _ => break,
            }
        }

        let next = self.next(node);
        let new_node = self.nodes.insert(Node {
            key: Some(key),
            prev: node,
            next,
        });
        self.nodes[next].prev = new_node;
        self.nodes[node].next = new_node;
        new_node
    }

    /// First node, walking up from the smallest, whose key `k` has
    /// `probe_leq(k)`. Returns the head if there is none.
    pub fn find<F: FnMut(K) -> bool>(&self, mut probe_leq: F) -> NodeId {
        let mut node = self.head;
        loop {
            node = self.next(node);
            match self.key(node) {
                Some(k) if !probe_leq(k) => continue,
                _ => return node,
            }
        }
    }

    pub fn remove(&mut self, node: NodeId) {
        assert_ne!(node, self.head, "dict: removing the head");
        let Node { prev, next, .. } = self.nodes.remove(node);
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
    }

    /// Number of keyed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }
}
