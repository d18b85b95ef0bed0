//! Recency List Module
//!
//! Doubly linked list of cache entries ordered by recency, stored in a slab.
//!
//! Slots 0 and 1 hold the `head` and `tail` sentinels. Every live entry sits
//! between them, most recently used first:
//!
//! ```text
//! [HEAD] <-> [MRU] <-> ... <-> [LRU] <-> [TAIL]
//! ```
//!
//! Links are slab indices rather than pointers, so relinking stays O(1)
//! without any aliasing between nodes. Removed slots go on a free list and
//! are reused by later inserts.

use crate::cache::CacheEntry;

const HEAD: usize = 0;
const TAIL: usize = 1;

// == Node Handle ==
/// Stable handle to an entry linked in a [`RecencyList`].
///
/// Handles are non-owning: the list owns the entry, the handle only says
/// where to find it. A handle is valid until its entry is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K, V> {
    /// None for sentinels and vacant slots
    entry: Option<CacheEntry<K, V>>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }
}

// == Recency List ==
/// Sentinel-bounded doubly linked list that owns every live entry.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    nodes: Vec<Node<K, V>>,
    /// Vacant slots available for reuse
    free: Vec<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates an empty list holding only its sentinels.
    ///
    /// The slab grows with use, so a large capacity bound costs nothing
    /// up front.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(HEAD, TAIL), Node::sentinel(HEAD, TAIL)],
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Links a new entry right after `head` and returns its handle.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> NodeId {
        let node = Node {
            entry: Some(entry),
            prev: HEAD,
            next: HEAD,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Relinks an existing entry right after `head`.
    ///
    /// Stale handles are ignored.
    pub fn move_to_front(&mut self, id: NodeId) {
        if !self.is_live(id) || self.nodes[HEAD].next == id.0 {
            return;
        }
        self.unlink(id.0);
        self.link_front(id.0);
    }

    // == Remove ==
    /// Unlinks an entry, frees its slot and hands the entry back.
    pub fn remove(&mut self, id: NodeId) -> Option<CacheEntry<K, V>> {
        if !self.is_live(id) {
            return None;
        }
        self.unlink(id.0);
        self.free.push(id.0);
        self.len -= 1;
        self.nodes[id.0].entry.take()
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let last = self.nodes[TAIL].prev;
        if last == HEAD {
            return None;
        }
        self.remove(NodeId(last))
    }

    // == Back ==
    /// Returns the least recently used entry without removing it.
    #[cfg(test)]
    fn back(&self) -> Option<&CacheEntry<K, V>> {
        self.nodes[self.nodes[TAIL].prev].entry.as_ref()
    }

    // == Front ==
    /// Returns the most recently used entry without touching it.
    #[cfg(test)]
    fn front(&self) -> Option<&CacheEntry<K, V>> {
        self.nodes[self.nodes[HEAD].next].entry.as_ref()
    }

    // == Accessors ==
    pub fn get(&self, id: NodeId) -> Option<&CacheEntry<K, V>> {
        self.nodes.get(id.0).and_then(|node| node.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<K, V>> {
        self.nodes.get_mut(id.0).and_then(|node| node.entry.as_mut())
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every entry and resets the list to just its sentinels.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
        self.len = 0;
    }

    // == Iterate ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> RecencyIter<'_, K, V> {
        RecencyIter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
        }
    }

    fn is_live(&self, id: NodeId) -> bool {
        id.0 > TAIL
            && self
                .nodes
                .get(id.0)
                .is_some_and(|node| node.entry.is_some())
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Iterator over entries from most to least recently used.
pub struct RecencyIter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
}

impl<'a, K, V> Iterator for RecencyIter<'a, K, V> {
    type Item = &'a CacheEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref()
    }
}
