//! LRU (Least Recently Used) engine
//!
//! Nodes live in an arena (`Vec`) and link to each other by index. Slots 0
//! and 1 are the head and tail sentinels: they never hold an entry, so
//! attach/detach never has to special-case the ends of the list.
//!
//! ```text
//!   HEAD <-> [MRU] <-> ... <-> [LRU] <-> TAIL
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Upper bound on slots reserved up front; larger caches grow on demand
const MAX_PREALLOC: usize = 4096;

/// Node in the recency list
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

/// Fixed-capacity map that evicts the least recently used entry
pub struct LruEngine<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruEngine<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an engine holding at most `capacity` entries.
    ///
    /// A capacity of 0 is allowed; such an engine never retains anything.
    pub fn new(capacity: usize) -> Self {
        let reserve = capacity.min(MAX_PREALLOC);
        let mut nodes = Vec::with_capacity(reserve + 2);
        nodes.push(Node::sentinel());
        nodes.push(Node::sentinel());

        Self {
            map: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
            nodes,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Get a value and mark it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].entry.as_ref().map(|(_, value)| value)
    }

    /// Get a value without touching recency order
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|(_, value)| value)
    }

    /// Check if a key is cached, without touching recency order
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or overwrite a key as the most recently used entry.
    ///
    /// An existing entry for `key` is dropped first so it does not count
    /// against capacity. Returns the entry evicted to make room, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(idx) = self.map.remove(&key) {
            self.detach(idx);
            self.release(idx);
        }

        if self.capacity == 0 {
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.alloc(key.clone(), value);
        self.attach_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    /// Remove a key, returning its value if it was cached
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        self.detach(idx);
        self.release(idx).map(|(_, value)| value)
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }

        self.detach(idx);
        let (key, value) = self.release(idx)?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Change the capacity, evicting from the LRU end until the new bound
    /// holds. Evicted entries are returned oldest first.
    pub fn resize(&mut self, capacity: usize) -> Vec<(K, V)> {
        self.capacity = capacity;

        let mut evicted = Vec::new();
        while self.map.len() > capacity {
            match self.pop_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD] = Node::sentinel();
        self.nodes[TAIL] = Node::sentinel();
        self.free_list.clear();
    }

    /// Iterate entries from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
        }
    }

    /// Iterate keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn attach_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn alloc(&mut self, key: K, value: V) -> usize {
        let node = Node {
            entry: Some((key, value)),
            prev: HEAD,
            next: TAIL,
        };

        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        self.free_list.push(idx);
        self.nodes[idx].entry.take()
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        use std::collections::HashSet;

        assert!(self.map.len() <= self.capacity, "size exceeds capacity");
        assert!(self.nodes[HEAD].entry.is_none() && self.nodes[TAIL].entry.is_none());

        let mut seen = HashSet::new();
        let mut prev = HEAD;
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            let node = &self.nodes[cursor];
            assert_eq!(node.prev, prev, "broken back link at {}", cursor);
            let (key, _) = node.entry.as_ref().expect("linked node without entry");
            assert!(seen.insert(cursor), "cycle at {}", cursor);
            assert_eq!(self.map.get(key), Some(&cursor), "map and list disagree");
            prev = cursor;
            cursor = node.next;
        }
        assert_eq!(self.nodes[TAIL].prev, prev);
        assert_eq!(seen.len(), self.map.len(), "map and list sizes differ");
    }
}

/// Iterator over entries in recency order, see [`LruEngine::iter`]
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let nodes: &'a [Node<K, V>] = self.nodes;
        let node = &nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref().map(|(key, value)| (key, value))
    }
}
