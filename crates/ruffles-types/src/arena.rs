//! Ordered arena with stable handles.
//!
//! An [`OrderedArena`] is a doubly linked list whose nodes live in a
//! [`SlotMap`]. Handles returned by insertion stay valid across every other
//! insertion or removal; only removing an element invalidates its own handle.
//! Iteration follows list order, not storage order.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::{Key, SlotMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Link<K: Key, V> {
    value: V,
    prev: Option<K>,
    next: Option<K>,
}

/// A slot map threaded by an intrusive doubly linked list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedArena<K: Key, V> {
    nodes: SlotMap<K, Link<K, V>>,
    head: Option<K>,
    tail: Option<K>,
}

impl<K: Key, V> OrderedArena<K, V> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `key` refers to a live element.
    pub fn contains(&self, key: K) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.nodes.get(key).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.nodes.get_mut(key).map(|link| &mut link.value)
    }

    /// First element in list order.
    pub fn first(&self) -> Option<K> {
        self.head
    }

    /// Last element in list order.
    pub fn last(&self) -> Option<K> {
        self.tail
    }

    /// Successor of `key` in list order.
    pub fn next(&self, key: K) -> Option<K> {
        self.nodes.get(key).and_then(|link| link.next)
    }

    /// Predecessor of `key` in list order.
    pub fn prev(&self, key: K) -> Option<K> {
        self.nodes.get(key).and_then(|link| link.prev)
    }

    /// Appends `value` at the end of the list.
    pub fn push_back(&mut self, value: V) -> K {
        self.insert_before(None, value)
    }

    /// Inserts `value` right before `before`, or at the end when `before`
    /// is `None` or no longer live.
    pub fn insert_before(&mut self, before: Option<K>, value: V) -> K {
        let before = before.filter(|&k| self.nodes.contains_key(k));
        let prev = match before {
            Some(b) => self.nodes[b].prev,
            None => self.tail,
        };
        let key = self.nodes.insert(Link {
            value,
            prev,
            next: before,
        });
        match prev {
            Some(p) => self.nodes[p].next = Some(key),
            None => self.head = Some(key),
        }
        match before {
            Some(b) => self.nodes[b].prev = Some(key),
            None => self.tail = Some(key),
        }
        key
    }

    /// Inserts `value` right after `after`.
    pub fn insert_after(&mut self, after: K, value: V) -> K {
        let next = self.next(after);
        match next {
            Some(n) => self.insert_before(Some(n), value),
            None => self.push_back(value),
        }
    }

    /// Unlinks and returns the element behind `key`.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let link = self.nodes.remove(key)?;
        match link.prev {
            Some(p) => self.nodes[p].next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(n) => self.nodes[n].prev = link.prev,
            None => self.tail = link.prev,
        }
        Some(link.value)
    }

    /// Index of `key` in list order. Linear time.
    pub fn position(&self, key: K) -> Option<usize> {
        self.keys().position(|k| k == key)
    }

    /// Iterates `(handle, value)` pairs in list order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: self,
            cursor: self.head,
        }
    }

    /// Iterates handles in list order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates values in list order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Mutable access to every value, in storage order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.nodes.values_mut().map(|link| &mut link.value)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<K: Key, V> Default for OrderedArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V> Index<K> for OrderedArena<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        &self.nodes[key].value
    }
}

impl<K: Key, V> IndexMut<K> for OrderedArena<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.nodes[key].value
    }
}

/// List-order iterator over an [`OrderedArena`].
pub struct Iter<'a, K: Key, V> {
    arena: &'a OrderedArena<K, V>,
    cursor: Option<K>,
}

impl<'a, K: Key, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let link = self.arena.nodes.get(key)?;
        self.cursor = link.next;
        Some((key, &link.value))
    }
}

impl<'a, K: Key, V> IntoIterator for &'a OrderedArena<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
