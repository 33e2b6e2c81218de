use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{GraphError, Result};

/// Union-find over arbitrary hashable identities.
///
/// Uses union by rank and path compression, so a sequence of `m`
/// operations over `n` elements runs in near-linear time.
#[derive(Debug, Clone)]
pub struct DisjointSet<T> {
    index: HashMap<T, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl<T> Default for DisjointSet<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            parent: Vec::new(),
            rank: Vec::new(),
            sets: 0,
        }
    }
}

impl<T: Hash + Eq + Clone + Debug> DisjointSet<T> {
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a forest with every element in its own set.
    pub fn with_elements(elements: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new();
        for element in elements {
            set.insert(element);
        }
        set
    }

    /// Adds `element` as a singleton set. Returns `false` if it was already present.
    pub fn insert(&mut self, element: T) -> bool {
        if self.index.contains_key(&element) {
            return false;
        }
        let slot = self.parent.len();
        self.index.insert(element, slot);
        self.parent.push(slot);
        self.rank.push(0);
        self.sets += 1;
        true
    }

    /// Representative slot of the set containing `element`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownElement`] if `element` was never inserted.
    pub fn find(&mut self, element: &T) -> Result<usize> {
        let slot = self.slot(element)?;
        Ok(self.root(slot))
    }

    /// Joins the sets of `a` and `b`. Returns `false` if they were already joined.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownElement`] if either element is unknown.
    pub fn merge(&mut self, a: &T, b: &T) -> Result<bool> {
        let ra = self.find(a)?;
        let rb = self.find(b)?;
        if ra == rb {
            return Ok(false);
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        self.sets -= 1;
        Ok(true)
    }

    /// Whether `a` and `b` belong to the same set.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownElement`] if either element is unknown.
    pub fn is_same_set(&mut self, a: &T, b: &T) -> Result<bool> {
        Ok(self.find(a)? == self.find(b)?)
    }

    /// Number of disjoint sets.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn slot(&self, element: &T) -> Result<usize> {
        self.index
            .get(element)
            .copied()
            .ok_or_else(|| GraphError::UnknownElement(format!("{element:?}")).into())
    }

    fn root(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }
}
