//! Balanced ordered index backing lane lookups and snap-time queries.
//!
//! [`OrderedIndex`] is an AA-tree (Andersson): every node carries an
//! integer level, only a right child may share its parent's level, and
//! balance is restored with `skew` (right rotation) and `split` (left
//! rotation plus a level bump). This gives red-black-tree bounds with far
//! fewer rebalancing cases.

use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    level: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self { key, value, level: 1, left: None, right: None })
    }
}

/// Ordered associative map over any totally-ordered key.
///
/// Lookup misses are `None`, never errors; structural operations never
/// fail. Insert, remove, and every directional query are O(log n);
/// iteration is O(n).
#[derive(Debug)]
pub struct OrderedIndex<K, V> {
    root: Link<K, V>,
    len: usize,
}

// Not derived: the derive would bound `K: Default, V: Default`, which an
// empty tree has no use for.
impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

/// Right rotation when a left child shares its parent's level.
fn skew<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let level = node.level;
    if let Some(mut left) = node.left.take_if(|l| l.level == level) {
        node.left = left.right.take();
        left.right = Some(node);
        left
    } else {
        node
    }
}

/// Left rotation plus level bump when a right-right grandchild reaches its
/// grandparent's level.
fn split<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let too_tall = node
        .right
        .as_ref()
        .and_then(|r| r.right.as_ref())
        .is_some_and(|rr| rr.level == node.level);
    if !too_tall {
        return node;
    }
    let Some(mut right) = node.right.take() else {
        return node;
    };
    node.right = right.left.take();
    right.level += 1;
    right.left = Some(node);
    right
}

impl<K: Ord, V> OrderedIndex<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Greater => cur = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Insert if absent. Returns false (and drops `key`/`value`) when the
    /// key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let (root, inserted) = Self::insert_rec(self.root.take(), key, value);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    fn insert_rec(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, bool) {
        let Some(mut node) = link else {
            return (Node::leaf(key, value), true);
        };
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => {
                let (child, inserted) = Self::insert_rec(node.left.take(), key, value);
                node.left = Some(child);
                inserted
            }
            Ordering::Greater => {
                let (child, inserted) = Self::insert_rec(node.right.take(), key, value);
                node.right = Some(child);
                inserted
            }
            Ordering::Equal => false,
        };
        (split(skew(node)), inserted)
    }

    /// Remove if present, returning the value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (root, removed) = Self::remove_rec(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_rec(link: Link<K, V>, key: &K) -> (Link<K, V>, Option<V>) {
        let Some(mut node) = link else {
            return (None, None);
        };
        let removed = match key.cmp(&node.key) {
            Ordering::Less => {
                let (child, removed) = Self::remove_rec(node.left.take(), key);
                node.left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = Self::remove_rec(node.right.take(), key);
                node.right = child;
                removed
            }
            Ordering::Equal => {
                let unboxed = *node;
                let Node { key: _, value, level, left, right } = unboxed;
                match left {
                    // No left child: splice the right child up (this is the
                    // in-order-successor case collapsed to a single move).
                    None => return (right, Some(value)),
                    // Otherwise the in-order predecessor replaces the node.
                    Some(left) => {
                        let (rest, mut pred) = Self::take_max(left);
                        pred.left = rest;
                        pred.right = right;
                        pred.level = level;
                        node = pred;
                        Some(value)
                    }
                }
            }
        };
        (Some(Self::rebalance_after_remove(node)), removed)
    }

    /// Detach the maximum node of a subtree, rebalancing on the way out.
    fn take_max(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        match node.right.take() {
            None => (node.left.take(), node),
            Some(right) => {
                let (rest, max) = Self::take_max(right);
                node.right = rest;
                (Some(Self::rebalance_after_remove(node)), max)
            }
        }
    }

    /// The standard AA deletion fixup: drop the node's level to one above
    /// its shallower child, then skew/split the node, its right child, and
    /// its right-right grandchild.
    fn rebalance_after_remove(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let child_level = |link: &Link<K, V>| link.as_ref().map_or(0, |n| n.level);
        let target = 1 + child_level(&node.left).min(child_level(&node.right));
        if target < node.level {
            node.level = target;
            if let Some(right) = node.right.as_mut()
                && target < right.level
            {
                right.level = target;
            }
        }
        node = skew(node);
        if let Some(right) = node.right.take() {
            node.right = Some(skew(right));
        }
        if let Some(right) = node.right.as_mut()
            && let Some(rr) = right.right.take()
        {
            right.right = Some(skew(rr));
        }
        node = split(node);
        if let Some(right) = node.right.take() {
            node.right = Some(split(right));
        }
        node
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        let mut cur = self.root.as_deref()?;
        while let Some(left) = cur.left.as_deref() {
            cur = left;
        }
        Some((&cur.key, &cur.value))
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        let mut cur = self.root.as_deref()?;
        while let Some(right) = cur.right.as_deref() {
            cur = right;
        }
        Some((&cur.key, &cur.value))
    }

    /// The greatest entry strictly before `key`. One root-to-leaf walk,
    /// carrying the best candidate seen.
    pub fn entry_before(&self, key: &K) -> Option<(&K, &V)> {
        self.descend(|k| k < key, true)
    }

    /// The greatest entry at or before `key`.
    pub fn entry_at_or_before(&self, key: &K) -> Option<(&K, &V)> {
        self.descend(|k| k <= key, true)
    }

    /// The least entry strictly after `key`.
    pub fn entry_after(&self, key: &K) -> Option<(&K, &V)> {
        self.descend(|k| k > key, false)
    }

    /// The least entry at or after `key`.
    pub fn entry_at_or_after(&self, key: &K) -> Option<(&K, &V)> {
        self.descend(|k| k >= key, false)
    }

    /// Walk one path from the root. A node satisfying `candidate` becomes
    /// the best answer so far and the walk continues toward tighter
    /// candidates (right when hunting a predecessor, left for a
    /// successor); otherwise it continues the other way.
    fn descend(&self, candidate: impl Fn(&K) -> bool, predecessor: bool) -> Option<(&K, &V)> {
        let mut best = None;
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            if candidate(&node.key) {
                best = Some((&node.key, &node.value));
                cur = if predecessor { node.right.as_deref() } else { node.left.as_deref() };
            } else {
                cur = if predecessor { node.left.as_deref() } else { node.right.as_deref() };
            }
        }
        best
    }

    /// Pruned search guided by `classify`, which reports where the query
    /// region lies relative to a key: `Less` — entirely before it (only
    /// the left subtree can match), `Greater` — entirely after, `Equal` —
    /// the key matches. Returns the first match on a single root-to-leaf
    /// walk. Matching keys must form a contiguous key run, which the lane
    /// non-overlap invariant guarantees.
    pub fn find_match(&self, classify: impl Fn(&K) -> Ordering) -> Option<(&K, &V)> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match classify(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some((&node.key, &node.value)),
            }
        }
        None
    }

    /// Like [`OrderedIndex::find_match`] but visits every matching entry
    /// in key order, pruning subtrees the classifier rules out.
    pub fn visit_matches(
        &self,
        classify: impl Fn(&K) -> Ordering,
        visit: &mut impl FnMut(&K, &V),
    ) {
        Self::visit_rec(self.root.as_deref(), &classify, visit);
    }

    fn visit_rec(
        link: Option<&Node<K, V>>,
        classify: &impl Fn(&K) -> Ordering,
        visit: &mut impl FnMut(&K, &V),
    ) {
        let Some(node) = link else { return };
        match classify(&node.key) {
            Ordering::Less => Self::visit_rec(node.left.as_deref(), classify, visit),
            Ordering::Greater => Self::visit_rec(node.right.as_deref(), classify, visit),
            Ordering::Equal => {
                Self::visit_rec(node.left.as_deref(), classify, visit);
                visit(&node.key, &node.value);
                Self::visit_rec(node.right.as_deref(), classify, visit);
            }
        }
    }

    /// In-order iteration.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Reverse in-order iteration.
    pub fn iter_rev(&self) -> IterRev<'_, K, V> {
        let mut iter = IterRev { stack: Vec::new() };
        iter.push_right_spine(self.root.as_deref());
        iter
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

pub struct IterRev<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> IterRev<'a, K, V> {
    fn push_right_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.right.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for IterRev<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_right_spine(node.left.as_deref());
        Some((&node.key, &node.value))
    }
}
