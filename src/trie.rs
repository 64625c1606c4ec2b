use std::collections::BTreeMap;

use tracing::warn;

use crate::error::TrieError;
use crate::iter::Iter;
use crate::word::Word;
use crate::TRIE_LOG_TARGET;

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V>
where
    K: Word,
{
    // Stored key and value travel together; a node with children and a
    // terminal pair is both an interior node and a stored key.
    pub(crate) terminal: Option<(K, V)>,
    pub(crate) children: BTreeMap<K::Symbol, Node<K, V>>,
}

impl<K, V> Node<K, V>
where
    K: Word,
{
    fn new() -> Self {
        Self {
            terminal: None,
            children: BTreeMap::new(),
        }
    }

    // Returns the removed value and whether this node is now empty and
    // should be pruned by its parent. Unwinding the recursion walks the
    // path in reverse, so pruning stops at the first node that still
    // has children or its own terminal pair.
    fn remove(&mut self, symbols: &[K::Symbol]) -> Option<(V, bool)> {
        match symbols.split_first() {
            None => {
                let (_, value) = self.terminal.take()?;
                Some((value, self.children.is_empty()))
            }
            Some((symbol, rest)) => {
                let child = self.children.get_mut(symbol)?;
                let (value, prune) = child.remove(rest)?;
                if prune {
                    self.children.remove(symbol);
                }
                Some((value, self.terminal.is_none() && self.children.is_empty()))
            }
        }
    }

    fn count(&self) -> usize {
        self.children.values().map(|child| 1 + child.count()).sum()
    }

    fn shadowing<'a>(&'a self, found: &mut Vec<Shadowing<'a, K>>) {
        if let Some((key, _)) = self.terminal.as_ref() {
            if !self.children.is_empty() {
                let shadowed = self
                    .children
                    .values()
                    .flat_map(Iter::new)
                    .map(|(key, _)| key)
                    .collect();
                found.push(Shadowing { key, shadowed });
            }
        }
        for child in self.children.values() {
            child.shadowing(found);
        }
    }
}

/// Result of [`Trie::lookup`]: the key matched a stored key exactly,
/// matched nothing, or is a strict prefix of one or more stored keys.
#[derive(Debug)]
pub enum Match<'a, K, V>
where
    K: Word,
{
    None,
    Full(&'a V),
    Partial(Iter<'a, K, V>),
}

/// A stored key whose terminal node still has children: longest-match
/// dispatch stops there and the longer keys below it are unreachable.
#[derive(Debug)]
pub struct Shadowing<'a, K> {
    pub key: &'a K,
    pub shadowed: Vec<&'a K>,
}

/// Prefix tree owning one node per distinct key prefix. The empty
/// symbol sequence is a legal key and denotes the root.
#[derive(Debug, Clone)]
pub struct Trie<K, V>
where
    K: Word,
{
    root: Node<K, V>,
    len: usize,
}

impl<K, V> Trie<K, V>
where
    K: Word,
{
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes below the root. Deleting every key brings
    /// this back to zero.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Stores `value` under `key`, returning the displaced value if the
    /// exact key was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for symbol in key.symbols() {
            node = node.children.entry(symbol).or_insert_with(Node::new);
        }
        let displaced = node.terminal.replace((key, value)).map(|(_, value)| value);
        if displaced.is_none() {
            self.len += 1;
        }
        displaced
    }

    /// Exact-match accessor; `None` for missing or merely-prefix keys.
    pub fn get(&self, key: &K) -> Option<&V> {
        let node = self.descend(&key.symbols())?;
        node.terminal.as_ref().map(|(_, value)| value)
    }

    /// Walks `key` one symbol at a time. A stored key wins outright even
    /// when longer keys continue below it; a non-terminal node yields the
    /// completions stored at or below it, lazily and afresh per call.
    pub fn lookup(&self, key: &K) -> Match<'_, K, V> {
        match self.descend(&key.symbols()) {
            None => Match::None,
            Some(node) => match node.terminal.as_ref() {
                Some((_, value)) => Match::Full(value),
                None => Match::Partial(Iter::new(node)),
            },
        }
    }

    /// True iff `key` is a stored key or a prefix of one, i.e. iff
    /// [`Trie::lookup`] would not return [`Match::None`].
    pub fn contains(&self, key: &K) -> bool {
        self.descend(&key.symbols()).is_some()
    }

    /// Removes the exact key `key`, returning its value. Fails with
    /// [`TrieError::KeyNotFound`] unless the key was inserted exactly as
    /// given; deleting a mere prefix of stored keys is an error. Nodes
    /// left empty by the removal are pruned.
    pub fn remove(&mut self, key: &K) -> Result<V, TrieError> {
        let symbols = key.symbols();
        let (value, _) = self
            .root
            .remove(&symbols)
            .ok_or_else(|| TrieError::KeyNotFound(format!("{:?}", key)))?;
        self.len -= 1;
        Ok(value)
    }

    /// Enumerates every stored pair exactly once, in ascending symbol
    /// order, shorter keys before their extensions.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root)
    }

    /// Every stored key whose node still has children, with the longer
    /// keys it hides from longest-match dispatch. A node being reported
    /// does not stop the walk below it.
    pub fn shadowing(&self) -> Vec<Shadowing<'_, K>> {
        let mut found = Vec::new();
        self.root.shadowing(&mut found);
        found
    }

    /// Logs one warning per [`Trie::shadowing`] finding. Advisory only.
    pub fn check(&self) {
        for finding in self.shadowing() {
            warn!(
                target: TRIE_LOG_TARGET,
                key = ?finding.key,
                shadowed = ?finding.shadowed,
                "stored key shadows longer keys"
            );
        }
    }

    fn descend(&self, symbols: &[K::Symbol]) -> Option<&Node<K, V>> {
        let mut node = &self.root;
        for symbol in symbols {
            node = node.children.get(symbol)?;
        }
        Some(node)
    }
}

impl<K, V> Default for Trie<K, V>
where
    K: Word,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for Trie<K, V>
where
    K: Word,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Trie<K, V>
where
    K: Word,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        let mut trie = Self::new();
        trie.extend(entries);
        trie
    }
}

impl<'a, K, V> IntoIterator for &'a Trie<K, V>
where
    K: Word,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
