//! Insertion-ordered dictionary backing every dictionary body.

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Dictionary key: a name, or a positional index for value-only entries
/// such as directives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl Key {
    /// Returns the name if this is a `Name` key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }

    /// Returns `true` for positional keys.
    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

/// Ordered mapping from [`Key`] to [`Value`].
///
/// Re-assigning an existing key replaces the value in place; removal takes
/// the entry out of the order, so a later insert of the same key appends.
#[derive(Clone, Debug, Default)]
pub struct FoamDict {
    entries: Vec<(Key, Value)>,
    index: HashMap<Key, usize>,
}

impl FoamDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is bound.
    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.index.contains_key(&key.into())
    }

    /// Value bound to `key`.
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<&Value> {
        let slot = *self.index.get(&key.into())?;
        Some(&self.entries[slot].1)
    }

    /// Mutable value bound to `key`.
    pub fn get_mut<K: Into<Key>>(&mut self, key: K) -> Option<&mut Value> {
        let slot = *self.index.get(&key.into())?;
        Some(&mut self.entries[slot].1)
    }

    /// Bind `key` to `value`, returning the previous value. An existing key
    /// keeps its position.
    pub fn insert<K: Into<Key>>(&mut self, key: K, value: Value) -> Option<Value> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, returning its value.
    pub fn remove<K: Into<Key>>(&mut self, key: K) -> Option<Value> {
        let slot = self.index.remove(&key.into())?;
        let (_, value) = self.entries.remove(slot);
        for (k, _) in &self.entries[slot..] {
            if let Some(i) = self.index.get_mut(k) {
                *i -= 1;
            }
        }
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Entries in insertion order with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Smallest positional index larger than every positional key present.
    pub fn next_index(&self) -> usize {
        self.keys()
            .filter_map(|k| match k {
                Key::Index(i) => Some(i + 1),
                Key::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Append `value` under a fresh positional key and return that key.
    pub fn push_positional(&mut self, value: Value) -> Key {
        let key = Key::Index(self.next_index());
        self.insert(key.clone(), value);
        key
    }

    /// Entry addressed by one path segment: a name, or a positional index
    /// when no name matches and the segment is numeric.
    pub fn get_segment(&self, segment: &str) -> Option<&Value> {
        self.get(segment)
            .or_else(|| segment.parse::<usize>().ok().and_then(|i| self.get(Key::Index(i))))
    }

    /// Mutable variant of [`FoamDict::get_segment`].
    pub fn get_segment_mut(&mut self, segment: &str) -> Option<&mut Value> {
        if self.contains_key(segment) {
            return self.get_mut(segment);
        }
        let i = segment.parse::<usize>().ok()?;
        self.get_mut(Key::Index(i))
    }

    /// Descend through nested values by path segments.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        self.get_segment(first)?.get_path(rest)
    }

    /// Mutable variant of [`FoamDict::get_path`].
    pub fn get_path_mut(&mut self, path: &[&str]) -> Option<&mut Value> {
        let (first, rest) = path.split_first()?;
        self.get_segment_mut(first)?.get_path_mut(rest)
    }
}

/// Order-insensitive structural equality.
impl PartialEq for FoamDict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K: Into<Key>> FromIterator<(K, Value)> for FoamDict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = FoamDict::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<Key>> Extend<(K, Value)> for FoamDict {
    fn extend<I: IntoIterator<Item = (K, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for FoamDict {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
