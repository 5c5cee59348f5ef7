//! Key paths into a [`ConfigTree`](super::tree::ConfigTree) and ordered sets of them.
//!
//! Paths render and parse in dotted notation (`source.plugin_configuration.url`);
//! numeric segments without a leading zero become integer keys, so `01` stays
//! a map key and every path renders back to the text it was parsed from.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

/// One step of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Name(String),
    Index(usize),
}

impl PathKey {
    /// Reads one dotted segment or map key.
    pub fn from_segment(segment: &str) -> Self {
        let canonical_number = !segment.is_empty()
            && segment.bytes().all(|byte| byte.is_ascii_digit())
            && (segment == "0" || !segment.starts_with('0'));
        match segment.parse::<usize>() {
            Ok(index) if canonical_number => PathKey::Index(index),
            _ => PathKey::Name(segment.to_string()),
        }
    }

    /// Key used when this step addresses a map entry.
    pub fn map_key(&self) -> Cow<'_, str> {
        match self {
            PathKey::Name(name) => Cow::Borrowed(name.as_str()),
            PathKey::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Name(name) => f.write_str(name),
            PathKey::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(value: &str) -> Self {
        PathKey::Name(value.to_string())
    }
}

impl From<String> for PathKey {
    fn from(value: String) -> Self {
        PathKey::Name(value)
    }
}

impl From<usize> for PathKey {
    fn from(value: usize) -> Self {
        PathKey::Index(value)
    }
}

/// Immutable location inside a configuration tree, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConfigPath {
    keys: Vec<PathKey>,
}

impl ConfigPath {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<PathKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[PathKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns `self` followed by every key of `suffix`.
    pub fn join(&self, suffix: &ConfigPath) -> ConfigPath {
        let mut keys = Vec::with_capacity(self.keys.len() + suffix.keys.len());
        keys.extend(self.keys.iter().cloned());
        keys.extend(suffix.keys.iter().cloned());
        ConfigPath { keys }
    }

    /// Returns a new path with `key` appended.
    pub fn child(&self, key: impl Into<PathKey>) -> ConfigPath {
        let mut keys = self.keys.clone();
        keys.push(key.into());
        ConfigPath { keys }
    }

    /// Compares keys by how they address a map, so `Index(0)` matches `Name("0")`.
    pub fn starts_with(&self, prefix: &ConfigPath) -> bool {
        prefix.keys.len() <= self.keys.len()
            && prefix
                .keys
                .iter()
                .zip(&self.keys)
                .all(|(expected, actual)| expected.map_key() == actual.map_key())
    }

    /// The first `len` keys of this path.
    pub fn prefix(&self, len: usize) -> ConfigPath {
        ConfigPath {
            keys: self.keys[..len.min(self.keys.len())].to_vec(),
        }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, key) in self.keys.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for ConfigPath {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_path(value, "path must not be empty"));
        }

        let mut keys = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(DomainError::invalid_path(
                    value,
                    "path contains an empty segment",
                ));
            }
            keys.push(PathKey::from_segment(segment));
        }

        Ok(Self { keys })
    }
}

/// Insertion-ordered, de-duplicated set of configuration paths.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    paths: Vec<ConfigPath>,
    seen: HashSet<ConfigPath>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path`, returning `false` when it was already present.
    pub fn insert(&mut self, path: ConfigPath) -> bool {
        if self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }

    pub fn contains(&self, path: &ConfigPath) -> bool {
        self.seen.contains(path)
    }

    /// True when some member is `path` itself or one of its ancestors.
    pub fn covers(&self, path: &ConfigPath) -> bool {
        self.paths.iter().any(|member| path.starts_with(member))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl PartialEq for PathSet {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for PathSet {}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a ConfigPath;
    type IntoIter = std::slice::Iter<'a, ConfigPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl Extend<ConfigPath> for PathSet {
    fn extend<T: IntoIterator<Item = ConfigPath>>(&mut self, iter: T) {
        for path in iter {
            self.insert(path);
        }
    }
}

impl FromIterator<ConfigPath> for PathSet {
    fn from_iter<T: IntoIterator<Item = ConfigPath>>(iter: T) -> Self {
        let mut set = PathSet::new();
        set.extend(iter);
        set
    }
}
