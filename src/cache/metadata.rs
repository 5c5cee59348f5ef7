//! Cache invalidation metadata: tags, contexts and max-age.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How long a computed result may be reused.
///
/// Variant order matters: the derived `Ord` places every finite age below
/// `Permanent`, so merging is `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxAge {
    Seconds(u64),
    #[default]
    Permanent,
}

impl MaxAge {
    pub fn from_seconds(seconds: Option<u64>) -> Self {
        seconds.map_or(MaxAge::Permanent, MaxAge::Seconds)
    }

    pub fn seconds(self) -> Option<u64> {
        match self {
            MaxAge::Seconds(seconds) => Some(seconds),
            MaxAge::Permanent => None,
        }
    }

    pub fn is_permanent(self) -> bool {
        matches!(self, MaxAge::Permanent)
    }

    pub fn merge(self, other: MaxAge) -> MaxAge {
        self.min(other)
    }
}

impl fmt::Display for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxAge::Seconds(seconds) => write!(f, "{seconds}s"),
            MaxAge::Permanent => f.write_str("permanent"),
        }
    }
}

/// Tags, contexts and max-age describing when a result must be invalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheMetadata {
    tags: BTreeSet<String>,
    contexts: BTreeSet<String>,
    max_age: MaxAge,
}

impl CacheMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_tags(tags);
        self
    }

    pub fn with_contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_contexts(contexts);
        self
    }

    pub fn with_max_age(mut self, max_age: MaxAge) -> Self {
        self.merge_max_age(max_age);
        self
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn contexts(&self) -> &BTreeSet<String> {
        &self.contexts
    }

    pub fn max_age(&self) -> MaxAge {
        self.max_age
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    pub fn add_contexts<I, S>(&mut self, contexts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts.extend(contexts.into_iter().map(Into::into));
    }

    pub fn merge_max_age(&mut self, max_age: MaxAge) {
        self.max_age = self.max_age.merge(max_age);
    }

    /// Union of tags and contexts, minimum of max-ages.
    pub fn merge(&mut self, other: &CacheMetadata) {
        self.tags.extend(other.tags.iter().cloned());
        self.contexts.extend(other.contexts.iter().cloned());
        self.merge_max_age(other.max_age);
    }

    pub fn merged(mut self, other: &CacheMetadata) -> Self {
        self.merge(other);
        self
    }
}

/// Anything that contributes cache metadata to a dependent result.
pub trait Cacheable {
    fn cache_metadata(&self) -> CacheMetadata;
}

impl Cacheable for CacheMetadata {
    fn cache_metadata(&self) -> CacheMetadata {
        self.clone()
    }
}

impl<T: Cacheable + ?Sized> Cacheable for &T {
    fn cache_metadata(&self) -> CacheMetadata {
        (**self).cache_metadata()
    }
}
