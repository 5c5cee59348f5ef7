//! Link records and the ordered, cacheable collection that source plugins return.
//!
//! A [`LinkCollection`] behaves like an association list: entries keep their
//! insertion position, keys may be integers or names, and appending picks the
//! next integer after the highest integer key currently present. Its cache
//! metadata is never stored in aggregate form; every accessor folds over the
//! current members plus the collection's own metadata, so removed links stop
//! contributing immediately.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::cache::{CacheMetadata, Cacheable, MaxAge};

use super::error::DomainError;

/// Identifier of the entity a link was derived from. The collection never owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    url: Url,
    title: String,
    teaser: Value,
    cache: CacheMetadata,
    entity: Option<EntityRef>,
}

impl LinkRecord {
    pub fn new(url: Url, title: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            teaser: Value::Null,
            cache: CacheMetadata::default(),
            entity: None,
        }
    }

    pub fn with_teaser(mut self, teaser: Value) -> Self {
        self.teaser = teaser;
        self
    }

    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_cache_metadata(mut self, cache: CacheMetadata) -> Self {
        self.cache = cache;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opaque renderable payload; `null` when the source provides none.
    pub fn teaser(&self) -> &Value {
        &self.teaser
    }

    pub fn entity(&self) -> Option<&EntityRef> {
        self.entity.as_ref()
    }

    pub fn own_cache_metadata(&self) -> &CacheMetadata {
        &self.cache
    }

    pub fn cache_metadata_mut(&mut self) -> &mut CacheMetadata {
        &mut self.cache
    }
}

impl Cacheable for LinkRecord {
    fn cache_metadata(&self) -> CacheMetadata {
        self.cache.clone()
    }
}

/// Untyped link shape accepted by [`LinkCollection::set_value`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLink {
    url: String,
    title: String,
    #[serde(default)]
    teaser: Value,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(default)]
    max_age: Option<u64>,
    #[serde(default)]
    entity: Option<EntityRef>,
}

impl RawLink {
    fn into_record(self, key: &CollectionKey) -> Result<LinkRecord, DomainError> {
        let url = Url::parse(&self.url).map_err(|err| {
            DomainError::validation(format!("link `{key}` has an invalid url `{}`: {err}", self.url))
        })?;
        let cache = CacheMetadata::new()
            .with_tags(self.tags)
            .with_contexts(self.contexts)
            .with_max_age(MaxAge::from_seconds(self.max_age));

        let mut record = LinkRecord::new(url, self.title)
            .with_teaser(self.teaser)
            .with_cache_metadata(cache);
        if let Some(entity) = self.entity {
            record = record.with_entity(entity);
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    Index(u64),
    Name(String),
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKey::Index(index) => write!(f, "{index}"),
            CollectionKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for CollectionKey {
    fn from(value: u64) -> Self {
        CollectionKey::Index(value)
    }
}

impl From<&str> for CollectionKey {
    fn from(value: &str) -> Self {
        CollectionKey::Name(value.to_string())
    }
}

impl From<String> for CollectionKey {
    fn from(value: String) -> Self {
        CollectionKey::Name(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCollection {
    entries: Vec<(CollectionKey, LinkRecord)>,
    cache: CacheMetadata,
}

impl LinkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `link` under the next free integer key and returns that key.
    pub fn add(&mut self, link: LinkRecord) -> CollectionKey {
        let key = CollectionKey::Index(self.next_index());
        self.entries.push((key.clone(), link));
        key
    }

    /// Inserts or overwrites. Overwriting keeps the entry's position.
    pub fn set(&mut self, key: impl Into<CollectionKey>, link: LinkRecord) -> Option<LinkRecord> {
        let key = key.into();
        match self.position(&key) {
            Some(position) => Some(std::mem::replace(&mut self.entries[position].1, link)),
            None => {
                self.entries.push((key, link));
                None
            }
        }
    }

    /// Validates an untyped value as a link record before inserting it.
    ///
    /// Non-map values fail with [`DomainError::NotALink`]; maps that do not
    /// describe a link fail with [`DomainError::Validation`]. The collection is
    /// left untouched on error.
    pub fn set_value(
        &mut self,
        key: impl Into<CollectionKey>,
        value: Value,
    ) -> Result<Option<LinkRecord>, DomainError> {
        let key = key.into();
        let link = match value {
            Value::Object(_) => serde_json::from_value::<RawLink>(value)
                .map_err(|err| {
                    DomainError::validation(format!("link `{key}` is malformed: {err}"))
                })?
                .into_record(&key)?,
            Value::Null => return Err(DomainError::not_a_link(key, "null")),
            Value::Bool(_) => return Err(DomainError::not_a_link(key, "bool")),
            Value::Number(_) => return Err(DomainError::not_a_link(key, "number")),
            Value::String(_) => return Err(DomainError::not_a_link(key, "string")),
            Value::Array(_) => return Err(DomainError::not_a_link(key, "list")),
        };
        Ok(self.set(key, link))
    }

    pub fn get(&self, key: &CollectionKey) -> Option<&LinkRecord> {
        self.position(key).map(|position| &self.entries[position].1)
    }

    pub fn get_mut(&mut self, key: &CollectionKey) -> Option<&mut LinkRecord> {
        self.position(key)
            .map(|position| &mut self.entries[position].1)
    }

    pub fn contains_key(&self, key: &CollectionKey) -> bool {
        self.position(key).is_some()
    }

    pub fn unset(&mut self, key: &CollectionKey) -> Option<LinkRecord> {
        self.position(key)
            .map(|position| self.entries.remove(position).1)
    }

    /// Drops every link; directly attached metadata is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CollectionKey, &LinkRecord)> {
        self.entries.iter().map(|(key, link)| (key, link))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CollectionKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRecord> {
        self.entries.iter().map(|(_, link)| link)
    }

    pub fn to_ordered_list(&self) -> Vec<LinkRecord> {
        self.links().cloned().collect()
    }

    pub fn cache_tags(&self) -> BTreeSet<String> {
        let mut tags = self.cache.tags().clone();
        for link in self.links() {
            tags.extend(link.own_cache_metadata().tags().iter().cloned());
        }
        tags
    }

    pub fn cache_contexts(&self) -> BTreeSet<String> {
        let mut contexts = self.cache.contexts().clone();
        for link in self.links() {
            contexts.extend(link.own_cache_metadata().contexts().iter().cloned());
        }
        contexts
    }

    pub fn cache_max_age(&self) -> MaxAge {
        self.links()
            .map(|link| link.own_cache_metadata().max_age())
            .fold(self.cache.max_age(), MaxAge::merge)
    }

    /// Metadata attached to the collection itself, excluding members.
    pub fn own_cache_metadata(&self) -> &CacheMetadata {
        &self.cache
    }

    /// Merges `dependency` into the collection's own metadata, not into members.
    pub fn add_cacheable_dependency(&mut self, dependency: &impl Cacheable) {
        self.cache.merge(&dependency.cache_metadata());
    }

    pub fn add_cache_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache.add_tags(tags);
    }

    pub fn add_cache_contexts<I, S>(&mut self, contexts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache.add_contexts(contexts);
    }

    pub fn merge_cache_max_age(&mut self, max_age: MaxAge) {
        self.cache.merge_max_age(max_age);
    }

    fn position(&self, key: &CollectionKey) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }

    fn next_index(&self) -> u64 {
        self.keys()
            .filter_map(|key| match key {
                CollectionKey::Index(index) => Some(*index),
                CollectionKey::Name(_) => None,
            })
            .max()
            .map_or(0, |highest| highest.saturating_add(1))
    }
}

impl Cacheable for LinkCollection {
    fn cache_metadata(&self) -> CacheMetadata {
        self.links()
            .fold(self.cache.clone(), |acc, link| {
                acc.merged(link.own_cache_metadata())
            })
    }
}

impl FromIterator<LinkRecord> for LinkCollection {
    fn from_iter<T: IntoIterator<Item = LinkRecord>>(iter: T) -> Self {
        let mut collection = LinkCollection::new();
        collection.extend(iter);
        collection
    }
}

impl Extend<LinkRecord> for LinkCollection {
    fn extend<T: IntoIterator<Item = LinkRecord>>(&mut self, iter: T) {
        for link in iter {
            self.add(link);
        }
    }
}

impl IntoIterator for LinkCollection {
    type Item = LinkRecord;
    type IntoIter = std::iter::Map<
        std::vec::IntoIter<(CollectionKey, LinkRecord)>,
        fn((CollectionKey, LinkRecord)) -> LinkRecord,
    >;

    fn into_iter(self) -> Self::IntoIter {
        let into_link: fn((CollectionKey, LinkRecord)) -> LinkRecord = |(_, link)| link;
        self.entries.into_iter().map(into_link)
    }
}
