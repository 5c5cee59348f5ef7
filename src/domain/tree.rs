//! Nested, insertion-ordered configuration tree.
//!
//! Leaves are plain JSON-like values (scalars, lists, maps). Paths that step
//! through a scalar are rejected with [`DomainError::InvalidPath`]; a `null`
//! on the way is treated as an absent sub-tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;
use super::path::{ConfigPath, PathKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Wraps a JSON object; any other value is rejected.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(DomainError::validation(format!(
                "configuration root must be a map, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, path: &ConfigPath) -> Result<Option<&Value>, DomainError> {
        let Some((first, rest)) = path.keys().split_first() else {
            return Err(empty_path());
        };

        let Some(mut current) = self.root.get(first.map_key().as_ref()) else {
            return Ok(None);
        };

        for (depth, key) in rest.iter().enumerate() {
            let next = match (current, key) {
                (Value::Object(map), key) => map.get(key.map_key().as_ref()),
                (Value::Array(items), PathKey::Index(index)) => items.get(*index),
                (Value::Null, _) => None,
                (other, key) => return Err(not_traversable(path, depth + 1, other, key)),
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// A key holding `null` still counts as present.
    pub fn has(&self, path: &ConfigPath) -> Result<bool, DomainError> {
        self.get(path).map(|value| value.is_some())
    }

    /// Writes `value` at `path`, creating missing intermediate maps.
    pub fn set(&mut self, path: &ConfigPath, value: Value) -> Result<(), DomainError> {
        let Some((last, parents)) = path.keys().split_last() else {
            return Err(empty_path());
        };

        let Some((first, middle)) = parents.split_first() else {
            self.root.insert(last.map_key().into_owned(), value);
            return Ok(());
        };

        let mut current = self
            .root
            .entry(first.map_key().into_owned())
            .or_insert_with(empty_map);

        for (offset, key) in middle.iter().enumerate() {
            current = child_mut(current, key, path, offset + 1)?;
        }

        insert_child(current, last, value, path, parents.len())
    }

    /// Every leaf location in insertion order. Lists and empty maps are leaves.
    pub fn leaf_paths(&self) -> Vec<ConfigPath> {
        let mut leaves = Vec::new();
        collect_leaves(&self.root, &ConfigPath::default(), &mut leaves);
        leaves
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn empty_map() -> Value {
    Value::Object(Map::new())
}

fn empty_path() -> DomainError {
    DomainError::invalid_path("", "path must contain at least one key")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn not_traversable(path: &ConfigPath, depth: usize, value: &Value, key: &PathKey) -> DomainError {
    if let (Value::Array(_), PathKey::Name(name)) = (value, key) {
        return list_indexed_by_name(path, depth, name);
    }
    DomainError::invalid_path(
        path,
        format!(
            "`{}` is a {} and cannot contain `{key}`",
            path.prefix(depth),
            kind(value)
        ),
    )
}

fn list_indexed_by_name(path: &ConfigPath, depth: usize, name: &str) -> DomainError {
    DomainError::invalid_path(
        path,
        format!(
            "`{}` is a list and cannot be indexed by `{name}`",
            path.prefix(depth)
        ),
    )
}

fn child_mut<'a>(
    container: &'a mut Value,
    key: &PathKey,
    path: &ConfigPath,
    depth: usize,
) -> Result<&'a mut Value, DomainError> {
    if container.is_null() {
        *container = empty_map();
    }

    match container {
        Value::Object(map) => Ok(map.entry(key.map_key().into_owned()).or_insert_with(empty_map)),
        Value::Array(items) => match key {
            PathKey::Index(index) if *index < items.len() => Ok(&mut items[*index]),
            PathKey::Index(index) if *index == items.len() => {
                items.push(empty_map());
                Ok(&mut items[*index])
            }
            PathKey::Index(index) => Err(DomainError::invalid_path(
                path,
                format!(
                    "index {index} is past the end of `{}` ({} items)",
                    path.prefix(depth),
                    items.len()
                ),
            )),
            PathKey::Name(name) => Err(list_indexed_by_name(path, depth, name)),
        },
        other => Err(not_traversable(path, depth, other, key)),
    }
}

fn insert_child(
    container: &mut Value,
    key: &PathKey,
    value: Value,
    path: &ConfigPath,
    depth: usize,
) -> Result<(), DomainError> {
    if container.is_null() {
        *container = empty_map();
    }

    match container {
        Value::Object(map) => {
            map.insert(key.map_key().into_owned(), value);
            Ok(())
        }
        Value::Array(items) => match key {
            PathKey::Index(index) if *index < items.len() => {
                items[*index] = value;
                Ok(())
            }
            PathKey::Index(index) if *index == items.len() => {
                items.push(value);
                Ok(())
            }
            PathKey::Index(index) => Err(DomainError::invalid_path(
                path,
                format!(
                    "index {index} is past the end of `{}` ({} items)",
                    path.prefix(depth),
                    items.len()
                ),
            )),
            PathKey::Name(name) => Err(list_indexed_by_name(path, depth, name)),
        },
        other => Err(not_traversable(path, depth, other, key)),
    }
}

fn collect_leaves(map: &Map<String, Value>, base: &ConfigPath, leaves: &mut Vec<ConfigPath>) {
    for (key, value) in map {
        let path = base.child(PathKey::from_segment(key));
        match value {
            Value::Object(children) if !children.is_empty() => {
                collect_leaves(children, &path, leaves)
            }
            _ => leaves.push(path),
        }
    }
}
