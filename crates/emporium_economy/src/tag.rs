//! # Tag Tree
//!
//! The key/value tree a host persists shop state in. Derives serde so the
//! host can write it as TOML or anything else serde speaks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single value in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    /// Integer value.
    Int(i64),
    /// String value.
    String(String),
    /// Ordered list.
    List(Vec<Tag>),
    /// Nested compound.
    Compound(CompoundTag),
}

/// A string-keyed map of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundTag(BTreeMap<String, Tag>);

impl CompoundTag {
    /// Creates an empty compound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a tag under `key`.
    pub fn put(&mut self, key: &str, tag: Tag) {
        self.0.insert(key.to_string(), tag);
    }

    /// Stores an integer under `key`.
    pub fn put_int(&mut self, key: &str, value: i64) {
        self.put(key, Tag::Int(value));
    }

    /// Stores a string under `key`.
    pub fn put_string(&mut self, key: &str, value: &str) {
        self.put(key, Tag::String(value.to_string()));
    }

    /// Returns true if `key` is present, whatever its type.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.0.remove(key)
    }

    /// Integer under `key`, if present with that type.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(Tag::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// String under `key`, if present with that type.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Tag::String(value)) => Some(value),
            _ => None,
        }
    }

    /// List under `key`, if present with that type.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[Tag]> {
        match self.0.get(key) {
            Some(Tag::List(value)) => Some(value),
            _ => None,
        }
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the compound has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
