use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Key {0} cannot be stored in this tag")]
    KeyRejected(String),
    #[error("Empty property key")]
    EmptyKey,
}

/// Multi-valued key/value view of one tag container.
///
/// Keys are stored upper-cased. Items the container holds but that cannot be
/// expressed as text (pictures, binary frames, ...) are listed by name in
/// `unsupported` and never touched by edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, Vec<String>>,
    accepted: Option<&'static [&'static str]>,
    unsupported: Vec<String>,
}
impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }
    /// A map that only takes the given keys.
    pub fn restricted(accepted: &'static [&'static str]) -> Self {
        Self {
            accepted: Some(accepted),
            ..Self::default()
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        match self.accepted {
            None => true,
            Some(keys) => keys.iter().any(|x| x.eq_ignore_ascii_case(key)),
        }
    }
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .get(&key.to_ascii_uppercase())
            .map(|x| x.as_slice())
    }
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|x| x.first()).map(|x| x.as_str())
    }
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_uppercase())
    }

    pub fn replace(&mut self, key: &str, values: Vec<String>) -> Result<(), PropertyError> {
        if key.is_empty() {
            return Err(PropertyError::EmptyKey);
        }
        if !self.accepts(key) {
            return Err(PropertyError::KeyRejected(key.to_ascii_uppercase()));
        }
        self.entries.insert(key.to_ascii_uppercase(), values);
        Ok(())
    }
    /// Adds one value after any existing ones, used by bindings while loading.
    pub fn append(&mut self, key: &str, value: impl Into<String>) -> Result<(), PropertyError> {
        if key.is_empty() {
            return Err(PropertyError::EmptyKey);
        }
        if !self.accepts(key) {
            return Err(PropertyError::KeyRejected(key.to_ascii_uppercase()));
        }
        self.entries
            .entry(key.to_ascii_uppercase())
            .or_default()
            .push(value.into());
        Ok(())
    }
    /// Returns whether the key was there.
    pub fn erase(&mut self, key: &str) -> bool {
        self.entries.remove(&key.to_ascii_uppercase()).is_some()
    }
    /// Drops every text entry; unsupported items stay listed.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|x| x.as_str())
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unsupported(&self) -> &[String] {
        &self.unsupported
    }
    pub fn add_unsupported(&mut self, name: impl Into<String>) {
        self.unsupported.push(name.into());
    }
}
