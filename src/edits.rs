use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    catalog::{self, CanonicalTag},
    value::{TaggedValue, ValueError},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Broken tag definition (expected tag=value): \"{0}\"")]
    BrokenDefinition(String),
    #[error("Unknown tag name: \"{0}\"")]
    UnknownTag(String),
    #[error("Bad value for {tag}: {error}")]
    InvalidValue { tag: CanonicalTag, error: ValueError },
}

/// One batch of edits applied the same way to every file.
///
/// An `Invalid` value means the tag is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdits {
    edits: BTreeMap<CanonicalTag, TaggedValue>,
}
impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, tag: CanonicalTag, value: TaggedValue) {
        self.edits.insert(tag, value);
    }
    pub fn delete(&mut self, tag: CanonicalTag) {
        self.edits.insert(tag, TaggedValue::Invalid);
    }

    /// Parses a `tag=value` argument, converting the value to the tag's kind.
    pub fn add_definition(&mut self, definition: &str) -> Result<(), EditError> {
        let (name, text) = definition
            .split_once('=')
            .ok_or_else(|| EditError::BrokenDefinition(definition.to_owned()))?;
        let name = name.trim();
        let (tag, kind) =
            catalog::lookup_by_name(name).ok_or_else(|| EditError::UnknownTag(name.to_owned()))?;
        let value = TaggedValue::parse_strict(kind, text)
            .map_err(|error| EditError::InvalidValue { tag, error })?;
        self.insert(tag, value);
        Ok(())
    }
    pub fn add_deletion(&mut self, name: &str) -> Result<(), EditError> {
        let name = name.trim();
        let tag = CanonicalTag::from_name(name).ok_or_else(|| EditError::UnknownTag(name.to_owned()))?;
        self.delete(tag);
        Ok(())
    }

    pub fn get(&self, tag: CanonicalTag) -> Option<&TaggedValue> {
        self.edits.get(&tag)
    }
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalTag, &TaggedValue)> {
        self.edits.iter().map(|(k, v)| (*k, v))
    }
    pub fn len(&self) -> usize {
        self.edits.len()
    }
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
    /// True when the batch only removes tags, so no container needs creating.
    pub fn is_delete_only(&self) -> bool {
        self.edits.values().all(|x| x.is_invalid())
    }
}

impl FromIterator<(CanonicalTag, TaggedValue)> for PendingEdits {
    fn from_iter<I: IntoIterator<Item = (CanonicalTag, TaggedValue)>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}
