//! Applying pending edits to one container's property set.
//!
//! Every edit is attempted. A key the container refuses is logged and
//! reported, and the rest of the batch still goes through.

use crate::{
    catalog::CanonicalTag,
    edits::PendingEdits,
    format::ContainerKind,
    handle::{HandleError, TagFile},
    property::{PropertyError, PropertyMap},
    resolver::ContainerSet,
    value::{TaggedValue, ValueKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendFailure {
    pub tag: CanonicalTag,
    pub container: ContainerKind,
    pub error: PropertyError,
}

#[derive(Debug, Clone, Default)]
pub struct Amended {
    pub properties: PropertyMap,
    pub failures: Vec<AmendFailure>,
    pub changed: usize,
}
impl Amended {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// How a stored value is rendered as property text.
pub fn render(value: &TaggedValue) -> Option<String> {
    match value {
        TaggedValue::Invalid => None,
        TaggedValue::Boolean(b) => Some(b.to_string()),
        TaggedValue::Integer(i) => Some(i.to_string()),
        TaggedValue::String(s) => Some(s.clone()),
    }
}

pub fn apply(mut properties: PropertyMap, edits: &PendingEdits, container: ContainerKind) -> Amended {
    let mut failures = vec![];
    let mut changed = 0;
    for (tag, value) in edits.iter() {
        let key = tag.property_key();
        match render(value) {
            None => {
                if properties.erase(key) {
                    changed += 1;
                }
            }
            Some(text) => match properties.replace(key, vec![text]) {
                Ok(()) => changed += 1,
                Err(error) => {
                    log::warn!("Could not set {tag} in {container} tag: {error}");
                    failures.push(AmendFailure {
                        tag,
                        container,
                        error,
                    });
                }
            },
        }
    }
    Amended {
        properties,
        failures,
        changed,
    }
}

/// Empties a property set, dropping unsupported items too when asked.
pub fn clear(
    handle: &mut dyn TagFile,
    container: ContainerKind,
    discard_unsupported: bool,
) {
    let mut properties = handle.properties_for(container);
    properties.clear();
    handle.set_properties_for(container, properties);
    if discard_unsupported {
        handle.remove_unsupported(container);
    }
}

/// Removes the given containers wholesale. Returns whether any I/O happened.
pub fn strip(handle: &mut dyn TagFile, targets: &ContainerSet) -> Result<bool, HandleError> {
    if targets.is_empty() {
        return Ok(false);
    }
    handle.strip(targets)?;
    Ok(true)
}

/// Reads a tag back in its declared kind.
///
/// Integers use the leading digits of the first value, so `"7/12"` reads as
/// 7. Empty text and integers without digits count as absent.
pub fn read_value(properties: &PropertyMap, tag: CanonicalTag) -> Option<TaggedValue> {
    let first = properties.first(tag.property_key())?;
    match tag.kind() {
        ValueKind::String => {
            if first.is_empty() {
                None
            } else {
                Some(TaggedValue::String(first.to_owned()))
            }
        }
        ValueKind::Integer => TaggedValue::parse_strict(ValueKind::Integer, first).ok(),
        ValueKind::Boolean => match TaggedValue::parse(ValueKind::Boolean, first) {
            TaggedValue::Invalid => None,
            value => Some(value),
        },
        ValueKind::Invalid => None,
    }
}
