//! Choosing which tag containers to read from and write to.
//!
//! Multi-container file types carry a priority list of containers. Reading
//! is winner-takes-all: the first present container in the read map supplies
//! every value and the others are not consulted. Writing goes to each
//! container in the write map.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use thiserror::Error;

use crate::format::{ContainerKind, FileType};

pub type ContainerSet = BTreeSet<ContainerKind>;

static ALLOWED_CONTAINERS: [(FileType, &[ContainerKind]); 1] = [(
    FileType::Mp3,
    &[
        ContainerKind::Id3v2,
        ContainerKind::Apetag,
        ContainerKind::Id3v1,
    ],
)];

/// The containers `file_type` supports, in default priority order.
pub fn allowed_containers(file_type: FileType) -> Option<&'static [ContainerKind]> {
    ALLOWED_CONTAINERS
        .iter()
        .find(|(t, _)| *t == file_type)
        .map(|(_, kinds)| *kinds)
}

pub fn is_multi_container(file_type: FileType) -> bool {
    allowed_containers(file_type).is_some()
}

pub fn is_container_allowed(file_type: FileType, kind: ContainerKind) -> bool {
    allowed_containers(file_type).is_some_and(|kinds| kinds.contains(&kind))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapSpecError {
    #[error("Broken map assignment (expected filetype=kind,...): \"{0}\"")]
    BrokenAssignment(String),
    #[error("Unknown file type in map: \"{0}\"")]
    UnknownFileType(String),
    #[error("File type {0} does not support multiple tag types")]
    NotMultiContainer(FileType),
    #[error("Unknown tag type \"{token}\" for file type {file_type}")]
    UnknownContainer { file_type: FileType, token: String },
    #[error("Tag type {kind} is not allowed for file type {file_type}")]
    ContainerNotAllowed {
        file_type: FileType,
        kind: ContainerKind,
    },
}

/// Parses `filetype=kind,kind[:filetype=kind,...]`.
///
/// Every assignment is validated against the allowed-containers table. A
/// file type mentioned twice keeps its last assignment.
pub fn parse_map_spec(spec: &str) -> Result<Vec<(FileType, Vec<ContainerKind>)>, MapSpecError> {
    let mut result: Vec<(FileType, Vec<ContainerKind>)> = vec![];
    if spec.trim().is_empty() {
        return Ok(result);
    }
    for assignment in spec.split(':') {
        let (type_label, kinds) = assignment
            .split_once('=')
            .ok_or_else(|| MapSpecError::BrokenAssignment(assignment.to_owned()))?;
        let type_label = type_label.trim();
        let file_type = FileType::from_label(type_label);
        if file_type == FileType::Invalid {
            return Err(MapSpecError::UnknownFileType(type_label.to_owned()));
        }
        if !is_multi_container(file_type) {
            return Err(MapSpecError::NotMultiContainer(file_type));
        }
        let mut list = vec![];
        for token in kinds.split(',') {
            let token = token.trim();
            let kind = ContainerKind::from_label(token);
            if !kind.is_concrete() {
                return Err(MapSpecError::UnknownContainer {
                    file_type,
                    token: token.to_owned(),
                });
            }
            if !is_container_allowed(file_type, kind) {
                return Err(MapSpecError::ContainerNotAllowed { file_type, kind });
            }
            list.push(kind);
        }
        let list = list.into_iter().unique().collect();
        result.retain(|(t, _)| *t != file_type);
        result.push((file_type, list));
    }
    Ok(result)
}

/// Read priority per file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMap {
    map: BTreeMap<FileType, Vec<ContainerKind>>,
}
impl ReadMap {
    pub fn defaults() -> Self {
        Self {
            map: ALLOWED_CONTAINERS
                .iter()
                .map(|(t, kinds)| (*t, kinds.to_vec()))
                .collect(),
        }
    }
    pub fn build(spec: Option<&str>) -> Result<Self, MapSpecError> {
        let mut result = Self::defaults();
        if let Some(spec) = spec {
            for (file_type, kinds) in parse_map_spec(spec)? {
                result.map.insert(file_type, kinds);
            }
        }
        Ok(result)
    }
    pub fn get(&self, file_type: FileType) -> &[ContainerKind] {
        self.map.get(&file_type).map_or(&[], |x| x.as_slice())
    }
    pub fn iter(&self) -> impl Iterator<Item = (FileType, &[ContainerKind])> {
        self.map.iter().map(|(t, k)| (*t, k.as_slice()))
    }
}
impl Default for ReadMap {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Containers that receive writes per file type. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMap {
    map: BTreeMap<FileType, Vec<ContainerKind>>,
}
impl WriteMap {
    /// Only the preferred container of each multi-container type.
    pub fn defaults() -> Self {
        Self {
            map: ALLOWED_CONTAINERS
                .iter()
                .filter_map(|(t, kinds)| kinds.first().map(|k| (*t, vec![*k])))
                .collect(),
        }
    }
    pub fn build(spec: Option<&str>) -> Result<Self, MapSpecError> {
        let mut result = Self::defaults();
        if let Some(spec) = spec {
            for (file_type, kinds) in parse_map_spec(spec)? {
                result.map.insert(file_type, kinds);
            }
        }
        Ok(result)
    }
    pub fn get(&self, file_type: FileType) -> &[ContainerKind] {
        self.map.get(&file_type).map_or(&[], |x| x.as_slice())
    }
    pub fn iter(&self) -> impl Iterator<Item = (FileType, &[ContainerKind])> {
        self.map.iter().map(|(t, k)| (*t, k.as_slice()))
    }
}
impl Default for WriteMap {
    fn default() -> Self {
        Self::defaults()
    }
}

pub fn resolve_preferred_container(
    read_map: &ReadMap,
    file_type: FileType,
    is_present: impl Fn(ContainerKind) -> bool,
) -> ContainerKind {
    if !is_multi_container(file_type) {
        return ContainerKind::None;
    }
    let chosen = read_map
        .get(file_type)
        .iter()
        .copied()
        .find(|kind| is_present(*kind))
        .unwrap_or(ContainerKind::None);
    log::debug!("read map for {file_type} resolved to {chosen}");
    chosen
}

/// A delete-only batch never creates containers, so absent kinds are left
/// out of its write set.
pub fn resolve_write_set(
    write_map: &WriteMap,
    file_type: FileType,
    is_present: impl Fn(ContainerKind) -> bool,
    delete_only: bool,
) -> ContainerSet {
    let set: ContainerSet = write_map
        .get(file_type)
        .iter()
        .copied()
        .filter(|kind| !delete_only || is_present(*kind))
        .collect();
    log::debug!(
        "write set for {file_type}: [{}]",
        set.iter().map(|x| x.label()).join(",")
    );
    set
}
