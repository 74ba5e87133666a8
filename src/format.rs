use std::{fmt, path::Path};

use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};

/// Audio file types the tool knows how to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, EnumIter)]
pub enum FileType {
    Mp3,
    Flac,
    OggVorbis,
    Opus,
    M4a,
    #[default]
    Invalid,
}

static FILE_TYPE_LABELS: [(FileType, &str); 6] = [
    (FileType::Mp3, "mp3"),
    (FileType::Flac, "flac"),
    (FileType::OggVorbis, "ogg-vorbis"),
    (FileType::Opus, "opus"),
    (FileType::M4a, "m4a"),
    (FileType::Invalid, "invalid"),
];

static EXTENSIONS: [(&str, FileType); 8] = [
    ("mp3", FileType::Mp3),
    ("flac", FileType::Flac),
    ("flc", FileType::Flac),
    ("ogg", FileType::OggVorbis),
    ("oga", FileType::OggVorbis),
    ("opus", FileType::Opus),
    ("m4a", FileType::M4a),
    ("mp4", FileType::M4a),
];

impl FileType {
    pub fn from_label(label: &str) -> Self {
        FILE_TYPE_LABELS
            .iter()
            .find(|(_, l)| label.eq_ignore_ascii_case(l))
            .map_or(Self::Invalid, |(t, _)| *t)
    }
    /// Ids follow declaration order; anything out of range is `Invalid`.
    pub fn from_id(id: usize) -> Self {
        Self::iter().nth(id).unwrap_or(Self::Invalid)
    }
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|x| x.to_str())
            .and_then(|ext| {
                EXTENSIONS
                    .iter()
                    .find(|(e, _)| ext.eq_ignore_ascii_case(e))
                    .map(|(_, t)| *t)
            })
            .unwrap_or(Self::Invalid)
    }
    pub fn id(self) -> usize {
        self as usize
    }
    pub fn label(self) -> &'static str {
        FILE_TYPE_LABELS[self.id()].1
    }
    pub fn extensions() -> impl Iterator<Item = (&'static str, FileType)> + Clone {
        EXTENSIONS.iter().copied()
    }
}
impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
impl Serialize for FileType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// On-disk tag container formats.
///
/// `None` addresses a file's only tag when its type has no competing
/// containers, and is what resolution yields when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, EnumIter)]
pub enum ContainerKind {
    Apetag,
    Id3v1,
    Id3v2,
    None,
    #[default]
    Invalid,
}

static CONTAINER_LABELS: [(ContainerKind, &str); 5] = [
    (ContainerKind::Apetag, "apetag"),
    (ContainerKind::Id3v1, "id3v1"),
    (ContainerKind::Id3v2, "id3v2"),
    (ContainerKind::None, "none"),
    (ContainerKind::Invalid, "invalid"),
];

impl ContainerKind {
    pub fn from_label(label: &str) -> Self {
        CONTAINER_LABELS
            .iter()
            .find(|(_, l)| label.eq_ignore_ascii_case(l))
            .map_or(Self::Invalid, |(k, _)| *k)
    }
    pub fn from_id(id: usize) -> Self {
        Self::iter().nth(id).unwrap_or(Self::Invalid)
    }
    pub fn id(self) -> usize {
        self as usize
    }
    pub fn label(self) -> &'static str {
        CONTAINER_LABELS[self.id()].1
    }
    /// True for the kinds that name an actual container.
    pub fn is_concrete(self) -> bool {
        !matches!(self, Self::None | Self::Invalid)
    }
}
impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
impl Serialize for ContainerKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}
