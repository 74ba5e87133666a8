use std::path::Path;

use lofty::{prelude::*, probe::Probe, properties::FileProperties};
use thiserror::Error;

use crate::{
    flac::FlacFile,
    format::{ContainerKind, FileType},
    generic::GenericFile,
    mpeg::MpegFile,
    property::PropertyMap,
    resolver::ContainerSet,
};

#[derive(Error, Debug)]
pub enum HandleError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Id3(#[from] id3::Error),
    #[error("{0}")]
    Ape(#[from] ape::Error),
    #[error("{0}")]
    Flac(#[from] metaflac::Error),
    #[error("{0}")]
    Lofty(#[from] lofty::error::LoftyError),
    #[error("Unsupported file type")]
    UnsupportedFileType,
    #[error("Operation not supported for {0} tags")]
    UnsupportedOperation(ContainerKind),
}

/// Stream details listed next to the tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProperties {
    /// Bits per second.
    pub bit_rate: u32,
    pub channels: u8,
    /// Whole seconds.
    pub length: u64,
    pub sample_rate: u32,
}
impl From<&FileProperties> for AudioProperties {
    fn from(props: &FileProperties) -> Self {
        Self {
            bit_rate: props.audio_bitrate().unwrap_or(0) * 1000,
            channels: props.channels().unwrap_or(0),
            length: props.duration().as_secs(),
            sample_rate: props.sample_rate().unwrap_or(0),
        }
    }
}

/// Audio properties through lofty, for bindings whose tag library has none.
/// A stream lofty cannot parse has no properties; its tags are still usable.
pub fn read_audio_properties(path: &Path) -> Option<AudioProperties> {
    match Probe::open(path).and_then(|x| x.read()) {
        Ok(file) => Some(AudioProperties::from(file.properties())),
        Err(err) => {
            log::debug!("no audio properties for {}: {err}", path.display());
            None
        }
    }
}

/// Everything the processing code needs from an opened audio file.
///
/// Property sets are edited in memory; nothing reaches the disk until
/// `save` or `strip`.
pub trait TagFile {
    fn file_type(&self) -> FileType;
    fn has_container(&self, kind: ContainerKind) -> bool;
    /// Present and holding at least one text property. Reads only consider
    /// containers with content.
    fn has_content(&self, kind: ContainerKind) -> bool {
        self.has_container(kind)
    }
    /// An empty map when the container is absent.
    fn properties_for(&self, kind: ContainerKind) -> PropertyMap;
    fn set_properties_for(&mut self, kind: ContainerKind, properties: PropertyMap);
    fn remove_unsupported(&mut self, kind: ContainerKind);
    /// Writes the given containers. Absent ones are only created when
    /// `create_missing` is set.
    fn save(&mut self, containers: &ContainerSet, create_missing: bool)
        -> Result<(), HandleError>;
    /// Removes whole containers. Single-container types are cleared and
    /// saved instead and report `UnsupportedOperation` here.
    fn strip(&mut self, containers: &ContainerSet) -> Result<(), HandleError>;
    fn is_read_only(&self) -> bool;
    fn present_containers(&self) -> ContainerSet {
        ContainerSet::new()
    }
    fn audio_properties(&self) -> Option<AudioProperties> {
        None
    }
}

pub fn open(path: &Path) -> Result<Box<dyn TagFile>, HandleError> {
    let file_type = FileType::from_path(path);
    log::trace!("opening {} as {file_type}", path.display());
    match file_type {
        FileType::Mp3 => Ok(Box::new(MpegFile::open(path)?)),
        FileType::Flac => Ok(Box::new(FlacFile::open(path)?)),
        FileType::OggVorbis | FileType::Opus | FileType::M4a => {
            Ok(Box::new(GenericFile::open(path, file_type)?))
        }
        FileType::Invalid => Err(HandleError::UnsupportedFileType),
    }
}

pub fn is_read_only(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|x| x.permissions().readonly())
        .unwrap_or(true)
}
