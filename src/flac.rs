use std::path::{Path, PathBuf};

use metaflac::BlockType;

use crate::{
    format::{ContainerKind, FileType},
    handle::{self, AudioProperties, HandleError, TagFile},
    property::PropertyMap,
    resolver::ContainerSet,
};

/// A FLAC file. Its Vorbis comment block is the only container, addressed
/// as `ContainerKind::None`.
pub struct FlacFile {
    path: PathBuf,
    read_only: bool,
    tag: metaflac::Tag,
    properties: PropertyMap,
    discard_unsupported: bool,
    audio: Option<AudioProperties>,
}

fn comment_properties(tag: &metaflac::Tag) -> PropertyMap {
    let mut props = PropertyMap::new();
    if let Some(comments) = tag.vorbis_comments() {
        for (key, values) in &comments.comments {
            for value in values {
                if let Err(err) = props.append(key, value.as_str()) {
                    log::debug!("unreadable vorbis comment {key}: {err}");
                }
            }
        }
    }
    for picture in tag.pictures() {
        props.add_unsupported(format!("PICTURE:{:?}", picture.picture_type));
    }
    props
}

impl FlacFile {
    pub fn open(path: &Path) -> Result<Self, HandleError> {
        let tag = metaflac::Tag::read_from_path(path)?;
        let properties = comment_properties(&tag);
        Ok(Self {
            path: path.to_owned(),
            read_only: handle::is_read_only(path),
            tag,
            properties,
            discard_unsupported: false,
            audio: handle::read_audio_properties(path),
        })
    }
}

impl TagFile for FlacFile {
    fn file_type(&self) -> FileType {
        FileType::Flac
    }
    fn has_container(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::None && self.tag.vorbis_comments().is_some()
    }
    fn properties_for(&self, kind: ContainerKind) -> PropertyMap {
        if kind == ContainerKind::None {
            self.properties.clone()
        } else {
            PropertyMap::new()
        }
    }
    fn set_properties_for(&mut self, kind: ContainerKind, properties: PropertyMap) {
        if kind == ContainerKind::None {
            self.properties = properties;
        }
    }
    fn remove_unsupported(&mut self, kind: ContainerKind) {
        if kind == ContainerKind::None {
            self.discard_unsupported = true;
        }
    }
    fn save(
        &mut self,
        containers: &ContainerSet,
        create_missing: bool,
    ) -> Result<(), HandleError> {
        if !containers.contains(&ContainerKind::None) {
            return Ok(());
        }
        if !self.has_container(ContainerKind::None) && !create_missing {
            return Ok(());
        }
        let comments = self.tag.vorbis_comments_mut();
        comments.comments = self
            .properties
            .iter()
            .map(|(key, values)| (key.to_owned(), values.to_vec()))
            .collect();
        if self.discard_unsupported {
            self.tag.remove_blocks(BlockType::Picture);
        }
        self.tag.write_to_path(&self.path)?;
        Ok(())
    }
    fn strip(&mut self, _containers: &ContainerSet) -> Result<(), HandleError> {
        Err(HandleError::UnsupportedOperation(ContainerKind::None))
    }
    fn is_read_only(&self) -> bool {
        self.read_only
    }
    fn present_containers(&self) -> ContainerSet {
        if self.has_container(ContainerKind::None) {
            ContainerSet::from([ContainerKind::None])
        } else {
            ContainerSet::new()
        }
    }
    fn audio_properties(&self) -> Option<AudioProperties> {
        self.audio
    }
}
