use std::path::{Path, PathBuf};

use lofty::{
    config::WriteOptions,
    prelude::*,
    probe::Probe,
    tag::{ItemKey, ItemValue, Tag, TagItem, TagType},
};

use crate::{
    format::{ContainerKind, FileType},
    handle::{self, AudioProperties, HandleError, TagFile},
    property::PropertyMap,
    resolver::ContainerSet,
};

pub static GENERIC_KEYS: [&str; 18] = [
    "ARTIST",
    "ALBUM",
    "CATALOGNUMBER",
    "COMMENT",
    "ALBUMARTIST",
    "COMPOSER",
    "CONDUCTOR",
    "DESCRIPTION",
    "GENRE",
    "LABEL",
    "PERFORMER",
    "PUBLISHER",
    "TRACKNUMBER",
    "TITLE",
    "DATE",
    "MUSICBRAINZ_ALBUMID",
    "MUSICBRAINZ_ARTISTID",
    "MUSICBRAINZ_TRACKID",
];

fn item_key(key: &str) -> Option<ItemKey> {
    let item = match key {
        "ARTIST" => ItemKey::TrackArtist,
        "ALBUM" => ItemKey::AlbumTitle,
        "CATALOGNUMBER" => ItemKey::CatalogNumber,
        "COMMENT" => ItemKey::Comment,
        "ALBUMARTIST" => ItemKey::AlbumArtist,
        "COMPOSER" => ItemKey::Composer,
        "CONDUCTOR" => ItemKey::Conductor,
        "DESCRIPTION" => ItemKey::Description,
        "GENRE" => ItemKey::Genre,
        "LABEL" => ItemKey::Label,
        "PERFORMER" => ItemKey::Performer,
        "PUBLISHER" => ItemKey::Publisher,
        "TRACKNUMBER" => ItemKey::TrackNumber,
        "TITLE" => ItemKey::TrackTitle,
        "DATE" => ItemKey::RecordingDate,
        "MUSICBRAINZ_ALBUMID" => ItemKey::MusicBrainzReleaseId,
        "MUSICBRAINZ_ARTISTID" => ItemKey::MusicBrainzArtistId,
        "MUSICBRAINZ_TRACKID" => ItemKey::MusicBrainzTrackId,
        _ => return None,
    };
    Some(item)
}

fn is_mapped(item: &TagItem) -> bool {
    matches!(item.value(), ItemValue::Text(_))
        && GENERIC_KEYS
            .iter()
            .filter_map(|x| item_key(x))
            .any(|key| &key == item.key())
}

fn tag_properties(tag: &Tag) -> PropertyMap {
    let mut props = PropertyMap::restricted(&GENERIC_KEYS);
    for name in GENERIC_KEYS {
        let Some(key) = item_key(name) else {
            continue;
        };
        for value in tag.get_strings(&key) {
            if let Err(err) = props.append(name, value) {
                log::debug!("unreadable tag item {name}: {err}");
            }
        }
    }
    for item in tag.items().filter(|x| !is_mapped(x)) {
        props.add_unsupported(format!("{:?}", item.key()));
    }
    if tag.picture_count() > 0 {
        props.add_unsupported("PICTURE");
    }
    props
}

/// Ogg Vorbis, Opus and MP4 files, read through their primary tag.
pub struct GenericFile {
    path: PathBuf,
    file_type: FileType,
    read_only: bool,
    tag_type: TagType,
    tag: Option<Tag>,
    properties: PropertyMap,
    discard_unsupported: bool,
    audio: AudioProperties,
}
impl GenericFile {
    pub fn open(path: &Path, file_type: FileType) -> Result<Self, HandleError> {
        let tagged = Probe::open(path)?.read()?;
        let audio = AudioProperties::from(tagged.properties());
        let tag_type = tagged.primary_tag_type();
        let tag = tagged.primary_tag().cloned();
        let properties = tag
            .as_ref()
            .map_or_else(|| PropertyMap::restricted(&GENERIC_KEYS), tag_properties);
        Ok(Self {
            path: path.to_owned(),
            file_type,
            read_only: handle::is_read_only(path),
            tag_type,
            tag,
            properties,
            discard_unsupported: false,
            audio,
        })
    }
}

impl TagFile for GenericFile {
    fn file_type(&self) -> FileType {
        self.file_type
    }
    fn has_container(&self, kind: ContainerKind) -> bool {
        kind == ContainerKind::None && self.tag.is_some()
    }
    fn properties_for(&self, kind: ContainerKind) -> PropertyMap {
        if kind == ContainerKind::None {
            self.properties.clone()
        } else {
            PropertyMap::restricted(&GENERIC_KEYS)
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
        if self.tag.is_none() && !create_missing {
            return Ok(());
        }
        let mut tag = self.tag.take().unwrap_or_else(|| Tag::new(self.tag_type));
        for name in GENERIC_KEYS {
            if let Some(key) = item_key(name) {
                tag.remove_key(&key);
            }
        }
        if self.discard_unsupported {
            tag.retain(is_mapped);
            while tag.picture_count() > 0 {
                tag.remove_picture(0);
            }
        }
        for (name, values) in self.properties.iter() {
            let Some(key) = item_key(name) else {
                continue;
            };
            for value in values {
                tag.push(TagItem::new(key.clone(), ItemValue::Text(value.clone())));
            }
        }
        let result = tag.save_to_path(&self.path, WriteOptions::default());
        self.tag = Some(tag);
        result?;
        Ok(())
    }
    fn strip(&mut self, _containers: &ContainerSet) -> Result<(), HandleError> {
        Err(HandleError::UnsupportedOperation(ContainerKind::None))
    }
    fn is_read_only(&self) -> bool {
        self.read_only
    }
    fn present_containers(&self) -> ContainerSet {
        if self.tag.is_some() {
            ContainerSet::from([ContainerKind::None])
        } else {
            ContainerSet::new()
        }
    }
    fn audio_properties(&self) -> Option<AudioProperties> {
        Some(self.audio)
    }
}
