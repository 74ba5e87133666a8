use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use id3::{
    frame::{Comment, Content, ExtendedText},
    Frame, TagLike,
};

use crate::{
    format::{ContainerKind, FileType},
    handle::{self, AudioProperties, HandleError, TagFile},
    property::PropertyMap,
    resolver::ContainerSet,
};

// ID3v2 text frames with a generic key. The first frame listed for a key is
// the one written.
static ID3V2_TEXT_FRAMES: [(&str, &str); 18] = [
    ("TPE1", "ARTIST"),
    ("TALB", "ALBUM"),
    ("TIT2", "TITLE"),
    ("TRCK", "TRACKNUMBER"),
    ("TDRC", "DATE"),
    ("TYER", "DATE"),
    ("TCON", "GENRE"),
    ("TCOM", "COMPOSER"),
    ("TPE3", "CONDUCTOR"),
    ("TPE2", "ALBUMARTIST"),
    ("TPUB", "LABEL"),
    ("TPOS", "DISCNUMBER"),
    ("TCOP", "COPYRIGHT"),
    ("TENC", "ENCODEDBY"),
    ("TSRC", "ISRC"),
    ("TEXT", "LYRICIST"),
    ("TPE4", "REMIXER"),
    ("TIT3", "SUBTITLE"),
];

static MUSICBRAINZ_DESCRIPTIONS: [(&str, &str); 4] = [
    ("MusicBrainz Album Id", "MUSICBRAINZ_ALBUMID"),
    ("MusicBrainz Artist Id", "MUSICBRAINZ_ARTISTID"),
    ("MusicBrainz Release Track Id", "MUSICBRAINZ_TRACKID"),
    ("MusicBrainz Album Artist Id", "MUSICBRAINZ_ALBUMARTISTID"),
];

static APE_KEYS: [(&str, &str); 3] = [
    ("TRACK", "TRACKNUMBER"),
    ("YEAR", "DATE"),
    ("ALBUM ARTIST", "ALBUMARTIST"),
];

pub static ID3V1_KEYS: [&str; 7] = [
    "TITLE",
    "ARTIST",
    "ALBUM",
    "DATE",
    "COMMENT",
    "TRACKNUMBER",
    "GENRE",
];

const SEPARATOR: char = '\0';

fn text_frame_key(id: &str) -> Option<&'static str> {
    ID3V2_TEXT_FRAMES
        .iter()
        .find(|(frame, _)| *frame == id)
        .map(|(_, key)| *key)
}

fn text_frame_id(key: &str) -> Option<&'static str> {
    ID3V2_TEXT_FRAMES
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(frame, _)| *frame)
}

fn txxx_key(description: &str) -> String {
    MUSICBRAINZ_DESCRIPTIONS
        .iter()
        .find(|(desc, _)| desc.eq_ignore_ascii_case(description))
        .map_or_else(|| description.to_ascii_uppercase(), |(_, key)| (*key).to_owned())
}

fn txxx_description(key: &str) -> String {
    MUSICBRAINZ_DESCRIPTIONS
        .iter()
        .find(|(_, k)| *k == key)
        .map_or_else(|| key.to_owned(), |(desc, _)| (*desc).to_owned())
}

fn ape_to_generic(key: &str) -> String {
    let upper = key.to_ascii_uppercase();
    APE_KEYS
        .iter()
        .find(|(ape, _)| *ape == upper)
        .map_or(upper, |(_, generic)| (*generic).to_owned())
}

fn generic_to_ape(key: &str) -> &str {
    APE_KEYS
        .iter()
        .find(|(_, generic)| *generic == key)
        .map_or(key, |(ape, _)| *ape)
}

fn is_mapped_frame(frame: &Frame) -> bool {
    match frame.content() {
        Content::Text(_) => text_frame_key(frame.id()).is_some(),
        Content::ExtendedText(_) => true,
        Content::Comment(comment) => comment.description.is_empty(),
        _ => false,
    }
}

fn id3v2_properties(tag: &id3::Tag) -> PropertyMap {
    let mut props = PropertyMap::new();
    for frame in tag.frames() {
        let result = match (frame.content(), text_frame_key(frame.id())) {
            (Content::Text(text), Some(key)) => text
                .split(SEPARATOR)
                .try_for_each(|value| props.append(key, value)),
            (Content::ExtendedText(ExtendedText { description, value }), _) => {
                let key = txxx_key(description);
                value
                    .split(SEPARATOR)
                    .try_for_each(|value| props.append(&key, value))
            }
            (Content::Comment(comment), _) if comment.description.is_empty() => {
                props.append("COMMENT", comment.text.as_str())
            }
            _ => {
                props.add_unsupported(frame.id());
                Ok(())
            }
        };
        if let Err(err) = result {
            log::debug!("unreadable id3v2 frame {}: {err}", frame.id());
            props.add_unsupported(frame.id());
        }
    }
    props
}

fn id3v2_frames(props: &PropertyMap) -> Vec<Frame> {
    let mut frames = vec![];
    for (key, values) in props.iter() {
        let joined = values.join(&SEPARATOR.to_string());
        if key == "COMMENT" {
            frames.push(Frame::with_content(
                "COMM",
                Content::Comment(Comment {
                    lang: "eng".to_owned(),
                    description: String::new(),
                    text: joined,
                }),
            ));
        } else if let Some(id) = text_frame_id(key) {
            frames.push(Frame::text(id, joined));
        } else {
            frames.push(Frame::with_content(
                "TXXX",
                Content::ExtendedText(ExtendedText {
                    description: txxx_description(key),
                    value: joined,
                }),
            ));
        }
    }
    frames
}

fn ape_properties(tag: &ape::Tag) -> PropertyMap {
    let mut props = PropertyMap::new();
    for item in tag.iter() {
        match &item.value {
            ape::ItemValue::Text(text) => {
                let key = ape_to_generic(&item.key);
                for value in text.split(SEPARATOR) {
                    if let Err(err) = props.append(&key, value) {
                        log::debug!("unreadable ape item {}: {err}", item.key);
                    }
                }
            }
            _ => props.add_unsupported(item.key.as_str()),
        }
    }
    props
}

fn id3v1_properties(tag: &id3::v1::Tag) -> PropertyMap {
    let mut props = PropertyMap::restricted(&ID3V1_KEYS);
    let fields = [
        ("TITLE", tag.title.trim()),
        ("ARTIST", tag.artist.trim()),
        ("ALBUM", tag.album.trim()),
        ("DATE", tag.year.trim()),
        ("COMMENT", tag.comment.trim()),
    ];
    for (key, value) in fields {
        if !value.is_empty() {
            let _ = props.append(key, value);
        }
    }
    if let Some(track) = tag.track {
        let _ = props.append("TRACKNUMBER", track.to_string());
    }
    if let Some(genre) = tag.genre() {
        let _ = props.append("GENRE", genre);
    }
    props
}

fn read_id3v2(path: &Path) -> Result<Option<id3::Tag>, HandleError> {
    match id3::Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn read_ape(path: &Path) -> Result<Option<ape::Tag>, HandleError> {
    match ape::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(ape::Error::TagNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn read_id3v1(path: &Path) -> Result<Option<id3::v1::Tag>, HandleError> {
    match id3::v1::Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// An MP3 file with up to three competing tag containers.
pub struct MpegFile {
    path: PathBuf,
    read_only: bool,
    id3v2: Option<id3::Tag>,
    ape: Option<ape::Tag>,
    id3v1: Option<id3::v1::Tag>,
    properties: BTreeMap<ContainerKind, PropertyMap>,
    discard_unsupported: ContainerSet,
    audio: Option<AudioProperties>,
}
impl MpegFile {
    pub fn open(path: &Path) -> Result<Self, HandleError> {
        let id3v2 = read_id3v2(path)?;
        let ape = read_ape(path)?;
        let id3v1 = read_id3v1(path)?;
        let mut properties = BTreeMap::new();
        if let Some(tag) = &id3v2 {
            properties.insert(ContainerKind::Id3v2, id3v2_properties(tag));
        }
        if let Some(tag) = &ape {
            properties.insert(ContainerKind::Apetag, ape_properties(tag));
        }
        if let Some(tag) = &id3v1 {
            properties.insert(ContainerKind::Id3v1, id3v1_properties(tag));
        }
        Ok(Self {
            path: path.to_owned(),
            read_only: handle::is_read_only(path),
            id3v2,
            ape,
            id3v1,
            properties,
            discard_unsupported: ContainerSet::new(),
            audio: handle::read_audio_properties(path),
        })
    }

    fn save_id3v2(&mut self) -> Result<(), HandleError> {
        let props = self
            .properties
            .get(&ContainerKind::Id3v2)
            .cloned()
            .unwrap_or_default();
        let discard = self.discard_unsupported.contains(&ContainerKind::Id3v2);
        let mut tag = id3::Tag::new();
        if let Some(old) = &self.id3v2 {
            if !discard {
                for frame in old.frames().filter(|x| !is_mapped_frame(x)) {
                    tag.add_frame(frame.clone());
                }
            }
        }
        for frame in id3v2_frames(&props) {
            tag.add_frame(frame);
        }
        tag.write_to_path(&self.path, id3::Version::Id3v24)?;
        self.id3v2 = Some(tag);
        Ok(())
    }

    fn save_ape(&mut self) -> Result<(), HandleError> {
        let props = self
            .properties
            .get(&ContainerKind::Apetag)
            .cloned()
            .unwrap_or_default();
        let discard = self.discard_unsupported.contains(&ContainerKind::Apetag);
        let mut tag = self.ape.take().unwrap_or_else(ape::Tag::new);
        let stale: Vec<String> = tag
            .iter()
            .filter(|item| discard || matches!(item.value, ape::ItemValue::Text(_)))
            .map(|item| item.key.clone())
            .collect();
        for key in stale {
            tag.remove_items(&key);
        }
        for (key, values) in props.iter() {
            let item =
                ape::Item::from_text(generic_to_ape(key), values.join(&SEPARATOR.to_string()))?;
            tag.set_item(item);
        }
        ape::write_to_path(&tag, &self.path)?;
        self.ape = Some(tag);
        Ok(())
    }
}

impl TagFile for MpegFile {
    fn file_type(&self) -> FileType {
        FileType::Mp3
    }
    fn has_container(&self, kind: ContainerKind) -> bool {
        match kind {
            ContainerKind::Id3v2 => self.id3v2.is_some(),
            ContainerKind::Apetag => self.ape.is_some(),
            ContainerKind::Id3v1 => self.id3v1.is_some(),
            ContainerKind::None | ContainerKind::Invalid => false,
        }
    }
    fn has_content(&self, kind: ContainerKind) -> bool {
        self.has_container(kind) && self.properties.get(&kind).is_some_and(|x| !x.is_empty())
    }
    fn properties_for(&self, kind: ContainerKind) -> PropertyMap {
        match self.properties.get(&kind) {
            Some(props) => props.clone(),
            None if kind == ContainerKind::Id3v1 => PropertyMap::restricted(&ID3V1_KEYS),
            None => PropertyMap::new(),
        }
    }
    fn set_properties_for(&mut self, kind: ContainerKind, properties: PropertyMap) {
        if kind.is_concrete() {
            self.properties.insert(kind, properties);
        }
    }
    fn remove_unsupported(&mut self, kind: ContainerKind) {
        self.discard_unsupported.insert(kind);
    }
    fn save(
        &mut self,
        containers: &ContainerSet,
        create_missing: bool,
    ) -> Result<(), HandleError> {
        let mut first_error = None;
        for kind in containers {
            if !self.has_container(*kind) && !create_missing {
                log::debug!("{} has no {kind} tag, not creating one", self.path.display());
                continue;
            }
            let result = match kind {
                ContainerKind::Id3v2 => self.save_id3v2(),
                ContainerKind::Apetag => self.save_ape(),
                other => Err(HandleError::UnsupportedOperation(*other)),
            };
            if let Err(err) = result {
                log::debug!("saving {kind} to {} failed: {err}", self.path.display());
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
    fn strip(&mut self, containers: &ContainerSet) -> Result<(), HandleError> {
        for kind in containers {
            if !self.has_container(*kind) {
                continue;
            }
            match kind {
                ContainerKind::Id3v2 => {
                    id3::Tag::remove_from_path(&self.path)?;
                    self.id3v2 = None;
                }
                ContainerKind::Apetag => {
                    ape::remove_from_path(&self.path)?;
                    self.ape = None;
                }
                ContainerKind::Id3v1 => {
                    id3::v1::Tag::remove_from_path(&self.path)?;
                    self.id3v1 = None;
                }
                ContainerKind::None | ContainerKind::Invalid => continue,
            }
            self.properties.remove(kind);
        }
        Ok(())
    }
    fn is_read_only(&self) -> bool {
        self.read_only
    }
    fn present_containers(&self) -> ContainerSet {
        [
            ContainerKind::Id3v2,
            ContainerKind::Apetag,
            ContainerKind::Id3v1,
        ]
        .into_iter()
        .filter(|x| self.has_container(*x))
        .collect()
    }
    fn audio_properties(&self) -> Option<AudioProperties> {
        self.audio
    }
}
