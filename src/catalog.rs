use core::fmt;

use strum::{EnumIter, IntoEnumIterator};

use crate::value::ValueKind;

/// Format-independent tag names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum CanonicalTag {
    Artist,
    Album,
    CatalogNumber,
    Comment,
    Compilation,
    Composer,
    Conductor,
    Description,
    Genre,
    Label,
    Performer,
    Publisher,
    TrackNumber,
    TrackTitle,
    Url,
    Year,
    MbAlbumId,
    MbArtistId,
    MbTrackId,
}

pub struct CatalogEntry {
    pub tag: CanonicalTag,
    pub name: &'static str,
    pub kind: ValueKind,
    pub property_key: &'static str,
}

// indexed by `CanonicalTag as usize`
static CATALOG: [CatalogEntry; 19] = [
    entry(CanonicalTag::Artist, "artist", ValueKind::String, "ARTIST"),
    entry(CanonicalTag::Album, "album", ValueKind::String, "ALBUM"),
    entry(
        CanonicalTag::CatalogNumber,
        "catalog-number",
        ValueKind::String,
        "CATALOGNUMBER",
    ),
    entry(CanonicalTag::Comment, "comment", ValueKind::String, "COMMENT"),
    entry(
        CanonicalTag::Compilation,
        "compilation",
        ValueKind::String,
        "ALBUMARTIST",
    ),
    entry(CanonicalTag::Composer, "composer", ValueKind::String, "COMPOSER"),
    entry(
        CanonicalTag::Conductor,
        "conductor",
        ValueKind::String,
        "CONDUCTOR",
    ),
    entry(
        CanonicalTag::Description,
        "description",
        ValueKind::String,
        "DESCRIPTION",
    ),
    entry(CanonicalTag::Genre, "genre", ValueKind::String, "GENRE"),
    entry(CanonicalTag::Label, "label", ValueKind::String, "LABEL"),
    entry(
        CanonicalTag::Performer,
        "performer",
        ValueKind::String,
        "PERFORMER",
    ),
    entry(
        CanonicalTag::Publisher,
        "publisher",
        ValueKind::String,
        "PUBLISHER",
    ),
    entry(
        CanonicalTag::TrackNumber,
        "track-number",
        ValueKind::Integer,
        "TRACKNUMBER",
    ),
    entry(CanonicalTag::TrackTitle, "track-title", ValueKind::String, "TITLE"),
    entry(CanonicalTag::Url, "url", ValueKind::String, "URL"),
    entry(CanonicalTag::Year, "year", ValueKind::Integer, "DATE"),
    entry(
        CanonicalTag::MbAlbumId,
        "mb-album-id",
        ValueKind::String,
        "MUSICBRAINZ_ALBUMID",
    ),
    entry(
        CanonicalTag::MbArtistId,
        "mb-artist-id",
        ValueKind::String,
        "MUSICBRAINZ_ARTISTID",
    ),
    entry(
        CanonicalTag::MbTrackId,
        "mb-track-id",
        ValueKind::String,
        "MUSICBRAINZ_TRACKID",
    ),
];

const fn entry(
    tag: CanonicalTag,
    name: &'static str,
    kind: ValueKind,
    key: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        tag,
        name,
        kind,
        property_key: key,
    }
}

impl CanonicalTag {
    pub fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }
    pub fn id(self) -> usize {
        self as usize
    }
    pub fn name(self) -> &'static str {
        self.entry().name
    }
    pub fn kind(self) -> ValueKind {
        self.entry().kind
    }
    /// Key in the generic property map.
    pub fn property_key(self) -> &'static str {
        self.entry().property_key
    }
    pub fn from_id(id: usize) -> Option<Self> {
        Self::iter().nth(id)
    }
    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().find(|x| x.name == name).map(|x| x.tag)
    }
}
impl fmt::Display for CanonicalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn lookup_by_name(name: &str) -> Option<(CanonicalTag, ValueKind)> {
    CanonicalTag::from_name(name).map(|tag| (tag, tag.kind()))
}

/// The declared kind of `name`, `ValueKind::Invalid` for unknown names.
pub fn kind_of(name: &str) -> ValueKind {
    lookup_by_name(name).map_or(ValueKind::Invalid, |(_, kind)| kind)
}

pub fn entries() -> impl Iterator<Item = &'static CatalogEntry> + Clone {
    CATALOG.iter()
}

pub fn names() -> impl Iterator<Item = &'static str> + Clone {
    CATALOG.iter().map(|x| x.name)
}
