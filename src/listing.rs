use std::{collections::BTreeMap, fmt::Write, path::PathBuf};

use serde::{ser::SerializeMap, Serialize};

use crate::value::TaggedValue;

const NAME_WIDTH: usize = 14;
const STX: char = '\u{02}';
const ETX: char = '\u{03}';
pub const EOT: char = '\u{04}';

/// The values read from one file, keyed by field name.
///
/// Audio properties are kept apart from tag fields and always follow them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: PathBuf,
    pub fields: BTreeMap<String, TaggedValue>,
    pub audio: BTreeMap<String, TaggedValue>,
}
impl Listing {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            fields: BTreeMap::new(),
            audio: BTreeMap::new(),
        }
    }
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TaggedValue>) {
        self.fields.insert(name.into(), value.into());
    }
    pub fn insert_audio(&mut self, name: impl Into<String>, value: impl Into<TaggedValue>) {
        self.audio.insert(name.into(), value.into());
    }
    pub fn get(&self, name: &str) -> Option<&TaggedValue> {
        self.fields.get(name)
    }
    pub fn get_audio(&self, name: &str) -> Option<&TaggedValue> {
        self.audio.get(name)
    }
    fn all_fields(&self) -> impl Iterator<Item = (&String, &TaggedValue)> {
        self.fields.iter().chain(self.audio.iter())
    }

    pub fn render_human(&self) -> String {
        let mut out = format!("<{}>\n", self.path.display());
        for (name, value) in self.all_fields() {
            let _ = match value {
                TaggedValue::String(s) => writeln!(out, "{name:<NAME_WIDTH$} | \"{s}\""),
                other => writeln!(out, "{name:<NAME_WIDTH$} | {other}"),
            };
        }
        out
    }

    pub fn render_machine(&self) -> String {
        let mut out = format!("filename{STX}{}", self.path.display());
        for (name, value) in self.all_fields() {
            let _ = match value {
                TaggedValue::Invalid => write!(out, "{ETX}{name}{STX}"),
                other => write!(out, "{ETX}{name}{STX}{other}"),
            };
        }
        out
    }
}

impl Serialize for Listing {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let audio = !self.audio.is_empty();
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1 + usize::from(audio)))?;
        map.serialize_entry("file", &self.path.display().to_string())?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        if audio {
            map.serialize_entry("audio-properties", &self.audio)?;
        }
        map.end()
    }
}

/// Human listings are separated by blank lines, machine ones by EOT.
pub fn render_all(listings: &[Listing], human: bool) -> String {
    if human {
        listings.iter().map(|x| x.render_human()).collect::<Vec<_>>().join("\n")
    } else {
        listings
            .iter()
            .map(|x| x.render_machine())
            .collect::<Vec<_>>()
            .join(&EOT.to_string())
    }
}

pub fn render_json(listings: &[Listing]) -> Result<String, serde_json::Error> {
    serde_json::to_string(listings)
}
