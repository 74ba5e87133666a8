use std::{fs::File, io::BufReader, io::ErrorKind, path::Path};

use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::{
    edits::{EditError, PendingEdits},
    resolver::{MapSpecError, ReadMap, WriteMap},
};

pub const DEFAULT_CONFIG: &str = "retag.yaml";

#[derive(Error, Debug)]
#[error("{0}")]
pub enum YamlError {
    Io(#[from] std::io::Error),
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Yaml(#[from] YamlError),
    #[error("{0}")]
    Map(#[from] MapSpecError),
    #[error("{0}")]
    Edit(#[from] EditError),
    #[error("Unknown parameter: \"{0}\"")]
    UnknownParameter(String),
    #[error("Only one of listing, tagging and stripping can be done at once")]
    ConflictingModes,
}

pub fn load_yaml<T>(path: &Path) -> Result<T, YamlError>
where
    T: DeserializeOwned,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let yaml: T = serde_yaml::from_reader(reader)?;
    Ok(yaml)
}

/// Settings as written in the YAML file.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    pub read_map: Option<String>,
    pub write_map: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Loads the given file, or the default one if it exists.
pub fn load_config(path: Option<&Path>) -> Result<RawConfig, YamlError> {
    match path {
        Some(path) => load_yaml(path),
        None => match load_yaml(Path::new(DEFAULT_CONFIG)) {
            Err(YamlError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Ok(RawConfig::default())
            }
            other => other,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListFormat {
    Human,
    Machine,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    List(ListFormat),
    Tag,
    Strip,
}

/// Picks the single mode implied by the flags and edits given.
/// Nothing at all means a human-readable listing.
pub fn resolve_mode(selected: &[Mode], edits: &PendingEdits) -> Result<Mode, ConfigError> {
    let implied = (!edits.is_empty()).then_some(Mode::Tag);
    let modes: Vec<Mode> = selected.iter().copied().chain(implied).unique().collect();
    match modes.as_slice() {
        [] => Ok(Mode::List(ListFormat::Human)),
        [mode] => Ok(*mode),
        _ => Err(ConfigError::ConflictingModes),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub show_empty: bool,
    pub discard_unsupported: bool,
    pub fail_on_file_error: bool,
    pub fail_on_empty_write: bool,
}
impl Options {
    pub fn apply_parameter(&mut self, name: &str) -> Result<(), ConfigError> {
        match name.trim() {
            "show-empty" => self.show_empty = true,
            "keep-unsupported" => self.discard_unsupported = false,
            "discard-unsupported" => self.discard_unsupported = true,
            "fail-on-file-error" => self.fail_on_file_error = true,
            "fail-on-empty-write" => self.fail_on_empty_write = true,
            "" => {}
            other => return Err(ConfigError::UnknownParameter(other.to_owned())),
        }
        Ok(())
    }
    /// Applies a comma separated parameter list in order.
    pub fn apply_parameters(&mut self, list: &str) -> Result<(), ConfigError> {
        list.split(',').try_for_each(|x| self.apply_parameter(x))
    }
}

/// Values given on the command line, which win over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub read_map: Option<String>,
    pub write_map: Option<String>,
    pub parameters: Vec<String>,
    pub edits: PendingEdits,
    pub modes: Vec<Mode>,
}

/// Everything fixed before the first file is opened.
#[derive(Debug, Clone)]
pub struct Settings {
    pub read_map: ReadMap,
    pub write_map: WriteMap,
    pub options: Options,
    pub edits: PendingEdits,
    pub mode: Mode,
}
impl Settings {
    pub fn new(raw: RawConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let read_map = ReadMap::build(overrides.read_map.as_deref().or(raw.read_map.as_deref()))?;
        let write_map =
            WriteMap::build(overrides.write_map.as_deref().or(raw.write_map.as_deref()))?;
        let mut options = Options::default();
        for list in raw.parameters.iter().chain(overrides.parameters.iter()) {
            options.apply_parameters(list)?;
        }
        let mode = resolve_mode(&overrides.modes, &overrides.edits)?;
        log::debug!("running in mode {mode:?} with {options:?}");
        Ok(Self {
            read_map,
            write_map,
            options,
            edits: overrides.edits,
            mode,
        })
    }
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            read_map: ReadMap::defaults(),
            write_map: WriteMap::defaults(),
            options: Options::default(),
            edits: PendingEdits::new(),
            mode: Mode::List(ListFormat::Human),
        }
    }
}
