use std::path::Path;

use itertools::Itertools;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{
    amend::{self, AmendFailure},
    catalog::CanonicalTag,
    config::{Mode, Settings},
    format::ContainerKind,
    handle::{self, HandleError, TagFile},
    listing::Listing,
    resolver::{self, ContainerSet},
    value::{TaggedValue, ValueKind},
};

#[derive(Error, Debug)]
pub enum FileError {
    #[error("{0}")]
    Handle(#[from] HandleError),
    #[error("File is read-only")]
    ReadOnly,
    #[error("No tag types to write to")]
    EmptyWriteSet,
}

/// Where one file is in its processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opened,
    ReadResolved,
    WriteSetResolved,
    Amended,
    Stripped,
    SaveRequested,
    Saved,
    SaveFailed,
}
impl Stage {
    fn rank(self) -> u8 {
        match self {
            Self::Opened => 0,
            Self::ReadResolved | Self::WriteSetResolved => 1,
            Self::Amended | Self::Stripped => 2,
            Self::SaveRequested => 3,
            Self::Saved | Self::SaveFailed => 4,
        }
    }
    pub fn is_terminal(self) -> bool {
        self.rank() == 4
    }
}

pub struct Progress<'a> {
    path: &'a Path,
    stage: Stage,
}
impl<'a> Progress<'a> {
    pub fn new(path: &'a Path) -> Self {
        log::trace!("{}: {:?}", path.display(), Stage::Opened);
        Self {
            path,
            stage: Stage::Opened,
        }
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    /// Moves forward. Going backwards or sideways is a bug and is ignored.
    pub fn advance(&mut self, next: Stage) {
        if next.rank() <= self.stage.rank() {
            debug_assert!(false, "{:?} cannot follow {:?}", next, self.stage);
            return;
        }
        log::trace!("{}: {:?} -> {:?}", self.path.display(), self.stage, next);
        self.stage = next;
    }
}

#[derive(Debug, Default)]
pub struct TagOutcome {
    pub containers: ContainerSet,
    pub failures: Vec<AmendFailure>,
}

#[derive(Debug, Default)]
pub struct StripOutcome {
    pub containers: ContainerSet,
}

#[derive(Debug)]
pub enum FileOutcome {
    Listed(Listing),
    Tagged(TagOutcome),
    Stripped(StripOutcome),
}

/// Per-run counts used for the exit status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}
impl RunSummary {
    pub fn record(&mut self, result: &Result<FileOutcome, FileError>) {
        self.processed += 1;
        if result.is_err() {
            self.failed += 1;
        }
    }
    pub fn exit_code(&self, settings: &Settings) -> i32 {
        if settings.options.fail_on_file_error && self.failed > 0 {
            2
        } else {
            0
        }
    }
}

pub fn process_file(path: &Path, settings: &Settings) -> Result<FileOutcome, FileError> {
    let mut handle = handle::open(path)?;
    process_handle(path, handle.as_mut(), settings)
}

pub fn process_handle(
    path: &Path,
    handle: &mut dyn TagFile,
    settings: &Settings,
) -> Result<FileOutcome, FileError> {
    match settings.mode {
        Mode::List(_) => Ok(FileOutcome::Listed(list_handle(path, handle, settings))),
        Mode::Tag => tag_handle(path, handle, settings).map(FileOutcome::Tagged),
        Mode::Strip => strip_handle(path, handle, settings).map(FileOutcome::Stripped),
    }
}

// Order of the `tag-types` listing field.
static TAG_TYPE_ORDER: [ContainerKind; 3] = [
    ContainerKind::Id3v1,
    ContainerKind::Id3v2,
    ContainerKind::Apetag,
];

fn presence(handle: &dyn TagFile) -> impl Fn(ContainerKind) -> bool + '_ {
    move |kind| handle.has_container(kind)
}

fn content(handle: &dyn TagFile) -> impl Fn(ContainerKind) -> bool + '_ {
    move |kind| handle.has_content(kind)
}

/// The containers a tag or strip run touches.
fn write_targets(handle: &dyn TagFile, settings: &Settings, delete_only: bool) -> ContainerSet {
    let file_type = handle.file_type();
    if resolver::is_multi_container(file_type) {
        resolver::resolve_write_set(&settings.write_map, file_type, presence(handle), delete_only)
    } else if !delete_only || handle.has_container(ContainerKind::None) {
        ContainerSet::from([ContainerKind::None])
    } else {
        ContainerSet::new()
    }
}

fn empty_value(kind: ValueKind) -> TaggedValue {
    match kind {
        ValueKind::Integer => TaggedValue::Integer(0),
        ValueKind::Boolean => TaggedValue::Boolean(false),
        _ => TaggedValue::String(String::new()),
    }
}

pub fn list_handle(path: &Path, handle: &dyn TagFile, settings: &Settings) -> Listing {
    let mut progress = Progress::new(path);
    let show_empty = settings.options.show_empty;
    let file_type = handle.file_type();
    let mut listing = Listing::new(path.to_owned());
    listing.insert("file-type", file_type.label());

    let chosen = if resolver::is_multi_container(file_type) {
        let chosen =
            resolver::resolve_preferred_container(&settings.read_map, file_type, content(handle));
        let present = handle.present_containers();
        let tag_types = TAG_TYPE_ORDER
            .iter()
            .filter(|x| present.contains(*x) && handle.has_content(**x))
            .map(|x| x.label())
            .join(",");
        let tag_types = if tag_types.is_empty() {
            "(no tags)".to_owned()
        } else {
            tag_types
        };
        listing.insert("tag-type", chosen.label());
        listing.insert("tag-types", tag_types);
        chosen
    } else {
        if show_empty {
            listing.insert("tag-type", "");
            listing.insert("tag-types", "");
        }
        ContainerKind::None
    };
    progress.advance(Stage::ReadResolved);

    let has_tag = handle.has_container(chosen);
    let properties = handle.properties_for(chosen);
    for tag in CanonicalTag::iter() {
        match amend::read_value(&properties, tag) {
            Some(value) if has_tag => listing.insert(tag.name(), value),
            _ if show_empty => listing.insert(tag.name(), empty_value(tag.kind())),
            _ => {}
        }
    }
    if has_tag || show_empty {
        listing.insert("is-va", properties.contains("ALBUMARTIST"));
    }
    if let Some(audio) = handle.audio_properties() {
        listing.insert_audio("bit-rate", i64::from(audio.bit_rate));
        listing.insert_audio("channels", i64::from(audio.channels));
        listing.insert_audio("length", i64::try_from(audio.length).unwrap_or(i64::MAX));
        listing.insert_audio("sample-rate", i64::from(audio.sample_rate));
    }
    listing
}

pub fn tag_handle(
    path: &Path,
    handle: &mut dyn TagFile,
    settings: &Settings,
) -> Result<TagOutcome, FileError> {
    let mut progress = Progress::new(path);
    if handle.is_read_only() {
        return Err(FileError::ReadOnly);
    }
    let delete_only = settings.edits.is_delete_only();
    let targets = write_targets(handle, settings, delete_only);
    progress.advance(Stage::WriteSetResolved);
    if targets.is_empty() {
        if settings.options.fail_on_empty_write {
            return Err(FileError::EmptyWriteSet);
        }
        log::warn!("{}: no tag types to write to, skipping", path.display());
        return Ok(TagOutcome::default());
    }

    let mut failures = vec![];
    for kind in &targets {
        let amended = amend::apply(handle.properties_for(*kind), &settings.edits, *kind);
        log::debug!("{}: {} changes to {kind}", path.display(), amended.changed);
        failures.extend(amended.failures);
        handle.set_properties_for(*kind, amended.properties);
    }
    progress.advance(Stage::Amended);

    progress.advance(Stage::SaveRequested);
    match handle.save(&targets, !delete_only) {
        Ok(()) => progress.advance(Stage::Saved),
        Err(err) => {
            progress.advance(Stage::SaveFailed);
            return Err(err.into());
        }
    }
    Ok(TagOutcome {
        containers: targets,
        failures,
    })
}

pub fn strip_handle(
    path: &Path,
    handle: &mut dyn TagFile,
    settings: &Settings,
) -> Result<StripOutcome, FileError> {
    let mut progress = Progress::new(path);
    if handle.is_read_only() {
        return Err(FileError::ReadOnly);
    }
    let multi = resolver::is_multi_container(handle.file_type());
    let targets = write_targets(handle, settings, true);
    progress.advance(Stage::WriteSetResolved);
    if targets.is_empty() {
        log::debug!("{}: nothing to strip", path.display());
        return Ok(StripOutcome::default());
    }

    let result = if multi {
        progress.advance(Stage::Stripped);
        progress.advance(Stage::SaveRequested);
        amend::strip(handle, &targets).map(|_| ())
    } else {
        for kind in &targets {
            amend::clear(handle, *kind, settings.options.discard_unsupported);
        }
        progress.advance(Stage::Stripped);
        progress.advance(Stage::SaveRequested);
        handle.save(&targets, false)
    };
    match result {
        Ok(()) => progress.advance(Stage::Saved),
        Err(err) => {
            progress.advance(Stage::SaveFailed);
            return Err(err.into());
        }
    }
    Ok(StripOutcome {
        containers: targets,
    })
}
