use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use color_print::ceprintln;
use itertools::Itertools;
use std::{io::Write, path::PathBuf};

mod amend;
mod catalog;
mod config;
mod edits;
mod flac;
mod format;
mod generic;
mod handle;
mod listing;
mod mpeg;
mod process;
mod property;
mod resolver;
mod value;


use config::{ConfigError, ListFormat, Mode, Overrides, Settings};
use edits::{EditError, PendingEdits};
use format::FileType;
use handle::HandleError;
use process::{FileError, FileOutcome, RunSummary};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Aspect {
    Tags,
    FileExtensions,
}

/// Read and write tags in audio files that may carry several tag formats.
#[derive(Parser, Debug)]
#[command(name = "retag", version)]
struct Cli {
    /// List tags in human readable form
    #[arg(short = 'l')]
    list: bool,
    /// List tags in machine readable form
    #[arg(short = 'm')]
    machine: bool,
    /// List tags as JSON
    #[arg(short = 'j')]
    json: bool,
    /// Set a tag to a value
    #[arg(short = 't', value_name = "TAG=VALUE")]
    tag: Vec<String>,
    /// Delete a tag
    #[arg(short = 'd', value_name = "TAG")]
    delete: Vec<String>,
    /// Strip tags from the file
    #[arg(short = 'S')]
    strip: bool,
    /// Configure tag reading order, e.g. mp3=apetag,id3v2
    #[arg(short = 'R', value_name = "READMAP")]
    read_map: Option<String>,
    /// Configure which tag types are written
    #[arg(short = 'W', value_name = "WRITEMAP")]
    write_map: Option<String>,
    /// Comma separated list of parameters
    #[arg(short = 'o', value_name = "PARAMS")]
    parameters: Vec<String>,
    /// Print supported tag names or file extensions and exit
    #[arg(short = 's', value_enum)]
    show: Option<Aspect>,
    /// YAML settings file (defaults to retag.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(required_unless_present = "show")]
    files: Vec<PathBuf>,
}

/// `-t` and `-d` in the order they were given, so the last one for a tag wins.
fn collect_edits(cli: &Cli, matches: &ArgMatches) -> Result<PendingEdits, EditError> {
    let sets = matches
        .indices_of("tag")
        .into_iter()
        .flatten()
        .zip(cli.tag.iter().map(|x| (true, x)));
    let deletes = matches
        .indices_of("delete")
        .into_iter()
        .flatten()
        .zip(cli.delete.iter().map(|x| (false, x)));
    let mut edits = PendingEdits::new();
    for (_, (is_set, text)) in sets.chain(deletes).sorted_by_key(|(index, _)| *index) {
        if is_set {
            edits.add_definition(text)?;
        } else {
            edits.add_deletion(text)?;
        }
    }
    Ok(edits)
}

fn build_settings(cli: Cli, matches: &ArgMatches) -> Result<Settings, ConfigError> {
    let raw = config::load_config(cli.config.as_deref())?;
    let edits = collect_edits(&cli, matches)?;
    let modes = [
        (cli.list, Mode::List(ListFormat::Human)),
        (cli.machine, Mode::List(ListFormat::Machine)),
        (cli.json, Mode::List(ListFormat::Json)),
        (cli.strip, Mode::Strip),
    ]
    .into_iter()
    .filter_map(|(on, mode)| on.then_some(mode))
    .collect();
    Settings::new(
        raw,
        Overrides {
            read_map: cli.read_map,
            write_map: cli.write_map,
            parameters: cli.parameters,
            edits,
            modes,
        },
    )
}

fn show(aspect: Aspect) {
    match aspect {
        Aspect::Tags => {
            for entry in catalog::entries() {
                println!("{:<14} {}", entry.name, entry.kind);
            }
        }
        Aspect::FileExtensions => {
            for (ext, file_type) in FileType::extensions() {
                println!("{ext:<6} {file_type}");
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    if let Some(aspect) = cli.show {
        show(aspect);
        return;
    }
    let files = cli.files.clone();
    let settings = match build_settings(cli, &matches) {
        Ok(settings) => settings,
        Err(error) => {
            ceprintln!("<red>{}</red>", error);
            std::process::exit(1);
        }
    };

    let mut summary = RunSummary::default();
    let mut listings = vec![];
    for path in &files {
        let result = process::process_file(path, &settings);
        summary.record(&result);
        match result {
            Ok(FileOutcome::Listed(listing)) => listings.push(listing),
            Ok(FileOutcome::Tagged(outcome)) => log::debug!(
                "{}: wrote [{}] with {} failed tags",
                path.display(),
                outcome.containers.iter().map(|x| x.label()).join(","),
                outcome.failures.len()
            ),
            Ok(FileOutcome::Stripped(outcome)) => log::debug!(
                "{}: stripped [{}]",
                path.display(),
                outcome.containers.iter().map(|x| x.label()).join(",")
            ),
            Err(FileError::Handle(HandleError::UnsupportedFileType)) => {
                log::warn!("Unsupported file type: {}", path.display());
            }
            Err(error) => log::error!("{}: {error}", path.display()),
        }
    }

    match settings.mode {
        Mode::List(ListFormat::Json) => match listing::render_json(&listings) {
            Ok(json) => println!("{json}"),
            Err(error) => ceprintln!("<red>{}</red>", error),
        },
        Mode::List(ListFormat::Human) => print!("{}", listing::render_all(&listings, true)),
        Mode::List(ListFormat::Machine) => print!("{}", listing::render_all(&listings, false)),
        Mode::Tag | Mode::Strip => {}
    }

    let code = summary.exit_code(&settings);
    if code != 0 {
        let _ = std::io::stdout().flush();
        std::process::exit(code);
    }
}
