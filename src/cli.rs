//! Command-line parsing and output formatting.

use std::path::PathBuf;

use tracing::debug;

use crate::common::error::CliError;
use crate::config::TextureConfig;
use crate::loot::{DropResult, LootReport};

pub const USAGE: &str = "\
Usage:
  tavernkeep loot simulate <table.json> [--kills N] [--seed S]
  tavernkeep loot sql <table.json>
  tavernkeep blp convert <in.blp> <out.png>
  tavernkeep blp convert-dir [<src_dir> <dest_dir>]
  tavernkeep soap test
  tavernkeep soap info | online
  tavernkeep soap announce|notify <message ...>
  tavernkeep soap reload <config|game_event|loot|creature <entry>>
  tavernkeep soap reload-loot
  tavernkeep soap shutdown <seconds> [message ...] | shutdown cancel
  tavernkeep soap <gm command ...>
  tavernkeep help";

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LootSimulate {
        path: PathBuf,
        kills: Option<u32>,
        seed: Option<u64>,
    },
    LootSql {
        path: PathBuf,
    },
    BlpConvert {
        input: PathBuf,
        output: PathBuf,
    },
    BlpConvertDir {
        dirs: Option<(PathBuf, PathBuf)>,
    },
    SoapTest,
    SoapInfo,
    SoapOnline,
    SoapAnnounce {
        message: String,
    },
    SoapNotify {
        message: String,
    },
    SoapReload(ReloadTarget),
    SoapShutdown {
        seconds: u32,
        message: Option<String>,
    },
    SoapCancelShutdown,
    SoapCommand {
        command: String,
    },
    Help,
}

/// Server tables that `soap reload` knows how to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTarget {
    Config,
    GameEvent,
    Loot,
    Creature(u32),
}

fn usage(message: impl Into<String>) -> CliError {
    CliError::Usage {
        message: format!("{}\n\n{}", message.into(), USAGE),
    }
}

fn parse_value<T: std::str::FromStr>(arg: &str, value: Option<&String>) -> Result<T, CliError>
where
    T::Err: std::fmt::Display,
{
    let value = value.ok_or_else(|| CliError::InvalidArgument {
        arg: arg.to_string(),
        message: "missing value".to_string(),
    })?;
    value.parse().map_err(|e: T::Err| CliError::InvalidArgument {
        arg: arg.to_string(),
        message: e.to_string(),
    })
}

/// Parse arguments (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    debug!("Parsing arguments: {:?}", args);

    let parts: Vec<&str> = args.iter().map(String::as_str).collect();
    match parts.as_slice() {
        [] | ["help"] | ["--help"] | ["-h"] => Ok(Command::Help),
        ["loot", "simulate", path, rest @ ..] => parse_simulate(path, rest, &args),
        ["loot", "sql", path] => Ok(Command::LootSql {
            path: PathBuf::from(path),
        }),
        ["blp", "convert", input, output] => Ok(Command::BlpConvert {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
        }),
        ["blp", "convert-dir"] => Ok(Command::BlpConvertDir { dirs: None }),
        ["blp", "convert-dir", src, dest] => Ok(Command::BlpConvertDir {
            dirs: Some((PathBuf::from(src), PathBuf::from(dest))),
        }),
        ["soap", "test"] => Ok(Command::SoapTest),
        ["soap", "info"] => Ok(Command::SoapInfo),
        ["soap", "online"] => Ok(Command::SoapOnline),
        ["soap", "announce", words @ ..] if !words.is_empty() => Ok(Command::SoapAnnounce {
            message: words.join(" "),
        }),
        ["soap", "notify", words @ ..] if !words.is_empty() => Ok(Command::SoapNotify {
            message: words.join(" "),
        }),
        ["soap", "reload-loot"] | ["soap", "reload", "loot"] => Ok(Command::SoapReload(ReloadTarget::Loot)),
        ["soap", "reload", "config"] => Ok(Command::SoapReload(ReloadTarget::Config)),
        ["soap", "reload", "game_event"] => Ok(Command::SoapReload(ReloadTarget::GameEvent)),
        ["soap", "reload", "creature", _] => Ok(Command::SoapReload(ReloadTarget::Creature(
            parse_value("creature", args.get(3))?,
        ))),
        ["soap", "shutdown", "cancel"] => Ok(Command::SoapCancelShutdown),
        ["soap", "shutdown", seconds, words @ ..] => Ok(Command::SoapShutdown {
            seconds: seconds.parse().map_err(|e: std::num::ParseIntError| CliError::InvalidArgument {
                arg: "seconds".to_string(),
                message: e.to_string(),
            })?,
            message: (!words.is_empty()).then(|| words.join(" ")),
        }),
        ["soap", words @ ..] if !words.is_empty() => Ok(Command::SoapCommand {
            command: words.join(" "),
        }),
        [command, ..] => Err(usage(format!("Unknown or incomplete command: {}", command))),
    }
}

fn parse_simulate(path: &str, rest: &[&str], args: &[String]) -> Result<Command, CliError> {
    let mut kills = None;
    let mut seed = None;
    // Option values are looked up in the owned args so they can be parsed.
    let offset = args.len() - rest.len();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--kills" => {
                let n: u32 = parse_value("--kills", args.get(offset + i + 1))?;
                if n == 0 {
                    return Err(CliError::InvalidArgument {
                        arg: "--kills".to_string(),
                        message: "must be at least 1".to_string(),
                    });
                }
                kills = Some(n);
            }
            "--seed" => seed = Some(parse_value("--seed", args.get(offset + i + 1))?),
            other => return Err(usage(format!("Unknown option: {}", other))),
        }
        i += 2;
    }

    Ok(Command::LootSimulate {
        path: PathBuf::from(path),
        kills,
        seed,
    })
}

/// Directories for `blp convert-dir`: explicit arguments win over the
/// `textures` config section.
pub fn texture_dirs(
    dirs: Option<(PathBuf, PathBuf)>,
    textures: Option<&TextureConfig>,
) -> Result<(PathBuf, PathBuf), CliError> {
    match (dirs, textures) {
        (Some(dirs), _) => Ok(dirs),
        (None, Some(textures)) => Ok((
            PathBuf::from(&textures.source_dir),
            PathBuf::from(&textures.output_dir),
        )),
        (None, None) => Err(usage(
            "No directories given and no textures section in the config",
        )),
    }
}

/// Render one kill the way the loot editor shows it.
pub fn format_drops(drops: &[DropResult]) -> String {
    if drops.is_empty() {
        return "No loot dropped this time!".to_string();
    }
    drops
        .iter()
        .map(|d| format!("{} x{} ({}% chance)", d.display_name(), d.dropped_count, d.chance))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a multi-kill report with configured vs observed rates.
pub fn format_report(report: &LootReport) -> String {
    let mut lines = vec![format!(
        "{} kills, {} with no loot",
        report.kills, report.empty_kills
    )];
    for tally in report.tallies() {
        let name = tally
            .name
            .clone()
            .unwrap_or_else(|| format!("Item {}", tally.item));
        let group = if tally.group_id > 0 {
            format!(" [group {}]", tally.group_id)
        } else {
            String::new()
        };
        lines.push(format!(
            "{}{}: dropped {} times ({:.2}% observed, {}% configured), avg x{:.2}",
            name,
            group,
            tally.times_dropped,
            report.observed_rate(tally.row),
            tally.chance,
            tally.average_count()
        ));
    }
    lines.join("\n")
}
