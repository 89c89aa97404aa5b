use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
};

use eyre::{Context as _, Result};
use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::model::MemberRow;

const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One recorded EHB value of one player.
#[derive(Debug, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: Box<str>,
    pub ehb: f64,
}

/// Appends one `timestamp,username,ehb` row per member to the history
/// file. The file is append-only and shared across fetches; usernames
/// never contain commas on the service side.
pub fn append_members(path: &Path, members: &[MemberRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create history directory {}", parent.display()))?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;

    let timestamp = OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .context("failed to format history timestamp")?;

    for row in members {
        writeln!(file, "{timestamp},{},{:.2}", row.name, row.ehb)
            .with_context(|| format!("failed to append history row for {}", row.name))?;
    }

    debug!("appended {} history row(s) to {}", members.len(), path.display());

    Ok(())
}

/// Reads back every recorded point of one player, matched
/// case-insensitively, sorted by timestamp. Rows that do not parse are
/// skipped rather than failing the whole read.
pub fn player_history(path: &Path, player: &str) -> Result<Vec<HistoryPoint>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?;

    let needle = player.to_lowercase();
    let mut history = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.context("failed to read history line")?;
        let mut split = line.splitn(3, ',');

        let (Some(timestamp), Some(name), Some(ehb)) = (split.next(), split.next(), split.next())
        else {
            continue;
        };

        let Ok(ehb) = ehb.trim().parse::<f64>() else {
            continue;
        };

        if name.trim().to_lowercase() == needle {
            history.push(HistoryPoint {
                timestamp: timestamp.trim().into(),
                ehb,
            });
        }
    }

    history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(history)
}
