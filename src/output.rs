use std::{fs, path::Path};

use serde::Serialize;
use time::{
    error::Format as FormatError, format_description::FormatItem, macros::format_description,
    OffsetDateTime,
};

use crate::{error::WriteError, model::SavedSnapshotRecord};

const FALLBACK_GROUP_NAME: &str = "Unknown Group";

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'_>] = format_description!("[hour]-[minute]");
const DISPLAY_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Serializes any snapshot-shaped value as indented JSON into a uniquely
/// named file under `dir`, creating the directory when absent.
///
/// Filenames resolve to name+date+time with minute precision; two saves of
/// the same group within the same minute overwrite each other.
pub fn write_snapshot<T: Serialize>(
    value: &T,
    group_name: Option<&str>,
    dir: &Path,
) -> Result<SavedSnapshotRecord, WriteError> {
    let at = OffsetDateTime::now_utc();
    let name = group_name.unwrap_or(FALLBACK_GROUP_NAME);

    debug!("resolved group name for snapshot: {name}");

    fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let file_name = snapshot_filename(group_name, at)?;
    let path = dir.join(&file_name);

    let json = serde_json::to_vec_pretty(value).map_err(WriteError::Serialize)?;

    trace!("snapshot payload: {}", String::from_utf8_lossy(&json));

    fs::write(&path, json).map_err(|source| WriteError::WriteFile {
        path: path.clone(),
        source,
    })?;

    let display_name = format!("{name} ({} UTC)", at.format(DISPLAY_FORMAT)?);

    let record = SavedSnapshotRecord {
        path,
        file_name,
        display_name,
    };

    info!("snapshot {} saved to {}", record.file_name, record.path.display());

    Ok(record)
}

/// `{slug(name)}_{date}_{time}.json`, falling back to a literal
/// "Unknown Group" when the name is absent.
pub fn snapshot_filename(
    group_name: Option<&str>,
    at: OffsetDateTime,
) -> Result<String, FormatError> {
    let slug = slug(group_name.unwrap_or(FALLBACK_GROUP_NAME));
    let date = at.format(DATE_FORMAT)?;
    let time = at.format(TIME_FORMAT)?;

    debug!("resolved snapshot filename parts: slug={slug} date={date} time={time}");

    Ok(format!("{slug}_{date}_{time}.json"))
}

/// Lowercases the name and replaces every non-alphanumeric character with
/// an underscore.
fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::model::{DisplayModel, MemberRow};

    use super::*;

    #[test]
    fn slug_lowercases_and_replaces_non_alphanumerics() {
        assert_eq!(slug("Iron Foundry!!"), "iron_foundry__");
        assert_eq!(slug("B0aty & friends"), "b0aty___friends");
        assert_eq!(slug("plain"), "plain");
    }

    #[test]
    fn filename_composes_slug_date_and_time() {
        let at = datetime!(2024-05-01 13:07 UTC);

        let file_name = snapshot_filename(Some("Iron Foundry!!"), at).unwrap();

        assert_eq!(file_name, "iron_foundry___2024-05-01_13-07.json");
    }

    #[test]
    fn absent_name_falls_back_to_unknown_group() {
        let at = datetime!(2024-05-01 13:07 UTC);

        let file_name = snapshot_filename(None, at).unwrap();

        assert_eq!(file_name, "unknown_group_2024-05-01_13-07.json");
    }

    #[test]
    fn write_creates_directory_and_round_trips() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("snapshots");

        let model = DisplayModel {
            group_id: 2300,
            name: "Iron Foundry".into(),
            member_count: 1,
            created_at: datetime!(2020-01-01 12:00 UTC),
            updated_at: datetime!(2024-05-01 13:07 UTC),
            description: "(none)".into(),
            clan_chat: "(none)".into(),
            homeworld: "(none)".into(),
            members: vec![MemberRow {
                name: "Zezima".into(),
                role: "Member".into(),
                account_type: "regular".into(),
                exp: 4_600_000_000,
                ehp: 2100.0,
                ehb: 1500.0,
            }],
        };

        let record = write_snapshot(&model, Some(&model.name), &dir).unwrap();

        assert!(record.path.exists());
        assert!(record.file_name.starts_with("iron_foundry_"));
        assert!(record.file_name.ends_with(".json"));
        assert!(record.display_name.starts_with("Iron Foundry ("));

        let json = fs::read_to_string(&record.path).unwrap();
        assert!(json.starts_with("{\n  \""));

        let read_back: DisplayModel = serde_json::from_str(&json).unwrap();
        assert_eq!(read_back.member_count, 1);
        assert_eq!(&*read_back.members[0].name, "Zezima");
    }

    #[test]
    fn write_is_idempotent_on_existing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().to_path_buf();

        write_snapshot(&serde_json::json!({"name": "a"}), Some("a"), &dir).unwrap();
        write_snapshot(&serde_json::json!({"name": "b"}), Some("b"), &dir).unwrap();

        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
    }
}
