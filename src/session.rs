use std::path::Path;

use eyre::{Report, Result};

use crate::{
    model::{DisplayModel, SavedSnapshotRecord},
    output,
};

/// Explicit holder of the "currently loaded snapshot", passed to the
/// action handlers instead of living in a global. One fetch-and-render
/// cycle or one save runs to completion before the next action.
#[derive(Default)]
pub struct Session {
    loaded: Option<DisplayModel>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded snapshot with a freshly fetched one.
    pub fn load(&mut self, model: DisplayModel) -> &DisplayModel {
        self.loaded.insert(model)
    }

    /// Persists the loaded snapshot. Saving is only available once a
    /// fetch succeeded; the caller turns the failure into a displayed
    /// message rather than a crash.
    pub fn save(&self, dir: &Path) -> Result<SavedSnapshotRecord> {
        let Some(model) = self.loaded.as_ref() else {
            bail!("no snapshot loaded; fetch a group before saving");
        };

        output::write_snapshot(model, Some(&model.name), dir).map_err(Report::new)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn model() -> DisplayModel {
        DisplayModel {
            group_id: 1,
            name: "Iron Foundry".into(),
            member_count: 0,
            created_at: datetime!(2020-01-01 12:00 UTC),
            updated_at: datetime!(2024-05-01 13:07 UTC),
            description: "(none)".into(),
            clan_chat: "(none)".into(),
            homeworld: "(none)".into(),
            members: Vec::new(),
        }
    }

    #[test]
    fn save_is_rejected_while_nothing_is_loaded() {
        let root = tempfile::tempdir().unwrap();
        let session = Session::new();

        let err = session.save(root.path()).unwrap_err();

        assert!(err.to_string().contains("no snapshot loaded"));
    }

    #[test]
    fn save_succeeds_after_a_load() {
        let root = tempfile::tempdir().unwrap();
        let mut session = Session::new();

        session.load(model());

        let record = session.save(root.path()).unwrap();

        assert!(record.path.exists());
    }

    #[test]
    fn load_replaces_the_previous_snapshot() {
        let mut session = Session::new();

        session.load(model());

        let mut replacement = model();
        replacement.name = "New Name".into();
        let loaded = session.load(replacement);

        assert_eq!(&*loaded.name, "New Name");
    }
}
