use std::path::PathBuf;

/// Result of a successful snapshot write. Created by the writer, never
/// mutated afterwards.
#[derive(Debug)]
pub struct SavedSnapshotRecord {
    pub path: PathBuf,
    pub file_name: String,
    /// Group name plus formatted date and time, for user-facing messages.
    pub display_name: String,
}
