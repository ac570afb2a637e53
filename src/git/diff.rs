use git2::Delta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChange,
}

impl ChangeType {
    pub(crate) fn from_delta(delta: Delta) -> Option<Self> {
        match delta {
            Delta::Added | Delta::Untracked => Some(ChangeType::Added),
            Delta::Modified => Some(ChangeType::Modified),
            Delta::Deleted => Some(ChangeType::Deleted),
            Delta::Renamed => Some(ChangeType::Renamed),
            Delta::Copied => Some(ChangeType::Copied),
            Delta::Typechange => Some(ChangeType::TypeChange),
            Delta::Unmodified | Delta::Ignored | Delta::Unreadable | Delta::Conflicted => None,
        }
    }
}

/// One file-level change between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub old_path: String,
    pub new_path: String,
    pub change: ChangeType,
}

impl DiffEntry {
    pub fn new(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        change: ChangeType,
    ) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            change,
        }
    }

    pub fn renamed(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self::new(old_path, new_path, ChangeType::Renamed)
    }

    pub fn is_rename(&self) -> bool {
        self.change == ChangeType::Renamed
    }
}
