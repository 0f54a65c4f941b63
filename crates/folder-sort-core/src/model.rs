use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Folder,
}

/// A file or folder discovered by one scan. Ids are only meaningful within that scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub kind: ItemKind,
    /// Lowercase suffix including the leading dot; empty for folders.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub extension: String,
}

/// Item id → absolute path at scan time.
pub type ItemLocations = HashMap<u64, PathBuf>;

/// Oracle output for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub id: u64,
    #[serde(alias = "filename", default)]
    pub name: String,
    pub category: String,
}

impl Classification {
    pub fn new(id: u64, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Failed,
}

/// Result of one relocation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RelocationOutcome {
    pub fn success(source: PathBuf, destination: PathBuf, category: String) -> Self {
        Self {
            source,
            destination,
            category,
            status: OutcomeStatus::Success,
            reason: None,
        }
    }

    pub fn skipped(
        source: PathBuf,
        destination: PathBuf,
        category: String,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            category,
            status: OutcomeStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(
        source: PathBuf,
        destination: PathBuf,
        category: String,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            category,
            status: OutcomeStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    Scanning,
    ClassifyingFiles,
    MovingFiles,
    ClassifyingFolders,
    MovingFolders,
    Complete,
    Cancelled,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Cancelled | Phase::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::ClassifyingFiles => "classifying-files",
            Phase::MovingFiles => "moving-files",
            Phase::ClassifyingFolders => "classifying-folders",
            Phase::MovingFolders => "moving-folders",
            Phase::Complete => "complete",
            Phase::Cancelled => "cancelled",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of a run as seen by a supervising layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunProgress {
    pub phase: Phase,
    pub percent: u8,
    pub cancelled: bool,
}

impl Default for RunProgress {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            percent: 0,
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_accepts_filename_alias() {
        let c: Classification =
            serde_json::from_str(r#"{"id": 3, "filename": "a.pdf", "category": "Documents"}"#)
                .unwrap();
        assert_eq!(c, Classification::new(3, "a.pdf", "Documents"));
    }

    #[test]
    fn test_outcome_serializes_without_empty_reason() {
        let outcome = RelocationOutcome::success(
            PathBuf::from("/r/a.pdf"),
            PathBuf::from("/r/Documents/a.pdf"),
            "Documents".to_string(),
        );
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""status":"success""#));
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_folder_item_omits_extension() {
        let item = Item {
            id: 0,
            name: "Photos".to_string(),
            kind: ItemKind::Folder,
            extension: String::new(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":0,"name":"Photos","kind":"folder"}"#);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::Complete.is_terminal());
        assert!(Phase::Cancelled.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(!Phase::MovingFiles.is_terminal());
        assert_eq!(Phase::ClassifyingFolders.to_string(), "classifying-folders");
    }
}
