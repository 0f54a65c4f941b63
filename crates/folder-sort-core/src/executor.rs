use crate::model::{Classification, ItemLocations, RelocationOutcome};
use crate::sanitize::sanitize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REASON_UNKNOWN_ID: &str = "unknown id";
pub const REASON_SELF_CONTAINMENT: &str = "cannot move directory into itself";
pub const REASON_SOURCE_MISSING: &str = "source no longer exists";
pub const REASON_ALREADY_IN_PLACE: &str = "already in place";
pub const REASON_DESTINATION_EXISTS: &str = "destination already exists";

/// `root/<category segments>`, built segment by segment so `/` in the
/// category is never interpreted by the platform.
pub fn destination_dir(root: &Path, category: &str) -> PathBuf {
    category
        .split('/')
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Move one classified item to `root/<sanitized category>/<basename>`.
///
/// Never returns an error; every failure is recorded in the outcome. A
/// directory is never moved to a destination at or beneath itself, and an
/// existing entry at the destination is never overwritten.
pub fn relocate(
    root: &Path,
    classification: &Classification,
    locations: &ItemLocations,
) -> RelocationOutcome {
    let category = sanitize(&classification.category);

    let source = match locations.get(&classification.id) {
        Some(path) => path.clone(),
        None => {
            return RelocationOutcome::skipped(
                PathBuf::new(),
                PathBuf::new(),
                category,
                REASON_UNKNOWN_ID,
            )
        }
    };

    let dest_dir = destination_dir(root, &category);
    let destination = match source.file_name() {
        Some(name) => dest_dir.join(name),
        None => {
            return RelocationOutcome::failed(
                source,
                dest_dir,
                category,
                "source has no file name",
            )
        }
    };

    // The scanned path may be stale if an ancestor moved earlier in the run.
    let metadata = match fs::symlink_metadata(&source) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return RelocationOutcome::skipped(source, destination, category, REASON_SOURCE_MISSING)
        }
        Err(err) => {
            return RelocationOutcome::failed(source, destination, category, err.to_string())
        }
    };

    if destination == source {
        return RelocationOutcome::skipped(source, destination, category, REASON_ALREADY_IN_PLACE);
    }

    // Checked before any directory is created so the source stays untouched.
    if metadata.is_dir() && destination.starts_with(&source) {
        return RelocationOutcome::failed(source, destination, category, REASON_SELF_CONTAINMENT);
    }

    if fs::symlink_metadata(&destination).is_ok() {
        return RelocationOutcome::failed(
            source,
            destination,
            category,
            REASON_DESTINATION_EXISTS,
        );
    }

    if let Err(err) = fs::create_dir_all(&dest_dir) {
        return RelocationOutcome::failed(source, destination, category, err.to_string());
    }

    match move_entry(&source, &destination, metadata.is_dir()) {
        Ok(()) => {
            debug!("Moved {} -> {}", source.display(), destination.display());
            RelocationOutcome::success(source, destination, category)
        }
        Err(err) => RelocationOutcome::failed(source, destination, category, err.to_string()),
    }
}

fn move_entry(source: &Path, destination: &Path, is_dir: bool) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(err) if !is_dir && is_cross_device(&err) => {
            debug!(
                "Rename across devices, copying {} instead",
                source.display()
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    // EXDEV
    err.raw_os_error() == Some(18)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutcomeStatus;
    use tempfile::tempdir;

    fn locations(entries: &[(u64, PathBuf)]) -> ItemLocations {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_moves_file_into_sanitized_category() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let source = root.join("report.pdf");
        fs::write(&source, "pdf").unwrap();

        let outcome = relocate(
            root,
            &Classification::new(0, "report.pdf", "documents/tax returns"),
            &locations(&[(0, source.clone())]),
        );

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.category, "Documents/Tax_Returns");
        assert_eq!(outcome.destination, root.join("Documents").join("Tax_Returns").join("report.pdf"));
        assert!(outcome.destination.is_file());
        assert!(!source.exists());
    }

    #[test]
    fn test_unknown_id_is_skipped() {
        let tmp = tempdir().unwrap();
        let outcome = relocate(
            tmp.path(),
            &Classification::new(42, "ghost", "Docs"),
            &ItemLocations::new(),
        );
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.reason.as_deref(), Some(REASON_UNKNOWN_ID));
        assert!(!tmp.path().join("Docs").exists());
    }

    #[test]
    fn test_directory_into_itself_fails_untouched() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let folder = root.join("A");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("inside.txt"), "x").unwrap();

        // root/A/Sub/A would nest under root/A
        let outcome = relocate(
            root,
            &Classification::new(0, "A", "A/Sub"),
            &locations(&[(0, folder.clone())]),
        );

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.reason.as_deref(), Some(REASON_SELF_CONTAINMENT));
        assert!(folder.join("inside.txt").is_file());
        assert!(!folder.join("Sub").exists());
        let entries: Vec<_> = fs::read_dir(&folder).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_folder_named_like_its_category_is_contained() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let folder = root.join("Documents");
        fs::create_dir(&folder).unwrap();

        let outcome = relocate(
            root,
            &Classification::new(0, "Documents", "Documents"),
            &locations(&[(0, folder.clone())]),
        );
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(folder.is_dir());
        assert!(!folder.join("Documents").exists());
    }

    #[test]
    fn test_shared_destination_parent_is_reused() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let a = root.join("a.jpg");
        let b = root.join("b.jpg");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let map = locations(&[(0, a), (1, b)]);

        let first = relocate(root, &Classification::new(0, "a.jpg", "Images"), &map);
        let second = relocate(root, &Classification::new(1, "b.jpg", "Images"), &map);

        assert_eq!(first.status, OutcomeStatus::Success);
        assert_eq!(second.status, OutcomeStatus::Success);
        assert!(root.join("Images/a.jpg").is_file());
        assert!(root.join("Images/b.jpg").is_file());
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("Images")).unwrap();
        fs::write(root.join("Images/a.jpg"), "old").unwrap();
        fs::create_dir(root.join("inbox")).unwrap();
        let source = root.join("inbox/a.jpg");
        fs::write(&source, "new").unwrap();

        let outcome = relocate(
            root,
            &Classification::new(0, "a.jpg", "Images"),
            &locations(&[(0, source.clone())]),
        );

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.reason.as_deref(), Some(REASON_DESTINATION_EXISTS));
        assert_eq!(fs::read_to_string(root.join("Images/a.jpg")).unwrap(), "old");
        assert!(source.is_file());
    }

    #[test]
    fn test_stale_source_is_skipped() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let outcome = relocate(
            root,
            &Classification::new(0, "gone.txt", "Docs"),
            &locations(&[(0, root.join("moved_away/gone.txt"))]),
        );
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.reason.as_deref(), Some(REASON_SOURCE_MISSING));
    }

    #[test]
    fn test_item_already_in_place() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("Images")).unwrap();
        let source = root.join("Images/a.jpg");
        fs::write(&source, "a").unwrap();

        let outcome = relocate(
            root,
            &Classification::new(0, "a.jpg", "images"),
            &locations(&[(0, source.clone())]),
        );
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.reason.as_deref(), Some(REASON_ALREADY_IN_PLACE));
        assert!(source.is_file());
    }

    #[test]
    fn test_moves_directory_with_contents() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let folder = root.join("holiday");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("beach.png"), "png").unwrap();

        let outcome = relocate(
            root,
            &Classification::new(0, "holiday", "Images/Trips"),
            &locations(&[(0, folder.clone())]),
        );
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert!(root.join("Images/Trips/holiday/beach.png").is_file());
        assert!(!folder.exists());
    }

    #[test]
    fn test_destination_dir_joins_segments() {
        let root = Path::new("/data");
        assert_eq!(
            destination_dir(root, "Sims/Mods"),
            Path::new("/data").join("Sims").join("Mods")
        );
    }
}
