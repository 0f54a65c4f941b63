use crate::error::Error;
use crate::model::{Item, ItemKind, ItemLocations};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::{DirEntry, WalkDir};

/// Catalog produced by one scan. Files and folders share a single id space
/// and a single location map.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<Item>,
    pub folders: Vec<Item>,
    pub locations: ItemLocations,
}

impl ScanResult {
    pub fn total(&self) -> usize {
        self.files.len() + self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    // Raw bytes, so a non-UTF-8 name with a leading dot is still hidden.
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

/// Recursive, read-only traversal of `root`. Hidden entries (leading `.`) are
/// skipped along with everything beneath them. Siblings are visited in file
/// name order so ids are stable for an unchanged tree. Symlinks are skipped.
pub fn scan(root: &Path) -> Result<ScanResult, Error> {
    scan_excluding(root, &[])
}

/// Like [`scan`], but never catalogs an entry in `excluded` nor a directory
/// holding one. Excluded entries are compared against paths under `root`, so
/// both should be spelled the same way (e.g. both canonical).
pub fn scan_excluding(root: &Path, excluded: &[PathBuf]) -> Result<ScanResult, Error> {
    if !root.is_dir() {
        return Err(Error::InvalidRoot(root.to_path_buf()));
    }

    let mut result = ScanResult::default();
    let mut next_id = 0u64;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(is_hidden(entry) || excluded.iter().any(|path| path == entry.path()))
        });

    for entry_result in walker {
        // Entries can vanish or become unreadable mid-walk; only the root is fatal.
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                error!("Skipping unreadable entry while scanning: {}", err);
                continue;
            }
        };

        if excluded.iter().any(|path| path.starts_with(entry.path())) {
            debug!("Not cataloguing {}, it holds an excluded path", entry.path().display());
            continue;
        }

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            ItemKind::Folder
        } else if file_type.is_file() {
            ItemKind::File
        } else {
            debug!("Skipping non-regular entry {}", entry.path().display());
            continue;
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let extension = match kind {
            ItemKind::File => entry
                .path()
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
                .unwrap_or_default(),
            ItemKind::Folder => String::new(),
        };

        let item = Item {
            id: next_id,
            name,
            kind,
            extension,
        };
        result.locations.insert(next_id, entry.into_path());
        next_id += 1;

        match kind {
            ItemKind::File => result.files.push(item),
            ItemKind::Folder => result.folders.push(item),
        }
    }

    debug!(
        "Scanned {}: {} files, {} folders",
        root.display(),
        result.files.len(),
        result.folders.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_rejects_missing_root() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(scan(&missing), Err(Error::InvalidRoot(_))));
    }

    #[test]
    fn test_rejects_file_root() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(scan(&file), Err(Error::InvalidRoot(_))));
    }

    #[test]
    fn test_empty_root() {
        let tmp = tempdir().unwrap();
        let result = scan(tmp.path()).unwrap();
        assert!(result.is_empty());
        assert!(result.locations.is_empty());
    }

    #[test]
    fn test_counts_visible_entries_and_skips_hidden() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs/nested")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("report.PDF"), "r").unwrap();
        fs::write(root.join("docs/notes.txt"), "n").unwrap();
        fs::write(root.join("docs/nested/deep.md"), "d").unwrap();
        fs::write(root.join(".hidden"), "h").unwrap();
        fs::write(root.join("docs/.DS_Store"), "h").unwrap();
        fs::write(root.join(".git/objects/blob"), "h").unwrap();

        let result = scan(root).unwrap();

        // docs, docs/nested, report.PDF, docs/notes.txt, docs/nested/deep.md
        assert_eq!(result.total(), 5);
        assert_eq!(result.files.len(), 3);
        assert_eq!(result.folders.len(), 2);
        assert_eq!(result.locations.len(), 5);

        let ids: HashSet<u64> = result
            .files
            .iter()
            .chain(result.folders.iter())
            .map(|item| item.id)
            .collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| *id < 5));
        assert!(ids.iter().all(|id| result.locations.contains_key(id)));

        let report = result.files.iter().find(|i| i.name == "report.PDF").unwrap();
        assert_eq!(report.extension, ".pdf");
        assert_eq!(result.locations[&report.id], root.join("report.PDF"));
        assert!(result.folders.iter().all(|f| f.extension.is_empty()));
    }

    #[test]
    fn test_ids_are_stable_across_scans() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("b")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b/c.txt"), "c").unwrap();

        let first = scan(root).unwrap();
        let second = scan(root).unwrap();
        assert_eq!(first.files, second.files);
        assert_eq!(first.folders, second.folders);
        assert_eq!(first.locations, second.locations);
    }

    #[test]
    fn test_file_without_extension() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("Makefile"), "all:").unwrap();
        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.files[0].extension, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_hidden_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let name = OsStr::from_bytes(b".secret\xff");
        fs::write(tmp.path().join(name), "s").unwrap();
        fs::create_dir(tmp.path().join(OsStr::from_bytes(b".cache\xfe"))).unwrap();

        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_excluded_file_and_its_parent_are_not_catalogued() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("logs")).unwrap();
        fs::write(root.join("logs/run.log"), "log").unwrap();
        fs::write(root.join("logs/old.txt"), "o").unwrap();
        fs::write(root.join("report.pdf"), "r").unwrap();

        let result = scan_excluding(root, &[root.join("logs/run.log")]).unwrap();

        let names: HashSet<&str> = result
            .files
            .iter()
            .chain(result.folders.iter())
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, HashSet::from(["old.txt", "report.pdf"]));
        assert!(result.folders.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_abort_scan() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inside.txt"), "i").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = scan(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let result = result.unwrap();
        assert!(result.files.iter().any(|item| item.name == "a.txt"));
        assert!(result.folders.iter().any(|item| item.name == "locked"));
    }
}
