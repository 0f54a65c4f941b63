use super::ClassificationOracle;
use crate::error::Error;
use crate::model::{Classification, Item, ItemKind};

/// Offline oracle that files items by extension alone. Deterministic, never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionOracle;

impl ExtensionOracle {
    pub fn category_for(item: &Item) -> &'static str {
        if item.kind == ItemKind::Folder {
            return "Folders";
        }
        match item.extension.trim_start_matches('.') {
            "pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" | "xls" | "xlsx" | "csv"
            | "ppt" | "pptx" => "Documents",
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "heic" | "tiff" => "Images",
            "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => "Archives",
            "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" => "Audio",
            "mp4" | "avi" | "mkv" | "mov" | "webm" | "wmv" => "Video",
            "exe" | "msi" | "dmg" | "pkg" | "deb" | "rpm" | "appimage" => "Software",
            "package" | "ts4script" => "Sims/Mods",
            "save" => "Sims/Saves",
            "stl" | "obj" | "fbx" | "blend" | "3mf" => "3D_Assets/Models",
            "gcode" => "3D_Assets/Prints",
            "torrent" => "Torrents",
            "vcf" => "Contacts",
            _ => "Misc",
        }
    }
}

impl ClassificationOracle for ExtensionOracle {
    fn classify(&self, batch: &[Item]) -> Result<Vec<Classification>, Error> {
        Ok(batch
            .iter()
            .map(|item| Classification::new(item.id, item.name.clone(), Self::category_for(item)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: u64, name: &str, extension: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            kind: ItemKind::File,
            extension: extension.to_string(),
        }
    }

    #[test]
    fn test_known_extensions() {
        assert_eq!(ExtensionOracle::category_for(&file(0, "a.pdf", ".pdf")), "Documents");
        assert_eq!(ExtensionOracle::category_for(&file(0, "a.jpg", ".jpg")), "Images");
        assert_eq!(ExtensionOracle::category_for(&file(0, "m.package", ".package")), "Sims/Mods");
        assert_eq!(ExtensionOracle::category_for(&file(0, "x.torrent", ".torrent")), "Torrents");
    }

    #[test]
    fn test_unknown_and_missing_extensions() {
        assert_eq!(ExtensionOracle::category_for(&file(0, "a.xyz", ".xyz")), "Misc");
        assert_eq!(ExtensionOracle::category_for(&file(0, "Makefile", "")), "Misc");
    }

    #[test]
    fn test_classifies_whole_batch_in_order() {
        let batch = vec![file(4, "a.mp3", ".mp3"), file(9, "b.zip", ".zip")];
        let results = ExtensionOracle.classify(&batch).unwrap();
        assert_eq!(
            results,
            vec![
                Classification::new(4, "a.mp3", "Audio"),
                Classification::new(9, "b.zip", "Archives"),
            ]
        );
    }
}
