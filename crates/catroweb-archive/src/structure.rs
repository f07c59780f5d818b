use std::path::Path;

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{ArchiveError, ArchiveResult};

/// Top-level directories that may hold arbitrary content.
pub const ALLOWED_DIRECTORIES: [&str; 2] = ["images", "sounds"];

/// Top-level files a program archive may contain.
pub const ALLOWED_FILES: [&str; 4] = [
    "code.xml",
    "screenshot.png",
    "manual_screenshot.png",
    "automatic_screenshot.png",
];

/// Check that `dir` holds nothing but the allowed entries.
///
/// Every offending path is collected (relative to `dir`, `/`-separated,
/// sorted) and reported in a single error.
pub fn validate_file_structure(dir: &Path) -> ArchiveResult<()> {
    let mut unexpected = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_allowed_directory(e));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 1 && entry.file_type().is_file() && is_allowed_file(&entry) {
            continue;
        }
        unexpected.push(relative_name(dir, entry.path()));
    }

    if unexpected.is_empty() {
        return Ok(());
    }

    unexpected.sort();
    warn!("Rejected program archive {}: {:?}", dir.display(), unexpected);
    Err(ArchiveError::InvalidFileStructure { unexpected })
}

fn is_allowed_directory(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ALLOWED_DIRECTORIES.contains(&name))
}

fn is_allowed_file(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| ALLOWED_FILES.contains(&name))
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn valid_program() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("code.xml"), "<program/>").unwrap();
        fs::write(dir.path().join("screenshot.png"), [0u8; 4]).unwrap();
        fs::create_dir(dir.path().join("sounds")).unwrap();
        fs::create_dir(dir.path().join("images")).unwrap();
        dir
    }

    #[test]
    fn accepts_minimal_program() {
        let dir = valid_program();
        validate_file_structure(dir.path()).unwrap();
    }

    #[test]
    fn accepts_anything_inside_asset_directories() {
        let dir = valid_program();
        fs::write(dir.path().join("images").join("look.png"), [1u8]).unwrap();
        fs::create_dir(dir.path().join("sounds").join("nested")).unwrap();
        fs::write(dir.path().join("sounds").join("nested").join("beep.mp3"), [1u8]).unwrap();
        fs::write(dir.path().join("automatic_screenshot.png"), [1u8]).unwrap();

        validate_file_structure(dir.path()).unwrap();
    }

    #[test]
    fn rejects_extra_top_level_file() {
        let dir = valid_program();
        fs::write(dir.path().join("virus.exe"), [1u8]).unwrap();

        match validate_file_structure(dir.path()) {
            Err(ArchiveError::InvalidFileStructure { unexpected }) => {
                assert_eq!(unexpected, vec!["virus.exe"]);
            }
            other => panic!("expected InvalidFileStructure, got {:?}", other),
        }
    }

    #[test]
    fn lists_every_unexpected_path() {
        let dir = valid_program();
        fs::create_dir(dir.path().join("extra")).unwrap();
        fs::write(dir.path().join("extra").join("code.xml"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let err = validate_file_structure(dir.path()).unwrap_err();
        match &err {
            ArchiveError::InvalidFileStructure { unexpected } => {
                assert_eq!(unexpected, &vec!["extra", "extra/code.xml", "notes.txt"]);
            }
            other => panic!("expected InvalidFileStructure, got {:?}", other),
        }
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn asset_names_only_count_as_directories() {
        let dir = valid_program();
        fs::remove_dir(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images"), "not a dir").unwrap();

        let err = validate_file_structure(dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidFileStructure { ref unexpected } if unexpected == &vec!["images"]));
    }
}
