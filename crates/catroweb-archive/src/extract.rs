use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use crate::error::{ArchiveError, ArchiveResult};

/// Unpack a `.catrobat` zip into `dest`, creating it if needed.
///
/// Entries with absolute paths or `..` components are refused before
/// anything is written for them.
pub fn extract(archive_path: &Path, dest: &Path) -> ArchiveResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
    }

    info!(
        "Extracted {} entries from {} into {}",
        archive.len(),
        archive_path.display(),
        dest.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extracts_and_validates_program() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("game.catrobat");
        write_zip(
            &archive,
            &[
                ("code.xml", b"<program/>"),
                ("images/", b""),
                ("images/cat.png", b"png"),
                ("sounds/", b""),
            ],
        );

        let dest = tmp.path().join("out");
        crate::extract_and_validate(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("images").join("cat.png")).unwrap(), b"png");
    }

    #[test]
    fn extracted_junk_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("game.catrobat");
        write_zip(&archive, &[("code.xml", b"<program/>"), ("run.sh", b"rm -rf /")]);

        let err = crate::extract_and_validate(&archive, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidFileStructure { .. }));
    }

    #[test]
    fn refuses_path_traversal_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("evil.catrobat");
        write_zip(&archive, &[("../escape.txt", b"x")]);

        let err = extract(&archive, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsafeEntry(_)));
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn rejects_non_zip_input() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("plain.catrobat");
        fs::write(&archive, "definitely not a zip").unwrap();

        assert!(matches!(extract(&archive, &tmp.path().join("out")), Err(ArchiveError::Zip(_))));
    }
}
