//! Unpacking and structural checks for `.catrobat` program archives.
//!
//! An unpacked program may only contain `code.xml`, its screenshots, and the
//! `images/` and `sounds/` asset directories. Anything else is rejected.

mod error;
mod extract;
mod structure;

pub use error::{ArchiveError, ArchiveResult};
pub use extract::extract;
pub use structure::{ALLOWED_DIRECTORIES, ALLOWED_FILES, validate_file_structure};

use std::path::Path;

/// Unpack `archive` into `dest` and check the result.
pub fn extract_and_validate(archive: &Path, dest: &Path) -> ArchiveResult<()> {
    extract(archive, dest)?;
    validate_file_structure(dest)
}
