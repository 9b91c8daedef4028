//! B standard library discovery.
//!
//! Library headers and bodies live under `<install>/lib/libb/` (common
//! to every target) and `<install>/lib/<format>/` (target-specific),
//! each directory holding `*.h` and `*.b` files. The reference driver
//! globs these with filesystem-dependent enumeration order; here the
//! matches are sorted by file name instead for deterministic,
//! reproducible builds — a decision recorded in `DESIGN.md`.
//!
//! A missing `lib/` directory (or missing target subdirectory) is not
//! an error: it's treated as an empty set of library files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bc_util::Target;

/// Every library file this translation unit should be assembled from,
/// in concatenation order: target headers, common headers, (caller
/// inserts user sources here), target bodies, common bodies.
pub struct LibraryFiles {
    pub target_headers: Vec<PathBuf>,
    pub common_headers: Vec<PathBuf>,
    pub target_bodies: Vec<PathBuf>,
    pub common_bodies: Vec<PathBuf>,
}

impl LibraryFiles {
    pub fn discover(install_dir: &Path, target: Target) -> io::Result<Self> {
        let target_dir = install_dir.join("lib").join(target.to_string());
        let common_dir = install_dir.join("lib").join("libb");
        Ok(Self {
            target_headers: list_with_extension(&target_dir, "h")?,
            common_headers: list_with_extension(&common_dir, "h")?,
            target_bodies: list_with_extension(&target_dir, "b")?,
            common_bodies: list_with_extension(&common_dir, "b")?,
        })
    }
}

/// Every file directly under `dir` with the given extension, sorted
/// by file name. Returns an empty vector (not an error) if `dir`
/// doesn't exist.
fn list_with_extension(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lib_directory_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = LibraryFiles::discover(dir.path(), Target::Lin64).unwrap();
        assert!(files.target_headers.is_empty());
        assert!(files.common_headers.is_empty());
        assert!(files.target_bodies.is_empty());
        assert!(files.common_bodies.is_empty());
    }

    #[test]
    fn discovers_and_sorts_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let libb = dir.path().join("lib").join("libb");
        fs::create_dir_all(&libb).unwrap();
        fs::write(libb.join("z.b"), "").unwrap();
        fs::write(libb.join("a.b"), "").unwrap();
        fs::write(libb.join("m.h"), "").unwrap();

        let files = LibraryFiles::discover(dir.path(), Target::Lin64).unwrap();
        assert_eq!(files.common_bodies.len(), 2);
        assert!(files.common_bodies[0].ends_with("a.b"));
        assert!(files.common_bodies[1].ends_with("z.b"));
        assert_eq!(files.common_headers.len(), 1);
    }

    #[test]
    fn target_and_common_directories_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let win64 = dir.path().join("lib").join("win64");
        fs::create_dir_all(&win64).unwrap();
        fs::write(win64.join("entry.b"), "").unwrap();

        let files = LibraryFiles::discover(dir.path(), Target::Win64).unwrap();
        assert_eq!(files.target_bodies.len(), 1);
        assert!(files.common_bodies.is_empty());

        let other = LibraryFiles::discover(dir.path(), Target::Lin64).unwrap();
        assert!(other.target_bodies.is_empty());
    }
}
