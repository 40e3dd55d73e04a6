//! Destination file lifecycle.
//!
//! New content is written to a `.part` sibling of the destination and only
//! renamed over it once the body was fully received and verified, so a failed
//! download never leaves a truncated destination behind.

mod staged;

pub use staged::StagedFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("file.iso"));
        assert_eq!(p.to_string_lossy(), "file.iso.part");
        let p2 = temp_path(Path::new("/tmp/archive.zip"));
        assert_eq!(p2.to_string_lossy(), "/tmp/archive.zip.part");
    }

    #[test]
    fn finalize_replaces_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        std::fs::write(&final_path, b"old content").unwrap();

        let mut staged = StagedFile::create(&final_path).unwrap();
        staged.write_all(b"new").unwrap();
        // Destination is untouched until finalize.
        assert_eq!(std::fs::read(&final_path).unwrap(), b"old content");
        staged.finalize(&final_path).unwrap();

        assert!(!temp_path(&final_path).exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn dropped_stage_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        {
            let mut staged = StagedFile::create(&final_path).unwrap();
            staged.write_all(b"partial").unwrap();
            assert!(temp_path(&final_path).exists());
        }
        assert!(!temp_path(&final_path).exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn create_truncates_stale_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        std::fs::write(temp_path(&final_path), b"stale leftovers").unwrap();

        let mut staged = StagedFile::create(&final_path).unwrap();
        staged.write_all(b"ok").unwrap();
        staged.flush().unwrap();
        staged.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"ok");
    }

    #[test]
    fn create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("no/such/dir/output.bin");
        assert!(StagedFile::create(&final_path).is_err());
    }
}
