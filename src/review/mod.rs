//! Reading and rewriting per-student review files.
//!
//! The grading core only talks to [`ReviewStore`]; the filesystem
//! implementation builds every path explicitly from the assignments
//! directory and never changes the working directory.
//!
//! Reviews are handled as raw bytes. Tutors save them in whatever encoding
//! their editor uses, and the markers are plain ASCII either way.

use crate::models::format_points;
use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;

/// Dash line that delimits the appended total block.
pub const DELIMITER: &str = "--------";

/// Label written in front of the total.
pub const TOTAL_LABEL: &str = "Punkte gesamt:";

/// A total block at the very end of the review, as written by [`total_block`].
static TOTAL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?-u)\s*{DELIMITER}\n\n{TOTAL_LABEL} [^\n]*\n\n{DELIMITER}\s*\z");
    Regex::new(&pattern).expect("total block pattern is valid")
});

/// Access to the review text of each student.
pub trait ReviewStore {
    /// Raw review bytes of `student`.
    fn read_review(&self, student: &str) -> Result<Vec<u8>>;

    /// Replace the review of `student`. Must be all-or-nothing.
    fn write_review(&self, student: &str, content: &[u8]) -> Result<()>;
}

/// Review files stored as `<assignments>/<student>/<file_name>`.
#[derive(Debug, Clone)]
pub struct FsReviewStore {
    assignments_dir: PathBuf,
    file_name: String,
}

impl FsReviewStore {
    pub fn new(assignments_dir: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            assignments_dir,
            file_name: file_name.into(),
        }
    }

    /// Path of the review file for `student`.
    pub fn review_path(&self, student: &str) -> PathBuf {
        self.assignments_dir.join(student).join(&self.file_name)
    }
}

impl ReviewStore for FsReviewStore {
    fn read_review(&self, student: &str) -> Result<Vec<u8>> {
        let path = self.review_path(student);
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn write_review(&self, student: &str, content: &[u8]) -> Result<()> {
        let path = self.review_path(student);
        write_atomically(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Write `content` to a temp file next to `path`, then move it into place.
fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .context("review file has no parent directory")?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the original permissions on the rewritten file
    if let Ok(metadata) = std::fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Review without a trailing total block and trailing whitespace.
///
/// Dash lines elsewhere in the review are left alone.
pub fn strip_total_block(content: &[u8]) -> &[u8] {
    let body = match TOTAL_BLOCK.find(content) {
        Some(block) => &content[..block.start()],
        None => content,
    };
    body.trim_ascii_end()
}

/// The block appended to a review file.
pub fn total_block(total: f64) -> String {
    format!(
        "\n\n{DELIMITER}\n\n{TOTAL_LABEL} {}\n\n{DELIMITER}",
        format_points(total)
    )
}

/// Review with the total block replaced by `total`.
pub fn with_total(content: &[u8], total: f64) -> Vec<u8> {
    let mut updated = strip_total_block(content).to_vec();
    updated.extend_from_slice(total_block(total).as_bytes());
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_total_appends_block() {
        let updated = with_total(b"Aufgabe 1 ~(+10)\n\n\n", 22.0);
        assert_eq!(
            updated,
            b"Aufgabe 1 ~(+10)\n\n--------\n\nPunkte gesamt: 22.0\n\n--------"
        );
    }

    #[test]
    fn test_with_total_replaces_existing_block() {
        let first = with_total(b"Aufgabe 1 ~(+10)", 10.0);
        let second = with_total(&first, 12.0);
        assert_eq!(
            second,
            b"Aufgabe 1 ~(+10)\n\n--------\n\nPunkte gesamt: 12.0\n\n--------"
        );
    }

    #[test]
    fn test_with_total_is_idempotent() {
        let once = with_total(b"Review\n~(+5)\n", 5.0);
        let twice = with_total(&once, 5.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dash_lines_in_body_survive_rewrites() {
        let review = b"Aufgabe 1 ~(+5)\n--------\nAufgabe 2 ~(+3) ~(++1)\n----------\nEnde\n";

        let once = with_total(review, 9.0);
        let twice = with_total(&once, 9.0);

        assert_eq!(once, twice);
        assert!(twice.starts_with(b"Aufgabe 1 ~(+5)\n--------\nAufgabe 2 ~(+3) ~(++1)\n----------\nEnde"));
        assert!(twice.ends_with(b"Punkte gesamt: 9.0\n\n--------"));
    }

    #[test]
    fn test_strip_without_block() {
        assert_eq!(strip_total_block(b"text  \n"), b"text");
        assert_eq!(strip_total_block(b"a\n--------\nb"), b"a\n--------\nb");
        // A block followed by more review text is not the trailing total
        assert_eq!(
            strip_total_block(b"--------\n\nPunkte gesamt: 3.0\n\n--------\nmore"),
            b"--------\n\nPunkte gesamt: 3.0\n\n--------\nmore"
        );
    }

    #[test]
    fn test_non_utf8_review_keeps_its_bytes() {
        let review = b"Aufgabe 1 ~(+5) sch\xF6n ~(++1)\n";
        let updated = with_total(review, 6.0);

        assert!(updated.starts_with(b"Aufgabe 1 ~(+5) sch\xF6n ~(++1)"));
        assert_eq!(with_total(&updated, 6.0), updated);
    }

    #[test]
    fn test_fs_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("alice")).unwrap();
        std::fs::write(temp_dir.path().join("alice/korrektur.txt"), "~(+5)\n").unwrap();

        let store = FsReviewStore::new(temp_dir.path().to_path_buf(), "korrektur.txt");
        let text = store.read_review("alice").unwrap();
        store.write_review("alice", &with_total(&text, 5.0)).unwrap();

        let written = std::fs::read_to_string(temp_dir.path().join("alice/korrektur.txt")).unwrap();
        assert!(written.ends_with("Punkte gesamt: 5.0\n\n--------"));
    }

    #[test]
    fn test_fs_store_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("bob")).unwrap();

        let store = FsReviewStore::new(temp_dir.path().to_path_buf(), "korrektur.txt");
        let err = store.read_review("bob").unwrap_err();
        assert!(err.to_string().contains("korrektur.txt"));
    }
}
