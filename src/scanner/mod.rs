//! Discovery of student submission directories.
//!
//! This module loads the exclusion list and lists the student
//! directories of an assignment that are eligible for grading.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors that stop a run before any student is processed.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("couldn't load blacklist {}: {source}", path.display())]
    BlacklistUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blacklist {} contains no entries", path.display())]
    BlacklistEmpty { path: PathBuf },

    #[error("assignments directory {} is not readable: {source}", path.display())]
    AssignmentsUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Directory names that must never be graded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: BTreeSet<String>,
}

impl Blacklist {
    /// Load the exclusion list from a file with one directory name per line.
    ///
    /// Blank lines are ignored. A missing file or a file without entries
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let content =
            fs::read_to_string(path).map_err(|source| ScanError::BlacklistUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let blacklist = Self::parse(&content);
        if blacklist.is_empty() {
            return Err(ScanError::BlacklistEmpty {
                path: path.to_path_buf(),
            });
        }

        debug!("Loaded {} blacklist entries", blacklist.len());
        Ok(blacklist)
    }

    /// Parse blacklist content.
    pub fn parse(content: &str) -> Self {
        Self {
            entries: content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// Lists the student directories of one assignment.
pub struct StudentScanner {
    assignments_dir: PathBuf,
}

impl StudentScanner {
    pub fn new(assignments_dir: PathBuf) -> Self {
        Self { assignments_dir }
    }

    /// All immediate subdirectories, sorted by name.
    pub fn student_directories(&self) -> Result<Vec<String>, ScanError> {
        let mut directories = Vec::new();

        let walker = WalkDir::new(&self.assignments_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::AssignmentsUnreadable {
                        path: self.assignments_dir.clone(),
                        source: e,
                    })
                }
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            directories.push(entry.file_name().to_string_lossy().to_string());
        }

        Ok(directories)
    }

    /// Student directories minus the blacklisted ones.
    pub fn eligible_directories(&self, blacklist: &Blacklist) -> Result<Vec<String>, ScanError> {
        let all = self.student_directories()?;

        for name in blacklist.iter() {
            if !all.iter().any(|d| d == name) {
                warn!("Blacklisted directory '{}' does not exist", name);
            }
        }

        Ok(all
            .into_iter()
            .filter(|name| !blacklist.contains(name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_blacklist() {
        let blacklist = Blacklist::parse("tutor\n\n  .git  \nmuster\n");
        assert_eq!(blacklist.len(), 3);
        assert!(blacklist.contains("tutor"));
        assert!(blacklist.contains(".git"));
        assert!(!blacklist.contains(""));
    }

    #[test]
    fn test_load_missing_blacklist() {
        let temp_dir = TempDir::new().unwrap();
        let err = Blacklist::load(&temp_dir.path().join("BLACKLIST")).unwrap_err();
        assert!(matches!(err, ScanError::BlacklistUnreadable { .. }));
    }

    #[test]
    fn test_load_empty_blacklist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("BLACKLIST");
        std::fs::write(&path, "\n  \n").unwrap();

        let err = Blacklist::load(&path).unwrap_err();
        assert!(matches!(err, ScanError::BlacklistEmpty { .. }));
    }

    #[test]
    fn test_student_directories_sorted_and_dirs_only() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("zoe")).unwrap();
        std::fs::create_dir(temp_dir.path().join("alice")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("bob/nested")).unwrap();
        std::fs::write(temp_dir.path().join("statistics.pdf"), "").unwrap();

        let scanner = StudentScanner::new(temp_dir.path().to_path_buf());
        let dirs = scanner.student_directories().unwrap();

        assert_eq!(dirs, vec!["alice", "bob", "zoe"]);
    }

    #[test]
    fn test_eligible_directories_excludes_blacklist() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["alice", "bob", "tutor"] {
            std::fs::create_dir(temp_dir.path().join(name)).unwrap();
        }

        let scanner = StudentScanner::new(temp_dir.path().to_path_buf());
        let blacklist = Blacklist::parse("tutor\nghost\n");
        let dirs = scanner.eligible_directories(&blacklist).unwrap();

        assert_eq!(dirs, vec!["alice", "bob"]);
    }

    #[test]
    fn test_missing_assignments_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = StudentScanner::new(temp_dir.path().join("missing"));
        assert!(matches!(
            scanner.student_directories(),
            Err(ScanError::AssignmentsUnreadable { .. })
        ));
    }
}
