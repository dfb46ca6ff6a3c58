//! Locating the GTFS feed inside a data directory.
//!
//! Feeds turn up in several shapes: a zip named after GTFS, some other zip,
//! zips whose files sit in a single nested folder, loose `.txt` files, or a
//! subdirectory of loose files. Candidates are tried in that order and the
//! first one holding every core file wins.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use super::error::FeedError;

/// Files every usable feed must contain.
pub const REQUIRED_FILES: [&str; 4] = ["stops.txt", "stop_times.txt", "routes.txt", "trips.txt"];

/// Where the feed's tables are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Zip archive; `prefix` is the folder inside the archive holding the
    /// tables (empty, or ending in `/`)
    Archive { path: PathBuf, prefix: String },
    /// Directory of loose files
    Directory(PathBuf),
}

impl FeedSource {
    /// Read one table. Returns `None` if the file is absent.
    pub fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>, FeedError> {
        match self {
            FeedSource::Directory(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                fs::read(&path)
                    .map(Some)
                    .map_err(|source| FeedError::Io { path, source })
            }
            FeedSource::Archive { path, prefix } => {
                let mut archive = open_archive(path)?;
                let entry_name = format!("{prefix}{name}");
                let mut entry = match archive.by_name(&entry_name) {
                    Ok(entry) => entry,
                    Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                    Err(source) => {
                        return Err(FeedError::Archive {
                            path: path.clone(),
                            source,
                        });
                    }
                };
                let mut bytes = Vec::new();
                entry
                    .read_to_end(&mut bytes)
                    .map_err(|source| FeedError::Io {
                        path: path.join(&entry_name),
                        source,
                    })?;
                Ok(Some(bytes))
            }
        }
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>, FeedError> {
    let file = File::open(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(file).map_err(|source| FeedError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Folder inside the archive that holds all required files, if any.
///
/// Only the archive root and folders one level deep are considered.
fn archive_prefix(path: &Path) -> Result<Option<String>, FeedError> {
    let archive = open_archive(path)?;
    let names: Vec<&str> = archive.file_names().collect();

    let mut prefixes: Vec<String> = vec![String::new()];
    let mut nested: Vec<String> = names
        .iter()
        .filter_map(|n| n.split_once('/'))
        .filter(|(folder, rest)| !folder.is_empty() && !rest.contains('/'))
        .map(|(folder, _)| format!("{folder}/"))
        .collect();
    nested.sort();
    nested.dedup();
    prefixes.extend(nested);

    Ok(prefixes.into_iter().find(|prefix| {
        REQUIRED_FILES
            .iter()
            .all(|f| names.contains(&format!("{prefix}{f}").as_str()))
    }))
}

fn has_required_files(dir: &Path) -> bool {
    REQUIRED_FILES.iter().all(|f| dir.join(f).is_file())
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, FeedError> {
    let entries = fs::read_dir(dir).map_err(|source| FeedError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    Ok(paths)
}

fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn is_named_gtfs(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().contains("gtfs"))
}

/// Find the feed under `base`.
///
/// Unreadable candidates are skipped with a warning; only when no candidate
/// qualifies is the layout reported as invalid.
pub fn resolve_feed(base: &Path) -> Result<FeedSource, FeedError> {
    let entries = sorted_entries(base)?;

    let (named, other): (Vec<&PathBuf>, Vec<&PathBuf>) = entries
        .iter()
        .filter(|p| is_zip(p))
        .partition(|p| is_named_gtfs(p));

    for zip_path in named.into_iter().chain(other) {
        match archive_prefix(zip_path) {
            Ok(Some(prefix)) => {
                debug!(archive = %zip_path.display(), prefix = %prefix, "using GTFS archive");
                return Ok(FeedSource::Archive {
                    path: zip_path.clone(),
                    prefix,
                });
            }
            Ok(None) => debug!(archive = %zip_path.display(), "archive lacks core GTFS files"),
            Err(e) => warn!(archive = %zip_path.display(), error = %e, "skipping unreadable archive"),
        }
    }

    if has_required_files(base) {
        debug!(dir = %base.display(), "using loose GTFS files");
        return Ok(FeedSource::Directory(base.to_path_buf()));
    }

    for dir in entries.iter().filter(|p| p.is_dir()) {
        if has_required_files(dir) {
            debug!(dir = %dir.display(), "using GTFS subdirectory");
            return Ok(FeedSource::Directory(dir.clone()));
        }
    }

    Err(FeedError::InvalidFeedLayout {
        path: base.to_path_buf(),
        required: REQUIRED_FILES.join(", "),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn write_loose(dir: &Path) {
        for (name, contents) in core_files("") {
            fs::write(dir.join(name), contents).unwrap();
        }
    }

    fn zip_core(path: &Path, prefix: &str) {
        let files = core_files(prefix);
        let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        write_zip(path, &refs);
    }

    #[test]
    fn prefers_archive_named_gtfs() {
        let dir = tempfile::tempdir().unwrap();
        zip_core(&dir.path().join("aaa.zip"), "");
        zip_core(&dir.path().join("metz_gtfs.zip"), "");

        let source = resolve_feed(dir.path()).unwrap();
        assert_eq!(
            source,
            FeedSource::Archive {
                path: dir.path().join("metz_gtfs.zip"),
                prefix: String::new()
            }
        );
    }

    #[test]
    fn falls_back_to_any_archive() {
        let dir = tempfile::tempdir().unwrap();
        zip_core(&dir.path().join("network.zip"), "");

        let source = resolve_feed(dir.path()).unwrap();
        assert!(matches!(source, FeedSource::Archive { .. }));
    }

    #[test]
    fn finds_files_nested_in_archive_folder() {
        let dir = tempfile::tempdir().unwrap();
        zip_core(&dir.path().join("gtfs.zip"), "export/");

        let source = resolve_feed(dir.path()).unwrap();
        assert_eq!(
            source,
            FeedSource::Archive {
                path: dir.path().join("gtfs.zip"),
                prefix: "export/".into()
            }
        );
        let stops = source.read_file("stops.txt").unwrap().unwrap();
        assert!(String::from_utf8(stops).unwrap().starts_with("stop_id"));
        assert!(source.read_file("calendar.txt").unwrap().is_none());
    }

    #[test]
    fn incomplete_archive_falls_through_to_loose_files() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(&dir.path().join("gtfs.zip"), &[("stops.txt", "stop_id\n")]);
        write_loose(dir.path());

        let source = resolve_feed(dir.path()).unwrap();
        assert_eq!(source, FeedSource::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn finds_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("feed");
        fs::create_dir(&sub).unwrap();
        write_loose(&sub);

        assert_eq!(resolve_feed(dir.path()).unwrap(), FeedSource::Directory(sub));
    }

    #[test]
    fn missing_feed_is_invalid_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stops.txt"), "stop_id\n").unwrap();

        let err = resolve_feed(dir.path()).unwrap_err();
        assert!(matches!(err, FeedError::InvalidFeedLayout { .. }));
    }
}
