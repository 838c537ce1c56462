//! Local storage source.
//!
//! Shape rule: every top-level directory is a category, created even when it
//! holds no files. Files anywhere below a top-level directory fold into that
//! directory's category. Files directly in the root are uncategorized.
//! Hidden entries (leading `.`) are skipped, directories with their subtree.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use walkdir::{DirEntry, WalkDir};

use super::ContentSource;
use crate::catalog::{Catalog, Track, UNCATEGORIZED};
use crate::decoder::{DecodeEngine, TrackLocation};
use crate::error::NodeError;

/// Content source backed by a mounted directory tree.
pub struct LocalSource {
    root: Option<PathBuf>,
    running: AtomicBool,
}

impl LocalSource {
    /// Mounts the volume at `root`.
    ///
    /// A root that is not a readable directory is logged and leaves the
    /// source unmounted.
    pub fn mount(root: PathBuf) -> Self {
        let root = match std::fs::read_dir(&root) {
            Ok(_) => {
                log::info!("[LocalSource] Mounted {}", root.display());
                Some(root)
            }
            Err(e) => {
                let err = NodeError::SourceUnavailable(format!("{}: {}", root.display(), e));
                log::warn!("[LocalSource] {}", err);
                None
            }
        };
        Self {
            root,
            running: AtomicBool::new(false),
        }
    }

    /// Returns true if the volume was mounted.
    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Name of the top-level directory containing `path`, if any.
fn top_level_category(root: &Path, path: &Path) -> Option<String> {
    match path.strip_prefix(root).ok()?.components().next()? {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Walks `root` into a catalog. Runs on the blocking pool.
pub(crate) fn walk_catalog(root: &Path) -> Catalog {
    let mut catalog = Catalog::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("[LocalSource] Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if entry.depth() == 1 {
                catalog.ensure_category(&entry.file_name().to_string_lossy());
            }
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let track = Track::new(entry.path().to_string_lossy().into_owned());
        if entry.depth() == 1 {
            catalog.push_track(UNCATEGORIZED, track);
        } else if let Some(category) = top_level_category(root, entry.path()) {
            catalog.push_track(&category, track);
        }
    }

    catalog
}

#[async_trait]
impl ContentSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn enumerate(&self) -> Catalog {
        let Some(root) = self.root.clone() else {
            log::warn!("[LocalSource] Volume not mounted, catalog is empty");
            return Catalog::new();
        };

        match tokio::task::spawn_blocking(move || walk_catalog(&root)).await {
            Ok(catalog) => {
                log::info!(
                    "[LocalSource] Enumerated {} categories, {} tracks",
                    catalog.category_names().count(),
                    catalog.total_tracks()
                );
                catalog
            }
            Err(e) => {
                log::error!("[LocalSource] Directory walk aborted: {}", e);
                Catalog::new()
            }
        }
    }

    fn play(&self, track: &Track, engine: &dyn DecodeEngine) -> bool {
        let location = TrackLocation::File(PathBuf::from(track.as_str()));
        if engine.connect_to_source(&location) {
            self.running.store(true, Ordering::SeqCst);
            true
        } else {
            log::warn!("[LocalSource] Engine refused {}", track);
            false
        }
    }

    fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEngine;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"ID3").unwrap();
    }

    #[tokio::test]
    async fn top_level_directories_become_categories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("rock/a.mp3"));
        touch(&root.join("rock/live/1999/b.mp3"));
        touch(&root.join("jazz/c.flac"));
        touch(&root.join("loose.mp3"));
        fs::create_dir_all(root.join("empty")).unwrap();

        let source = LocalSource::mount(root.to_path_buf());
        let catalog = source.enumerate().await;

        let names: Vec<_> = catalog.category_names().collect();
        assert_eq!(names, vec!["empty", "jazz", UNCATEGORIZED, "rock"]);
        assert_eq!(catalog.tracks("rock").map(<[Track]>::len), Some(2));
        assert_eq!(catalog.tracks("empty").map(<[Track]>::len), Some(0));
        let loose = catalog.tracks(UNCATEGORIZED).unwrap();
        assert!(loose[0].as_str().ends_with("loose.mp3"));
    }

    #[tokio::test]
    async fn hidden_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join(".Trashes/rock.mp3"));
        touch(&root.join("rock/.DS_Store"));
        touch(&root.join("rock/.hidden/x.mp3"));
        touch(&root.join("rock/a.mp3"));

        let catalog = LocalSource::mount(root.to_path_buf()).enumerate().await;
        let names: Vec<_> = catalog.category_names().collect();
        assert_eq!(names, vec!["rock"]);
        assert_eq!(catalog.total_tracks(), 1);
    }

    #[tokio::test]
    async fn unmounted_source_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::mount(dir.path().join("missing"));
        assert!(!source.is_mounted());
        assert!(source.enumerate().await.is_empty());
    }

    #[test]
    fn play_hands_file_to_engine_and_sets_running() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::mount(dir.path().to_path_buf());
        let engine = FakeEngine::new();

        assert!(!source.is_running());
        assert!(source.play(&Track::from("/media/sd/rock/a.mp3"), &engine));
        assert!(source.is_running());
        assert_eq!(
            engine.last_location(),
            Some(TrackLocation::File(PathBuf::from("/media/sd/rock/a.mp3")))
        );

        source.pause();
        assert!(!source.is_running());
        source.resume();
        assert!(source.is_running());
    }

    #[test]
    fn refused_track_leaves_source_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::mount(dir.path().to_path_buf());
        let engine = FakeEngine::new();
        engine.refuse_connections(true);
        assert!(!source.play(&Track::from("/bad.mp3"), &engine));
        assert!(!source.is_running());
    }
}
