//! In-memory catalog of playable tracks grouped by category.
//!
//! The catalog is rebuilt wholesale whenever a content source is enumerated.
//! Changing the selected category never touches the content, only the
//! selection.

use std::fmt;
use std::num::NonZeroUsize;

use indexmap::IndexMap;
use rand::RngCore;

/// Category key used for tracks that do not belong to any named category.
///
/// Remote sources put their whole flat listing here, local sources use it for
/// files sitting directly in the storage root.
pub const UNCATEGORIZED: &str = "";

/// A single playable content identifier (filesystem path or URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track(String);

impl Track {
    /// Creates a track from its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Track {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Track {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Category name → tracks, plus the currently selected category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: IndexMap<String, Vec<Track>>,
    selected: Option<String>,
}

impl Catalog {
    /// Creates an empty catalog with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog holding a single uncategorized track list.
    pub fn from_flat(tracks: Vec<Track>) -> Self {
        let mut categories = IndexMap::new();
        categories.insert(UNCATEGORIZED.to_string(), tracks);
        Self {
            categories,
            selected: None,
        }
    }

    /// Creates the category if it does not exist yet.
    pub fn ensure_category(&mut self, name: &str) {
        if !self.categories.contains_key(name) {
            self.categories.insert(name.to_string(), Vec::new());
        }
    }

    /// Appends a track to a category, creating the category when needed.
    pub fn push_track(&mut self, category: &str, track: Track) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(track);
    }

    /// Category names in insertion order.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted cheaply.
    pub fn category_names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.categories.keys().map(String::as_str)
    }

    /// Tracks of the selected category; empty when nothing or an unknown
    /// category is selected.
    pub fn active_tracks(&self) -> &[Track] {
        self.selected
            .as_deref()
            .and_then(|name| self.categories.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Tracks of the named category, if it exists.
    pub fn tracks(&self, name: &str) -> Option<&[Track]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Selects a category. Unknown names are accepted and yield no tracks.
    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = Some(name.into());
    }

    /// The selected category name, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns true if the category exists.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Number of tracks across all categories.
    pub fn total_tracks(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Returns true if there are no categories at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Selects the configured default after an enumeration.
    ///
    /// Falls back to the first category when the default is missing so that
    /// the selection always names an existing category. An empty catalog keeps
    /// nothing selected.
    pub fn apply_default_selection(&mut self, default: Option<&str>) {
        if let Some(name) = default {
            if self.contains(name) {
                self.selected = Some(name.to_string());
                return;
            }
            log::warn!(
                "[Catalog] Default category {:?} not found, falling back to first category",
                name
            );
        }
        self.selected = self.categories.keys().next().cloned();
    }
}

/// Picks an index into a non-empty sequence: a random 32-bit value modulo
/// `len`.
pub fn random_index<R: RngCore + ?Sized>(len: NonZeroUsize, rng: &mut R) -> usize {
    rng.next_u32() as usize % len.get()
}
