//! ROM catalog management for MAMEly
//!
//! Loads the per-platform `MAMEly.xml` catalog, applies skip rules, derives
//! the genre/rating categories and persists favorite/ignore toggles back to
//! disk with a write-temp-then-rename protocol.

mod lists;
mod record;
mod scanner;
mod store;
mod view;
mod xml;

pub use lists::{FLAGS_FILE, PlatformFiles, RunFlags, SKIP_GENRE_FILE, SKIP_RATING_FILE, SkipLists, SkipReason};
pub use record::{GENERAL, GameRecord, title_case};
pub use scanner::{FsRomDirectory, RomDirectory, RomFile, retain_present};
pub use store::{
    CATALOG_FILE, CatalogStore, FAVORITES_FILE, IGNORE_FILE, LoadOptions, LoadWarning,
    save_catalog,
};
pub use view::{CatalogView, Category, GenreIndex, Toggled, ViewState, build_genre_index, games_for_category};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Malformed catalog {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Catalog write aborted for {path}: wrote {written} of {expected} games")]
    Write {
        path: PathBuf,
        expected: usize,
        written: usize,
    },

    #[error("Unknown game: {0}")]
    UnknownRecord(String),

    #[error("Catalog is not loaded")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
