//! Platform side files: skip lists and per-game run flags

use crate::{CatalogError, GameRecord};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::Path;

pub const SKIP_GENRE_FILE: &str = "_skipGenre.txt";
pub const SKIP_RATING_FILE: &str = "_skipRating.txt";
pub const FLAGS_FILE: &str = "_flags.txt";

/// Genre tag left behind by arcade database exports; always dropped
const TITLE_TAG_PREFIX: &str = "Ttl -";

/// Why a record was dropped at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TitleTag,
    Genre,
    Rating,
}

/// Genres and ratings whose records are excluded from a loaded catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipLists {
    pub genres: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
}

impl SkipLists {
    pub fn new<G, R>(genres: G, ratings: R) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
            ratings: ratings.into_iter().map(Into::into).collect(),
        }
    }

    /// Check a normalized record against the skip rules
    pub fn excludes(&self, record: &GameRecord) -> Option<SkipReason> {
        if record.genre.starts_with(TITLE_TAG_PREFIX) {
            Some(SkipReason::TitleTag)
        } else if self.genres.contains(&record.genre) {
            Some(SkipReason::Genre)
        } else if self.ratings.contains(&record.rating) {
            Some(SkipReason::Rating)
        } else {
            None
        }
    }
}

/// Extra emulator command-line flags, keyed by game id
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    flags: HashMap<String, String>,
}

impl RunFlags {
    /// Parse `id=flags` lines; lines containing `#` or no `=` are ignored
    pub fn parse(text: &str) -> Self {
        let flags = text
            .lines()
            .filter(|line| !line.contains('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(id, flags)| (id.trim().to_string(), flags.trim().to_string()))
            .filter(|(id, _)| !id.is_empty())
            .collect();

        Self { flags }
    }

    /// Flags for a game, empty when none are configured
    pub fn flags_for(&self, id: &str) -> &str {
        self.flags.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Parse a newline-delimited skip list; lines containing `#` are comments
fn parse_skip_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter(|line| !line.contains('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read an optional side file. An absent file is `None`, not an error.
fn read_optional(path: &Path) -> Result<Option<String>, CatalogError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not present, using an empty list", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Side files of a platform directory
#[derive(Debug, Clone, Default)]
pub struct PlatformFiles {
    pub skip: SkipLists,
    pub flags: RunFlags,
}

impl PlatformFiles {
    pub fn load(platform_dir: &Path) -> Result<Self, CatalogError> {
        let genres = read_optional(&platform_dir.join(SKIP_GENRE_FILE))?
            .map(|text| parse_skip_list(&text))
            .unwrap_or_default();
        let ratings = read_optional(&platform_dir.join(SKIP_RATING_FILE))?
            .map(|text| parse_skip_list(&text))
            .unwrap_or_default();
        let flags = read_optional(&platform_dir.join(FLAGS_FILE))?
            .map(|text| RunFlags::parse(&text))
            .unwrap_or_default();

        tracing::info!(
            "Platform files: {} skipped genres, {} skipped ratings, {} flag entries",
            genres.len(),
            ratings.len(),
            flags.len()
        );

        Ok(Self {
            skip: SkipLists { genres, ratings },
            flags,
        })
    }
}
