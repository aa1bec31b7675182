//! Browsable categories over a loaded catalog

use crate::scanner::{FsRomDirectory, RomDirectory};
use crate::store::{CatalogStore, LoadOptions};
use crate::{CatalogError, GENERAL, GameRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

const ALL_GAMES_LABEL: &str = "All Games";
const FAVORITES_LABEL: &str = "Favorites";
const IGNORE_LABEL: &str = "Ignore";
const RATING_PREFIX: &str = "Rating: ";

/// A browsing bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    AllGames,
    Favorites,
    Genre(String),
    Rating(String),
    Ignore,
}

impl Category {
    /// Parse a category label as produced by `Display`
    pub fn from_label(label: &str) -> Self {
        match label {
            ALL_GAMES_LABEL => Category::AllGames,
            FAVORITES_LABEL => Category::Favorites,
            IGNORE_LABEL => Category::Ignore,
            _ => match label.strip_prefix(RATING_PREFIX) {
                Some(rating) => Category::Rating(rating.to_string()),
                None => Category::Genre(label.to_string()),
            },
        }
    }

    /// Whether a record belongs to this category
    pub fn matches(&self, record: &GameRecord) -> bool {
        match self {
            Category::AllGames => !record.ignore,
            Category::Favorites => record.favorite,
            Category::Ignore => record.ignore,
            Category::Genre(genre) => record.genre == *genre && !record.ignore,
            Category::Rating(rating) => record.rating == *rating && !record.ignore,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::AllGames => f.write_str(ALL_GAMES_LABEL),
            Category::Favorites => f.write_str(FAVORITES_LABEL),
            Category::Ignore => f.write_str(IGNORE_LABEL),
            Category::Genre(genre) => f.write_str(genre),
            Category::Rating(rating) => write!(f, "{RATING_PREFIX}{rating}"),
        }
    }
}

/// Distinct genres and ratings of a record set, `General` excluded.
///
/// Flags play no part here, so toggles never change the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreIndex {
    genres: BTreeSet<String>,
    ratings: BTreeSet<String>,
}

impl GenreIndex {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a GameRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if record.genre != GENERAL {
                index.genres.insert(record.genre.clone());
            }
            if record.rating != GENERAL {
                index.ratings.insert(record.rating.clone());
            }
        }
        index
    }

    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    pub fn ratings(&self) -> &BTreeSet<String> {
        &self.ratings
    }

    /// All categories in browsing order: `All Games`, `Favorites`, genres,
    /// ratings, `Ignore`. Genres and ratings are sorted separately so that
    /// ratings always follow every genre.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::with_capacity(self.genres.len() + self.ratings.len() + 3);
        categories.push(Category::AllGames);
        categories.push(Category::Favorites);
        categories.extend(self.genres.iter().cloned().map(Category::Genre));
        categories.extend(self.ratings.iter().cloned().map(Category::Rating));
        categories.push(Category::Ignore);
        categories
    }
}

pub fn build_genre_index(records: &BTreeMap<String, GameRecord>) -> Vec<Category> {
    GenreIndex::from_records(records.values()).categories()
}

/// Records of a category sorted by display name, ties broken by id
pub fn games_for_category<'a>(
    category: &Category,
    records: impl IntoIterator<Item = &'a GameRecord>,
) -> Vec<&'a GameRecord> {
    let mut games: Vec<&GameRecord> = records
        .into_iter()
        .filter(|record| category.matches(record))
        .collect();
    games.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.id.cmp(&b.id))
    });
    games
}

/// Lifecycle of the view for one platform session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unloaded,
    Loading,
    Ready,
}

/// Result of a flag toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    /// Catalog key of the toggled game
    pub id: String,

    /// New flag value
    pub state: bool,

    /// The active category's game list is stale and must be re-queried
    pub invalidates_active: bool,
}

/// Query layer over the store of the selected platform
#[derive(Debug)]
pub struct CatalogView {
    state: ViewState,
    store: Option<CatalogStore>,
    categories: Vec<Category>,
    active: Category,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            state: ViewState::Unloaded,
            store: None,
            categories: Vec::new(),
            active: Category::Favorites,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Load (or reload) a platform catalog, replacing any previous one.
    ///
    /// On failure the view is left `Unloaded`: a stale catalog is never kept.
    pub fn load(&mut self, path: impl Into<PathBuf>, options: &LoadOptions) -> Result<(), CatalogError> {
        self.load_with(path, options, &FsRomDirectory)
    }

    pub fn load_with(
        &mut self,
        path: impl Into<PathBuf>,
        options: &LoadOptions,
        directory: &dyn RomDirectory,
    ) -> Result<(), CatalogError> {
        self.unload();
        self.state = ViewState::Loading;

        let store = match CatalogStore::load_with(path, options, directory) {
            Ok(store) => store,
            Err(e) => {
                self.state = ViewState::Unloaded;
                return Err(e);
            }
        };

        self.categories = build_genre_index(store.records());
        self.active = Category::Favorites;
        self.store = Some(store);
        self.state = ViewState::Ready;
        Ok(())
    }

    pub fn unload(&mut self) {
        self.store = None;
        self.categories.clear();
        self.active = Category::Favorites;
        self.state = ViewState::Unloaded;
    }

    fn ready_store(&self) -> Result<&CatalogStore, CatalogError> {
        match (&self.state, &self.store) {
            (ViewState::Ready, Some(store)) => Ok(store),
            _ => Err(CatalogError::NotReady),
        }
    }

    fn ready_store_mut(&mut self) -> Result<&mut CatalogStore, CatalogError> {
        match (&self.state, &mut self.store) {
            (ViewState::Ready, Some(store)) => Ok(store),
            _ => Err(CatalogError::NotReady),
        }
    }

    pub fn store(&self) -> Result<&CatalogStore, CatalogError> {
        self.ready_store()
    }

    pub fn categories(&self) -> Result<&[Category], CatalogError> {
        self.ready_store()?;
        Ok(&self.categories)
    }

    pub fn active_category(&self) -> &Category {
        &self.active
    }

    pub fn select_category(&mut self, category: Category) -> Result<(), CatalogError> {
        self.ready_store()?;
        self.active = category;
        Ok(())
    }

    /// Advance to the next category in index order, wrapping around
    pub fn next_category(&mut self) -> Result<&Category, CatalogError> {
        self.ready_store()?;
        let next = self
            .categories
            .iter()
            .position(|c| *c == self.active)
            .map_or(0, |i| (i + 1) % self.categories.len());
        self.active = self.categories[next].clone();
        Ok(&self.active)
    }

    /// Games of the active category
    pub fn games(&self) -> Result<Vec<&GameRecord>, CatalogError> {
        self.games_for(&self.active)
    }

    pub fn games_for(&self, category: &Category) -> Result<Vec<&GameRecord>, CatalogError> {
        let store = self.ready_store()?;
        Ok(games_for_category(category, store.records().values()))
    }

    /// Toggle a favorite. `Favorites` membership changes, and `All Games`
    /// shows the flag on every row, so both are reported stale.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Toggled, CatalogError> {
        let store = self.ready_store_mut()?;
        let state = store.toggle_favorite(id)?;
        let id = store.resolve(id).unwrap_or(id).to_string();

        Ok(Toggled {
            id,
            state,
            invalidates_active: matches!(self.active, Category::Favorites | Category::AllGames),
        })
    }

    /// Toggle ignore. Every list except `Favorites` filters on this flag.
    pub fn toggle_ignore(&mut self, id: &str) -> Result<Toggled, CatalogError> {
        let store = self.ready_store_mut()?;
        let state = store.toggle_ignore(id)?;
        let id = store.resolve(id).unwrap_or(id).to_string();

        Ok(Toggled {
            id,
            state,
            invalidates_active: self.active != Category::Favorites,
        })
    }
}
