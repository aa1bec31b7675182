//! Game records and field normalization

use crate::xml::CatalogEntry;

/// Category used for a missing genre or rating
pub const GENERAL: &str = "General";

/// One game in a platform catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Catalog key, also the ROM file stem passed to the emulator
    pub id: String,

    /// Human-readable title (the catalog `description`, title-cased)
    pub display_name: String,

    /// Genre, never empty
    pub genre: String,

    /// Rating, never empty
    pub rating: String,

    pub favorite: bool,

    pub ignore: bool,
}

impl GameRecord {
    /// Create a record with `General` genre and rating and no flags set
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            genre: GENERAL.to_string(),
            rating: GENERAL.to_string(),
            favorite: false,
            ignore: false,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.favorite = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Build a record from a raw catalog node, applying load-time normalization
    pub(crate) fn from_entry(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            display_name: title_case(entry.description.trim()),
            genre: normalize_genre(&entry.genre),
            rating: normalize_rating(&entry.rating),
            favorite: entry.favorite,
            ignore: entry.ignore,
        }
    }
}

/// Title-case a string: a letter following a non-letter is uppercased,
/// every other letter is lowercased (`"pac-man II"` becomes `"Pac-Man Ii"`).
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_cased {
                out.extend(c.to_lowercase());
            } else {
                // Only the first char of a multi-char expansion stays upper ("ß" gives "Ss")
                let mut upper = c.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            previous_cased = true;
        } else {
            out.push(c);
            previous_cased = false;
        }
    }

    out
}

/// Title-case, drop any `/` disambiguation suffix, default to `General`
fn normalize_genre(raw: &str) -> String {
    let genre = title_case(raw.trim());
    let genre = match genre.split_once('/') {
        Some((head, _)) => head.trim(),
        None => genre.as_str(),
    };

    if genre.is_empty() {
        GENERAL.to_string()
    } else {
        genre.to_string()
    }
}

fn normalize_rating(raw: &str) -> String {
    let rating = raw.trim();
    if rating.is_empty() {
        GENERAL.to_string()
    } else {
        rating.to_string()
    }
}
