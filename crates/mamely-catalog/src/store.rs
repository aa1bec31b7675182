//! Catalog storage: load from and persist to `MAMEly.xml`

use crate::scanner::{FsRomDirectory, RomDirectory, retain_present};
use crate::xml::{parse_catalog, render_catalog};
use crate::{CatalogError, GameRecord, SkipLists};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const CATALOG_FILE: &str = "MAMEly.xml";
pub const FAVORITES_FILE: &str = "favorites.txt";
pub const IGNORE_FILE: &str = "ignore.txt";

const GENERATOR: &str = concat!("mamely-catalog ", env!("CARGO_PKG_VERSION"));

/// Parameters for loading a catalog
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub skip: SkipLists,

    /// Directory holding the ROM files
    pub rom_directory: Option<PathBuf>,

    /// ROM file extension including the dot, e.g. `.zip`
    pub rom_extension: String,

    /// Keep only games with a matching file in `rom_directory`
    pub compare_against_directory: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_lists(mut self, skip: SkipLists) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_rom_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rom_directory = Some(dir.into());
        self
    }

    pub fn with_rom_extension(mut self, extension: impl Into<String>) -> Self {
        self.rom_extension = extension.into();
        self
    }

    /// Mask the catalog with the contents of the ROM directory
    pub fn compare_against_directory(mut self) -> Self {
        self.compare_against_directory = true;
        self
    }
}

/// Conditions recovered from during a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// No catalog file yet; the store starts empty
    CatalogNotFound(PathBuf),

    /// Directory comparison was requested but the ROM directory is missing
    RomDirectoryMissing(PathBuf),

    /// Directory comparison was requested without a ROM directory
    NoRomDirectory,
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Favorite,
    Ignore,
}

/// The games of one platform and their favorite/ignore flags.
///
/// Every flag change is written through to the catalog file before the
/// toggle returns.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    rom_extension: String,
    records: BTreeMap<String, GameRecord>,
    warnings: Vec<LoadWarning>,
    writes: u64,
}

impl CatalogStore {
    /// Create a store over an in-memory record set
    pub fn new(path: impl Into<PathBuf>, records: impl IntoIterator<Item = GameRecord>) -> Self {
        Self {
            path: path.into(),
            rom_extension: String::new(),
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            warnings: Vec::new(),
            writes: 0,
        }
    }

    /// Load a catalog file
    pub fn load(path: impl Into<PathBuf>, options: &LoadOptions) -> Result<Self, CatalogError> {
        Self::load_with(path, options, &FsRomDirectory)
    }

    /// Load a catalog file, listing ROMs through `directory`
    pub fn load_with(
        path: impl Into<PathBuf>,
        options: &LoadOptions,
        directory: &dyn RomDirectory,
    ) -> Result<Self, CatalogError> {
        let path = path.into();
        let mut warnings = Vec::new();

        tracing::info!("Loading catalog {}", path.display());

        let text = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Catalog {} not found, starting empty", path.display());
                warnings.push(LoadWarning::CatalogNotFound(path.clone()));
                None
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(CatalogError::Parse {
                    path,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let entries = match text {
            Some(text) => parse_catalog(&path, &text)?,
            None => Vec::new(),
        };
        let total = entries.len();

        let mut records = BTreeMap::new();
        for entry in entries {
            if entry.id.is_empty() {
                tracing::warn!("Skipping game without a name attribute");
                continue;
            }

            let record = GameRecord::from_entry(entry);
            if let Some(reason) = options.skip.excludes(&record) {
                tracing::debug!("Skipping {} ({:?})", record.id, reason);
                continue;
            }

            let id = record.id.clone();
            if records.insert(id, record).is_some() {
                tracing::debug!("Duplicate game id, keeping the last entry");
            }
        }

        if options.compare_against_directory {
            records = Self::mask(records, options, directory, &mut warnings)?;
        }

        tracing::info!(
            "Loaded {} of {} catalog games from {}",
            records.len(),
            total,
            path.display()
        );

        Ok(Self {
            path,
            rom_extension: options.rom_extension.clone(),
            records,
            warnings,
            writes: 0,
        })
    }

    fn mask(
        records: BTreeMap<String, GameRecord>,
        options: &LoadOptions,
        directory: &dyn RomDirectory,
        warnings: &mut Vec<LoadWarning>,
    ) -> Result<BTreeMap<String, GameRecord>, CatalogError> {
        let Some(dir) = options.rom_directory.as_deref() else {
            tracing::warn!("Directory comparison enabled without a ROM directory");
            warnings.push(LoadWarning::NoRomDirectory);
            return Ok(BTreeMap::new());
        };

        tracing::info!("Comparing catalog against {}", dir.display());

        match directory.list(dir, &options.rom_extension) {
            Ok(files) => Ok(retain_present(records, &files)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("ROM directory {} not found", dir.display());
                warnings.push(LoadWarning::RomDirectoryMissing(dir.to_path_buf()));
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &BTreeMap<String, GameRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Number of successful catalog writes since the store was created
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Resolve an id to its catalog key: the bare id first, then the id
    /// with the ROM extension appended.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        if let Some((key, _)) = self.records.get_key_value(id) {
            return Some(key);
        }
        if self.rom_extension.is_empty() {
            return None;
        }

        let with_extension = format!("{id}{}", self.rom_extension);
        self.records
            .get_key_value(&with_extension)
            .map(|(key, _)| key.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.resolve(id).and_then(|key| self.records.get(key))
    }

    /// Persist the full record set
    pub fn save(&mut self) -> Result<(), CatalogError> {
        save_catalog(&self.path, &self.records)?;
        self.writes += 1;
        Ok(())
    }

    /// Flip the favorite flag, persist, and return the new value
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, CatalogError> {
        self.toggle(id, Flag::Favorite)
    }

    /// Flip the ignore flag, persist, and return the new value
    pub fn toggle_ignore(&mut self, id: &str) -> Result<bool, CatalogError> {
        self.toggle(id, Flag::Ignore)
    }

    fn toggle(&mut self, id: &str, flag: Flag) -> Result<bool, CatalogError> {
        let key = self
            .resolve(id)
            .ok_or_else(|| CatalogError::UnknownRecord(id.to_string()))?
            .to_string();

        let state = self.flip(&key, flag);
        if let Err(e) = self.save() {
            // The file on disk is still the previous catalog; match it
            self.flip(&key, flag);
            return Err(e);
        }

        tracing::info!("{} {:?} -> {}", key, flag, state);
        Ok(state)
    }

    fn flip(&mut self, key: &str, flag: Flag) -> bool {
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        let value = match flag {
            Flag::Favorite => &mut record.favorite,
            Flag::Ignore => &mut record.ignore,
        };
        *value = !*value;
        *value
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write the serialized catalog to `<path>.tmp`.
///
/// Fails without touching `path` when fewer games were written than requested.
pub(crate) fn stage(
    path: &Path,
    records: &BTreeMap<String, GameRecord>,
) -> Result<PathBuf, CatalogError> {
    let generated_at = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string();
    let (document, written) = render_catalog(records.values(), &generated_at, GENERATOR)?;

    if written != records.len() {
        tracing::error!(
            "Catalog write aborted: {} of {} games serialized",
            written,
            records.len()
        );
        return Err(CatalogError::Write {
            path: path.to_path_buf(),
            expected: records.len(),
            written,
        });
    }

    let tmp_path = sibling(path, ".tmp");
    let result = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(&document)?;
        file.sync_all()
    });
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(tmp_path)
}

/// Replace the live catalog with a staged one, keeping the previous file as `.old`
pub(crate) fn commit(path: &Path, staged: &Path) -> Result<(), CatalogError> {
    if path.exists() {
        let backup = sibling(path, ".old");
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        fs::rename(path, &backup)?;
    }
    fs::rename(staged, path)?;
    Ok(())
}

/// Write `favorites.txt` and `ignore.txt` next to the catalog
fn write_companion_lists(dir: &Path, records: &BTreeMap<String, GameRecord>) -> io::Result<()> {
    let mut favorites = String::new();
    let mut ignored = String::new();

    for record in records.values() {
        if record.favorite {
            favorites.push_str(&record.id);
            favorites.push('\n');
        }
        if record.ignore {
            ignored.push_str(&record.id);
            ignored.push('\n');
        }
    }

    fs::write(dir.join(FAVORITES_FILE), favorites)?;
    fs::write(dir.join(IGNORE_FILE), ignored)?;
    Ok(())
}

/// Serialize `records` to `path` with the temp-file-then-rename protocol and
/// refresh the companion id lists.
///
/// Returns `Ok` once the live catalog has been replaced. The companion lists
/// are never read back, so failing to write them only logs a warning.
pub fn save_catalog(
    path: &Path,
    records: &BTreeMap<String, GameRecord>,
) -> Result<(), CatalogError> {
    let staged = stage(path, records)?;
    commit(path, &staged)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if let Err(e) = write_companion_lists(dir, records) {
        tracing::warn!("Cannot write id lists in {}: {}", dir.display(), e);
    }

    tracing::info!("Saved {} games to {}", records.len(), path.display());
    Ok(())
}
