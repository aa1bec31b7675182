//! ROM directory listing, used to mask a catalog down to the files on disk

use crate::GameRecord;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// A file found in a ROM directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomFile {
    /// Full file name, e.g. `pacman.zip`
    pub file_name: String,

    /// File name with the ROM extension removed, e.g. `pacman`
    pub stem: String,
}

impl RomFile {
    pub fn new(file_name: impl Into<String>, extension: &str) -> Self {
        let file_name = file_name.into();
        let stem = match file_name.strip_suffix(extension) {
            Some(stem) if !extension.is_empty() && !stem.is_empty() => stem.to_string(),
            _ => file_name.clone(),
        };

        Self { file_name, stem }
    }
}

/// Lists the ROM files of a directory
pub trait RomDirectory {
    fn list(&self, dir: &Path, extension: &str) -> io::Result<Vec<RomFile>>;
}

/// Reads the directory from the filesystem (regular files only, not recursive)
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRomDirectory;

impl RomDirectory for FsRomDirectory {
    fn list(&self, dir: &Path, extension: &str) -> io::Result<Vec<RomFile>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            files.push(RomFile::new(name, extension));
        }

        Ok(files)
    }
}

/// Keep only the records that have a file on disk.
///
/// Each file is matched by its stem first, then by its full file name (for
/// catalogs whose ids already carry the extension). Files with no catalog
/// entry contribute nothing.
pub fn retain_present(
    mut records: BTreeMap<String, GameRecord>,
    files: &[RomFile],
) -> BTreeMap<String, GameRecord> {
    let mut kept = BTreeMap::new();

    for file in files {
        if let Some(record) = records.remove(&file.stem) {
            kept.insert(file.stem.clone(), record);
        } else if let Some(record) = records.remove(&file.file_name) {
            kept.insert(file.file_name.clone(), record);
        }
    }

    if !records.is_empty() {
        tracing::debug!("{} catalog games have no ROM file", records.len());
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog(ids: &[&str]) -> BTreeMap<String, GameRecord> {
        ids.iter()
            .map(|id| (id.to_string(), GameRecord::new(*id, *id)))
            .collect()
    }

    #[test]
    fn test_rom_file_stem() {
        assert_eq!(RomFile::new("pacman.zip", ".zip").stem, "pacman");
        assert_eq!(RomFile::new("readme.txt", ".zip").stem, "readme.txt");
        assert_eq!(RomFile::new("pacman", "").stem, "pacman");
    }

    #[test]
    fn test_retain_present_by_stem() {
        let files = [
            RomFile::new("pacman.zip", ".zip"),
            RomFile::new("unknown.zip", ".zip"),
        ];
        let kept = retain_present(catalog(&["pacman", "galaga"]), &files);

        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("pacman"));
    }

    #[test]
    fn test_retain_present_falls_back_to_full_name() {
        let files = [RomFile::new("Zelda.smc", ".smc")];
        let kept = retain_present(catalog(&["Zelda.smc"]), &files);

        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("Zelda.smc"));
    }

    #[test]
    fn test_fs_directory_lists_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pacman.zip"), b"ROM").unwrap();
        fs::write(dir.path().join("galaga.zip"), b"ROM").unwrap();
        fs::create_dir(dir.path().join("samples")).unwrap();

        let mut files = FsRomDirectory.list(dir.path(), ".zip").unwrap();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].stem, "galaga");
        assert_eq!(files[1].stem, "pacman");
    }

    #[test]
    fn test_fs_directory_missing() {
        let dir = TempDir::new().unwrap();
        let result = FsRomDirectory.list(&dir.path().join("nope"), ".zip");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
