//! Integration tests for catalog loading, views and persistence

use mamely_catalog::{
    CATALOG_FILE, CatalogError, CatalogStore, CatalogView, Category, GameRecord, LoadOptions,
    LoadWarning, PlatformFiles, RomDirectory, RomFile, SKIP_GENRE_FILE, SkipLists, ViewState,
    save_catalog,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment holding one platform directory
struct PlatformTestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    platform_dir: PathBuf,
    catalog_path: PathBuf,
}

impl PlatformTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let platform_dir = temp_dir.path().join("MAME");
        fs::create_dir_all(&platform_dir).unwrap();
        let catalog_path = platform_dir.join(CATALOG_FILE);

        Self {
            temp_dir,
            platform_dir,
            catalog_path,
        }
    }

    fn write_catalog(&self, games: &str) {
        let xml = format!(
            r#"<?xml version="1.0"?>
<menu>
  <header>
    <listname>MAMEly</listname>
    <lastlistupdate>2024-01-01 00:00:00</lastlistupdate>
    <listgeneratorversion>test</listgeneratorversion>
  </header>
{games}
</menu>
"#
        );
        fs::write(&self.catalog_path, xml).unwrap();
    }

    fn write_scenario_catalog(&self) {
        self.write_catalog(
            r#"  <game name="pacman">
     <description>pac-man</description>
     <genre>Maze</genre>
     <rating></rating>
     <favorite>0</favorite>
     <ignore>0</ignore>
  </game>
  <game name="ttl001">
     <description>test title</description>
     <genre>Ttl - Test</genre>
     <favorite>0</favorite>
     <ignore>0</ignore>
  </game>"#,
        );
    }

    fn load_view(&self, options: &LoadOptions) -> CatalogView {
        let mut view = CatalogView::new();
        view.load(&self.catalog_path, options).unwrap();
        view
    }
}

/// Fixed directory listing
struct FakeRomDirectory(Vec<&'static str>);

impl RomDirectory for FakeRomDirectory {
    fn list(&self, _dir: &Path, extension: &str) -> io::Result<Vec<RomFile>> {
        Ok(self.0.iter().map(|name| RomFile::new(*name, extension)).collect())
    }
}

fn ids(games: &[&GameRecord]) -> Vec<String> {
    games.iter().map(|g| g.id.clone()).collect()
}

#[test]
fn test_scenario_load_and_genre_query() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();

    let view = env.load_view(&LoadOptions::new());
    let store = view.store().unwrap();

    assert_eq!(store.len(), 1);
    let pacman = store.get("pacman").unwrap();
    assert_eq!(pacman.rating, "General");
    assert_eq!(pacman.display_name, "Pac-Man");

    let maze = view.games_for(&Category::Genre("Maze".into())).unwrap();
    assert_eq!(ids(&maze), ["pacman"]);
}

#[test]
fn test_scenario_favorite_toggle() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let mut view = env.load_view(&LoadOptions::new());

    let toggled = view.toggle_favorite("pacman").unwrap();
    assert!(toggled.state);
    let favorites = view.games_for(&Category::Favorites).unwrap();
    assert_eq!(ids(&favorites), ["pacman"]);

    let toggled = view.toggle_favorite("pacman").unwrap();
    assert!(!toggled.state);
    assert!(view.games_for(&Category::Favorites).unwrap().is_empty());
}

#[test]
fn test_toggle_twice_restores_and_writes_twice() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();

    let mut store = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();
    let before = store.get("pacman").unwrap().favorite;

    store.toggle_favorite("pacman").unwrap();
    store.toggle_favorite("pacman").unwrap();

    assert_eq!(store.get("pacman").unwrap().favorite, before);
    assert_eq!(store.writes(), 2);
}

#[test]
fn test_toggle_is_written_through() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();

    let mut store = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();
    store.toggle_ignore("pacman").unwrap();

    let reloaded = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();
    assert!(reloaded.get("pacman").unwrap().ignore);

    let backup = env.platform_dir.join(format!("{CATALOG_FILE}.old"));
    assert!(backup.exists());
    assert!(fs::read_to_string(backup).unwrap().contains("ttl001"));
    assert_eq!(
        fs::read_to_string(env.platform_dir.join("ignore.txt")).unwrap(),
        "pacman\n"
    );
}

#[test]
fn test_toggle_unknown_id() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let before = fs::read_to_string(&env.catalog_path).unwrap();

    let mut view = env.load_view(&LoadOptions::new());
    let result = view.toggle_favorite("galaga");

    assert!(matches!(result, Err(CatalogError::UnknownRecord(id)) if id == "galaga"));
    assert_eq!(view.store().unwrap().writes(), 0);
    assert_eq!(fs::read_to_string(&env.catalog_path).unwrap(), before);
}

#[test]
fn test_round_trip() {
    let env = PlatformTestEnv::new();
    let records: BTreeMap<String, GameRecord> = [
        GameRecord::new("pacman", "Pac-Man").with_genre("Maze"),
        GameRecord::new("galaga", "Galaga")
            .with_genre("Shooter")
            .with_rating("Mature")
            .favorite(),
        GameRecord::new("b&b", "Cops & Robbers").ignored(),
        GameRecord::new("dkong", "Donkey Kong").favorite().ignored(),
    ]
    .into_iter()
    .map(|r| (r.id.clone(), r))
    .collect();

    save_catalog(&env.catalog_path, &records).unwrap();
    let loaded = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();

    assert_eq!(loaded.records(), &records);
    assert!(loaded.warnings().is_empty());
}

#[test]
fn test_all_games_and_ignore_partition_the_catalog() {
    let env = PlatformTestEnv::new();
    env.write_catalog(
        r#"  <game name="a"><description>A</description><genre>Maze</genre></game>
  <game name="b"><description>B</description><ignore>1</ignore></game>
  <game name="c"><description>C</description><favorite>1</favorite><ignore>1</ignore></game>
  <game name="d"><description>D</description><favorite>1</favorite></game>"#,
    );
    let view = env.load_view(&LoadOptions::new());

    let all: BTreeSet<String> = ids(&view.games_for(&Category::AllGames).unwrap())
        .into_iter()
        .collect();
    let ignored: BTreeSet<String> = ids(&view.games_for(&Category::Ignore).unwrap())
        .into_iter()
        .collect();
    let every: BTreeSet<String> = view.store().unwrap().records().keys().cloned().collect();

    assert!(all.is_disjoint(&ignored));
    assert_eq!(all.union(&ignored).cloned().collect::<BTreeSet<_>>(), every);

    // Favorite and ignored at once: listed in both Favorites and Ignore
    let favorites = ids(&view.games_for(&Category::Favorites).unwrap());
    assert_eq!(favorites, ["c", "d"]);
}

#[test]
fn test_title_tag_is_never_listed() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    fs::write(env.platform_dir.join(SKIP_GENRE_FILE), "Casino\n").unwrap();

    let files = PlatformFiles::load(&env.platform_dir).unwrap();
    let view = env.load_view(&LoadOptions::new().with_skip_lists(files.skip));

    for category in view.categories().unwrap() {
        let games = view.games_for(category).unwrap();
        assert!(games.iter().all(|g| g.id != "ttl001"), "listed in {category}");
    }
}

#[test]
fn test_skip_lists_drop_records() {
    let env = PlatformTestEnv::new();
    env.write_catalog(
        r#"  <game name="poker"><description>Poker</description><genre>casino</genre></game>
  <game name="strip"><description>Strip</description><rating>Adults Only</rating></game>
  <game name="pacman"><description>Pac-Man</description><genre>Maze</genre></game>"#,
    );

    let skip = SkipLists::new(["Casino"], ["Adults Only"]);
    let store = CatalogStore::load(&env.catalog_path, &LoadOptions::new().with_skip_lists(skip)).unwrap();

    assert_eq!(store.records().keys().collect::<Vec<_>>(), ["pacman"]);
}

#[test]
fn test_duplicate_ids_last_wins() {
    let env = PlatformTestEnv::new();
    env.write_catalog(
        r#"  <game name="pacman"><description>First</description></game>
  <game name="pacman"><description>Second</description></game>"#,
    );

    let store = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("pacman").unwrap().display_name, "Second");
}

#[test]
fn test_missing_catalog_is_empty_with_warning() {
    let env = PlatformTestEnv::new();

    let view = env.load_view(&LoadOptions::new());
    let store = view.store().unwrap();

    assert!(store.is_empty());
    assert_eq!(
        store.warnings(),
        [LoadWarning::CatalogNotFound(env.catalog_path.clone())]
    );
    assert!(view.games().unwrap().is_empty());
}

#[test]
fn test_malformed_catalog_is_fatal() {
    let env = PlatformTestEnv::new();
    env.write_catalog(r#"  <game name="pacman"><description>Pac-Man</genre></game>"#);

    let mut view = CatalogView::new();
    let result = view.load(&env.catalog_path, &LoadOptions::new());

    assert!(matches!(result, Err(CatalogError::Parse { .. })));
    assert_eq!(view.state(), ViewState::Unloaded);
    assert!(matches!(view.games(), Err(CatalogError::NotReady)));
}

#[test]
fn test_non_utf8_catalog_is_a_parse_error() {
    let env = PlatformTestEnv::new();
    fs::write(&env.catalog_path, b"<menu><game name=\"pac\xffman\"/></menu>").unwrap();

    let mut view = CatalogView::new();
    let result = view.load(&env.catalog_path, &LoadOptions::new());

    assert!(matches!(result, Err(CatalogError::Parse { .. })));
    assert_eq!(view.state(), ViewState::Unloaded);
}

#[test]
fn test_round_trip_of_loaded_titles() {
    let env = PlatformTestEnv::new();
    env.write_catalog(
        r#"  <game name="sgame"><description>ßa game</description><genre>straße</genre></game>"#,
    );

    let first = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();
    save_catalog(&env.catalog_path, first.records()).unwrap();
    let reloaded = CatalogStore::load(&env.catalog_path, &LoadOptions::new()).unwrap();

    assert_eq!(reloaded.get("sgame").unwrap().display_name, "Ssa Game");
    assert_eq!(reloaded.records(), first.records());
}

#[test]
fn test_failed_reload_drops_previous_platform() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let mut view = env.load_view(&LoadOptions::new());
    assert_eq!(view.state(), ViewState::Ready);

    let broken = env.platform_dir.join("broken.xml");
    fs::write(&broken, "<menu><game name=\"x\">").unwrap();

    assert!(view.load(&broken, &LoadOptions::new()).is_err());
    assert!(matches!(view.store(), Err(CatalogError::NotReady)));
}

#[test]
fn test_directory_compare_masks_catalog() {
    let env = PlatformTestEnv::new();
    env.write_catalog(
        r#"  <game name="pacman"><description>Pac-Man</description></game>
  <game name="galaga"><description>Galaga</description></game>
  <game name="Zelda.smc"><description>Zelda</description></game>"#,
    );

    let options = LoadOptions::new()
        .with_rom_directory("/roms")
        .with_rom_extension(".zip")
        .compare_against_directory();
    let listing = FakeRomDirectory(vec!["pacman.zip", "Zelda.smc", "notincatalog.zip"]);

    let store = CatalogStore::load_with(&env.catalog_path, &options, &listing).unwrap();
    let kept: Vec<&String> = store.records().keys().collect();
    assert_eq!(kept, ["Zelda.smc", "pacman"]);
}

#[test]
fn test_directory_compare_with_real_directory() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let roms = env.platform_dir.join("roms");
    fs::create_dir_all(&roms).unwrap();
    fs::write(roms.join("pacman.zip"), b"ROM").unwrap();

    let options = LoadOptions::new()
        .with_rom_directory(&roms)
        .with_rom_extension(".zip")
        .compare_against_directory();
    let store = CatalogStore::load(&env.catalog_path, &options).unwrap();

    assert_eq!(store.len(), 1);
    assert!(store.get("pacman").is_some());
}

#[test]
fn test_directory_compare_missing_directory() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let missing = env.platform_dir.join("no-roms-here");

    let options = LoadOptions::new()
        .with_rom_directory(&missing)
        .with_rom_extension(".zip")
        .compare_against_directory();
    let store = CatalogStore::load(&env.catalog_path, &options).unwrap();

    assert!(store.is_empty());
    assert_eq!(store.warnings(), [LoadWarning::RomDirectoryMissing(missing)]);
}

#[test]
fn test_toggle_invalidation_follows_active_category() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let mut view = env.load_view(&LoadOptions::new());

    // Platform load starts on Favorites
    assert_eq!(view.active_category(), &Category::Favorites);
    assert!(view.toggle_favorite("pacman").unwrap().invalidates_active);
    assert!(!view.toggle_ignore("pacman").unwrap().invalidates_active);

    view.select_category(Category::AllGames).unwrap();
    assert!(view.toggle_favorite("pacman").unwrap().invalidates_active);
    assert!(view.toggle_ignore("pacman").unwrap().invalidates_active);

    view.select_category(Category::Genre("Maze".into())).unwrap();
    assert!(!view.toggle_favorite("pacman").unwrap().invalidates_active);
    assert!(view.toggle_ignore("pacman").unwrap().invalidates_active);
}

#[test]
fn test_next_category_cycles() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let mut view = env.load_view(&LoadOptions::new());

    let labels: Vec<String> = view
        .categories()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(labels, ["All Games", "Favorites", "Maze", "Ignore"]);

    assert_eq!(view.next_category().unwrap(), &Category::Genre("Maze".into()));
    assert_eq!(view.next_category().unwrap(), &Category::Ignore);
    assert_eq!(view.next_category().unwrap(), &Category::AllGames);
}

#[test]
fn test_toggle_index_is_unchanged() {
    let env = PlatformTestEnv::new();
    env.write_scenario_catalog();
    let mut view = env.load_view(&LoadOptions::new());

    let before = view.categories().unwrap().to_vec();
    view.toggle_ignore("pacman").unwrap();
    assert_eq!(view.categories().unwrap(), before.as_slice());
}
