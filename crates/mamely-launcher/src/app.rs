//! Launcher state and actions

use anyhow::{Context, Result};
use mamely_catalog::{CatalogView, Category, GameRecord, LoadOptions, LoadWarning, PlatformFiles, RunFlags};
use mamely_config::{LauncherConfig, PlatformConfig};
use mamely_emulator::{EmulatorLauncher, LaunchRequest};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::input::Action;

/// How long a status message stays on screen
const MESSAGE_TIME: Duration = Duration::from_secs(2);

/// Settings of the platform currently shown
pub struct LoadedPlatform {
    pub name: String,
    pub config: PlatformConfig,
    pub flags: RunFlags,
}

/// A favorite toggle waiting for confirmation
pub struct PendingFavorite {
    pub id: String,
    pub prompt: String,
}

/// Application state
pub struct App {
    /// Directory of the launcher config file
    base_dir: PathBuf,

    config: LauncherConfig,

    launcher: EmulatorLauncher,

    platform_idx: usize,

    pub platform: Option<LoadedPlatform>,

    /// Catalog of the selected platform
    pub view: CatalogView,

    /// Games of the active category
    pub games: Vec<GameRecord>,

    pub games_state: ListState,

    /// Rows per page, updated by the renderer
    pub page_size: usize,

    status: Option<(String, Instant)>,

    /// Why the platform could not be shown
    pub error: Option<String>,

    pub confirm: Option<PendingFavorite>,

    pub should_quit: bool,
}

impl App {
    pub fn new(base_dir: PathBuf, config: LauncherConfig) -> Self {
        let mut app = Self {
            base_dir,
            config,
            launcher: EmulatorLauncher::new(),
            platform_idx: 0,
            platform: None,
            view: CatalogView::new(),
            games: Vec::new(),
            games_state: ListState::default(),
            page_size: 10,
            status: None,
            error: None,
            confirm: None,
            should_quit: false,
        };
        app.load_platform();
        app
    }

    /// Load the selected platform, or record a diagnostic if it cannot be shown
    pub fn load_platform(&mut self) {
        self.games.clear();
        self.games_state.select(None);
        self.confirm = None;
        self.error = None;
        self.platform = None;

        if let Err(e) = self.try_load_platform() {
            error!("Platform load failed: {:#}", e);
            self.view.unload();
            self.error = Some(format!("{:#}", e));
        }
    }

    fn try_load_platform(&mut self) -> Result<()> {
        let entry = self
            .config
            .platforms
            .get(self.platform_idx)
            .context("No platforms configured")?
            .clone();
        let dir = self.config.platform_dir(&self.base_dir, &entry);

        info!("Loading platform {}", entry.name);

        let platform_config = PlatformConfig::load(&dir.join(&entry.config))
            .with_context(|| format!("Cannot read config for {}", entry.name))?;
        let files = PlatformFiles::load(&dir)?;

        let mut options = LoadOptions::new()
            .with_skip_lists(files.skip)
            .with_rom_extension(platform_config.rom_extension.clone());
        if !platform_config.rom_directory.as_os_str().is_empty() {
            options = options.with_rom_directory(platform_config.rom_directory.clone());
        }
        if platform_config.compare_catalog_to_roms {
            options = options.compare_against_directory();
        }

        let catalog_path = platform_config.catalog_path(&dir);
        self.view
            .load(&catalog_path, &options)
            .with_context(|| format!("Cannot load catalog for {}", entry.name))?;

        let warning = self.view.store()?.warnings().first().cloned();
        match warning {
            Some(LoadWarning::CatalogNotFound(path)) => {
                self.set_status(format!("No catalog yet at {}", path.display()));
            }
            Some(LoadWarning::RomDirectoryMissing(path)) => {
                self.set_status(format!("ROM directory {} not found", path.display()));
            }
            Some(LoadWarning::NoRomDirectory) => {
                self.set_status("No ROM directory configured".to_string());
            }
            None => {}
        }

        self.platform = Some(LoadedPlatform {
            name: entry.name,
            config: platform_config,
            flags: files.flags,
        });
        self.refresh_games(true);
        Ok(())
    }

    /// Re-query the active category
    fn refresh_games(&mut self, reset_selection: bool) {
        self.games = match self.view.games() {
            Ok(games) => games.into_iter().cloned().collect(),
            Err(e) => {
                warn!("Cannot list games: {}", e);
                Vec::new()
            }
        };

        let selected = if reset_selection {
            0
        } else {
            self.games_state.selected().unwrap_or(0)
        };
        self.games_state.select(if self.games.is_empty() {
            None
        } else {
            Some(selected.min(self.games.len() - 1))
        });
    }

    pub fn platform_name(&self) -> &str {
        self.platform
            .as_ref()
            .map(|p| p.name.as_str())
            .or_else(|| self.config.platforms.get(self.platform_idx).map(|p| p.name.as_str()))
            .unwrap_or("MAMEly")
    }

    pub fn active_category(&self) -> &Category {
        self.view.active_category()
    }

    pub fn selected_game(&self) -> Option<&GameRecord> {
        self.games_state.selected().and_then(|i| self.games.get(i))
    }

    pub fn set_status(&mut self, message: String) {
        self.status = Some((message, Instant::now()));
    }

    /// Current status message, if it has not expired
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < MESSAGE_TIME)
            .map(|(message, _)| message.as_str())
    }

    /// Apply an action. Returns a launch request when a game should be run.
    pub fn handle_action(&mut self, action: Action) -> Option<LaunchRequest> {
        if let Some(pending) = self.confirm.take() {
            // Anything but Run cancels
            if action == Action::Run {
                self.toggle_favorite(&pending.id);
            }
            return None;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPlatform => {
                if !self.config.platforms.is_empty() {
                    self.platform_idx = (self.platform_idx + 1) % self.config.platforms.len();
                }
                self.load_platform();
            }
            Action::NextCategory => {
                if self.view.next_category().is_ok() {
                    self.refresh_games(true);
                }
            }
            Action::Up => self.move_selection(-1),
            Action::Down => self.move_selection(1),
            Action::PageUp => self.move_selection(-(self.page_size as isize)),
            Action::PageDown => self.move_selection(self.page_size as isize),
            Action::Favorite => self.ask_favorite(),
            Action::Ignore => {
                if let Some(id) = self.selected_game().map(|g| g.id.clone()) {
                    self.toggle_ignore(&id);
                }
            }
            Action::Run => return self.launch_request(),
        }
        None
    }

    /// Move the highlight, wrapping at both ends
    fn move_selection(&mut self, delta: isize) {
        if self.games.is_empty() {
            return;
        }
        let len = self.games.len() as isize;
        let current = self.games_state.selected().unwrap_or(0) as isize;
        self.games_state
            .select(Some((current + delta).rem_euclid(len) as usize));
    }

    fn ask_favorite(&mut self) {
        let pending = self.selected_game().map(|game| PendingFavorite {
            id: game.id.clone(),
            prompt: if game.favorite {
                format!("Remove {} from Favorites?", game.display_name)
            } else {
                format!("Add {} to Favorites?", game.display_name)
            },
        });
        if pending.is_some() {
            self.confirm = pending;
        }
    }

    fn toggle_favorite(&mut self, id: &str) {
        match self.view.toggle_favorite(id) {
            Ok(toggled) => {
                let state = if toggled.state { "added to" } else { "removed from" };
                self.set_status(format!("{} {} Favorites", toggled.id, state));
                if toggled.invalidates_active {
                    self.refresh_games(false);
                } else {
                    self.sync_selected(&toggled.id);
                }
            }
            Err(e) => {
                error!("Favorite toggle failed: {}", e);
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    fn toggle_ignore(&mut self, id: &str) {
        match self.view.toggle_ignore(id) {
            Ok(toggled) => {
                let state = if toggled.state { "added to" } else { "removed from" };
                self.set_status(format!("{} {} Ignore List", toggled.id, state));
                if toggled.invalidates_active {
                    self.refresh_games(false);
                } else {
                    self.sync_selected(&toggled.id);
                }
            }
            Err(e) => {
                error!("Ignore toggle failed: {}", e);
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Copy fresh flags of one game into the displayed list
    fn sync_selected(&mut self, id: &str) {
        let fresh = self
            .view
            .store()
            .ok()
            .and_then(|store| store.get(id))
            .cloned();
        if let Some(fresh) = fresh {
            if let Some(game) = self.games.iter_mut().find(|g| g.id == fresh.id) {
                *game = fresh;
            }
        }
    }

    fn launch_request(&mut self) -> Option<LaunchRequest> {
        let game = self.selected_game()?;
        let platform = self.platform.as_ref()?;

        let request = LaunchRequest::new(
            platform.config.emulator_executable.clone(),
            platform.config.rom_path(&game.id),
        )
        .with_flags(platform.flags.flags_for(&game.id));

        let message = format!("Launching {}...", game.display_name);
        self.set_status(message);
        Some(request)
    }

    /// Run a game; blocks until the emulator exits
    pub fn run_game(&mut self, request: &LaunchRequest) {
        match self.launcher.launch(request) {
            Ok(result) => {
                info!(
                    "{} exited with {} after {:?}",
                    result.program.display(),
                    result.status,
                    result.duration
                );
                self.status = None;
            }
            Err(e) => {
                error!("Failed to launch game: {}", e);
                self.set_status(format!("Error: {}", e));
            }
        }
    }
}
