use crate::catalog::{AlbumInfo, Catalog, SearchHit, ServiceInfo, SEARCH_LIMIT};
use crate::foundation::utils::{format_duration, normalize_unicode};
use crate::menu::{Level, Screen, Ui};
use crate::selection::{
    links_file_exists, normalize_filename, parse_remove_command, read_links, save_links,
    Selection, DEFAULT_LINKS_FILE,
};
use std::io;
use std::path::PathBuf;

/// Where control goes after a screen is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    /// Back to the main menu.
    Continue,
    Quit,
}

/// How the whole session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Search,
    ViewSelection,
    Save,
    Load,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" => Some(MenuChoice::Search),
            "2" => Some(MenuChoice::ViewSelection),
            "3" => Some(MenuChoice::Save),
            "4" => Some(MenuChoice::Load),
            "5" | "q" | "quit" | "exit" => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulePick {
    Module(usize),
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultChoice {
    Artist(usize),
    SearchAgain,
    Back,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumChoice {
    /// 0-based positions of the chosen albums, in the order typed.
    Albums(Vec<usize>),
    Back,
    Quit,
}

/// Matches a module by number, module id or service name, ignoring case and Unicode composition.
pub fn match_module(services: &[&ServiceInfo], input: &str) -> Option<ModulePick> {
    let choice = normalize_unicode(input);
    match choice.as_str() {
        "q" | "quit" | "exit" => return Some(ModulePick::Quit),
        "b" | "back" => return Some(ModulePick::Back),
        _ => {}
    }

    if let Ok(number) = choice.parse::<usize>() {
        if (1..=services.len()).contains(&number) {
            return Some(ModulePick::Module(number - 1));
        }
    }

    services
        .iter()
        .position(|service| {
            normalize_unicode(&service.module) == choice
                || normalize_unicode(&service.service_name) == choice
        })
        .map(ModulePick::Module)
}

/// Interprets the answer on the search results screen.
///
/// Besides the artist numbers, `count + 1` (or `s`) searches again and
/// `count + 2` (or `b`) goes back. The error is the message to show.
pub fn parse_result_choice(input: &str, count: usize) -> Result<ResultChoice, String> {
    let choice = input.trim().to_lowercase();
    match choice.as_str() {
        "q" | "quit" | "exit" => return Ok(ResultChoice::Quit),
        "s" => return Ok(ResultChoice::SearchAgain),
        "b" | "back" => return Ok(ResultChoice::Back),
        _ => {}
    }

    let number: usize = choice
        .parse()
        .map_err(|_| "Please enter a valid number.".to_string())?;
    if number == count + 1 {
        Ok(ResultChoice::SearchAgain)
    } else if number == count + 2 {
        Ok(ResultChoice::Back)
    } else if (1..=count).contains(&number) {
        Ok(ResultChoice::Artist(number - 1))
    } else {
        Err("Invalid selection.".to_string())
    }
}

/// Interprets the answer on the album list: numbers, `all`, `none`, `back` or `quit`.
pub fn parse_album_choice(input: &str, count: usize) -> Result<AlbumChoice, String> {
    let choice = input.trim().to_lowercase();
    match choice.as_str() {
        "q" | "quit" | "exit" => return Ok(AlbumChoice::Quit),
        "back" => return Ok(AlbumChoice::Back),
        "all" => return Ok(AlbumChoice::Albums((0..count).collect())),
        "none" => return Ok(AlbumChoice::Albums(Vec::new())),
        _ => {}
    }

    let mut picked = Vec::new();
    for token in choice.split_whitespace() {
        let number: usize = token
            .parse()
            .map_err(|_| "Please enter valid album numbers separated by spaces.".to_string())?;
        if !(1..=count).contains(&number) {
            return Err(format!("Invalid album number: {token}"));
        }
        picked.push(number - 1);
    }
    Ok(AlbumChoice::Albums(picked))
}

/// `Name (Year) [E] [M:SS] [Quality]`, leaving out what is unknown.
pub fn album_line(album: &AlbumInfo) -> String {
    let mut line = format!("{} ({})", album.name, album.year_label());
    if album.explicit {
        line.push_str(" [E]");
    }
    if let Some(duration) = album.duration {
        line.push_str(&format!(" [{}]", format_duration(duration)));
    }
    if let Some(quality) = &album.quality {
        line.push_str(&format!(" [{quality}]"));
    }
    line
}

/// The album selector state machine.
///
/// Each screen method returns a [`Nav`] instead of exiting, and [`Workflow::run`]
/// turns the final state into an [`Exit`].
pub struct Workflow<U: Ui> {
    ui: U,
    catalogs: Vec<Box<dyn Catalog>>,
    selection: Selection,
    current: Option<usize>,
    work_dir: PathBuf,
}

impl<U: Ui> Workflow<U> {
    pub fn new(ui: U, catalogs: Vec<Box<dyn Catalog>>) -> Self {
        Self {
            ui,
            catalogs,
            selection: Selection::new(),
            current: None,
            work_dir: PathBuf::from("."),
        }
    }

    /// Directory relative file names are resolved against.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Runs menus until the user quits, input ends, or a prompt is interrupted.
    pub async fn run(&mut self) -> io::Result<Exit> {
        match self.main_loop().await {
            Ok(()) => Ok(Exit::Quit),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.ui.show(Screen::Goodbye)?;
                Ok(Exit::Quit)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Exit::Interrupted),
            Err(e) => Err(e),
        }
    }

    async fn main_loop(&mut self) -> io::Result<()> {
        loop {
            if self.step().await? == Nav::Quit {
                return self.quit_workflow();
            }
        }
    }

    /// Shows the main menu once and runs the chosen screen.
    pub async fn step(&mut self) -> io::Result<Nav> {
        let module = self
            .current
            .map(|index| self.catalogs[index].service().service_name.clone());
        self.ui.show(Screen::MainMenu {
            module: module.as_deref(),
            selected: self.selection.len(),
            modules: self.catalogs.len(),
        })?;

        let input = self.ui.ask("Select option (1-5)", None)?;
        match MenuChoice::parse(&input) {
            Some(MenuChoice::Search) => self.search_workflow().await,
            Some(MenuChoice::ViewSelection) => self.manage_selection(),
            Some(MenuChoice::Save) => self.save_workflow(),
            Some(MenuChoice::Load) => self.load_workflow(),
            Some(MenuChoice::Quit) => Ok(Nav::Quit),
            None => {
                self.ui
                    .notify(Level::Error, "Invalid choice. Please enter 1-5.")?;
                Ok(Nav::Continue)
            }
        }
    }

    fn select_module(&mut self) -> io::Result<ModulePick> {
        match self.catalogs.len() {
            0 => {
                self.ui
                    .notify(Level::Error, "No catalog modules are configured.")?;
                return Ok(ModulePick::Back);
            }
            1 => {
                let message = format!("Using module: {}", self.catalogs[0].service().module);
                self.ui.notify(Level::Info, &message)?;
                return Ok(ModulePick::Module(0));
            }
            _ => {}
        }

        let services: Vec<&ServiceInfo> = self.catalogs.iter().map(|c| c.service()).collect();
        self.ui.show(Screen::Modules(&services))?;
        loop {
            let input = self.ui.ask("Select module (number or name)", None)?;
            if let Some(pick) = match_module(&services, &input) {
                return Ok(pick);
            }
            self.ui.notify(Level::Error, "Invalid selection. Try again.")?;
        }
    }

    /// Search → pick artist → pick albums, repeated until the user goes back or quits.
    pub async fn search_workflow(&mut self) -> io::Result<Nav> {
        let index = match self.select_module()? {
            ModulePick::Module(index) => index,
            ModulePick::Back => return Ok(Nav::Continue),
            ModulePick::Quit => return Ok(Nav::Quit),
        };
        self.current = Some(index);
        let message = format!("Using {}", self.catalogs[index].service().service_name);
        self.ui.notify(Level::Info, &message)?;

        loop {
            let query = self
                .ui
                .ask("Enter artist name to search (or 'back' to return)", None)?;
            match query.to_lowercase().as_str() {
                "back" | "b" => return Ok(Nav::Continue),
                "quit" | "q" | "exit" => return Ok(Nav::Quit),
                "" => continue,
                _ => {}
            }

            let results = self.search_artists(index, &query).await?;
            if results.is_empty() {
                self.ui.notify(Level::Warning, "No results found.")?;
                continue;
            }

            self.ui.show(Screen::SearchResults(&results))?;
            let hit = match self.choose_result(results.len())? {
                ResultChoice::Artist(position) => &results[position],
                ResultChoice::SearchAgain => continue,
                ResultChoice::Back => return Ok(Nav::Continue),
                ResultChoice::Quit => return Ok(Nav::Quit),
            };

            let albums = self.artist_albums(index, hit).await?;
            if albums.is_empty() {
                self.ui
                    .notify(Level::Warning, &format!("No albums found for {}", hit.name))?;
                self.ui.pause()?;
                continue;
            }

            self.ui.show(Screen::Albums {
                artist: &hit.name,
                albums: &albums,
            })?;
            match self.choose_albums(albums.len())? {
                AlbumChoice::Albums(positions) => {
                    let picked: Vec<AlbumInfo> =
                        positions.iter().map(|&p| albums[p].clone()).collect();
                    self.add_albums(index, &hit.name, &picked)?;
                }
                AlbumChoice::Back => continue,
                AlbumChoice::Quit => return Ok(Nav::Quit),
            }
        }
    }

    /// Failed searches are logged and shown, then treated as having no results.
    async fn search_artists(&mut self, index: usize, query: &str) -> io::Result<Vec<SearchHit>> {
        self.ui.busy(&format!("Searching for '{query}'..."))?;
        let result = self.catalogs[index].search_artists(query, SEARCH_LIMIT).await;
        self.ui.idle();

        match result {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!(query, error = %e, "artist search failed");
                self.ui.notify(Level::Error, &format!("Search error: {e}"))?;
                Ok(Vec::new())
            }
        }
    }

    /// Fetches every album of an artist; albums whose lookup fails are skipped with a warning.
    async fn artist_albums(&mut self, index: usize, hit: &SearchHit) -> io::Result<Vec<AlbumInfo>> {
        self.ui.busy(&format!("Getting albums for {}...", hit.name))?;
        let catalog = &self.catalogs[index];

        let artist = match catalog.artist(&hit.result_id).await {
            Ok(artist) => artist,
            Err(e) => {
                self.ui.idle();
                tracing::warn!(artist = %hit.name, error = %e, "artist lookup failed");
                self.ui
                    .notify(Level::Error, &format!("Error getting artist albums: {e}"))?;
                return Ok(Vec::new());
            }
        };

        let mut albums = Vec::new();
        let mut failures = Vec::new();
        for album_id in &artist.albums {
            match catalog.album(album_id).await {
                Ok(mut album) => {
                    album.album_id = Some(album_id.clone());
                    albums.push(album);
                }
                Err(e) => {
                    tracing::warn!(album_id = %album_id, error = %e, "album lookup failed");
                    failures.push(format!("Could not get info for album {album_id}: {e}"));
                }
            }
        }
        self.ui.idle();

        for failure in failures {
            self.ui.notify(Level::Warning, &failure)?;
        }
        Ok(albums)
    }

    fn choose_result(&mut self, count: usize) -> io::Result<ResultChoice> {
        let prompt = format!("Select artist (1-{})", count + 2);
        loop {
            let input = self.ui.ask(&prompt, None)?;
            match parse_result_choice(&input, count) {
                Ok(choice) => return Ok(choice),
                Err(message) => self.ui.notify(Level::Error, &message)?,
            }
        }
    }

    fn choose_albums(&mut self, count: usize) -> io::Result<AlbumChoice> {
        loop {
            let input = self.ui.ask("Select albums", None)?;
            match parse_album_choice(&input, count) {
                Ok(choice) => return Ok(choice),
                Err(message) => self.ui.notify(Level::Error, &message)?,
            }
        }
    }

    fn add_albums(&mut self, index: usize, artist: &str, albums: &[AlbumInfo]) -> io::Result<()> {
        if albums.is_empty() {
            return Ok(());
        }

        self.ui.notify(
            Level::Info,
            &format!("Adding {} album(s) from {artist}:", albums.len()),
        )?;
        let service = self.catalogs[index].service();
        self.selection.add_albums(Some(service), artist, albums);
        for album in albums {
            self.ui.notify(Level::Success, &format!("  ✓ {}", album_line(album)))?;
        }

        let total = format!("Total albums selected: {}", self.selection.len());
        self.ui.notify(Level::Info, &total)
    }

    /// Lists the selection and handles `remove N...`, `clear` and `back`.
    pub fn manage_selection(&mut self) -> io::Result<Nav> {
        if self.selection.is_empty() {
            self.ui.notify(Level::Warning, "No albums selected yet.")?;
            return Ok(Nav::Continue);
        }

        self.ui.show(Screen::Selection(self.selection.albums()))?;
        loop {
            let command = self.ui.ask("Command", Some("back"))?.to_lowercase();
            match command.as_str() {
                "back" => break,
                "clear" => {
                    if self.ui.confirm("Remove all selected albums?", false)? {
                        self.selection.clear();
                        self.ui.notify(Level::Success, "All albums removed.")?;
                    } else {
                        self.ui.notify(Level::Info, "Nothing removed.")?;
                    }
                    break;
                }
                _ => {}
            }

            let Some(tokens) = parse_remove_command(&command) else {
                self.ui.notify(Level::Error, "Invalid command.")?;
                continue;
            };
            match self.selection.remove(&tokens) {
                Ok(removed) => {
                    for album in &removed {
                        let message = format!("  Removed: {} - {}", album.artist, album.album);
                        self.ui.notify(Level::Info, &message)?;
                    }
                    let remaining = format!("Remaining albums: {}", self.selection.len());
                    self.ui.notify(Level::Info, &remaining)?;
                    break;
                }
                Err(e) => self.ui.notify(Level::Error, &e.to_string())?,
            }
        }
        Ok(Nav::Continue)
    }

    fn ask_filename(&mut self) -> io::Result<String> {
        let prompt = format!("Enter filename (default: {DEFAULT_LINKS_FILE})");
        let answer = self.ui.ask(&prompt, Some(DEFAULT_LINKS_FILE))?;
        Ok(normalize_filename(&answer))
    }

    fn write_links(&mut self, filename: &str) -> io::Result<()> {
        self.ui.busy("Saving file...")?;
        let result = save_links(&self.work_dir.join(filename), self.selection.urls());
        self.ui.idle();

        match result {
            Ok(()) => {
                let message = format!(
                    "✓ Saved {} album URLs to {filename}",
                    self.selection.urls().len()
                );
                self.ui.notify(Level::Success, &message)
            }
            Err(e) => {
                tracing::warn!(file = filename, error = %e, "saving links failed");
                self.ui
                    .notify(Level::Error, &format!("Error saving to file: {e}"))
            }
        }
    }

    pub fn save_workflow(&mut self) -> io::Result<Nav> {
        if self.selection.is_empty() {
            self.ui.notify(Level::Warning, "No albums selected to save.")?;
            self.ui.pause()?;
            return Ok(Nav::Continue);
        }

        self.ui.show(Screen::SaveSummary {
            count: self.selection.urls().len(),
        })?;
        let filename = self.ask_filename()?;

        if links_file_exists(&self.work_dir.join(&filename)) {
            let prompt = format!("File {filename} exists. Overwrite?");
            if !self.ui.confirm(&prompt, false)? {
                self.ui.notify(Level::Warning, "Save cancelled.")?;
                self.ui.pause()?;
                return Ok(Nav::Continue);
            }
        }

        self.write_links(&filename)?;
        self.ui.pause()?;
        Ok(Nav::Continue)
    }

    /// Adds the links of an existing file to the selection, skipping those already present.
    pub fn load_workflow(&mut self) -> io::Result<Nav> {
        let filename = self.ui.ask("Enter filename to load", None)?;
        if filename.is_empty() {
            return Ok(Nav::Continue);
        }

        let path = self.work_dir.join(&filename);
        if !links_file_exists(&path) {
            self.ui
                .notify(Level::Error, &format!("File {filename} not found."))?;
            self.ui.pause()?;
            return Ok(Nav::Continue);
        }

        self.ui.busy("Loading file...")?;
        let result = read_links(&path);
        self.ui.idle();

        match result {
            Ok(links) => {
                let added = self.selection.merge_links(links);
                self.ui.notify(
                    Level::Success,
                    &format!("✓ Loaded {added} new album URLs from {filename}"),
                )?;
                let total = format!("Total albums now: {}", self.selection.urls().len());
                self.ui.notify(Level::Info, &total)?;
            }
            Err(e) => {
                tracing::warn!(file = %filename, error = %e, "loading links failed");
                self.ui
                    .notify(Level::Error, &format!("Error loading file: {e}"))?;
            }
        }

        self.ui.pause()?;
        Ok(Nav::Continue)
    }

    /// Offers to save a non-empty selection, then says goodbye.
    pub fn quit_workflow(&mut self) -> io::Result<()> {
        if !self.selection.is_empty() {
            let message = format!("You have {} album(s) selected.", self.selection.len());
            self.ui.notify(Level::Warning, &message)?;
            if self.ui.confirm("Save before quitting?", true)? {
                let filename = self.ask_filename()?;
                self.write_links(&filename)?;
            }
        }
        self.ui.show(Screen::Goodbye)
    }
}
