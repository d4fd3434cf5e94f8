use crate::foundation::utils::format_duration;
use crate::menu::{panel, Level, Screen, Table, Ui};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

const HEADER_TITLE: &str = "🎵 Album Selector";
const HEADER_BODY: &str = "Search artists, pick albums and export their links";

/// Full-screen front-end: tables and panels, themed prompts and a spinner
/// while the catalog is queried.
pub struct TuiUi {
    out: io::Stdout,
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl TuiUi {
    /// Fails when stdin is not an interactive terminal.
    pub fn new() -> io::Result<Self> {
        if !io::stdin().is_terminal() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "the terminal interface needs an interactive terminal",
            ));
        }
        Ok(Self {
            out: io::stdout(),
            theme: ColorfulTheme::default(),
            spinner: None,
        })
    }

    fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }
}

/// Unwraps a prompt failure into the `io::Error` behind it, keeping its kind
/// so a raw-mode Ctrl-C still reads as `ErrorKind::Interrupted`.
fn prompt_error(error: dialoguer::Error) -> io::Error {
    match error {
        dialoguer::Error::IO(error) => error,
    }
}

fn header() -> String {
    panel(HEADER_TITLE, HEADER_BODY)
}

/// Renders a screen as plain text. Screens listing things start with the header.
pub fn render_screen(screen: Screen<'_>) -> String {
    match screen {
        Screen::MainMenu {
            module,
            selected,
            modules,
        } => {
            let mut menu = Table::new(&["Option", "Description", "Status"]).title("Main Menu");
            let module_status = match module {
                Some(module) => format!("Module: {module}"),
                None => "No module".to_string(),
            };
            menu.add_row(["[1]", "Search for artists and select albums", module_status.as_str()]);
            menu.add_row(["[2]", "View selected albums", format!("{selected} selected").as_str()]);
            menu.add_row(["[3]", "Save album list to file", ""]);
            menu.add_row(["[4]", "Load existing links file", ""]);
            menu.add_row(["[5]", "Quit", ""]);

            let status = format!(
                "Module: {} | Selected Albums: {selected} | Available Modules: {modules}",
                module.unwrap_or("None selected")
            );
            format!("{}\n{}{}", header(), menu.render(), panel("", &status))
        }
        Screen::Modules(services) => {
            let mut table = Table::new(&["Option", "Service", "Module"])
                .title("Available Music Services");
            for (i, service) in services.iter().enumerate() {
                table.add_row([
                    (i + 1).to_string(),
                    service.service_name.clone(),
                    service.module.clone(),
                ]);
            }
            format!("{}\n{}", header(), table.render())
        }
        Screen::SearchResults(hits) => {
            let mut table = Table::new(&["Option", "Artist", "Year", "Additional Info"])
                .title("Search Results")
                .max_width(1, 40)
                .max_width(3, 30);
            for (i, hit) in hits.iter().enumerate() {
                table.add_row([
                    (i + 1).to_string(),
                    hit.name.clone(),
                    hit.year.clone().unwrap_or_default(),
                    hit.additional.join(", "),
                ]);
            }
            table.add_row([(hits.len() + 1).to_string(), "Search again".to_string()]);
            table.add_row([(hits.len() + 2).to_string(), "Back to main menu".to_string()]);
            format!("{}\n{}", header(), table.render())
        }
        Screen::Albums { artist, albums } => {
            let mut table = Table::new(&["Option", "Album", "Year", "Duration", "Quality", "Flags"])
                .title(&format!("Albums by {artist}"))
                .max_width(1, 40)
                .max_width(4, 15);
            for (i, album) in albums.iter().enumerate() {
                table.add_row([
                    (i + 1).to_string(),
                    album.name.clone(),
                    album.year_label(),
                    album.duration.map(format_duration).unwrap_or_default(),
                    album.quality.clone().unwrap_or_default(),
                    if album.explicit { "E" } else { "" }.to_string(),
                ]);
            }
            let help = "Numbers separated by spaces (e.g. '1 3 5')\n\
                        'all' selects every album, 'none' or Enter selects nothing\n\
                        'back' returns to the search, 'quit' exits";
            format!("{}\n{}{}", header(), table.render(), panel("Commands", help))
        }
        Screen::Selection(albums) => {
            let mut table = Table::new(&["#", "Artist", "Album", "Year", "Module"])
                .title(&format!("Selected Albums ({})", albums.len()))
                .max_width(1, 30)
                .max_width(2, 40);
            for (i, album) in albums.iter().enumerate() {
                table.add_row([
                    (i + 1).to_string(),
                    album.artist.clone(),
                    album.album.clone(),
                    album.year.clone(),
                    album.module.clone(),
                ]);
            }
            let help = "'remove 1 3 5' removes albums by number\n\
                        'clear' removes everything\n\
                        'back' returns to the main menu";
            format!("{}\n{}{}", header(), table.render(), panel("Commands", help))
        }
        Screen::SaveSummary { count } => {
            panel("Save", &format!("You have {count} album(s) ready to save."))
        }
        Screen::Goodbye => "Goodbye! 🎵\n".to_string(),
    }
}

impl Ui for TuiUi {
    fn show(&mut self, screen: Screen<'_>) -> io::Result<()> {
        self.idle();
        if !matches!(screen, Screen::SaveSummary { .. } | Screen::Goodbye) {
            self.clear()?;
        }
        let text = render_screen(screen);
        write!(self.out, "{}", text.as_str().cyan())?;
        self.out.flush()
    }

    fn notify(&mut self, level: Level, message: &str) -> io::Result<()> {
        match level {
            Level::Info => writeln!(self.out, "{}", message.blue())?,
            Level::Success => writeln!(self.out, "{}", message.green())?,
            Level::Warning => writeln!(self.out, "{}", message.yellow())?,
            Level::Error => writeln!(self.out, "{}", message.red().bold())?,
        }
        self.out.flush()
    }

    fn ask(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        self.idle();
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input
                .default(default.to_string())
                .show_default(!default.is_empty());
        }
        let answer = input.interact_text().map_err(prompt_error)?;
        Ok(answer.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        self.idle();
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)?;
        Ok(answer)
    }

    fn busy(&mut self, message: &str) -> io::Result<()> {
        self.idle();
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
        Ok(())
    }

    fn idle(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlbumInfo, DownloadKind, ServiceInfo};
    use crate::menu::{Exit, Workflow};
    use crate::selection::SelectedAlbum;

    /// Fails every prompt the way dialoguer does when Ctrl-C is read in raw mode.
    struct InterruptedPrompt;

    impl Ui for InterruptedPrompt {
        fn show(&mut self, _screen: Screen<'_>) -> io::Result<()> {
            Ok(())
        }

        fn notify(&mut self, _level: Level, _message: &str) -> io::Result<()> {
            Ok(())
        }

        fn ask(&mut self, _prompt: &str, _default: Option<&str>) -> io::Result<String> {
            let error = dialoguer::Error::IO(io::Error::from(io::ErrorKind::Interrupted));
            Err(prompt_error(error))
        }

        fn confirm(&mut self, _prompt: &str, _default: bool) -> io::Result<bool> {
            let error = dialoguer::Error::IO(io::Error::from(io::ErrorKind::Interrupted));
            Err(prompt_error(error))
        }
    }

    #[test]
    fn test_prompt_error_keeps_kind() {
        let error = prompt_error(dialoguer::Error::IO(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "closed",
        )));

        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(error.to_string(), "closed");
    }

    #[tokio::test]
    async fn test_interrupted_prompt_ends_workflow() {
        let mut workflow = Workflow::new(InterruptedPrompt, Vec::new());

        let exit = workflow.run().await.unwrap();

        assert_eq!(exit, Exit::Interrupted);
    }

    #[test]
    fn test_main_menu_shows_status() {
        let text = render_screen(Screen::MainMenu {
            module: Some("Qobuz"),
            selected: 3,
            modules: 2,
        });

        assert!(text.contains(HEADER_TITLE));
        assert!(text.contains("│ [5]    │ Quit"));
        assert!(text.contains("Module: Qobuz | Selected Albums: 3 | Available Modules: 2"));
        assert!(text.contains("3 selected"));
    }

    #[test]
    fn test_modules_table() {
        let service = ServiceInfo {
            module: "qobuz".to_string(),
            service_name: "Qobuz".to_string(),
            netlocation: "qobuz".to_string(),
            url_routes: vec![("album".to_string(), DownloadKind::Album)],
            hidden: false,
        };
        let services = vec![&service];

        let text = render_screen(Screen::Modules(&services));

        assert!(text.contains("Available Music Services"));
        assert!(text.contains("│ 1      │ Qobuz   │ qobuz  │"));
    }

    #[test]
    fn test_albums_table_flags_and_duration() {
        let albums = vec![AlbumInfo {
            name: "Amnesiac".to_string(),
            release_year: Some(2001),
            duration: Some(2_627),
            explicit: true,
            quality: Some("CD".to_string()),
            ..Default::default()
        }];

        let text = render_screen(Screen::Albums {
            artist: "Radiohead",
            albums: &albums,
        });

        assert!(text.contains("Albums by Radiohead"));
        assert!(text.contains("│ 1      │ Amnesiac │ 2001 │ 43:47    │ CD      │ E     │"));
        assert!(text.contains("'all' selects every album"));
    }

    #[test]
    fn test_selection_table() {
        let albums = vec![SelectedAlbum::from_link("https://tidal.com/album/1")];

        let text = render_screen(Screen::Selection(&albums));

        assert!(text.contains("Selected Albums (1)"));
        assert!(text.contains("Unknown"));
    }
}
