use crate::menu::{album_line, Level, Screen, Ui};
use std::io::{self, BufRead, Write};

/// Line-based front-end: numbered lists on stdout, answers read line by line.
pub struct PlainUi<R, W> {
    input: R,
    output: W,
}

impl PlainUi<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PlainUi<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    fn main_menu(&mut self, module: Option<&str>, selected: usize, modules: usize) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out, "\n{}", "=".repeat(50))?;
        writeln!(out, "🎵 Interactive Album Selector - Main Menu")?;
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(
            out,
            "Module: {} | Selected albums: {selected} | Available modules: {modules}",
            module.unwrap_or("None selected")
        )?;
        writeln!(out, "1. Search for artists and select albums")?;
        writeln!(out, "2. View selected albums")?;
        writeln!(out, "3. Save album list to file")?;
        writeln!(out, "4. Load existing links file")?;
        writeln!(out, "5. Quit")
    }
}

impl<R: BufRead, W: Write> Ui for PlainUi<R, W> {
    fn show(&mut self, screen: Screen<'_>) -> io::Result<()> {
        match screen {
            Screen::MainMenu {
                module,
                selected,
                modules,
            } => self.main_menu(module, selected, modules)?,
            Screen::Modules(services) => {
                writeln!(self.output, "\nAvailable modules:")?;
                for (i, service) in services.iter().enumerate() {
                    writeln!(self.output, "{}. {} ({})", i + 1, service.service_name, service.module)?;
                }
                writeln!(self.output, "Type 'back' to return or 'quit' to exit.")?;
            }
            Screen::SearchResults(hits) => {
                writeln!(self.output, "\nSearch Results:")?;
                writeln!(self.output, "{}", "-".repeat(40))?;
                for (i, hit) in hits.iter().enumerate() {
                    let mut info = String::new();
                    if let Some(year) = &hit.year {
                        info.push_str(&format!(" ({year})"));
                    }
                    if !hit.additional.is_empty() {
                        info.push_str(&format!(" {}", hit.additional.join(", ")));
                    }
                    writeln!(self.output, "{}. {}{info}", i + 1, hit.name)?;
                }
                writeln!(self.output, "{}. Search again", hits.len() + 1)?;
                writeln!(self.output, "{}. Back to main menu", hits.len() + 2)?;
            }
            Screen::Albums { artist, albums } => {
                writeln!(self.output, "\nAlbums by {artist}:")?;
                writeln!(self.output, "{}", "-".repeat(50))?;
                for (i, album) in albums.iter().enumerate() {
                    writeln!(self.output, "{}. {}", i + 1, album_line(album))?;
                }
                writeln!(self.output, "\nCommands:")?;
                writeln!(self.output, "- Enter album numbers separated by spaces (e.g., '1 3 5')")?;
                writeln!(self.output, "- 'all' to select all albums")?;
                writeln!(self.output, "- 'none' to select no albums")?;
                writeln!(self.output, "- 'back' to go back")?;
                writeln!(self.output, "- 'quit' to exit")?;
            }
            Screen::Selection(albums) => {
                writeln!(self.output, "\nSelected Albums ({}):", albums.len())?;
                writeln!(self.output, "{}", "=".repeat(60))?;
                for (i, album) in albums.iter().enumerate() {
                    writeln!(
                        self.output,
                        "{}. {} - {} ({}) [{}]",
                        i + 1,
                        album.artist,
                        album.album,
                        album.year,
                        album.module
                    )?;
                }
                writeln!(self.output, "\nCommands:")?;
                writeln!(self.output, "- 'remove [numbers]' to remove specific albums (e.g., 'remove 1 3 5')")?;
                writeln!(self.output, "- 'clear' to remove all albums")?;
                writeln!(self.output, "- 'back' to return to main menu")?;
            }
            Screen::SaveSummary { count } => {
                writeln!(self.output, "\nYou have {count} album(s) ready to save.")?;
            }
            Screen::Goodbye => writeln!(self.output, "\nGoodbye! 🎵")?,
        }
        self.output.flush()
    }

    fn notify(&mut self, level: Level, message: &str) -> io::Result<()> {
        match level {
            Level::Info => writeln!(self.output, "{message}")?,
            Level::Success => writeln!(self.output, "\x1b[32m{message}\x1b[0m")?,
            Level::Warning => writeln!(self.output, "\x1b[33m{message}\x1b[0m")?,
            Level::Error => writeln!(self.output, "\x1b[31m{message}\x1b[0m")?,
        }
        self.output.flush()
    }

    fn ask(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        write!(self.output, "\n{prompt}: ")?;
        self.output.flush()?;

        let answer = self.read_line()?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "{prompt} ({hint}): ")?;
            self.output.flush()?;

            match self.read_line()?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlbumInfo, SearchHit};
    use std::io::Cursor;

    fn ui(input: &str) -> PlainUi<Cursor<Vec<u8>>, Vec<u8>> {
        PlainUi::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(ui: PlainUi<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(ui.into_output()).unwrap()
    }

    #[test]
    fn test_ask_trims_and_applies_default() {
        let mut ui = ui("  radiohead \n\n");

        assert_eq!(ui.ask("Artist", None).unwrap(), "radiohead");
        assert_eq!(ui.ask("File", Some("album_links.txt")).unwrap(), "album_links.txt");
        assert!(output(ui).contains("Artist: "));
    }

    #[test]
    fn test_ask_at_end_of_input() {
        let mut ui = ui("");

        let err = ui.ask("Artist", None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_confirm() {
        let mut ui = ui("maybe\nYES\n\n");

        assert!(ui.confirm("Overwrite?", false).unwrap());
        assert!(!ui.confirm("Overwrite?", false).unwrap());
        assert!(output(ui).contains("Please answer y or n."));
    }

    #[test]
    fn test_pause_consumes_one_line() {
        let mut ui = ui("\nnext\n");

        ui.pause().unwrap();
        assert_eq!(ui.ask("Next", None).unwrap(), "next");
    }

    #[test]
    fn test_search_results_screen() {
        let hits = vec![SearchHit {
            result_id: "1".to_string(),
            name: "Radiohead".to_string(),
            year: Some("1985".to_string()),
            additional: vec!["9 albums".to_string()],
        }];
        let mut ui = ui("");

        ui.show(Screen::SearchResults(&hits)).unwrap();

        let text = output(ui);
        assert!(text.contains("1. Radiohead (1985) 9 albums"));
        assert!(text.contains("2. Search again"));
        assert!(text.contains("3. Back to main menu"));
    }

    #[test]
    fn test_albums_screen() {
        let albums = vec![AlbumInfo {
            name: "In Rainbows".to_string(),
            release_year: Some(2007),
            duration: Some(2_540),
            ..Default::default()
        }];
        let mut ui = ui("");

        ui.show(Screen::Albums {
            artist: "Radiohead",
            albums: &albums,
        })
        .unwrap();

        let text = output(ui);
        assert!(text.contains("Albums by Radiohead:"));
        assert!(text.contains("1. In Rainbows (2007) [42:20]"));
    }

    #[test]
    fn test_notify_colors_errors() {
        let mut ui = ui("");

        ui.notify(Level::Error, "Invalid command.").unwrap();

        assert_eq!(output(ui), "\x1b[31mInvalid command.\x1b[0m\n");
    }
}
