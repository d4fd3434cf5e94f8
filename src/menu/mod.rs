//! Interactive album selection.
//!
//! [`Workflow`] owns the selection and walks the user through the menus. It
//! only talks to the terminal through the [`Ui`] trait, so the same flow
//! drives the plain line-based front-end ([`PlainUi`]), the richer terminal
//! front-end ([`TuiUi`]) and scripted input in tests.
mod plain;
mod table;
mod tui;
mod workflow;

pub use plain::PlainUi;
pub use table::{panel, Table};
pub use tui::TuiUi;
pub use workflow::*;

use crate::catalog::{AlbumInfo, SearchHit, ServiceInfo};
use crate::selection::SelectedAlbum;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Everything a front-end may be asked to draw.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    MainMenu {
        module: Option<&'a str>,
        selected: usize,
        modules: usize,
    },
    Modules(&'a [&'a ServiceInfo]),
    SearchResults(&'a [SearchHit]),
    Albums {
        artist: &'a str,
        albums: &'a [AlbumInfo],
    },
    Selection(&'a [SelectedAlbum]),
    SaveSummary {
        count: usize,
    },
    Goodbye,
}

/// Terminal access used by [`Workflow`].
///
/// Prompts return `ErrorKind::UnexpectedEof` when input is exhausted and
/// `ErrorKind::Interrupted` when the user pressed Ctrl-C inside a prompt.
pub trait Ui {
    fn show(&mut self, screen: Screen<'_>) -> io::Result<()>;

    fn notify(&mut self, level: Level, message: &str) -> io::Result<()>;

    /// Reads one trimmed line. An empty answer yields `default` when there is one.
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;

    fn pause(&mut self) -> io::Result<()> {
        self.ask("Press Enter to continue...", Some("")).map(|_| ())
    }

    /// Signals that a slow call is starting.
    fn busy(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }

    /// Signals that the slow call started by [`Ui::busy`] finished.
    fn idle(&mut self) {}
}
