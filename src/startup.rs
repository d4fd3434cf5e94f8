//! # Program Drivers
//!
//! Each binary is a thin shell around one of the functions below. They load
//! what the program needs, print the user-facing report and turn the result
//! into a process exit code.
//!
//! * `run_selector` - the album selectors, with either front-end
//! * `run_sync` - mirrors the download folder into the music library
//! * `run_login_probe` - checks a set of Qobuz credentials with one login
//! * `run_app_secrets` - reads the current Qobuz app id and secret off the web player

use crate::catalog::catalogs_from_settings;
use crate::configuration::{get_configuration, settings_path};
use crate::login::{
    load_credentials, probe_login, AppCredentials, AppSecretsError, LoginOutcome, QobuzAuthenticator,
    SecretScraper,
};
use crate::menu::{Exit, PlainUi, Table, Ui, Workflow};
use crate::sync::{collect_files, directory_size, format_size, DirSync, SyncEvent, SyncOptions, SyncReport};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::fs;
use std::future::Future;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Folder new downloads land in.
pub const SOURCE_ROOT: &str = "/srv/music/downloads";
/// Library folder kept in step with [`SOURCE_ROOT`].
pub const DEST_ROOT: &str = "/srv/music/library";

const FAREWELL: &str = "Interrupted by user. Goodbye! 🎵";

fn print_info(message: &str) {
    println!("\x1b[34m[INFO]\x1b[0m {}", message);
}

fn print_success(message: &str) {
    println!("\x1b[32m[SUCCESS]\x1b[0m {}", message);
}

fn print_warning(message: &str) {
    println!("\x1b[33m[WARNING]\x1b[0m {}", message);
}

fn print_error(message: &str) {
    eprintln!("\x1b[1m\x1b[31m[ERROR]\x1b[0m {}", message);
}

/// Waits for `signal`, says goodbye and yields the status to exit with.
/// `None` when the signal could not be listened for.
async fn on_interrupt<F>(signal: F, farewell: impl FnOnce()) -> Option<i32>
where
    F: Future<Output = io::Result<()>>,
{
    signal.await.ok()?;
    farewell();
    Some(1)
}

/// Exits with status 1 on Ctrl-C, after `farewell`, whatever the main task is blocked on.
fn spawn_interrupt_watcher(farewell: fn()) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(code) = on_interrupt(tokio::signal::ctrl_c(), farewell).await {
            std::process::exit(code);
        }
    })
}

fn selector_farewell() {
    println!("\n\n{FAREWELL}");
}

fn sync_farewell() {
    println!();
    print_warning("Sync interrupted by user");
}

/// Loads the configured catalogs and runs the album selector on `ui`.
pub async fn run_selector<U: Ui>(ui: U) -> anyhow::Result<ExitCode> {
    println!("\x1b[1m\x1b[34mInitializing catalog modules...\x1b[0m");
    let path = settings_path();
    let settings = get_configuration(&path.to_string_lossy())
        .with_context(|| format!("Could not load settings from {}", path.display()))?;

    let catalogs = catalogs_from_settings(&settings);
    if catalogs.is_empty() {
        print_warning(&format!(
            "No catalog modules available. Make sure modules are configured in {}",
            path.display()
        ));
    } else {
        let modules: Vec<&str> = catalogs.iter().map(|c| c.service().module.as_str()).collect();
        println!("🎵 Interactive Album Selector");
        println!("{}", "=".repeat(50));
        println!("Available modules: {}", modules.join(", "));
    }

    let watcher = spawn_interrupt_watcher(selector_farewell);
    let exit = Workflow::new(ui, catalogs)
        .run()
        .await
        .context("Terminal input/output failed")?;
    watcher.abort();

    match exit {
        Exit::Quit => Ok(ExitCode::SUCCESS),
        Exit::Interrupted => {
            selector_farewell();
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Progress bar for the copy phase.
fn create_progress_bar(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    progress.set_style(style);
    progress
}

/// Header naming both roots and the mode, `DRY RUN` or `SYNC`.
fn sync_header(source: &Path, destination: &Path, options: SyncOptions) -> String {
    let mut header = String::new();
    let _ = writeln!(header, "\x1b[1m\x1b[34m🎵 Music Sync\x1b[0m");
    let _ = writeln!(header, "{}", "=".repeat(50));
    let _ = writeln!(header, "Source: {}", source.display());
    let _ = writeln!(header, "Destination: {}", destination.display());
    if options.dry_run {
        let _ = writeln!(header, "Mode: \x1b[33mDRY RUN\x1b[0m");
    } else {
        let _ = writeln!(header, "Mode: SYNC");
    }
    if options.delete_extra {
        let _ = writeln!(header, "Extra files in the destination will be deleted");
    }
    header
}

fn print_header(source: &Path, destination: &Path, options: SyncOptions) {
    println!("{}", sync_header(source, destination, options));
}

/// Results table printed once the sync finished.
pub fn results_table(report: &SyncReport, options: SyncOptions) -> String {
    let mut table = Table::new(&["Result", "Files"]).title("Sync Results");
    table.add_row(["Copied".to_string(), report.copied.to_string()]);
    table.add_row(["Skipped".to_string(), report.skipped.to_string()]);
    if options.delete_extra {
        let label = if options.dry_run { "Would delete" } else { "Deleted" };
        table.add_row([label.to_string(), report.deleted.to_string()]);
    }
    table.render()
}

/// Mirrors `source` into `destination`, reporting on stdout.
///
/// `confirm` is asked before anything is written; it is not called in a dry run.
pub fn sync_trees(
    source: &Path,
    destination: &Path,
    options: SyncOptions,
    confirm: impl FnOnce() -> io::Result<bool>,
) -> anyhow::Result<ExitCode> {
    if !source.is_dir() {
        print_error(&format!("Source directory does not exist: {}", source.display()));
        return Ok(ExitCode::FAILURE);
    }

    if !destination.exists() {
        print_warning(&format!("Creating destination directory: {}", destination.display()));
        if !options.dry_run {
            fs::create_dir_all(destination).with_context(|| {
                format!("Could not create destination directory {}", destination.display())
            })?;
        }
    }

    print_header(source, destination, options);
    print_info("Scanning directories...");
    let source_files = collect_files(source).context("Could not scan the source directory")?;
    if source_files.is_empty() {
        print_warning("No files found in source directory");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Source files: {}", source_files.len());
    println!("Source size: {}", format_size(directory_size(source)));

    if !options.dry_run && !confirm()? {
        print_warning("Sync cancelled by user");
        return Ok(ExitCode::FAILURE);
    }

    let progress = create_progress_bar(source_files.len() as u64);
    let syncer = DirSync::new(source, destination);
    let report = syncer.sync_files(&source_files, options, |event| match event {
        SyncEvent::Copied(path) => {
            progress.set_message(format!("Copied: {}", path.display()));
            progress.inc(1);
        }
        SyncEvent::Skipped(path) => {
            progress.set_message(format!("Skipped: {}", path.display()));
            progress.inc(1);
        }
        SyncEvent::Deleted(path) => {
            let verb = if options.dry_run { "Would delete" } else { "Deleted" };
            progress.println(format!("{verb}: {}", path.display()));
        }
    });
    progress.finish_and_clear();
    let report = report.context("Sync failed")?;

    println!("{}", results_table(&report, options));
    if options.dry_run {
        print_success("Dry run completed successfully");
    } else {
        print_success("Music sync completed successfully!");
    }
    Ok(ExitCode::SUCCESS)
}

/// Syncs the fixed download folder into the fixed library folder.
///
/// The sync runs on the blocking pool; Ctrl-C at any point, the confirmation
/// prompt included, prints a warning and exits with status 1.
pub async fn run_sync(options: SyncOptions) -> anyhow::Result<ExitCode> {
    let watcher = spawn_interrupt_watcher(sync_farewell);
    let code = tokio::task::spawn_blocking(move || {
        sync_trees(Path::new(SOURCE_ROOT), Path::new(DEST_ROOT), options, || {
            match PlainUi::stdio().confirm("Proceed with sync?", false) {
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
                answer => answer,
            }
        })
    })
    .await
    .context("Sync task was aborted")?;
    watcher.abort();
    code
}

/// Prints the outcome of a probe and maps it to an exit code.
pub fn report_login(outcome: &LoginOutcome) -> ExitCode {
    match outcome {
        LoginOutcome::Success { token_preview } => {
            print_success("Login successful!");
            println!("Received auth token (truncated): {token_preview}");
            ExitCode::SUCCESS
        }
        LoginOutcome::Failure { message } => {
            print_error(&format!("Login failed: {message}"));
            ExitCode::FAILURE
        }
    }
}

/// Loads the credentials of `module` from `settings` and tries them once.
pub async fn run_login_probe(settings: &Path, module: &str) -> anyhow::Result<ExitCode> {
    let credentials = match load_credentials(settings, module) {
        Ok(credentials) => credentials,
        Err(e) => {
            print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    print_info(&format!("Attempting to log in to Qobuz as {}...", credentials.username));
    let authenticator = tokio::task::spawn_blocking(QobuzAuthenticator::new)
        .await
        .context("HTTP client setup was aborted")?
        .context("Could not build the HTTP client")?;

    let outcome = probe_login(credentials, Arc::new(authenticator)).await;
    Ok(report_login(&outcome))
}

/// Prints the outcome of a credentials lookup and maps it to an exit code.
pub fn report_app_secrets(outcome: &Result<AppCredentials, AppSecretsError>) -> ExitCode {
    match outcome {
        Ok(credentials) => {
            print_success("Successfully obtained credentials:");
            println!("App ID: {}", credentials.app_id);
            println!("Secret: {}", credentials.app_secret);
            ExitCode::SUCCESS
        }
        Err(AppSecretsError::NoValidSecret { app_id }) => {
            println!("App ID: {app_id}");
            print_warning("Could not find a valid secret after testing candidates.");
            ExitCode::FAILURE
        }
        Err(e) => {
            print_error(&format!("Failed to obtain credentials: {e}"));
            ExitCode::FAILURE
        }
    }
}

/// Fetches the web player's app id and the first secret the API accepts.
pub async fn run_app_secrets() -> anyhow::Result<ExitCode> {
    print_info("Fetching the Qobuz web player bundle...");
    let scraper = SecretScraper::new().context("Could not build the HTTP client")?;
    let outcome = scraper.fetch().await;
    Ok(report_app_secrets(&outcome))
}
