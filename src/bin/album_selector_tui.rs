use albumlinks::foundation::telemetry::init_subscriber;
use albumlinks::menu::TuiUi;
use albumlinks::startup::run_selector;
use clap::Command;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    Command::new("album-selector-tui")
        .about("🎵 Full-screen album selector: search artists, pick albums, export their links 🎵")
        .get_matches();
    init_subscriber("warn");

    let ui = match TuiUi::new() {
        Ok(ui) => ui,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31m{}\x1b[0m", e);
            eprintln!("Use album-selector for scripted or piped input.");
            return ExitCode::FAILURE;
        }
    };

    match run_selector(ui).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31mError initializing: {:#}\x1b[0m", e);
            eprintln!("Make sure you have modules installed and configured.");
            ExitCode::FAILURE
        }
    }
}
