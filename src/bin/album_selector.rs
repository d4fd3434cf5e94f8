use albumlinks::foundation::telemetry::init_subscriber;
use albumlinks::menu::PlainUi;
use albumlinks::startup::run_selector;
use clap::Command;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    Command::new("album-selector")
        .about("🎵 Search artists, pick albums and save their links to a text file 🎵")
        .get_matches();
    init_subscriber("warn");

    match run_selector(PlainUi::stdio()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31mError initializing: {:#}\x1b[0m", e);
            eprintln!("Make sure you have modules installed and configured.");
            ExitCode::FAILURE
        }
    }
}
