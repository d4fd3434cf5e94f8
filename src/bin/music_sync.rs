use albumlinks::foundation::telemetry::init_subscriber;
use albumlinks::startup::run_sync;
use albumlinks::sync::SyncOptions;
use clap::{Arg, ArgAction, Command};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Command::new("music-sync")
        .about("🎵 Sync music from the download folder into the library 🎵")
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Show what would be copied without touching any file"),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .action(ArgAction::SetTrue)
                .help("Delete library files that are not in the download folder"),
        )
        .get_matches();
    init_subscriber("warn");

    let options = SyncOptions {
        dry_run: args.get_flag("dry-run"),
        delete_extra: args.get_flag("delete"),
    };

    match run_sync(options).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31m[ERROR]\x1b[0m Sync failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
