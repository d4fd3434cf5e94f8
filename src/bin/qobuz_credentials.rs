use albumlinks::foundation::telemetry::init_subscriber;
use albumlinks::startup::run_app_secrets;
use clap::Command;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    Command::new("qobuz-credentials")
        .about("🔑 Read the app id and secret of the Qobuz web player for the settings file 🔑")
        .get_matches();
    init_subscriber("warn");

    match run_app_secrets().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31m[ERROR]\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}
