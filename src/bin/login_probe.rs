use albumlinks::configuration::settings_path;
use albumlinks::foundation::telemetry::init_subscriber;
use albumlinks::startup::run_login_probe;
use clap::{value_parser, Arg, Command};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Command::new("login-probe")
        .about("🔑 Check Qobuz credentials from the settings file with a single login 🔑")
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Settings file to read (defaults to config/settings.json)"),
        )
        .arg(
            Arg::new("module")
                .long("module")
                .value_name("NAME")
                .default_value("qobuz")
                .help("Module section holding the credentials"),
        )
        .get_matches();
    init_subscriber("warn");

    let settings = args
        .get_one::<PathBuf>("settings")
        .cloned()
        .unwrap_or_else(settings_path);
    let module = args
        .get_one::<String>("module")
        .map(String::as_str)
        .unwrap_or("qobuz");

    match run_login_probe(&settings, module).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[1m\x1b[31m[ERROR]\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}
