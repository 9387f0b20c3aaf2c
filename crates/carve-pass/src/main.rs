use carve_pass::cli::Cli;
use carve_pass::{Driver, SystemLauncher};

fn main() {
    let cli = Cli::try_parse_checked(std::env::args_os()).unwrap_or_else(|e| e.exit());

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut driver = Driver::new(cli.probe(), SystemLauncher);
    let req = cli.into_request().unwrap_or_else(|e| e.exit());

    match driver.run(&req) {
        Ok(outcome) => {
            let code = outcome.status.map(|s| s.exit_code()).unwrap_or(0);
            std::process::exit(code);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
