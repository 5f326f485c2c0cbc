use colored::Colorize;
use pgexec::{logging, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let (args, sql) = Cli::from_env().into_parts();
    let mut stdout = std::io::stdout();

    match pgexec::execute(args, &sql, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
