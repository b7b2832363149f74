use pdm_core::logging;
use pdm_core::startup::StartupError;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("pdm error: {:#}", err);
        let code = if err.downcast_ref::<StartupError>().is_some() {
            StartupError::EXIT_CODE
        } else {
            1
        };
        std::process::exit(code);
    }
}
