use recita_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    let cli = match Cli::parse_from_env() {
        Ok(cli) => cli,
        Err(code) => std::process::exit(code),
    };
    let code = match cli.run().await {
        Ok(status) => status.code(),
        Err(err) => {
            eprintln!("recita error: {:#}", err);
            cli::error_code(&err)
        }
    };
    std::process::exit(code);
}
