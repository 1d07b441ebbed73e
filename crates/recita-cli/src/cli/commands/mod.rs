//! CLI command handlers, one file per subcommand.

mod check;
mod fetch;
mod migrate;

pub use check::run_check;
pub use fetch::run_fetch;
pub use migrate::run_migrate;
