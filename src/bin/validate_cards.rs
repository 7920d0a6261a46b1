use std::path::PathBuf;

use clap::{value_parser, Arg, Command};
use tpotmon_lib::validate::validate_dir;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIR: &str = "src/content/cards";

fn main() {
    let matches = Command::new("validate-cards")
        .about("Validates every card JSON file in a directory")
        .arg(
            Arg::new("dir")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_DIR)
                .help("Directory holding card files"),
        )
        .get_matches();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tpotmon_lib=debug,info")),
        )
        .init();

    let dir = matches
        .get_one::<PathBuf>("dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

    let summary = match validate_dir(&dir) {
        Ok(summary) => summary,
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "cannot read card directory");
            std::process::exit(1);
        }
    };

    if summary.all_valid() {
        info!(files = summary.reports.len(), "all cards are valid");
    } else {
        error!(
            files = summary.reports.len(),
            failed = summary.failed(),
            "card validation failed"
        );
    }
    std::process::exit(summary.exit_code());
}
