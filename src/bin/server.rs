use clap::{value_parser, Arg, Command};
use tpotmon_lib::config::{load_dotenv, Config};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let matches = Command::new("profile-server")
        .about("Serves profiles with inlined images for the card authoring form")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_parser(value_parser!(u16))
                .help("Port to listen on (default: TPOTMON_PORT or 8787)"),
        )
        .get_matches();

    load_dotenv();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tpotmon_lib=debug,info")),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            std::process::exit(1);
        }
    };
    rt.block_on(async move {
        if let Err(e) = tpotmon_lib::server::start_server(&config).await {
            error!(error = %e, "server error");
            std::process::exit(1);
        }
    });
}
