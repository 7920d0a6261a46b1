use clap::{value_parser, Arg, Command};
use tpotmon_lib::adapters::TwitterClient;
use tpotmon_lib::compose::CardComposer;
use tpotmon_lib::config::{load_dotenv, Config};
use tpotmon_lib::error::Result;
use tpotmon_lib::generator::OpenAiGenerator;
use tpotmon_lib::inline::ImageInliner;
use tpotmon_lib::publish::{ArtifactPublisher, FilePublisher, RemotePublisher};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

async fn run(config: Config, input: String) -> Result<()> {
    let source = TwitterClient::new_with_timeout(
        config.require_twitter_api_key()?,
        Some(&config.twitter_api_base),
        config.http_timeout_secs,
    )?;
    let generator = OpenAiGenerator::new(
        config.require_openai_api_key()?,
        &config.openai_api_base,
        &config.openai_model,
        config.http_timeout_secs,
    )?;
    let inliner = ImageInliner::new(config.http_timeout_secs)?;

    let composer = CardComposer::new(
        Box::new(source),
        inliner,
        Box::new(generator),
        config.max_tweets,
    );
    let card = composer.compose(&input).await?;

    let receipt = FilePublisher::new(&config.cards_dir)
        .named(&input)?
        .publish(&card)
        .await?;
    info!(location = %receipt.location, "card saved");

    if let Some(url) = config.publish_url.as_deref() {
        let remote = RemotePublisher::new(url, config.publish_token.as_deref(), config.http_timeout_secs)?;
        let receipt = remote.publish(&card).await?;
        info!(location = %receipt.location, id = ?receipt.id, "card published");
    }

    Ok(())
}

fn main() {
    let matches = Command::new("make-card")
        .about("Generates a trading card JSON file for a Twitter user")
        .arg(
            Arg::new("username")
                .required(true)
                .help("Username, @handle or profile URL"),
        )
        .arg(
            Arg::new("cards_dir")
                .long("cards-dir")
                .help("Output directory (default: TPOTMON_CARDS_DIR or ./cards)"),
        )
        .arg(
            Arg::new("max_tweets")
                .long("max-tweets")
                .value_parser(value_parser!(usize))
                .help("Maximum number of recent tweets to fetch (default 100)"),
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
    if let Some(dir) = matches.get_one::<String>("cards_dir") {
        config.cards_dir = dir.clone();
    }
    if let Some(max) = matches.get_one::<usize>("max_tweets") {
        config.max_tweets = *max;
    }
    let input = matches
        .get_one::<String>("username")
        .cloned()
        .unwrap_or_default();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run(config, input)) {
        error!(error = %e, "failed to make card");
        std::process::exit(1);
    }
}
