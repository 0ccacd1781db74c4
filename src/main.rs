//! wxpush CLI - main entry point
//!
//! Pushes one WeChat template message and exits non-zero unless it was delivered.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wxpush::commands::{push, PushArgs, PushOutcome};
use wxpush::config::ConfigOverrides;
use wxpush::{Config, Error};

#[derive(Parser, Debug)]
#[command(name = "wxpush")]
#[command(about = "Push a WeChat Official Account template message", long_about = None)]
#[command(version)]
struct Cli {
    /// Official Account AppID
    #[arg(long = "appID", visible_alias = "app-id")]
    app_id: Option<String>,

    /// Official Account AppSecret
    #[arg(long)]
    secret: Option<String>,

    /// OpenID of the follower receiving the message
    #[arg(long = "userID", visible_alias = "user-id", env = "WXPUSH_USER_ID")]
    user_id: Option<String>,

    /// Template message ID
    #[arg(long = "templateID", visible_alias = "template-id", env = "WXPUSH_TEMPLATE_ID")]
    template_id: Option<String>,

    /// Message title
    #[arg(long)]
    title: Option<String>,

    /// Message content
    #[arg(long)]
    content: Option<String>,

    /// Page opened when the message is tapped
    #[arg(long)]
    url: Option<String>,

    /// Path to config file (defaults to ./wxpush.yml when present)
    #[arg(long, env = "WXPUSH_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Override the API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env before clap reads env fallbacks
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = execute(cli).await;

    match &result {
        Ok(outcome @ PushOutcome::Delivered(_)) => println!("{}", outcome.report()),
        Ok(outcome) => eprintln!("{}", outcome.report()),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if let Some(usage) = err.downcast_ref::<Error>().and_then(push::usage_hint) {
                eprintln!();
                eprintln!("{}", usage);
            }
        }
    }

    ExitCode::from(push::exit_status(&result))
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "wxpush=debug" } else { "wxpush=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn execute(cli: Cli) -> anyhow::Result<PushOutcome> {
    init_tracing(cli.verbose)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wxpush starting");

    let overrides = ConfigOverrides {
        app_id: cli.app_id,
        secret: cli.secret,
        api_base: cli.api_base,
        timeout_secs: cli.timeout,
    };
    let config = Config::resolve(cli.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    let args = PushArgs {
        user_id: cli.user_id.unwrap_or_default(),
        template_id: cli.template_id.unwrap_or_default(),
        title: cli.title.unwrap_or_default(),
        content: cli.content.unwrap_or_default(),
        url: cli.url,
    };

    Ok(push::run(&config, &args).await?)
}
