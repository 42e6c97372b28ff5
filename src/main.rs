use anyhow::Result;
use clap::Parser;
use interview_coach::cli::{self, Cli};
use interview_coach::core::ConfigManager;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("interview_coach=info,rocket::server=off"));

    // LOG_FORMAT=json for log shippers, human readable otherwise
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let cli = Cli::parse();
    let config = ConfigManager::load()?;
    info!("Environment: {}", config.environment);

    cli::run(cli, config).await
}
