use mimalloc::MiMalloc;
use scriptaudit::config::AppConfig;
use scriptaudit::services::client::ApiClient;
use scriptaudit::services::pipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "scriptaudit=info".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        discovery = %config.discovery,
        "Starting login script audit"
    );

    let client = ApiClient::from_config(&config)?;
    tracing::debug!(
        calls = client.limiter().calls(),
        period_secs = client.limiter().period().as_secs(),
        "Rate limiter ready"
    );
    let summary = pipeline::run(&client, &config.pipeline_options()).await?;

    match &summary.report_path {
        Some(path) => println!(
            "{} invalid scan occurrence(s) written to {}",
            summary.findings,
            path.display()
        ),
        None => println!("No web scan analysis occurrences found."),
    }

    Ok(())
}
