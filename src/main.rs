use anyhow::Context;
use btc_terrain::datasource::CoinGeckoClient;
use btc_terrain::{api, config::Config, db::init_db, DataSource, LiveDataSource, Pipeline, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("initializing database at {}", config.database_path))?;
    let repo = Arc::new(Repository::new(pool));

    let coingecko = CoinGeckoClient::new(config.coingecko_api_url.clone(), config.fetch_timeout)
        .context("building HTTP client")?;
    let datasource: Arc<dyn DataSource> = Arc::new(LiveDataSource::new(
        config.historical_csv_path.clone(),
        config.events_csv_path.clone(),
        coingecko,
    ));
    let pipeline = Arc::new(Pipeline::new(datasource, config.pipeline_settings()));

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let app = api::create_router(api::AppState::new(repo, pipeline, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
