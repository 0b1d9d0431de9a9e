use exam_seating::config::{DEFAULT_LOG_FILTER, ServiceConfig};
use exam_seating::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let config = ServiceConfig::from_env()?;
    server::run_server(config.bind_addr).await?;

    Ok(())
}
