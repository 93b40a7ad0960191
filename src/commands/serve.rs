use anyhow::Result;

use crate::config::ServerConfig;
use crate::logging::init_tracing;
use crate::server;

pub async fn run(port: Option<u16>, origin: Option<String>) -> Result<()> {
    init_tracing();

    let config = with_overrides(ServerConfig::from_env()?, port, origin);
    server::run(config).await
}

fn with_overrides(mut config: ServerConfig, port: Option<u16>, origin: Option<String>) -> ServerConfig {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(origin) = origin {
        config.origin = origin;
    }
    config
}
