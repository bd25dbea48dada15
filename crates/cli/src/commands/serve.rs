//! `aula serve` — run the HTTP gateway.

use aula_config::AppConfig;

pub async fn run(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.gateway.port = port;
    }

    aula_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("gateway failed: {e}"))
}
