//! `aula ask` — one-shot question from the terminal.
//!
//! Loads the knowledge directories, runs the full orchestration pipeline
//! once, and prints the answer. Useful for smoke-testing a deployment
//! without the HTTP layer.

use aula_agent::{ResponseOrchestrator, classify};
use aula_config::AppConfig;
use aula_core::knowledge::ContextSource;
use aula_gateway::DirectorySource;
use std::time::Duration;

pub async fn run(config: AppConfig, message: &str) -> anyhow::Result<()> {
    let orchestrator = ResponseOrchestrator::build_from_config(&config);

    let refresh = Duration::from_secs(config.knowledge.refresh_secs);
    let documents = DirectorySource::new("documents", &config.knowledge.documents_dir, refresh);
    let website = DirectorySource::new("website", &config.knowledge.website_dir, refresh);

    let document_context = documents
        .snapshot()
        .await
        .map_err(|e| anyhow::anyhow!("could not load document context: {e}"))?;
    let web_context = website
        .snapshot()
        .await
        .map_err(|e| anyhow::anyhow!("could not load website context: {e}"))?;

    let topic = classify(message);
    println!("Tema: {topic}");

    match orchestrator
        .generate_response(message, &document_context, &web_context, &[])
        .await
    {
        Some(answer) => println!("\n{answer}"),
        None => println!(
            "\nNo se pudo obtener una respuesta de los proveedores. Inténtalo nuevamente en unos segundos."
        ),
    }

    Ok(())
}
