//! `aula doctor` — configuration and environment checks.

use aula_config::AppConfig;

pub fn run(config: &AppConfig) {
    println!("Aula doctor");
    println!("===========");

    println!("\nInstituto: {}", config.institute.name);

    print_chain(
        "OpenRouter (primario)",
        !config.openrouter.api_key.is_empty(),
        &config.openrouter.models,
    );
    print_chain(
        "Gemini (respaldo)",
        !config.gemini.api_key.is_empty(),
        &config.gemini.models,
    );

    println!("\nConocimiento:");
    print_dir("documentos", &config.knowledge.documents_dir);
    print_dir("sitio web", &config.knowledge.website_dir);

    println!(
        "\nGateway: http://{}:{} (CORS: {} orígenes)",
        config.gateway.host,
        config.gateway.port,
        config.gateway.allowed_origins.len()
    );
    println!(
        "Backoff: base {}s, tope {}s, reset_on_success={}",
        config.backoff.base_secs, config.backoff.max_secs, config.backoff.reset_on_success
    );
}

fn print_chain(label: &str, configured: bool, models: &[String]) {
    let status = if configured { "OK" } else { "SIN CREDENCIAL" };
    println!("\n{label}: {status}");
    for (i, model) in models.iter().enumerate() {
        println!("  {}. {model}", i + 1);
    }
}

fn print_dir(label: &str, dir: &std::path::Path) {
    let status = if dir.is_dir() {
        let count = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
                    .count()
            })
            .unwrap_or(0);
        format!("{count} archivos .txt")
    } else {
        "no existe".to_string()
    };
    println!("  {label}: {} ({status})", dir.display());
}
