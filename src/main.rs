use std::sync::Arc;

use github_exporter::config::{config_path, load_config, print_schema};
use github_exporter::startup;
use github_exporter::utils::logger::init_logging;
use tracing::error;

#[tokio::main]
async fn main() {
    if std::env::args().nth(1).as_deref() == Some("--schema") {
        if let Err(e) = print_schema() {
            eprintln!("Error printing configuration schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let path = config_path();
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        error!("github-exporter stopped: {}", e);
        std::process::exit(1);
    }
}
