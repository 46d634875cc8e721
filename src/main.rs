use std::sync::Arc;

use tracing::{error, info};

use storeit::backend::{AppwriteClientFactory, ClientFactory, MemoryBackend};
use storeit::config::BackendKind;
use storeit::web::WebServer;
use storeit::{Config, StoreItError};

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("STOREIT_CONFIG").ok())
        .unwrap_or_else(|| "config.toml".to_string())
}

#[tokio::main]
async fn main() {
    // Load configuration
    let path = config_path();
    let config = match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(StoreItError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("{path} not found, using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = storeit::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        storeit::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let factory: Arc<dyn ClientFactory> = match config.backend.kind {
        BackendKind::Memory => {
            info!("Using in-memory backend");
            Arc::new(MemoryBackend::with_config(&config.backend))
        }
        BackendKind::Appwrite => match AppwriteClientFactory::new(&config.backend) {
            Ok(factory) => {
                info!(endpoint = %config.backend.endpoint, "Using appwrite backend");
                Arc::new(factory)
            }
            Err(e) => {
                error!("Failed to create backend client: {}", e);
                std::process::exit(1);
            }
        },
    };

    info!("StoreIt - cloud file storage");
    let server = match WebServer::new(&config, factory) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
