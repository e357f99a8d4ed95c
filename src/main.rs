use std::sync::Arc;

use clap::Parser;
use mqtrigger::{
    cli::Cli,
    control_plane::{ControlPlane, HttpControlPlane},
    mq::BackendRegistry,
    observability::{init_logging, log_startup_info},
    trigger::MessageQueueTriggerManager,
    Bootstrap, Environment, Result,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before the environment snapshot is taken
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let observability_config = cli.observability_config();
    observability_config.validate()?;
    init_logging(&observability_config)?;

    let control_plane_config = cli.control_plane_config();
    control_plane_config.validate()?;
    log_startup_info(&cli.router_url, &control_plane_config.url);

    let registry = BackendRegistry::with_builtin_backends();
    info!(kinds = ?registry.registered_kinds(), "Registered message queue backends");

    let bootstrap = Bootstrap::new(Environment::capture(), cli.router_url.clone(), registry);
    let result = bootstrap
        .run(
            || {
                let control_plane = HttpControlPlane::connect(&control_plane_config)?;
                Ok(Arc::new(control_plane) as Arc<dyn ControlPlane>)
            },
            MessageQueueTriggerManager::new,
        )
        .await;

    match result {
        Ok(()) => {
            info!("Message queue trigger stopped");
            Ok(())
        }
        Err(e) if e.is_fatal() => {
            error!(error = %e, "Message queue trigger cannot start");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Message queue trigger startup failed");
            Err(e)
        }
    }
}
