//! Member registry HTTP server binary.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use claimant_registry::{http, logging, InMemoryMemberStore, MemberRegistry, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = ServerConfig::parse();

    logging::setup_logging(&config.log_directives, config.pretty_logs);
    info!(?config, "starting member server");

    let registry = Arc::new(MemberRegistry::new(InMemoryMemberStore::new()));
    http::serve(registry, &config.addr()).await
}
