//! Server configuration, from command-line flags or `MEMBER_SERVER_*`
//! environment variables.

use clap::Parser;

/// Settings for the member server.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "member-server",
    version,
    about = "Claimant member registry with versioned, lock-guarded updates"
)]
pub struct ServerConfig {
    /// Host to bind.
    #[arg(long, env = "MEMBER_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on.
    #[arg(long, env = "MEMBER_SERVER_PORT", default_value = "3031")]
    pub port: u16,
    /// Log directives, overridden by `RUST_LOG` when that is set.
    #[arg(
        long,
        env = "MEMBER_SERVER_LOG",
        default_value = "info,claimant_registry=debug"
    )]
    pub log_directives: String,
    /// Human-readable logs instead of JSON lines.
    #[arg(long, env = "MEMBER_SERVER_PRETTY_LOGS", default_value = "false")]
    pub pretty_logs: bool,
}

impl ServerConfig {
    /// `host:port`, ready for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
