//! Server initialization utilities
//!
//! Tracing setup and stdio serving shared by MCP server binaries.

use rmcp::{ServerHandler, ServiceExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Logs go to stderr; stdout is reserved for the MCP protocol.
///
/// - `RUST_LOG` filters as usual
/// - the crate itself logs at `info`, `debug` with `verbosity == 1`,
///   `trace` above that
/// - `LOG_FORMAT=json` switches to JSON lines
pub fn init_tracing(crate_name: &str, verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let directive = format!("{}={}", crate_name, level);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

/// Serve `server` over stdio until the client disconnects
pub async fn serve_stdio<S: ServerHandler>(server: S, name: &str) -> anyhow::Result<()> {
    tracing::info!("Starting {} MCP Server", name);

    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
