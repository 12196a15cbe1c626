//! Sandboxed Filesystem MCP server
//!
//! Usage:
//!   sandbox-fs-mcp --allowed-dir ~/projects --allowed-dir /tmp/scratch
//!   sandbox-fs-mcp validate-dirs ~/projects /srv/data
//!   sandbox-fs-mcp tools

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use sandbox_fs_mcp::config::check_directories;
use sandbox_fs_mcp::{Config, FilesystemMcpServer};

#[derive(Parser)]
#[command(name = "sandbox-fs-mcp")]
#[command(about = "Filesystem MCP server confined to allowed directories")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory operations may touch (repeatable; overrides the config file)
    #[arg(
        long = "allowed-dir",
        env = "FS_ALLOWED_DIRS",
        value_delimiter = ',',
        global = true
    )]
    allowed_dirs: Vec<String>,

    /// Config file path
    #[arg(long, env = "FS_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace). Default is info.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdio (default)
    Serve,
    /// Check that each directory exists and is a directory
    ValidateDirs {
        #[arg(required = true)]
        dirs: Vec<String>,
    },
    /// Print the operation descriptors as JSON
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    mcp_common::init_tracing("sandbox_fs_mcp", cli.verbose)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let server = build_server(cli.config.as_deref(), &cli.allowed_dirs)?;
            mcp_common::serve_stdio(server, "sandbox_fs_mcp").await
        }
        Commands::ValidateDirs { dirs } => validate_dirs(&dirs),
        Commands::Tools => {
            let server = build_server(cli.config.as_deref(), &cli.allowed_dirs)?;
            let descriptors = server.registry().list_operations();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
            Ok(())
        }
    }
}

fn build_server(config_path: Option<&Path>, cli_dirs: &[String]) -> Result<FilesystemMcpServer> {
    let config = Config::load(config_path).context("Failed to load config")?;
    FilesystemMcpServer::new(&config, cli_dirs).context("Failed to set up allowed directories")
}

fn validate_dirs(dirs: &[String]) -> Result<()> {
    let checks = check_directories(dirs);

    for check in &checks {
        match &check.problem {
            None => println!("✓ {}", check.path.display()),
            Some(problem) => println!("✗ {}: {}", check.path.display(), problem),
        }
    }

    let invalid = checks.iter().filter(|c| c.problem.is_some()).count();
    if invalid > 0 {
        bail!("{} of {} directories are invalid", invalid, dirs.len());
    }
    println!("All directories are valid");
    Ok(())
}
