//! crossgraph - A GraphQL API for Crossplane resources
//!
//! Serves a GraphQL endpoint that reads and writes Crossplane and Kubernetes
//! objects on behalf of each caller, using the caller's own credentials.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crossgraph::cli::{self, ConfigSubcommand};
use crossgraph::config::ConfigLoader;
use crossgraph::kube::ClientFactory;
use crossgraph::{graph, kube, server};

/// crossgraph - A GraphQL API for Crossplane resources
#[derive(Parser, Debug)]
#[command(name = "crossgraph")]
#[command(
    about = "A GraphQL API for Crossplane resources backed by the Kubernetes API",
    long_about = None
)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the GraphQL endpoint (the default)
    Serve {
        /// Address to listen on, overriding the configuration
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Do not serve GraphiQL at `/`
        #[arg(long)]
        no_playground: bool,
    },
    /// Print the GraphQL schema in SDL form
    Schema,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Schema) => {
            print!("{}", graph::sdl());
            Ok(())
        }
        Some(Command::Config { subcommand }) => cli::handle_config_command(subcommand),
        Some(Command::Version) => {
            cli::display_version();
            Ok(())
        }
        Some(Command::Serve {
            listen,
            no_playground,
        }) => run_server(args.debug, listen, no_playground).await,
        None => run_server(args.debug, None, false).await,
    }
}

async fn run_server(debug: bool, listen: Option<SocketAddr>, no_playground: bool) -> Result<()> {
    cli::init_logging(debug);

    let config = ConfigLoader::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let options = server::ServerOptions {
        listen: match listen {
            Some(addr) => addr,
            None => config.listen_addr()?,
        },
        playground: config.server.playground && !no_playground,
    };

    tracing::debug!("Configuration loaded: {:?}", config);

    let factory: Arc<dyn ClientFactory> = Arc::new(
        kube::create_factory()
            .await
            .context("Failed to configure the Kubernetes client")?,
    );
    let schema = graph::build_schema(factory, config.settings());

    server::serve(schema, options).await
}
