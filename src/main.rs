//! Data Flow Shell - interactive shell for a Data Flow server
//!
//! Run with `dataflow-shell` or `dataflow-shell --help` for usage.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dataflow_shell::{
    config::{Config, ConfigOverrides},
    shell::{repl, ConfigCommand},
    version::CLIENT_API_REVISION,
    APP_NAME, VERSION,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Interactive shell for a Data Flow server")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server targeted at startup
    #[arg(long = "uri", value_name = "URI")]
    server_uri: Option<String>,

    /// Username for the startup target
    #[arg(long)]
    username: Option<String>,

    /// Password for the startup target
    #[arg(long)]
    password: Option<String>,

    /// Accept any server certificate (unsafe, development only)
    #[arg(long)]
    skip_ssl_validation: bool,

    /// Do not target the server at startup
    #[arg(long)]
    no_auto_target: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Target the configured server and print its status
    Info,

    /// Target a server once and print the result
    Target {
        /// Server URI
        uri: String,

        /// Username for basic authentication
        #[arg(long)]
        username: Option<String>,

        /// Password for basic authentication
        #[arg(long)]
        password: Option<String>,

        /// Accept any server certificate (unsafe)
        #[arg(long)]
        skip_ssl_validation: bool,
    },

    /// Show the effective configuration
    Config,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_uri: self.server_uri.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            skip_ssl_validation: self.skip_ssl_validation.then_some(true),
            auto_target: self.no_auto_target.then_some(false),
            debug: self.debug.then_some(true),
        }
    }
}

fn setup_logging(config: &Config) -> Result<()> {
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        // Use info level for our crate, warn for dependencies
        EnvFilter::new("info")
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?)
    };

    if let Some(path) = &config.log_file {
        // Log to file so output does not interleave with the prompt
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref(), cli.overrides())?;
    setup_logging(&config)?;

    match cli.command {
        None | Some(Commands::Shell) => {
            info!(
                "Starting {} v{} (API revision {})",
                APP_NAME, VERSION, CLIENT_API_REVISION
            );

            let command = ConfigCommand::from_config(&config);

            // Connect (or report why not) before the first prompt
            if let Some(output) = command.on_application_ready().await {
                println!("{}", output);
            }

            let stdin = BufReader::new(tokio::io::stdin());
            repl::run(&command, stdin, tokio::io::stdout()).await?;
        }

        Some(Commands::Info) => {
            let command = ConfigCommand::from_config(&config);
            command.on_application_ready().await;
            println!("{}", command.info().await);
        }

        Some(Commands::Target {
            uri,
            username,
            password,
            skip_ssl_validation,
        }) => {
            let command = ConfigCommand::from_config(&config);
            let output = command
                .target(
                    &uri,
                    username.as_deref(),
                    password.as_deref(),
                    skip_ssl_validation,
                )
                .await;
            println!("{}", output);
        }

        Some(Commands::Config) => {
            println!("Configuration:");
            println!("{}", toml::to_string_pretty(&config.redacted())?);
            println!("\nConfig file: {:?}", match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_file_path()?,
            });
        }
    }

    Ok(())
}
