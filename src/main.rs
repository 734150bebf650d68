use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use dotenv::dotenv;
use pgrebuild::commands::{self, DependentsFormat, ScriptOutput};
use pgrebuild::config::{self, ConfigBuilder, ConfigInput, DatabaseArgs, ScriptArgs};
use pgrebuild::constants::CONFIG_FILENAME;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a script that drops and recreates a view together with
    /// everything that depends on it
    Script {
        /// Relation to rebuild, as schema.name
        target: String,

        /// Write the script to this file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Overwrite the output file without asking
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        script_args: ScriptArgs,

        #[command(flatten)]
        database_args: DatabaseArgs,
    },

    /// List the relations that depend on a view, in rebuild order
    Dependents {
        /// Relation to inspect, as schema.name
        target: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: DependentsFormat,

        #[command(flatten)]
        database_args: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            info!("Received shutdown signal, nothing was written");
            std::process::exit(130);
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge file and CLI settings, prompting for a password when asked to.
fn resolve_config(
    file_config: ConfigInput,
    database_args: &DatabaseArgs,
    script_args: Option<&ScriptArgs>,
) -> Result<config::Config> {
    let mut database_input: config::DatabaseInput = database_args.clone().into();
    if database_args.password_prompt {
        let password = Password::new().with_prompt("Password").interact()?;
        database_input.password = Some(password);
    }

    let cli_config = ConfigInput {
        database: Some(database_input),
        script: script_args.cloned().map(Into::into),
    };

    Ok(ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve())
}

async fn run_main(cli: Cli) -> Result<()> {
    let file_config = config::load_config(&cli.config_file)?;

    match cli.command {
        Commands::Script {
            target,
            output,
            force,
            script_args,
            database_args,
        } => {
            // Reject a malformed target before prompting or connecting
            let _: pgrebuild::catalog::id::QualifiedName = target.parse()?;
            let config = resolve_config(file_config, &database_args, Some(&script_args))?;

            info!("Generating rebuild script for {}", target);
            commands::cmd_script(&config, &target, &ScriptOutput { path: output, force }).await
        }
        Commands::Dependents {
            target,
            format,
            database_args,
        } => {
            let _: pgrebuild::catalog::id::QualifiedName = target.parse()?;
            let config = resolve_config(file_config, &database_args, None)?;

            info!("Listing dependents of {}", target);
            commands::cmd_dependents(&config, &target, format).await
        }
    }
}
