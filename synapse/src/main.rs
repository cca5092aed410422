use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use synapse::{Engine, EngineConfig, EngineError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synapse", about = "Run protocols through the synapse engine", version)]
struct Cli {
    /// Config file (defaults to ./synapse.json when present)
    #[arg(long, global = true, env = "SYNAPSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Execute a protocol by name
    Run {
        /// Protocol name, e.g. self.reflect
        protocol: String,
        /// Protocol input as JSON
        #[arg(long, default_value = "{}")]
        input: String,
    },
    /// List registered protocols
    List {
        /// Only protocols in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Run a slash command, e.g. /help
    Command {
        /// Command name
        name: String,
        /// Command arguments as JSON
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run_cli(cli).await {
        eprintln!("synapse error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<(), EngineError> {
    let cwd = std::env::current_dir()?;
    let config = EngineConfig::discover(cli.config.as_deref(), &cwd)?;
    init_tracing(&config.log_filter);

    let engine = Engine::from_config(&config).await?;

    match cli.command {
        Cmd::Run { protocol, input } => {
            let input = parse_json("--input", &input)?;
            let response = engine.execute(&protocol, input).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Cmd::List { category } => {
            let names = match category.as_deref() {
                Some(category) => engine.registry().list_by_category(category),
                None => engine.registry().list(),
            };
            for name in names {
                println!("{name}");
            }
        }
        Cmd::Command { name, args } => {
            let args = parse_json("--args", &args)?;
            if let Some(output) = engine.command(&name, args).await? {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
    }
    Ok(())
}

fn parse_json(flag: &str, raw: &str) -> Result<Value, EngineError> {
    serde_json::from_str(raw).map_err(|e| EngineError::InvalidArguments {
        command: flag.to_string(),
        message: e.to_string(),
    })
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
