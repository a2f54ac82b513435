use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use chatcraft_commands::application::errors::AppError;
use chatcraft_commands::domain::traits::ChatStore;
use chatcraft_commands::infrastructure::adapters::ConsoleAdapter;
use chatcraft_commands::infrastructure::audio::AudioQueue;
use chatcraft_commands::infrastructure::config::Config;
use chatcraft_commands::infrastructure::database::SqliteEngine;
use chatcraft_commands::infrastructure::storage::MemoryChatStore;
use chatcraft_commands::{Collaborators, CommandService, DuckCommand, HelpCommand, StopCommand, User};

#[derive(Parser)]
#[command(name = "chatcraft")]
#[command(about = "Chat slash-commands backed by an embedded SQL engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "chatcraft.yaml")]
    config: String,

    /// Name to attribute typed messages to
    #[arg(short, long)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Repl,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Repl => run_repl(&cli.config, cli.user),
        Commands::Version => {
            println!("chatcraft v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Config {
    if Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn init_config(path: &str) -> Result<(), AppError> {
    if Path::new(path).exists() {
        tracing::warn!("{} already exists, leaving it alone", path);
        return Ok(());
    }
    Config::default().save(path)?;
    println!("Wrote default config to {}", path);
    Ok(())
}

fn build_service(config: &Config, collaborators: Collaborators) -> Result<CommandService, AppError> {
    let mut commands = CommandService::new(&config.app.prefix, collaborators);
    commands.register(HelpCommand::new())?;

    if config.commands.duck.enabled {
        commands.register(DuckCommand::new().with_policy(config.commands.duck.export_policy))?;
    }
    if config.commands.stop.enabled {
        commands.register(StopCommand::new())?;
    }

    tracing::info!("Registered {} commands", commands.catalog().len());
    Ok(commands)
}

fn run_repl(config_path: &str, user: Option<String>) -> Result<(), AppError> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.app.name);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut store = MemoryChatStore::new();
        if let Some(path) = &config.storage.snapshot {
            store = store.with_snapshot(path);
        }
        store.init().await?;
        let store = Arc::new(store);

        let engine = SqliteEngine::open(&config.database.path, store.clone())?;
        let collaborators = Collaborators {
            store: store.clone(),
            engine: Arc::new(engine),
            audio: Arc::new(AudioQueue::new()),
        };
        let commands = build_service(&config, collaborators)?;

        let user = user.map(|name| User::new(name.clone()).with_username(name));
        let mut session = store.create_session().await?;
        let mut console = ConsoleAdapter::new("> ");
        println!("Type {}help for commands, Ctrl-D to quit.", commands.prefix());

        while let Some(line) = console.read_line().await? {
            let before = session.len();
            match commands.handle(&session, user.as_ref(), &line).await {
                Ok(updated) => {
                    for message in &updated.messages()[before.min(updated.len())..] {
                        console.render(message);
                    }
                    session = updated;
                }
                Err(e) => console.render_error(&e),
            }
        }

        store.flush().await?;
        tracing::info!("Session {} closed with {} messages", session.id(), session.len());
        Ok(())
    })
}
