use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use turon_proxy::{web_server, ChatService, Config, PredictionClient};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the chat proxy HTTP server.
    Serve {
        #[command(flatten)]
        config: Config,
    },
    /// Answer a single question and print the JSON reply.
    Ask {
        #[arg(help = "Question to answer. Read from stdin when omitted.")]
        message: Option<String>,
        #[command(flatten)]
        config: Config,
    },
    /// Print the active knowledge base.
    Facts {
        #[command(flatten)]
        config: Config,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve { .. } => "serve",
            Commands::Ask { .. } => "ask",
            Commands::Facts { .. } => "facts",
        }
    }
}

fn build_chat_service(config: &Config) -> Result<Arc<ChatService>> {
    let facts = config.load_facts().context("Failed to load knowledge base")?;
    let client = PredictionClient::new(config.prediction_settings())?;
    Ok(Arc::new(ChatService::new(Arc::new(facts), client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (REPLICATE_API_TOKEN and friends)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,turon_proxy=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("turon-proxy starting with command: {}", cli.command.name());

    match cli.command {
        Commands::Serve { config } => {
            let chat = build_chat_service(&config)?;
            let addr = config.bind_address();

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(&addr, chat).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Ask { message, config } => {
            let message = match message {
                Some(m) => m,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read question from stdin")?;
                    buf
                }
            };

            let chat = build_chat_service(&config)?;
            match chat.answer(Some(&message)).await {
                Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                Err(e) => {
                    let detail = match &e {
                        turon_proxy::ChatError::Prediction(p) => p.detail(),
                        _ => None,
                    };
                    eprintln!(
                        "{}",
                        serde_json::json!({ "error": e.to_string(), "kind": e.kind(), "detail": detail })
                    );
                    return Err(e).context("Failed to answer question");
                }
            }
        }
        Commands::Facts { config } => {
            let facts = config.load_facts()?;
            println!("{}", serde_json::to_string_pretty(&facts)?);
        }
    }

    Ok(())
}
