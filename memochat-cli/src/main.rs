//! CLI entry point for memochat

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use dialoguer::Input;
use memochat_agent::{CancellationToken, ChatError, GenerationParams, ResponseGenerator};
use memochat_core::config::{validate_config, Config, ConfigLoader};
use memochat_core::logging::init_logging;
use memochat_core::session::Session;
use memochat_manager::{run_server, AppState};
use memochat_providers::{GroqClient, LLMProvider, ProviderRegistry};
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "memochat")]
#[command(about = "Q&A chatbot that remembers the conversation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat page and JSON API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a single question
    Ask {
        /// Question to send
        #[arg(short, long)]
        message: String,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// Start an interactive chat in the terminal
    Chat {
        #[command(flatten)]
        sampling: SamplingArgs,
    },
    /// List selectable models
    Models,
    /// Show status information
    Status,
}

#[derive(Args, Debug, Default)]
struct SamplingArgs {
    /// Model id (see `memochat models`)
    #[arg(long)]
    model: Option<String>,
    /// Sampling temperature, 0.0 to 1.0
    #[arg(short, long)]
    temperature: Option<f64>,
    /// Reply length limit, 100 to 500
    #[arg(long)]
    max_tokens: Option<u32>,
}

impl SamplingArgs {
    fn resolve(self, config: &Config) -> GenerationParams {
        GenerationParams::new(
            self.model.unwrap_or_else(|| config.chat.model.clone()),
            self.temperature.unwrap_or(config.chat.temperature),
            self.max_tokens.unwrap_or(config.chat.max_tokens),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    // Secrets are checked per command; logging must come up before that.
    let config = config_loader.load_unchecked()?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Serve { host, port } => {
            info!("Starting page server");
            run_serve(config, host, port).await?;
        }
        Commands::Ask { message, sampling } => {
            run_ask(config, &message, sampling).await?;
        }
        Commands::Chat { sampling } => {
            info!("Starting interactive chat");
            run_chat(config, sampling).await?;
        }
        Commands::Models => run_models(&config),
        Commands::Status => run_status(&config_loader, &config),
    }

    Ok(())
}

fn build_generator(config: &Config) -> Result<ResponseGenerator> {
    let provider: Arc<dyn LLMProvider> = Arc::new(GroqClient::from_config(config)?);
    Ok(ResponseGenerator::from_defaults(provider, &config.chat))
}

async fn run_serve(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    validate_config(&config)?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = tokio::net::lookup_host((host.as_str(), port))
        .await
        .with_context(|| format!("Cannot resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address for {}:{}", host, port))?;

    let state = AppState::from_config(&config)?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut server = tokio::spawn(run_server(state, addr, shutdown_rx));

    println!("{}", style("Starting memochat...").bold().cyan());
    println!("Model: {}", config.chat.model);
    println!(
        "\n{}",
        style(format!("Open http://{}:{}/ . Press Ctrl+C to stop.", host, port)).green()
    );

    tokio::select! {
        result = &mut server => {
            return result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
    }

    let _ = shutdown_tx.send(());
    server.await??;
    println!("{}", style("Stopped.").dim());
    Ok(())
}

async fn run_ask(config: Config, message: &str, sampling: SamplingArgs) -> Result<()> {
    validate_config(&config)?;

    let params = sampling.resolve(&config);
    let generator = build_generator(&config)?;
    let mut session = Session::new("cli");

    match generator.generate(&mut session, message, &params).await {
        Ok(reply) => {
            println!("{}", reply);
            Ok(())
        }
        Err(e @ ChatError::EmptyInput) => anyhow::bail!("{}", e),
        Err(e) => {
            error!("Error processing question: {}", e);
            Err(e.into())
        }
    }
}

async fn run_chat(config: Config, sampling: SamplingArgs) -> Result<()> {
    validate_config(&config)?;

    let params = sampling.resolve(&config);
    let generator = build_generator(&config)?;
    let mut session = Session::new("cli");
    let interactive = std::io::stdin().is_terminal();

    println!("{}", style("QnA Chatbot with Memory").bold().cyan());
    println!(
        "Model: {}  Temperature: {:.2}  Max tokens: {}",
        params.model, params.temperature, params.max_tokens
    );
    println!(
        "{}\n",
        style("Go ahead and ask your question. /history shows the conversation, /quit exits.").dim()
    );

    let interrupts = Interrupts::default();
    let _listener = interrupts.listen();

    loop {
        let Some(line) = read_question(interactive).await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                print_history(&session);
                continue;
            }
            _ => {}
        }

        if !interactive {
            println!("{} {}", style("You:").bold(), line);
        }

        let cancel = interrupts.arm().await;
        let result = generator
            .generate_with_cancel(&mut session, &line, &params, &cancel)
            .await;
        interrupts.disarm().await;

        match result {
            Ok(reply) => println!("{} {}\n", style("Assistant:").bold().green(), reply),
            Err(e @ ChatError::EmptyInput) => println!("{}", style(e).yellow()),
            Err(ChatError::Cancelled) => println!("{}", style("Request cancelled.").dim()),
            Err(e) => {
                error!("Error processing question: {}", e);
                println!("{} {}", style("Error:").red().bold(), e);
            }
        }
    }

    Ok(())
}

/// What a Ctrl-C did
#[derive(Debug, PartialEq)]
enum Interrupt {
    /// A pending call was cancelled; the chat goes on.
    Cancelled,
    /// Nothing was pending; the chat should end.
    Quit,
}

/// Routes Ctrl-C to the pending call, if any.
///
/// Once tokio owns SIGINT the default "terminate" action is gone for the
/// rest of the process, so an idle Ctrl-C has to end the chat explicitly.
#[derive(Clone, Default)]
struct Interrupts {
    pending: Arc<tokio::sync::Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    /// Token for the call about to start
    async fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.pending.lock().await = Some(token.clone());
        token
    }

    async fn disarm(&self) {
        self.pending.lock().await.take();
    }

    async fn interrupt(&self) -> Interrupt {
        match self.pending.lock().await.take() {
            Some(token) => {
                token.cancel();
                Interrupt::Cancelled
            }
            None => Interrupt::Quit,
        }
    }

    /// Handle Ctrl-C for the rest of the process.
    ///
    /// An idle Ctrl-C exits directly: the blocking stdin read cannot be
    /// interrupted and would keep the runtime from shutting down.
    fn listen(&self) -> tokio::task::JoinHandle<()> {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if interrupts.interrupt().await == Interrupt::Quit {
                    info!("Interrupted while idle, leaving chat");
                    println!();
                    std::process::exit(130);
                }
            }
        })
    }
}

/// Next line from the user, `None` on end of input
async fn read_question(interactive: bool) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        if interactive {
            // Ctrl-C at the prompt surfaces as an error; treat it as a quit.
            match Input::<String>::new()
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => Ok(Some(line)),
                Err(_) => Ok(None),
            }
        } else {
            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
        }
    })
    .await?
}

fn print_history(session: &Session) {
    println!("{}", style("Conversation History").bold());
    if session.is_empty() {
        println!("{}", style("(empty)").dim());
    }
    for turn in session.turns() {
        println!("{}: {}", turn.role.label(), turn.text);
    }
    println!();
}

fn run_models(config: &Config) {
    let registry = ProviderRegistry::new();

    println!("{}", style("Models:").bold());
    for model in registry.models() {
        let marker = if model.id == config.chat.model {
            style(" (default)").green().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", model.id, marker);
    }
}

fn run_status(loader: &ConfigLoader, config: &Config) {
    println!("{}", style("memochat Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    println!("  Default model: {}", config.chat.model);
    println!("  Temperature: {:.2}", config.chat.temperature);
    println!("  Max tokens: {}", config.chat.max_tokens);
    println!("  Request timeout: {}s", config.chat.request_timeout_secs);
    let api_base = config
        .provider
        .api_base
        .as_deref()
        .map(|base| base.trim().trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ProviderRegistry::new().spec().default_api_base.clone());
    println!("  API base: {}", api_base);
    println!(
        "  Server: {}:{}",
        config.server.host, config.server.port
    );
    println!("  Log directory: {}", config.logging.dir);
    println!();

    println!("{}", style("Secrets:").bold());
    for (name, value) in [
        ("langchain_api_key", &config.secrets.langchain_api_key),
        ("groq_api_key", &config.secrets.groq_api_key),
    ] {
        let status = if value.trim().is_empty() {
            style("not configured").red()
        } else {
            style("configured").green()
        };
        println!("  {}: {}", name, status);
    }
    println!();

    match validate_config(config) {
        Ok(()) => println!("{}", style("Ready.").green()),
        Err(e) => println!("{} {}", style("Not ready:").red().bold(), e),
    }
}
