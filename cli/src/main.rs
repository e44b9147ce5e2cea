//! CLI entrypoint for vault-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection: Ollama backend -> session manager -> console
//! notifier, with optional JSONL chat logging.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vault_application::{ChatNotifier, CompositeNotifier, SessionManager};
use vault_domain::ToolRegistry;
use vault_infrastructure::{
    ConfigLoader, JsonlTranscriptLogger, OllamaBackend, OllamaConfig, builtin_registry,
};

#[derive(Parser, Debug)]
#[command(name = "vault-chat", about = "Chat with an on-device language model")]
struct Cli {
    /// Prompt to send (omit for --chat mode)
    prompt: Option<String>,

    /// Interactive chat mode (reads prompts from stdin)
    #[arg(long)]
    chat: bool,

    /// Config file path (default: vault-chat.toml / XDG config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore config files, use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Ollama endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    temperature: Option<f64>,

    /// Response token cap override
    #[arg(long)]
    max_tokens: Option<u32>,

    /// System instructions override
    #[arg(long)]
    instructions: Option<String>,

    /// Typewriter tick in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print the full response at once instead of the typewriter effect
    #[arg(long)]
    no_stream: bool,

    /// Disable built-in tools
    #[arg(long)]
    no_tools: bool,

    /// Append chat events to a JSONL log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prints typewriter partials in place: each chunk is a growing prefix,
/// so only the newly appended suffix is written.
#[derive(Default)]
struct ConsoleNotifier {
    printed: Mutex<usize>,
}

impl ChatNotifier for ConsoleNotifier {
    fn on_loading(&self, loading: bool) {
        if loading {
            eprint!("...");
            let _ = std::io::stderr().flush();
        } else {
            eprint!("\r   \r");
            let _ = std::io::stderr().flush();
        }
    }

    fn on_stream_chunk(&self, partial: &str) {
        let mut printed = self.printed.lock().unwrap_or_else(|p| p.into_inner());
        print!("{}", &partial[*printed..]);
        let _ = std::io::stdout().flush();
        *printed = partial.len();
    }

    fn on_stream_end(&self) {
        println!();
        let mut printed = self.printed.lock().unwrap_or_else(|p| p.into_inner());
        *printed = 0;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting vault-chat");

    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?
    };

    // CLI overrides beat file config
    if let Some(endpoint) = cli.endpoint {
        file_config.model.endpoint = endpoint;
    }
    if let Some(model) = cli.model {
        file_config.model.name = model;
    }
    if let Some(temperature) = cli.temperature {
        file_config.model.temperature = temperature;
    }
    if let Some(max) = cli.max_tokens {
        file_config.model.max_response_tokens = Some(max);
    }
    if let Some(instructions) = cli.instructions {
        file_config.model.instructions = instructions;
    }
    if let Some(tick_ms) = cli.tick_ms {
        file_config.stream.tick_ms = tick_ms;
    }

    let tick = file_config.tick();

    // === Dependency Injection ===
    let backend_config = OllamaConfig::new(file_config.model.name.clone())
        .with_endpoint(file_config.model.endpoint.clone());
    let backend =
        Arc::new(OllamaBackend::new(backend_config).context("failed to create backend")?);

    let tools = if cli.no_tools {
        ToolRegistry::new()
    } else {
        builtin_registry()
    };
    let session_config = file_config.to_session_config().with_tools(tools);

    let mut notifiers: Vec<Arc<dyn ChatNotifier>> = vec![Arc::new(ConsoleNotifier::default())];
    if let Some(path) = &cli.log_file {
        match JsonlTranscriptLogger::new(path) {
            Some(logger) => notifiers.push(Arc::new(logger)),
            None => bail!("could not open log file {}", path.display()),
        }
    }
    let notifier = Arc::new(CompositeNotifier::new(notifiers));

    let manager = SessionManager::with_notifier(backend, notifier);

    // An initialization failure blocks the chat surface until resolved.
    if let Err(e) = manager.initialize(session_config).await {
        bail!("model unavailable: {}", e);
    }

    if cli.chat {
        run_chat(&manager, tick, cli.no_stream).await
    } else {
        let prompt = match cli.prompt {
            Some(p) => p,
            None => bail!("Prompt is required. Use --chat for interactive mode."),
        };
        submit_once(&manager, &prompt, tick, cli.no_stream).await
    }
}

/// Interactive loop: one prompt per stdin line; `/reset` starts a fresh
/// session, `/quit` exits. Empty lines never produce a request.
async fn run_chat(manager: &SessionManager, tick: Duration, no_stream: bool) -> Result<()> {
    println!("vault-chat interactive mode. /reset clears the session, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                if let Err(e) = manager.reset(None).await {
                    eprintln!("reset failed: {}", e);
                } else {
                    println!("session reset");
                }
            }
            prompt => {
                if let Err(e) = submit_once(manager, prompt, tick, no_stream).await {
                    // Generation failures are recoverable: report and
                    // let the user resubmit.
                    eprintln!("error: {}", e);
                }
            }
        }
    }
    Ok(())
}

async fn submit_once(
    manager: &SessionManager,
    prompt: &str,
    tick: Duration,
    no_stream: bool,
) -> Result<()> {
    if no_stream {
        let text = manager.generate(prompt).await?;
        println!("{}", text);
    } else {
        manager.generate_streamed(prompt, tick).await?;
    }
    Ok(())
}
