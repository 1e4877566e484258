use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod chat;
mod onboard;
mod render;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "quill - a terminal agent that reads and edits your files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.quill/config.toml interactively
    Init,
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Run a single turn with this message and exit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Completion provider: openai or openrouter
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Maximum tool calls per turn
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Directory that relative tool paths resolve against (default: current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Log at debug level to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "quill_core=debug,quill=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.chat.verbose);

    match cli.command {
        Some(Commands::Init) => onboard::run_init(),
        None => chat::run(cli.chat).await,
    }
}
