use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};

use crate::domain::Provider;

#[derive(Parser)]
#[command(name = "personabot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with the persona's example conversations
    #[arg(long, global = true, default_value = "training_data/conversations.json")]
    pub dataset: PathBuf,

    /// Number of few-shot exemplars per turn
    #[arg(
        short,
        long,
        global = true,
        default_value = "3",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub k: usize,

    #[arg(long, global = true, default_value = "together")]
    pub provider: Provider,

    /// Falls back to TOGETHER_API_KEY / ANTHROPIC_API_KEY depending on the provider
    #[arg(long, global = true, env = "PERSONABOT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Completion endpoint, e.g. http://localhost:11434 for Ollama
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Completion request timeout in seconds
    #[arg(long, global = true, default_value = "60")]
    pub timeout: u64,

    /// Transcript entries (including the new message) used as context
    #[arg(long, global = true, default_value = "10")]
    pub context_window: usize,

    #[arg(long, global = true)]
    pub min_score: Option<f32>,

    /// Completions rejected by the topic filter before a safe reply is used
    #[arg(long, global = true, default_value = "3")]
    pub max_attempts: usize,

    /// Ask for the reply directly instead of reasoning first
    #[arg(long, global = true)]
    pub no_reasoning: bool,

    #[arg(long, global = true)]
    pub mock_embeddings: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat with the persona
    Chat,

    /// Send a single message and print the reply
    Ask { message: String },

    /// Show which examples would be used for a message, without calling the LLM
    Select { context: String },

    /// Dataset statistics
    Stats,
}
