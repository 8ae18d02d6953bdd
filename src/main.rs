use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use personabot::cli::{Cli, Commands};
use personabot::domain::{render_turns, sanitize_input};
use personabot::{
    AnthropicClient, ChatClient, ChatSession, ClientConfig, DomainError, EmbeddingService,
    ExampleLoader, ExampleStore, FewShotSelector, GeneratorConfig, JsonExampleLoader,
    MockEmbedding, NgramEmbedding, Provider, ResponseGenerator, Speaker, TogetherClient,
};

const YOU_PROMPT: &str = "\x1b[94m> You:\x1b[0m ";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = JsonExampleLoader::new().load(&cli.dataset).await?;

    if let Commands::Stats = cli.command {
        print_stats(&cli, &store);
        return Ok(());
    }
    ensure_examples(&store)?;

    match cli.command {
        Commands::Select { ref context } => {
            let selector = build_selector(&cli, store).await?;
            let text = sanitize_input(context);
            let results = selector
                .select(&render_turns([(Speaker::User, text.as_str())]), cli.k)
                .await?;

            println!("Top {} examples:\n", results.len());
            for (i, result) in results.iter().enumerate() {
                println!("{}. {}", i + 1, result.display_line());
                for line in result.example().context_text().lines() {
                    println!("   | {}", line);
                }
                println!("   > {}", result.example().response());
                println!();
            }
            return Ok(());
        }
        Commands::Ask { .. } | Commands::Chat | Commands::Stats => {}
    }

    let selector = Arc::new(build_selector(&cli, store).await?);
    let chat_client = build_chat_client(&cli)?;
    info!(
        "Using {} model {} with k={}",
        cli.provider,
        chat_client.model_name(),
        cli.k
    );

    let config = GeneratorConfig::new()
        .with_k(cli.k)
        .with_max_attempts(cli.max_attempts)
        .with_context_window(cli.context_window)
        .with_chain_of_thought(!cli.no_reasoning);

    let generator = Arc::new(ResponseGenerator::new(selector, chat_client, config));
    let mut session = ChatSession::new(generator);

    match cli.command {
        Commands::Ask { ref message } => {
            let reply = session.send(message).await?;
            println!("{}", reply);
        }
        Commands::Chat => run_chat_loop(&mut session).await?,
        Commands::Stats | Commands::Select { .. } => {}
    }

    Ok(())
}

/// Fails before the first prompt when there is nothing to select from.
fn ensure_examples(store: &ExampleStore) -> Result<(), DomainError> {
    if store.is_empty() {
        return Err(DomainError::insufficient_examples(
            "the dataset contains no examples; at least one is required",
        ));
    }
    Ok(())
}

async fn build_selector(cli: &Cli, store: ExampleStore) -> Result<FewShotSelector> {
    let embedding_service: Arc<dyn EmbeddingService> = if cli.mock_embeddings {
        info!("Using mock embedding service");
        Arc::new(MockEmbedding::new())
    } else {
        Arc::new(NgramEmbedding::new())
    };

    let mut selector = FewShotSelector::build(store, embedding_service).await?;
    if let Some(score) = cli.min_score {
        selector = selector.with_min_score(score);
    }
    Ok(selector)
}

fn build_chat_client(cli: &Cli) -> Result<Arc<dyn ChatClient>> {
    let key_var = match cli.provider {
        Provider::Together => "TOGETHER_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
    };
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var(key_var).ok())
        .unwrap_or_default();

    // Local OpenAI-compatible servers (Ollama, LM Studio) need no key.
    if api_key.is_empty() && cli.base_url.is_none() {
        bail!("no API key: pass --api-key or set {key_var}");
    }

    let mut config = ClientConfig::for_provider(cli.provider, api_key)
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(ref url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(ref model) = cli.model {
        config = config.with_model(model);
    }

    let client: Arc<dyn ChatClient> = match cli.provider {
        Provider::Together => Arc::new(TogetherClient::new(config)?),
        Provider::Anthropic => Arc::new(AnthropicClient::new(config)?),
    };
    Ok(client)
}

async fn run_chat_loop(session: &mut ChatSession) -> Result<()> {
    println!("Chatting with the persona. Commands: /reset, /history, /quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", YOU_PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset();
                println!("Started a new conversation.\n");
                continue;
            }
            "/history" => {
                let transcript = session.transcript();
                if transcript.is_empty() {
                    println!("(no messages yet)\n");
                }
                for entry in transcript.entries() {
                    println!(
                        "[{}] {}: {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.speaker,
                        entry.text
                    );
                }
                println!();
                continue;
            }
            _ => {}
        }

        match session.send(&line).await {
            Ok(reply) => println!("\n\x1b[92m> Response: {}\x1b[0m\n", reply),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(DomainError::InvalidInput(msg)) => println!("({})\n", msg),
            Err(e) => eprintln!("\n\x1b[91m! {}\x1b[0m\n", e),
        }
    }

    Ok(())
}

fn print_stats(cli: &Cli, store: &ExampleStore) {
    let examples = store.len();
    let turns = store.total_turns();
    let avg_turns = if examples == 0 {
        0.0
    } else {
        turns as f64 / examples as f64
    };
    let avg_response = if examples == 0 {
        0.0
    } else {
        store
            .all()
            .iter()
            .map(|e| e.response().chars().count())
            .sum::<usize>() as f64
            / examples as f64
    };

    println!("PersonaBot Dataset Statistics");
    println!("=============================");
    println!("Dataset:          {}", cli.dataset.display());
    println!("Examples:         {}", examples);
    println!("Context turns:    {}", turns);
    println!("Turns/example:    {:.1}", avg_turns);
    println!("Avg reply chars:  {:.1}", avg_response);
}
