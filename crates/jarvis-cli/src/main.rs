//! jarvis - conversational assistant in the terminal

mod commands;
mod config;
mod opener;
mod session;
mod speech;
mod utils;

use anyhow::Context;
use clap::Parser;
use jarvis_agent::{ActionExecutor, JarvisEvent, Orchestrator, OrchestratorConfig};
use jarvis_ai::{GatewayClient, ImageStyle, Role};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::opener::{BrowserEnvOpener, SystemOpener};
use crate::session::JsonlStore;
use crate::speech::{CommandSpeaker, Speaker};

/// jarvis - conversational assistant
#[derive(Parser, Debug)]
#[command(name = "jarvis")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in non-interactive mode with a single message
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Attach an image file to the message given with -c
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Image style (photorealistic, anime, oil-painting, ...)
    #[arg(short, long)]
    style: Option<String>,

    /// Chat endpoint URL
    #[arg(long)]
    chat_url: Option<String>,

    /// Image generation endpoint URL
    #[arg(long)]
    image_url: Option<String>,

    /// Read replies aloud
    #[arg(long)]
    voice: bool,

    /// Reply only; never open URLs
    #[arg(long)]
    no_actions: bool,

    /// Start a new conversation instead of resuming the latest one
    #[arg(long)]
    new: bool,

    /// Do not store conversations
    #[arg(long)]
    no_store: bool,

    /// List stored conversations
    #[arg(long)]
    conversations: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    let filter = if args.verbose {
        EnvFilter::new("jarvis=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    if args.conversations {
        return list_conversations(&JsonlStore::new(cfg.store_dir()));
    }

    // Merge config with CLI args (CLI takes precedence)
    let chat_url = args.chat_url.or_else(|| cfg.chat_endpoint()).context(
        "No chat endpoint configured. Set chat_endpoint in the config file or JARVIS_CHAT_URL.",
    )?;
    let image_url = args.image_url.or_else(|| cfg.image_endpoint()).context(
        "No image endpoint configured. Set image_endpoint in the config file or JARVIS_IMAGE_URL.",
    )?;

    let image_style = match args.style {
        Some(ref style) => style.parse::<ImageStyle>().map_err(anyhow::Error::msg)?,
        None => cfg.image_style(),
    };

    let mut client = GatewayClient::new(chat_url, image_url);
    if let Some(key) = cfg.api_key() {
        client = client.with_api_key(key);
    }
    let client = Arc::new(client);

    let executor = Arc::new(ActionExecutor::new(
        Arc::new(SystemOpener),
        Arc::new(BrowserEnvOpener::from_env()),
    ));

    let orchestrator_config = OrchestratorConfig {
        system_prompt: cfg.system_prompt(),
        image_style,
        execute_actions: !args.no_actions,
        generate_images: true,
    };
    let mut orchestrator =
        Orchestrator::new(orchestrator_config, client.clone(), client, executor);

    let use_store = cfg.store_enabled() && !args.no_store;
    if use_store {
        orchestrator = orchestrator.with_store(Arc::new(JsonlStore::new(cfg.store_dir())));
    }

    let speaker: Arc<dyn Speaker> = Arc::new(CommandSpeaker::new(
        cfg.voice.command.clone().unwrap_or_else(|| "espeak".to_string()),
        cfg.voice.rate.unwrap_or(1.0),
        cfg.voice.pitch.unwrap_or(1.0),
    ));
    let voice = Voice {
        enabled: args.voice || cfg.voice_enabled(),
        speaker,
    };

    // Ctrl-C stops the reply in progress; when idle it exits
    let handle = orchestrator.handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if handle.is_running() {
                handle.abort();
            } else {
                std::process::exit(130);
            }
        }
    });

    // Non-interactive mode
    if let Some(command) = args.command {
        let image = args
            .image
            .as_deref()
            .map(utils::image_data_url)
            .transpose()?;
        return run_command(&orchestrator, &command, image, &voice).await;
    }

    if use_store {
        if args.new {
            orchestrator.new_conversation().await;
        } else {
            match orchestrator.restore().await {
                Ok(0) => {}
                Ok(count) => eprintln!("Resumed conversation ({} messages). /new starts fresh.", count),
                Err(e) => eprintln!("Warning: Failed to restore conversation: {}", e),
            }
        }
    }

    run_interactive(&mut orchestrator, voice).await
}

struct Voice {
    enabled: bool,
    speaker: Arc<dyn Speaker>,
}

impl Voice {
    /// Read the reply aloud in the background
    fn speak_reply(&self, orchestrator: &Orchestrator, reply_id: &str) {
        if !self.enabled {
            return;
        }
        let Some(reply) = orchestrator
            .messages()
            .into_iter()
            .find(|m| m.id == reply_id && !m.content.is_empty())
        else {
            return;
        };

        let speaker = Arc::clone(&self.speaker);
        tokio::spawn(async move {
            if let Err(e) = speaker.speak(&reply.content).await {
                tracing::warn!("Speech failed: {}", e);
            }
        });
    }
}

/// Print conversation events as they arrive
fn spawn_printer(mut receiver: broadcast::Receiver<JarvisEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Display fell behind by {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                JarvisEvent::AssistantStart { .. } => {
                    print!("JARVIS: ");
                }
                JarvisEvent::Delta { delta, .. } => {
                    print!("{}", delta);
                }
                JarvisEvent::AssistantEnd { .. } => {
                    println!();
                }
                JarvisEvent::Error { message } => {
                    println!("{}", message);
                }
                JarvisEvent::Aborted { .. } => {
                    println!("\n[Stopped]");
                }
                JarvisEvent::Notification { text } => {
                    println!("[{}]", text);
                }
                JarvisEvent::ImageRequested { prompt, .. } => {
                    println!("[Generating image: {}]", prompt);
                }
                JarvisEvent::ImageAttached { image, .. } => {
                    if utils::is_data_url(&image) {
                        println!("[Image ready: {}]", utils::truncate_chars(&image, 60));
                    } else {
                        println!("[Image ready: {}]", image);
                    }
                }
                _ => {}
            }
            std::io::stdout().flush().ok();
        }
    })
}

async fn run_command(
    orchestrator: &Orchestrator,
    text: &str,
    image: Option<String>,
    voice: &Voice,
) -> anyhow::Result<()> {
    println!("jarvis> {}", text);
    println!();

    let printer = spawn_printer(orchestrator.subscribe());

    let outcome = orchestrator.send(text, image).await?;
    if let Some(task) = outcome.action_task {
        task.await.ok();
    }

    if voice.enabled {
        if let Some(reply) = orchestrator
            .messages()
            .into_iter()
            .find(|m| m.id == outcome.reply_id && !m.content.is_empty())
        {
            if let Err(e) = voice.speaker.speak(&reply.content).await {
                eprintln!("Warning: Speech failed: {}", e);
            }
        }
    }

    // Wait a bit for final events
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    printer.abort();

    Ok(())
}

async fn run_interactive(orchestrator: &mut Orchestrator, mut voice: Voice) -> anyhow::Result<()> {
    use std::io;

    let printer = spawn_printer(orchestrator.subscribe());
    let mut pending_image: Option<(PathBuf, String)> = None;

    if io::IsTerminal::is_terminal(&io::stderr()) {
        eprintln!(
            "JARVIS online (style: {}, voice: {}). Type /help for commands.",
            orchestrator.config().image_style.name(),
            if voice.enabled { "on" } else { "off" }
        );
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(
            input,
            orchestrator.config().image_style,
            voice.enabled,
        ) {
            use commands::CommandResult;
            match result {
                CommandResult::Clear => {
                    orchestrator.clear().await;
                    println!("Cleared conversation.");
                }
                CommandResult::NewConversation => {
                    orchestrator.new_conversation().await;
                    println!("Started a new conversation.");
                }
                CommandResult::SetStyle(style) => {
                    orchestrator.set_image_style(style);
                    println!("Image style set to: {}", style.name());
                }
                CommandResult::SetVoice(enabled) => {
                    voice.enabled = enabled;
                    println!("Voice output {}.", if enabled { "on" } else { "off" });
                }
                CommandResult::Attach(path) => match utils::image_data_url(&path) {
                    Ok(data_url) => {
                        println!("Attached {}. It will be sent with your next message.", path.display());
                        pending_image = Some((path, data_url));
                    }
                    Err(e) => println!("Could not attach image: {:#}", e),
                },
                CommandResult::History => print_history(orchestrator),
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        let image = pending_image.take().map(|(_, data_url)| data_url);
        match orchestrator.send(input, image).await {
            Ok(outcome) => {
                if let Some(task) = outcome.action_task {
                    task.await.ok();
                }
                voice.speak_reply(orchestrator, &outcome.reply_id);
            }
            Err(e) => println!("{}", e),
        }
        // Let the printer catch up before the next prompt
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    printer.abort();
    Ok(())
}

fn print_history(orchestrator: &Orchestrator) {
    let messages = orchestrator.messages();
    if messages.is_empty() {
        println!("No messages yet.");
        return;
    }

    for message in messages {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "JARVIS",
        };
        println!("{}: {}", who, message.content);
        if message.input_image.is_some() {
            println!("  [image attached]");
        }
        if let Some(image) = message.generated_image {
            println!("  [generated image: {}]", utils::truncate_chars(&image, 60));
        }
    }
}

fn list_conversations(store: &JsonlStore) -> anyhow::Result<()> {
    let conversations = store.list()?;

    if conversations.is_empty() {
        println!("No stored conversations.");
        return Ok(());
    }

    println!("Stored conversations:\n");
    for info in conversations {
        let short_id = info.id.get(..8).unwrap_or(&info.id);
        println!(
            "  {}  {}  ({} messages)",
            short_id,
            info.created_at_display(),
            info.message_count
        );
    }

    Ok(())
}
