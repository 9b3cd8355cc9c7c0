use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attache_gateway::daemon::MEDIA_TIMEOUT_SECS;
use attache_gateway::reasoning::{GeminiClient, Reasoner};
use attache_gateway::voice::TextToSpeech;
use attache_gateway::{Config, Daemon, Turn};

/// Attache - voice and chat assistant gateway with task automation
#[derive(Parser)]
#[command(name = "attache", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "ATTACHE_PORT", default_value = "8787")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Send a single prompt through the reasoning client
    TestReasoning {
        /// Prompt text
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,attache_gateway=info",
        1 => "info,attache_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestTts { text } => test_tts(&text).await,
            Command::TestReasoning { prompt } => test_reasoning(&prompt).await,
        };
    }

    tracing::info!(port = cli.port, "starting attache gateway");

    let config = Config::load()?;
    tracing::debug!(
        timezone = %config.timezone,
        model = %config.reasoning.model,
        automation = config.automation.webhook_url.is_some(),
        voice = config.voice.enabled,
        "loaded configuration"
    );

    let daemon = Daemon::new(config, cli.port);
    daemon.run().await?;

    Ok(())
}

/// Test TTS output by synthesizing to a file
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let tts = TextToSpeech::from_config(
        &config.voice,
        &config.api_keys,
        Duration::from_secs(MEDIA_TIMEOUT_SECS),
    )?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    let out = std::env::temp_dir().join("attache-tts-test.mp3");
    std::fs::write(&out, &mp3_data)?;

    println!("\n---");
    println!("Wrote {} - play it to verify TTS is working!", out.display());

    Ok(())
}

/// Send a single prompt through the reasoning client and print the reply
async fn test_reasoning(prompt: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let key = config
        .api_keys
        .gemini
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY not set"))?;

    let client = GeminiClient::new(key, &config.reasoning, config.timezone)?;

    println!("Asking: \"{prompt}\"\n");
    let reply = client.reply(&[Turn::user(prompt)]).await?;

    println!("{}", reply.text);
    if let Some(task) = reply.task {
        println!("\nDetected task:");
        println!("  title: {}", task.title);
        if task.due.is_empty() {
            println!("  due:   (unclear)");
        } else {
            println!("  due:   {}", task.due);
        }
        println!("  notes: {}", task.notes);
    }

    Ok(())
}
