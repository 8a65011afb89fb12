//! ntfybot: chat bot for sending and receiving messages to/from ntfy
//!
//! Run with: ntfybot --bot-token=mem
//!
//! A token starting with `mem` runs the bot against the console: every line
//! typed on stdin is posted to the `console` channel, and everything the bot
//! sends is printed. Try:
//!
//! ```text
//! @ntfy subscribe mytopic
//! @ntfy publish mytopic "hello there" --title=Hi
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ntfy_bridge::chat::{ChatAdapter, MemoryChat};
use ntfy_bridge::settings::{FileSettings, Platform, Settings, DEFAULT_CONFIG_FILE};
use ntfy_bridge::Bridge;

/// Channel that console input is posted to
const CONSOLE_CHANNEL: &str = "console";

#[derive(Parser, Debug)]
#[command(
    name = "ntfybot",
    version,
    about = "Chat bot for sending and receiving messages to/from ntfy"
)]
struct Args {
    /// Config file [default: /etc/ntfy/bot.yml]
    #[arg(short, long, env = "NTFY_BOT_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Enable debugging output
    #[arg(long, env = "NTFY_BOT_DEBUG")]
    debug: bool,

    /// Bot token
    #[arg(short = 't', long, env = "NTFY_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Default ntfy server for commands without --server
    #[arg(long, env = "NTFY_BOT_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config_path, explicit) = match args.config {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let file = FileSettings::load(&config_path, explicit)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let settings = Settings::resolve(file, args.bot_token, args.base_url, args.debug)?;

    init_tracing(settings.debug);

    let chat = match settings.platform() {
        Platform::Mem => Arc::new(MemoryChat::default().with_echo()),
        other => bail!("chat platform '{}' is not supported by this build", other),
    };

    let bridge =
        Bridge::new(settings.bridge_config(), chat.clone()).context("failed to create bridge")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    tokio::spawn(read_console(Arc::clone(&chat), shutdown.clone()));

    println!(
        "Type '{} help' to get started, Ctrl-D to quit",
        chat.mention_self()
    );

    bridge.run(shutdown).await?;

    tracing::info!("Exiting");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Cancel `shutdown` on SIGINT or SIGTERM
async fn wait_for_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = shutdown.cancelled() => return,
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }

    tracing::info!("Signal received, closing all active sessions");
    shutdown.cancel();
}

/// Post stdin lines to the console channel until EOF
async fn read_console(chat: Arc<MemoryChat>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                if let Err(e) = chat.post(CONSOLE_CHANNEL, "console", line).await {
                    tracing::warn!(error = %e, "Failed to post console input");
                    return;
                }
            }
            Ok(None) => {
                tracing::info!("End of input");
                shutdown.cancel();
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read console input");
                shutdown.cancel();
                return;
            }
        }
    }
}
