//! Console Bot
//!
//! Runs the Courier pipeline against events typed (or piped) into stdin, one
//! JSON object per line, in the platform's wire format:
//!
//! ```text
//! {"type":"connected","self":{"id":"U0BOT","name":"courier"}}
//! {"type":"message","channel":"C1","user":"U1","text":"hi <@U0BOT>"}
//! {"type":"message","channel":"D1","user":"U1","text":"echo hello there"}
//! {"type":"message","channel":"C1","bot_id":"B1","subtype":"bot_message","text":"build ok"}
//! ```
//!
//! Replies are printed to stdout instead of being posted back.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --user U1=alice --channel C1=general < events.jsonl
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use courier::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Feeds JSON-line platform events from stdin through a Courier bot.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (defaults to courier.toml in the current directory).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Configuration profile.
    #[arg(short, long)]
    profile: Option<String>,

    /// Known users, as ID=NAME.
    #[arg(long = "user", value_name = "ID=NAME")]
    users: Vec<String>,

    /// Known bot integrations, as ID=NAME.
    #[arg(long = "bot", value_name = "ID=NAME")]
    bots: Vec<String>,

    /// Known channels, as ID=NAME.
    #[arg(long = "channel", value_name = "ID=NAME")]
    channels: Vec<String>,

    /// Drop messages posted by bot integrations.
    #[arg(long)]
    suppress_bot_messages: bool,
}

fn parse_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((id, name)) if !id.is_empty() => Ok((id, name)),
        _ => bail!("expected ID=NAME, got {pair:?}"),
    }
}

fn build_directory(args: &Args) -> Result<Directory> {
    let mut directory = Directory::new();
    for pair in &args.users {
        let (id, name) = parse_pair(pair)?;
        directory = directory.with_user(id, name);
    }
    for pair in &args.bots {
        let (id, name) = parse_pair(pair)?;
        directory = directory.with_bot(id, name);
    }
    for pair in &args.channels {
        let (id, name) = parse_pair(pair)?;
        directory = directory.with_channel(id, name);
    }
    Ok(directory)
}

// ============================================================================
// Handlers
// ============================================================================

/// Logs everything said in public channels.
async fn broadcast_handler(msg: Message) {
    let tag = if msg.mentioned { " (mentions me)" } else { "" };
    println!("[#{}] {}: {}{}", msg.channel.name, msg.from, msg.text, tag);
}

/// Direct messages that are not commands.
async fn direct_handler(msg: Message) {
    println!(
        "[DM] {}: {} (try `echo`, `mentions` or `fail`)",
        msg.from, msg.text
    );
}

async fn echo_handler(msg: Message) {
    println!("[DM] -> {}: {}", msg.from.name, msg.text);
}

async fn mentions_handler(msg: Message) {
    if msg.mentions.is_empty() {
        println!("[DM] -> {}: nobody mentioned", msg.from.name);
        return;
    }
    let names: Vec<_> = msg.mentions.iter().map(ToString::to_string).collect();
    println!("[DM] -> {}: {}", msg.from.name, names.join(", "));
}

/// Always fails, to show how handler errors are reported.
async fn fail_handler(msg: Message) -> Result<()> {
    bail!("asked to fail by {}", msg.from)
}

fn registry() -> Result<HandlerRegistry> {
    Ok(HandlerRegistry::new()
        .with_broadcast(broadcast_handler)
        .with_direct(direct_handler)
        .with_command("echo", echo_handler)?
        .with_command("mentions", mentions_handler)?
        .with_command("fail", fail_handler)?)
}

// ============================================================================
// Main
// ============================================================================

/// Decodes stdin lines into events until EOF.
async fn read_events(tx: mpsc::Sender<InboundEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match InboundEvent::from_json(&line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Skipping malformed event: {e}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = CourierRuntime::builder()
        .resolver(build_directory(&args)?)
        .registry(registry()?);
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    if args.suppress_bot_messages {
        builder = builder.suppress_bot_messages(true);
    }
    let runtime = builder.build()?;

    let (tx, rx) = mpsc::channel(64);
    let reader = tokio::spawn(read_events(tx));

    runtime.run(rx).await?;
    info!(stats = %runtime.stats(), "Bye");

    reader.abort();
    Ok(())
}
