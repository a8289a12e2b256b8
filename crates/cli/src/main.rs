//! Console channel
//!
//! `triage [chat]` runs a free-form dialogue over stdin/stdout; `/end`
//! finishes it immediately. `triage phone [caller]` runs the fixed
//! eleven-question interview. Critical alerts go to stderr as they fire.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use triage_agent::{EngineEvent, TriageEngine};
use triage_config::{load_settings, Settings};
use triage_core::TriageReport;

const END_COMMAND: &str = "/end";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Chat,
    Phone,
}

fn parse_mode(arg: Option<&str>) -> anyhow::Result<Mode> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        None | Some("chat") => Ok(Mode::Chat),
        Some("phone") => Ok(Mode::Phone),
        Some(other) => anyhow::bail!("unknown mode '{}', expected 'chat' or 'phone'", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env} > config/default > defaults
    let env = std::env::var("TRIAGE_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing is not up yet
            eprintln!("Failed to load configuration ({}), using defaults", e);
            Settings::default()
        }
    };
    init_tracing(&settings);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(args.first().map(String::as_str))?;

    let engine = Arc::new(TriageEngine::from_settings(&settings).build());
    tracing::info!(providers = ?engine.provider_names(), ?mode, "Console channel started");

    let cleanup = engine.start_cleanup_task();
    let printer = spawn_alert_printer(&engine);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let result = match mode {
        Mode::Chat => run_chat(&engine, &mut input).await,
        Mode::Phone => run_phone(&engine, &mut input, args.get(1).cloned()).await,
    };

    if cleanup.send(true).is_err() {
        tracing::debug!("Cleanup task already stopped");
    }
    printer.abort();
    result
}

async fn run_chat(engine: &TriageEngine, input: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<()> {
    let id = engine.create_dialogue()?;
    let greeting = engine.next_turn(&id).await?;
    say(&greeting.display_text)?;

    while let Some(line) = input.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == END_COMMAND {
            let report = engine.end_now(&id).await?;
            return print_report(&report);
        }

        let outcome = engine.handle_utterance(&id, line).await?;
        say(&outcome.display_text)?;
        if let Some(report) = outcome.report {
            return print_report(&report);
        }
    }

    if engine.remove(&id) {
        tracing::info!(session_id = %id, "Input closed before completion, session discarded");
    }
    Ok(())
}

async fn run_phone(
    engine: &TriageEngine,
    input: &mut Lines<BufReader<Stdin>>,
    caller: Option<String>,
) -> anyhow::Result<()> {
    let id = engine.create_interview(caller)?;
    let mut question = engine.current_question(&id).await?;

    while let Some(current) = question {
        say(current.prompt)?;
        let Some(line) = input.next_line().await.context("reading stdin")? else {
            engine.remove(&id);
            return Ok(());
        };

        let outcome = engine.answer_interview(&id, &line).await?;
        if let Some(report) = outcome.report {
            say("Thank you. A human responder will call you back shortly.")?;
            return print_report(&report);
        }
        question = outcome.next_question;
    }
    Ok(())
}

fn say(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "AI: {}", text)?;
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

fn print_report(report: &TriageReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    println!("\n{}", json);
    Ok(())
}

fn spawn_alert_printer(engine: &TriageEngine) -> tokio::task::JoinHandle<()> {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EngineEvent::CriticalAlert { session_id, signal }) => {
                    eprintln!(
                        "\n[ALERT] {} priority {} ({}) session {}",
                        signal.severity,
                        signal.priority,
                        signal.risk_factors.join(", "),
                        session_id
                    );
                }
                Ok(event) => {
                    tracing::debug!(session_id = %event.session_id(), "Engine event");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Alert printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("triage={}", level).into()
    });

    // stdout belongs to the conversation
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(None).unwrap(), Mode::Chat);
        assert_eq!(parse_mode(Some("PHONE")).unwrap(), Mode::Phone);
        assert!(parse_mode(Some("fax")).is_err());
    }
}
