//! coach-engine - interactive console for the stage orchestration engine
//!
//! Reads human utterances from stdin, one per line, and prints the next
//! system utterance. Lines starting with `/` are console commands:
//!
//! - `/insights` prints what has been collected so far
//! - `/reset` returns the conversation to its first stage
//! - `/lang <code>` switches the response language hint
//! - `/quit` exits
//!
//! Pass `--resume <conversation-id>` to continue a stored conversation.
//! Logs go to stderr so they never interleave with the dialogue.

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use coach_engine::adapters::ai::AnthropicProvider;
use coach_engine::adapters::judgment::LlmSemanticJudge;
use coach_engine::adapters::realization::LlmContentRealizer;
use coach_engine::adapters::storage::{FileSessionStore, InMemorySessionStore};
use coach_engine::application::{
    ConversationLocks, GetInsightsHandler, GetInsightsQuery, ProcessTurnCommand,
    ProcessTurnHandler, ResetConversationCommand, ResetConversationHandler,
    StartConversationCommand, StartConversationHandler,
};
use coach_engine::config::AppConfig;
use coach_engine::domain::engine::{InsightSnapshot, StrictnessProfile, TurnOrchestrator};
use coach_engine::domain::foundation::ConversationId;
use coach_engine::ports::{AIProvider, ContentRealizer, SemanticJudge, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::load()?;
    config.validate()?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.logging.env_filter()?)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }

    let (judge, realizer) = collaborators(&config)?;
    if judge.is_none() {
        config.engine.default_profile = StrictnessProfile::Deterministic;
        tracing::warn!("No AI provider configured, running with deterministic gating");
    }

    let store: Arc<dyn SessionStore> = match &config.storage.directory {
        Some(dir) => {
            tracing::info!(directory = %dir.display(), "Using file session store");
            Arc::new(FileSessionStore::new(dir))
        }
        None => Arc::new(InMemorySessionStore::new()),
    };

    let engine = Arc::new(TurnOrchestrator::new(&config.engine, judge, realizer)?);
    let locks = ConversationLocks::new();
    let turns = ProcessTurnHandler::new(engine.clone(), store.clone(), locks.clone());
    let reset = ResetConversationHandler::new(engine.clone(), store.clone(), locks.clone());
    let insights = GetInsightsHandler::new(engine.clone(), store.clone());

    let mut stdout = tokio::io::stdout();

    let conversation_id = match resume_id()? {
        Some(id) => {
            let snapshot = insights.handle(GetInsightsQuery { conversation_id: id }).await?;
            tracing::info!(conversation_id = %id, stage = %snapshot.current_stage, "Resuming conversation");
            write_line(&mut stdout, &format!("[resumed at {}]", snapshot.current_stage.label())).await?;
            id
        }
        None => {
            let start = StartConversationHandler::new(engine.clone(), store.clone(), locks.clone());
            let started = start.handle(StartConversationCommand::default()).await?;
            tracing::info!(conversation_id = %started.conversation_id, "Conversation started");
            write_line(&mut stdout, &started.utterance).await?;
            started.conversation_id
        }
    };

    let mut language = "en".to_string();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/insights", _) => {
                let snapshot = insights
                    .handle(GetInsightsQuery { conversation_id })
                    .await?;
                write_line(&mut stdout, &render_insights(&snapshot)).await?;
            }
            ("/reset", _) => {
                let result = reset
                    .handle(ResetConversationCommand { conversation_id })
                    .await?;
                write_line(&mut stdout, &result.utterance).await?;
            }
            ("/lang", code) if !code.trim().is_empty() => {
                language = code.trim().to_string();
                write_line(&mut stdout, &format!("[language: {}]", language)).await?;
            }
            _ => {
                let output = turns
                    .handle(ProcessTurnCommand::new(conversation_id, line, language.as_str()))
                    .await?;
                write_line(&mut stdout, &output.utterance).await?;
            }
        }
    }

    tracing::info!(conversation_id = %conversation_id, "Console closed");
    Ok(())
}

type Collaborators = (
    Option<Arc<dyn SemanticJudge>>,
    Option<Arc<dyn ContentRealizer>>,
);

/// Judge and realizer sharing one Anthropic provider, when a key is set.
fn collaborators(config: &AppConfig) -> Result<Collaborators, Box<dyn Error>> {
    let Some(anthropic) = config.ai.anthropic() else {
        return Ok((None, None));
    };
    let provider: Arc<dyn AIProvider> = Arc::new(AnthropicProvider::new(anthropic)?);
    tracing::info!(model = %config.ai.model, "Using Anthropic for judgments and openers");

    let judge: Arc<dyn SemanticJudge> = Arc::new(LlmSemanticJudge::new(provider.clone()));
    let realizer: Arc<dyn ContentRealizer> = Arc::new(LlmContentRealizer::new(provider));
    Ok((Some(judge), Some(realizer)))
}

fn resume_id() -> Result<Option<ConversationId>, Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--resume" {
            let id = args.next().ok_or("--resume needs a conversation id")?;
            return Ok(Some(id.parse()?));
        }
    }
    Ok(None)
}

fn render_insights(snapshot: &InsightSnapshot) -> String {
    let mut out = String::new();
    for stage in &snapshot.stages {
        let mark = if stage.complete { "x" } else { " " };
        out.push_str(&format!("[{}] {}\n", mark, stage.label));
        for (name, value) in &stage.fields {
            out.push_str(&format!("    {}: {}\n", name, value.display()));
        }
    }
    if snapshot.concluded {
        out.push_str("(concluded)\n");
    }
    out
}

async fn write_line(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.trim_end().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
