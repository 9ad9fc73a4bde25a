//! One-shot CLI driving the orchestrator loop against a single prompt
//! (spec §6 "CLI surface"): positional prompt, preauthorize flags for
//! directories/files/domains/network, model/provider selection, a
//! protocol-mode flag, and a help flag. Exit codes: 0 success, 1 general
//! error, 2 usage error (the latter is clap's own default for a parse
//! failure, so nothing extra is needed here for it).

mod asker;
mod authorizer;
mod otel_init;
mod provider;
mod secrets;

use crate::asker::CliAsker;
use crate::authorizer::CliAuthorizer;
use crate::authorizer::PreauthorizeFlags;
use crate::provider::OpenAiCompatibleModel;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use journeyman_config::ConfigLoader;
use journeyman_error_judge::ErrorJudge;
use journeyman_fs::FileSystem;
use journeyman_fs::RealFileSystem;
use journeyman_inference::MockModel;
use journeyman_inference::Model;
use journeyman_orchestrator::Orchestrator;
use journeyman_orchestrator::OrchestratorConfig;
use journeyman_orchestrator::TurnOutcome;
use journeyman_protocol::LoopEvent;
use journeyman_safety::PermissionGate;
use journeyman_safety::PermissionRuleEvaluator;
use journeyman_sandbox::SandboxPolicy;
use journeyman_sandbox::WasmExecutor;
use journeyman_session::Session;
use journeyman_session::SessionStore;
use journeyman_shell::BackgroundController;
use journeyman_shell::ShellExecutor;
use journeyman_tools::builtin;
use journeyman_tools::builtin::ReadUrlTool;
use journeyman_tools::builtin::WebSearchTool;
use journeyman_tools::ToolContext;
use journeyman_tools::ToolRegistry;
use journeyman_tools::UserAsker;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const DEFAULT_CONTEXT_WINDOW: u32 = 128_000;

/// AI-assisted programming assistant: drives an LLM through a controlled
/// set of filesystem/shell/sandbox/search tools against a workspace.
#[derive(Parser, Debug)]
#[command(name = "journeyman", version, about)]
struct Cli {
    /// Natural-language prompt for one-shot mode.
    prompt: Option<String>,

    /// Switch to the newline-delimited-JSON socket protocol mode. External
    /// frontends own that transport; this binary only drives one-shot
    /// prompts, so this flag reports the limitation rather than hanging.
    #[arg(long)]
    protocol: bool,

    /// Override the configured main model identifier.
    #[arg(long)]
    model: Option<String>,

    /// API key for the target model (else `JOURNEYMAN_API_KEY`). Without
    /// one, the session runs against a mock model that always reports it
    /// has no provider configured.
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL for an OpenAI-chat-completions-compatible endpoint.
    #[arg(long)]
    base_url: Option<String>,

    /// Workspace root directory.
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    /// Override the config home directory (`~/.journeyman` by default).
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Preauthorize read/write access under a directory (repeatable).
    #[arg(long = "allow-dir")]
    allow_dir: Vec<PathBuf>,

    /// Preauthorize read/write access to a specific file (repeatable).
    #[arg(long = "allow-file")]
    allow_file: Vec<PathBuf>,

    /// Preauthorize `read_url`/`web_search` access to a domain (repeatable).
    #[arg(long = "allow-domain")]
    allow_domain: Vec<String>,

    /// Preauthorize the shell tool without a per-call prompt.
    #[arg(long)]
    allow_shell: bool,

    /// Preauthorize every network-capable tool (shell, go_sandbox,
    /// read_url, web_search).
    #[arg(long)]
    allow_network: bool,

    /// Enable `web_search` for this run.
    #[arg(long)]
    enable_search: bool,

    /// Force-enable the wasm sandbox for `go_sandbox` regardless of config.
    #[arg(long)]
    sandbox: bool,

    /// Cap on `CallingLLM` -> `ExecutingTools` round trips for this prompt.
    #[arg(long)]
    max_turns: Option<u32>,

    /// Run one advisory verification pass after a clean completion.
    #[arg(long)]
    verify: bool,

    /// Model context window, in tokens, used for prompt assembly.
    #[arg(long, default_value_t = DEFAULT_CONTEXT_WINDOW)]
    context_window: u32,

    /// Export traces via OTLP (requires a reachable collector, see
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`).
    #[arg(long)]
    telemetry: bool,

    /// Path to the encrypted provider-secrets file (defaults to
    /// `secrets.bin` inside the config directory). Consulted for an API
    /// key only when neither `--api-key` nor `JOURNEYMAN_API_KEY` is set.
    #[arg(long)]
    secrets_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    if cli.protocol {
        eprintln!("protocol mode requires the external socket frontend (spec \u{a7}6); this binary only drives one-shot prompts");
        return Ok(1);
    }

    let Some(prompt) = cli.prompt else {
        eprintln!("usage: journeyman [OPTIONS] <PROMPT>");
        return Ok(2);
    };

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::from_path(dir),
        None => ConfigLoader::from_default_dir().context("resolving config home directory")?,
    };
    let mut config = loader.load().context("loading config.yaml")?;
    if let Some(model) = cli.model {
        config.models.main = model;
    }
    if cli.sandbox {
        config.sandbox.enabled = true;
    }
    if cli.enable_search {
        config.search.enabled = true;
    }

    let _otel_guard = otel_init::init(&config, cli.telemetry, cli.telemetry.then_some("otlp_http"));

    let cwd = cli.cwd.canonicalize().unwrap_or_else(|_| cli.cwd.clone());

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let shell = ShellExecutor::new();
    let background = BackgroundController::new();

    let mut registry = ToolRegistry::new();
    builtin::register_all(&mut registry);
    registry.register(Arc::new(ReadUrlTool::new(cli.allow_domain)));
    registry.register(Arc::new(WebSearchTool::new(config.search.enabled)));
    let registry = Arc::new(registry);

    let session = Session::new(cwd.clone());
    let session_id = session.id.clone();
    let session_store = SessionStore::new(session);

    let sandbox_policy = SandboxPolicy::from_config(&config.sandbox);
    let wasm_executor = if config.sandbox.enabled {
        Some(Arc::new(WasmExecutor::new().context("initializing wasm sandbox executor")?))
    } else {
        None
    };

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<LoopEvent>(256);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let call_id = uuid::Uuid::new_v4().to_string();
    let mut base_ctx = ToolContext::new(call_id, session_id, cwd.clone(), session_store.clone(), fs, shell, background)
        .with_registry(registry.clone())
        .with_strict_read_ledger(config.safety.strict_read_ledger)
        .with_event_tx(event_tx.clone())
        .with_asker(Arc::new(CliAsker) as Arc<dyn UserAsker>);
    if let Some(executor) = wasm_executor {
        base_ctx = base_ctx.with_sandbox(sandbox_policy, executor);
    }

    let preauthorize = PreauthorizeFlags {
        allow_dirs: cli.allow_dir,
        allow_files: cli.allow_file,
        allow_shell: cli.allow_shell,
        allow_network: cli.allow_network,
    };
    let mut rule_evaluator = PermissionRuleEvaluator::with_rules(authorizer::config_rules(&config.permissions));
    for rule in authorizer::preauthorize_rules(&preauthorize) {
        rule_evaluator.add_rule(rule);
    }
    let permission_gate = Arc::new(PermissionGate::new(rule_evaluator, Box::new(CliAuthorizer)));

    let secrets_path = cli
        .secrets_file
        .unwrap_or_else(|| secrets::default_secrets_path(loader.config_dir()));
    let api_key = match cli.api_key.or_else(|| std::env::var("JOURNEYMAN_API_KEY").ok()) {
        Some(key) => Some(key),
        None => secrets::open_secrets(&secrets_path)
            .context("unlocking provider secrets file")?
            .and_then(|store| store.get("default").map(str::to_owned)),
    };
    let model: Arc<dyn Model> = match api_key {
        Some(key) => {
            let mut provider = OpenAiCompatibleModel::new(config.models.main.clone(), key);
            if let Some(base_url) = cli.base_url {
                provider = provider.with_base_url(base_url);
            }
            Arc::new(provider)
        }
        None => {
            eprintln!("warning: no model credentials (--api-key, JOURNEYMAN_API_KEY, or secrets file); running against a mock model");
            Arc::new(MockModel::always_text(
                config.models.main.clone(),
                "no model configured: pass --api-key or set JOURNEYMAN_API_KEY",
            ))
        }
    };

    let error_judge = ErrorJudge::new(config.error_judge.max_retries);

    let cancel_token = CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        });
    }

    let orchestrator_config = OrchestratorConfig {
        max_turns: cli.max_turns.or(OrchestratorConfig::default().max_turns),
        max_retry_attempts: config.error_judge.max_retries,
        verification_enabled: cli.verify,
        ..OrchestratorConfig::default()
    };

    let mut orchestrator = Orchestrator::new(
        model,
        registry,
        session_store,
        base_ctx,
        permission_gate,
        error_judge,
        event_tx,
        cancel_token,
        cwd,
        cli.context_window,
    )
    .with_config(orchestrator_config);

    let outcome = orchestrator.run_turn(&prompt).await?;
    drop(orchestrator);
    let _ = printer.await;
    println!();

    Ok(match outcome {
        TurnOutcome::Completed { verification, .. } => {
            if let Some(verification) = verification {
                eprintln!("[verification] {verification}");
            }
            0
        }
        TurnOutcome::ReportDenied { reasons } => {
            eprintln!("all tool calls denied: {}", reasons.join("; "));
            1
        }
        TurnOutcome::MaxTurnsReached { turns, .. } => {
            eprintln!("max turns ({turns}) reached without a final response");
            1
        }
        TurnOutcome::Failed { reason, .. } => {
            eprintln!("turn failed: {reason}");
            1
        }
        TurnOutcome::Cancelled { .. } => {
            eprintln!("cancelled");
            1
        }
    })
}

fn print_event(event: &LoopEvent) {
    match event {
        LoopEvent::AssistantTextDelta { text } => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        LoopEvent::ToolCallStarted { tool_name, .. } => eprintln!("\n-> {tool_name}"),
        LoopEvent::ToolCallFinished { is_error: true, .. } => eprintln!("   failed"),
        LoopEvent::ToolCallFinished { is_error: false, .. } => {}
        LoopEvent::Compacting => eprintln!("\n[compacting conversation history]"),
        LoopEvent::Verifying => eprintln!("\n[running verification pass]"),
        LoopEvent::Error { message } => eprintln!("\n[retrying after error] {message}"),
        LoopEvent::TurnStarted { .. } | LoopEvent::TurnFinished { .. } => {}
        LoopEvent::ApprovalRequested { .. } | LoopEvent::QuestionAsked { .. } => {}
    }
}
