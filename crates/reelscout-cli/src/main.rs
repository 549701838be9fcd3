//! Entrypoint (spec §6): wires configuration, provider adapters, the tool
//! router and the agent loop into one CLI run, then merges the session into
//! the cross-session master table and exits with the outcome's status code.

mod logging;
mod slug;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use reelscout_agent::{build_system_prompt, AgentLoopConfig, OpenAiClient};
use reelscout_config::Config;
use reelscout_core::model::Reel;
use reelscout_postprocess::PostProcessConfig;
use reelscout_providers::{PostAdapter, ProfileAdapter, SearchAdapter, SearchConfig, TranscriptAdapter};
use reelscout_store::{analyze, merge_into_master, SessionLog, SessionMetadata};
use reelscout_tools::{FinalizeTool, PostTool, ProfileTool, SearchTool, ToolRouter, TranscriptTool};
use std::sync::Arc;
use tokio::sync::Mutex;

/// These default endpoints are not published anywhere in this workspace's
/// configuration surface: every provider is treated as a black box at the
/// wire level (spec §4.3), so the URLs below are plausible defaults for the
/// named services rather than values the spec pins down. Override via the
/// `*_ENDPOINT` environment variables in a `.env` file if a deployment needs
/// different hosts.
const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const SC_POST_ENDPOINT: &str = "https://api.scrapecreators.com/v1/instagram/post";
const SC_TRANSCRIPT_ENDPOINT: &str = "https://api.scrapecreators.com/v1/instagram/media/transcript";
const SC_PROFILE_ENDPOINT: &str = "https://api.scrapecreators.com/v1/instagram/profile";

/// Finds US-based Instagram Reels relevant to a keyword.
#[derive(Debug, Parser)]
#[command(name = "reelscout", version)]
struct Cli {
    /// Search keyword. Multiple words are joined with a single space.
    #[arg(required = true)]
    keyword: Vec<String>,
}

fn exit_with(code: i32) -> ! {
    std::process::exit(code);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let keyword = cli.keyword.join(" ");

    match run(keyword).await {
        Ok(code) => exit_with(code),
        Err(err) => {
            eprintln!("reelscout: {err:#}");
            exit_with(exit_code_for(&err));
        }
    }
}

/// Maps a top-level failure to spec §6's exit code table. Configuration
/// failures (missing credentials, bad env values) come back from
/// `Config::from_env` wrapped by `anyhow`; everything else that reaches here
/// unwrapped from a `reelscout_core::Error` carries its own `exit_code()`.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(core_err) = err.downcast_ref::<reelscout_core::Error>() {
        return core_err.kind().exit_code();
    }
    71
}

async fn run(keyword: String) -> Result<i32> {
    let config = Config::from_env().context("loading configuration")?;

    let started_at = Utc::now();
    let session_id = format!("{}_{}", slug::slug(&keyword), started_at.format("%Y%m%dT%H%M%SZ"));

    let log_guard = logging::init(&config.log_dir, &session_id).context("initializing logging")?;

    tracing::info!(event = "run_start", session_id = %session_id, keyword = %keyword);

    let openai_api_key = config
        .openai_api_key
        .clone()
        .context("OPENAI_API_KEY must be set")?;
    let serper_api_key = config
        .serper_api_key
        .clone()
        .context("SERPER_API_KEY must be set")?;
    let sc_api_key = config.sc_api_key.clone().context("SC_API_KEY must be set")?;

    let search_adapter = Arc::new(
        SearchAdapter::new(
            SERPER_ENDPOINT,
            SearchConfig {
                api_key: serper_api_key,
                num: config.serper_num,
                gl: config.serper_gl.clone(),
                hl: config.serper_hl.clone(),
                location: config.serper_location.clone(),
            },
            config.timeout(),
            config.parallel,
        )
        .context("constructing search adapter")?,
    );
    let post_adapter = Arc::new(
        PostAdapter::new(SC_POST_ENDPOINT, sc_api_key.clone(), config.timeout(), config.parallel)
            .context("constructing post adapter")?,
    );
    let transcript_adapter = Arc::new(
        TranscriptAdapter::new(
            SC_TRANSCRIPT_ENDPOINT,
            sc_api_key.clone(),
            config.timeout(),
            config.parallel,
        )
        .context("constructing transcript adapter")?,
    );
    let profile_adapter = Arc::new(
        ProfileAdapter::new(SC_PROFILE_ENDPOINT, sc_api_key, config.timeout(), config.parallel)
            .context("constructing profile adapter")?,
    );

    let session_dir = config.data_dir.join("sessions").join(&session_id);
    let metadata = SessionMetadata {
        keyword: keyword.clone(),
        started_at,
        config_snapshot: serde_json::json!({
            "model": config.model,
            "max_results": config.max_results,
            "parallel": config.parallel,
            "retry": config.retry,
            "timeout_ms": config.timeout_ms,
            "transcripts": format!("{:?}", config.transcripts),
            "per_creator_cap": config.per_creator_cap,
            "max_iterations": config.max_iterations,
            "max_transcript_chars": config.max_transcript_chars,
        }),
    };
    let session = Arc::new(Mutex::new(
        SessionLog::create(&session_dir, &metadata).context("creating session log")?,
    ));

    let router = Arc::new(ToolRouter::new(vec![
        Box::new(SearchTool::new(search_adapter, Arc::clone(&session), keyword.clone())),
        Box::new(PostTool::new(post_adapter, Arc::clone(&session), keyword.clone())),
        Box::new(TranscriptTool::new(
            transcript_adapter,
            Arc::clone(&session),
            keyword.clone(),
            config.transcripts,
            config.max_transcript_chars,
        )),
        Box::new(ProfileTool::new(profile_adapter, Arc::clone(&session), keyword.clone())),
        Box::new(FinalizeTool::new(
            Arc::clone(&session),
            keyword.clone(),
            PostProcessConfig {
                allow_unknown_us: false,
                per_creator_cap: config.per_creator_cap,
                max_results: config.max_results,
                shuffle_seed: reelscout_postprocess::seed_from_session_id(&session_id),
            },
        )),
    ]));

    let llm = Arc::new(OpenAiClient::new(openai_api_key, config.model.clone()));
    let system_prompt = build_system_prompt(&keyword, config.max_results);
    let opening_message = format!("Find US-based Instagram Reels relevant to: \"{keyword}\".");

    let outcome = reelscout_agent::run(
        llm,
        router,
        system_prompt,
        opening_message,
        AgentLoopConfig {
            max_iterations: config.max_iterations,
            parallel: config.parallel,
            retry: config.retry,
        },
    )
    .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            reelscout_core::log_event::error(None, &err.to_string());
            return Err(err.into());
        }
    };

    let rows: Vec<Reel> = {
        let session = session.lock().await;
        session.rows()
    };
    let stats = analyze(&rows);

    reelscout_core::log_event::final_summary(
        stats.accepted_count,
        rows.len().saturating_sub(stats.accepted_count),
        outcome.iterations,
    );

    let master_path = config.data_dir.join("master.csv");
    let merged = tokio::task::spawn_blocking(move || merge_into_master(&master_path, &rows))
        .await
        .context("master merge task panicked")?
        .context("merging session into master")?;

    println!(
        "{keyword}: {} accepted of {} total rows ({merged} merged into master, {:?} after {} iteration(s))",
        stats.accepted_count,
        stats.total_rows,
        outcome.stop_reason,
        outcome.iterations
    );

    drop(log_guard);

    Ok(if stats.accepted_count > 0 { 0 } else { 2 })
}
