//! Typed configuration loaded once from the process environment (spec §4.1).
//!
//! Parsing goes through `clap`'s env-derive support rather than hand-rolled
//! `std::env::var` calls, the way the rest of this workspace's command-line
//! surfaces read tunables — see `Config::from_env` for why it is parsed via
//! `clap::Parser::try_parse_from` instead of the real process argv.

use clap::Parser;
use reelscout_core::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Whether to attempt transcript fetches for hydrated reels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum TranscriptPolicy {
    /// Always fetch transcripts for requested URLs.
    Always,
    /// Fetch only for URLs whose caption keyword match-rate is low.
    Smart,
    /// Never fetch transcripts.
    Never,
}

impl Default for TranscriptPolicy {
    fn default() -> Self {
        Self::Smart
    }
}

/// Typed, validated configuration for one agent run.
///
/// Parsed once via `Config::from_env`; every field here corresponds to an
/// entry in spec §4.1's option table or an ambient credential/path the table
/// intentionally omits (it only lists *tunables*).
#[derive(Debug, Clone, Parser)]
#[command(name = "reelscout-config", no_binary_name = true)]
pub struct Config {
    /// Model identifier for the LLM endpoint.
    #[arg(long, env = "MODEL", default_value = "gpt-4o")]
    pub model: String,

    /// Target size of the final returned set.
    #[arg(long, env = "MAX_RESULTS", default_value_t = 30)]
    pub max_results: usize,

    /// Max concurrent provider calls per batch.
    #[arg(long, env = "PARALLEL", default_value_t = 16)]
    pub parallel: usize,

    /// Tool-level retry count on transient failure.
    #[arg(long, env = "RETRY", default_value_t = 3)]
    pub retry: u32,

    /// Per-request HTTP timeout, in milliseconds.
    #[arg(long, env = "TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Organic results requested per search query.
    #[arg(long, env = "SERPER_NUM", default_value_t = 10)]
    pub serper_num: u32,

    /// Ranking hint: geography. Ranking only, not a filter.
    #[arg(long, env = "SERPER_GL", default_value = "us")]
    pub serper_gl: String,

    /// Ranking hint: language. Ranking only, not a filter.
    #[arg(long, env = "SERPER_HL", default_value = "en")]
    pub serper_hl: String,

    /// Ranking hint: location string. Ranking only, not a filter.
    #[arg(long, env = "SERPER_LOCATION", default_value = "United States")]
    pub serper_location: String,

    /// Transcript fetch policy.
    #[arg(long, env = "TRANSCRIPTS", default_value = "smart")]
    pub transcripts: TranscriptPolicy,

    /// Max accepted reels per owner handle.
    #[arg(long, env = "PER_CREATOR_CAP", default_value_t = 2)]
    pub per_creator_cap: usize,

    /// Hard ceiling for agent loop turns.
    #[arg(long, env = "MAX_ITERATIONS", default_value_t = 10)]
    pub max_iterations: u32,

    /// Transcript truncation length for any LLM-visible sample.
    #[arg(long, env = "MAX_TRANSCRIPT_CHARS", default_value_t = 500)]
    pub max_transcript_chars: usize,

    /// LLM API credential (OpenAI or equivalent). Required.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Serper.dev API credential. Required.
    #[arg(long, env = "SERPER_API_KEY")]
    pub serper_api_key: Option<String>,

    /// Shared Instagram post/transcript/profile provider credential. Required.
    #[arg(long, env = "SC_API_KEY")]
    pub sc_api_key: Option<String>,

    /// Root directory for session/master row logs.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Root directory for structured run logs.
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `clap::Parser::try_parse_from` is used with an empty argv (via
    /// `no_binary_name`) rather than the real `std::env::args()` — this
    /// crate's options are never positional CLI flags (the CLI's only
    /// positional argument is the search keyword, parsed separately), they
    /// are environment-only. Routing them through `clap` still buys us its
    /// typed parsing, `ValueEnum` validation and default-value handling
    /// instead of hand-rolled `std::env::var` + `parse()` calls.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config = Self::try_parse_from(std::iter::empty::<String>())
            .map_err(|e| Error::config_error(format!("invalid configuration: {e}")))?;

        config.validate_credentials()?;
        Ok(config)
    }

    fn validate_credentials(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.serper_api_key.is_none() {
            missing.push("SERPER_API_KEY");
        }
        if self.sc_api_key.is_none() {
            missing.push("SC_API_KEY");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::config_error(format!(
                "missing required credentials: {}",
                missing.join(", ")
            )))
        }
    }

    /// Per-request HTTP timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        for (k, v) in vars {
            std::env::set_var(k, v);
        }
        f();
        for (k, _) in vars {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        with_env(
            &[
                ("OPENAI_API_KEY", "sk-test"),
                ("SERPER_API_KEY", "serper-test"),
                ("SC_API_KEY", "sc-test"),
            ],
            || {
                let cfg = Config::from_env().expect("config should load");
                assert_eq!(cfg.model, "gpt-4o");
                assert_eq!(cfg.max_results, 30);
                assert_eq!(cfg.per_creator_cap, 2);
                assert_eq!(cfg.transcripts, TranscriptPolicy::Smart);
            },
        );
    }

    #[test]
    fn missing_credentials_is_config_error() {
        for key in ["OPENAI_API_KEY", "SERPER_API_KEY", "SC_API_KEY"] {
            std::env::remove_var(key);
        }
        let err = Config::from_env().expect_err("should fail without credentials");
        assert_eq!(err.kind(), reelscout_core::ErrorKind::Config);
    }
}
