//! Runtime configuration: environment variables plus a small argv scan.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Shared-secret bearer token. When set, every route except /health
    /// must present it.
    pub auth_token: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Embedding provider API root, overridable for self-hosted gateways.
    pub openai_base_url: String,
    /// Periodic snapshot publish interval, clamped to 5..=15 seconds.
    pub publish_interval: Duration,
    /// How long a cached snapshot satisfies a poll before recomputing.
    pub freshness_window: Duration,
    /// Upper bound for each external source call.
    pub source_timeout: Duration,
    /// Orchestrator log file tailed into the bounded ring.
    pub log_file: Option<PathBuf>,
    pub log_ring_capacity: usize,
    /// Process name scanned for by the status probe.
    pub orchestrator_process: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            supabase_url: None,
            supabase_key: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            publish_interval: Duration::from_secs(10),
            freshness_window: Duration::from_secs(5),
            source_timeout: Duration::from_secs(4),
            log_file: None,
            log_ring_capacity: 200,
            orchestrator_process: "grok_orchestrator".to_string(),
        }
    }
}

impl Config {
    pub fn load<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut cfg = Config::default();
        cfg.port = parse_port(args, env_port().unwrap_or(DEFAULT_PORT));
        cfg.auth_token = env_nonempty("JARVYS_DASH_TOKEN");
        cfg.supabase_url = env_nonempty("SUPABASE_URL");
        cfg.supabase_key = env_nonempty("SUPABASE_KEY");
        cfg.openai_api_key = env_nonempty("OPENAI_API_KEY");
        if let Some(base) = env_nonempty("OPENAI_BASE_URL") {
            cfg.openai_base_url = base;
        }
        if let Some(secs) = env_nonempty("JARVYS_PUBLISH_SECS").and_then(|v| v.parse::<u64>().ok())
        {
            cfg.publish_interval = Duration::from_secs(secs.clamp(5, 15));
        }
        cfg.log_file = env_nonempty("JARVYS_LOG_FILE").map(PathBuf::from);
        if let Some(name) = env_nonempty("JARVYS_ORCHESTRATOR_PROCESS") {
            cfg.orchestrator_process = name;
        }
        cfg
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_port() -> Option<u16> {
    env_nonempty("JARVYS_PORT").and_then(|v| v.parse().ok())
}

/// Accepts `--port N`, `-p N`, and `--port=N`; anything else falls through
/// to the default.
pub fn parse_port<I: IntoIterator<Item = String>>(args: I, default_port: u16) -> u16 {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    while let Some(a) = it.next() {
        match a.as_str() {
            "--port" => long = it.next(),
            "-p" => short = it.next(),
            _ if a.starts_with("--port=") => {
                if let Some((_, v)) = a.split_once('=') {
                    long = Some(v.to_string());
                }
            }
            _ => {}
        }
    }
    long.or(short)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(default_port)
}
