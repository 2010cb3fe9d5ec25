//! Entry point for the jarvys monitor TUI. Parses args and runs the App.

use jarvys_monitor::app::App;
use std::env;

const DEFAULT_URL: &str = "ws://127.0.0.1:8000/ws";

struct ParsedArgs {
    url: Option<String>,
    token: Option<String>,
    once: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "jarvys_monitor".into());
    let mut url: Option<String> = None;
    let mut token: Option<String> = None;
    let mut once = false;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!(
                    "Usage: {prog} [--token TOKEN|-T TOKEN] [--once] [ws://HOST:PORT/ws]"
                ));
            }
            "--token" | "-T" => {
                token = it.next();
            }
            "--once" => {
                once = true;
            }
            _ if arg.starts_with("--token=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        token = Some(v.to_string());
                    }
                }
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!(
                        "Unexpected argument. Usage: {prog} [--token TOKEN|-T TOKEN] [--once] [ws://HOST:PORT/ws]"
                    ));
                }
            }
        }
    }
    Ok(ParsedArgs { url, token, once })
}

/// Maps the websocket URL to the poll endpoint it implies.
fn status_url(ws_url: &str) -> String {
    let http = ws_url
        .replacen("wss://", "https://", 1)
        .replacen("ws://", "http://", 1);
    format!("{}/status", http.trim_end_matches("/ws").trim_end_matches('/'))
}

/// One-shot mode for scripting: fetch a snapshot over HTTP, print it, exit.
async fn fetch_once(ws_url: &str, token: Option<&str>) -> anyhow::Result<()> {
    let mut req = reqwest::Client::new().get(status_url(ws_url));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await?;
    if !resp.status().is_success() {
        anyhow::bail!("interface returned {}", resp.status());
    }
    let snapshot: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reuse the same parsing logic for testability
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let url = parsed.url.unwrap_or_else(|| {
        env::var("JARVYS_WS").unwrap_or_else(|_| DEFAULT_URL.to_string())
    });
    let token = parsed
        .token
        .or_else(|| env::var("JARVYS_DASH_TOKEN").ok().filter(|t| !t.is_empty()));

    if parsed.once {
        return fetch_once(&url, token.as_deref()).await;
    }

    let mut app = App::new();
    app.run(&url, token.as_deref()).await
}
