//! ledger-rpc - Command-line client for the ledger JSON-RPC daemon

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:5005";

#[derive(Parser)]
#[command(name = "ledger-rpc")]
#[command(about = "Ledger JSON-RPC client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "LEDGER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Print the raw JSON reply
    #[arg(long)]
    raw: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Call any command
    Call {
        /// Command name, e.g. account_info
        method: String,

        /// Parameter object as JSON
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Check that the server answers
    Ping,

    /// Show server state
    ServerInfo,

    /// Show a ledger header
    #[command(group(ArgGroup::new("selector").args(["index", "name"])))]
    Ledger {
        /// Ledger sequence
        #[arg(long)]
        index: Option<u32>,

        /// current, closed or validated
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    method: &'a str,
    params: [Value; 1],
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(default)]
    data: Vec<String>,
}

fn parse_reply(status: u16, body: &str) -> Result<Value> {
    let response: JsonRpcResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        // 400, 403 and 503 carry plain text
        Err(_) => anyhow::bail!("HTTP {}: {}", status, body.trim()),
    };

    if let Some(error) = response.error {
        let mut message = format!("RPC error ({}): {}", error.code, error.message);
        if !error.data.is_empty() {
            message.push_str(&format!(" [{}]", error.data.join(", ")));
        }
        anyhow::bail!(message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        method,
        params: [params],
        id: 1,
    };

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?;
    let status = response.status().as_u16();
    let body = response.text().await.context("Failed to read response")?;
    parse_reply(status, &body)
}

fn ledger_params(index: Option<u32>, name: Option<String>) -> Value {
    match (index, name) {
        (Some(index), _) => json!({"ledger": {"index": index}}),
        (None, Some(name)) => json!({"ledger": {"name": name}}),
        (None, None) => json!({}),
    }
}

fn print_pretty(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (method, params) = match cli.command {
        Commands::Call { method, params } => {
            let params: Value = serde_json::from_str(&params).context("Invalid JSON params")?;
            (method, params)
        }
        Commands::Ping => ("ping".to_string(), json!({})),
        Commands::ServerInfo => ("server_info".to_string(), json!({})),
        Commands::Ledger { index, name } => ("ledger".to_string(), ledger_params(index, name)),
    };

    let result = match call_rpc(&cli.rpc_url, &method, params).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
            std::process::exit(1);
        }
    };

    if cli.raw {
        println!("{}", result);
        return Ok(());
    }

    match method.as_str() {
        "ping" => println!("{}", "✓ Server is up".green().bold()),
        "server_info" => {
            let info = &result["info"];
            println!("{}", "Server Info".cyan().bold());
            println!("  {} {}", "Version:".bold(), info["build_version"]);
            println!("  {} {}", "State:".bold(), info["server_state"]);
            println!("  {} {} seconds", "Uptime:".bold(), info["uptime"]);
            println!("  {} {}", "Ledgers:".bold(), info["complete_ledgers"]);
        }
        "ledger" => {
            let ledger = &result["ledger"];
            println!("{} {}", "Ledger".cyan().bold(), ledger["ledger_index"]);
            println!("  {} {}", "Hash:".bold(), ledger["ledger_hash"]);
            println!("  {} {}", "Parent:".bold(), ledger["parent_hash"]);
            println!("  {} {}", "Closed:".bold(), ledger["closed"]);
            println!("  {} {}", "Validated:".bold(), ledger["validated"]);
        }
        _ => print_pretty(&result)?,
    }

    Ok(())
}
