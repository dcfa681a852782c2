use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::api::mcp::Dispatcher;
use crate::infra::config::{is_configured, Config};

#[derive(Parser)]
#[command(name = "aihehuo-mcp-admin")]
#[command(about = "Aihehuo MCP server - Admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check a server started with MODE=server
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status and configuration
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Run one tool locally against the configured upstream and print its result
    Call {
        /// Tool name, e.g. get_idea_details
        #[arg(short, long)]
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(warnings) => {
                for w in &warnings {
                    println!("⚠️  {}", w);
                }
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Call { tool, args } => match call_tool(&tool, &args).await {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Tool call failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

/// Hard errors for unusable settings; placeholders only produce warnings.
fn validate_config() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let config = Config::from_env_and_toml()?;

    if !matches!(config.mode.as_str(), "server" | "stdio") {
        return Err(format!("Invalid MODE: {}. Must be 'server' or 'stdio'", config.mode).into());
    }

    if config.mode == "server" && config.port == 0 {
        return Err("PORT cannot be 0".into());
    }

    reqwest::Url::parse(&config.api.base_url)
        .map_err(|e| format!("Invalid AIHEHUO_API_BASE {}: {}", config.api.base_url, e))?;

    let mut warnings = Vec::new();
    if !is_configured(&config.api.api_key) {
        warnings.push("AIHEHUO_API_KEY is not set; upstream calls will be unauthorized".to_string());
    }
    if !is_configured(&config.api.current_user_id) {
        warnings.push("CURRENT_USER_ID is not set; current-user tools will report a configuration error".to_string());
    }
    Ok(warnings)
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    // Health check
    let health_response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let tools_response = client
        .post(format!("{}/mcp", url))
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            let count = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["result"]["tools"].as_array().map(|t| t.len()))
                .unwrap_or(0);
            println!("🔧 Tools: ✅ {} available", count);
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    let config = Config::from_env();
    println!("\n📋 Configuration:");
    println!("  Mode: {}", config.mode);
    println!("  Port: {}", config.port);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
    println!("  API Base: {}", config.api.base_url);
    println!(
        "  Current User: {}",
        config.api.current_user().unwrap_or("Not configured")
    );

    Ok(())
}

async fn call_tool(tool: &str, args: &str) -> Result<String, Box<dyn std::error::Error>> {
    let args: serde_json::Value = serde_json::from_str(args)?;
    let dispatcher = Dispatcher::from_config(Config::from_env_and_toml()?)?;
    let out = dispatcher
        .call_tool_value(tool, &args)
        .await
        .ok_or_else(|| format!("Unknown tool: {}", tool))?;
    Ok(serde_json::to_string_pretty(&out)?)
}
