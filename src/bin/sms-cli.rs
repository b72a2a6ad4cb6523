use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "sms-cli")]
#[command(about = "Operator CLI for the SMS failover gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Admin key sent as a Bearer token
    #[arg(short, long, env = "ADMIN_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall health and per-provider breakers
    Health,
    /// Show circuit breaker status
    Status,
    /// Force every circuit breaker closed
    Reset,
    /// Send a message through the gateway
    Send {
        recipient: String,
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Status => {
            client
                .get(format!("{base}/circuit-breaker-status"))
                .send()
                .await?
        }
        Commands::Reset => {
            client
                .post(format!("{base}/circuit-breaker/reset"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Send { recipient, message } => {
            client
                .post(format!("{base}/sms/send"))
                .json(&json!({ "recipient": recipient, "message": message }))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{rendered}");
        Ok(())
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{rendered}");
        std::process::exit(1);
    }
}
