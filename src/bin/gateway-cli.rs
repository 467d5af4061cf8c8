use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the ShopSphere edge gateway", long_about = None)]
struct Cli {
    /// Base URL of a running gateway.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gateway liveness and uptime
    Status,
    /// Health snapshot of every registered service
    Services,
    /// Health of a single service by name
    Service { name: String },
    /// Trigger an immediate probe of all services
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/health/gateway", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Services => {
            let res = client
                .get(format!("{}/health/services", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Service { name } => {
            let res = client
                .get(format!("{}/health/services/{}", cli.url, name))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check => {
            let res = client
                .post(format!("{}/health/services/check", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
