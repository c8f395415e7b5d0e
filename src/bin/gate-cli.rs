use clap::{Parser, Subcommand};
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Command-line client for the access gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the issued token
    Login { username: String, password: String },
    /// Register a new user
    Register { username: String, password: String },
    /// Fetch the protected resource
    Secure {
        username: String,
        #[arg(short, long)]
        token: String,
    },
    /// Fetch the public resource
    Public,
    /// Check gate liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Login { username, password } => {
            client
                .post(format!("{}/login", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::Register { username, password } => {
            client
                .post(format!("{}/register", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::Secure { username, token } => {
            client
                .get(format!("{}/secure-data", cli.url))
                .query(&[("username", username)])
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .send()
                .await?
        }
        Commands::Public => client.get(format!("{}/public-data", cli.url)).send().await?,
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", body);
    } else {
        eprintln!("Error: gate returned status {}", status);
        eprintln!("{}", body);
    }
    Ok(())
}
