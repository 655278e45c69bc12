use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use realty_site::security::generate_csrf_token;

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the realty site backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer secret for the blog sync endpoints.
    #[arg(short, long, env = "REVALIDATE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show blog cache status
    Status,
    /// Force a blog refresh from upstream
    Refresh,
    /// Drop the cached blog posts
    Clear,
    /// List the posts currently served
    Posts,
    /// Print a freshly generated CSRF token
    Token,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(secret) = cli.secret.as_deref().filter(|s| !s.is_empty()) {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", secret))?,
        );
    }

    let sync_url = format!("{}/api/blog/sync", cli.url);
    let res = match cli.command {
        Commands::Status => client.get(&sync_url).send().await?,
        Commands::Refresh => client.post(&sync_url).headers(headers).send().await?,
        Commands::Clear => client.delete(&sync_url).headers(headers).send().await?,
        Commands::Posts => {
            client
                .get(format!("{}/api/blog/posts", cli.url))
                .send()
                .await?
        }
        Commands::Token => {
            println!("{}", generate_csrf_token());
            return Ok(());
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: site API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
