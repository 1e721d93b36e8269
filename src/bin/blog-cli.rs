use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};

use blogtraffic::auth::{now_millis, sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};

#[derive(Parser)]
#[command(name = "blog-cli")]
#[command(about = "Management CLI for the blogtraffic API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "BLOGTRAFFIC_URL", default_value = "http://localhost:3000")]
    url: String,

    /// HMAC secret used to sign writes
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret: Option<String>,

    /// Bearer token sent with writes
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all blogs, newest first
    List,
    /// Fetch one blog by id or slug
    Get {
        #[arg(long, conflicts_with = "slug", required_unless_present = "slug")]
        blog_id: Option<String>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Create a blog from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Update a blog from a JSON file holding the changed fields
    Update {
        #[arg(short, long)]
        file: PathBuf,
        /// Target id; defaults to the file's blogId
        #[arg(long)]
        blog_id: Option<String>,
    },
    /// Delete a blog
    Delete {
        #[arg(long)]
        blog_id: String,
    },
    /// Aggregate keyword suggestions
    Suggest {
        #[arg(short, long)]
        keyword: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        market: Option<String>,
    },
}

/// Credentials for signed requests.
struct Signer {
    secret: String,
    token: String,
}

impl Signer {
    fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        match (&cli.secret, &cli.token) {
            (Some(secret), Some(token)) => Ok(Self {
                secret: secret.clone(),
                token: token.clone(),
            }),
            _ => Err("signed commands need --secret and --token (or SECRET_KEY / API_TOKEN)".into()),
        }
    }

    /// Headers authenticating exactly `body`.
    fn headers(&self, body: &[u8]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
        let timestamp = now_millis();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))?,
        );
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign(self.secret.as_bytes(), body, timestamp))?,
        );
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(&timestamp.to_string())?);
        Ok(headers)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match &cli.command {
        Commands::List => {
            let res = client.get(format!("{base}/api/blogs")).send().await?;
            print_response(res).await?;
        }
        Commands::Get { blog_id, slug } => {
            let query = match (blog_id, slug) {
                (Some(id), _) => [("blogId", id.as_str())],
                (None, Some(slug)) => [("slug", slug.as_str())],
                (None, None) => return Err("either --blog-id or --slug is required".into()),
            };
            let res = client
                .get(format!("{base}/api/blogs"))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Create { file } => {
            let body = std::fs::read(file)?;
            let signer = Signer::from_cli(&cli)?;
            let res = client
                .post(format!("{base}/api/blogs"))
                .headers(signer.headers(&body)?)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Update { file, blog_id } => {
            let body = std::fs::read(file)?;
            let signer = Signer::from_cli(&cli)?;
            let url = match blog_id {
                Some(id) => format!("{base}/api/blogs/{id}/update"),
                None => format!("{base}/api/blogs"),
            };
            let res = client
                .request(Method::PATCH, url)
                .headers(signer.headers(&body)?)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { blog_id } => {
            let body = serde_json::to_vec(&json!({ "blogId": blog_id }))?;
            let signer = Signer::from_cli(&cli)?;
            let res = client
                .delete(format!("{base}/api/blogs"))
                .headers(signer.headers(&body)?)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Suggest {
            keyword,
            country,
            market,
        } => {
            let mut query = vec![("keyword", keyword.as_str())];
            if let Some(country) = country {
                query.push(("country", country.as_str()));
            }
            if let Some(market) = market {
                query.push(("market", market.as_str()));
            }
            let res = client
                .get(format!("{base}/api/domain"))
                .query(&query)
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
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
