use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "planner-cli")]
#[command(about = "Command-line client for the route planner", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve stops and optimize a trip
    Plan {
        /// Free-text origin, e.g. a ZIP code
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        start_query: Option<String>,

        /// Origin latitude (with --lon)
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Origin longitude (with --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Stop as id=query, repeatable
        #[arg(long = "stop", value_parser = parse_stop, required = true)]
        stops: Vec<(String, String)>,

        /// Stop id to end the trip at
        #[arg(long)]
        destination: Option<String>,

        /// Only return distances and a suggested destination
        #[arg(long)]
        preview: bool,
    },
    /// Check service health
    Health,
}

fn parse_stop(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, query)) if !id.trim().is_empty() && !query.trim().is_empty() => {
            Ok((id.trim().to_string(), query.trim().to_string()))
        }
        _ => Err(format!("expected id=query, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Plan {
            start_query,
            lat,
            lon,
            stops,
            destination,
            preview,
        } => {
            let mut body = json!({
                "previewOnly": preview,
                "stops": stops
                    .iter()
                    .map(|(id, query)| json!({ "id": id, "query": query }))
                    .collect::<Vec<_>>(),
            });
            if let (Some(lat), Some(lon)) = (lat, lon) {
                body["startCoords"] = json!({ "lat": lat, "lon": lon });
            }
            if let Some(query) = start_query {
                body["startQuery"] = json!(query);
            }
            if let Some(destination) = destination {
                body["destinationId"] = json!(destination);
            }

            let res = client
                .post(format!("{}/api/optimize", base))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: planner returned status {}", status);
        if let Ok(text) = res.text().await {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => {
                    if let Some(note) = body.get("note").and_then(Value::as_str) {
                        eprintln!("{}", note);
                    }
                }
                Err(_) => eprintln!("Response: {}", text),
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
