//! Abonar CLI - fertilizer recommendation server
//!
//! # Commands
//!
//! - `serve` - Load an artifact bundle and start the HTTP server
//! - `check` - Load and validate an artifact bundle, then exit
//! - `recommend` - One-shot recommendation from a JSON input row
//! - `info` - Show version info

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use abonar::api::{create_router, AppState, RecommendRequest};
use abonar::artifact::Artifacts;
use abonar::error::Result;
use abonar::features::RecommendInput;
use abonar::mapper::Domain;
use abonar::metrics::MetricsCollector;
use abonar::service::RecommendationService;
use clap::{Parser, Subcommand};

/// Abonar - fertilizer recommendation service
///
/// Serves a pre-trained tabular classifier over HTTP.
#[derive(Parser)]
#[command(name = "abonar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the recommendation HTTP server
    ///
    /// Examples:
    ///   abonar serve --artifacts ./artifacts
    ///   abonar serve --host 0.0.0.0 --port 8000
    Serve {
        /// Directory containing the four artifact files
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Host address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Load and validate an artifact bundle without serving
    ///
    /// Examples:
    ///   abonar check --artifacts ./artifacts
    Check {
        /// Directory containing the four artifact files
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Produce one recommendation from a JSON input row and exit
    ///
    /// Examples:
    ///   abonar recommend '{"Temparature":34,"Humidity":65,"Moisture":54,"Soil_Type_ID":2,"Crop_Type_ID":10,"Nitrogen":38,"Potassium":0,"Phosphorous":0}'
    Recommend {
        /// Input row as a JSON object with the trained column names
        #[arg(value_name = "INPUT")]
        input: String,

        /// Directory containing the four artifact files
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Show version information
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            artifacts,
            host,
            port,
        } => cmd_serve(&artifacts, &host, port).await,
        Commands::Check { artifacts } => cmd_check(&artifacts),
        Commands::Recommend { input, artifacts } => cmd_recommend(&input, &artifacts),
        Commands::Info => {
            cmd_info();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn cmd_serve(artifacts_dir: &Path, host: &str, port: u16) -> Result<()> {
    println!("Loading artifacts from {}...", artifacts_dir.display());
    let artifacts = Arc::new(Artifacts::load(artifacts_dir)?);
    println!(
        "Loaded bundle: {} features, {} fertilizer classes",
        artifacts.schema().len(),
        artifacts.mapper.entries(Domain::Fertilizer).len()
    );

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| abonar::AbonarError::InvalidConfiguration {
            reason: format!("invalid bind address {host}:{port}: {e}"),
        })?;

    let app = create_router(AppState::new(artifacts));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    println!("Abonar server listening on http://{local}");
    println!("Endpoints:");
    println!("  GET  /            - Service banner");
    println!("  GET  /health      - Health check");
    println!("  GET  /metrics     - Prometheus metrics");
    println!("  GET  /categories  - Valid soil and crop categories");
    println!("  POST /recommend   - Fertilizer recommendation");

    axum::serve(listener, app).await?;
    Ok(())
}

fn cmd_check(artifacts_dir: &Path) -> Result<()> {
    let artifacts = Artifacts::load(artifacts_dir)?;
    println!("Artifact bundle OK: {}", artifacts_dir.display());
    println!("  Features:    {}", artifacts.schema().len());
    println!(
        "  Soil types:  {}",
        artifacts.mapper.entries(Domain::Soil).len()
    );
    println!(
        "  Crop types:  {}",
        artifacts.mapper.entries(Domain::Crop).len()
    );
    println!(
        "  Fertilizers: {}",
        artifacts.mapper.entries(Domain::Fertilizer).len()
    );
    Ok(())
}

fn cmd_recommend(input_json: &str, artifacts_dir: &Path) -> Result<()> {
    let request: RecommendRequest =
        serde_json::from_str(input_json).map_err(|e| abonar::AbonarError::InvalidConfiguration {
            reason: format!("invalid input JSON: {e}"),
        })?;

    let artifacts = Arc::new(Artifacts::load(artifacts_dir)?);
    let service = RecommendationService::new(artifacts, Arc::new(MetricsCollector::new()));
    let recommendation = service.recommend(&RecommendInput::from(&request))?;

    println!(
        "{}",
        serde_json::json!({
            "recommended_fertilizer": recommendation.fertilizer,
            "class_code": recommendation.class_code,
        })
    );
    Ok(())
}

fn cmd_info() {
    println!("abonar {}", abonar::VERSION);
    println!("Fertilizer recommendation service");
    println!("Artifact files: model.json, scaler.json, columns.json, mappings.json");
}
