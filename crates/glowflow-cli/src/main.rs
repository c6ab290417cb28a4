use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glowflow_core::{Advisor, BeautyProfile, ProductShade};
use glowflow_gateway::OpenAiGateway;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "glowflow", about = "GlowFlow face analysis and shade matching CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a face photo (JPEG, PNG or WebP)
    Analyze {
        /// Path to the image file
        image: PathBuf,
    },
    /// Pick the best product shade for a beauty profile
    Match {
        /// JSON file holding a beauty profile (as printed by `analyze`)
        #[arg(short, long)]
        profile: PathBuf,
        /// JSON file holding an array of products
        #[arg(long)]
        products: PathBuf,
    },
    /// Show the effective configuration
    Status,
    /// List built-in provider presets
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries JSON results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Analyze { image } => {
            let advisor = build_advisor(&config)?;
            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read image {}", image.display()))?;
            let profile = advisor.analyze_image(&bytes).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Match { profile, products } => {
            let advisor = build_advisor(&config)?;
            let profile = load_profile(&profile)?;
            let products = load_products(&products)?;
            let result = advisor.match_shade(&profile, &products).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Status => {
            let settings = config.gateway_settings();
            let api_key = if config.api_key.trim().is_empty() { "missing" } else { "set" };
            let allowed: Vec<&str> =
                config.allowed_image_types.iter().map(|m| m.as_str()).collect();
            let status = serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "provider": config.provider,
                "endpoint": settings.as_ref().map(|s| s.base_url.clone()).ok(),
                "model": settings.as_ref().map(|s| s.model.clone()).ok(),
                "api_key": api_key,
                "max_image_bytes": config.image_policy().max_bytes,
                "allowed_image_types": allowed,
                "temperature": config.temperature,
                "request_timeout_secs": config.request_timeout_secs,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
            if let Err(e) = settings {
                tracing::warn!(error = %e, "gateway is not usable with this configuration");
            }
        }
        Commands::Providers => {
            for preset in glowflow_gateway::list_presets() {
                println!(
                    "{:<12} {:<12} {} (default model: {})",
                    preset.provider.name,
                    preset.provider.display_name,
                    preset.api.base_url,
                    preset.api.default_model
                );
            }
        }
    }

    Ok(())
}

/// Build the gateway once and hand it to the advisor.
fn build_advisor(config: &Config) -> Result<Advisor> {
    let settings = config
        .gateway_settings()
        .context("invalid provider configuration")?;
    let gateway = OpenAiGateway::new(settings).context("failed to initialise model gateway")?;
    Ok(Advisor::new(Arc::new(gateway), config.image_policy()))
}

/// Profiles are repaired leniently, the same way model output is.
fn load_profile(path: &Path) -> Result<BeautyProfile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("profile {} is not valid JSON", path.display()))?;
    BeautyProfile::from_value(&value)
        .with_context(|| format!("profile {} must contain a JSON object", path.display()))
}

fn load_products(path: &Path) -> Result<Vec<ProductShade>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read products {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid products in {}", path.display()))
}
