//! WoundSight - wound analysis client CLI
//!
//! Command-line front end for the analysis workflow, backend health
//! probes, and cache inspection.

#![allow(missing_docs)]

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use woundsight_core::core::analysis::PlanSource;
use woundsight_core::utils::format_bytes;
use woundsight_core::{AnalysisRequest, Config, ProgressReporter, WoundsightClient};

#[derive(Parser)]
#[command(name = "woundsight", version, about = "Wound analysis client")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = "WOUNDSIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a wound photo
    Analyze {
        /// Path to the image file
        image: PathBuf,
        /// Two-letter US state used for doctor recommendations
        #[arg(short, long)]
        location: Option<String>,
        /// Skip the treatment plan lookup
        #[arg(long)]
        skip_treatment_plan: bool,
        /// Skip the doctor recommendation lookup
        #[arg(long)]
        skip_recommendations: bool,
    },
    /// Probe the analysis backend health endpoints
    Health,
    /// Show cache statistics
    CacheStats,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    woundsight_core::utils::logging::init(&config.logging);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let client = WoundsightClient::new(config).await?;

    let outcome = match command {
        Command::Analyze {
            image,
            location,
            skip_treatment_plan,
            skip_recommendations,
        } => {
            analyze(
                &client,
                image,
                location,
                skip_treatment_plan,
                skip_recommendations,
            )
            .await
        }
        Command::Health => health(&client).await,
        Command::CacheStats => cache_stats(&client),
    };

    client.shutdown().await;
    outcome
}

async fn analyze(
    client: &WoundsightClient,
    image: PathBuf,
    location: Option<String>,
    skip_treatment_plan: bool,
    skip_recommendations: bool,
) -> anyhow::Result<()> {
    let data = tokio::fs::read(&image)
        .await
        .with_context(|| format!("could not read image {}", image.display()))?;

    let mut request = AnalysisRequest::new(data)
        .with_treatment_plan(!skip_treatment_plan)
        .with_doctor_recommendations(!skip_recommendations);
    if let Some(location) = location {
        request = request.with_location(location);
    }

    let progress = ProgressReporter::new(|stage, percent| {
        println!("[{:>3}%] {}", percent, stage.as_str());
    });
    let result = client.analysis().analyze(request, &progress).await?;

    println!();
    println!("Condition:  {}", result.condition);
    println!("Severity:   {}", result.severity.as_str());
    println!("Infected:   {}", if result.is_infected { "yes" } else { "no" });
    println!("Area:       {:.1} cm²", result.wound_area_cm2);
    println!("Confidence: {:.0}%", result.confidence * 100.0);
    if !result.description.is_empty() {
        println!();
        println!("{}", result.description);
    }

    if let Some(plan) = &result.treatment_plan {
        println!();
        if matches!(plan.source, PlanSource::Fallback) {
            println!("Treatment plan (general guidance):");
        } else {
            println!("Treatment plan:");
        }
        if !plan.summary.is_empty() {
            println!("  {}", plan.summary);
        }
        for (i, step) in plan.steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
        for warning in &plan.warnings {
            println!("  ! {}", warning);
        }
    }

    if !result.doctor_recommendations.is_empty() {
        println!();
        println!("Doctors:");
        for doctor in &result.doctor_recommendations {
            println!("  {} ({}) {}", doctor.name, doctor.specialty, doctor.phone);
        }
    }

    Ok(())
}

async fn health(client: &WoundsightClient) -> anyhow::Result<()> {
    let report = client.health().force_check().await;
    println!("Status:   {:?}", report.status);
    if let Some(endpoint) = &report.endpoint {
        println!("Endpoint: {}", endpoint);
        println!("Latency:  {}ms", report.response_time_ms);
    }
    if let Some(error) = &report.error {
        println!("Error:    {}", error);
    }
    Ok(())
}

fn cache_stats(client: &WoundsightClient) -> anyhow::Result<()> {
    let stats = client.cache().stats();
    println!("Entries:   {}", stats.entries);
    println!("Memory:    {}", format_bytes(stats.memory_bytes as u64));
    println!("Hits:      {}", stats.hits);
    println!("Misses:    {}", stats.misses);
    println!("Hit rate:  {:.1}%", stats.hit_rate() * 100.0);
    println!("Evictions: {}", stats.evictions);
    println!("Expired:   {}", stats.expired);
    Ok(())
}
