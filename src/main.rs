use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Instrument};

use job_insights::app::RunAnalysisUseCase;
use job_insights::config::AppConfig;
use job_insights::error::AnalyticsError;
use job_insights::infra::{PostingTable, SqliteStore};
use job_insights::logging;
use job_insights::observability::{self, get_metrics_handle};
use job_insights::pipeline::ingestion::read_postings;
use job_insights::pipeline::{AnalysisContext, AnalysisRegistry};

#[derive(Parser)]
#[command(name = "job_insights")]
#[command(about = "Job posting normalization and market analytics")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the posting tables
    Init,
    /// Import postings from a JSON array or JSON-lines file
    Import {
        file: PathBuf,
        /// Write to the open-postings table instead of the complete history
        #[arg(long)]
        latest: bool,
    },
    /// List the available analyses and their stored results
    List,
    /// Run one analysis, or all of them in order
    Run {
        #[arg(long)]
        analysis: Option<String>,
        /// Reference date for trend windows (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Write one JSON file per stored analysis table
    Export { dir: PathBuf },
}

fn parse_as_of(value: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AnalyticsError::InvalidDate(value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging.directory);
    observability::init().context("Failed to initialize metrics")?;

    let store = Arc::new(
        SqliteStore::open(&config.database.path, config.tables.clone())
            .with_context(|| format!("Failed to open database {}", config.database.path.display()))?,
    );
    let registry = AnalysisRegistry::builtin();

    match cli.command {
        Commands::Init => {
            println!("🗄️  Database ready at {}", config.database.path.display());
            println!("   Complete postings: {}", config.tables.complete);
            println!("   Open postings: {}", config.tables.latest);
        }
        Commands::Import { file, latest } => {
            let which = if latest { PostingTable::Latest } else { PostingTable::Complete };
            println!("📥 Importing postings from {}...", file.display());

            let postings = read_postings(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            if postings.is_empty() {
                warn!("No postings found in {}", file.display());
                println!("⚠️  No postings found");
            } else {
                let imported = store.import(&postings, which).await?;
                let total = store.count(which).await?;
                println!("✅ Imported {} postings ({} stored)", imported, total);
            }
        }
        Commands::List => {
            println!("📋 Available analyses:");
            for analysis in registry.iter() {
                let table = analysis.table();
                match store.result_count(table).await? {
                    Some(rows) => println!("   {:<32} {} ({} rows)", analysis.name(), table.table, rows),
                    None => println!("   {:<32} {} (not run)", analysis.name(), table.table),
                }
            }
        }
        Commands::Run { analysis, as_of } => {
            let ctx = match as_of {
                Some(value) => AnalysisContext::with_settings(parse_as_of(&value)?, &config.analysis),
                None => AnalysisContext::today(&config.analysis),
            };
            let use_case = RunAnalysisUseCase::new(store.clone(), store.clone(), store.clone())
                .with_related_limit(config.analysis.related_limit);

            match analysis {
                Some(name) => {
                    let analysis = registry.require(&name)?;
                    let span = tracing::info_span!("Running analysis", analysis = %name);

                    println!("🚀 Running {} (as of {})...", name, ctx.as_of);
                    match use_case.run(analysis, &ctx).instrument(span).await {
                        Ok(outcome) => println!("✅ {}: stored {} rows", outcome.name, outcome.stored),
                        Err(e) => {
                            println!("❌ {} failed: {}", name, e);
                            return Err(e.into());
                        }
                    }
                }
                None => {
                    println!("🚀 Running all {} analyses (as of {})...", registry.len(), ctx.as_of);
                    let reports = use_case.run_all(&registry, &ctx).await;
                    let failed = reports.iter().filter(|r| !r.succeeded()).count();

                    println!("\n📊 Analysis Results:");
                    for report in &reports {
                        match &report.result {
                            Ok(stored) => println!("   ✅ {:<32} {} rows", report.name, stored),
                            Err(message) => println!("   ❌ {:<32} {}", report.name, message),
                        }
                    }

                    if failed > 0 {
                        error!("{} of {} analyses failed", failed, reports.len());
                        println!("\n⚠️  {} of {} analyses failed", failed, reports.len());
                    } else {
                        info!("All analyses completed");
                        println!("\n✅ All analyses completed successfully");
                    }
                }
            }
        }
        Commands::Export { dir } => {
            println!("📤 Exporting results to {}...", dir.display());
            let tables: Vec<_> = registry.iter().map(|a| a.table()).collect();
            let exported = store
                .export_to_dir(tables, &dir)
                .await
                .with_context(|| format!("Failed to export to {}", dir.display()))?;

            for table in &exported {
                println!("   {} ({} rows) -> {}", table.table, table.rows, table.path.display());
            }
            println!("✅ Exported {} tables", exported.len());
        }
    }

    if cli.print_metrics {
        if let Some(rendered) = get_metrics_handle() {
            println!("\n{}", rendered);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_of_accepts_iso_dates_only() {
        assert_eq!(parse_as_of("2024-07-01").unwrap(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(matches!(parse_as_of("07/01/2024"), Err(AnalyticsError::InvalidDate(_))));
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::parse_from(["job_insights", "--config", "c.toml", "run", "--analysis", "top_paying_jobs"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(
            cli.command,
            Commands::Run { analysis: Some(ref name), as_of: None } if name == "top_paying_jobs"
        ));
    }
}
