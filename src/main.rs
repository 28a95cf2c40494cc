use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tariff_series::config::AppConfig;
use tariff_series::export::write_all;
use tariff_series::loader::load_table;
use tariff_series::utils::{self, fmt_count, fmt_value};
use tariff_series::Pipeline;

#[derive(Parser)]
#[command(name = "tariff-series", about = "Wide tariff tables to grouped time series", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Transform a wide CSV and write the JSON structure plus CSV exports
    Run {
        /// Wide-format tariff table
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (default from config: output/)
        #[arg(short, long, env = "TARIFF_OUT_DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Show how each header was classified
    Columns {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print per-series statistics
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "tariff_series=info,warn",
        1 => "tariff_series=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let pipeline = Pipeline::new(config.clone());

    match cli.command {
        Command::Run { input, out_dir } => {
            let _t = utils::Timer::start("Tariff transform");
            let table = load_table(&input)?;
            let output = pipeline.run(&table)?;

            let dir = out_dir.unwrap_or_else(|| config.output.dir.clone());
            let paths = write_all(&output, &config.output, &dir)?;
            for p in &paths {
                info!("  → {:?}", p);
            }

            let meta = &output.structure.metadata;
            println!("─────────────────────────────────");
            println!("  Tariff series — Run summary");
            println!("─────────────────────────────────");
            println!("  Tariffs  : {}", fmt_count(meta.tariff_count));
            println!("  Series   : {}", fmt_count(output.report.series));
            println!("  Records  : {}", fmt_count(meta.record_count));
            println!("  Dropped  : {}", fmt_count(output.report.dropped_records));
            println!(
                "  From     : {}",
                meta.date_range.first().map(|d| d.to_string()).unwrap_or("—".into())
            );
            println!(
                "  To       : {}",
                meta.date_range.last().map(|d| d.to_string()).unwrap_or("—".into())
            );
            println!("─────────────────────────────────");
        }

        Command::Columns { input } => {
            let table = load_table(&input)?;
            let c = pipeline.classify(&table)?;
            if c.used_fallback {
                println!("(positional fallback used)");
            }
            println!("{} date columns:", c.date_columns.len());
            for col in &c.date_columns {
                println!("  [{:>3}] {:<24} → {}", col.index, col.label, col.iso);
            }
            if !c.excluded.is_empty() {
                println!("{} excluded:", c.excluded.len());
                for label in &c.excluded {
                    println!("  {}", label);
                }
            }
        }

        Command::Stats { input } => {
            let table = load_table(&input)?;
            let output = pipeline.run(&table)?;
            if output.statistics.is_empty() {
                println!("No series with values.");
            }
            for s in &output.statistics {
                println!(
                    "{:<12} {:<12} {:<40} n={:<4} min={:>10} max={:>10} mean={:>10} Δ%={:>8}",
                    s.tariff,
                    s.division,
                    s.serie,
                    s.count,
                    fmt_value(Some(s.min), 4),
                    fmt_value(Some(s.max), 4),
                    fmt_value(Some(s.mean), 4),
                    fmt_value(Some(s.change_pct), 2),
                );
            }
        }
    }

    Ok(())
}
