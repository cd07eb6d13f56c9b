//! TradeSphere CLI binary.
//!
//! Runs the batch pipeline stages and renders the dashboard in the terminal.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tradesphere::output::{ExportFormat, Exporter, TextStyle, TradeFilter, fmt_cur};
use tradesphere::{
    AnalyticsSummary, DashboardLoader, GenerateSummary, Pipeline, PipelineConfig,
    TransformSummary,
};

/// Dropped rows listed after a transform.
const DROPPED_PREVIEW: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "tradesphere")]
#[command(about = "TradeSphere: trade exposure, P&L and historical VaR", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GeneratorArgs {
    /// Number of trades to generate
    #[arg(long)]
    trades: Option<usize>,

    /// Business days covered by the generated window
    #[arg(long)]
    days: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Last date of the generated window (YYYY-MM-DD), default today
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
struct VarArgs {
    /// VaR confidence level
    #[arg(long)]
    alpha: Option<f64>,

    /// VaR lookback in daily observations
    #[arg(long)]
    lookback: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a synthetic raw trade table
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },

    /// Clean raw trades and write the counterparty summary
    Transform,

    /// Compute daily P&L, VaR, exposures and BI exports
    Analytics {
        #[command(flatten)]
        var: VarArgs,
    },

    /// Run generate, transform and analytics in order
    Run {
        #[command(flatten)]
        generator: GeneratorArgs,

        #[command(flatten)]
        var: VarArgs,
    },

    /// Render the dashboard from the pipeline outputs
    Dashboard {
        /// First trade date included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last trade date included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Keep only these counterparties (repeatable)
        #[arg(long = "counterparty")]
        counterparties: Vec<String>,

        /// Keep only these asset classes (repeatable)
        #[arg(long = "asset-class")]
        asset_classes: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Maximum rows per table in text output
        #[arg(long, default_value = "20")]
        rows: usize,

        /// Re-render every N seconds, reloading changed files
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,

        /// Write the filtered trades to this CSV file
        #[arg(long, value_name = "PATH")]
        export_filtered: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    Ok(config)
}

fn apply_generator(config: &mut PipelineConfig, args: &GeneratorArgs) {
    let generator = &mut config.generator;
    if let Some(trades) = args.trades {
        generator.trades = trades;
    }
    if let Some(days) = args.days {
        generator.window_business_days = days;
    }
    if let Some(seed) = args.seed {
        generator.seed = seed;
    }
    if args.end_date.is_some() {
        generator.end_date = args.end_date;
    }
}

fn apply_var(config: &mut PipelineConfig, args: &VarArgs) {
    if let Some(alpha) = args.alpha {
        config.var.alpha = alpha;
    }
    if let Some(lookback) = args.lookback {
        config.var.lookback = lookback;
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Generate { generator } => {
            apply_generator(&mut config, &generator);
            let pipeline = Pipeline::new(config)?;
            let summary = with_spinner("Generating trades...", || pipeline.generate())?;
            print_generate(&summary);
        }
        Commands::Transform => {
            let pipeline = Pipeline::new(config)?;
            let summary = with_spinner("Cleaning trades...", || pipeline.transform())?;
            print_transform(&summary);
        }
        Commands::Analytics { var } => {
            apply_var(&mut config, &var);
            let pipeline = Pipeline::new(config)?;
            let summary = with_spinner("Computing analytics...", || pipeline.analytics())?;
            print_analytics(&summary);
        }
        Commands::Run { generator, var } => {
            apply_generator(&mut config, &generator);
            apply_var(&mut config, &var);
            let pipeline = Pipeline::new(config)?;
            let generate = with_spinner("Generating trades...", || pipeline.generate())?;
            print_generate(&generate);
            let transform = with_spinner("Cleaning trades...", || pipeline.transform())?;
            print_transform(&transform);
            let analytics = with_spinner("Computing analytics...", || pipeline.analytics())?;
            print_analytics(&analytics);
            println!("\nOutputs written to {}", pipeline.config().data_dir.display());
        }
        Commands::Dashboard {
            from,
            to,
            counterparties,
            asset_classes,
            format,
            rows,
            watch,
            export_filtered,
        } => {
            let mut filter = TradeFilter::new()
                .counterparties(counterparties)
                .asset_classes(asset_classes);
            filter.start = from;
            filter.end = to;

            let loader = DashboardLoader::from_config(&config);
            loop {
                render_dashboard(&loader, &filter, format, rows, export_filtered.as_deref())?;
                let Some(seconds) = watch else { break };
                let stats = loader.stats()?;
                info!(
                    trade_hits = stats.trades.hits,
                    reloads = stats.reloads(),
                    "dashboard rendered, waiting {seconds}s"
                );
                std::thread::sleep(Duration::from_secs(seconds.max(1)));
            }
        }
    }

    Ok(())
}

fn with_spinner<T, E, F>(message: &'static str, stage: F) -> Result<T, Box<dyn std::error::Error>>
where
    F: FnOnce() -> Result<T, E>,
    E: std::error::Error + 'static,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);

    match stage() {
        Ok(value) => {
            pb.finish_and_clear();
            Ok(value)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(Box::new(e))
        }
    }
}

fn print_generate(summary: &GenerateSummary) {
    println!(
        "Generated {} trades -> {}",
        summary.trades,
        summary.path.display()
    );
}

fn print_transform(summary: &TransformSummary) {
    println!(
        "Cleaned {} of {} rows ({} dropped), {} counterparties",
        summary.kept,
        summary.rows_read,
        summary.dropped.len(),
        summary.counterparties
    );
    for failure in summary.dropped.iter().take(DROPPED_PREVIEW) {
        println!("  dropped: {failure}");
    }
    if summary.dropped.len() > DROPPED_PREVIEW {
        println!("  ... {} more", summary.dropped.len() - DROPPED_PREVIEW);
    }
}

fn print_analytics(summary: &AnalyticsSummary) {
    println!(
        "Analysed {} trades over {} days, {} tidy rows",
        summary.trades, summary.days, summary.tidy_rows
    );
    println!(
        "VaR ({:.0}%, {}d lookback): {}",
        summary.var.alpha * 100.0,
        summary.var.lookback_days,
        fmt_cur(summary.var.var)
    );
}

fn render_dashboard(
    loader: &DashboardLoader,
    filter: &TradeFilter,
    format: OutputFormat,
    rows: usize,
    export_filtered: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = loader.report(filter.clone(), rows)?;

    match format {
        OutputFormat::Text => println!("{}", report.render(TextStyle::Ascii)),
        OutputFormat::Markdown => println!("{}", report.render(TextStyle::Markdown)),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(path) = export_filtered {
        report
            .trades
            .as_slice()
            .export_to_file(path, ExportFormat::Csv)?;
        info!(path = %path.display(), trades = report.trades.len(), "exported filtered trades");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dashboard_arguments() {
        let cli = Cli::try_parse_from([
            "tradesphere",
            "dashboard",
            "--from",
            "2024-01-01",
            "--to",
            "2024-03-31",
            "--counterparty",
            "Bank A",
            "--counterparty",
            "Bank B",
            "--format",
            "markdown",
            "--watch",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Dashboard {
                from,
                counterparties,
                format,
                watch,
                ..
            } => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(counterparties, vec!["Bank A", "Bank B"]);
                assert_eq!(format, OutputFormat::Markdown);
                assert_eq!(watch, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "tradesphere",
            "--data-dir",
            "out",
            "run",
            "--trades",
            "50",
            "--alpha",
            "0.99",
        ])
        .unwrap();

        let mut config = load_config(&cli).unwrap();
        if let Commands::Run { generator, var } = &cli.command {
            apply_generator(&mut config, generator);
            apply_var(&mut config, var);
        }

        assert_eq!(config.data_dir, PathBuf::from("out"));
        assert_eq!(config.generator.trades, 50);
        assert_eq!(config.generator.seed, 11);
        assert_eq!(config.var.alpha, 0.99);
    }
}
