use clap::{Args, Parser, Subcommand};
use roster_etl::config::AppConfig;
use roster_etl::error::AppError;
use roster_etl::export;
use roster_etl::pipeline::fetcher::HttpFetcher;
use roster_etl::pipeline::{Outcome, Pipeline, PipelineResult};
use roster_etl::telemetry;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "Roster ETL",
    about = "Fetch, validate and query employee roster data from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the retrieval pipeline once and report the results (default command)
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Override the configured source endpoint
    #[arg(long)]
    url: Option<String>,
    /// Override the per-attempt network timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Override the configured retry budget for timeouts/connection failures
    #[arg(long)]
    max_retries: Option<u32>,
    /// Number of records to display (default 5)
    #[arg(long)]
    rows: Option<usize>,
    /// Display all records
    #[arg(long)]
    all: bool,
    /// Only display records from this department
    #[arg(long)]
    department: Option<String>,
    /// Write validated records to a CSV file for the warehouse loader
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_pipeline(args).await,
    }
}

async fn run_pipeline(mut args: RunArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(url) = args.url.take() {
        config.source.url = url;
    }
    if let Some(secs) = args.timeout_secs.take() {
        config.source.timeout = Duration::from_secs(secs);
    }
    if let Some(max_retries) = args.max_retries.take() {
        config.source.max_retries = max_retries;
    }

    telemetry::init(&config.telemetry)?;

    let fetcher = HttpFetcher::new()?;
    let pipeline = Pipeline::new(fetcher, config.source.clone());
    let result = pipeline.run().await;

    render_result(&result, &args);

    if let Some(path) = args.csv.take() {
        export::write_csv_file(&path, &result.records)?;
        println!("Wrote {} record(s) to {}", result.records.len(), path.display());
    }

    match result.failure {
        Some(failure) => Err(AppError::Pipeline(failure)),
        None => Ok(()),
    }
}

fn render_result(result: &PipelineResult, args: &RunArgs) {
    println!("Pipeline run against employee roster endpoint");
    println!(
        "Outcome: {} ({} valid, {} rejected, {} fetch attempt(s), {:.2}s)",
        result.outcome,
        result.records.len(),
        result.rejections.len(),
        result.attempts,
        result.elapsed.as_secs_f64()
    );

    if result.outcome == Outcome::Failed {
        if let Some(failure) = &result.failure {
            println!("Terminal failure: {failure}");
        }
        return;
    }

    if result.rejections.is_empty() {
        println!("\nRejections: none");
    } else {
        println!("\nRejections");
        for rejection in &result.rejections {
            println!("- {} | source: {}", rejection.reason, rejection.source);
        }
    }

    let filtered: Vec<_> = result
        .records
        .iter()
        .filter(|record| match &args.department {
            Some(department) => record
                .department
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(department)),
            None => true,
        })
        .collect();

    let limit = if args.all {
        filtered.len()
    } else {
        args.rows.unwrap_or(5).min(filtered.len())
    };

    println!(
        "\nRecords: displaying {} of {} (of {} valid)",
        limit,
        filtered.len(),
        result.records.len()
    );
    for record in filtered.iter().take(limit) {
        let designation_note = match record.designation() {
            Some(designation) => format!(" | {designation}"),
            None => String::new(),
        };
        println!(
            "- {} | {} | {} | {} | hired {}{}",
            record.employee_id,
            record.full_name(),
            record.email,
            record.department.as_deref().unwrap_or("-"),
            record.hire_date,
            designation_note
        );
    }
}
