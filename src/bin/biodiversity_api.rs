use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use biodiversity_api::config::{ConfigLoader, ConfigOverrides, ServeConfig};
use biodiversity_api::domain::SampleName;
use biodiversity_api::error::ApiError;
use biodiversity_api::http::{self, AppState};
use biodiversity_api::output::JsonOutput;
use biodiversity_api::query::QueryService;
use biodiversity_api::store::DataStore;

#[derive(Parser)]
#[command(name = "biodiversity-api")]
#[command(about = "Read-only JSON API over the belly button biodiversity dataset")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Load the dataset and serve the HTTP API")]
    Serve(ServeArgs),
    #[command(about = "Run one query against the dataset and print JSON")]
    Query(QueryArgs),
    #[command(about = "Print dataset table counts")]
    Info(DatasetArgs),
}

#[derive(Args)]
struct DatasetArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    database: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[derive(Args)]
struct QueryArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(subcommand)]
    query: QueryCommand,
}

#[derive(Subcommand)]
enum QueryCommand {
    #[command(about = "List sample names")]
    Names,
    #[command(about = "List OTU descriptions")]
    Otu,
    #[command(about = "Show metadata for a sample, e.g. BB_940")]
    Metadata { sample: String },
    #[command(about = "Show weekly wash frequency for a sample")]
    Wfreq { sample: String },
    #[command(about = "Show OTU ids and counts for a sample, highest first")]
    Samples { sample: String },
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ApiError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ApiError) -> u8 {
    match error {
        ApiError::SampleNotFound(_) | ApiError::ConfigRead(_) | ApiError::ConfigParse(_) => 2,
        err if err.is_data_source() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => {
            let config = resolve(&args.dataset, args.bind)?;
            let query = load(&config)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .into_diagnostic()?;
            runtime.block_on(http::serve(AppState::new(query), config.bind))?;
            Ok(())
        }
        Commands::Query(args) => {
            let config = resolve(&args.dataset, None)?;
            let query = load(&config)?;
            run_query(&query, args.query)
        }
        Commands::Info(args) => {
            let config = resolve(&args, None)?;
            let query = load(&config)?;
            JsonOutput::write_summary(&mut std::io::stdout(), &query.dataset().summary())
                .into_diagnostic()
        }
    }
}

fn resolve(args: &DatasetArgs, bind: Option<SocketAddr>) -> Result<ServeConfig, ApiError> {
    ConfigLoader::resolve(
        args.config.as_deref(),
        ConfigOverrides {
            database: args.database.clone(),
            bind,
        },
    )
}

fn load(config: &ServeConfig) -> Result<QueryService, ApiError> {
    let store = DataStore::new(config.database.clone());
    info!(database = %store.database(), "loading dataset");
    let dataset = store.load()?;
    let summary = dataset.summary();
    info!(
        otus = summary.otus,
        samples = summary.samples,
        metadata_rows = summary.metadata_rows,
        "dataset loaded"
    );
    Ok(QueryService::new(Arc::new(dataset)))
}

fn run_query(query: &QueryService, command: QueryCommand) -> miette::Result<()> {
    let mut out = std::io::stdout();
    match command {
        QueryCommand::Names => JsonOutput::write_strings(&mut out, &query.list_sample_names()),
        QueryCommand::Otu => JsonOutput::write_strings(&mut out, &query.list_otu_descriptions()),
        QueryCommand::Metadata { sample } => {
            let metadata = query.get_sample_metadata(&SampleName::new(sample));
            JsonOutput::write_metadata(&mut out, metadata.as_ref())
        }
        QueryCommand::Wfreq { sample } => {
            let wfreq = query.get_wash_frequency(&SampleName::new(sample))?;
            JsonOutput::write_wash_frequency(&mut out, wfreq)
        }
        QueryCommand::Samples { sample } => {
            let sorted = query.get_sorted_otu_values(&SampleName::new(sample))?;
            JsonOutput::write_sorted(&mut out, &sorted)
        }
    }
    .into_diagnostic()
}
