use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use skillmatch::{
    normalize, train_from_csv, CsvOptions, DataPaths, Loader, MatchConfig, MatchEngine, Metric,
    ModelArtifact, SearchRequest, Threshold, TrainingConfig, VectorizerConfig,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Match free-text skill and certification queries against an employee roster
#[derive(Parser, Debug)]
#[command(name = "skillmatch")]
#[command(about = "Skill and certification matching over an employee roster", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the vectorizer and neighbour index on a vocabulary CSV
    Train(TrainArgs),
    /// Print the header of a model artifact
    Inspect {
        #[arg(long)]
        model: PathBuf,
    },
    /// Run a search and print the matching employees as JSON
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    #[arg(long)]
    vocabulary: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value_t = 5)]
    neighbors: usize,

    #[arg(long, default_value_t = Metric::Euclidean)]
    metric: Metric,

    /// Largest word n-gram to index
    #[arg(long, default_value_t = 1)]
    ngram_max: usize,

    #[arg(long, default_value_t = 1)]
    min_df: usize,

    #[arg(long)]
    sublinear_tf: bool,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    vocabulary: PathBuf,

    #[arg(long)]
    employees: PathBuf,

    #[arg(long)]
    model: PathBuf,

    /// JSON match config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    skill: Option<String>,

    #[arg(long)]
    certification: Option<String>,

    /// Candidate labels per query; defaults to the model's trained count
    #[arg(long)]
    neighbors: Option<usize>,

    /// Minimum partial-ratio score, 0-100
    #[arg(long)]
    threshold: Option<u32>,

    /// Banner rows above the roster header
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Include the resolved vocabulary candidates in the output
    #[arg(long)]
    explain: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Train(args) => train(args),
        Command::Inspect { model } => {
            let metadata = ModelArtifact::inspect(&model)
                .with_context(|| format!("failed to read model {}", model.display()))?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            Ok(())
        }
        Command::Query(args) => query(args),
    }
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    let config = TrainingConfig {
        vectorizer: VectorizerConfig {
            ngram_range: (1, args.ngram_max),
            min_df: args.min_df,
            sublinear_tf: args.sublinear_tf,
            ..VectorizerConfig::default()
        },
        metric: args.metric,
        neighbors: args.neighbors,
    };

    info!("Training on {}", args.vocabulary.display());
    let (_, metadata) = train_from_csv(&args.vocabulary, &CsvOptions::default(), &config, &args.output)
        .with_context(|| format!("failed to train from {}", args.vocabulary.display()))?;
    info!(
        "Wrote {} ({} rows, {} features)",
        args.output.display(),
        metadata.vocabulary_rows,
        metadata.features
    );
    Ok(())
}

fn query(args: QueryArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MatchConfig::default(),
    };
    if args.neighbors.is_some() {
        config.neighbors = args.neighbors;
    }
    let threshold = args.threshold.map(Threshold::new).transpose()?;

    let engine = Loader::new(DataPaths {
        vocabulary: args.vocabulary,
        employees: args.employees,
        model: args.model,
    })
    .with_config(config)
    .with_roster_options(CsvOptions {
        skip_rows: args.skip_rows,
        ..CsvOptions::default()
    })
    .load()
    .context("failed to start the match engine")?;

    let request = SearchRequest {
        skill: args.skill,
        certification: args.certification,
        threshold,
    };
    let mut output = engine.search(&request)?.to_json();
    if args.explain {
        output["candidates"] = explain(&engine, &request)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn explain(engine: &MatchEngine, request: &SearchRequest) -> anyhow::Result<Value> {
    let mut candidates = serde_json::Map::new();
    for (key, query) in [("skill", &request.skill), ("certification", &request.certification)] {
        let normalized = query.as_deref().map(normalize).unwrap_or_default();
        if !normalized.is_empty() {
            let set = engine.candidates(&normalized)?;
            candidates.insert(key.to_string(), json!(set.labels));
        }
    }
    Ok(Value::Object(candidates))
}
