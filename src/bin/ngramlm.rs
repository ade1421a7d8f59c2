use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use ngramlm::config::{CounterConfig, IngestConfig, ModelConfig};
use ngramlm::corpus::read_sentences;
use ngramlm::serialization;
use ngramlm::{Estimator, NGramCounter, Vocabulary};
use rayon::ThreadPoolBuilder;

const DEFAULT_ORDER: usize = 3;

#[derive(Parser, Debug)]
#[command(author, version, about = "N-gram counting and language model toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count n-grams of a sentence-per-line corpus
    Count(CountArgs),
    /// Build a smoothed language model from a counts file
    Build(BuildArgs),
    /// Collect the unique tokens of every file in a directory
    Vocab(VocabArgs),
    /// Print the header summary of a language model
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct CountArgs {
    /// Corpus file, one sentence per line
    corpus: PathBuf,

    /// Output path for the counts file
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Maximum n-gram order
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Lowercase tokens before counting
    #[arg(long)]
    lowercase: bool,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Disable progress spinner and stage logging
    #[arg(long)]
    no_progress: bool,

    /// Print counting metrics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Counts file produced by `count`
    counts: PathBuf,

    /// Output path for the language model
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Closed vocabulary file; omit for an open-vocabulary model
    #[arg(long, value_name = "PATH")]
    vocab: Option<PathBuf>,

    /// Additive smoothing constant (0 = unsmoothed)
    #[arg(
        short,
        long,
        value_name = "DELTA",
        default_value_t = 0.0,
        allow_negative_numbers = true
    )]
    delta: f64,

    /// Fractional digits written for probabilities
    #[arg(long, value_name = "DIGITS", default_value_t = 5)]
    precision: usize,

    /// Disable stage logging
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct VocabArgs {
    /// Directories or files to scan
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the vocabulary file
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Language model to inspect
    model: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Count(args) => run_count(args),
        Commands::Build(args) => run_build(args),
        Commands::Vocab(args) => run_vocab(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_count(args: CountArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    let cfg = CounterConfig::builder()
        .max_order(args.order)
        .lowercase(args.lowercase)
        .show_progress(!args.no_progress)
        .build()?;

    let sentences = read_sentences(&args.corpus)
        .with_context(|| format!("failed to read corpus {}", args.corpus.display()))?;
    info!("loaded {} sentences", sentences.len());

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} counting n-grams... {elapsed}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let artifacts = NGramCounter::new(cfg).count_sentences(&sentences)?;
    drop(sentences);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    serialization::save_counts(&artifacts.tables, &args.output)
        .with_context(|| format!("failed to write counts to {}", args.output.display()))?;

    if args.json {
        println!("{}", artifacts.metrics.to_json(true)?);
    } else {
        print!("{artifacts}");
        println!("wrote counts to {}", args.output.display());
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
    let cfg = ModelConfig::builder()
        .delta(args.delta)
        .precision(args.precision)
        .show_progress(!args.no_progress)
        .build()?;

    let model = Estimator::new(cfg)
        .estimate_from_paths(&args.counts, args.vocab.as_ref())
        .with_context(|| format!("failed to build model from {}", args.counts.display()))?;
    model
        .save(&args.output)
        .with_context(|| format!("failed to write model to {}", args.output.display()))?;

    let summary: Vec<String> = model
        .orders()
        .iter()
        .map(|order| format!("{}-grams={}", order.order, order.unique))
        .collect();
    println!(
        "wrote model ({}) with delta {} to {}",
        summary.join(", "),
        args.delta,
        args.output.display()
    );
    Ok(())
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    let cfg = IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .build();
    let vocab = Vocabulary::generate(&args.inputs, &cfg).context("failed to collect vocabulary")?;
    vocab
        .save(&args.output)
        .with_context(|| format!("failed to write vocabulary to {}", args.output.display()))?;
    println!("wrote {} tokens to {}", vocab.len(), args.output.display());
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let summary = serialization::load_summary(&args.model)
        .with_context(|| format!("failed to read model header {}", args.model.display()))?;

    if args.json {
        println!("{}", summary.to_json(true)?);
    } else {
        println!("Model  : {}", args.model.display());
        println!("Orders : {}", summary.max_order());
        for order in &summary.orders {
            println!(
                "{}-grams: unique={} total={}",
                order.order, order.unique, order.total
            );
        }
    }
    Ok(())
}
