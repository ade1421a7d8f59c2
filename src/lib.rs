//! N-gram counting and add-delta smoothed language model library and CLI.
//!
//! The pipeline runs in two stages that communicate through a plain-text counts file:
//!
//! 1. [`NGramCounter`] scans a corpus (one sentence per line), wraps every sentence in
//!    `<s>`/`</s>` markers, and counts every n-gram of order `1..=N`.
//! 2. [`Estimator`] reads those counts, optionally closes them over a [`Vocabulary`], and turns
//!    them into add-delta smoothed conditional probabilities written as a [`LanguageModel`].
//!
//! ```no_run
//! use ngramlm::{CounterConfig, Estimator, ModelConfig, NGramCounter};
//!
//! # fn main() -> ngramlm::Result<()> {
//! let counter_cfg = CounterConfig::builder().max_order(3).build()?;
//! let artifacts = NGramCounter::new(counter_cfg).count_from_path("corpus.txt")?;
//! ngramlm::serialization::save_counts(&artifacts.tables, "counts.txt")?;
//!
//! let model_cfg = ModelConfig::builder().delta(0.01).build()?;
//! let model = Estimator::new(model_cfg).estimate_from_paths("counts.txt", Some("vocab.txt"))?;
//! model.save("model.lm")?;
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature. Library users can disable default
//! features to avoid the CLI dependencies:
//! `ngramlm = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions,
    clippy::cast_precision_loss
)]

pub mod config;
pub mod corpus;
pub mod counter;
pub mod error;
pub mod metrics;
pub mod serialization;
pub mod smoothing;
pub mod table;
pub mod vocabulary;
pub mod window;

pub use config::{CounterBuilder, CounterConfig, IngestConfig, ModelBuilder, ModelConfig};
pub use counter::{CountArtifacts, NGramCounter};
pub use error::{NgramError, Result};
pub use metrics::{CountingMetrics, OrderMetrics};
pub use smoothing::{Estimator, LanguageModel, OrderEstimates, ScoredNGram};
pub use table::{Count, FrequencyTable, NGramTables};
pub use vocabulary::{ClosingReport, Vocabulary};
pub use window::{SentenceWindow, SENTENCE_END, SENTENCE_START};
