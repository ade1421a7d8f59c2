//! Add-delta (Lidstone) estimation of conditional n-gram probabilities.
//!
//! For an n-gram `g` of order `i` with count `c(g)`, and `m_i = |table_i| * delta`:
//!
//! * `i == 1`: `p(g) = (c(g) + delta) / (total_1 + m_1)`
//! * `i > 1`: `p(g) = (c(g) + delta) / (c(context(g)) + m_i)`
//!
//! where `context(g)` is `g` without its last token. With `delta == 0` this is the
//! maximum-likelihood estimate. A probability of exactly zero has a base-2 log-probability of
//! negative infinity.

use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::config::{ModelBuilder, ModelConfig};
use crate::error::{NgramError, Result};
use crate::serialization::{load_counts, model};
use crate::table::{context_of, ngram_order, Count, NGramTables};
use crate::vocabulary::Vocabulary;

/// One estimated n-gram.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNGram {
    /// Canonical n-gram text.
    pub ngram: String,
    /// Raw count.
    pub count: Count,
    /// Smoothed conditional probability.
    pub probability: f64,
    /// Base-2 logarithm of [`ScoredNGram::probability`].
    pub log2_probability: f64,
}

/// Estimates for every n-gram of a single order, in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEstimates {
    /// N-gram order (1-based).
    pub order: usize,
    /// Number of distinct n-grams.
    pub unique: usize,
    /// Sum of counts.
    pub total: Count,
    /// Entries sorted by descending count, ties broken by n-gram text.
    pub entries: Vec<ScoredNGram>,
}

impl OrderEstimates {
    /// Number of entries whose probability is exactly zero.
    #[must_use]
    pub fn zero_probability_entries(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.probability == 0.0)
            .count()
    }
}

/// A fully estimated model ready to be written.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModel {
    orders: Vec<OrderEstimates>,
    // n-gram text -> position within its order's entries
    index: FxHashMap<String, usize>,
    config: ModelConfig,
}

impl LanguageModel {
    /// Per-order estimates from unigrams upwards.
    #[must_use]
    pub fn orders(&self) -> &[OrderEstimates] {
        &self.orders
    }

    /// Estimates for `order` (1-based).
    #[must_use]
    pub fn order(&self, order: usize) -> Option<&OrderEstimates> {
        order.checked_sub(1).and_then(|idx| self.orders.get(idx))
    }

    /// Looks up the estimate for `ngram` in constant time.
    #[must_use]
    pub fn get(&self, ngram: &str) -> Option<&ScoredNGram> {
        let position = *self.index.get(ngram)?;
        self.order(ngram_order(ngram))?.entries.get(position)
    }

    /// Configuration the model was estimated with.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Renders the model in its text layout.
    pub fn to_text(&self) -> Result<String> {
        let mut out = Vec::new();
        model::write_model(self, &mut out).map_err(|err| NgramError::io(err, None))?;
        String::from_utf8(out).map_err(|err| NgramError::Internal(err.to_string()))
    }

    /// Writes the model to `path`, replacing it atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        model::save_model(self, path)
    }
}

/// Turns count tables into a [`LanguageModel`].
#[derive(Debug, Clone)]
pub struct Estimator {
    cfg: ModelConfig,
}

impl Estimator {
    /// Creates an estimator for the supplied configuration.
    #[must_use]
    pub fn new(cfg: ModelConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`ModelBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> ModelBuilder {
        ModelConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// Loads a counts file, closes it over the optional vocabulary file, and estimates.
    ///
    /// Without a vocabulary the tables are estimated as read (open vocabulary).
    pub fn estimate_from_paths<P, V>(
        &self,
        counts: P,
        vocabulary: Option<V>,
    ) -> Result<LanguageModel>
    where
        P: AsRef<Path>,
        V: AsRef<Path>,
    {
        let mut tables = load_counts(counts)?;
        if let Some(vocab_path) = vocabulary {
            let vocab = Vocabulary::from_path(vocab_path)?;
            let report = vocab.close(&mut tables);
            if self.cfg.show_progress {
                info!(
                    "closed tables over {} vocabulary tokens ({} entries added)",
                    vocab.len(),
                    report.total_added()
                );
            }
        } else if self.cfg.show_progress {
            info!("no vocabulary supplied; building an open-vocabulary model");
        }
        self.estimate(&tables)
    }

    /// Estimates every order of `tables`.
    ///
    /// Fails with [`NgramError::MissingContext`] when a higher-order n-gram's context is absent
    /// from the table below it.
    pub fn estimate(&self, tables: &NGramTables) -> Result<LanguageModel> {
        self.cfg.validate()?;
        let start = Instant::now();
        let delta = self.cfg.delta;
        let mut orders = Vec::with_capacity(tables.max_order());

        for (order, table) in tables.iter() {
            let denominator_modifier = table.len() as f64 * delta;
            let lower = if order > 1 { tables.table(order - 1) } else { None };
            let mut entries = Vec::with_capacity(table.len());

            for (ngram, count) in table.sorted_by_count_descending() {
                let base = if order == 1 {
                    table.total() as f64
                } else {
                    let context = context_of(ngram).unwrap_or_default();
                    let context_count = lower.and_then(|t| t.get(&context)).ok_or_else(|| {
                        NgramError::MissingContext {
                            ngram: ngram.to_owned(),
                            context: context.clone(),
                        }
                    })?;
                    context_count as f64
                };
                let probability = smoothed_probability(count, delta, base + denominator_modifier);
                entries.push(ScoredNGram {
                    ngram: ngram.to_owned(),
                    count,
                    probability,
                    log2_probability: log2_probability(probability),
                });
            }

            let estimates = OrderEstimates {
                order,
                unique: table.len(),
                total: table.total(),
                entries,
            };
            let zeros = estimates.zero_probability_entries();
            if zeros > 0 {
                warn!(
                    "order {order}: {zeros} entries have probability 0 (log2 written as -inf); \
                     use delta > 0 to smooth them"
                );
            }
            orders.push(estimates);
        }

        if self.cfg.show_progress {
            info!(
                "estimated {} orders with delta {} in {:.2?}",
                orders.len(),
                delta,
                start.elapsed()
            );
        }

        let index = orders
            .iter()
            .flat_map(|estimates| {
                estimates
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(position, entry)| (entry.ngram.clone(), position))
            })
            .collect();

        Ok(LanguageModel {
            orders,
            index,
            config: self.cfg.clone(),
        })
    }
}

/// `(count + delta) / denominator`, or zero when the denominator is zero.
#[must_use]
pub fn smoothed_probability(count: Count, delta: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    (count as f64 + delta) / denominator
}

/// Base-2 logarithm of `probability`, negative infinity for zero.
#[must_use]
pub fn log2_probability(probability: f64) -> f64 {
    if probability <= 0.0 {
        f64::NEG_INFINITY
    } else {
        probability.log2()
    }
}
