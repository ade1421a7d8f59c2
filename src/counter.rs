//! Corpus scan producing per-order n-gram counts.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{CounterBuilder, CounterConfig};
use crate::corpus::read_sentences;
use crate::error::{NgramError, Result};
use crate::metrics::{sample_rss_kb, CountingMetrics, OrderMetrics};
use crate::table::NGramTables;
use crate::window::{sentence_tokens, SentenceWindow};

/// Number of sentences handed to each rayon task.
const SHARD_SENTENCES: usize = 4096;

/// High-level façade configuring and executing counting passes.
#[derive(Debug, Clone)]
pub struct NGramCounter {
    cfg: CounterConfig,
}

/// Artifacts returned after a counting pass completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct CountArtifacts {
    /// Per-order frequency tables.
    pub tables: NGramTables,
    /// Metrics captured while counting.
    pub metrics: CountingMetrics,
}

impl NGramCounter {
    /// Creates a new counter for the supplied configuration.
    #[must_use]
    pub fn new(cfg: CounterConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`CounterBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> CounterBuilder {
        CounterConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &CounterConfig {
        &self.cfg
    }

    /// Counts the corpus stored at `path`, one sentence per line.
    pub fn count_from_path<P: AsRef<Path>>(&self, path: P) -> Result<CountArtifacts> {
        let sentences = read_sentences(path)?;
        self.count_sentences(&sentences)
    }

    /// Counts in-memory sentences, sharding the work across the rayon pool.
    ///
    /// Shard tables are summed per n-gram, so the result equals a sequential scan.
    pub fn count_sentences<S>(&self, sentences: &[S]) -> Result<CountArtifacts>
    where
        S: AsRef<str> + Sync,
    {
        self.cfg.validate()?;
        let start = Instant::now();
        let max_order = self.cfg.max_order;
        let lowercase = self.cfg.lowercase;

        let (tables, tokens) = sentences
            .par_chunks(SHARD_SENTENCES)
            .map(|shard| {
                let mut tables = NGramTables::new(max_order);
                let mut window = SentenceWindow::new(max_order);
                let mut tokens = 0usize;
                for sentence in shard {
                    tokens +=
                        count_sentence(sentence.as_ref(), &mut tables, &mut window, lowercase)?;
                }
                Ok::<_, NgramError>((tables, tokens))
            })
            .try_reduce(
                || (NGramTables::new(max_order), 0usize),
                |(mut acc, acc_tokens), (local, local_tokens)| {
                    acc.merge(local)?;
                    Ok((acc, acc_tokens + local_tokens))
                },
            )?;

        if sentences.is_empty() {
            warn!("corpus contains no sentences; every table is empty");
        }

        let mut metrics = CountingMetrics::new();
        metrics.sentences = sentences.len();
        metrics.tokens = tokens;
        metrics.orders = tables
            .iter()
            .map(|(order, table)| OrderMetrics {
                order,
                unique: table.len(),
                total: table.total(),
            })
            .collect();
        metrics.total_duration = start.elapsed();
        metrics.rss_kb = sample_rss_kb();

        if self.cfg.show_progress {
            for order in &metrics.orders {
                debug!(
                    "order {:>2} unique {:>10} total {:>12}",
                    order.order, order.unique, order.total
                );
            }
            info!(
                "counted {} sentences ({} tokens) up to order {} in {:.2?}",
                metrics.sentences, metrics.tokens, max_order, metrics.total_duration
            );
        }

        Ok(CountArtifacts { tables, metrics })
    }
}

/// Counts every n-gram of one sentence into `tables`, returning the number of corpus tokens.
///
/// `window` is cleared first; its capacity bounds the highest order counted and must not
/// exceed `tables.max_order()`.
pub fn count_sentence(
    line: &str,
    tables: &mut NGramTables,
    window: &mut SentenceWindow,
    lowercase: bool,
) -> Result<usize> {
    if window.capacity() > tables.max_order() {
        return Err(NgramError::Internal(format!(
            "window of {} tokens exceeds the {} counted orders",
            window.capacity(),
            tables.max_order()
        )));
    }
    window.clear();
    let mut tokens = 0usize;
    for token in sentence_tokens(line) {
        if lowercase {
            window.push(token.to_lowercase());
        } else {
            window.push(token);
        }
        window.for_each_ngram(|order, ngram| tables.increment(order, ngram))?;
        tokens += 1;
    }
    Ok(tokens.saturating_sub(2))
}

impl fmt::Display for CountArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Counted {} sentences, {} tokens",
            self.metrics.sentences, self.metrics.tokens
        )?;
        for (order, table) in self.tables.iter() {
            writeln!(
                f,
                "{order}-grams: unique={}; total={}",
                table.len(),
                table.total()
            )?;
        }
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(max_order: usize) -> NGramCounter {
        let cfg = CounterConfig::builder()
            .max_order(max_order)
            .show_progress(false)
            .build()
            .unwrap();
        NGramCounter::new(cfg)
    }

    #[test]
    fn counts_bigram_example() {
        let artifacts = counter(2)
            .count_sentences(&["the cat sat", "the dog sat"])
            .unwrap();
        let unigrams = artifacts.tables.table(1).unwrap();
        for (ngram, count) in [
            ("<s>", 2),
            ("the", 2),
            ("cat", 1),
            ("sat", 2),
            ("dog", 1),
            ("</s>", 2),
        ] {
            assert_eq!(unigrams.get(ngram), Some(count), "unigram {ngram}");
        }
        assert_eq!(unigrams.len(), 6);

        let bigrams = artifacts.tables.table(2).unwrap();
        for (ngram, count) in [
            ("<s> the", 2),
            ("the cat", 1),
            ("cat sat", 1),
            ("sat </s>", 2),
            ("the dog", 1),
            ("dog sat", 1),
        ] {
            assert_eq!(bigrams.get(ngram), Some(count), "bigram {ngram}");
        }
        assert_eq!(artifacts.tables.totals(), vec![10, 8]);
        assert_eq!(artifacts.metrics.sentences, 2);
        assert_eq!(artifacts.metrics.tokens, 6);
    }

    #[test]
    fn short_sentences_skip_unreachable_orders() {
        let artifacts = counter(4).count_sentences(&["hi"]).unwrap();
        assert_eq!(artifacts.tables.totals(), vec![3, 2, 1, 0]);
        assert_eq!(
            artifacts.tables.table(3).unwrap().get("<s> hi </s>"),
            Some(1)
        );
        assert!(artifacts.tables.table(4).unwrap().is_empty());
    }

    #[test]
    fn lowercase_normalises_tokens() {
        let cfg = CounterConfig::builder()
            .max_order(1)
            .lowercase(true)
            .show_progress(false)
            .build()
            .unwrap();
        let artifacts = NGramCounter::new(cfg)
            .count_sentences(&["The THE the"])
            .unwrap();
        assert_eq!(artifacts.tables.table(1).unwrap().get("the"), Some(3));
    }

    #[test]
    fn counting_is_case_sensitive_by_default() {
        let artifacts = counter(1).count_sentences(&["The the"]).unwrap();
        let unigrams = artifacts.tables.table(1).unwrap();
        assert_eq!(unigrams.get("The"), Some(1));
        assert_eq!(unigrams.get("the"), Some(1));
    }

    #[test]
    fn sharded_count_matches_sequential_scan() {
        let sentences: Vec<String> = (0..(SHARD_SENTENCES * 2 + 17))
            .map(|idx| format!("w{} w{} w{}", idx % 7, idx % 5, idx % 3))
            .collect();
        let parallel = counter(3).count_sentences(&sentences).unwrap();

        let mut sequential = NGramTables::new(3);
        let mut window = SentenceWindow::new(3);
        for sentence in &sentences {
            count_sentence(sentence, &mut sequential, &mut window, false).unwrap();
        }
        assert_eq!(parallel.tables, sequential);
    }

    #[test]
    fn window_wider_than_tables_is_rejected() {
        let mut tables = NGramTables::new(2);
        let mut window = SentenceWindow::new(3);
        let err = count_sentence("a b c", &mut tables, &mut window, false).unwrap_err();
        assert!(matches!(err, NgramError::Internal(_)));
        assert_eq!(tables.totals(), vec![0, 0]);
    }

    #[test]
    fn oversized_order_is_rejected_before_counting() {
        let cfg = CounterConfig {
            max_order: usize::MAX,
            ..CounterConfig::default()
        };
        let err = NGramCounter::new(cfg)
            .count_sentences(&["a b"])
            .unwrap_err();
        assert!(matches!(err, NgramError::InvalidConfig(_)));
    }

    #[test]
    fn empty_corpus_yields_empty_tables() {
        let artifacts = counter(2).count_sentences::<&str>(&[]).unwrap();
        assert_eq!(artifacts.tables.totals(), vec![0, 0]);
        assert_eq!(artifacts.metrics.sentences, 0);
    }
}
