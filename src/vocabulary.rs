//! Closed vocabularies: loading, generation from raw text, and table closing.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::Path;

use log::{debug, info};

use crate::config::IngestConfig;
use crate::corpus::{collect_paths, for_each_token, open_lines};
use crate::error::{NgramError, Result};
use crate::serialization::write_atomic;
use crate::table::NGramTables;

/// Set of unique unigram tokens, iterated in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: BTreeSet<String>,
}

/// Number of zero-count entries added to each order by [`Vocabulary::close`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosingReport {
    /// Entries added per order, index 0 holding unigrams.
    pub added: Vec<usize>,
}

impl ClosingReport {
    /// Sum of entries added across every order.
    #[must_use]
    pub fn total_added(&self) -> usize {
        self.added.iter().sum()
    }
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `token`, returning true if it was not present.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    /// Returns true when `token` belongs to the vocabulary.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true when the vocabulary holds no token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over tokens in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Reads a vocabulary file: the first whitespace separated token of each line is an entry.
    ///
    /// Blank lines are ignored, as is anything after the first token.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::from_reader(open_lines(path)?, Some(path))
    }

    /// Reads a vocabulary from any buffered source using the [`Vocabulary::from_path`] rules.
    pub fn from_reader<R: BufRead>(reader: R, path: Option<&Path>) -> Result<Self> {
        let mut vocab = Self::new();
        for line in reader.lines() {
            let line = line.map_err(|err| NgramError::io(err, path.map(Path::to_path_buf)))?;
            if let Some(token) = line.split_whitespace().next() {
                vocab.insert(token);
            }
        }
        Ok(vocab)
    }

    /// Collects every whitespace separated token of every file found under `inputs`.
    pub fn generate<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Self> {
        let files = collect_paths(inputs, cfg)?;
        let mut vocab = Self::new();
        for file in &files {
            for_each_token(file, |token| {
                if !vocab.contains(token) {
                    vocab.insert(token);
                }
            })?;
        }
        info!(
            "collected {} unique tokens from {} files",
            vocab.len(),
            files.len()
        );
        Ok(vocab)
    }

    /// Writes one token per line, sorted, replacing `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path, |writer| {
            for token in &self.tokens {
                writeln!(writer, "{token}")?;
            }
            Ok(())
        })
    }

    /// Closes `tables` over this vocabulary.
    ///
    /// Every vocabulary token missing from the unigram table is added with count zero. Then, for
    /// each order `i >= 2` in increasing order, every key of the already closed order `i - 1` is
    /// paired with every vocabulary token and the missing combinations are added with count zero.
    /// Existing counts and totals are never altered. An empty vocabulary leaves the tables as-is.
    pub fn close(&self, tables: &mut NGramTables) -> ClosingReport {
        let mut report = ClosingReport {
            added: vec![0; tables.max_order()],
        };
        if self.is_empty() || tables.max_order() == 0 {
            return report;
        }

        if let Some(unigrams) = tables.table_mut(1) {
            for token in &self.tokens {
                if unigrams.insert_zero(token.clone()) {
                    report.added[0] += 1;
                }
            }
        }

        for order in 2..=tables.max_order() {
            let contexts: Vec<String> = match tables.table(order - 1) {
                Some(table) => table.sorted_keys().into_iter().map(str::to_owned).collect(),
                None => continue,
            };
            let Some(table) = tables.table_mut(order) else {
                continue;
            };
            let mut added = 0usize;
            for context in &contexts {
                for token in &self.tokens {
                    let mut candidate = String::with_capacity(context.len() + 1 + token.len());
                    candidate.push_str(context);
                    candidate.push(' ');
                    candidate.push_str(token);
                    if table.insert_zero(candidate) {
                        added += 1;
                    }
                }
            }
            report.added[order - 1] = added;
            debug!(
                "closed order {order}: {} contexts x {} tokens, {added} entries added",
                contexts.len(),
                self.len()
            );
        }
        report
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CounterConfig;
    use crate::counter::NGramCounter;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn example_tables() -> NGramTables {
        let cfg = CounterConfig::builder()
            .max_order(2)
            .show_progress(false)
            .build()
            .unwrap();
        NGramCounter::new(cfg)
            .count_sentences(&["the cat sat", "the dog sat"])
            .unwrap()
            .tables
    }

    #[test]
    fn from_reader_keeps_first_token_per_line() {
        let input = "cat 12\n\n  dog extra words\nfox\ncat\n";
        let vocab = Vocabulary::from_reader(Cursor::new(input), None).unwrap();
        let tokens: Vec<&str> = vocab.iter().collect();
        assert_eq!(tokens, vec!["cat", "dog", "fox"]);
    }

    #[test]
    fn closing_adds_unseen_unigrams_with_zero_count() {
        let mut tables = example_tables();
        let before = tables.clone();
        let vocab: Vocabulary = ["cat", "dog", "fox"].into_iter().collect();
        let report = vocab.close(&mut tables);

        let unigrams = tables.table(1).unwrap();
        assert_eq!(unigrams.get("fox"), Some(0));
        assert_eq!(report.added[0], 1);
        for (ngram, count) in before.table(1).unwrap().iter() {
            assert_eq!(unigrams.get(ngram), Some(count));
        }
        assert_eq!(tables.totals(), before.totals());
    }

    #[test]
    fn closing_pairs_every_context_with_every_token() {
        let mut tables = example_tables();
        let vocab: Vocabulary = ["cat", "dog", "fox"].into_iter().collect();
        vocab.close(&mut tables);

        let unigram_keys: Vec<String> = tables
            .table(1)
            .unwrap()
            .sorted_keys()
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(unigram_keys.len(), 7);
        let bigrams = tables.table(2).unwrap();
        for context in &unigram_keys {
            for token in vocab.iter() {
                assert!(
                    bigrams.contains(&format!("{context} {token}")),
                    "missing {context} {token}"
                );
            }
        }
        assert_eq!(bigrams.get("the fox"), Some(0));
        assert_eq!(bigrams.get("<s> fox"), Some(0));
        assert_eq!(bigrams.get("fox fox"), Some(0));
        assert_eq!(bigrams.get("the cat"), Some(1));
        assert_eq!(bigrams.get("<s> the"), Some(2));
    }

    #[test]
    fn trigram_closing_builds_on_closed_bigrams() {
        let cfg = CounterConfig::builder()
            .max_order(3)
            .show_progress(false)
            .build()
            .unwrap();
        let mut tables = NGramCounter::new(cfg)
            .count_sentences(&["the cat sat", "the dog sat"])
            .unwrap()
            .tables;
        let before_totals = tables.totals();
        let vocab: Vocabulary = ["cat", "dog", "fox"].into_iter().collect();
        let report = vocab.close(&mut tables);

        let bigrams = tables.table(2).unwrap();
        assert_eq!(bigrams.get("<s> fox"), Some(0));
        assert_eq!(bigrams.get("fox fox"), Some(0));

        let trigrams = tables.table(3).unwrap();
        // Contexts that only exist after the bigram table was closed.
        assert_eq!(trigrams.get("<s> fox fox"), Some(0));
        assert_eq!(trigrams.get("fox fox cat"), Some(0));
        assert_eq!(trigrams.get("fox cat dog"), Some(0));
        assert_eq!(trigrams.get("the cat sat"), Some(1));
        for context in bigrams.sorted_keys() {
            for token in vocab.iter() {
                assert!(trigrams.contains(&format!("{context} {token}")));
            }
        }
        // Observed trigrams ending in a non-vocabulary token sit outside the closed grid.
        assert_eq!(trigrams.len(), 4 + bigrams.len() * vocab.len());
        assert_eq!(report.added.len(), 3);
        assert_eq!(tables.totals(), before_totals);
    }

    #[test]
    fn closing_is_monotonic() {
        let mut tables = example_tables();
        let before = tables.clone();
        let vocab: Vocabulary = ["sat", "zebra"].into_iter().collect();
        vocab.close(&mut tables);
        for (order, table) in before.iter() {
            let closed = tables.table(order).unwrap();
            assert!(closed.len() >= table.len());
            for (ngram, count) in table.iter() {
                assert_eq!(closed.get(ngram), Some(count));
            }
        }
    }

    #[test]
    fn empty_vocabulary_is_a_no_op() {
        let mut tables = example_tables();
        let before = tables.clone();
        let report = Vocabulary::new().close(&mut tables);
        assert_eq!(tables, before);
        assert_eq!(report.total_added(), 0);
    }

    #[test]
    fn generate_collects_unique_sorted_tokens() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "the cat\nsat\n").unwrap();
        fs::write(dir.path().join("b.txt"), "the dog  sat\n").unwrap();
        let vocab = Vocabulary::generate(&[dir.path()], &IngestConfig::default()).unwrap();
        let tokens: Vec<&str> = vocab.iter().collect();
        assert_eq!(tokens, vec!["cat", "dog", "sat", "the"]);

        let out = dir.path().join("vocab").join("vocab.txt");
        vocab.save(&out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "cat\ndog\nsat\nthe\n");
        let reloaded = Vocabulary::from_path(&out).unwrap();
        assert_eq!(reloaded, vocab);
    }
}
