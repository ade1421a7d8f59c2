//! Per-order frequency tables keyed by canonical n-gram text.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::error::{NgramError, Result};

/// Occurrence count of a single n-gram.
pub type Count = u64;

/// Number of tokens in an n-gram.
#[must_use]
pub fn ngram_order(ngram: &str) -> usize {
    ngram.split_whitespace().count()
}

/// Returns the (n-1)-gram preceding the final token of `ngram`, or `None` for unigrams.
#[must_use]
pub fn context_of(ngram: &str) -> Option<String> {
    let tokens: Vec<&str> = ngram.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(tokens[..tokens.len() - 1].join(" "))
}

/// Mapping from n-gram text to count for a single order.
///
/// Accumulation uses an unordered map; deterministic traversal is provided by
/// [`FrequencyTable::sorted_by_count_descending`] and [`FrequencyTable::sorted_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: FxHashMap<String, Count>,
    total: Count,
}

impl FrequencyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `ngram`, inserting it with count 1 when absent.
    pub fn increment(&mut self, ngram: &str) -> Result<()> {
        self.add(ngram, 1)
    }

    /// Adds `count` occurrences of `ngram` and to the table total.
    ///
    /// Fails with [`NgramError::CountOverflow`] before touching the table when either the
    /// n-gram's count or the total would exceed [`Count::MAX`].
    pub fn add(&mut self, ngram: &str, count: Count) -> Result<()> {
        let overflow = || NgramError::CountOverflow {
            ngram: ngram.to_owned(),
        };
        let total = self.total.checked_add(count).ok_or_else(overflow)?;
        if let Some(existing) = self.counts.get_mut(ngram) {
            *existing = existing.checked_add(count).ok_or_else(overflow)?;
        } else {
            self.counts.insert(ngram.to_owned(), count);
        }
        self.total = total;
        Ok(())
    }

    /// Inserts `ngram` with count zero if it is not already present.
    ///
    /// Returns true when a new entry was created. The total is unchanged.
    pub fn insert_zero(&mut self, ngram: String) -> bool {
        match self.counts.entry(ngram) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(0);
                true
            }
        }
    }

    /// Count for `ngram`, if present.
    #[must_use]
    pub fn get(&self, ngram: &str) -> Option<Count> {
        self.counts.get(ngram).copied()
    }

    /// Returns true when `ngram` is a key of the table.
    #[must_use]
    pub fn contains(&self, ngram: &str) -> bool {
        self.counts.contains_key(ngram)
    }

    /// Number of distinct n-grams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true when the table holds no n-gram.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of every count in the table.
    #[must_use]
    pub fn total(&self) -> Count {
        self.total
    }

    /// Keys in lexicographic order.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.counts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Entries ordered by descending count, ties broken by ascending n-gram text.
    #[must_use]
    pub fn sorted_by_count_descending(&self) -> Vec<(&str, Count)> {
        let mut entries: Vec<(&str, Count)> = self
            .counts
            .iter()
            .map(|(ngram, &count)| (ngram.as_str(), count))
            .collect();
        entries.sort_unstable_by(|a, b| by_count_then_key(*a, *b));
        entries
    }

    /// Sums every count of `other` into this table.
    ///
    /// An overflowing sum fails with [`NgramError::CountOverflow`] and leaves the table
    /// partially merged.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        if self.counts.is_empty() {
            *self = other;
            return Ok(());
        }
        self.total = self
            .total
            .checked_add(other.total)
            .ok_or_else(|| NgramError::CountOverflow {
                ngram: "<table total>".into(),
            })?;
        for (ngram, count) in other.counts {
            match self.counts.entry(ngram) {
                Entry::Occupied(mut occupied) => {
                    let sum = occupied.get().checked_add(count).ok_or_else(|| {
                        NgramError::CountOverflow {
                            ngram: occupied.key().clone(),
                        }
                    })?;
                    *occupied.get_mut() = sum;
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(count);
                }
            }
        }
        Ok(())
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Count)> {
        self.counts.iter().map(|(ngram, &count)| (ngram.as_str(), count))
    }
}

fn by_count_then_key(a: (&str, Count), b: (&str, Count)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// One [`FrequencyTable`] per order, index 0 holding unigrams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NGramTables {
    orders: Vec<FrequencyTable>,
}

impl NGramTables {
    /// Creates empty tables for orders `1..=max_order`.
    #[must_use]
    pub fn new(max_order: usize) -> Self {
        Self {
            orders: (0..max_order).map(|_| FrequencyTable::new()).collect(),
        }
    }

    /// Highest order held.
    #[must_use]
    pub fn max_order(&self) -> usize {
        self.orders.len()
    }

    /// Table for `order` (1-based).
    #[must_use]
    pub fn table(&self, order: usize) -> Option<&FrequencyTable> {
        order.checked_sub(1).and_then(|idx| self.orders.get(idx))
    }

    /// Mutable table for `order` (1-based).
    pub fn table_mut(&mut self, order: usize) -> Option<&mut FrequencyTable> {
        order.checked_sub(1).and_then(|idx| self.orders.get_mut(idx))
    }

    /// Iterates over `(order, table)` pairs from unigrams upwards.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FrequencyTable)> {
        self.orders
            .iter()
            .enumerate()
            .map(|(idx, table)| (idx + 1, table))
    }

    /// Records one occurrence of `ngram` in the table for `order`.
    pub fn increment(&mut self, order: usize, ngram: &str) -> Result<()> {
        self.add(order, ngram, 1)
    }

    /// Adds `count` occurrences of `ngram` to the table for `order`.
    pub fn add(&mut self, order: usize, ngram: &str, count: Count) -> Result<()> {
        let max_order = self.max_order();
        let table = self.table_mut(order).ok_or_else(|| {
            NgramError::Internal(format!(
                "order {order} is outside the counted range 1..={max_order}"
            ))
        })?;
        table.add(ngram, count)
    }

    /// Adds `count` occurrences of `ngram`, growing the table list to fit its order.
    ///
    /// Returns the order the n-gram was recorded under.
    pub fn add_growing(&mut self, ngram: &str, count: Count) -> Result<usize> {
        let order = ngram_order(ngram);
        while self.orders.len() < order {
            self.orders.push(FrequencyTable::new());
        }
        if let Some(table) = self.table_mut(order) {
            table.add(ngram, count)?;
        }
        Ok(order)
    }

    /// Entries of `order` sorted by descending count then key.
    #[must_use]
    pub fn sorted_by_count_descending(&self, order: usize) -> Vec<(&str, Count)> {
        self.table(order)
            .map(FrequencyTable::sorted_by_count_descending)
            .unwrap_or_default()
    }

    /// Sums the counts of another table set into this one, order by order.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        if self.orders.len() < other.orders.len() {
            self.orders.resize_with(other.orders.len(), FrequencyTable::new);
        }
        for (table, incoming) in self.orders.iter_mut().zip(other.orders) {
            table.merge(incoming)?;
        }
        Ok(())
    }

    /// Distinct n-gram count per order.
    #[must_use]
    pub fn unique_counts(&self) -> Vec<usize> {
        self.orders.iter().map(FrequencyTable::len).collect()
    }

    /// Total occurrence count per order.
    #[must_use]
    pub fn totals(&self) -> Vec<Count> {
        self.orders.iter().map(FrequencyTable::total).collect()
    }
}
