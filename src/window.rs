//! Sentence tokenization and the bounded window of recent tokens used while counting.

use std::collections::VecDeque;
use std::iter;

/// Marker token prepended to every sentence.
pub const SENTENCE_START: &str = "<s>";
/// Marker token appended to every sentence.
pub const SENTENCE_END: &str = "</s>";

/// Splits one line into its whitespace separated tokens, bounded by the sentence markers.
///
/// An empty line still yields `<s>` followed by `</s>`.
pub fn sentence_tokens(line: &str) -> impl Iterator<Item = &str> {
    iter::once(SENTENCE_START)
        .chain(line.split_whitespace())
        .chain(iter::once(SENTENCE_END))
}

/// Bounded window holding the most recently seen tokens of a sentence, most recent first.
///
/// Pushing beyond the capacity evicts the oldest token. Each state of the window defines one
/// n-gram per order `1..=len()`, ending at the most recent token.
#[derive(Debug, Clone)]
pub struct SentenceWindow {
    capacity: usize,
    recent: VecDeque<String>,
}

impl SentenceWindow {
    /// Creates an empty window able to hold `capacity` tokens (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recent: VecDeque::new(),
        }
    }

    /// Maximum number of tokens retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tokens currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// Returns true when no token has been pushed since the last [`SentenceWindow::clear`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Drops every token so the window can be reused for the next sentence.
    pub fn clear(&mut self) {
        self.recent.clear();
    }

    /// Enqueues `token` as the most recent entry, evicting the oldest one when full.
    pub fn push(&mut self, token: impl Into<String>) {
        if self.recent.len() == self.capacity {
            self.recent.pop_back();
        }
        self.recent.push_front(token.into());
    }

    /// Iterates over the held tokens from most recent to oldest.
    pub fn most_recent_first(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Returns the n-gram made of the `order` most recent tokens, oldest token first.
    #[must_use]
    pub fn ngram(&self, order: usize) -> Option<String> {
        if order == 0 || order > self.recent.len() {
            return None;
        }
        let tokens: Vec<&str> = self
            .recent
            .iter()
            .take(order)
            .rev()
            .map(String::as_str)
            .collect();
        Some(tokens.join(" "))
    }

    /// Invokes `f(order, ngram)` for every order reachable from the current window state,
    /// stopping at the first error.
    pub fn for_each_ngram<F, E>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &str) -> Result<(), E>,
    {
        let mut tokens = self.recent.iter();
        let Some(first) = tokens.next() else {
            return Ok(());
        };
        let mut ngram = first.clone();
        f(1, &ngram)?;
        for (offset, token) in tokens.enumerate() {
            let mut extended = String::with_capacity(token.len() + 1 + ngram.len());
            extended.push_str(token);
            extended.push(' ');
            extended.push_str(&ngram);
            ngram = extended;
            f(offset + 2, &ngram)?;
        }
        Ok(())
    }
}
