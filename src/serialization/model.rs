//! Language model text layout.
//!
//! ```text
//! \data\
//! 1-grams: unique=<U1>; total=<T1>
//! ...
//!
//! \1-grams:
//! <count>\t<probability>\t<log2 probability>\t<ngram>
//! ...
//!
//! \end\
//! ```
//!
//! Probabilities use [`format_decimal`] at the model's configured precision. The file ends
//! right after `\end\`, without a trailing newline.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::open_lines;
use crate::error::{NgramError, Result};
use crate::metrics::OrderMetrics;
use crate::serialization::{format_decimal, write_atomic};
use crate::smoothing::LanguageModel;

/// Opening marker of the header block.
pub const DATA_MARKER: &str = "\\data\\";
/// Closing marker of the file.
pub const END_MARKER: &str = "\\end\\";

/// Writes `model` to `writer`.
pub fn write_model<W: Write>(model: &LanguageModel, writer: &mut W) -> io::Result<()> {
    let precision = model.config().precision;
    writeln!(writer, "{DATA_MARKER}")?;
    for estimates in model.orders() {
        writeln!(
            writer,
            "{}-grams: unique={}; total={}",
            estimates.order, estimates.unique, estimates.total
        )?;
    }
    writeln!(writer)?;

    for estimates in model.orders() {
        writeln!(writer, "\\{}-grams:", estimates.order)?;
        for entry in &estimates.entries {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                entry.count,
                format_decimal(entry.probability, precision),
                format_decimal(entry.log2_probability, precision),
                entry.ngram
            )?;
        }
        writeln!(writer)?;
    }
    write!(writer, "{END_MARKER}")
}

/// Writes `model` to `path`, replacing it atomically.
pub fn save_model<P: AsRef<Path>>(model: &LanguageModel, path: P) -> Result<()> {
    write_atomic(path, |writer| write_model(model, writer))
}

/// Per-order sizes recorded in a model header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSummary {
    /// Header lines, from unigrams upwards.
    pub orders: Vec<OrderMetrics>,
}

impl ModelSummary {
    /// Highest order described by the header.
    #[must_use]
    pub fn max_order(&self) -> usize {
        self.orders.len()
    }

    /// Serialises the summary as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Parses the `\data\` header block of a model.
///
/// Only the header is read; the per-order blocks are not validated.
pub fn read_summary<R: BufRead>(reader: R, path: Option<&Path>) -> Result<ModelSummary> {
    let parse_error = |line: usize, message: String| NgramError::Parse {
        path: path.map(Path::to_path_buf),
        line,
        message,
    };

    let mut summary = ModelSummary::default();
    let mut in_header = false;
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| NgramError::io(err, path.map(Path::to_path_buf)))?;
        let line = line.trim();
        if !in_header {
            if line.is_empty() {
                continue;
            }
            if line != DATA_MARKER {
                return Err(parse_error(
                    line_no,
                    format!("expected `{DATA_MARKER}`, found `{line}`"),
                ));
            }
            in_header = true;
            continue;
        }
        if line.is_empty() {
            return Ok(summary);
        }
        let entry = parse_header_line(line).ok_or_else(|| {
            parse_error(line_no, format!("malformed header line `{line}`"))
        })?;
        if entry.order != summary.orders.len() + 1 {
            return Err(parse_error(
                line_no,
                format!(
                    "expected order {}, found order {}",
                    summary.orders.len() + 1,
                    entry.order
                ),
            ));
        }
        summary.orders.push(entry);
    }

    if in_header {
        Ok(summary)
    } else {
        Err(parse_error(0, format!("missing `{DATA_MARKER}` header")))
    }
}

/// Reads the header of the model stored at `path`.
pub fn load_summary<P: AsRef<Path>>(path: P) -> Result<ModelSummary> {
    let path = path.as_ref();
    read_summary(open_lines(path)?, Some(path))
}

fn parse_header_line(line: &str) -> Option<OrderMetrics> {
    let (order, rest) = line.split_once("-grams: unique=")?;
    let (unique, total) = rest.split_once("; total=")?;
    Some(OrderMetrics {
        order: order.trim().parse().ok()?,
        unique: unique.trim().parse().ok()?,
        total: total.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CounterConfig, ModelConfig};
    use crate::counter::NGramCounter;
    use crate::smoothing::Estimator;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn example_model(delta: f64) -> LanguageModel {
        let counter_cfg = CounterConfig::builder()
            .max_order(2)
            .show_progress(false)
            .build()
            .unwrap();
        let tables = NGramCounter::new(counter_cfg)
            .count_sentences(&["the cat sat", "the dog sat"])
            .unwrap()
            .tables;
        let model_cfg = ModelConfig::builder()
            .delta(delta)
            .show_progress(false)
            .build()
            .unwrap();
        Estimator::new(model_cfg).estimate(&tables).unwrap()
    }

    #[test]
    fn writes_exact_layout() {
        let text = example_model(0.0).to_text().unwrap();
        let expected = "\\data\\\n\
            1-grams: unique=6; total=10\n\
            2-grams: unique=6; total=8\n\
            \n\
            \\1-grams:\n\
            2\t0.2\t-2.32193\t</s>\n\
            2\t0.2\t-2.32193\t<s>\n\
            2\t0.2\t-2.32193\tsat\n\
            2\t0.2\t-2.32193\tthe\n\
            1\t0.1\t-3.32193\tcat\n\
            1\t0.1\t-3.32193\tdog\n\
            \n\
            \\2-grams:\n\
            2\t1\t0\t<s> the\n\
            2\t1\t0\tsat </s>\n\
            1\t1\t0\tcat sat\n\
            1\t1\t0\tdog sat\n\
            1\t0.5\t-1\tthe cat\n\
            1\t0.5\t-1\tthe dog\n\
            \n\
            \\end\\";
        assert_eq!(text, expected);
    }

    #[test]
    fn summary_round_trips_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.lm");
        example_model(0.1).save(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with(END_MARKER));

        let summary = load_summary(&path).unwrap();
        assert_eq!(summary.max_order(), 2);
        assert_eq!(
            summary.orders[0],
            OrderMetrics {
                order: 1,
                unique: 6,
                total: 10
            }
        );
        assert_eq!(summary.orders[1].total, 8);
        let json = summary.to_json(false).unwrap();
        assert!(json.contains("\"unique\":6"));
    }

    #[test]
    fn summary_rejects_missing_marker() {
        let err = read_summary(Cursor::new("1-grams: unique=1; total=1\n"), None).unwrap_err();
        assert!(matches!(err, NgramError::Parse { line: 1, .. }));
    }

    #[test]
    fn summary_rejects_out_of_sequence_orders() {
        let input = "\\data\\\n2-grams: unique=1; total=1\n\n";
        let err = read_summary(Cursor::new(input), None).unwrap_err();
        assert!(matches!(err, NgramError::Parse { line: 2, .. }));
    }

    #[test]
    fn zero_probability_is_written_as_negative_infinity() {
        let mut tables = crate::table::NGramTables::new(1);
        tables.increment(1, "a").unwrap();
        tables.table_mut(1).unwrap().insert_zero("b".into());
        let cfg = ModelConfig::builder().show_progress(false).build().unwrap();
        let text = Estimator::new(cfg).estimate(&tables).unwrap().to_text().unwrap();
        assert!(text.contains("0\t0\t-inf\tb\n"), "{text}");
        assert!(text.contains("1\t1\t0\ta\n"), "{text}");
    }
}
