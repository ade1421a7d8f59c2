//! Intermediate counts file: one `<count>\t<ngram>` line per n-gram.
//!
//! Orders are written from unigrams upwards, each block sorted by descending count with ties
//! broken by n-gram text. The reader infers each line's order from its token count.

use std::io::{self, BufRead, Write};
use std::path::Path;

use log::debug;

use crate::corpus::open_lines;
use crate::error::{NgramError, Result};
use crate::serialization::write_atomic;
use crate::table::{Count, NGramTables};

/// Writes every order of `tables` to `writer`.
pub fn write_counts<W: Write>(tables: &NGramTables, writer: &mut W) -> io::Result<()> {
    for (_, table) in tables.iter() {
        for (ngram, count) in table.sorted_by_count_descending() {
            writeln!(writer, "{count}\t{ngram}")?;
        }
    }
    Ok(())
}

/// Writes the counts file to `path`, replacing it atomically.
pub fn save_counts<P: AsRef<Path>>(tables: &NGramTables, path: P) -> Result<()> {
    write_atomic(path, |writer| write_counts(tables, writer))
}

/// Parses a counts file from any buffered source.
///
/// Blank lines are skipped. A leading token that is not a non-negative integer, a count
/// with no n-gram after it, or a count that would push an n-gram or its order's total past
/// `u64::MAX`, is a [`NgramError::Parse`]. Repeated n-grams have their counts summed.
pub fn read_counts<R: BufRead>(reader: R, path: Option<&Path>) -> Result<NGramTables> {
    let mut tables = NGramTables::new(0);
    let parse_error = |line: usize, message: String| NgramError::Parse {
        path: path.map(Path::to_path_buf),
        line,
        message,
    };

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| NgramError::io(err, path.map(Path::to_path_buf)))?;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        let count: Count = first
            .parse()
            .map_err(|err| parse_error(line_no, format!("invalid count `{first}`: {err}")))?;
        let ngram = tokens.collect::<Vec<_>>().join(" ");
        if ngram.is_empty() {
            return Err(parse_error(
                line_no,
                format!("count `{first}` is not followed by an n-gram"),
            ));
        }
        tables
            .add_growing(&ngram, count)
            .map_err(|err| parse_error(line_no, err.to_string()))?;
    }

    debug!(
        "read counts for {} orders: unique {:?}",
        tables.max_order(),
        tables.unique_counts()
    );
    Ok(tables)
}

/// Loads the counts file stored at `path`.
pub fn load_counts<P: AsRef<Path>>(path: P) -> Result<NGramTables> {
    let path = path.as_ref();
    read_counts(open_lines(path)?, Some(path))
}
